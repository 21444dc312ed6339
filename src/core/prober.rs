//! Oracle-driven injection probing
//!
//! `Prober` ties one engine descriptor to one target session: it composes
//! probe strings, pushes them through the transport, isolates the engine's
//! output with randomized numeric markers, and drives the context search
//! that decides whether (and how wrapped) injected expressions evaluate.
//!
//! Detection-negative outcomes are not errors: `detect` returns `Ok(())`
//! with the state untouched when nothing reflects. Only transport failures
//! cross this boundary.

use crate::core::closures::expand_closures;
use crate::core::descriptor::EngineDescriptor;
use crate::core::oracle::rand_digits;
use crate::core::state::{keys, TargetState};
use crate::core::template::Template;
use anyhow::Result;

/// The transport collaborator: one synchronous request/response round trip.
/// Transport failures propagate to the caller untouched; there are no
/// retries or timeouts at this layer.
#[allow(async_fn_in_trait)]
pub trait Transport {
    async fn request(&self, text: &str) -> Result<String>;
}

/// One probe's explicit parts. Fields left as `None` are resolved from the
/// target state at injection time (falling back to passthrough tags and
/// empty prefix/suffix), with fresh random markers.
#[derive(Debug, Clone, Default)]
pub struct Probe {
    pub payload: String,
    pub header: Option<String>,
    pub header_rand: Option<u32>,
    pub trailer: Option<String>,
    pub trailer_rand: Option<u32>,
    pub prefix: Option<String>,
    pub suffix: Option<String>,
}

impl Probe {
    pub fn payload(payload: impl Into<String>) -> Self {
        Self {
            payload: payload.into(),
            ..Default::default()
        }
    }
}

/// Cut the engine's output out of the surrounding page.
///
/// If a header was sent, everything up to and including the first occurrence
/// of its marker is discarded; if a trailer was sent, everything from the
/// first occurrence of its marker onward is discarded. A marker that never
/// appears leaves that side untouched, which deliberately hands the raw page
/// to the weak-containment fallback.
fn isolate(response: &str, header: &str, header_rand: u32, trailer: &str, trailer_rand: u32) -> String {
    let mut result = response;
    if !header.is_empty() {
        let marker = header_rand.to_string();
        if let Some(pos) = result.find(&marker) {
            result = &result[pos + marker.len()..];
        }
    }
    if !trailer.is_empty() {
        let marker = trailer_rand.to_string();
        if let Some(pos) = result.find(&marker) {
            result = &result[..pos];
        }
    }
    result.trim().to_string()
}

pub struct Prober<'a, T: Transport> {
    transport: &'a T,
    pub(crate) state: &'a mut TargetState,
    pub(crate) engine: &'a EngineDescriptor,
    level: u8,
}

impl<'a, T: Transport> Prober<'a, T> {
    pub fn new(
        transport: &'a T,
        state: &'a mut TargetState,
        engine: &'a EngineDescriptor,
        level: u8,
    ) -> Self {
        Self {
            transport,
            state,
            engine,
            level,
        }
    }

    /// Compose `prefix + header + payload + trailer + suffix`, send it, and
    /// isolate the engine's output. Parts not given are resolved from the
    /// target state.
    pub async fn inject(&mut self, probe: Probe) -> Result<String> {
        let header_rand = probe.header_rand.unwrap_or_else(|| rand_digits(3));
        let header = match probe.header {
            Some(h) => h,
            None => Template::new(self.state.get_or(keys::HEADER_TAG, "{header}"))
                .render("header", &header_rand.to_string()),
        };
        let trailer_rand = probe.trailer_rand.unwrap_or_else(|| rand_digits(3));
        let trailer = match probe.trailer {
            Some(t) => t,
            None => Template::new(self.state.get_or(keys::TRAILER_TAG, "{trailer}"))
                .render("trailer", &trailer_rand.to_string()),
        };
        let prefix = probe
            .prefix
            .unwrap_or_else(|| self.state.get_or(keys::PREFIX, "").to_string());
        let suffix = probe
            .suffix
            .unwrap_or_else(|| self.state.get_or(keys::SUFFIX, "").to_string());

        let injection = format!("{prefix}{header}{}{trailer}{suffix}", probe.payload);
        tracing::debug!("[{} probe] {}", self.engine.name, injection.escape_debug());

        let response = self.transport.request(&injection).await?;
        tracing::debug!("[{} probe] {} byte response", self.engine.name, response.len());

        Ok(isolate(&response, &header, header_rand, &trailer, trailer_rand))
    }

    /// Full detection pass: reflection, context, engine identity, then the
    /// capability probes in fixed order.
    pub async fn detect(&mut self) -> Result<()> {
        let engine = self.engine;
        let variations = engine.contexts_in_budget(self.level);
        tracing::info!(
            "Testing reflection on {} engine with tag {}{}",
            engine.name,
            engine.render_tag.masked("payload"),
            if variations > 0 {
                format!(
                    " and {} context variation{}",
                    variations,
                    if variations > 1 { "s" } else { "" }
                )
            } else {
                String::new()
            },
        );

        if self.tags_confirmed() {
            // Confirmed earlier, by this descriptor or one sharing its tags.
        } else if !self.state.is_set(keys::RENDER_TAG) {
            self.detect_context().await?;
            if self.state.is_set(keys::RENDER_TAG)
                && (!self.state.is_set(keys::HEADER_TAG) || !self.state.is_set(keys::TRAILER_TAG))
            {
                tracing::info!(
                    "Detected unreliable reflection with tag {}, continuing",
                    Template::new(self.state.get_or(keys::RENDER_TAG, "")).masked("payload")
                );
            }
        } else {
            self.detect_context().await?;
        }

        if !self.tags_confirmed() {
            return Ok(());
        }

        tracing::info!(
            "Confirmed reflection with tag '{}{}{}' by {} engine",
            self.state.get_or(keys::PREFIX, "").replace('\n', "\\n"),
            engine.render_tag.masked("payload"),
            self.state.get_or(keys::SUFFIX, "").replace('\n', "\\n"),
            engine.name
        );

        self.detect_engine().await?;
        if !self.state.is_set(keys::ENGINE) {
            return Ok(());
        }

        self.detect_eval().await?;
        self.detect_exec().await?;
        self.detect_write().await?;
        self.detect_read().await?;
        Ok(())
    }

    /// Find the minimal context in which injected expressions evaluate.
    ///
    /// Order matters: the unwrapped text context is tried first, then the
    /// catalog contexts with their closures shortest-first, then a weak
    /// containment check with no markers at all. The first exact oracle
    /// match wins and is recorded; a pass that finds nothing leaves the
    /// state untouched.
    async fn detect_context(&mut self) -> Result<()> {
        let engine = self.engine;

        let a = rand_digits(1);
        let b = rand_digits(1);
        let expected = (a * b).to_string();

        let payload = engine.render_tag.render("payload", &format!("{a}*{b}"));
        let header_rand = rand_digits(3);
        let header = engine.header_tag.render("header", &header_rand.to_string());
        let trailer_rand = rand_digits(3);
        let trailer = engine.trailer_tag.render("trailer", &trailer_rand.to_string());

        tracing::debug!("{}: trying to inject in text context", engine.name);
        let result = self
            .inject(Probe {
                payload: payload.clone(),
                header: Some(header.clone()),
                header_rand: Some(header_rand),
                trailer: Some(trailer.clone()),
                trailer_rand: Some(trailer_rand),
                prefix: Some(String::new()),
                suffix: Some(String::new()),
            })
            .await?;
        if result == expected {
            self.state.set(keys::RENDER_TAG, engine.render_tag.raw());
            self.state.set(keys::HEADER_TAG, engine.header_tag.raw());
            self.state.set(keys::TRAILER_TAG, engine.trailer_tag.raw());
            return Ok(());
        }

        tracing::debug!(
            "{}: injection in text context failed, trying code contexts",
            engine.name
        );
        for ctx in &engine.contexts {
            if ctx.level > self.level {
                continue;
            }
            for closure in expand_closures(ctx, &engine.closures, self.level) {
                let prefix = ctx.prefix_for(&closure);
                let suffix = ctx.suffix_str().to_string();
                let result = self
                    .inject(Probe {
                        payload: payload.clone(),
                        header: Some(header.clone()),
                        header_rand: Some(header_rand),
                        trailer: Some(trailer.clone()),
                        trailer_rand: Some(trailer_rand),
                        prefix: Some(prefix.clone()),
                        suffix: Some(suffix.clone()),
                    })
                    .await?;
                if result == expected {
                    self.state.set(keys::RENDER_TAG, engine.render_tag.raw());
                    self.state.set(keys::HEADER_TAG, engine.header_tag.raw());
                    self.state.set(keys::TRAILER_TAG, engine.trailer_tag.raw());
                    self.state.set(keys::PREFIX, prefix);
                    self.state.set(keys::SUFFIX, suffix);
                    return Ok(());
                }
            }
        }

        tracing::debug!(
            "{}: injection in code context failed, trying bare payload with no markers",
            engine.name
        );
        // Last resort: no markers, so the whole page comes back. A contained
        // product only proves the payload was evaluated somewhere, not that
        // its output is isolable; residual marker text from earlier probes
        // makes this a known false-positive risk.
        let result = self
            .inject(Probe {
                payload,
                header: Some(String::new()),
                header_rand: Some(0),
                trailer: Some(String::new()),
                trailer_rand: Some(0),
                prefix: Some(String::new()),
                suffix: Some(String::new()),
            })
            .await?;
        if result.contains(&expected) {
            self.state.set(keys::RENDER_TAG, engine.render_tag.raw());
        }
        Ok(())
    }

    /// Whether the stored tags all match this descriptor's templates.
    pub(crate) fn tags_confirmed(&self) -> bool {
        self.state.get(keys::RENDER_TAG) == Some(self.engine.render_tag.raw())
            && self.state.get(keys::HEADER_TAG) == Some(self.engine.header_tag.raw())
            && self.state.get(keys::TRAILER_TAG) == Some(self.engine.trailer_tag.raw())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::closures::{ClosureSet, InjectionContext};
    use crate::core::testutil::{render_templated, test_descriptor, MockTransport};

    #[test]
    fn isolates_between_first_markers() {
        let got = isolate("xx123 content 456yy", "{{123}}", 123, "{{456}}", 456);
        assert_eq!(got, "content");
    }

    #[test]
    fn missing_header_marker_keeps_whole_response() {
        let got = isolate("  whole page  ", "{{123}}", 123, "{{456}}", 456);
        assert_eq!(got, "whole page");
    }

    #[test]
    fn missing_trailer_marker_keeps_remainder() {
        let got = isolate("pre123 tail ", "{{123}}", 123, "{{456}}", 456);
        assert_eq!(got, "tail");
    }

    #[test]
    fn empty_markers_skip_isolation() {
        let got = isolate(" raw 0 page ", "", 0, "", 0);
        assert_eq!(got, "raw 0 page");
    }

    #[test]
    fn splits_at_first_occurrence_only() {
        let got = isolate("a123b123c456d456e", "{{123}}", 123, "{{456}}", 456);
        assert_eq!(got, "b123c");
    }

    #[tokio::test]
    async fn text_context_confirms_all_tags() {
        let transport =
            MockTransport::new(|text: &str| format!("<html>{}</html>", render_templated(text)));
        let descriptor = test_descriptor();
        let mut state = TargetState::new();
        let mut prober = Prober::new(&transport, &mut state, &descriptor, 1);

        prober.detect_context().await.unwrap();

        assert_eq!(state.get(keys::RENDER_TAG), Some("{{{payload}}}"));
        assert_eq!(state.get(keys::HEADER_TAG), Some("{{{header}}}\n"));
        assert_eq!(state.get(keys::TRAILER_TAG), Some("\n{{{trailer}}}"));
        assert_eq!(state.get(keys::PREFIX), None);
        assert_eq!(state.get(keys::SUFFIX), None);
    }

    #[tokio::test]
    async fn code_context_records_prefix_and_suffix() {
        // Evaluation only happens once the injected text closes the quote
        // and expression it landed in.
        let transport = MockTransport::new(|text: &str| match text.strip_prefix("'}}") {
            Some(rest) => format!("<page>{}</page>", render_templated(rest)),
            None => format!("<page>{}</page>", text),
        });
        let descriptor = test_descriptor();
        let mut state = TargetState::new();
        let mut prober = Prober::new(&transport, &mut state, &descriptor, 1);

        prober.detect_context().await.unwrap();

        assert_eq!(state.get(keys::RENDER_TAG), Some("{{{payload}}}"));
        assert_eq!(state.get(keys::PREFIX), Some("'}}"));
        assert_eq!(state.get(keys::SUFFIX), Some(""));
    }

    #[tokio::test]
    async fn text_context_wins_when_both_match() {
        let transport = MockTransport::new(|text: &str| {
            let body = text.strip_prefix("'}}").unwrap_or(text);
            format!("<page>{}</page>", render_templated(body))
        });
        let descriptor = test_descriptor();
        let mut state = TargetState::new();
        let mut prober = Prober::new(&transport, &mut state, &descriptor, 1);

        prober.detect_context().await.unwrap();

        assert_eq!(state.get(keys::RENDER_TAG), Some("{{{payload}}}"));
        assert_eq!(state.get(keys::PREFIX), None);
    }

    #[tokio::test]
    async fn first_catalog_context_wins() {
        let mut descriptor = test_descriptor();
        descriptor.contexts.push(InjectionContext {
            level: 1,
            prefix: Some(Template::new("{closure}%}")),
            suffix: None,
            closures: vec![ClosureSet {
                level: 1,
                specs: vec![vec!["quote"]],
            }],
        });
        // Both escape sequences work; catalog order decides.
        let transport = MockTransport::new(|text: &str| {
            let body = text
                .strip_prefix("'}}")
                .or_else(|| text.strip_prefix("'%}"))
                .map(render_templated);
            match body {
                Some(b) => format!("<page>{b}</page>"),
                None => format!("<page>{text}</page>"),
            }
        });
        let mut state = TargetState::new();
        let mut prober = Prober::new(&transport, &mut state, &descriptor, 1);

        prober.detect_context().await.unwrap();

        assert_eq!(state.get(keys::PREFIX), Some("'}}"));
    }

    #[tokio::test]
    async fn over_budget_contexts_are_never_tried() {
        let mut descriptor = test_descriptor();
        for ctx in &mut descriptor.contexts {
            ctx.level = 3;
        }
        let transport = MockTransport::new(|text: &str| match text.strip_prefix("'}}") {
            Some(rest) => format!("<page>{}</page>", render_templated(rest)),
            None => "<page>static</page>".to_string(),
        });
        let mut state = TargetState::new();
        let mut prober = Prober::new(&transport, &mut state, &descriptor, 1);

        prober.detect_context().await.unwrap();

        // The only working escape is above the ceiling; text context fails
        // and the weak fallback sees no evaluated product either.
        assert_eq!(state.get(keys::PREFIX), None);
        assert_eq!(state.get(keys::RENDER_TAG), None);
    }

    #[tokio::test]
    async fn weak_fallback_sets_only_render_tag() {
        // An engine that evaluates products but chokes on everything else,
        // behind a page that offers no isolable output.
        let transport = MockTransport::new(|text: &str| {
            let mut out = String::new();
            let mut rest = text;
            while let Some(start) = rest.find("{{") {
                out.push_str(&rest[..start]);
                let after = &rest[start + 2..];
                match after.find("}}") {
                    Some(end) => {
                        let expr = after[..end].trim();
                        if let Some((x, y)) = expr.split_once('*') {
                            if let (Ok(x), Ok(y)) = (x.parse::<u64>(), y.parse::<u64>()) {
                                out.push_str(&(x * y).to_string());
                            }
                        }
                        rest = &after[end + 2..];
                    }
                    None => {
                        rest = "";
                    }
                }
            }
            out.push_str(rest);
            format!("<html>{out}</html>")
        });
        let mut descriptor = test_descriptor();
        descriptor.contexts.clear();
        let mut state = TargetState::new();
        let mut prober = Prober::new(&transport, &mut state, &descriptor, 1);

        prober.detect_context().await.unwrap();

        assert_eq!(state.get(keys::RENDER_TAG), Some("{{{payload}}}"));
        assert_eq!(state.get(keys::HEADER_TAG), None);
        assert_eq!(state.get(keys::TRAILER_TAG), None);
        assert_eq!(state.get(keys::PREFIX), None);
        assert_eq!(state.get(keys::SUFFIX), None);
    }

    #[tokio::test]
    async fn second_detect_sends_zero_probes() {
        let transport =
            MockTransport::new(|text: &str| format!("<html>{}</html>", render_templated(text)));
        let descriptor = test_descriptor();
        let mut state = TargetState::new();

        let mut prober = Prober::new(&transport, &mut state, &descriptor, 1);
        prober.detect().await.unwrap();
        // Text context, identity, eval: one probe each.
        assert_eq!(transport.calls(), 3);
        assert_eq!(state.get(keys::ENGINE), Some("testengine"));
        assert_eq!(state.get(keys::EVAL), Some("python"));

        let mut prober = Prober::new(&transport, &mut state, &descriptor, 1);
        prober.detect().await.unwrap();
        assert_eq!(transport.calls(), 3);
    }

    #[tokio::test]
    async fn unidentified_engine_gates_capability_probes() {
        let transport = MockTransport::new(|_: &str| "nothing here".to_string());
        let descriptor = test_descriptor();
        let mut state = TargetState::new();
        state.set(keys::RENDER_TAG, descriptor.render_tag.raw());
        state.set(keys::HEADER_TAG, descriptor.header_tag.raw());
        state.set(keys::TRAILER_TAG, descriptor.trailer_tag.raw());

        let mut prober = Prober::new(&transport, &mut state, &descriptor, 1);
        prober.detect().await.unwrap();

        // Only the identity probe went out; eval was never attempted.
        assert_eq!(transport.calls(), 1);
        assert_eq!(state.get(keys::ENGINE), None);
        assert_eq!(state.get(keys::EVAL), None);
    }

    #[tokio::test]
    async fn failed_pass_never_overwrites_confirmed_tags() {
        let transport = MockTransport::new(|_: &str| "static page".to_string());
        let descriptor = test_descriptor();
        let mut state = TargetState::new();
        state.set(keys::RENDER_TAG, "${{payload}}");
        state.set(keys::HEADER_TAG, "${{header}}");
        state.set(keys::TRAILER_TAG, "${{trailer}}");

        let mut prober = Prober::new(&transport, &mut state, &descriptor, 1);
        prober.detect().await.unwrap();

        assert_eq!(state.get(keys::RENDER_TAG), Some("${{payload}}"));
        assert_eq!(state.get(keys::ENGINE), None);
    }
}
