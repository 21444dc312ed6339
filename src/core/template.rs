//! Single-slot template strings
//!
//! Render/header/trailer tags, context prefixes and capability payloads are
//! all plain strings carrying named `{slot}` markers. Substitution is a
//! literal substring replacement, so template text may freely contain the
//! target engine's own braces (`{{{payload}}}` renders to `{{…}}`).

/// A template string with named `{slot}` placeholders.
///
/// Tags used by the prober (`render_tag`, `header_tag`, `trailer_tag` and
/// context prefixes) carry exactly one slot by convention; capability
/// payloads may carry several and are filled with [`Template::fill`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    text: String,
}

impl Template {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// The identity template for `slot`: renders to the value unchanged.
    /// Used as the fallback when a tag has not been confirmed yet.
    pub fn passthrough(slot: &str) -> Self {
        Self {
            text: format!("{{{slot}}}"),
        }
    }

    pub fn raw(&self) -> &str {
        &self.text
    }

    /// Replace every occurrence of `{slot}` with `value`.
    pub fn render(&self, slot: &str, value: &str) -> String {
        self.text.replace(&format!("{{{slot}}}"), value)
    }

    /// Replace several slots at once.
    pub fn fill(&self, vars: &[(&str, &str)]) -> String {
        let mut out = self.text.clone();
        for (slot, value) in vars {
            out = out.replace(&format!("{{{slot}}}"), value);
        }
        out
    }

    /// Log-safe rendering: the slot collapses to `*` and newlines are
    /// escaped so tags stay on one log line.
    pub fn masked(&self, slot: &str) -> String {
        self.render(slot, "*").replace('\n', "\\n")
    }
}
