//! Shared fixtures for the probing tests: an in-memory transport and a
//! tiny jinja-flavoured evaluator standing in for a remote engine.

use crate::core::closures::{ClosureSet, ClosureTable, InjectionContext};
use crate::core::descriptor::{EngineDescriptor, EvalProbe, Identity};
use crate::core::prober::Transport;
use crate::core::template::Template;
use anyhow::Result;
use std::cell::Cell;

pub struct MockTransport<F: Fn(&str) -> String> {
    respond: F,
    calls: Cell<usize>,
}

impl<F: Fn(&str) -> String> MockTransport<F> {
    pub fn new(respond: F) -> Self {
        Self {
            respond,
            calls: Cell::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.get()
    }
}

impl<F: Fn(&str) -> String> Transport for MockTransport<F> {
    async fn request(&self, text: &str) -> Result<String> {
        self.calls.set(self.calls.get() + 1);
        Ok((self.respond)(text))
    }
}

/// Evaluate every `{{…}}` block: integer literals, integer products,
/// single-quoted string literals and `'…'.upper()`. Anything else renders
/// to nothing, the way a lenient engine swallows a bad expression.
pub fn render_templated(input: &str) -> String {
    let mut out = String::new();
    let mut rest = input;
    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find("}}") {
            Some(end) => {
                out.push_str(&eval_expr(after[..end].trim()));
                rest = &after[end + 2..];
            }
            None => {
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

fn eval_expr(expr: &str) -> String {
    if let Ok(n) = expr.parse::<u64>() {
        return n.to_string();
    }
    if let Some((a, b)) = expr.split_once('*') {
        if let (Ok(a), Ok(b)) = (a.trim().parse::<u64>(), b.trim().parse::<u64>()) {
            return (a * b).to_string();
        }
    }
    if let Some(inner) = expr.strip_suffix(".upper()") {
        if let Some(lit) = quoted(inner) {
            return lit.to_ascii_uppercase();
        }
    }
    if let Some(lit) = quoted(expr) {
        return lit.to_string();
    }
    String::new()
}

fn quoted(expr: &str) -> Option<&str> {
    expr.trim().strip_prefix('\'')?.strip_suffix('\'')
}

/// A jinja2-shaped descriptor small enough to reason about in tests: one
/// level-1 expression-escape context with a single-quote closure.
pub fn test_descriptor() -> EngineDescriptor {
    let mut closures = ClosureTable::new();
    closures.insert("quote", vec!["'"]);

    EngineDescriptor {
        name: "testengine",
        language: "python",
        render_tag: Template::new("{{{payload}}}"),
        header_tag: Template::new("{{{header}}}\n"),
        trailer_tag: Template::new("\n{{{trailer}}}"),
        contexts: vec![InjectionContext {
            level: 1,
            prefix: Some(Template::new("{closure}}}")),
            suffix: None,
            closures: vec![ClosureSet {
                level: 1,
                specs: vec![vec!["quote"]],
            }],
        }],
        closures,
        identity: Identity::Uppercase(Template::new("{{'{token}'.upper()}}")),
        eval: Some(EvalProbe {
            literal: Template::new("{{'{token}'}}"),
            language: "python",
        }),
        exec: None,
        read: None,
        write: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn evaluator_handles_the_probe_shapes() {
        assert_eq!(render_templated("a{{7*7}}b"), "a49b");
        assert_eq!(render_templated("{{123}}"), "123");
        assert_eq!(render_templated("{{'tok'}}"), "tok");
        assert_eq!(render_templated("{{'tok'.upper()}}"), "TOK");
        assert_eq!(render_templated("{{garbage!}}"), "");
        assert_eq!(render_templated("plain"), "plain");
    }
}
