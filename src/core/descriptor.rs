//! Engine descriptor contract
//!
//! Each candidate template engine is described by data, not by a subclass:
//! reflection tags, escape contexts, a closure table, one identity check and
//! a set of optional capability payloads. A missing capability payload means
//! the corresponding probe and action are no-ops for that engine. The
//! registry in `engines/` supplies the concrete descriptors.

use crate::core::closures::{ClosureTable, InjectionContext};
use crate::core::template::Template;

/// How an engine proves its identity once reflection is confirmed.
#[derive(Debug, Clone)]
pub enum Identity {
    /// Payload with a `{token}` slot; the engine must return the token
    /// upper-cased (exercises a language-specific case filter/method).
    Uppercase(Template),
    /// Payload with `{a}`/`{b}` slots; the engine must coerce the quoted
    /// operand and return the exact decimal product. Distinguishes engines
    /// whose `*` repeats strings from engines whose `*` coerces them.
    CoercedProduct(Template),
}

/// Evaluation probe: `{token}` slot holding a string literal in the engine's
/// expression language. Echoing the token back proves code evaluation.
#[derive(Debug, Clone)]
pub struct EvalProbe {
    pub literal: Template,
    /// What gets recorded under the `eval` key on success.
    pub language: &'static str,
}

/// Shell execution probe/action: `{command}` slot; the rendered payload must
/// yield the command's stdout.
#[derive(Debug, Clone)]
pub struct ExecProbe {
    pub command: Template,
}

/// File read probe/action: `{path}` slot; the rendered payload must yield
/// the file's contents.
#[derive(Debug, Clone)]
pub struct ReadProbe {
    pub path: Template,
}

/// File write probe/action: `{data}` and `{path}` slots.
#[derive(Debug, Clone)]
pub struct WriteProbe {
    pub write: Template,
}

#[derive(Debug, Clone)]
pub struct EngineDescriptor {
    pub name: &'static str,
    pub language: &'static str,
    /// Single-slot tags (`payload`, `header`, `trailer` respectively).
    pub render_tag: Template,
    pub header_tag: Template,
    pub trailer_tag: Template,
    /// Escape contexts in catalog order (first confirmed wins).
    pub contexts: Vec<InjectionContext>,
    pub closures: ClosureTable,
    pub identity: Identity,
    pub eval: Option<EvalProbe>,
    pub exec: Option<ExecProbe>,
    pub read: Option<ReadProbe>,
    pub write: Option<WriteProbe>,
}

impl EngineDescriptor {
    /// Contexts whose level fits within the configured ceiling.
    pub fn contexts_in_budget(&self, max_level: u8) -> usize {
        self.contexts.iter().filter(|c| c.level <= max_level).count()
    }
}
