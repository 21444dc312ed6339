//! Escape contexts and closure expansion
//!
//! A context describes one syntactic environment the payload may be trapped
//! in (inside a string literal, an open expression, a comment) and how to
//! break out of it: a prefix template with a `closure` slot, an optional
//! suffix, and level-keyed lists of closure specs. A spec is an ordered list
//! of component names; each name maps to literal alternatives in the
//! engine's closure table (different quoting/bracket styles for the same
//! logical component).

use crate::core::template::Template;
use std::collections::{HashMap, HashSet};

/// Component name -> literal string alternatives.
pub type ClosureTable = HashMap<&'static str, Vec<&'static str>>;

/// Closure specs grouped under one escalation level.
#[derive(Debug, Clone)]
pub struct ClosureSet {
    pub level: u8,
    /// Each spec is an ordered list of component names. The empty spec is
    /// legal and expands to the empty closure.
    pub specs: Vec<Vec<&'static str>>,
}

/// One syntactic environment to escape from.
#[derive(Debug, Clone)]
pub struct InjectionContext {
    pub level: u8,
    /// Template with a `closure` slot; `None` means the closure passes
    /// through unchanged.
    pub prefix: Option<Template>,
    pub suffix: Option<&'static str>,
    pub closures: Vec<ClosureSet>,
}

impl InjectionContext {
    pub fn prefix_for(&self, closure: &str) -> String {
        match &self.prefix {
            Some(tpl) => tpl.render("closure", closure),
            None => closure.to_string(),
        }
    }

    pub fn suffix_str(&self) -> &str {
        self.suffix.unwrap_or("")
    }
}

/// Expand a context's closure specs into concrete candidate strings.
///
/// For every level present in the context that does not exceed `max_level`,
/// each spec's components are combined by cartesian product (one alternative
/// per component, concatenated in spec order). Candidates from all specs and
/// levels are unioned, deduplicated, and ordered shortest-first so the least
/// disruptive closures are tried before the aggressive ones. Ties are broken
/// lexicographically to keep the search deterministic.
pub fn expand_closures(
    ctx: &InjectionContext,
    table: &ClosureTable,
    max_level: u8,
) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();

    for set in &ctx.closures {
        if set.level > max_level {
            continue;
        }
        for spec in &set.specs {
            let mut combos: Vec<String> = vec![String::new()];
            let mut valid = true;
            for name in spec {
                let Some(alternatives) = table.get(name) else {
                    tracing::warn!("Unknown closure component '{}', skipping spec", name);
                    valid = false;
                    break;
                };
                let mut next = Vec::with_capacity(combos.len() * alternatives.len());
                for combo in &combos {
                    for alt in alternatives {
                        next.push(format!("{combo}{alt}"));
                    }
                }
                combos = next;
            }
            if valid {
                seen.extend(combos);
            }
        }
    }

    let mut out: Vec<String> = seen.into_iter().collect();
    out.sort_unstable_by(|a, b| a.len().cmp(&b.len()).then_with(|| a.cmp(b)));
    out
}
