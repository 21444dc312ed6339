//! Per-target capability state
//!
//! A shared key/value store recording everything confirmed about one target:
//! the reflection tags, the escaping prefix/suffix, the identified engine and
//! the capability flags. The store performs no validation; the probing code
//! owns the append-only discipline (confirmed keys are only written on a
//! successful probe and never rolled back on a failed one).
//!
//! The handle is passed as `&mut` into every probe, so a driver running
//! descriptors in parallel against one target must serialize access itself.

use std::collections::HashMap;

/// Well-known state keys.
pub mod keys {
    pub const RENDER_TAG: &str = "render_tag";
    pub const HEADER_TAG: &str = "header_tag";
    pub const TRAILER_TAG: &str = "trailer_tag";
    pub const PREFIX: &str = "prefix";
    pub const SUFFIX: &str = "suffix";
    pub const ENGINE: &str = "engine";
    pub const LANGUAGE: &str = "language";
    pub const EVAL: &str = "eval";
    pub const EXEC: &str = "exec";
    pub const WRITE: &str = "write";
    pub const READ: &str = "read";
}

#[derive(Debug, Clone, Default)]
pub struct TargetState {
    data: HashMap<String, String>,
}

impl TargetState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.data.get(key).map(String::as_str)
    }

    pub fn get_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.get(key).unwrap_or(default)
    }

    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        self.data.insert(key.to_string(), value.into());
    }

    pub fn is_set(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }
}
