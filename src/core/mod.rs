//! Detection core: target state, templates, closure expansion and the
//! oracle-driven prober.

pub mod capability;
pub mod closures;
pub mod descriptor;
pub mod oracle;
pub mod prober;
pub mod state;
pub mod template;

#[cfg(test)]
pub mod testutil;
