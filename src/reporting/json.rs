use crate::reporting::model::Finding;
use anyhow::Result;
use serde::Serialize;

#[derive(Serialize)]
struct Report<'a> {
    tool: &'static str,
    version: &'static str,
    findings: &'a [Finding],
}

pub fn render(findings: &[Finding]) -> Result<String> {
    let report = Report {
        tool: "tplprobe",
        version: env!("CARGO_PKG_VERSION"),
        findings,
    };
    Ok(serde_json::to_string_pretty(&report)?)
}

pub fn write_to_file(findings: &[Finding], path: &str) -> Result<()> {
    std::fs::write(path, render(findings)?)?;
    Ok(())
}
