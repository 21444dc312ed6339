//! Boxed terminal report

use crate::reporting::model::{Finding, Severity};
use unicode_width::UnicodeWidthStr;

const BOX_WIDTH: usize = 70;
const INNER_WIDTH: usize = BOX_WIDTH - 2;

fn top_border() -> String {
    format!("╔{}╗", "═".repeat(INNER_WIDTH))
}

fn middle_border() -> String {
    format!("╠{}╣", "═".repeat(INNER_WIDTH))
}

fn bottom_border() -> String {
    format!("╚{}╝", "═".repeat(INNER_WIDTH))
}

fn box_line(content: &str) -> String {
    let padded = format!(" {} ", content);
    let width = UnicodeWidthStr::width(padded.as_str());
    let padding = INNER_WIDTH.saturating_sub(width);
    format!("║{}{}║", padded, " ".repeat(padding))
}

fn box_line_centered(content: &str) -> String {
    let padded = format!(" {} ", content);
    let width = UnicodeWidthStr::width(padded.as_str());
    if width >= INNER_WIDTH {
        return box_line(content);
    }
    let remaining = INNER_WIDTH - width;
    let left = remaining / 2;
    format!(
        "║{}{}{}║",
        " ".repeat(left),
        padded,
        " ".repeat(remaining - left)
    )
}

pub fn render(findings: &[Finding]) {
    if findings.is_empty() {
        println!("\n{}", top_border());
        println!("{}", box_line_centered("SCAN COMPLETE"));
        println!("{}", middle_border());
        println!("{}", box_line("No template injection detected"));
        println!("{}\n", bottom_border());
        return;
    }

    let critical = findings
        .iter()
        .filter(|f| matches!(f.severity, Severity::Critical))
        .count();
    let high = findings
        .iter()
        .filter(|f| matches!(f.severity, Severity::High))
        .count();

    println!("\n{}", top_border());
    println!("{}", box_line_centered("TEMPLATE INJECTION DETECTED"));
    println!("{}", middle_border());
    println!("{}", box_line(&format!("Total findings: {}", findings.len())));
    if critical > 0 {
        println!("{}", box_line(&format!("Critical: {}", critical)));
    }
    if high > 0 {
        println!("{}", box_line(&format!("High: {}", high)));
    }
    println!("{}\n", bottom_border());

    for (idx, f) in findings.iter().enumerate() {
        println!("{}", "═".repeat(BOX_WIDTH));
        println!("FINDING #{}: {} [{}]", idx + 1, f.vuln_type, f.severity);
        println!("{}", "═".repeat(BOX_WIDTH));
        println!("  Endpoint:   {}", f.endpoint);
        println!("  Parameter:  {}", f.parameter);
        if let Some(engine) = &f.engine {
            println!(
                "  Engine:     {} ({})",
                engine,
                f.language.as_deref().unwrap_or("?")
            );
        }
        println!("  Evidence:   {}", f.evidence);
        if !f.capabilities.is_empty() {
            println!("  Capabilities: {}", f.capabilities.join(", "));
        }
        println!("  CWE:        {}", f.cwe);
        println!("\n  {}", f.description);
        println!("\n  Remediation: {}\n", f.remediation);
    }
}
