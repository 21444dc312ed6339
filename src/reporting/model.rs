use serde::Serialize;

#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Critical => write!(f, "CRITICAL"),
            Severity::High => write!(f, "HIGH"),
            Severity::Medium => write!(f, "MEDIUM"),
            Severity::Low => write!(f, "LOW"),
        }
    }
}

#[derive(Debug, Serialize, Clone)]
pub struct Finding {
    pub vuln_type: String,
    pub endpoint: String,
    pub parameter: String,
    pub severity: Severity,
    pub engine: Option<String>,
    pub language: Option<String>,
    /// The confirmed injection shape: prefix, masked tag, suffix.
    pub evidence: String,
    pub capabilities: Vec<String>,
    pub cwe: String,
    pub description: String,
    pub remediation: String,
}

impl Finding {
    /// A confirmed engine with some set of proven capabilities. Severity
    /// follows the worst capability: command execution or file write means
    /// full compromise, evaluation close behind, a bare identified engine
    /// still discloses internals.
    pub fn template_injection(
        endpoint: &str,
        parameter: &str,
        engine: &str,
        language: &str,
        evidence: &str,
        capabilities: Vec<String>,
    ) -> Self {
        let severity = if capabilities.iter().any(|c| c == "exec" || c == "write") {
            Severity::Critical
        } else if capabilities.iter().any(|c| c == "eval") {
            Severity::High
        } else {
            Severity::Medium
        };

        Self {
            vuln_type: "Server-Side Template Injection".to_string(),
            endpoint: endpoint.to_string(),
            parameter: parameter.to_string(),
            severity,
            engine: Some(engine.to_string()),
            language: Some(language.to_string()),
            evidence: evidence.to_string(),
            capabilities,
            cwe: "CWE-1336".to_string(),
            description: format!(
                "The '{}' parameter is rendered by the {} template engine ({}). \
                 Injected template expressions are evaluated server-side, \
                 letting an attacker run code in the rendering process.",
                parameter, engine, language
            ),
            remediation: "Never render user input as a template. Pass user data \
                 to templates as context variables only, enable the engine's \
                 sandbox where available, and keep the engine patched."
                .to_string(),
        }
    }

    /// Reflection confirmed only by weak containment: the page evaluates
    /// expressions somewhere, but output cannot be isolated and no engine
    /// was identified.
    pub fn weak_reflection(endpoint: &str, parameter: &str, render_tag: &str) -> Self {
        Self {
            vuln_type: "Server-Side Template Injection (unreliable reflection)".to_string(),
            endpoint: endpoint.to_string(),
            parameter: parameter.to_string(),
            severity: Severity::Low,
            engine: None,
            language: None,
            evidence: render_tag.to_string(),
            capabilities: Vec::new(),
            cwe: "CWE-1336".to_string(),
            description: format!(
                "Expressions injected through '{}' appear evaluated somewhere in \
                 the response, but their output could not be isolated. Manual \
                 verification needed; containment matches can be coincidental.",
                parameter
            ),
            remediation: "Review how this parameter reaches the template layer."
                .to_string(),
        }
    }
}
