//! Host tool validation.
//!
//! Checks that the external tools the pipelines shell out to are installed
//! before any expensive work starts. Surfaced by the `status` command.

use crate::process::which;

/// Required host tools with their purpose and install suggestion.
const REQUIRED_TOOLS: &[(&str, &str, &str)] = &[
    ("node", "JavaScript runtime", "https://nodejs.org"),
    ("yarn", "Dependency install + tsc", "npm install -g yarn"),
    ("mocha", "Test runner", "npm install -g mocha"),
];

/// Result of a single preflight check.
#[derive(Debug, Clone)]
pub struct CheckResult {
    /// Name of the checked tool.
    pub name: String,
    /// Whether the tool was found.
    pub passed: bool,
    /// Human-readable message.
    pub message: String,
    /// Install suggestion when the tool is missing.
    pub suggestion: Option<String>,
}

impl CheckResult {
    fn pass(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            passed: true,
            message: message.into(),
            suggestion: None,
        }
    }

    fn fail(
        name: impl Into<String>,
        message: impl Into<String>,
        suggestion: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            passed: false,
            message: message.into(),
            suggestion: Some(suggestion.into()),
        }
    }
}

/// Check that all required host tools are installed.
pub fn check_host_tools() -> Vec<CheckResult> {
    REQUIRED_TOOLS
        .iter()
        .map(|(tool, purpose, install)| check_tool(tool, purpose, install))
        .collect()
}

fn check_tool(tool: &str, purpose: &str, install: &str) -> CheckResult {
    match which(tool) {
        Some(path) => CheckResult::pass(tool, format!("Found at {} ({})", path, purpose)),
        None => CheckResult::fail(
            tool,
            format!("Not found (needed for: {})", purpose),
            install,
        ),
    }
}

/// Print the host tool report.
pub fn print_report(checks: &[CheckResult]) {
    for check in checks {
        let status = if check.passed { "[OK]  " } else { "[FAIL]" };
        println!("{} {}: {}", status, check.name, check.message);
        if let Some(suggestion) = &check.suggestion {
            println!("       Install: {}", suggestion);
        }
    }
}
