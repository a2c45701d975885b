//! billetscan CLI library — pipeline orchestration shared by the
//! `bscan` binary and the integration tests.

pub mod exit_codes;
pub mod pipeline;

/// A stage failure mapped to the shell contract: exit code, message,
/// optional remediation hint. Every stage gets its own code range so a
/// caller can tell "bad upload" from "service down" without parsing
/// stderr.
#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn new(code: u8, message: impl Into<String>) -> Self {
        Self { code, message: message.into(), hint: None }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}
