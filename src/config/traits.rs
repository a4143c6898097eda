use std::fmt;

/// Severity level for configuration issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigIssueSeverity {
    Warning,
    Error,
}

/// A single configuration issue found during validation.
#[derive(Debug, Clone)]
pub struct ConfigIssue {
    pub severity: ConfigIssueSeverity,
    pub field: String,
    pub message: String,
}

impl ConfigIssue {
    pub fn error(field: &str, message: &str) -> Self {
        Self {
            severity: ConfigIssueSeverity::Error,
            field: field.to_string(),
            message: message.to_string(),
        }
    }

    pub fn warning(field: &str, message: &str) -> Self {
        Self {
            severity: ConfigIssueSeverity::Warning,
            field: field.to_string(),
            message: message.to_string(),
        }
    }
}

impl fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level = match self.severity {
            ConfigIssueSeverity::Warning => "warning",
            ConfigIssueSeverity::Error => "error",
        };
        write!(f, "{level}: {}: {}", self.field, self.message)
    }
}
