// YAML syntax validation for incoming saves.
//
// The editor shows these messages verbatim, so the common parser failures
// get a friendlier diagnostic than the raw scanner output.

use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct YamlDiagnostic {
    message: String,
}

impl YamlDiagnostic {
    fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Parse `content` as a single YAML document, mapping scanner errors to
/// operator-facing diagnostics. No filesystem effect either way.
pub fn validate(content: &str) -> Result<(), YamlDiagnostic> {
    match serde_yaml::from_str::<serde_yaml::Value>(content) {
        Ok(_) => Ok(()),
        Err(error) => Err(diagnose(&error.to_string())),
    }
}

fn diagnose(parser_message: &str) -> YamlDiagnostic {
    if parser_message.contains("tab character")
        || parser_message.contains("cannot start any token")
    {
        YamlDiagnostic::new(
            "YAML does not allow tab characters for indentation; use spaces instead",
        )
    } else if parser_message.contains("unknown escape character") {
        YamlDiagnostic::new("YAML contains an invalid escape sequence")
    } else if parser_message.contains("could not find expected ':'") {
        YamlDiagnostic::new("YAML syntax error: missing ':' between a key and its value")
    } else if parser_message.contains("mapping values are not allowed") {
        YamlDiagnostic::new(
            "YAML syntax error: misplaced ':' or wrong indentation creates an ambiguous mapping",
        )
    } else {
        YamlDiagnostic::new(format!("invalid YAML: {parser_message}"))
    }
}
