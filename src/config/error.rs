//! Configuration error types.

use std::path::PathBuf;
use thiserror::Error;

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error when reading `{0}`")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("Config file parsing error")]
    Toml(#[from] toml::de::Error),

    #[error("config validation failed:\n{}", .0.join("\n"))]
    Validation(Vec<String>),
}

/// Collector for validation errors; all problems are reported at once.
#[derive(Debug, Default)]
pub struct ConfigDiagnostics {
    errors: Vec<String>,
}

impl ConfigDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an error against a config field path.
    pub fn error(&mut self, field: &str, message: impl Into<String>) {
        self.errors.push(format!("[{field}] {}", message.into()));
    }

    /// Record an error with a fix hint.
    pub fn error_with_hint(
        &mut self,
        field: &str,
        message: impl Into<String>,
        hint: impl Into<String>,
    ) {
        self.errors.push(format!(
            "[{field}] {}\n  hint: {}",
            message.into(),
            hint.into()
        ));
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Convert to Result (returns Err if there are errors).
    pub fn into_result(self) -> Result<(), ConfigError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(self.errors))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_diagnostics_is_ok() {
        assert!(ConfigDiagnostics::new().into_result().is_ok());
    }

    #[test]
    fn test_errors_collected() {
        let mut diag = ConfigDiagnostics::new();
        diag.error("font.ascent", "must be positive");
        diag.error_with_hint("bitmap.bpp", "unsupported value", "use 1, 2, 4 or 8");
        assert!(diag.has_errors());

        let err = diag.into_result().unwrap_err();
        let display = format!("{err}");
        assert!(display.contains("font.ascent"));
        assert!(display.contains("hint: use 1, 2, 4 or 8"));
    }
}
