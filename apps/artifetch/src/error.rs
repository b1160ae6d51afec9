//! CLI error handling

use std::fmt;

use artifetch_errors::UserFacingError;

/// CLI-specific error type
#[derive(Debug)]
pub enum CliError {
    /// Configuration error
    Config(artifetch_errors::ConfigError),
    /// Fetch or install error
    Run(artifetch_errors::Error),
    /// Report rendering error
    Render(String),
    /// I/O error
    Io(std::io::Error),
}

impl CliError {
    /// Stable error code for structured output
    pub fn code(&self) -> Option<&'static str> {
        match self {
            CliError::Config(e) => e.user_code(),
            CliError::Run(e) => e.user_code(),
            CliError::Render(_) => Some("cli.render"),
            CliError::Io(_) => Some("error.io"),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Config(e) => {
                write!(f, "Configuration error: {e}")?;
                if let Some(hint) = e.user_hint() {
                    write!(f, "\n  Hint: {hint}")?;
                }
                Ok(())
            }
            CliError::Run(e) => {
                let message = e.user_message();
                write!(f, "{message}")?;
                if let Some(code) = e.user_code() {
                    write!(f, "\n  Code: {code}")?;
                }
                if let Some(hint) = e.user_hint() {
                    write!(f, "\n  Hint: {hint}")?;
                }
                if e.is_retryable() {
                    write!(f, "\n  Retry: safe to retry this operation.")?;
                }
                Ok(())
            }
            CliError::Render(msg) => write!(f, "Failed to render output: {msg}"),
            CliError::Io(e) => write!(f, "I/O error: {e}"),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Config(e) => Some(e),
            CliError::Run(e) => Some(e),
            CliError::Io(e) => Some(e),
            CliError::Render(_) => None,
        }
    }
}

impl From<artifetch_errors::Error> for CliError {
    fn from(e: artifetch_errors::Error) -> Self {
        match e {
            artifetch_errors::Error::Config(config) => CliError::Config(config),
            other => CliError::Run(other),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        CliError::Io(e)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::Render(e.to_string())
    }
}
