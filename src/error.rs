//! Error types for dotrail.
//!
//! Program failures are classified so the application layer can surface a
//! readable message without ever letting them reach the simulation loop.
//! Configuration failures cover loading and saving [`SessionConfig`](crate::config::SessionConfig).

/// Errors raised while turning program text into a running [`Program`](crate::behavior::Program).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProgramError {
    /// The source text is malformed.
    #[error("Parse error: {0}")]
    Parse(String),
    /// The source is well formed but semantically invalid.
    #[error("Compile error: {0}")]
    Compile(String),
    /// Anything else raised while compiling or instantiating a program.
    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl ProgramError {
    /// Short name of the failure class, used in log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            ProgramError::Parse(_) => "parse",
            ProgramError::Compile(_) => "compile",
            ProgramError::Unknown(_) => "unknown",
        }
    }

    /// Build an [`ProgramError::Unknown`] from a caught panic payload.
    pub(crate) fn from_panic(payload: Box<dyn std::any::Any + Send>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "compiler panicked".to_string()
        };
        ProgramError::Unknown(message)
    }
}

/// Errors that can occur while loading or saving a configuration file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read or write the file.
    #[error("failed to access config file: {0}")]
    Io(#[from] std::io::Error),
    /// The file contents are not a valid configuration.
    #[error("invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),
}
