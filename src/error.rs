use thiserror::Error;

use crate::domain::{CrispVar, FuzzyVar};

/// Exit code for bad flags, unreadable files and invalid policy tables.
pub const EXIT_CONFIG: u8 = 2;
/// Exit code when every rule fired with zero weight ("no signal").
pub const EXIT_NO_SIGNAL: u8 = 3;
/// Exit code for failures inside the inference pipeline.
pub const EXIT_ENGINE: u8 = 4;

/// Errors raised by the inference pipeline and policy validation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    #[error("crisp input '{0}' has not been set")]
    MissingCrisp(CrispVar),

    #[error("fuzzy variable '{0}' has not been derived")]
    MissingFuzzy(FuzzyVar),

    #[error("total contribution weight is zero; no allocation signal")]
    DegenerateAllocation,

    #[error("invalid membership shape for '{var}': {reason}")]
    InvalidShape { var: FuzzyVar, reason: String },

    #[error("invalid policy table: {0}")]
    InvalidPolicy(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl EngineError {
    /// True for the lookup failures (a variable read before it exists).
    pub fn is_lookup(&self) -> bool {
        matches!(self, EngineError::MissingCrisp(_) | EngineError::MissingFuzzy(_))
    }
}

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::new(EXIT_CONFIG, message)
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl From<EngineError> for AppError {
    fn from(err: EngineError) -> Self {
        let exit_code = match err {
            EngineError::DegenerateAllocation => EXIT_NO_SIGNAL,
            EngineError::InvalidShape { .. } | EngineError::InvalidPolicy(_) | EngineError::InvalidInput(_) => {
                EXIT_CONFIG
            }
            EngineError::MissingCrisp(_) | EngineError::MissingFuzzy(_) => EXIT_ENGINE,
        };
        AppError::new(exit_code, err.to_string())
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}
