use thiserror::Error;

/// Result type alias using ExkindError
pub type Result<T> = std::result::Result<T, ExkindError>;

/// Failures of the few fallible surfaces around the exception factory
///
/// Defining kinds, constructing exceptions and rendering messages never fail;
/// those paths degrade to a best-effort string instead. This type covers
/// configuration input, snapshot (de)serialization and the structured
/// argument encoder, whose failure callers recover from locally.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExkindError {
    /// Configuration text or override is invalid
    #[error("Invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    /// Serialization error (JSON/TOML encoding or decoding)
    #[error("Serialization error: {message}")]
    Serialization { message: String },

    /// A shared argument refers back to itself
    #[error("Circular structure at {path}")]
    CircularStructure { path: String },
}

impl ExkindError {
    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        match self {
            ExkindError::InvalidConfig { .. } => "ERR_INVALID_CONFIG",
            ExkindError::Serialization { .. } => "ERR_SERIALIZATION",
            ExkindError::CircularStructure { .. } => "ERR_CIRCULAR_STRUCTURE",
        }
    }
}

impl From<serde_json::Error> for ExkindError {
    fn from(err: serde_json::Error) -> Self {
        ExkindError::Serialization {
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for ExkindError {
    fn from(err: toml::de::Error) -> Self {
        ExkindError::InvalidConfig {
            reason: err.to_string(),
        }
    }
}
