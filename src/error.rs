//! Error types and handling for epex-imbalance
//!
//! Errors are only surfaced by configuration loading, logging setup and the
//! inner `try_*` fetch helpers. A poll cycle itself never returns an error:
//! the fetchers fold every failure into their fallback value.

use thiserror::Error;

/// Result type alias for epex-imbalance operations
pub type Result<T> = std::result::Result<T, EpexError>;

/// Main error type for epex-imbalance
#[derive(Debug, Error)]
pub enum EpexError {
    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Validation errors
    #[error("Validation error: {field} - {message}")]
    Validation { field: String, message: String },

    /// File I/O errors
    #[error("I/O error: {message}")]
    Io { message: String },

    /// Serialization/deserialization errors
    #[error("Serialization error: {message}")]
    Serialization { message: String },

    /// Transport failures (connect, DNS, HTTP status)
    #[error("Network error: {message}")]
    Network { message: String },

    /// Request exceeded the configured timeout
    #[error("Timeout error: {message}")]
    Timeout { message: String },

    /// Malformed JSON, HTML or number
    #[error("Parse error: {message}")]
    Parse { message: String },

    /// No time window contains now, or the dataset returned no results
    #[error("No match: {message}")]
    NoMatch { message: String },

    /// HTTP server errors
    #[error("Web server error: {message}")]
    Web { message: String },
}

impl EpexError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(field: S, message: S) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a new I/O error
    pub fn io<S: Into<String>>(message: S) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    /// Create a new network error
    pub fn network<S: Into<String>>(message: S) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    /// Create a new timeout error
    pub fn timeout<S: Into<String>>(message: S) -> Self {
        Self::Timeout {
            message: message.into(),
        }
    }

    /// Create a new parse error
    pub fn parse<S: Into<String>>(message: S) -> Self {
        Self::Parse {
            message: message.into(),
        }
    }

    /// Create a new no-match error
    pub fn no_match<S: Into<String>>(message: S) -> Self {
        Self::NoMatch {
            message: message.into(),
        }
    }

    /// Create a new web error
    pub fn web<S: Into<String>>(message: S) -> Self {
        Self::Web {
            message: message.into(),
        }
    }

    /// Short classification used in log lines
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Config { .. } => "config",
            Self::Validation { .. } => "validation",
            Self::Io { .. } => "io",
            Self::Serialization { .. } => "serialization",
            Self::Network { .. } => "transport",
            Self::Timeout { .. } => "timeout",
            Self::Parse { .. } => "parse",
            Self::NoMatch { .. } => "no_match",
            Self::Web { .. } => "web",
        }
    }
}

impl From<std::io::Error> for EpexError {
    fn from(err: std::io::Error) -> Self {
        Self::io(err.to_string())
    }
}

impl From<serde_yaml::Error> for EpexError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::Serialization {
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for EpexError {
    fn from(err: serde_json::Error) -> Self {
        Self::parse(err.to_string())
    }
}

impl From<reqwest::Error> for EpexError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::timeout(err.to_string())
        } else if err.is_decode() {
            Self::parse(err.to_string())
        } else {
            Self::network(err.to_string())
        }
    }
}

impl From<chrono::ParseError> for EpexError {
    fn from(err: chrono::ParseError) -> Self {
        Self::parse(format!("time: {err}"))
    }
}

impl From<std::num::ParseFloatError> for EpexError {
    fn from(err: std::num::ParseFloatError) -> Self {
        Self::parse(format!("number: {err}"))
    }
}
