//! Configuration error types.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Errors raised while loading or validating wheel / simulation configuration.
///
/// The per-tick model never fails; only configuration can be rejected.
#[derive(Debug)]
pub enum ConfigError {
    /// Config file could not be read.
    Io { path: PathBuf, source: io::Error },
    /// Config text is not valid JSON for the expected shape.
    Json(serde_json::Error),
    /// A scalar parameter is outside its valid range.
    OutOfRange {
        field: &'static str,
        value: f32,
        expected: &'static str,
    },
    /// Two parameters disagree with each other.
    Inconsistent {
        field: &'static str,
        reason: String,
    },
    /// A friction curve has an invalid key.
    InvalidCurve {
        field: &'static str,
        reason: String,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io { path, source } => {
                write!(f, "failed to read {}: {}", path.display(), source)
            }
            ConfigError::Json(e) => write!(f, "invalid config JSON: {}", e),
            ConfigError::OutOfRange { field, value, expected } => {
                write!(f, "{} must be {}, got {}", field, expected, value)
            }
            ConfigError::Inconsistent { field, reason } => write!(f, "{}: {}", field, reason),
            ConfigError::InvalidCurve { field, reason } => {
                write!(f, "{} curve is invalid: {}", field, reason)
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io { source, .. } => Some(source),
            ConfigError::Json(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        ConfigError::Json(e)
    }
}
