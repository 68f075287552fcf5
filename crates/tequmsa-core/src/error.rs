//! Error types for Tequmsa

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid frequency: {value} Hz ({reason})")]
    InvalidFrequency { value: f64, reason: String },

    #[error("invalid argument: {name} - {message}")]
    InvalidArgument { name: String, message: String },

    #[error("unknown consciousness level: {0}")]
    UnknownLevel(String),

    #[error("unknown planet: {0}")]
    UnknownPlanet(String),

    #[error("subsystems offline: {}", .0.join(", "))]
    SubsystemsOffline(Vec<String>),

    #[error("authentication failed: {reason}")]
    AuthFailed { reason: String },

    #[error("config error: {0}")]
    ConfigError(String),

    #[error("io error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn invalid_frequency(value: f64, reason: impl Into<String>) -> Self {
        Self::InvalidFrequency {
            value,
            reason: reason.into(),
        }
    }

    pub fn invalid_argument(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            name: name.into(),
            message: message.into(),
        }
    }

    pub fn auth_failed(reason: impl Into<String>) -> Self {
        Self::AuthFailed {
            reason: reason.into(),
        }
    }

    /// True for errors caused by caller input rather than engine state.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Error::InvalidFrequency { .. }
                | Error::InvalidArgument { .. }
                | Error::UnknownLevel(_)
                | Error::UnknownPlanet(_)
        )
    }
}

/// Require a finite, strictly positive frequency.
pub fn ensure_positive_frequency(value: f64) -> Result<f64> {
    if !value.is_finite() {
        return Err(Error::invalid_frequency(value, "not finite"));
    }
    if value <= 0.0 {
        return Err(Error::invalid_frequency(value, "must be positive"));
    }
    Ok(value)
}
