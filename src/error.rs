//! Error taxonomy for the routing engine
//!
//! Distinguishes configuration errors (bad config, fatal to startup) from
//! caller bugs (resolving an identity that was never registered). Evaluation
//! faults inside matchers are never surfaced here; the matcher engine recovers
//! locally and logs.

use thiserror::Error;

/// Main error type for routing operations
#[derive(Debug, Error)]
pub enum RouterError {
    /// `resolve` was called for an identity with no registered definition.
    /// This indicates a caller bug, not a bad configuration.
    #[error("identity '{identity}' is not registered")]
    UnregisteredIdentity { identity: String },

    #[error("configuration error: {0}")]
    ConfigError(#[from] crate::config::ConfigError),

    /// Configuration failed semantic validation and must not be activated.
    #[error("configuration rejected: {error_count} validation error(s)")]
    ValidationFailed { error_count: usize },

    #[error("routing error: {message}")]
    RoutingError { message: String },
}

impl RouterError {
    /// Create an unregistered-identity error
    pub fn unregistered<S: Into<String>>(identity: S) -> Self {
        Self::UnregisteredIdentity {
            identity: identity.into(),
        }
    }

    /// Create a generic routing error
    pub fn routing<S: Into<String>>(message: S) -> Self {
        Self::RoutingError {
            message: message.into(),
        }
    }
}

/// Result type for routing operations
pub type RouterResult<T> = Result<T, RouterError>;
