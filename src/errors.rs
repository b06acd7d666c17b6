//! Observe Subsystem Error Hierarchy
//!
//! Defines the error types raised by the observe core, categorized by
//! integration failures (bad arguments, illegal state transitions) and
//! ambient concerns (configuration, metrics).

use config::ConfigError;

use crate::KeyToken;

#[doc(hidden)]
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Observe relation lifecycle failures
    #[error(transparent)]
    Observe(#[from] ObserveError),

    /// Configuration loading failures
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Configuration validation failures
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    /// Metrics registration or encoding failures
    #[error("Metrics error: {0}")]
    Metrics(String),
}

#[derive(Debug, thiserror::Error)]
pub enum ObserveError {
    /// Integration error detected while constructing observe types.
    /// Never retried.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Relation was canceled before it could be established
    #[error("Could not establish observe relation {key} with {uri}, already canceled!")]
    AlreadyCanceled { key: KeyToken, uri: String },

    /// Observing endpoint may be bound only once
    #[error("Observe relation {key} is already bound to endpoint {address}")]
    EndpointAlreadyBound {
        key: KeyToken,
        address: std::net::SocketAddr,
    },
}

impl ObserveError {
    /// Returns `true` for the illegal-state class of failures, which callers
    /// treat as "the response raced with a cancellation".
    pub fn is_illegal_state(&self) -> bool {
        matches!(
            self,
            ObserveError::AlreadyCanceled { .. } | ObserveError::EndpointAlreadyBound { .. }
        )
    }
}

impl From<prometheus::Error> for Error {
    fn from(err: prometheus::Error) -> Self {
        Error::Metrics(err.to_string())
    }
}
