//! Error types surfaced by the engine and the transports

use std::fmt;

use thiserror::Error;

/// Classification of a failed call against the generation service
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportErrorKind {
    /// Connection, DNS, TLS or timeout failure before a response arrived
    Network,
    /// The service rejected the credential
    Auth,
    /// The service throttled the request
    RateLimit,
    /// Any other non-success status or an undecodable body
    Other,
}

impl fmt::Display for TransportErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Network => write!(f, "network"),
            Self::Auth => write!(f, "auth"),
            Self::RateLimit => write!(f, "rate_limit"),
            Self::Other => write!(f, "other"),
        }
    }
}

/// A single failed transport attempt
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} error: {message}")]
pub struct TransportError {
    pub kind: TransportErrorKind,
    pub message: String,
}

impl TransportError {
    pub fn new(kind: TransportErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::Network, message)
    }

    pub fn auth(message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::Auth, message)
    }

    pub fn rate_limit(message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::RateLimit, message)
    }

    pub fn other(message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::Other, message)
    }
}

/// Failures of the enhance, hooks and verify operations.
///
/// Every variant is distinct so a caller can present a different message
/// for each one.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("Post text is empty")]
    EmptyInput,

    #[error("API key not configured")]
    MissingCredential,

    #[error("generation request failed: {0}")]
    Transport(#[from] TransportError),

    #[error("the model returned no usable text")]
    EmptyGeneration,

    #[error("failed to parse hooks response")]
    UnparseableHooks,

    #[error("API key verification failed: {reason}")]
    VerificationFailed { reason: String },
}

impl EngineError {
    /// Transport classification, if this error came from the network call
    pub fn transport_kind(&self) -> Option<TransportErrorKind> {
        match self {
            Self::Transport(e) => Some(e.kind),
            _ => None,
        }
    }
}
