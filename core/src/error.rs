//! Error taxonomy for the study API client.
//!
//! # Design
//! Four failure classes, one variant each: transport failures propagate
//! unchanged from the injected fetch, generic API errors carry the raw
//! `detail` payload, validation errors carry the synthesized multi-line
//! message, and (de)serialization failures carry the serde message. JSON
//! parse failures on response bodies are *not* errors; the dispatcher
//! degrades them to an empty payload.

use thiserror::Error;

/// A network-level failure inside the injected transport (offline, DNS,
/// connection reset). Never produced for non-2xx statuses.
#[derive(Debug, Clone, Error)]
#[error("transport failure: {message}")]
pub struct TransportError {
    pub message: String,
}

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Errors surfaced by the dispatcher and normalizer.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The network call itself failed. No automatic retry.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The server returned status >= 400 with a non-validation payload.
    /// Carries the raw `detail` string when the server sent one.
    #[error("API error {status}: {}", .detail.as_deref().unwrap_or("no detail"))]
    Api { status: u16, detail: Option<String> },

    /// A 422 with the structured validation shape. `message` holds one
    /// `Error at <loc>: <msg>` line per field violation.
    #[error("{message}")]
    Validation { status: u16, message: String },

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// A success payload could not be decoded into the expected type.
    #[error("deserialization failed: {0}")]
    Deserialization(String),
}

impl ApiError {
    /// Human-readable detail for display, mirroring how callers pick an
    /// error message: the payload's detail if present, else `None` so the
    /// caller can substitute its own default.
    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::Api { detail, .. } => detail.as_deref(),
            Self::Validation { message, .. } => Some(message),
            _ => None,
        }
    }
}

/// The shared failure handed to every awaiter of a coalesced cache load.
///
/// Kept clonable (and therefore message-only) so a single failed fetch can
/// fail all concurrent callers with the same value.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct LoadError {
    pub message: String,
}

impl LoadError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
