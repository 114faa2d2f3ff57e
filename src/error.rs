//! Error types for the dashboard core.
//!
//! Only [`StreamError::Ended`] escapes the worker that detects it; every other
//! error is logged where it happens and dropped.

use thiserror::Error;
use tokio_tungstenite::tungstenite;

use crate::data::StreamKind;

/// A message payload that could not be turned into a batch.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The payload is not a JSON array of the stream's record type.
    #[error("malformed {kind} batch: {source}")]
    Malformed {
        kind: StreamKind,
        #[source]
        source: serde_json::Error,
    },
}

/// Failures on a live stream connection.
#[derive(Debug, Error)]
pub enum StreamError {
    /// The peer closed the stream or the transport failed while receiving.
    #[error("{kind} stream ended: {reason}")]
    Ended { kind: StreamKind, reason: String },

    /// The normal-closure frame could not be delivered.
    #[error("failed to send close frame on {kind} stream: {source}")]
    CloseSend {
        kind: StreamKind,
        #[source]
        source: tungstenite::Error,
    },

    /// The best-effort acknowledgment could not be delivered.
    #[error("failed to acknowledge {kind} batch: {source}")]
    AckSend {
        kind: StreamKind,
        #[source]
        source: tungstenite::Error,
    },
}

/// Invalid or unreadable settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(transparent)]
    Load(#[from] config::ConfigError),

    #[error("invalid duration for `{key}`: {value:?}")]
    Duration { key: &'static str, value: String },
}
