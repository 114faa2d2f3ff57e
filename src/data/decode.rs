//! Payload decoding for the three stream kinds.

use serde::de::DeserializeOwned;

use super::records::{Batch, StreamKind};
use crate::error::DecodeError;

/// Decode one message payload into a batch for `kind`.
///
/// The payload must be a JSON array of the stream's record type. A JSON
/// `null` is read as an empty batch, which is what the server sends when a
/// window has no entries.
pub fn decode(kind: StreamKind, payload: &[u8]) -> Result<Batch, DecodeError> {
    let batch = match kind {
        StreamKind::Scores => Batch::Scores(parse_array(kind, payload)?),
        StreamKind::Alerts => Batch::Alerts(parse_array(kind, payload)?),
        StreamKind::HitRate => Batch::HitRate(parse_array(kind, payload)?),
    };
    Ok(batch)
}

fn parse_array<T: DeserializeOwned>(
    kind: StreamKind,
    payload: &[u8],
) -> Result<Vec<T>, DecodeError> {
    serde_json::from_slice::<Option<Vec<T>>>(payload)
        .map(Option::unwrap_or_default)
        .map_err(|source| DecodeError::Malformed { kind, source })
}
