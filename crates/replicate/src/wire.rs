//! CBOR encoding of replicated events for transport.

use crate::event::ReplicatedEvent;

#[derive(Debug, thiserror::Error)]
pub enum WireError {
    #[error("encode failed: {0}")]
    Encode(String),
    #[error("decode failed: {0}")]
    Decode(String),
}

/// Serialize an event to CBOR.
pub fn encode_event(event: &ReplicatedEvent) -> Result<Vec<u8>, WireError> {
    let mut bytes = Vec::new();
    ciborium::ser::into_writer(event, &mut bytes).map_err(|e| WireError::Encode(e.to_string()))?;
    Ok(bytes)
}

/// Parse an event encoded by [`encode_event`].
pub fn decode_event(bytes: &[u8]) -> Result<ReplicatedEvent, WireError> {
    ciborium::de::from_reader(bytes).map_err(|e| WireError::Decode(e.to_string()))
}
