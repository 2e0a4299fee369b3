//! Codec trait and implementations for serializing events.
//!
//! The transport carries opaque frames; a codec turns typed events into
//! those frames and back. [`JsonCodec`] is the default — the browser
//! client reads it natively and it is trivial to inspect in DevTools.
//! A binary codec can slot in later without touching other layers.

use serde::{Serialize, de::DeserializeOwned};

use crate::ProtocolError;

/// Encodes Rust values to bytes and decodes bytes back.
///
/// `Send + Sync + 'static` because one codec instance is shared across
/// every connection handler task.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into bytes.
    ///
    /// # Errors
    /// Returns [`ProtocolError::Encode`] if serialization fails.
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes bytes back into a value.
    ///
    /// # Errors
    /// Returns [`ProtocolError::Decode`] if the bytes are malformed or
    /// don't match the expected shape.
    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError>;
}

/// A [`Codec`] backed by `serde_json`.
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}

#[cfg(all(test, feature = "json"))]
mod tests {
    use super::*;
    use crate::{ClientEvent, ServerEvent, Username};

    #[test]
    fn test_json_codec_round_trips_client_events() {
        let codec = JsonCodec;
        let ev = ClientEvent::Chat {
            text: "hi there".into(),
        };
        let bytes = codec.encode(&ev).unwrap();
        let back: ClientEvent = codec.decode(&bytes).unwrap();
        assert_eq!(back, ev);
    }

    #[test]
    fn test_json_codec_round_trips_server_events() {
        let codec = JsonCodec;
        let ev = ServerEvent::PlayerLeft {
            username: Username::new("carol"),
        };
        let bytes = codec.encode(&ev).unwrap();
        let back: ServerEvent = codec.decode(&bytes).unwrap();
        assert_eq!(back, ev);
    }

    #[test]
    fn test_json_codec_decode_garbage_returns_error() {
        let codec = JsonCodec;
        let result: Result<ClientEvent, _> = codec.decode(b"not json");
        assert!(matches!(result, Err(ProtocolError::Decode(_))));
    }
}
