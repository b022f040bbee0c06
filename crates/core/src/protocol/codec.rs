//! Postcard serialization codec for wire messages
//!
//! Every logical message crosses the wire as one length-prefixed unit, so
//! one encode on the sender pairs with exactly one decode on the peer.

use crate::error::{CoreError, Result};
use postcard::{from_bytes, to_allocvec};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Maximum message size (16MB)
pub const MAX_MESSAGE_SIZE: usize = 16 * 1024 * 1024;

/// Message codec for serialization/deserialization
pub struct MessageCodec;

impl MessageCodec {
    /// Encode a wire message to bytes
    ///
    /// Returns Vec<u8> with length-prefixed format:
    /// [4 bytes length (big endian)] [message payload]
    pub fn encode<T: Serialize>(msg: &T) -> Result<Vec<u8>> {
        let payload = to_allocvec(msg).map_err(CoreError::from)?;

        // Limit message size
        if payload.len() > MAX_MESSAGE_SIZE {
            return Err(CoreError::MessageTooLarge {
                size: payload.len(),
                max: MAX_MESSAGE_SIZE,
            });
        }

        // Add length prefix (4 bytes, big endian)
        let len = payload.len() as u32;
        let mut buf = Vec::with_capacity(4 + payload.len());
        buf.extend_from_slice(&len.to_be_bytes());
        buf.extend_from_slice(&payload);

        Ok(buf)
    }

    /// Decode a wire message from bytes
    ///
    /// Expects length-prefixed format
    pub fn decode<T: DeserializeOwned>(buf: &[u8]) -> Result<T> {
        if buf.len() < 4 {
            return Err(CoreError::InvalidMessageFormat(
                "Buffer too small for length prefix".into(),
            ));
        }

        // Read length prefix
        let len = u32::from_be_bytes([buf[0], buf[1], buf[2], buf[3]]) as usize;

        // Validate length
        if len > MAX_MESSAGE_SIZE {
            return Err(CoreError::MessageTooLarge {
                size: len,
                max: MAX_MESSAGE_SIZE,
            });
        }

        if buf.len() < 4 + len {
            return Err(CoreError::InvalidMessageFormat(
                "Buffer too small for payload".into(),
            ));
        }

        // Deserialize payload
        let payload = &buf[4..4 + len];
        from_bytes(payload).map_err(CoreError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ClientMessage, Request, Response, ServerMessage};
    use std::collections::BTreeMap;

    #[test]
    fn test_encode_decode_roundtrip() {
        let msg = ClientMessage::Request(Request::sync("alice"));
        let encoded = MessageCodec::encode(&msg).unwrap();
        let decoded: ClientMessage = MessageCodec::decode(&encoded).unwrap();
        assert_eq!(msg, decoded);
    }

    #[test]
    fn test_response_roundtrip() {
        let msg = ServerMessage::Response(Response {
            message: "ok".to_string(),
            collection_snapshot: Some(BTreeMap::new()),
        });
        let encoded = MessageCodec::encode(&msg).unwrap();
        let decoded: ServerMessage = MessageCodec::decode(&encoded).unwrap();
        assert_eq!(msg, decoded);
    }

    #[test]
    fn test_length_prefix_matches_payload() {
        let msg = ClientMessage::Request(Request::sync("bob"));
        let encoded = MessageCodec::encode(&msg).unwrap();
        let len = u32::from_be_bytes([encoded[0], encoded[1], encoded[2], encoded[3]]) as usize;
        assert_eq!(len + 4, encoded.len());
    }

    #[test]
    fn test_invalid_buffer() {
        let result: Result<ClientMessage> = MessageCodec::decode(&[1, 2, 3]);
        assert!(result.is_err());
    }

    #[test]
    fn test_truncated_payload() {
        let msg = ClientMessage::Request(Request::sync("alice"));
        let encoded = MessageCodec::encode(&msg).unwrap();
        let result: Result<ClientMessage> = MessageCodec::decode(&encoded[..encoded.len() - 1]);
        assert!(matches!(result, Err(CoreError::InvalidMessageFormat(_))));
    }

    #[test]
    fn test_oversized_length_prefix_rejected() {
        let mut buf = Vec::new();
        buf.extend_from_slice(&(MAX_MESSAGE_SIZE as u32 + 1).to_be_bytes());
        buf.extend_from_slice(&[0u8; 16]);
        let result: Result<ClientMessage> = MessageCodec::decode(&buf);
        assert!(matches!(result, Err(CoreError::MessageTooLarge { .. })));
    }
}
