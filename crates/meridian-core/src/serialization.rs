//! Canonical encodings for metadata snapshots
//!
//! Binary encoding uses `bincode` and is what snapshots are stored and
//! exchanged as. JSON is for operator tooling and debugging only.

use crate::errors::MetadataError;
use crate::Result;
use serde::{de::DeserializeOwned, Serialize};

/// Serialize any serde-compatible type to canonical binary bytes
pub fn to_vec<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    bincode::serialize(value)
        .map_err(|e| MetadataError::serialization(format!("Failed to encode: {e}")))
}

/// Deserialize canonical binary bytes
pub fn from_slice<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    bincode::deserialize(bytes)
        .map_err(|e| MetadataError::serialization(format!("Failed to decode: {e}")))
}

/// Render as pretty-printed JSON
pub fn to_json<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value)
        .map_err(|e| MetadataError::serialization(format!("Failed to render JSON: {e}")))
}

/// Parse from JSON
pub fn from_json<T: DeserializeOwned>(text: &str) -> Result<T> {
    serde_json::from_str(text)
        .map_err(|e| MetadataError::serialization(format!("Invalid JSON: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{NodeId, VectorClock};

    #[test]
    fn clock_survives_binary_encoding() {
        let clock = VectorClock::single(NodeId::from_u128(9)).incremented(NodeId::from_u128(3));
        let bytes = to_vec(&clock).unwrap();
        let decoded: VectorClock = from_slice(&bytes).unwrap();
        assert_eq!(clock, decoded);
    }

    #[test]
    fn truncated_bytes_are_rejected() {
        let clock = VectorClock::single(NodeId::from_u128(9));
        let bytes = to_vec(&clock).unwrap();
        let err = from_slice::<VectorClock>(&bytes[..bytes.len() - 1]).unwrap_err();
        assert!(matches!(err, MetadataError::Serialization { .. }));
    }

    #[test]
    fn json_uses_node_ids_as_keys() {
        let node = NodeId::from_u128(1);
        let json = to_json(&VectorClock::single(node)).unwrap();
        assert!(json.contains(&node.to_string()));
    }
}
