//! Replica sync configuration.

use crate::error::SyncError;
use crate::Result;
use meridian_core::NodeId;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Prefix of the environment variables that override file settings.
pub const ENV_PREFIX: &str = "MERIDIAN_";

/// Settings for one replica.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Node this replica writes as
    pub node_id: NodeId,
    /// Peers contacted per gossip round
    pub fanout: usize,
    /// Largest snapshot accepted or produced, in bytes
    pub max_snapshot_bytes: usize,
    /// Round budget for reaching a gossip fixed point
    pub max_rounds: usize,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            node_id: NodeId::nil(),
            fanout: 3,
            max_snapshot_bytes: 16 * 1024 * 1024,
            max_rounds: 64,
        }
    }
}

impl SyncConfig {
    /// Defaults for `node_id`.
    pub fn for_node(node_id: NodeId) -> Self {
        Self {
            node_id,
            ..Self::default()
        }
    }

    /// Reject settings no replica can run with.
    pub fn validate(&self) -> Result<()> {
        if self.node_id.is_nil() {
            return Err(SyncError::config("node_id must not be nil"));
        }
        if self.fanout == 0 {
            return Err(SyncError::config("fanout must be at least 1"));
        }
        if self.max_snapshot_bytes == 0 {
            return Err(SyncError::config("max_snapshot_bytes must be positive"));
        }
        if self.max_rounds == 0 {
            return Err(SyncError::config("max_rounds must be at least 1"));
        }
        Ok(())
    }

    /// Parse and validate TOML.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text).map_err(|e| SyncError::config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read a TOML file, then apply `MERIDIAN_*` environment overrides.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| SyncError::config(format!("{}: {e}", path.display())))?;
        let config: Self = toml::from_str(&text).map_err(|e| SyncError::config(e.to_string()))?;
        let config = config.with_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from `lookup`, keyed by full variable name.
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        if let Some(value) = override_value(&lookup, "FANOUT")? {
            self.fanout = value;
        }
        if let Some(value) = override_value(&lookup, "MAX_SNAPSHOT_BYTES")? {
            self.max_snapshot_bytes = value;
        }
        if let Some(value) = override_value(&lookup, "MAX_ROUNDS")? {
            self.max_rounds = value;
        }
        Ok(self)
    }
}

fn override_value(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Result<Option<usize>> {
    let key = format!("{ENV_PREFIX}{name}");
    lookup(&key)
        .map(|raw| {
            raw.trim()
                .parse()
                .map_err(|e| SyncError::config(format!("{key}={raw}: {e}")))
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const NODE: &str = "00000000-0000-0000-0000-000000000007";

    #[test]
    fn defaults() {
        let config = SyncConfig::default();
        assert_eq!(config.fanout, 3);
        assert_eq!(config.max_snapshot_bytes, 16 * 1024 * 1024);
        assert_eq!(config.max_rounds, 64);
        assert!(config.validate().is_err(), "nil node must be rejected");
        assert!(SyncConfig::for_node(NodeId::from_u128(7)).validate().is_ok());
    }

    #[test]
    fn parses_partial_toml() {
        let config = SyncConfig::from_toml_str(&format!("node_id = \"{NODE}\"\nfanout = 5\n")).unwrap();
        assert_eq!(config.node_id, NodeId::from_u128(7));
        assert_eq!(config.fanout, 5);
        assert_eq!(config.max_rounds, 64);
    }

    #[test]
    fn rejects_invalid_toml() {
        assert!(matches!(
            SyncConfig::from_toml_str(&format!("node_id = \"{NODE}\"\nfanout = 0\n")),
            Err(SyncError::Config(_))
        ));
        assert!(matches!(
            SyncConfig::from_toml_str("fanout = \"many\""),
            Err(SyncError::Config(_))
        ));
    }

    #[test]
    fn env_overrides() {
        let env: HashMap<&str, &str> = [("MERIDIAN_FANOUT", "7"), ("MERIDIAN_MAX_ROUNDS", " 9 ")]
            .into_iter()
            .collect();
        let config = SyncConfig::for_node(NodeId::from_u128(7))
            .with_overrides(|key| env.get(key).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.fanout, 7);
        assert_eq!(config.max_rounds, 9);
        assert_eq!(config.max_snapshot_bytes, 16 * 1024 * 1024);

        let err = SyncConfig::default()
            .with_overrides(|key| (key == "MERIDIAN_FANOUT").then(|| "x".to_string()))
            .unwrap_err();
        assert!(err.to_string().contains("MERIDIAN_FANOUT"));
    }
}
