use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    /// Hop count stamped on advertisements this node originates.
    pub initial_hop_count: u8,
    pub receive_timeout_ms: u64,
    pub dynamic_interval_secs: u64,
    /// Injected cost changes are drawn from `-jitter..=jitter`.
    pub dynamic_cost_jitter: u32,
    pub minimum_cost: u32,
    /// Mirror every accepted link into the reverse direction.
    pub undirected: bool,
    pub startup_delay_ms: u64,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            initial_hop_count: 6,
            receive_timeout_ms: 100,
            dynamic_interval_secs: 5,
            dynamic_cost_jitter: 4,
            minimum_cost: 1,
            undirected: true,
            startup_delay_ms: 0,
        }
    }
}

impl NodeConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        let config: NodeConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.initial_hop_count == 0 {
            return Err(ConfigError::Invalid {
                field: "initial_hop_count",
                reason: "advertisements with hop count 0 are never flooded".to_string(),
            });
        }
        if self.receive_timeout_ms == 0 {
            return Err(ConfigError::Invalid {
                field: "receive_timeout_ms",
                reason: "must be positive".to_string(),
            });
        }
        if self.dynamic_interval_secs == 0 {
            return Err(ConfigError::Invalid {
                field: "dynamic_interval_secs",
                reason: "must be positive".to_string(),
            });
        }
        Ok(())
    }

    pub fn receive_timeout(&self) -> Duration {
        Duration::from_millis(self.receive_timeout_ms)
    }

    pub fn dynamic_interval(&self) -> Duration {
        Duration::from_secs(self.dynamic_interval_secs)
    }

    pub fn startup_delay(&self) -> Duration {
        Duration::from_millis(self.startup_delay_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_reference_timing() {
        let config = NodeConfig::default();
        assert_eq!(config.initial_hop_count, 6);
        assert_eq!(config.receive_timeout(), Duration::from_millis(100));
        assert_eq!(config.dynamic_interval(), Duration::from_secs(5));
        assert!(config.undirected);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("node.json");
        fs::write(&path, r#"{ "initial_hop_count": 3, "undirected": false }"#).unwrap();

        let config = NodeConfig::load(&path).unwrap();
        assert_eq!(config.initial_hop_count, 3);
        assert!(!config.undirected);
        assert_eq!(config.receive_timeout_ms, 100);
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("node.json");
        let config = NodeConfig {
            dynamic_cost_jitter: 2,
            ..NodeConfig::default()
        };
        config.save(&path).unwrap();
        assert_eq!(NodeConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn test_zero_hop_count_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("node.json");
        fs::write(&path, r#"{ "initial_hop_count": 0 }"#).unwrap();

        match NodeConfig::load(&path) {
            Err(ConfigError::Invalid { field, .. }) => assert_eq!(field, "initial_hop_count"),
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
