//! Node configuration loading and management.

use routewise_core::OracleConfig;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

/// Full configuration for the route oracle node.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct NodeConfig {
    /// API server settings.
    #[serde(default)]
    pub api: ApiConfig,

    /// Where the network graph comes from.
    #[serde(default)]
    pub graph: GraphConfig,

    /// Route computation settings.
    #[serde(default)]
    pub routing: OracleConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// API listen address.
    #[serde(default = "default_api_addr")]
    pub listen_addr: String,
    /// API port.
    #[serde(default = "default_api_port")]
    pub port: u16,
    /// Capacity of the queue between the API and the oracle event loop.
    #[serde(default = "default_queue_depth")]
    pub queue_depth: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphConfig {
    /// JSON graph snapshot, re-read whenever its modification time changes.
    #[serde(default = "default_snapshot_path")]
    pub snapshot_path: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (text, json).
    #[serde(default = "default_log_format")]
    pub format: String,
}

// Default value functions
fn default_api_addr() -> String {
    "127.0.0.1".into()
}
fn default_api_port() -> u16 {
    9835
}
fn default_queue_depth() -> usize {
    256
}
fn default_snapshot_path() -> PathBuf {
    PathBuf::from("./graph.json")
}
fn default_log_level() -> String {
    "info".into()
}
fn default_log_format() -> String {
    "text".into()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_api_addr(),
            port: default_api_port(),
            queue_depth: default_queue_depth(),
        }
    }
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            snapshot_path: default_snapshot_path(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl NodeConfig {
    /// Load config from a TOML file, falling back to defaults for missing fields.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            let config: NodeConfig = toml::from_str(&contents)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Save the current config to a TOML file.
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let contents = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// The socket address the HTTP API binds to.
    pub fn api_addr(&self) -> anyhow::Result<SocketAddr> {
        Ok(format!("{}:{}", self.api.listen_addr, self.api.port).parse()?)
    }

    pub fn json_logs(&self) -> bool {
        self.logging.format.eq_ignore_ascii_case("json")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = NodeConfig::default();
        assert_eq!(config.api.port, 9835);
        assert_eq!(config.graph.snapshot_path, PathBuf::from("./graph.json"));
        assert_eq!(config.routing.max_routes, 3);
        assert_eq!(config.logging.level, "info");
        assert!(!config.json_logs());
    }

    #[test]
    fn test_api_addr() {
        let config = NodeConfig::default();
        assert_eq!(config.api_addr().unwrap().to_string(), "127.0.0.1:9835");

        let mut bad = NodeConfig::default();
        bad.api.listen_addr = "not an address".into();
        assert!(bad.api_addr().is_err());
    }

    #[test]
    fn test_config_serialization_roundtrip() {
        let config = NodeConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize");
        let decoded: NodeConfig = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(decoded.api.port, config.api.port);
        assert_eq!(decoded.routing, config.routing);
    }

    #[test]
    fn test_config_load_nonexistent_uses_defaults() {
        let config = NodeConfig::load(Path::new("/nonexistent/routewise.toml")).unwrap();
        assert_eq!(config.api.port, 9835);
    }

    #[test]
    fn test_config_from_toml_partial() {
        let toml_str = r#"
[graph]
snapshot_path = "/var/lib/routewise/graph.json"

[routing]
max_hops = 4

[logging]
format = "json"
"#;
        let config: NodeConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(
            config.graph.snapshot_path,
            PathBuf::from("/var/lib/routewise/graph.json")
        );
        assert_eq!(config.routing.max_hops, 4);
        assert!(config.json_logs());
        // Defaults for unspecified
        assert_eq!(config.routing.final_cltv, 18);
        assert_eq!(config.api.queue_depth, 256);
    }
}
