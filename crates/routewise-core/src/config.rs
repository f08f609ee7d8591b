use serde::{Deserialize, Serialize};

/// Knobs for route computation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OracleConfig {
    /// Maximum number of hops in a single route.
    pub max_hops: u32,
    /// Maximum number of candidate routes returned per query.
    pub max_routes: usize,
    /// CLTV delta required by the final recipient.
    pub final_cltv: u32,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            max_hops: 20,
            max_routes: 3,
            final_cltv: 18,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: OracleConfig = serde_json::from_str(r#"{"max_hops": 5}"#).unwrap();
        assert_eq!(config.max_hops, 5);
        assert_eq!(config.max_routes, 3);
        assert_eq!(config.final_cltv, 18);
    }
}
