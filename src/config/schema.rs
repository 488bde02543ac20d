//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

use crate::blockchain::types::{Cluster, CommitmentLevel};
use crate::blockchain::wallet::KEYPAIR_ENV_VAR;

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct TransferConfig {
    /// Cluster connection settings.
    pub network: NetworkConfig,

    /// Block explorer used for success links.
    pub explorer: ExplorerConfig,

    /// Where the signing keypair comes from.
    pub wallet: WalletConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Cluster connection configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// JSON-RPC endpoint URL.
    pub rpc_url: String,

    /// Failover JSON-RPC endpoint URLs.
    pub failover_urls: Vec<String>,

    /// Cluster name, used for explorer links.
    pub cluster: Cluster,

    /// Commitment for blockhash queries and preflight simulation.
    pub commitment: CommitmentLevel,

    /// RPC request timeout in seconds.
    pub rpc_timeout_secs: u64,

    /// How long to wait for a transaction to reach the requested commitment.
    pub confirm_timeout_secs: u64,

    /// Interval between signature status polls in milliseconds.
    pub poll_interval_ms: u64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            rpc_url: "https://api.devnet.solana.com".to_string(),
            failover_urls: Vec::new(),
            cluster: Cluster::Devnet,
            commitment: CommitmentLevel::Processed,
            rpc_timeout_secs: 10,
            confirm_timeout_secs: 60,
            poll_interval_ms: 500,
        }
    }
}

/// Block explorer configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ExplorerConfig {
    /// Explorer base URL, without trailing path.
    pub base_url: String,
}

impl Default for ExplorerConfig {
    fn default() -> Self {
        Self {
            base_url: "https://explorer.solana.com".to_string(),
        }
    }
}

/// Keypair source configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct WalletConfig {
    /// Environment variable holding the keypair.
    pub keypair_env_var: String,

    /// Optional keypair file; takes precedence over the environment.
    pub keypair_path: Option<String>,
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            keypair_env_var: KEYPAIR_ENV_VAR.to_string(),
            keypair_path: None,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Emit logs as JSON lines.
    pub json_logs: bool,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = TransferConfig::default();
        assert_eq!(config.network.cluster, Cluster::Devnet);
        assert_eq!(config.network.commitment, CommitmentLevel::Processed);
        assert_eq!(config.network.rpc_timeout_secs, 10);
        assert_eq!(config.wallet.keypair_env_var, "TRANSFER_WALLET_KEYPAIR");
        assert!(!config.observability.metrics_enabled);
    }

    #[test]
    fn test_partial_toml() {
        let config: TransferConfig = toml::from_str(
            r#"
            [network]
            rpc_url = "http://127.0.0.1:8899"
            cluster = "mainnet-beta"
            commitment = "confirmed"
            "#,
        )
        .unwrap();
        assert_eq!(config.network.rpc_url, "http://127.0.0.1:8899");
        assert_eq!(config.network.cluster, Cluster::MainnetBeta);
        assert_eq!(config.network.commitment, CommitmentLevel::Confirmed);
        assert_eq!(config.network.poll_interval_ms, 500);
        assert_eq!(config.explorer.base_url, "https://explorer.solana.com");
    }

    #[test]
    fn test_unknown_cluster_rejected() {
        let result: Result<TransferConfig, _> = toml::from_str("[network]\ncluster = \"moonnet\"");
        assert!(result.is_err());
    }
}
