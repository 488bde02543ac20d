//! JSON-RPC client with timeout and error handling.
//!
//! # Responsibilities
//! - Connect to one primary and any number of failover RPC endpoints
//! - Query chain state (health, blockhash, balances, signature statuses)
//! - Broadcast signed transactions
//! - Handle timeouts and network errors gracefully

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use tokio::time::timeout;

use crate::blockchain::types::{
    BlockchainError, BlockchainResult, Hash, NetworkConfig, Pubkey, Signature, SignatureStatus,
};
use crate::observability::metrics;

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
struct RpcResponse<T> {
    result: Option<T>,
    error: Option<RpcErrorObject>,
}

/// Responses wrapped in `{ context: { slot }, value }`.
#[derive(Debug, Deserialize)]
struct Contextual<T> {
    value: T,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LatestBlockhash {
    blockhash: String,
    last_valid_block_height: u64,
}

/// Failure of a single endpoint: either the transport failed, in which case
/// the next endpoint is tried, or the node answered with an error.
enum CallError {
    Transport(String),
    Node(BlockchainError),
}

/// JSON-RPC client wrapper with failover support.
#[derive(Clone)]
pub struct BlockchainClient {
    /// Endpoints (primary + failovers).
    endpoints: Vec<url::Url>,
    http: reqwest::Client,
    config: NetworkConfig,
    timeout_duration: Duration,
}

impl BlockchainClient {
    /// Create a new client.
    ///
    /// Fails if the primary RPC URL is malformed or the poll interval is
    /// zero; failover URLs that do not parse are skipped with a warning.
    pub fn new(config: NetworkConfig) -> BlockchainResult<Self> {
        if config.poll_interval_ms == 0 {
            return Err(BlockchainError::Rpc(
                "Poll interval must be greater than zero".to_string(),
            ));
        }

        let timeout_duration = Duration::from_secs(config.rpc_timeout_secs);
        let mut endpoints = Vec::new();

        let primary: url::Url = config.rpc_url.parse().map_err(|e| {
            BlockchainError::Rpc(format!("Invalid RPC URL '{}': {}", config.rpc_url, e))
        })?;
        endpoints.push(primary);

        for url_str in &config.failover_urls {
            match url_str.parse() {
                Ok(url) => endpoints.push(url),
                Err(_) => tracing::warn!(url = %url_str, "Ignoring invalid failover RPC URL"),
            }
        }

        tracing::info!(
            rpc_url = %config.rpc_url,
            failovers = endpoints.len() - 1,
            cluster = ?config.cluster,
            "RPC client initialized"
        );

        Ok(Self {
            endpoints,
            http: reqwest::Client::new(),
            config,
            timeout_duration,
        })
    }

    async fn call_endpoint<T: DeserializeOwned>(
        &self,
        endpoint: &url::Url,
        method: &str,
        params: &Value,
    ) -> Result<T, CallError> {
        let body = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params,
        });

        let response = self
            .http
            .post(endpoint.clone())
            .json(&body)
            .send()
            .await
            .map_err(|e| CallError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(CallError::Transport(format!("HTTP status {}", status)));
        }

        let parsed: RpcResponse<T> = response
            .json()
            .await
            .map_err(|e| CallError::Transport(format!("Malformed response: {}", e)))?;

        if let Some(err) = parsed.error {
            return Err(CallError::Node(BlockchainError::RpcResponse {
                method: method.to_string(),
                code: err.code,
                message: err.message,
            }));
        }
        parsed
            .result
            .ok_or_else(|| CallError::Transport("Response carries neither result nor error".to_string()))
    }

    /// Issue a JSON-RPC call, trying each endpoint in order.
    ///
    /// Returns `Timeout` when every endpoint timed out.
    async fn call<T: DeserializeOwned>(&self, method: &str, params: Value) -> BlockchainResult<T> {
        let mut all_timed_out = true;
        for (i, endpoint) in self.endpoints.iter().enumerate() {
            let fut = self.call_endpoint::<T>(endpoint, method, &params);
            match timeout(self.timeout_duration, fut).await {
                Ok(Ok(result)) => return Ok(result),
                Ok(Err(CallError::Node(e))) => return Err(e),
                Ok(Err(CallError::Transport(e))) => {
                    all_timed_out = false;
                    tracing::warn!(provider_idx = i, method, error = %e, "RPC error, trying next provider");
                }
                Err(_) => {
                    tracing::warn!(provider_idx = i, method, "RPC timeout, trying next provider");
                }
            }
        }
        if all_timed_out {
            return Err(BlockchainError::Timeout(self.config.rpc_timeout_secs));
        }
        Err(BlockchainError::Rpc(format!(
            "All RPC providers failed for {}",
            method
        )))
    }

    /// Ask the node whether it considers itself healthy.
    pub async fn get_health(&self) -> BlockchainResult<String> {
        self.call("getHealth", json!([])).await
    }

    /// Check if the cluster is reachable and healthy.
    pub async fn is_healthy(&self) -> bool {
        let healthy = matches!(self.get_health().await.as_deref(), Ok("ok"));
        metrics::record_backend_health("solana_rpc", healthy);
        healthy
    }

    /// Fetch a recent blockhash and the last block height it stays valid for.
    pub async fn get_latest_blockhash(&self) -> BlockchainResult<(Hash, u64)> {
        let response: Contextual<LatestBlockhash> = self
            .call(
                "getLatestBlockhash",
                json!([{ "commitment": self.config.commitment.as_str() }]),
            )
            .await?;
        let hash = response.value.blockhash.parse()?;
        Ok((hash, response.value.last_valid_block_height))
    }

    /// Get the balance of an account in lamports.
    pub async fn get_balance(&self, address: &Pubkey) -> BlockchainResult<u64> {
        let response: Contextual<u64> = self
            .call(
                "getBalance",
                json!([address.to_string(), { "commitment": self.config.commitment.as_str() }]),
            )
            .await?;
        Ok(response.value)
    }

    /// Broadcast a signed, serialized transaction.
    ///
    /// Returns the signature reported by the node.
    pub async fn send_transaction(&self, wire: &[u8]) -> BlockchainResult<Signature> {
        let encoded = BASE64.encode(wire);
        let signature: String = self
            .call(
                "sendTransaction",
                json!([encoded, {
                    "encoding": "base64",
                    "preflightCommitment": self.config.commitment.as_str(),
                }]),
            )
            .await?;
        signature.parse()
    }

    /// Look up the status of submitted transactions.
    ///
    /// Entries are `None` for signatures the node has not seen.
    pub async fn get_signature_statuses(
        &self,
        signatures: &[Signature],
    ) -> BlockchainResult<Vec<Option<SignatureStatus>>> {
        let encoded: Vec<String> = signatures.iter().map(|s| s.to_string()).collect();
        let response: Contextual<Vec<Option<SignatureStatus>>> = self
            .call(
                "getSignatureStatuses",
                json!([encoded, { "searchTransactionHistory": false }]),
            )
            .await?;
        Ok(response.value)
    }

    /// Get the configuration.
    pub fn config(&self) -> &NetworkConfig {
        &self.config
    }
}

impl std::fmt::Debug for BlockchainClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlockchainClient")
            .field("rpc_url", &self.config.rpc_url)
            .field("cluster", &self.config.cluster)
            .field("timeout_secs", &self.config.rpc_timeout_secs)
            .finish()
    }
}
