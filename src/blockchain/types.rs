//! Chain-specific types and error definitions.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

// Re-export NetworkConfig from config module to avoid duplication
pub use crate::config::schema::NetworkConfig;

/// Number of lamports in one SOL.
pub const LAMPORTS_PER_SOL: u64 = 1_000_000_000;

/// Errors that can occur during blockchain operations.
#[derive(Debug, Error)]
pub enum BlockchainError {
    /// RPC connection or request failed.
    #[error("RPC error: {0}")]
    Rpc(String),

    /// The node answered with a JSON-RPC error object.
    #[error("RPC {method} returned error {code}: {message}")]
    RpcResponse {
        method: String,
        code: i64,
        message: String,
    },

    /// RPC request timed out.
    #[error("RPC timeout after {0} seconds")]
    Timeout(u64),

    /// Transaction did not reach the requested commitment in time.
    #[error("Transaction {signature} not confirmed after {secs} seconds")]
    ConfirmationTimeout { signature: String, secs: u64 },

    /// Transaction landed but the runtime reported an error.
    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    /// Address text is not a base58-encoded 32-byte key.
    #[error("Invalid address '{0}'")]
    InvalidAddress(String),

    /// Invalid keypair format or signing error.
    #[error("Wallet error: {0}")]
    Wallet(String),

    /// No keypair is available to sign with.
    #[error("Wallet not connected")]
    WalletNotConnected,

    /// Transaction could not be compiled or encoded.
    #[error("Malformed transaction: {0}")]
    Encoding(String),
}

/// Result type for blockchain operations.
pub type BlockchainResult<T> = Result<T, BlockchainError>;

fn decode_base58<const N: usize>(text: &str) -> Option<[u8; N]> {
    let bytes = bs58::decode(text).into_vec().ok()?;
    bytes.try_into().ok()
}

/// A 32-byte ed25519 public key, the identity of an account.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Pubkey(pub [u8; 32]);

impl Pubkey {
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl FromStr for Pubkey {
    type Err = BlockchainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // 32 bytes never encode to more than 44 base58 characters
        if s.is_empty() || s.len() > 44 {
            return Err(BlockchainError::InvalidAddress(s.to_string()));
        }
        decode_base58::<32>(s)
            .map(Self)
            .ok_or_else(|| BlockchainError::InvalidAddress(s.to_string()))
    }
}

impl fmt::Display for Pubkey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&bs58::encode(self.0).into_string())
    }
}

impl fmt::Debug for Pubkey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Pubkey({})", self)
    }
}

/// A 64-byte ed25519 transaction signature.
///
/// The first signature of a transaction doubles as its identifier on the
/// network and in block explorers.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Signature(pub [u8; 64]);

impl Signature {
    pub fn as_bytes(&self) -> &[u8; 64] {
        &self.0
    }
}

impl FromStr for Signature {
    type Err = BlockchainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        decode_base58::<64>(s)
            .map(Self)
            .ok_or_else(|| BlockchainError::Rpc(format!("Invalid signature '{}'", s)))
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&bs58::encode(self.0).into_string())
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature({})", self)
    }
}

/// A recent blockhash, used as the transaction's lifetime anchor.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Hash(pub [u8; 32]);

impl FromStr for Hash {
    type Err = BlockchainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        decode_base58::<32>(s)
            .map(Self)
            .ok_or_else(|| BlockchainError::Rpc(format!("Invalid blockhash '{}'", s)))
    }
}

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&bs58::encode(self.0).into_string())
    }
}

impl fmt::Debug for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hash({})", self)
    }
}

/// How far a transaction must have propagated before it counts as landed.
///
/// Variants are ordered from weakest to strongest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CommitmentLevel {
    Processed,
    Confirmed,
    Finalized,
}

impl CommitmentLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommitmentLevel::Processed => "processed",
            CommitmentLevel::Confirmed => "confirmed",
            CommitmentLevel::Finalized => "finalized",
        }
    }
}

impl fmt::Display for CommitmentLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Named cluster the client talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Cluster {
    Devnet,
    Testnet,
    MainnetBeta,
    Localnet,
}

impl Cluster {
    /// Value of the explorer's `cluster` query parameter, if any.
    pub fn explorer_param(&self) -> Option<&'static str> {
        match self {
            Cluster::Devnet => Some("devnet"),
            Cluster::Testnet => Some("testnet"),
            Cluster::MainnetBeta => None,
            Cluster::Localnet => Some("custom"),
        }
    }
}

impl Default for Cluster {
    fn default() -> Self {
        Cluster::Devnet
    }
}

/// Status of a submitted transaction as reported by `getSignatureStatuses`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignatureStatus {
    pub slot: u64,
    /// `None` once the transaction's block has been rooted.
    pub confirmations: Option<u64>,
    /// Runtime error, `None` on success.
    pub err: Option<serde_json::Value>,
    pub confirmation_status: Option<CommitmentLevel>,
}

impl SignatureStatus {
    /// Whether the transaction has reached at least `commitment`.
    pub fn satisfies(&self, commitment: CommitmentLevel) -> bool {
        let reached = match (self.confirmation_status, self.confirmations) {
            (Some(level), _) => level,
            (None, None) => CommitmentLevel::Finalized,
            (None, Some(_)) => CommitmentLevel::Processed,
        };
        reached >= commitment
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Well-known devnet faucet account
    const KNOWN_ADDRESS: &str = "9B5XszUGdMaxCZ7uSQhPzdks5ZQSmWxrmzCSvtJ6Ns6g";

    #[test]
    fn test_pubkey_roundtrip() {
        let key: Pubkey = KNOWN_ADDRESS.parse().unwrap();
        assert_eq!(key.to_string(), KNOWN_ADDRESS);
    }

    #[test]
    fn test_pubkey_rejects_malformed() {
        assert!("not-an-address".parse::<Pubkey>().is_err());
        assert!("".parse::<Pubkey>().is_err());
        // Valid base58 but only 3 bytes long
        assert!("2g8D".parse::<Pubkey>().is_err());

        let err = "0OIl".parse::<Pubkey>().unwrap_err();
        assert!(err.to_string().contains("Invalid address"));
    }

    #[test]
    fn test_system_program_id_encoding() {
        let key = Pubkey::default();
        assert_eq!(key.to_string(), "11111111111111111111111111111111");
        assert_eq!("11111111111111111111111111111111".parse::<Pubkey>().unwrap(), key);
    }

    #[test]
    fn test_commitment_ordering() {
        assert!(CommitmentLevel::Processed < CommitmentLevel::Confirmed);
        assert!(CommitmentLevel::Confirmed < CommitmentLevel::Finalized);
    }

    #[test]
    fn test_signature_status_satisfies() {
        let status: SignatureStatus = serde_json::from_value(serde_json::json!({
            "slot": 42,
            "confirmations": 0,
            "err": null,
            "confirmationStatus": "processed"
        }))
        .unwrap();
        assert!(status.satisfies(CommitmentLevel::Processed));
        assert!(!status.satisfies(CommitmentLevel::Confirmed));

        let rooted = SignatureStatus {
            slot: 42,
            confirmations: None,
            err: None,
            confirmation_status: None,
        };
        assert!(rooted.satisfies(CommitmentLevel::Finalized));
    }

    #[test]
    fn test_cluster_explorer_param() {
        assert_eq!(Cluster::default().explorer_param(), Some("devnet"));
        assert_eq!(Cluster::MainnetBeta.explorer_param(), None);
    }

    #[test]
    fn test_error_display() {
        let err = BlockchainError::Timeout(10);
        assert_eq!(err.to_string(), "RPC timeout after 10 seconds");

        let err = BlockchainError::RpcResponse {
            method: "sendTransaction".to_string(),
            code: -32002,
            message: "Transaction simulation failed".to_string(),
        };
        assert!(err.to_string().contains("-32002"));
    }
}
