//! Solana integration subsystem.
//!
//! # Data Flow
//! ```text
//! Keypair (environment variable or keypair file)
//!     → wallet.rs (key loading, signing)
//!     → transaction.rs (build, compile, sign, serialize)
//!     → client.rs (JSON-RPC with timeouts and failover)
//! ```
//!
//! # Security Constraints
//! - Secret keys never logged
//! - All RPC calls have configurable timeouts

pub mod client;
pub mod transaction;
pub mod types;
pub mod wallet;

pub use client::BlockchainClient;
pub use transaction::{system_transfer, Instruction, Transaction};
pub use types::{
    BlockchainError, BlockchainResult, Cluster, CommitmentLevel, Hash, Pubkey, Signature,
    LAMPORTS_PER_SOL,
};
pub use wallet::Wallet;
