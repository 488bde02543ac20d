//! Submission error types.

use thiserror::Error;

use crate::blockchain::types::BlockchainError;

/// Errors returned to the caller of `submit`.
///
/// Anything that goes wrong once an attempt has started is not an error at
/// this level; it ends the attempt with `SubmissionResult::Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SubmitError {
    /// No wallet identity is available.
    #[error("Wallet not connected")]
    NotConnected,

    /// Another attempt has not finished yet.
    #[error("A transfer is already in flight")]
    InFlight,
}

/// Why an attempt ended in `Failed`. Logged, never surfaced.
#[derive(Debug, Error)]
pub enum TransferError {
    #[error("Invalid receiver address '{0}'")]
    InvalidAddress(String),

    #[error("Invalid amount '{0}'")]
    InvalidAmount(String),

    #[error("Send failed: {0}")]
    Send(#[source] BlockchainError),

    #[error("Confirmation failed: {0}")]
    Confirm(#[source] BlockchainError),
}

impl TransferError {
    /// Short label for metrics.
    pub fn reason(&self) -> &'static str {
        match self {
            TransferError::InvalidAddress(_) => "invalid_address",
            TransferError::InvalidAmount(_) => "invalid_amount",
            TransferError::Send(_) => "send",
            TransferError::Confirm(_) => "confirm",
        }
    }
}
