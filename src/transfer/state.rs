//! Transfer request and submission state.

use crate::blockchain::transaction::{system_transfer, Instruction};
use crate::blockchain::types::{Pubkey, Signature, LAMPORTS_PER_SOL};
use crate::transfer::error::TransferError;

/// Outcome of the latest submission attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubmissionResult {
    /// No attempt has finished since the last reset.
    #[default]
    Idle,
    /// The transfer landed at the requested commitment.
    Success(Signature),
    /// The attempt failed for any reason.
    Failed,
}

impl SubmissionResult {
    pub fn signature(&self) -> Option<Signature> {
        match self {
            SubmissionResult::Success(signature) => Some(*signature),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, SubmissionResult::Idle)
    }

    /// Label used in logs and metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            SubmissionResult::Idle => "idle",
            SubmissionResult::Success(_) => "success",
            SubmissionResult::Failed => "failed",
        }
    }
}

/// Read-only view of the submitter, for the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SubmissionSnapshot {
    pub result: SubmissionResult,
    /// Set only together with `SubmissionResult::Success`.
    pub signature: Option<Signature>,
    pub in_flight: bool,
}

/// User input for one attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferRequest {
    pub receiver_address: String,
    /// Amount in SOL as decimal text.
    pub amount: String,
}

impl TransferRequest {
    pub fn new(receiver_address: impl Into<String>, amount: impl Into<String>) -> Self {
        Self {
            receiver_address: receiver_address.into(),
            amount: amount.into(),
        }
    }

    /// Build the transfer instruction paid by `sender`.
    pub fn to_instruction(&self, sender: &Pubkey) -> Result<Instruction, TransferError> {
        let lamports = sol_to_lamports(&self.amount)?;
        let receiver: Pubkey = self
            .receiver_address
            .trim()
            .parse()
            .map_err(|_| TransferError::InvalidAddress(self.receiver_address.clone()))?;
        Ok(system_transfer(sender, &receiver, lamports))
    }
}

/// Convert decimal SOL text into lamports, rounding to the nearest lamport.
pub fn sol_to_lamports(amount: &str) -> Result<u64, TransferError> {
    let invalid = || TransferError::InvalidAmount(amount.to_string());
    let sol: f64 = amount.trim().parse().map_err(|_| invalid())?;
    if !sol.is_finite() || sol < 0.0 {
        return Err(invalid());
    }
    let lamports = (sol * LAMPORTS_PER_SOL as f64).round();
    if lamports >= u64::MAX as f64 {
        return Err(invalid());
    }
    Ok(lamports as u64)
}
