//! Single-transfer submission lifecycle.
//!
//! # State Machine
//! ```text
//! Idle ──submit──▶ in flight ──▶ Success(signature)
//!                            └─▶ Failed
//! ```
//!
//! Each attempt resets the result to `Idle`, ends in exactly one terminal
//! value, and always clears the in-flight flag. The state is published on
//! a `watch` channel so a UI can render it while the attempt is suspended
//! on the wallet or on confirmation.

use std::time::Instant;
use tokio::sync::watch;

use crate::blockchain::transaction::Transaction;
use crate::blockchain::types::{CommitmentLevel, Pubkey, Signature};
use crate::observability::metrics;
use crate::transfer::adapter::{Connection, WalletAdapter};
use crate::transfer::error::{SubmitError, TransferError};
use crate::transfer::state::{SubmissionResult, SubmissionSnapshot, TransferRequest};

/// Commitment a transfer must reach before it is reported as successful.
pub const REQUIRED_COMMITMENT: CommitmentLevel = CommitmentLevel::Processed;

/// Clears the in-flight flag when the attempt ends, however it ends.
///
/// An attempt abandoned before reaching a terminal result is marked failed.
struct InFlightGuard<'a> {
    state: &'a watch::Sender<SubmissionSnapshot>,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.state.send_if_modified(|s| {
            if !s.in_flight {
                return false;
            }
            s.in_flight = false;
            if !s.result.is_terminal() {
                s.result = SubmissionResult::Failed;
                s.signature = None;
            }
            true
        });
    }
}

/// Orchestrates one transfer at a time through the injected wallet and
/// connection.
pub struct TransferSubmitter<W, C> {
    wallet: W,
    connection: C,
    state: watch::Sender<SubmissionSnapshot>,
}

impl<W: WalletAdapter, C: Connection> TransferSubmitter<W, C> {
    pub fn new(wallet: W, connection: C) -> Self {
        let (state, _) = watch::channel(SubmissionSnapshot::default());
        Self {
            wallet,
            connection,
            state,
        }
    }

    /// Current state.
    pub fn snapshot(&self) -> SubmissionSnapshot {
        *self.state.borrow()
    }

    /// Receive every state change.
    pub fn subscribe(&self) -> watch::Receiver<SubmissionSnapshot> {
        self.state.subscribe()
    }

    pub fn is_in_flight(&self) -> bool {
        self.state.borrow().in_flight
    }

    pub fn wallet(&self) -> &W {
        &self.wallet
    }

    pub fn connection(&self) -> &C {
        &self.connection
    }

    /// Run one transfer attempt to completion.
    ///
    /// Returns `NotConnected` without touching any state or collaborator when
    /// the wallet has no identity, and `InFlight` while another attempt runs.
    /// Every other problem ends the attempt with `SubmissionResult::Failed`.
    pub async fn submit(&self, request: TransferRequest) -> Result<SubmissionResult, SubmitError> {
        let sender = self.wallet.public_key().ok_or(SubmitError::NotConnected)?;
        let _guard = self.begin()?;
        let started = Instant::now();

        tracing::info!(
            sender = %sender,
            receiver = %request.receiver_address,
            amount = %request.amount,
            "Submitting transfer"
        );

        let result = match self.execute(&sender, &request).await {
            Ok(signature) => {
                tracing::info!(%signature, "Transfer confirmed");
                SubmissionResult::Success(signature)
            }
            Err(e) => {
                tracing::error!(error = %e, reason = e.reason(), "Transfer failed");
                metrics::record_transfer_failure(e.reason());
                SubmissionResult::Failed
            }
        };

        self.state.send_modify(|s| {
            s.result = result;
            s.signature = result.signature();
        });
        metrics::record_submission(result.as_str(), started);

        Ok(result)
    }

    /// Mark an attempt as started, unless one is already running.
    fn begin(&self) -> Result<InFlightGuard<'_>, SubmitError> {
        let started = self.state.send_if_modified(|s| {
            if s.in_flight {
                return false;
            }
            *s = SubmissionSnapshot {
                result: SubmissionResult::Idle,
                signature: None,
                in_flight: true,
            };
            true
        });

        if !started {
            return Err(SubmitError::InFlight);
        }
        Ok(InFlightGuard { state: &self.state })
    }

    async fn execute(&self, sender: &Pubkey, request: &TransferRequest) -> Result<Signature, TransferError> {
        let instruction = request.to_instruction(sender)?;
        let transaction = Transaction::new().add(instruction);

        let signature = self
            .wallet
            .send_transaction(transaction, &self.connection)
            .await
            .map_err(TransferError::Send)?;
        tracing::debug!(%signature, "Transaction sent, awaiting confirmation");

        self.connection
            .confirm_transaction(&signature, REQUIRED_COMMITMENT)
            .await
            .map_err(TransferError::Confirm)?;

        Ok(signature)
    }
}
