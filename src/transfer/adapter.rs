//! Wallet and connection collaborators.
//!
//! The submitter only sees the two traits below, so it can be driven by a
//! local keypair and a live RPC node, or by test doubles.

use async_trait::async_trait;
use std::time::Duration;
use tokio::time::{interval, timeout};

use crate::blockchain::client::BlockchainClient;
use crate::blockchain::transaction::Transaction;
use crate::blockchain::types::{BlockchainError, BlockchainResult, CommitmentLevel, Hash, Pubkey, Signature};
use crate::blockchain::wallet::Wallet;

/// Access to the cluster.
#[async_trait]
pub trait Connection: Send + Sync {
    /// A recent blockhash to anchor a new transaction.
    async fn latest_blockhash(&self) -> BlockchainResult<Hash>;

    /// Broadcast a signed transaction, returning its signature.
    async fn send_raw_transaction(&self, wire: &[u8]) -> BlockchainResult<Signature>;

    /// Resolve once `signature` reaches `commitment`, or fail.
    ///
    /// How long to wait is this connection's own policy.
    async fn confirm_transaction(
        &self,
        signature: &Signature,
        commitment: CommitmentLevel,
    ) -> BlockchainResult<()>;
}

/// Something that holds an identity and can sign and send on its behalf.
#[async_trait]
pub trait WalletAdapter: Send + Sync {
    /// The connected identity, `None` while disconnected.
    fn public_key(&self) -> Option<Pubkey>;

    /// Sign `transaction` and broadcast it through `connection`.
    ///
    /// Fills in the fee payer and recent blockhash when the caller left them
    /// empty.
    async fn send_transaction(
        &self,
        transaction: Transaction,
        connection: &dyn Connection,
    ) -> BlockchainResult<Signature>;
}

/// `WalletAdapter` backed by a local keypair.
#[derive(Debug, Clone, Default)]
pub struct KeypairWallet {
    wallet: Option<Wallet>,
}

impl KeypairWallet {
    pub fn new(wallet: Wallet) -> Self {
        Self { wallet: Some(wallet) }
    }

    /// A wallet with no identity; every send is refused.
    pub fn disconnected() -> Self {
        Self { wallet: None }
    }
}

#[async_trait]
impl WalletAdapter for KeypairWallet {
    fn public_key(&self) -> Option<Pubkey> {
        self.wallet.as_ref().map(Wallet::pubkey)
    }

    async fn send_transaction(
        &self,
        mut transaction: Transaction,
        connection: &dyn Connection,
    ) -> BlockchainResult<Signature> {
        let wallet = self.wallet.as_ref().ok_or(BlockchainError::WalletNotConnected)?;

        if transaction.fee_payer().is_none() {
            transaction.set_fee_payer(wallet.pubkey());
        }
        if transaction.recent_blockhash().is_none() {
            transaction.set_recent_blockhash(connection.latest_blockhash().await?);
        }

        let signature = transaction.sign(wallet)?;
        let wire = transaction.serialize()?;
        let sent = connection.send_raw_transaction(&wire).await?;
        if sent != signature {
            tracing::warn!(expected = %signature, reported = %sent, "Node reported a different signature");
        }

        tracing::debug!(signature = %sent, bytes = wire.len(), "Transaction broadcast");
        Ok(sent)
    }
}

/// `Connection` backed by the JSON-RPC client.
#[derive(Debug, Clone)]
pub struct RpcConnection {
    client: BlockchainClient,
}

impl RpcConnection {
    pub fn new(client: BlockchainClient) -> Self {
        Self { client }
    }

    /// Poll signature statuses until the commitment is reached.
    ///
    /// Only the caller's timeout ends the wait when polls keep failing.
    async fn poll_status(
        &self,
        signature: &Signature,
        commitment: CommitmentLevel,
    ) -> BlockchainResult<()> {
        let mut ticker = interval(Duration::from_millis(self.client.config().poll_interval_ms));

        loop {
            ticker.tick().await;

            // A failed poll says nothing about the transaction; keep waiting
            let statuses = match self.client.get_signature_statuses(&[*signature]).await {
                Ok(statuses) => statuses,
                Err(e) => {
                    tracing::warn!(%signature, error = %e, "Status poll failed, retrying");
                    continue;
                }
            };
            let status = match statuses.into_iter().next().flatten() {
                Some(s) => s,
                None => {
                    tracing::debug!(%signature, "Transaction not yet seen");
                    continue;
                }
            };

            if let Some(err) = status.err {
                return Err(BlockchainError::TransactionFailed(err.to_string()));
            }

            if status.satisfies(commitment) {
                tracing::debug!(%signature, slot = status.slot, %commitment, "Transaction confirmed");
                return Ok(());
            }

            tracing::debug!(
                %signature,
                status = ?status.confirmation_status,
                required = %commitment,
                "Waiting for commitment"
            );
        }
    }
}

#[async_trait]
impl Connection for RpcConnection {
    async fn latest_blockhash(&self) -> BlockchainResult<Hash> {
        let (hash, _last_valid_height) = self.client.get_latest_blockhash().await?;
        Ok(hash)
    }

    async fn send_raw_transaction(&self, wire: &[u8]) -> BlockchainResult<Signature> {
        self.client.send_transaction(wire).await
    }

    async fn confirm_transaction(
        &self,
        signature: &Signature,
        commitment: CommitmentLevel,
    ) -> BlockchainResult<()> {
        let timeout_secs = self.client.config().confirm_timeout_secs;
        match timeout(
            Duration::from_secs(timeout_secs),
            self.poll_status(signature, commitment),
        )
        .await
        {
            Ok(outcome) => outcome,
            Err(_) => Err(BlockchainError::ConfirmationTimeout {
                signature: signature.to_string(),
                secs: timeout_secs,
            }),
        }
    }
}
