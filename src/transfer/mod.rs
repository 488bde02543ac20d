//! Native transfer submission.
//!
//! # Data Flow
//! ```text
//! TransferRequest (receiver text, amount text)
//!     → state.rs (parse into a system transfer instruction)
//!     → submitter.rs (wrap in a transaction, drive the lifecycle)
//!     → adapter.rs WalletAdapter (fee payer, blockhash, sign, broadcast)
//!     → adapter.rs Connection (await commitment)
//!     → SubmissionSnapshot (result, signature, in-flight)
//! ```

pub mod adapter;
pub mod error;
pub mod explorer;
pub mod state;
pub mod submitter;

pub use adapter::{Connection, KeypairWallet, RpcConnection, WalletAdapter};
pub use error::{SubmitError, TransferError};
pub use explorer::explorer_tx_url;
pub use state::{SubmissionResult, SubmissionSnapshot, TransferRequest};
pub use submitter::TransferSubmitter;
