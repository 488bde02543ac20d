//! Native SOL transfer submission and confirmation.

pub mod blockchain;
pub mod config;
pub mod observability;
pub mod transfer;

pub use config::TransferConfig;
pub use transfer::{SubmissionResult, TransferRequest, TransferSubmitter};
