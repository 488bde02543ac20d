//! Command-line front end for the transfer submitter.
//!
//! # Architecture Overview
//!
//! ```text
//!   CLI args ──▶ config ──▶ Wallet (keypair) ──▶ KeypairWallet ─┐
//!                   │                                          ▼
//!                   └────▶ BlockchainClient ──▶ RpcConnection ──▶ TransferSubmitter
//!                                                              │
//!   stdout ◀── explorer link / "Transaction failed" ◀──────────┘
//! ```

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use transfer_submitter::blockchain::{BlockchainClient, Pubkey, Wallet, LAMPORTS_PER_SOL};
use transfer_submitter::config::{load_or_default, TransferConfig};
use transfer_submitter::observability::{logging, metrics};
use transfer_submitter::transfer::{
    explorer_tx_url, KeypairWallet, RpcConnection, SubmissionResult, TransferRequest,
    TransferSubmitter, WalletAdapter,
};

#[derive(Parser)]
#[command(name = "transfer-submitter")]
#[command(about = "Send native SOL and wait for confirmation", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Transfer SOL to a receiver and wait for confirmation
    Send {
        /// Receiver address (base58)
        #[arg(long)]
        to: String,
        /// Amount in SOL
        #[arg(long)]
        amount: String,
    },
    /// Print the configured wallet's address
    Address,
    /// Print the balance of an address (default: the configured wallet)
    Balance {
        #[arg(long)]
        address: Option<String>,
    },
    /// Check RPC reachability
    Health,
}

/// The configured wallet, or a disconnected one if no keypair is available.
fn connect_wallet(config: &TransferConfig) -> KeypairWallet {
    match Wallet::from_config(&config.wallet) {
        Ok(wallet) => KeypairWallet::new(wallet),
        Err(e) => {
            tracing::warn!(error = %e, "No wallet keypair available");
            KeypairWallet::disconnected()
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load_or_default(cli.config.as_deref())?;

    logging::init_logging(&config.observability)?;

    tracing::info!(
        rpc_url = %config.network.rpc_url,
        cluster = ?config.network.cluster,
        rpc_timeout_secs = config.network.rpc_timeout_secs,
        confirm_timeout_secs = config.network.confirm_timeout_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let client = BlockchainClient::new(config.network.clone())?;

    match cli.command {
        Commands::Send { to, amount } => {
            let submitter = TransferSubmitter::new(connect_wallet(&config), RpcConnection::new(client));
            let result = submitter.submit(TransferRequest::new(to, amount)).await?;

            match result {
                SubmissionResult::Success(signature) => {
                    println!(
                        "View success transaction: {}",
                        explorer_tx_url(&config.explorer.base_url, &signature, config.network.cluster)
                    );
                }
                _ => {
                    eprintln!("Transaction failed");
                    std::process::exit(1);
                }
            }
        }
        Commands::Address => match connect_wallet(&config).public_key() {
            Some(address) => println!("{}", address),
            None => return Err("Wallet not connected".into()),
        },
        Commands::Balance { address } => {
            let address: Pubkey = match address {
                Some(text) => text.parse()?,
                None => connect_wallet(&config)
                    .public_key()
                    .ok_or("Wallet not connected")?,
            };
            let lamports = client.get_balance(&address).await?;
            println!(
                "{} SOL ({} lamports)",
                lamports as f64 / LAMPORTS_PER_SOL as f64,
                lamports
            );
        }
        Commands::Health => {
            if client.is_healthy().await {
                println!("ok");
            } else {
                eprintln!("RPC endpoint unhealthy or unreachable");
                std::process::exit(1);
            }
        }
    }

    Ok(())
}
