//! Local keypair management and message signing.
//!
//! # Security
//! - Keypairs are loaded from an environment variable or a keypair file
//! - Secret bytes are never logged or serialized

use ed25519_dalek::{Signer, SigningKey};
use rand::rngs::OsRng;
use std::path::Path;

use crate::blockchain::types::{BlockchainError, BlockchainResult, Pubkey, Signature};
use crate::config::schema::WalletConfig;

/// Default environment variable holding the keypair.
pub const KEYPAIR_ENV_VAR: &str = "TRANSFER_WALLET_KEYPAIR";

/// An ed25519 keypair able to sign transactions.
#[derive(Clone)]
pub struct Wallet {
    signing_key: SigningKey,
}

impl Wallet {
    /// Create a wallet from keypair text.
    ///
    /// Accepts either a base58 string or a JSON byte array (the format
    /// written by `solana-keygen`). Both hold 64 bytes: the 32-byte secret
    /// followed by its public key. A bare 32-byte secret is accepted too.
    pub fn from_secret(secret: &str) -> BlockchainResult<Self> {
        let secret = secret.trim();
        let bytes: Vec<u8> = if secret.starts_with('[') {
            serde_json::from_str(secret)
                .map_err(|e| BlockchainError::Wallet(format!("Invalid keypair JSON: {}", e)))?
        } else {
            bs58::decode(secret)
                .into_vec()
                .map_err(|e| BlockchainError::Wallet(format!("Invalid keypair encoding: {}", e)))?
        };

        let signing_key = match bytes.len() {
            64 => {
                let keypair: [u8; 64] = bytes
                    .as_slice()
                    .try_into()
                    .map_err(|_| BlockchainError::Wallet("Invalid keypair length".to_string()))?;
                SigningKey::from_keypair_bytes(&keypair).map_err(|e| {
                    BlockchainError::Wallet(format!("Keypair public half does not match: {}", e))
                })?
            }
            32 => {
                let seed: [u8; 32] = bytes
                    .as_slice()
                    .try_into()
                    .map_err(|_| BlockchainError::Wallet("Invalid secret length".to_string()))?;
                SigningKey::from_bytes(&seed)
            }
            n => {
                return Err(BlockchainError::Wallet(format!(
                    "Invalid keypair length: expected 32 or 64 bytes, got {}",
                    n
                )))
            }
        };

        let wallet = Self { signing_key };
        tracing::info!(address = %wallet.pubkey(), "Wallet loaded");
        Ok(wallet)
    }

    /// Load a wallet from the environment variable `var`.
    pub fn from_env(var: &str) -> BlockchainResult<Self> {
        let secret = std::env::var(var).map_err(|_| {
            BlockchainError::Wallet(format!("Environment variable {} not set", var))
        })?;
        Self::from_secret(&secret)
    }

    /// Load a wallet from a keypair file.
    pub fn from_file(path: &Path) -> BlockchainResult<Self> {
        let secret = std::fs::read_to_string(path).map_err(|e| {
            BlockchainError::Wallet(format!("Cannot read keypair {}: {}", path.display(), e))
        })?;
        Self::from_secret(&secret)
    }

    /// Load the wallet described by the configuration.
    ///
    /// A keypair file, when configured, takes precedence over the environment.
    pub fn from_config(config: &WalletConfig) -> BlockchainResult<Self> {
        match config.keypair_path.as_deref() {
            Some(path) if !path.is_empty() => Self::from_file(Path::new(path)),
            _ => Self::from_env(&config.keypair_env_var),
        }
    }

    /// Generate a fresh random keypair.
    pub fn generate() -> Self {
        Self {
            signing_key: SigningKey::generate(&mut OsRng),
        }
    }

    /// The wallet's public address.
    pub fn pubkey(&self) -> Pubkey {
        Pubkey::new(self.signing_key.verifying_key().to_bytes())
    }

    /// Sign raw message bytes.
    pub fn sign_message(&self, message: &[u8]) -> Signature {
        Signature(self.signing_key.sign(message).to_bytes())
    }

    /// Encode the keypair as base58, the format `from_secret` accepts.
    pub fn to_base58(&self) -> String {
        bs58::encode(self.signing_key.to_keypair_bytes()).into_string()
    }
}

impl std::fmt::Debug for Wallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Wallet")
            .field("pubkey", &self.pubkey())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ed25519_dalek::{Verifier, VerifyingKey};

    #[test]
    fn test_wallet_from_base58() {
        let wallet = Wallet::generate();
        let restored = Wallet::from_secret(&wallet.to_base58()).unwrap();
        assert_eq!(restored.pubkey(), wallet.pubkey());
    }

    #[test]
    fn test_wallet_from_json_array() {
        let wallet = Wallet::generate();
        let bytes = bs58::decode(wallet.to_base58()).into_vec().unwrap();
        let json = serde_json::to_string(&bytes).unwrap();

        let restored = Wallet::from_secret(&json).unwrap();
        assert_eq!(restored.pubkey(), wallet.pubkey());
    }

    #[test]
    fn test_wallet_from_seed() {
        let seed = bs58::encode([5u8; 32]).into_string();
        let a = Wallet::from_secret(&seed).unwrap();
        let b = Wallet::from_secret(&seed).unwrap();
        assert_eq!(a.pubkey(), b.pubkey());
    }

    #[test]
    fn test_invalid_keypair() {
        let result = Wallet::from_secret("invalid_key");
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Invalid keypair"));

        let short = bs58::encode([1u8; 16]).into_string();
        let err = Wallet::from_secret(&short).unwrap_err().to_string();
        assert!(err.contains("expected 32 or 64 bytes, got 16"), "{}", err);
    }

    #[test]
    fn test_mismatched_public_half() {
        let mut bytes = bs58::decode(Wallet::generate().to_base58()).into_vec().unwrap();
        bytes[40] ^= 0xff;
        let tampered = bs58::encode(bytes).into_string();
        assert!(Wallet::from_secret(&tampered).is_err());
    }

    #[test]
    fn test_missing_env_var() {
        let err = Wallet::from_env("TRANSFER_WALLET_KEYPAIR_UNSET_FOR_TEST").unwrap_err();
        assert!(err.to_string().contains("not set"));
    }

    #[test]
    fn test_sign_message() {
        let wallet = Wallet::generate();
        let signature = wallet.sign_message(b"Hello, World!");

        let key = VerifyingKey::from_bytes(wallet.pubkey().as_bytes()).unwrap();
        let sig = ed25519_dalek::Signature::from_bytes(signature.as_bytes());
        assert!(key.verify(b"Hello, World!", &sig).is_ok());
    }

    #[test]
    fn test_debug_hides_secret() {
        let wallet = Wallet::generate();
        let debug = format!("{:?}", wallet);
        assert!(debug.contains(&wallet.pubkey().to_string()));
        assert!(!debug.contains(&wallet.to_base58()));
    }
}
