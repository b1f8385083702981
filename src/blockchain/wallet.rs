//! Wallet management and transaction signing.
//!
//! # Security
//! - Secret keys come from an encrypted key file unlocked with a password
//!   read from the environment
//! - Keys are never logged or serialized
//! - `ed25519_dalek::SigningKey` zeroizes itself on drop

use std::path::Path;

use async_trait::async_trait;
use ed25519_dalek::{Signer as _, SigningKey, Verifier as _, VerifyingKey};

use crate::blockchain::address::Address;
use crate::blockchain::keystore::Keystore;
use crate::blockchain::transaction::Signature;
use crate::blockchain::types::{BlockchainError, BlockchainResult};

/// Default environment variable holding the key file password.
pub const PASSWORD_ENV_VAR: &str = "MVX_WALLET_PASSWORD";

/// Signing capability consumed by the pipeline.
///
/// The private key never leaves the implementation.
#[async_trait]
pub trait TransactionSigner: Send + Sync {
    /// Address whose key produces the signatures.
    fn address(&self) -> Address;

    /// Sign an arbitrary byte sequence.
    async fn sign(&self, payload: &[u8]) -> BlockchainResult<Signature>;
}

/// Ed25519 wallet.
pub struct Wallet {
    signing_key: SigningKey,
    address: Address,
}

impl Wallet {
    /// Create a wallet from a 32-byte secret key.
    pub fn from_secret_key(secret: &[u8; 32]) -> Self {
        let signing_key = SigningKey::from_bytes(secret);
        let address = Address::from_bytes(signing_key.verifying_key().to_bytes());
        tracing::info!(address = %address, "Wallet initialized");
        Self {
            signing_key,
            address,
        }
    }

    /// Unlock an encrypted key file.
    ///
    /// Fails with [`BlockchainError::Authentication`] on a wrong password.
    pub fn from_keystore_file(path: &Path, password: &str) -> BlockchainResult<Self> {
        let keystore = Keystore::from_file(path)?;
        let secret = keystore.decrypt(password)?;
        let wallet = Self::from_secret_key(&secret);

        if let Some(declared) = keystore.declared_address()? {
            if declared != wallet.address {
                return Err(BlockchainError::Wallet(format!(
                    "key file declares {} but the key belongs to {}",
                    declared, wallet.address
                )));
            }
        }
        Ok(wallet)
    }

    /// Unlock a key file with the password taken from `env_var`.
    pub fn from_keystore_env(path: &Path, env_var: &str) -> BlockchainResult<Self> {
        let password = std::env::var(env_var).map_err(|_| {
            BlockchainError::Authentication(format!("Environment variable {} not set", env_var))
        })?;
        Self::from_keystore_file(path, &password)
    }

    pub fn address(&self) -> Address {
        self.address
    }
}

#[async_trait]
impl TransactionSigner for Wallet {
    fn address(&self) -> Address {
        self.address
    }

    async fn sign(&self, payload: &[u8]) -> BlockchainResult<Signature> {
        Ok(Signature(self.signing_key.sign(payload).to_bytes()))
    }
}

impl std::fmt::Debug for Wallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Wallet")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

/// Check a signature against the public key embedded in `signer`.
pub fn verify_signature(signer: &Address, payload: &[u8], signature: &Signature) -> bool {
    let Ok(key) = VerifyingKey::from_bytes(signer.as_bytes()) else {
        return false;
    };
    let signature = ed25519_dalek::Signature::from_bytes(&signature.0);
    key.verify(payload, &signature).is_ok()
}
