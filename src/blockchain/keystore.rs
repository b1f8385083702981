//! Encrypted key files.
//!
//! Format (version 4, kind `secretKey`):
//! ```text
//! derived  = scrypt(password, salt, n, r, p, dklen = 32)
//! mac      = HMAC-SHA256(derived[16..32], ciphertext)
//! secret   = AES-128-CTR(derived[0..16], iv) over ciphertext
//! ```
//! The plaintext is the 32-byte seed followed by the 32-byte public key.

use std::path::Path;

use aes::Aes128;
use ctr::cipher::{KeyIvInit, StreamCipher};
use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;
use zeroize::Zeroizing;

use crate::blockchain::address::Address;
use crate::blockchain::types::{BlockchainError, BlockchainResult};

type Aes128Ctr = ctr::Ctr128BE<Aes128>;
type HmacSha256 = Hmac<Sha256>;

const SUPPORTED_VERSION: u32 = 4;
const SUPPORTED_KIND: &str = "secretKey";
const SUPPORTED_CIPHER: &str = "aes-128-ctr";
const SUPPORTED_KDF: &str = "scrypt";
const DERIVED_KEY_LEN: usize = 32;

#[derive(Debug, Clone, Deserialize)]
pub struct Keystore {
    pub version: u32,
    #[serde(default = "default_kind")]
    pub kind: String,
    /// Hex public key, when present.
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub bech32: Option<String>,
    pub crypto: CryptoSection,
}

fn default_kind() -> String {
    SUPPORTED_KIND.to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct CryptoSection {
    pub ciphertext: String,
    pub cipherparams: CipherParams,
    pub cipher: String,
    pub kdf: String,
    pub kdfparams: KdfParams,
    pub mac: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CipherParams {
    pub iv: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct KdfParams {
    pub dklen: usize,
    pub salt: String,
    pub n: u32,
    pub r: u32,
    pub p: u32,
}

impl Keystore {
    pub fn from_file(path: &Path) -> BlockchainResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            BlockchainError::Wallet(format!("cannot read key file {}: {}", path.display(), e))
        })?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> BlockchainResult<Self> {
        let keystore: Keystore = serde_json::from_str(content)
            .map_err(|e| BlockchainError::Wallet(format!("malformed key file: {}", e)))?;
        keystore.check_supported()?;
        Ok(keystore)
    }

    fn check_supported(&self) -> BlockchainResult<()> {
        let crypto = &self.crypto;
        if self.version != SUPPORTED_VERSION
            || self.kind != SUPPORTED_KIND
            || crypto.cipher != SUPPORTED_CIPHER
            || crypto.kdf != SUPPORTED_KDF
        {
            return Err(BlockchainError::Wallet(format!(
                "unsupported key file (version {}, kind {}, cipher {}, kdf {})",
                self.version, self.kind, crypto.cipher, crypto.kdf
            )));
        }
        if crypto.kdfparams.dklen != DERIVED_KEY_LEN || !crypto.kdfparams.n.is_power_of_two() {
            return Err(BlockchainError::Wallet("unsupported scrypt parameters".into()));
        }
        Ok(())
    }

    /// Address recorded in the file, if any.
    pub fn declared_address(&self) -> BlockchainResult<Option<Address>> {
        match (&self.bech32, &self.address) {
            (Some(bech32), _) => Address::from_bech32(bech32).map(Some),
            (None, Some(hex)) => Address::from_hex(hex).map(Some),
            (None, None) => Ok(None),
        }
        .map_err(|e| BlockchainError::Wallet(e.to_string()))
    }

    /// Recover the 32-byte secret seed.
    pub fn decrypt(&self, password: &str) -> BlockchainResult<Zeroizing<[u8; 32]>> {
        let crypto = &self.crypto;
        let salt = decode_hex("salt", &crypto.kdfparams.salt)?;
        let iv = decode_hex("iv", &crypto.cipherparams.iv)?;
        let ciphertext = decode_hex("ciphertext", &crypto.ciphertext)?;
        let expected_mac = decode_hex("mac", &crypto.mac)?;

        let derived = derive_key(password, &salt, &crypto.kdfparams)?;

        let mut mac = <HmacSha256 as Mac>::new_from_slice(&derived[16..32])
            .map_err(|e| BlockchainError::Wallet(e.to_string()))?;
        mac.update(&ciphertext);
        mac.verify_slice(&expected_mac)
            .map_err(|_| BlockchainError::Authentication("key file MAC mismatch (wrong password?)".into()))?;

        let mut plaintext = Zeroizing::new(ciphertext);
        let mut cipher = Aes128Ctr::new_from_slices(&derived[..16], &iv)
            .map_err(|e| BlockchainError::Wallet(format!("bad cipher parameters: {}", e)))?;
        cipher.apply_keystream(&mut plaintext);

        let seed: [u8; 32] = plaintext
            .get(..32)
            .and_then(|s| s.try_into().ok())
            .ok_or_else(|| BlockchainError::Wallet("decrypted key is too short".into()))?;
        Ok(Zeroizing::new(seed))
    }
}

fn derive_key(
    password: &str,
    salt: &[u8],
    params: &KdfParams,
) -> BlockchainResult<Zeroizing<[u8; DERIVED_KEY_LEN]>> {
    let log_n = params.n.trailing_zeros() as u8;
    let scrypt_params = scrypt::Params::new(log_n, params.r, params.p, DERIVED_KEY_LEN)
        .map_err(|e| BlockchainError::Wallet(format!("invalid scrypt parameters: {}", e)))?;
    let mut derived = Zeroizing::new([0u8; DERIVED_KEY_LEN]);
    scrypt::scrypt(password.as_bytes(), salt, &scrypt_params, &mut derived[..])
        .map_err(|e| BlockchainError::Wallet(format!("key derivation failed: {}", e)))?;
    Ok(derived)
}

fn decode_hex(field: &str, value: &str) -> BlockchainResult<Vec<u8>> {
    hex::decode(value).map_err(|e| BlockchainError::Wallet(format!("invalid {} hex: {}", field, e)))
}
