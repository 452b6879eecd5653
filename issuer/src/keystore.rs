//! Argon2id encrypted keystore for the secp256k1 authority key.
//!
//! Encrypts the 32-byte authority key with an operator password:
//! 1. Argon2id derives a 32-byte encryption key from the password + random salt
//! 2. AES-256-GCM encrypts the private key with a random nonce
//! 3. The result is stored as a JSON file together with the authority address,
//!    so the address can be shown without the password

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce};
use argon2::{Algorithm, Argon2, Params, Version};
use claim_crypto::{address_from_private, keypair_from_private};
use claim_types::{Address, KeyPair, PrivateKey};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::path::Path;
use zeroize::Zeroizing;

use crate::error::IssuerError;

const KEYSTORE_VERSION: u32 = 1;
const ARGON2_OUTPUT_LEN: usize = 32;
const SALT_LEN: usize = 32;
/// AES-GCM nonce length in bytes (96 bits).
const NONCE_LEN: usize = 12;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct KeystoreFile {
    pub version: u32,
    pub address: Address,
    pub crypto: KeystoreCrypto,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct KeystoreCrypto {
    pub cipher: String,
    pub kdf: String,
    pub kdf_params: KdfParams,
    /// Hex-encoded salt.
    pub salt: String,
    /// Hex-encoded nonce.
    pub nonce: String,
    /// Hex-encoded ciphertext.
    pub ciphertext: String,
}

/// Argon2id cost parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct KdfParams {
    /// Memory in KiB.
    pub memory: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for KdfParams {
    /// 64 MiB, 3 passes, 1 lane.
    fn default() -> Self {
        Self {
            memory: 65536,
            iterations: 3,
            parallelism: 1,
        }
    }
}

/// Encrypt the authority key with the default Argon2id cost.
pub fn encrypt_keystore(private: &PrivateKey, password: &str) -> Result<KeystoreFile, IssuerError> {
    encrypt_keystore_with(private, password, KdfParams::default())
}

pub fn encrypt_keystore_with(
    private: &PrivateKey,
    password: &str,
    params: KdfParams,
) -> Result<KeystoreFile, IssuerError> {
    let address = address_from_private(private)?;
    let mut rng = rand::thread_rng();

    let mut salt = [0u8; SALT_LEN];
    rng.fill_bytes(&mut salt);
    let mut nonce_bytes = [0u8; NONCE_LEN];
    rng.fill_bytes(&mut nonce_bytes);

    let derived_key = derive_key(password, &salt, &params)?;
    let cipher = Aes256Gcm::new_from_slice(&derived_key[..])
        .map_err(|e| keystore_err(format!("AES key init failed: {e}")))?;
    let ciphertext = cipher
        .encrypt(Nonce::from_slice(&nonce_bytes), &private.as_bytes()[..])
        .map_err(|e| keystore_err(format!("encryption failed: {e}")))?;

    Ok(KeystoreFile {
        version: KEYSTORE_VERSION,
        address,
        crypto: KeystoreCrypto {
            cipher: "aes-256-gcm".to_string(),
            kdf: "argon2id".to_string(),
            kdf_params: params,
            salt: hex::encode(salt),
            nonce: hex::encode(nonce_bytes),
            ciphertext: hex::encode(ciphertext),
        },
    })
}

/// Decrypt a keystore, returning the authority key pair.
///
/// The recovered key must derive the address recorded in the file.
pub fn decrypt_keystore(keystore: &KeystoreFile, password: &str) -> Result<KeyPair, IssuerError> {
    if keystore.version != KEYSTORE_VERSION {
        return Err(keystore_err(format!(
            "unsupported keystore version: {}",
            keystore.version
        )));
    }
    if keystore.crypto.cipher != "aes-256-gcm" || keystore.crypto.kdf != "argon2id" {
        return Err(keystore_err(format!(
            "unsupported scheme: {}/{}",
            keystore.crypto.kdf, keystore.crypto.cipher
        )));
    }

    let salt = decode_field("salt", &keystore.crypto.salt)?;
    let nonce_bytes = decode_field("nonce", &keystore.crypto.nonce)?;
    let ciphertext = decode_field("ciphertext", &keystore.crypto.ciphertext)?;
    if nonce_bytes.len() != NONCE_LEN {
        return Err(keystore_err(format!(
            "invalid nonce length: expected {NONCE_LEN}, got {}",
            nonce_bytes.len()
        )));
    }

    let derived_key = derive_key(password, &salt, &keystore.crypto.kdf_params)?;
    let cipher = Aes256Gcm::new_from_slice(&derived_key[..])
        .map_err(|e| keystore_err(format!("AES key init failed: {e}")))?;
    let plaintext = Zeroizing::new(
        cipher
            .decrypt(Nonce::from_slice(&nonce_bytes), ciphertext.as_ref())
            .map_err(|_| {
                keystore_err("decryption failed: wrong password or corrupted data".into())
            })?,
    );
    if plaintext.len() != 32 {
        return Err(keystore_err(format!(
            "decrypted key has wrong length: expected 32, got {}",
            plaintext.len()
        )));
    }

    let mut private = PrivateKey([0u8; 32]);
    private.0.copy_from_slice(&plaintext);
    let keypair = keypair_from_private(private)?;
    if keypair.address != keystore.address {
        return Err(keystore_err(format!(
            "key derives {} but keystore records {}",
            keypair.address, keystore.address
        )));
    }
    Ok(keypair)
}

pub fn save_keystore(keystore: &KeystoreFile, path: &Path) -> Result<(), IssuerError> {
    let json = serde_json::to_string_pretty(keystore)
        .map_err(|e| keystore_err(format!("JSON serialization failed: {e}")))?;
    std::fs::write(path, json)
        .map_err(|e| keystore_err(format!("failed to write {}: {e}", path.display())))
}

pub fn load_keystore(path: &Path) -> Result<KeystoreFile, IssuerError> {
    let json = std::fs::read_to_string(path)
        .map_err(|e| keystore_err(format!("failed to read {}: {e}", path.display())))?;
    serde_json::from_str(&json).map_err(|e| keystore_err(format!("invalid keystore JSON: {e}")))
}

fn derive_key(
    password: &str,
    salt: &[u8],
    kdf: &KdfParams,
) -> Result<Zeroizing<[u8; 32]>, IssuerError> {
    let params = Params::new(kdf.memory, kdf.iterations, kdf.parallelism, Some(ARGON2_OUTPUT_LEN))
        .map_err(|e| keystore_err(format!("Argon2 params error: {e}")))?;
    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

    let mut output = Zeroizing::new([0u8; 32]);
    argon2
        .hash_password_into(password.as_bytes(), salt, &mut output[..])
        .map_err(|e| keystore_err(format!("Argon2 hashing failed: {e}")))?;
    Ok(output)
}

fn decode_field(name: &str, value: &str) -> Result<Vec<u8>, IssuerError> {
    hex::decode(value).map_err(|e| keystore_err(format!("invalid {name} hex: {e}")))
}

fn keystore_err(message: String) -> IssuerError {
    IssuerError::Keystore(message)
}
