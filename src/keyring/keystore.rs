//! Passphrase-encrypted storage for raw secp256k1 key material.
//!
//! The raw-key connect mechanism never holds a plaintext key at rest: the
//! 32-byte secret is sealed with ChaCha20-Poly1305 under an Argon2id-derived
//! key and only decrypted for the lifetime of a signer instance.

use argon2::{Algorithm, Argon2, Params, ParamsBuilder, Version};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chacha20poly1305::aead::{Aead, KeyInit};
use chacha20poly1305::{ChaCha20Poly1305, Key, Nonce};
use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, Zeroizing};

use super::errors::Error;

const KEYSTORE_VERSION: u32 = 1;
const SALT_LEN: usize = 16;
const NONCE_LEN: usize = 12;
const SYMMETRIC_KEY_LEN: usize = 32;
const ARGON2_MEMORY_COST_KIB: u32 = 64 * 1024;
const ARGON2_TIME_COST: u32 = 3;
const ARGON2_PARALLELISM: u32 = 1;
const CIPHER_ALGORITHM: &str = "chacha20poly1305";
const KDF_ALGORITHM: &str = "argon2id";

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CipherMetadata {
    pub algorithm: String,
    pub nonce: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct KdfMetadata {
    pub algorithm: String,
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
    pub salt: String,
}

/// Serialized form of an encrypted key.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EncryptedKeystore {
    pub version: u32,
    pub cipher: CipherMetadata,
    pub kdf: KdfMetadata,
    pub ciphertext: String,
}

impl EncryptedKeystore {
    pub fn from_json(payload: &str) -> Result<Self, Error> {
        serde_json::from_str(payload).map_err(Error::keystore_decode)
    }

    pub fn to_json(&self) -> Result<String, Error> {
        serde_json::to_string(self).map_err(Error::keystore_decode)
    }

    /// Seal a 32-byte secret under the given passphrase.
    pub fn seal(secret: &[u8], passphrase: &[u8], salt: [u8; SALT_LEN], nonce: [u8; NONCE_LEN]) -> Result<Self, Error> {
        let params = build_params()?;
        let mut key = Zeroizing::new([0u8; SYMMETRIC_KEY_LEN]);
        derive_symmetric_key(passphrase, &salt, &params, &mut key)?;

        let cipher = ChaCha20Poly1305::new(Key::from_slice(&*key));
        let ciphertext = cipher
            .encrypt(Nonce::from_slice(&nonce), secret)
            .map_err(|_| Error::keystore_decrypt())?;

        key.zeroize();

        Ok(Self {
            version: KEYSTORE_VERSION,
            cipher: CipherMetadata {
                algorithm: CIPHER_ALGORITHM.to_string(),
                nonce: BASE64.encode(nonce),
            },
            kdf: KdfMetadata {
                algorithm: KDF_ALGORITHM.to_string(),
                memory_kib: ARGON2_MEMORY_COST_KIB,
                iterations: ARGON2_TIME_COST,
                parallelism: ARGON2_PARALLELISM,
                salt: BASE64.encode(salt),
            },
            ciphertext: BASE64.encode(ciphertext),
        })
    }

    /// Recover the sealed secret. A wrong passphrase fails AEAD verification
    /// and never yields partial plaintext.
    pub fn unseal(&self, passphrase: &[u8]) -> Result<Zeroizing<Vec<u8>>, Error> {
        let salt = BASE64
            .decode(&self.kdf.salt)
            .map_err(|_| Error::keystore_field("kdf.salt".to_string()))?;
        let nonce = BASE64
            .decode(&self.cipher.nonce)
            .map_err(|_| Error::keystore_field("cipher.nonce".to_string()))?;
        let ciphertext = BASE64
            .decode(&self.ciphertext)
            .map_err(|_| Error::keystore_field("ciphertext".to_string()))?;

        if nonce.len() != NONCE_LEN {
            return Err(Error::keystore_field("cipher.nonce".to_string()));
        }

        let params = ParamsBuilder::new()
            .m_cost(self.kdf.memory_kib)
            .t_cost(self.kdf.iterations)
            .p_cost(self.kdf.parallelism)
            .output_len(SYMMETRIC_KEY_LEN)
            .build()
            .map_err(|e| Error::keystore_kdf(e.to_string()))?;

        let mut key = Zeroizing::new([0u8; SYMMETRIC_KEY_LEN]);
        derive_symmetric_key(passphrase, &salt, &params, &mut key)?;

        let cipher = ChaCha20Poly1305::new(Key::from_slice(&*key));
        let plaintext = cipher
            .decrypt(Nonce::from_slice(&nonce), ciphertext.as_slice())
            .map_err(|_| Error::keystore_decrypt())?;

        key.zeroize();

        Ok(Zeroizing::new(plaintext))
    }
}

fn derive_symmetric_key(
    passphrase: &[u8],
    salt: &[u8],
    params: &Params,
    out: &mut [u8; SYMMETRIC_KEY_LEN],
) -> Result<(), Error> {
    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params.clone());
    argon2
        .hash_password_into(passphrase, salt, out)
        .map_err(|e| Error::keystore_kdf(e.to_string()))
}

fn build_params() -> Result<Params, Error> {
    ParamsBuilder::new()
        .m_cost(ARGON2_MEMORY_COST_KIB)
        .t_cost(ARGON2_TIME_COST)
        .p_cost(ARGON2_PARALLELISM)
        .output_len(SYMMETRIC_KEY_LEN)
        .build()
        .map_err(|e| Error::keystore_kdf(e.to_string()))
}
