//! Key material handling for the locally-signing backends.
//!
//! The raw-key and social-login signers hold a secp256k1 key pair directly;
//! extension and hardware backends never expose private key material to this
//! crate and only go through [`pubkey`] for the public half.

pub mod errors;
pub mod keystore;
pub mod pubkey;

use core::str::FromStr;

use bech32::{ToBase32, Variant};
use bip39::{Language, Mnemonic, Seed};
use bitcoin::bip32::{DerivationPath, Xpriv};
use bitcoin::secp256k1::Secp256k1;
use bitcoin::Network;
use hdpath::StandardHDPath;
use k256::ecdsa::{signature::Signer, Signature, SigningKey};
use ripemd::Ripemd160;
use sha2::{Digest, Sha256};

use self::errors::Error;
use self::pubkey::PublicKey;

/// Coin type used for Cosmos-SDK key derivation (SLIP-0044 `ATOM`).
pub const COSMOS_COIN_TYPE: u32 = 118;

pub fn encode_bech32(account_prefix: &str, address: &[u8]) -> Result<String, Error> {
    bech32::encode(account_prefix, address.to_base32(), Variant::Bech32)
        .map_err(Error::bech32_account)
}

/// A secp256k1 signing key pair bound to a bech32 account.
#[derive(Clone)]
pub struct Secp256k1KeyPair {
    signing_key: SigningKey,
    account: String,
}

impl Secp256k1KeyPair {
    /// Derive a key pair from a BIP-39 mnemonic over the standard Cosmos
    /// derivation path `m/44'/118'/0'/0/index`.
    pub fn from_mnemonic(
        mnemonic_words: &str,
        account_index: u32,
        account_prefix: &str,
    ) -> Result<Self, Error> {
        let mnemonic = Mnemonic::from_phrase(mnemonic_words, Language::English)
            .map_err(Error::invalid_mnemonic)?;
        let seed = Seed::new(&mnemonic, "");

        let hd_path = StandardHDPath::new(
            hdpath::Purpose::Pubkey,
            COSMOS_COIN_TYPE,
            0,
            0,
            account_index,
        );

        let master = Xpriv::new_master(Network::Bitcoin, seed.as_bytes())
            .map_err(Error::bip32_key_generation)?;
        let path = DerivationPath::from_str(&hd_path.to_string())
            .map_err(Error::bip32_key_generation)?;
        let child = master
            .derive_priv(&Secp256k1::new(), &path)
            .map_err(Error::bip32_key_generation)?;

        Self::from_secret_bytes(&child.private_key.secret_bytes(), account_prefix)
    }

    /// Build a key pair from raw 32-byte secret key material, e.g. a
    /// decrypted keystore payload or a social-login-derived key share.
    pub fn from_secret_bytes(secret: &[u8], account_prefix: &str) -> Result<Self, Error> {
        let signing_key = SigningKey::from_slice(secret).map_err(Error::invalid_key_bytes)?;
        let account = account_from_verifying_key(&signing_key, account_prefix)?;

        Ok(Self {
            signing_key,
            account,
        })
    }

    /// The compressed (33-byte) public key.
    pub fn compressed_public_key(&self) -> [u8; 33] {
        let point = self.signing_key.verifying_key().to_encoded_point(true);
        point
            .as_bytes()
            .try_into()
            .expect("compressed secp256k1 point is 33 bytes")
    }

    /// The wallet-native public key record.
    pub fn public_key(&self) -> PublicKey {
        PublicKey::Secp256k1(self.compressed_public_key())
    }

    /// The bech32 account address bound at construction.
    pub fn account(&self) -> &str {
        &self.account
    }

    /// Sign a message; the digest (SHA-256) is applied internally.
    pub fn sign(&self, message: &[u8]) -> Result<Vec<u8>, Error> {
        let signature: Signature = self.signing_key.sign(message);
        Ok(signature.to_vec())
    }
}

impl core::fmt::Debug for Secp256k1KeyPair {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Secp256k1KeyPair")
            .field("account", &self.account)
            .finish_non_exhaustive()
    }
}

fn account_from_verifying_key(
    signing_key: &SigningKey,
    account_prefix: &str,
) -> Result<String, Error> {
    let compressed = signing_key.verifying_key().to_encoded_point(true);

    // Cosmos account address: ripemd160(sha256(compressed_pubkey))
    let sha = Sha256::digest(compressed.as_bytes());
    let address = Ripemd160::digest(sha);

    encode_bech32(account_prefix, &address)
}

#[cfg(test)]
mod tests {
    use super::*;

    // BIP-39 reference test vector.
    const MNEMONIC: &str = "abandon abandon abandon abandon abandon abandon \
        abandon abandon abandon abandon abandon about";

    #[test]
    fn mnemonic_derivation_is_deterministic() {
        let a = Secp256k1KeyPair::from_mnemonic(MNEMONIC, 0, "nolus").unwrap();
        let b = Secp256k1KeyPair::from_mnemonic(MNEMONIC, 0, "nolus").unwrap();

        assert_eq!(a.compressed_public_key(), b.compressed_public_key());
        assert_eq!(a.account(), b.account());
        assert!(a.account().starts_with("nolus1"));
    }

    #[test]
    fn different_account_index_yields_different_key() {
        let a = Secp256k1KeyPair::from_mnemonic(MNEMONIC, 0, "nolus").unwrap();
        let b = Secp256k1KeyPair::from_mnemonic(MNEMONIC, 1, "nolus").unwrap();

        assert_ne!(a.compressed_public_key(), b.compressed_public_key());
    }

    #[test]
    fn public_key_is_compressed() {
        let pair = Secp256k1KeyPair::from_mnemonic(MNEMONIC, 0, "nolus").unwrap();
        let key = pair.compressed_public_key();

        assert!(key[0] == 0x02 || key[0] == 0x03);
    }

    #[test]
    fn invalid_mnemonic_is_rejected() {
        assert!(Secp256k1KeyPair::from_mnemonic("not a mnemonic", 0, "nolus").is_err());
    }
}
