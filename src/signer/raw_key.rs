//! Raw-key signer: holds a decrypted secp256k1 key pair in memory and signs
//! locally.

use async_trait::async_trait;
use zeroize::Zeroizing;

use crate::error::Error;
use crate::keyring::keystore::EncryptedKeystore;
use crate::keyring::Secp256k1KeyPair;
use crate::signer::{SignRequest, SigningIdentity, TxSigner};
use crate::tx::encode::{auth_info_and_bytes, encode_signer_info, sign_doc_bytes, tx_body_and_bytes};
use crate::tx::types::SignedTx;

pub struct RawKeySigner {
    key_pair: Secp256k1KeyPair,
}

impl RawKeySigner {
    pub fn new(key_pair: Secp256k1KeyPair) -> Self {
        Self { key_pair }
    }

    /// Decrypt a sealed keystore payload and bind the recovered key.
    ///
    /// The plaintext secret lives only for the construction of the key pair.
    pub fn from_keystore(
        keystore_json: &str,
        passphrase: &[u8],
        account_prefix: &str,
    ) -> Result<Self, Error> {
        let keystore = EncryptedKeystore::from_json(keystore_json).map_err(Error::key_base)?;
        let secret: Zeroizing<Vec<u8>> = keystore.unseal(passphrase).map_err(Error::key_base)?;

        let key_pair = Secp256k1KeyPair::from_secret_bytes(&secret, account_prefix)
            .map_err(Error::key_base)?;

        Ok(Self::new(key_pair))
    }

    pub fn from_mnemonic(
        mnemonic: &str,
        account_index: u32,
        account_prefix: &str,
    ) -> Result<Self, Error> {
        let key_pair = Secp256k1KeyPair::from_mnemonic(mnemonic, account_index, account_prefix)
            .map_err(Error::key_base)?;
        Ok(Self::new(key_pair))
    }

    pub fn key_pair(&self) -> &Secp256k1KeyPair {
        &self.key_pair
    }
}

/// Sign a request with a locally held key pair. Shared by the raw-key and
/// social-login backends.
pub(crate) fn sign_with_key_pair(
    key_pair: &Secp256k1KeyPair,
    request: &SignRequest<'_>,
) -> Result<SignedTx, Error> {
    let signer_info = encode_signer_info(Some(&key_pair.public_key()), request.sequence)?;

    let (body, body_bytes) = tx_body_and_bytes(request.messages, request.memo)?;
    let (auth_info, auth_info_bytes) = auth_info_and_bytes(signer_info, request.fee.clone())?;

    let signdoc = sign_doc_bytes(
        request.chain_id,
        request.account_number,
        body_bytes.clone(),
        auth_info_bytes.clone(),
    )?;

    let signature = key_pair.sign(&signdoc).map_err(Error::key_base)?;

    Ok(SignedTx {
        body,
        body_bytes,
        auth_info,
        auth_info_bytes,
        signatures: vec![signature],
    })
}

#[async_trait]
impl TxSigner for RawKeySigner {
    fn backend_name(&self) -> &'static str {
        "raw-key"
    }

    async fn accounts(&self) -> Result<Vec<SigningIdentity>, Error> {
        Ok(vec![SigningIdentity {
            address: self.key_pair.account().to_string(),
            public_key: self.key_pair.public_key(),
        }])
    }

    async fn sign_tx(&self, request: SignRequest<'_>) -> Result<SignedTx, Error> {
        sign_with_key_pair(&self.key_pair, &request)
    }
}
