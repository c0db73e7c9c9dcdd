//! Protobuf assembly of transaction envelopes.
//!
//! The message set, memo, public key and sequence deterministically produce
//! the `TxBody`/`AuthInfo` pair; the sign doc over those bytes is what every
//! signer backend ultimately signs, whatever its transport.

use ibc_proto::cosmos::tx::v1beta1::mode_info::{Single, Sum};
use ibc_proto::cosmos::tx::v1beta1::{
    AuthInfo, Fee, ModeInfo, SignDoc, SignerInfo, Tx, TxBody, TxRaw,
};
use ibc_proto::google::protobuf::Any;
use prost::Message;
use sha2::{Digest, Sha256};

use crate::account::{AccountNumber, AccountSequence};
use crate::config::Memo;
use crate::error::Error;
use crate::keyring::pubkey::{encode_pubkey, PublicKey};
use crate::tx::types::SignedTx;

pub fn encode_signer_info(
    public_key: Option<&PublicKey>,
    sequence: AccountSequence,
) -> Result<SignerInfo, Error> {
    let pk_any = public_key.map(encode_pubkey).transpose()?;

    let single = Single { mode: 1 };
    let sum_single = Some(Sum::Single(single));
    let mode = Some(ModeInfo { sum: sum_single });

    Ok(SignerInfo {
        public_key: pk_any,
        mode_info: mode,
        sequence: sequence.to_u64(),
    })
}

pub fn tx_body_and_bytes(messages: &[Any], memo: &Memo) -> Result<(TxBody, Vec<u8>), Error> {
    let body = TxBody {
        messages: messages.to_vec(),
        memo: memo.to_string(),
        timeout_height: 0_u64,
        extension_options: Vec::<Any>::new(),
        non_critical_extension_options: Vec::<Any>::new(),
    };

    let mut body_buf = Vec::new();
    body.encode(&mut body_buf)
        .map_err(|e| Error::protobuf_encode(String::from("TxBody"), e))?;

    Ok((body, body_buf))
}

pub fn auth_info_and_bytes(
    signer_info: SignerInfo,
    fee: Fee,
) -> Result<(AuthInfo, Vec<u8>), Error> {
    let auth_info = AuthInfo {
        signer_infos: vec![signer_info],
        fee: Some(fee),

        // Since Cosmos SDK v0.46.0
        tip: None,
    };

    let mut auth_buf = Vec::new();
    auth_info
        .encode(&mut auth_buf)
        .map_err(|e| Error::protobuf_encode(String::from("AuthInfo"), e))?;

    Ok((auth_info, auth_buf))
}

/// The canonical byte string a signer produces a signature over.
pub fn sign_doc_bytes(
    chain_id: &str,
    account_number: AccountNumber,
    body_bytes: Vec<u8>,
    auth_info_bytes: Vec<u8>,
) -> Result<Vec<u8>, Error> {
    let sign_doc = SignDoc {
        body_bytes,
        auth_info_bytes,
        chain_id: chain_id.to_string(),
        account_number: account_number.to_u64(),
    };

    let mut signdoc_buf = Vec::new();
    sign_doc
        .encode(&mut signdoc_buf)
        .map_err(|e| Error::protobuf_encode(String::from("SignDoc"), e))?;

    Ok(signdoc_buf)
}

/// Serialize a signed transaction into broadcast-ready raw bytes.
pub fn encode_tx_raw(signed_tx: &SignedTx) -> Result<Vec<u8>, Error> {
    let tx_raw = TxRaw {
        body_bytes: signed_tx.body_bytes.clone(),
        auth_info_bytes: signed_tx.auth_info_bytes.clone(),
        signatures: signed_tx.signatures.clone(),
    };

    let mut tx_bytes = Vec::new();
    tx_raw
        .encode(&mut tx_bytes)
        .map_err(|e| Error::protobuf_encode(String::from("Transaction"), e))?;

    Ok(tx_bytes)
}

/// Lowercase hex of the SHA-256 digest of the raw transaction bytes.
pub fn tx_hash(raw_bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(raw_bytes))
}

/// Assemble the unsigned `Tx` submitted to the simulate endpoint.
///
/// The signature slot carries a single empty entry; simulation validates the
/// envelope shape, not the signature.
pub fn build_simulate_tx(
    messages: &[Any],
    public_key: Option<&PublicKey>,
    sequence: AccountSequence,
    memo: &Memo,
) -> Result<Tx, Error> {
    let signer_info = encode_signer_info(public_key, sequence)?;
    let (body, _) = tx_body_and_bytes(messages, memo)?;

    let auth_info = AuthInfo {
        signer_infos: vec![signer_info],
        fee: Some(Fee {
            amount: vec![],
            gas_limit: 0,
            payer: "".to_string(),
            granter: "".to_string(),
        }),
        tip: None,
    };

    Ok(Tx {
        body: Some(body),
        auth_info: Some(auth_info),
        signatures: vec![vec![]],
    })
}
