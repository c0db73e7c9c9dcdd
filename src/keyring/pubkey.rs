//! Wire codec for the public key variants recorded on chain.
//!
//! Accounts carry their key as a protobuf `Any`; the four variants supported
//! by the connected networks are secp256k1, ed25519, Ethermint-style
//! ethsecp256k1 and the legacy amino threshold multisig. An account that has
//! never signed a transaction has no recorded key, which decodes to `None`
//! rather than an error.

use cosmos_sdk_proto::cosmos::crypto::ed25519 as proto_ed25519;
use cosmos_sdk_proto::cosmos::crypto::secp256k1 as proto_secp256k1;
use ibc_proto::google::protobuf::Any;
use prost::Message;

use crate::error::Error;

pub const SECP256K1_PUBKEY_TYPE_URL: &str = "/cosmos.crypto.secp256k1.PubKey";
pub const ED25519_PUBKEY_TYPE_URL: &str = "/cosmos.crypto.ed25519.PubKey";
pub const ETHSECP256K1_PUBKEY_TYPE_URL: &str = "/ethermint.crypto.v1.ethsecp256k1.PubKey";
pub const MULTISIG_PUBKEY_TYPE_URL: &str = "/cosmos.crypto.multisig.LegacyAminoPubKey";

/// `cosmos.crypto.multisig.LegacyAminoPubKey`
///
/// Declared locally so the nested keys use the same `Any` flavor as the rest
/// of the transaction encoding.
#[derive(Clone, PartialEq, ::prost::Message)]
struct LegacyAminoPubKey {
    #[prost(uint32, tag = "1")]
    threshold: u32,
    #[prost(message, repeated, tag = "2")]
    public_keys: Vec<Any>,
}

/// A public key in its wallet-native representation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PublicKey {
    /// Compressed secp256k1 key, exactly 33 bytes.
    Secp256k1([u8; 33]),
    /// Raw ed25519 key, exactly 32 bytes.
    Ed25519([u8; 32]),
    /// Compressed secp256k1 key under the Ethermint signature domain.
    EthSecp256k1([u8; 33]),
    /// Threshold multisig over an ordered list of nested keys.
    MultisigThreshold {
        threshold: u32,
        keys: Vec<PublicKey>,
    },
}

impl PublicKey {
    /// Construct a compressed secp256k1 key, enforcing the 33-byte/0x02-0x03
    /// compression invariant.
    pub fn secp256k1(bytes: &[u8]) -> Result<Self, Error> {
        Ok(Self::Secp256k1(check_compressed(bytes)?))
    }

    /// Construct an ethsecp256k1 key; same compression invariant, different
    /// signature domain.
    pub fn eth_secp256k1(bytes: &[u8]) -> Result<Self, Error> {
        Ok(Self::EthSecp256k1(check_compressed(bytes)?))
    }

    pub fn ed25519(bytes: &[u8]) -> Result<Self, Error> {
        let key: [u8; 32] = bytes.try_into().map_err(|_| {
            Error::malformed_pubkey(format!("ed25519 key must be 32 bytes, got {}", bytes.len()))
        })?;
        Ok(Self::Ed25519(key))
    }

    /// The wire type URL identifying this variant.
    pub fn type_url(&self) -> &'static str {
        match self {
            Self::Secp256k1(_) => SECP256K1_PUBKEY_TYPE_URL,
            Self::Ed25519(_) => ED25519_PUBKEY_TYPE_URL,
            Self::EthSecp256k1(_) => ETHSECP256K1_PUBKEY_TYPE_URL,
            Self::MultisigThreshold { .. } => MULTISIG_PUBKEY_TYPE_URL,
        }
    }
}

fn check_compressed(bytes: &[u8]) -> Result<[u8; 33], Error> {
    let key: [u8; 33] = bytes.try_into().map_err(|_| {
        Error::malformed_pubkey(format!(
            "compressed secp256k1 key must be 33 bytes, got {}",
            bytes.len()
        ))
    })?;

    if key[0] != 0x02 && key[0] != 0x03 {
        return Err(Error::malformed_pubkey(format!(
            "compressed secp256k1 key must start with 0x02 or 0x03, got 0x{:02x}",
            key[0]
        )));
    }

    Ok(key)
}

/// Encode a public key into its protobuf `Any` wire form.
pub fn encode_pubkey(pubkey: &PublicKey) -> Result<Any, Error> {
    let (type_url, value) = match pubkey {
        PublicKey::Secp256k1(key) | PublicKey::EthSecp256k1(key) => {
            let proto = proto_secp256k1::PubKey { key: key.to_vec() };
            (pubkey.type_url(), encode_proto(&proto, "PubKey")?)
        }
        PublicKey::Ed25519(key) => {
            let proto = proto_ed25519::PubKey { key: key.to_vec() };
            (pubkey.type_url(), encode_proto(&proto, "PubKey")?)
        }
        PublicKey::MultisigThreshold { threshold, keys } => {
            let public_keys = keys.iter().map(encode_pubkey).collect::<Result<_, _>>()?;
            let proto = LegacyAminoPubKey {
                threshold: *threshold,
                public_keys,
            };
            (pubkey.type_url(), encode_proto(&proto, "LegacyAminoPubKey")?)
        }
    };

    Ok(Any {
        type_url: type_url.to_string(),
        value,
    })
}

/// Decode a public key from its wire form.
///
/// A missing or empty input models an account that has never signed a
/// transaction and therefore has no recorded key; it is not an error.
pub fn decode_pubkey(pk_any: Option<&Any>) -> Result<Option<PublicKey>, Error> {
    let pk_any = match pk_any {
        Some(any) if !any.value.is_empty() => any,
        _ => return Ok(None),
    };

    let pubkey = match pk_any.type_url.as_str() {
        SECP256K1_PUBKEY_TYPE_URL => {
            let proto = proto_secp256k1::PubKey::decode(pk_any.value.as_slice())
                .map_err(|e| Error::protobuf_decode("PubKey".to_string(), e))?;
            PublicKey::secp256k1(&proto.key)?
        }
        ETHSECP256K1_PUBKEY_TYPE_URL => {
            let proto = proto_secp256k1::PubKey::decode(pk_any.value.as_slice())
                .map_err(|e| Error::protobuf_decode("PubKey".to_string(), e))?;
            PublicKey::eth_secp256k1(&proto.key)?
        }
        ED25519_PUBKEY_TYPE_URL => {
            let proto = proto_ed25519::PubKey::decode(pk_any.value.as_slice())
                .map_err(|e| Error::protobuf_decode("PubKey".to_string(), e))?;
            PublicKey::ed25519(&proto.key)?
        }
        MULTISIG_PUBKEY_TYPE_URL => {
            let proto = LegacyAminoPubKey::decode(pk_any.value.as_slice())
                .map_err(|e| Error::protobuf_decode("LegacyAminoPubKey".to_string(), e))?;
            let keys = proto
                .public_keys
                .iter()
                .map(|nested| {
                    decode_pubkey(Some(nested))?.ok_or_else(|| {
                        Error::malformed_pubkey("multisig key list contains an empty entry".into())
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;
            PublicKey::MultisigThreshold {
                threshold: proto.threshold,
                keys,
            }
        }
        other => return Err(Error::unrecognized_pubkey_type(other.to_string())),
    };

    Ok(Some(pubkey))
}

fn encode_proto(message: &impl Message, payload_type: &str) -> Result<Vec<u8>, Error> {
    let mut buf = Vec::new();
    message
        .encode(&mut buf)
        .map_err(|e| Error::protobuf_encode(payload_type.to_string(), e))?;
    Ok(buf)
}
