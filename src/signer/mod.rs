//! Signer backends.
//!
//! Every connect mechanism ends up as a [`TxSigner`]: a backend able to list
//! its signing identities and produce a signature over a transaction. A
//! backend that cannot let this layer see or construct the signing material
//! (the Solana bridge) additionally owns its simulation path via
//! [`OwnSimulation`]; the wallet must delegate to it rather than simulate
//! locally.

pub mod bridge;
pub mod extension;
pub mod hardware;
pub mod raw_key;
pub mod social;

use async_trait::async_trait;
use ibc_proto::cosmos::tx::v1beta1::Fee;
use ibc_proto::google::protobuf::Any;

use crate::account::{AccountNumber, AccountSequence};
use crate::config::Memo;
use crate::error::Error;
use crate::keyring::pubkey::PublicKey;
use crate::tx::types::{GasEstimate, SignedTx};

/// An account a signer backend can sign for.
#[derive(Clone, Debug, PartialEq)]
pub struct SigningIdentity {
    pub address: String,
    pub public_key: PublicKey,
}

/// Typed presence-detection result for a backend.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Availability {
    Available,
    NotInstalled,
    VersionTooOld { detected: String, minimum: String },
}

/// Everything a backend needs to produce a signature for one attempt.
#[derive(Clone, Debug)]
pub struct SignRequest<'a> {
    pub chain_id: &'a str,
    pub address: &'a str,
    pub messages: &'a [Any],
    pub fee: &'a Fee,
    pub memo: &'a Memo,
    pub account_number: AccountNumber,
    pub sequence: AccountSequence,
}

#[async_trait]
pub trait TxSigner: Send + Sync {
    /// Stable backend name used in errors and logs.
    fn backend_name(&self) -> &'static str;

    /// The signing identities this backend exposes. An empty list is a
    /// fatal condition for callers; they must not proceed with a default.
    async fn accounts(&self) -> Result<Vec<SigningIdentity>, Error>;

    /// Sign the full message set as one atomic unit.
    async fn sign_tx(&self, request: SignRequest<'_>) -> Result<SignedTx, Error>;

    /// A backend that performs gas simulation itself. When present, the
    /// wallet delegates simulation entirely to it.
    fn own_simulation(&self) -> Option<&dyn OwnSimulation> {
        None
    }
}

/// Simulation capability owned by a signer backend.
#[async_trait]
pub trait OwnSimulation: Send + Sync {
    async fn simulate_tx(&self, message: &Any, memo: &Memo) -> Result<GasEstimate, Error>;

    async fn simulate_multi_tx(
        &self,
        messages: &[Any],
        memo: &Memo,
    ) -> Result<GasEstimate, Error>;
}
