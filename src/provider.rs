//! Collaborator interfaces implemented by the surrounding application shell.
//!
//! The wallet core consumes these as constructor-injected strategies; it
//! never reaches for globals or mutates collaborator objects after
//! construction.

use async_trait::async_trait;
use ibc_proto::google::protobuf::Any;

use crate::account::{Account, AccountSequence};
use crate::config::{ChainInfo, FeeConfig, Memo};
use crate::error::Error;
use crate::keyring::pubkey::PublicKey;
use crate::tx::types::GasEstimate;

/// Live endpoints for a chain, resolved with failover by the shell.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Endpoints {
    pub rpc: String,
    pub rest: String,
    pub grpc: String,
}

/// Resolves live RPC/gRPC endpoints for a chain key.
#[async_trait]
pub trait EndpointProvider: Send + Sync {
    async fn fetch(&self, chain_key: &str) -> Result<Endpoints, Error>;
}

/// Supplies authoritative gas pricing, fetched once per session and cached
/// by the implementation. Returning `None` is fatal to fee selection.
pub trait FeeConfigProvider: Send + Sync {
    fn get(&self) -> Option<FeeConfig>;
}

/// Produces the chain-registration payload for extension suggest-chain
/// handshakes.
pub trait ChainInfoProvider: Send + Sync {
    fn embed(&self, chain_id: &str, rpc: &str, rest: &str) -> ChainInfo;
}

/// Fetches a fresh account snapshot (sequence included) for an address.
///
/// Implemented by [`crate::chain::Connection`]; injectable so the signing
/// pipeline can be exercised against stubs.
#[async_trait]
pub trait AccountFetcher: Send + Sync {
    async fn fetch_account(&self, address: &str) -> Result<Account, Error>;
}

/// Gas estimation strategy used by the wallet between sequence fetch and fee
/// selection. The production implementation simulates over gRPC; a signer
/// that owns its simulation path is wrapped into this interface instead.
#[async_trait]
pub trait GasEstimator: Send + Sync {
    async fn estimate_gas(
        &self,
        messages: &[Any],
        public_key: Option<&PublicKey>,
        sequence: AccountSequence,
        memo: &Memo,
    ) -> Result<GasEstimate, Error>;
}
