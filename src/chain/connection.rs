//! Chain connection lifecycle.
//!
//! A connection owns the read-only client pair for one chain: a Tendermint
//! RPC client and the gRPC query leg. Both legs must come up for the
//! connection to be usable; there are no partial connections. Within a
//! session the connection is shared by handle (`Arc`) across every wallet
//! bound to the chain, and torn down explicitly by whoever owns it.

use core::str::FromStr;
use core::time::Duration;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use http::uri::Uri;
use ibc_proto::cosmos::auth::v1beta1::query_client::QueryClient as AuthQueryClient;
use tendermint_rpc::{Client, HttpClient, Url};
use tokio::time::timeout;
use tracing::{debug, info};

use crate::account::{Account, Balance};
use crate::chain::query::account::query_account;
use crate::chain::query::balance::query_balance;
use crate::error::Error;
use crate::provider::AccountFetcher;

/// Probe deadline for each connect leg.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

pub struct Connection {
    rpc_client: HttpClient,
    rpc_address: Url,
    grpc_address: Uri,
    destroyed: AtomicBool,
}

impl Connection {
    /// Establish both legs concurrently; either leg failing makes the whole
    /// connection unusable.
    pub async fn connect(rpc_addr: &str, grpc_addr: &str) -> Result<Self, Error> {
        let rpc_address =
            Url::from_str(rpc_addr).map_err(|e| Error::rpc(rpc_addr.to_string(), e))?;
        let grpc_address = Uri::from_str(grpc_addr)
            .map_err(|e| Error::connection(format!("invalid gRPC address {}: {}", grpc_addr, e)))?;

        let rpc_client = HttpClient::new(rpc_address.clone())
            .map_err(|e| Error::rpc(rpc_addr.to_string(), e))?;

        let rpc_leg = async {
            timeout(CONNECT_TIMEOUT, rpc_client.status())
                .await
                .map_err(|_| Error::connect_timeout(rpc_addr.to_string(), CONNECT_TIMEOUT.as_secs()))?
                .map_err(|e| Error::rpc(rpc_addr.to_string(), e))
        };
        let grpc_leg = async {
            timeout(CONNECT_TIMEOUT, AuthQueryClient::connect(grpc_address.clone()))
                .await
                .map_err(|_| Error::connect_timeout(grpc_addr.to_string(), CONNECT_TIMEOUT.as_secs()))?
                .map_err(Error::grpc_transport)
        };

        let (status, _auth_client) = futures::try_join!(rpc_leg, grpc_leg)?;

        info!(
            chain_id = %status.node_info.network,
            rpc = %rpc_addr,
            grpc = %grpc_addr,
            "connection established",
        );

        Ok(Self {
            rpc_client,
            rpc_address,
            grpc_address,
            destroyed: AtomicBool::new(false),
        })
    }

    /// The chain identifier reported by the node.
    pub async fn chain_id(&self) -> Result<String, Error> {
        self.ensure_live()?;

        let status = self
            .rpc_client
            .status()
            .await
            .map_err(|e| Error::rpc(self.rpc_address.to_string(), e))?;

        let chain_id = status.node_info.network.to_string();
        if chain_id.is_empty() {
            return Err(Error::chain_id_unavailable(self.rpc_address.to_string()));
        }

        Ok(chain_id)
    }

    /// Balance of `address` for a specific denom.
    pub async fn balance(&self, address: &str, denom: &str) -> Result<Balance, Error> {
        self.ensure_live()?;
        query_balance(&self.grpc_address, address, denom).await
    }

    /// Latest committed block height.
    pub async fn block_height(&self) -> Result<u64, Error> {
        self.ensure_live()?;

        let status = self
            .rpc_client
            .status()
            .await
            .map_err(|e| Error::rpc(self.rpc_address.to_string(), e))?;

        let height = status.sync_info.latest_block_height.value();
        if height == 0 {
            return Err(Error::block_height_unavailable(self.rpc_address.to_string()));
        }

        Ok(height)
    }

    pub fn grpc_address(&self) -> &Uri {
        &self.grpc_address
    }

    /// Tear the connection down. Idempotent; the HTTP-based legs hold no
    /// persistent socket, so teardown flips the lifecycle state and makes
    /// every later call fail fast instead of racing a stale handle.
    pub fn destroy(&self) {
        if !self.destroyed.swap(true, Ordering::SeqCst) {
            debug!(rpc = %self.rpc_address, "connection destroyed");
        }
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed.load(Ordering::SeqCst)
    }

    pub(crate) fn ensure_live(&self) -> Result<(), Error> {
        if self.is_destroyed() {
            return Err(Error::connection_destroyed());
        }
        Ok(())
    }
}

#[async_trait]
impl AccountFetcher for Connection {
    async fn fetch_account(&self, address: &str) -> Result<Account, Error> {
        self.ensure_live()?;
        query_account(&self.grpc_address, address).await
    }
}
