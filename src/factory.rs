//! Wallet factory: one entry point per connect mechanism.
//!
//! The factory owns the per-chain collaborators (connection, fee config,
//! chain info) and turns a chosen mechanism into a bound [`BaseWallet`]. Each
//! mechanism runs its own handshake here, with its own failure modes, before
//! the wallet binds to the backend's first identity.

use std::sync::Arc;

use tracing::info;

use crate::chain::Connection;
use crate::config::ChainInfo;
use crate::error::Error;
use crate::keyring::Secp256k1KeyPair;
use crate::provider::{ChainInfoProvider, EndpointProvider, Endpoints, FeeConfigProvider};
use crate::signer::bridge::{BridgeProvider, SolanaBridgeSigner};
use crate::signer::extension::{BrowserExtensionSigner, ExtensionProvider};
use crate::signer::hardware::{LedgerSigner, LedgerTransport};
use crate::signer::raw_key::RawKeySigner;
use crate::signer::social::{SocialLoginProvider, SocialLoginSigner};
use crate::signer::{Availability, TxSigner};
use crate::tx::estimate::GrpcGasEstimator;
use crate::wallet::BaseWallet;

/// How the user chose to connect, with the backend-specific port attached.
pub enum ConnectMechanism {
    Extension(Arc<dyn ExtensionProvider>),
    Ledger {
        transport: Arc<dyn LedgerTransport>,
        hd_path: String,
    },
    RawKey(Secp256k1KeyPair),
    SocialLogin(Arc<dyn SocialLoginProvider>),
    SolanaBridge(Arc<dyn BridgeProvider>),
}

impl ConnectMechanism {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Extension(_) => "extension",
            Self::Ledger { .. } => "ledger",
            Self::RawKey(_) => "raw-key",
            Self::SocialLogin(_) => "social-login",
            Self::SolanaBridge(_) => "solana-bridge",
        }
    }

    /// Presence detection for mechanisms that can be absent. Local-key
    /// mechanisms are always available.
    pub fn availability(&self) -> Availability {
        match self {
            Self::Extension(provider) => provider.detect(),
            _ => Availability::Available,
        }
    }
}

/// Resolve live endpoints and produce the chain info bound to them. The
/// suggest-chain payload must carry the endpoints the session actually uses,
/// not the registry defaults.
async fn resolve_chain(
    endpoint_provider: &dyn EndpointProvider,
    chain_info_provider: &dyn ChainInfoProvider,
    chain_id: &str,
    chain_key: &str,
) -> Result<(Endpoints, ChainInfo), Error> {
    let endpoints = endpoint_provider.fetch(chain_key).await?;
    let chain_info = chain_info_provider.embed(chain_id, &endpoints.rpc, &endpoints.rest);

    Ok((endpoints, chain_info))
}

pub struct WalletFactory {
    chain_info: ChainInfo,
    fee_denom: String,
    connection: Arc<Connection>,
    fee_config: Arc<dyn FeeConfigProvider>,
}

impl WalletFactory {
    /// Resolve live endpoints for the chain, embed them into the
    /// chain-registration payload, and establish the shared connection the
    /// factory hands to every wallet it creates.
    pub async fn connect(
        endpoint_provider: &dyn EndpointProvider,
        chain_info_provider: &dyn ChainInfoProvider,
        chain_id: &str,
        chain_key: &str,
        fee_denom: impl Into<String>,
        fee_config: Arc<dyn FeeConfigProvider>,
    ) -> Result<Self, Error> {
        let (endpoints, chain_info) =
            resolve_chain(endpoint_provider, chain_info_provider, chain_id, chain_key).await?;
        let connection = Arc::new(Connection::connect(&endpoints.rpc, &endpoints.grpc).await?);

        Ok(Self::new(chain_info, fee_denom, connection, fee_config))
    }

    pub fn new(
        chain_info: ChainInfo,
        fee_denom: impl Into<String>,
        connection: Arc<Connection>,
        fee_config: Arc<dyn FeeConfigProvider>,
    ) -> Self {
        Self {
            chain_info,
            fee_denom: fee_denom.into(),
            connection,
            fee_config,
        }
    }

    pub fn connection(&self) -> &Arc<Connection> {
        &self.connection
    }

    /// Run the mechanism's handshake and bind a wallet to it.
    pub async fn create_wallet(&self, mechanism: ConnectMechanism) -> Result<BaseWallet, Error> {
        let mechanism_name = mechanism.name();

        let signer: Arc<dyn TxSigner> = match mechanism {
            ConnectMechanism::Extension(provider) => Arc::new(
                BrowserExtensionSigner::connect(provider, &self.chain_info).await?,
            ),
            ConnectMechanism::Ledger { transport, hd_path } => {
                Arc::new(LedgerSigner::acquire(transport, hd_path).await?)
            }
            ConnectMechanism::RawKey(key_pair) => Arc::new(RawKeySigner::new(key_pair)),
            ConnectMechanism::SocialLogin(provider) => Arc::new(
                SocialLoginSigner::login(provider, &self.chain_info.bech32_prefix).await?,
            ),
            ConnectMechanism::SolanaBridge(provider) => {
                Arc::new(SolanaBridgeSigner::new(provider))
            }
        };

        let wallet = BaseWallet::use_account(
            self.chain_info.chain_id.clone(),
            self.fee_denom.clone(),
            signer,
            self.connection.clone(),
            self.fee_config.clone(),
            Arc::new(GrpcGasEstimator::new(self.connection.clone())),
        )
        .await?;

        info!(
            id = %self.chain_info.chain_id,
            mechanism = mechanism_name,
            account = %wallet.address(),
            "wallet connected"
        );

        Ok(wallet)
    }
}
