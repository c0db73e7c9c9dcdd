//! Browser-extension signer.
//!
//! The extension itself lives outside this crate; the shell supplies an
//! [`ExtensionProvider`] port that bridges to it. The handshake (suggest
//! chain, then enable) happens once at wallet creation; each failure mode is
//! surfaced distinctly so the UI can show the right remediation.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::config::ChainInfo;
use crate::error::Error;
use crate::signer::{Availability, SignRequest, SigningIdentity, TxSigner};
use crate::tx::encode::{auth_info_and_bytes, encode_signer_info, tx_body_and_bytes};
use crate::tx::types::SignedTx;

/// Outcome of an extension signing prompt.
pub enum ExtensionSignOutcome {
    /// Signature over the sign doc assembled from the returned bytes.
    Signed { signature: Vec<u8> },
    /// The user dismissed the prompt.
    Rejected,
    /// The extension failed for another reason.
    Failed(String),
}

/// Port to an installed wallet extension, implemented by the shell.
#[async_trait]
pub trait ExtensionProvider: Send + Sync {
    /// Extension kind, e.g. `keplr` or `leap`.
    fn kind(&self) -> &'static str;

    /// Presence detection with a typed result; implementations own their
    /// version probing.
    fn detect(&self) -> Availability;

    async fn suggest_chain(&self, chain_info: &ChainInfo) -> Result<(), String>;

    async fn enable(&self, chain_id: &str) -> Result<(), String>;

    async fn accounts(&self, chain_id: &str) -> Result<Vec<SigningIdentity>, String>;

    /// Prompt for a direct (protobuf) signature over the prepared bytes.
    async fn sign_direct(
        &self,
        chain_id: &str,
        address: &str,
        body_bytes: &[u8],
        auth_info_bytes: &[u8],
        account_number: u64,
    ) -> ExtensionSignOutcome;
}

pub struct BrowserExtensionSigner {
    provider: Arc<dyn ExtensionProvider>,
    chain_id: String,
}

impl BrowserExtensionSigner {
    /// Run the extension handshake and return a bound signer.
    pub async fn connect(
        provider: Arc<dyn ExtensionProvider>,
        chain_info: &ChainInfo,
    ) -> Result<Self, Error> {
        match provider.detect() {
            Availability::Available => {}
            Availability::NotInstalled => {
                return Err(Error::extension_not_installed(provider.kind().to_string()))
            }
            Availability::VersionTooOld { detected, minimum } => {
                return Err(Error::extension_outdated(
                    provider.kind().to_string(),
                    detected,
                    minimum,
                ))
            }
        }

        provider
            .suggest_chain(chain_info)
            .await
            .map_err(|reason| Error::suggest_chain_failed(chain_info.chain_id.clone(), reason))?;

        provider
            .enable(&chain_info.chain_id)
            .await
            .map_err(|reason| {
                Error::wallet_fetch_failed(provider.kind().to_string(), reason)
            })?;

        debug!(kind = provider.kind(), chain_id = %chain_info.chain_id, "extension enabled");

        Ok(Self {
            provider,
            chain_id: chain_info.chain_id.clone(),
        })
    }
}

#[async_trait]
impl TxSigner for BrowserExtensionSigner {
    fn backend_name(&self) -> &'static str {
        "browser-extension"
    }

    async fn accounts(&self) -> Result<Vec<SigningIdentity>, Error> {
        self.provider
            .accounts(&self.chain_id)
            .await
            .map_err(|reason| Error::wallet_fetch_failed(self.provider.kind().to_string(), reason))
    }

    async fn sign_tx(&self, request: SignRequest<'_>) -> Result<SignedTx, Error> {
        let identity = self
            .accounts()
            .await?
            .into_iter()
            .find(|identity| identity.address == request.address)
            .ok_or_else(|| Error::missing_account(self.backend_name().to_string()))?;

        let signer_info = encode_signer_info(Some(&identity.public_key), request.sequence)?;
        let (body, body_bytes) = tx_body_and_bytes(request.messages, request.memo)?;
        let (auth_info, auth_info_bytes) = auth_info_and_bytes(signer_info, request.fee.clone())?;

        let outcome = self
            .provider
            .sign_direct(
                request.chain_id,
                request.address,
                &body_bytes,
                &auth_info_bytes,
                request.account_number.to_u64(),
            )
            .await;

        let signature = match outcome {
            ExtensionSignOutcome::Signed { signature } => signature,
            ExtensionSignOutcome::Rejected => {
                return Err(Error::signing_rejected(self.backend_name().to_string()))
            }
            ExtensionSignOutcome::Failed(reason) => {
                return Err(Error::wallet_fetch_failed(
                    self.provider.kind().to_string(),
                    reason,
                ))
            }
        };

        Ok(SignedTx {
            body,
            body_bytes,
            auth_info,
            auth_info_bytes,
            signatures: vec![signature],
        })
    }
}
