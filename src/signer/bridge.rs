//! Solana bridge signer.
//!
//! The bridge wallet holds the signing material on the Solana side and never
//! lets this layer see or construct it, which also means it cannot accept a
//! locally assembled simulate transaction. It therefore implements
//! [`OwnSimulation`], and the wallet routes every gas estimate for this
//! backend through the bridge itself.

use std::sync::Arc;

use async_trait::async_trait;
use ibc_proto::google::protobuf::Any;

use crate::config::Memo;
use crate::error::Error;
use crate::signer::{OwnSimulation, SignRequest, SigningIdentity, TxSigner};
use crate::tx::encode::{auth_info_and_bytes, encode_signer_info, tx_body_and_bytes};
use crate::tx::types::{GasEstimate, SignedTx};

/// Outcome of a bridge signing prompt.
pub enum BridgeSignOutcome {
    Signed { signature: Vec<u8> },
    Rejected,
    Failed(String),
}

/// Port over the Solana-side bridge wallet, implemented by the shell.
#[async_trait]
pub trait BridgeProvider: Send + Sync {
    /// Bridge name, e.g. `phantom`.
    fn name(&self) -> &'static str;

    async fn accounts(&self) -> Result<Vec<SigningIdentity>, String>;

    /// Prompt for a signature over the prepared direct-sign bytes.
    async fn sign_direct(
        &self,
        chain_id: &str,
        address: &str,
        body_bytes: &[u8],
        auth_info_bytes: &[u8],
        account_number: u64,
    ) -> BridgeSignOutcome;

    /// Gas estimation performed on the bridge side.
    async fn simulate(&self, messages: &[Any], memo: &str) -> Result<u64, String>;
}

pub struct SolanaBridgeSigner {
    provider: Arc<dyn BridgeProvider>,
}

impl SolanaBridgeSigner {
    pub fn new(provider: Arc<dyn BridgeProvider>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl TxSigner for SolanaBridgeSigner {
    fn backend_name(&self) -> &'static str {
        "solana-bridge"
    }

    async fn accounts(&self) -> Result<Vec<SigningIdentity>, Error> {
        self.provider
            .accounts()
            .await
            .map_err(|reason| Error::wallet_fetch_failed(self.provider.name().to_string(), reason))
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
            BridgeSignOutcome::Signed { signature } => signature,
            BridgeSignOutcome::Rejected => {
                return Err(Error::signing_rejected(self.backend_name().to_string()))
            }
            BridgeSignOutcome::Failed(reason) => {
                return Err(Error::wallet_fetch_failed(
                    self.provider.name().to_string(),
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

    fn own_simulation(&self) -> Option<&dyn OwnSimulation> {
        Some(self)
    }
}

#[async_trait]
impl OwnSimulation for SolanaBridgeSigner {
    async fn simulate_tx(&self, message: &Any, memo: &Memo) -> Result<GasEstimate, Error> {
        self.simulate_multi_tx(std::slice::from_ref(message), memo)
            .await
    }

    async fn simulate_multi_tx(
        &self,
        messages: &[Any],
        memo: &Memo,
    ) -> Result<GasEstimate, Error> {
        let gas_used = self
            .provider
            .simulate(messages, memo.as_str())
            .await
            .map_err(Error::simulation)?;

        Ok(GasEstimate { gas_used })
    }
}
