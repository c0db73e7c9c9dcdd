//! Ledger hardware signer.
//!
//! Device access goes through a [`LedgerTransport`] port so the same signer
//! drives USB and Bluetooth transports. Acquiring the device is a bounded
//! poll: the device may be locked or sitting in another app, so we retry with
//! a fixed backoff until a deadline instead of hanging forever.

use core::time::Duration;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::time::Instant;
use tracing::{debug, trace};

use crate::error::Error;
use crate::signer::{SignRequest, SigningIdentity, TxSigner};
use crate::tx::encode::{
    auth_info_and_bytes, encode_signer_info, sign_doc_bytes, tx_body_and_bytes,
};
use crate::tx::types::SignedTx;

/// Maximum time to wait for the device to become ready.
const ACQUIRE_DEADLINE: Duration = Duration::from_secs(20);

/// Pause between device readiness probes.
const ACQUIRE_BACKOFF: Duration = Duration::from_millis(500);

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TransportKind {
    Usb,
    Bluetooth,
}

impl TransportKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Usb => "usb",
            Self::Bluetooth => "bluetooth",
        }
    }
}

/// Outcome of a signing prompt shown on the device.
pub enum LedgerSignOutcome {
    Signed { signature: Vec<u8> },
    Rejected,
    Failed(String),
}

/// Port over a concrete Ledger transport, implemented by the shell.
#[async_trait]
pub trait LedgerTransport: Send + Sync {
    fn kind(&self) -> TransportKind;

    /// One readiness probe. `Ok(false)` means the device exists but is not
    /// ready yet (locked, wrong app); `Err` is a hard transport failure.
    async fn probe(&self) -> Result<bool, String>;

    async fn accounts(&self, hd_path: &str) -> Result<Vec<SigningIdentity>, String>;

    async fn sign(&self, hd_path: &str, sign_doc: &[u8]) -> LedgerSignOutcome;
}

pub struct LedgerSigner {
    transport: Arc<dyn LedgerTransport>,
    hd_path: String,
}

impl LedgerSigner {
    /// Wait for the device to become ready, then bind a signer to it.
    pub async fn acquire(
        transport: Arc<dyn LedgerTransport>,
        hd_path: impl Into<String>,
    ) -> Result<Self, Error> {
        let start = Instant::now();
        let kind = transport.kind();

        loop {
            match transport.probe().await {
                Ok(true) => break,
                Ok(false) => {
                    trace!(transport = kind.as_str(), "device not ready, retrying");
                }
                Err(reason) => {
                    return Err(Error::hardware_transport(kind.as_str().to_string(), reason))
                }
            }

            if start.elapsed() > ACQUIRE_DEADLINE {
                return Err(Error::hardware_transport_timeout(
                    kind.as_str().to_string(),
                    ACQUIRE_DEADLINE.as_secs(),
                ));
            }

            tokio::time::sleep(ACQUIRE_BACKOFF).await;
        }

        debug!(transport = kind.as_str(), "ledger device acquired");

        Ok(Self {
            transport,
            hd_path: hd_path.into(),
        })
    }
}

#[async_trait]
impl TxSigner for LedgerSigner {
    fn backend_name(&self) -> &'static str {
        "ledger"
    }

    async fn accounts(&self) -> Result<Vec<SigningIdentity>, Error> {
        self.transport
            .accounts(&self.hd_path)
            .await
            .map_err(|reason| {
                Error::hardware_transport(self.transport.kind().as_str().to_string(), reason)
            })
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

        let sign_doc = sign_doc_bytes(
            request.chain_id,
            request.account_number,
            body_bytes.clone(),
            auth_info_bytes.clone(),
        )?;

        let signature = match self.transport.sign(&self.hd_path, &sign_doc).await {
            LedgerSignOutcome::Signed { signature } => signature,
            LedgerSignOutcome::Rejected => {
                return Err(Error::signing_rejected(self.backend_name().to_string()))
            }
            LedgerSignOutcome::Failed(reason) => {
                return Err(Error::hardware_transport(
                    self.transport.kind().as_str().to_string(),
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

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    use super::*;
    use crate::error::ErrorDetail;

    struct NeverReady;

    #[async_trait]
    impl LedgerTransport for NeverReady {
        fn kind(&self) -> TransportKind {
            TransportKind::Usb
        }

        async fn probe(&self) -> Result<bool, String> {
            Ok(false)
        }

        async fn accounts(&self, _hd_path: &str) -> Result<Vec<SigningIdentity>, String> {
            Err("unreachable".to_string())
        }

        async fn sign(&self, _hd_path: &str, _sign_doc: &[u8]) -> LedgerSignOutcome {
            LedgerSignOutcome::Failed("unreachable".to_string())
        }
    }

    struct ReadyOnThird(AtomicU32);

    #[async_trait]
    impl LedgerTransport for ReadyOnThird {
        fn kind(&self) -> TransportKind {
            TransportKind::Bluetooth
        }

        async fn probe(&self) -> Result<bool, String> {
            Ok(self.0.fetch_add(1, Ordering::SeqCst) >= 2)
        }

        async fn accounts(&self, _hd_path: &str) -> Result<Vec<SigningIdentity>, String> {
            Ok(vec![])
        }

        async fn sign(&self, _hd_path: &str, _sign_doc: &[u8]) -> LedgerSignOutcome {
            LedgerSignOutcome::Rejected
        }
    }

    #[tokio::test(flavor = "current_thread", start_paused = true)]
    async fn acquire_times_out_for_unready_device() {
        let result = LedgerSigner::acquire(Arc::new(NeverReady), "m/44'/118'/0'/0/0").await;

        match result {
            Err(e) => match e.detail() {
                ErrorDetail::HardwareTransportTimeout(sub) => {
                    assert_eq!(sub.transport, "usb");
                    assert_eq!(sub.seconds, ACQUIRE_DEADLINE.as_secs());
                }
                detail => panic!("unexpected error: {detail}"),
            },
            Ok(_) => panic!("acquire should time out"),
        }
    }

    #[tokio::test(flavor = "current_thread", start_paused = true)]
    async fn acquire_retries_until_device_is_ready() {
        let transport = ReadyOnThird(AtomicU32::new(0));
        let signer = LedgerSigner::acquire(Arc::new(transport), "m/44'/118'/0'/0/0").await;
        assert!(signer.is_ok());
    }
}
