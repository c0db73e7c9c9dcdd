//! Social-login signer.
//!
//! An OAuth-style provider reconstructs a secp256k1 key share after the user
//! authenticates; from that point on the backend signs locally, exactly like
//! a raw key. The provider never learns the chain-side material beyond the
//! secret it hands over.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;
use zeroize::Zeroizing;

use crate::error::Error;
use crate::keyring::Secp256k1KeyPair;
use crate::signer::raw_key::sign_with_key_pair;
use crate::signer::{SignRequest, SigningIdentity, TxSigner};
use crate::tx::types::SignedTx;

/// Port over the social-login key reconstruction flow.
#[async_trait]
pub trait SocialLoginProvider: Send + Sync {
    /// Provider name, e.g. `google` or `apple`.
    fn name(&self) -> &'static str;

    /// Complete the login flow and reconstruct the 32-byte key share.
    async fn reconstruct_key(&self) -> Result<Zeroizing<Vec<u8>>, String>;
}

pub struct SocialLoginSigner {
    key_pair: Secp256k1KeyPair,
    provider_name: &'static str,
}

impl SocialLoginSigner {
    /// Run the provider login and bind a local signer to the recovered key.
    pub async fn login(
        provider: Arc<dyn SocialLoginProvider>,
        bech32_prefix: &str,
    ) -> Result<Self, Error> {
        let secret = provider
            .reconstruct_key()
            .await
            .map_err(|reason| Error::wallet_fetch_failed(provider.name().to_string(), reason))?;

        let key_pair =
            Secp256k1KeyPair::from_secret_bytes(&secret, bech32_prefix).map_err(Error::key_base)?;

        debug!(provider = provider.name(), account = %key_pair.account(), "social login complete");

        Ok(Self {
            key_pair,
            provider_name: provider.name(),
        })
    }

    pub fn provider_name(&self) -> &'static str {
        self.provider_name
    }
}

#[async_trait]
impl TxSigner for SocialLoginSigner {
    fn backend_name(&self) -> &'static str {
        "social-login"
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

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedShare;

    #[async_trait]
    impl SocialLoginProvider for FixedShare {
        fn name(&self) -> &'static str {
            "google"
        }

        async fn reconstruct_key(&self) -> Result<Zeroizing<Vec<u8>>, String> {
            Ok(Zeroizing::new(vec![0x42; 32]))
        }
    }

    struct FailingLogin;

    #[async_trait]
    impl SocialLoginProvider for FailingLogin {
        fn name(&self) -> &'static str {
            "apple"
        }

        async fn reconstruct_key(&self) -> Result<Zeroizing<Vec<u8>>, String> {
            Err("popup closed".to_string())
        }
    }

    #[tokio::test]
    async fn login_binds_a_local_identity() {
        let signer = SocialLoginSigner::login(Arc::new(FixedShare), "nolus")
            .await
            .unwrap();

        let accounts = signer.accounts().await.unwrap();
        assert_eq!(accounts.len(), 1);
        assert!(accounts[0].address.starts_with("nolus1"));
    }

    #[tokio::test]
    async fn failed_login_reports_the_provider() {
        let result = SocialLoginSigner::login(Arc::new(FailingLogin), "nolus").await;
        assert!(result.is_err());
    }
}
