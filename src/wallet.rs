//! The transaction builder.
//!
//! [`BaseWallet`] drives one signing attempt end to end: fetch the current
//! account sequence, estimate gas, price a fee, collect a signature, and
//! serialize to broadcast-ready bytes. Every attempt re-fetches the sequence;
//! a failed attempt leaves no state behind and is restarted from scratch.
//!
//! Collaborators are constructor-injected. The gas estimator is bypassed
//! entirely when the signer backend owns its simulation path; that routing is
//! mandatory, not a preference.

use std::sync::Arc;

use ibc_proto::cosmos::base::v1beta1::Coin;
use ibc_proto::cosmos::tx::v1beta1::Fee;
use ibc_proto::google::protobuf::Any;
use tracing::{debug, info};

use crate::account::Account;
use crate::config::Memo;
use crate::error::Error;
use crate::keyring::pubkey::PublicKey;
use crate::messages;
use crate::provider::{AccountFetcher, FeeConfigProvider, GasEstimator};
use crate::signer::{SignRequest, TxSigner};
use crate::tx::encode::{encode_tx_raw, tx_hash};
use crate::tx::gas::gas_amount_to_fee;
use crate::tx::types::{GasEstimate, PrettyFee, ReadyTx};

pub struct BaseWallet {
    chain_id: String,
    fee_denom: String,
    address: String,
    public_key: PublicKey,
    signer: Arc<dyn TxSigner>,
    account_fetcher: Arc<dyn AccountFetcher>,
    fee_config: Arc<dyn FeeConfigProvider>,
    estimator: Arc<dyn GasEstimator>,
}

impl std::fmt::Debug for BaseWallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BaseWallet")
            .field("chain_id", &self.chain_id)
            .field("fee_denom", &self.fee_denom)
            .field("address", &self.address)
            .field("public_key", &self.public_key)
            .finish_non_exhaustive()
    }
}

impl BaseWallet {
    /// Bind a wallet to the signer's first exposed identity.
    ///
    /// A backend with no identities is fatal here; proceeding with a default
    /// address would sign for the wrong account.
    pub async fn use_account(
        chain_id: impl Into<String>,
        fee_denom: impl Into<String>,
        signer: Arc<dyn TxSigner>,
        account_fetcher: Arc<dyn AccountFetcher>,
        fee_config: Arc<dyn FeeConfigProvider>,
        estimator: Arc<dyn GasEstimator>,
    ) -> Result<Self, Error> {
        let identity = signer
            .accounts()
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| Error::missing_account(signer.backend_name().to_string()))?;

        Ok(Self {
            chain_id: chain_id.into(),
            fee_denom: fee_denom.into(),
            address: identity.address,
            public_key: identity.public_key,
            signer,
            account_fetcher,
            fee_config,
            estimator,
        })
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    pub fn chain_id(&self) -> &str {
        &self.chain_id
    }

    /// Build, sign, and serialize one transaction carrying the full message
    /// set as an atomic unit.
    pub async fn build_tx(&self, messages: &[Any], memo: &Memo) -> Result<ReadyTx, Error> {
        if messages.is_empty() {
            return Err(Error::invalid_message(
                "cannot build a transaction with no messages".to_string(),
            ));
        }

        let account = self.fetch_account().await?;
        let estimate = self.estimate(messages, &account, memo).await?;
        let fee = self.select_fee(messages, estimate)?;

        debug!(
            id = %self.chain_id,
            account = %self.address,
            sequence = %account.sequence,
            fee = %PrettyFee(&fee),
            "signing transaction"
        );

        let signed_tx = self
            .signer
            .sign_tx(SignRequest {
                chain_id: &self.chain_id,
                address: &self.address,
                messages,
                fee: &fee,
                memo,
                account_number: account.number,
                sequence: account.sequence,
            })
            .await?;

        let raw_bytes = encode_tx_raw(&signed_tx)?;
        let tx_hash = tx_hash(&raw_bytes);

        info!(
            id = %self.chain_id,
            account = %self.address,
            tx_hash = %tx_hash,
            "transaction ready for broadcast"
        );

        Ok(ReadyTx {
            raw_bytes,
            tx_hash,
            gas_limit: fee.gas_limit,
        })
    }

    /// Estimate gas for a message set without signing anything.
    pub async fn simulate_tx(&self, messages: &[Any], memo: &Memo) -> Result<GasEstimate, Error> {
        if messages.is_empty() {
            return Err(Error::invalid_message(
                "cannot simulate a transaction with no messages".to_string(),
            ));
        }

        let account = self.fetch_account().await?;
        self.estimate(messages, &account, memo).await
    }

    pub async fn transfer_amount(
        &self,
        to_address: &str,
        amount: Vec<Coin>,
        memo: &Memo,
    ) -> Result<ReadyTx, Error> {
        let msg = messages::bank_send(&self.address, to_address, amount)?;
        self.build_tx(&[msg], memo).await
    }

    pub async fn send_ibc_tokens(
        &self,
        receiver: &str,
        source_channel: &str,
        token: Coin,
        timeout_timestamp_ns: u64,
        memo: &Memo,
    ) -> Result<ReadyTx, Error> {
        let msg = messages::ibc_transfer(
            &self.address,
            receiver,
            source_channel,
            token,
            timeout_timestamp_ns,
            memo.as_str(),
        )?;
        self.build_tx(&[msg], memo).await
    }

    pub async fn execute_contract(
        &self,
        contract: &str,
        msg_json: Vec<u8>,
        funds: &[Coin],
        memo: &Memo,
    ) -> Result<ReadyTx, Error> {
        let msg = messages::execute_contract(&self.address, contract, msg_json, funds)?;
        self.build_tx(&[msg], memo).await
    }

    pub async fn delegate(
        &self,
        validator_address: &str,
        amount: &Coin,
        memo: &Memo,
    ) -> Result<ReadyTx, Error> {
        let msg = messages::delegate(&self.address, validator_address, amount)?;
        self.build_tx(&[msg], memo).await
    }

    pub async fn undelegate(
        &self,
        validator_address: &str,
        amount: &Coin,
        memo: &Memo,
    ) -> Result<ReadyTx, Error> {
        let msg = messages::undelegate(&self.address, validator_address, amount)?;
        self.build_tx(&[msg], memo).await
    }

    pub async fn vote(
        &self,
        proposal_id: u64,
        option: messages::VoteOption,
        memo: &Memo,
    ) -> Result<ReadyTx, Error> {
        let msg = messages::vote(&self.address, proposal_id, option)?;
        self.build_tx(&[msg], memo).await
    }

    pub async fn withdraw_rewards(
        &self,
        validator_address: &str,
        memo: &Memo,
    ) -> Result<ReadyTx, Error> {
        let msg = messages::withdraw_rewards(&self.address, validator_address)?;
        self.build_tx(&[msg], memo).await
    }

    pub async fn simulate_bank_transfer_tx(
        &self,
        to_address: &str,
        amount: Vec<Coin>,
        memo: &Memo,
    ) -> Result<GasEstimate, Error> {
        let msg = messages::bank_send(&self.address, to_address, amount)?;
        self.simulate_tx(&[msg], memo).await
    }

    pub async fn simulate_send_ibc_tokens_tx(
        &self,
        receiver: &str,
        source_channel: &str,
        token: Coin,
        timeout_timestamp_ns: u64,
        memo: &Memo,
    ) -> Result<GasEstimate, Error> {
        let msg = messages::ibc_transfer(
            &self.address,
            receiver,
            source_channel,
            token,
            timeout_timestamp_ns,
            memo.as_str(),
        )?;
        self.simulate_tx(&[msg], memo).await
    }

    async fn fetch_account(&self) -> Result<Account, Error> {
        self.account_fetcher
            .fetch_account(&self.address)
            .await
            .map_err(|e| Error::sequence_fetch(self.address.clone(), e.to_string()))
    }

    async fn estimate(
        &self,
        messages: &[Any],
        account: &Account,
        memo: &Memo,
    ) -> Result<GasEstimate, Error> {
        if let Some(own) = self.signer.own_simulation() {
            return match messages {
                [single] => own.simulate_tx(single, memo).await,
                _ => own.simulate_multi_tx(messages, memo).await,
            };
        }

        let public_key = account.public_key.as_ref().unwrap_or(&self.public_key);

        self.estimator
            .estimate_gas(messages, Some(public_key), account.sequence, memo)
            .await
    }

    fn select_fee(&self, messages: &[Any], estimate: GasEstimate) -> Result<Fee, Error> {
        let config = self
            .fee_config
            .get()
            .ok_or_else(Error::gas_config_unavailable)?;

        // type URL of the leading message decides any multiplier override
        let multiplier = config.multiplier_for(&messages[0].type_url);

        let price = config
            .price_for(&self.fee_denom)
            .ok_or_else(Error::gas_config_unavailable)?;

        Ok(gas_amount_to_fee(estimate.gas_used, multiplier, &price))
    }
}
