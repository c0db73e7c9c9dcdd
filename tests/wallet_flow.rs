//! End-to-end build attempts against stubbed collaborators.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use ibc_proto::cosmos::bank::v1beta1::MsgSend;
use ibc_proto::cosmos::base::v1beta1::Coin;
use ibc_proto::cosmos::tx::v1beta1::{AuthInfo, TxBody};
use ibc_proto::google::protobuf::Any;
use prost::Message;

use nolus_wallet::account::{Account, AccountNumber, AccountSequence};
use nolus_wallet::config::{ChainInfo, FeeConfig, Memo};
use nolus_wallet::error::ErrorDetail;
use nolus_wallet::keyring::pubkey::PublicKey;
use nolus_wallet::keyring::Secp256k1KeyPair;
use nolus_wallet::messages;
use nolus_wallet::provider::{AccountFetcher, FeeConfigProvider, GasEstimator};
use nolus_wallet::signer::extension::{
    BrowserExtensionSigner, ExtensionProvider, ExtensionSignOutcome,
};
use nolus_wallet::signer::raw_key::RawKeySigner;
use nolus_wallet::signer::{Availability, OwnSimulation, SignRequest, SigningIdentity, TxSigner};
use nolus_wallet::tx::encode::{auth_info_and_bytes, encode_signer_info, tx_body_and_bytes};
use nolus_wallet::tx::types::{GasEstimate, SignedTx};
use nolus_wallet::wallet::BaseWallet;

const CHAIN_ID: &str = "pirin-1";
const FEE_DENOM: &str = "unls";

fn chain_info() -> ChainInfo {
    ChainInfo {
        chain_id: CHAIN_ID.to_string(),
        chain_name: "nolus".to_string(),
        rpc: "https://rpc.nolus.network".to_string(),
        rest: "https://lcd.nolus.network".to_string(),
        bech32_prefix: "nolus".to_string(),
        fee_denoms: vec![FEE_DENOM.to_string()],
        staking_denom: FEE_DENOM.to_string(),
    }
}

/// Fetcher whose sequence advances by one on every call, as the chain's
/// would after each committed transaction.
struct SteppingFetcher {
    next_sequence: AtomicU64,
}

#[async_trait]
impl AccountFetcher for SteppingFetcher {
    async fn fetch_account(&self, address: &str) -> Result<Account, nolus_wallet::Error> {
        Ok(Account {
            address: address.to_string(),
            public_key: None,
            number: AccountNumber::new(11),
            sequence: AccountSequence::new(self.next_sequence.fetch_add(1, Ordering::SeqCst)),
        })
    }
}

/// Estimator returning a fixed gas figure and recording the sequence of
/// every request it sees.
struct FixedEstimator {
    gas_used: u64,
    seen_sequences: Mutex<Vec<u64>>,
}

impl FixedEstimator {
    fn new(gas_used: u64) -> Self {
        Self {
            gas_used,
            seen_sequences: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl GasEstimator for FixedEstimator {
    async fn estimate_gas(
        &self,
        _messages: &[Any],
        _public_key: Option<&PublicKey>,
        sequence: AccountSequence,
        _memo: &Memo,
    ) -> Result<GasEstimate, nolus_wallet::Error> {
        self.seen_sequences.lock().unwrap().push(sequence.to_u64());
        Ok(GasEstimate::new(self.gas_used))
    }
}

struct StaticFeeConfig(Option<FeeConfig>);

impl FeeConfigProvider for StaticFeeConfig {
    fn get(&self) -> Option<FeeConfig> {
        self.0.clone()
    }
}

fn fee_config(multiplier: f64, price: f64) -> StaticFeeConfig {
    StaticFeeConfig(Some(FeeConfig {
        gas_prices: BTreeMap::from([(FEE_DENOM.to_string(), price)]),
        gas_multiplier: multiplier,
        multiplier_overrides: BTreeMap::new(),
    }))
}

/// Extension stub: always installed, approves every prompt, and records the
/// exact bytes it was asked to sign.
struct ApprovingExtension {
    identity: SigningIdentity,
    signed: Mutex<Vec<(Vec<u8>, Vec<u8>)>>,
}

impl ApprovingExtension {
    fn new() -> Self {
        Self {
            identity: SigningIdentity {
                address: "nolus1sender".to_string(),
                public_key: PublicKey::secp256k1(&[0x02; 33]).unwrap(),
            },
            signed: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl ExtensionProvider for ApprovingExtension {
    fn kind(&self) -> &'static str {
        "keplr"
    }

    fn detect(&self) -> Availability {
        Availability::Available
    }

    async fn suggest_chain(&self, _chain_info: &ChainInfo) -> Result<(), String> {
        Ok(())
    }

    async fn enable(&self, _chain_id: &str) -> Result<(), String> {
        Ok(())
    }

    async fn accounts(&self, _chain_id: &str) -> Result<Vec<SigningIdentity>, String> {
        Ok(vec![self.identity.clone()])
    }

    async fn sign_direct(
        &self,
        _chain_id: &str,
        _address: &str,
        body_bytes: &[u8],
        auth_info_bytes: &[u8],
        _account_number: u64,
    ) -> ExtensionSignOutcome {
        self.signed
            .lock()
            .unwrap()
            .push((body_bytes.to_vec(), auth_info_bytes.to_vec()));
        ExtensionSignOutcome::Signed {
            signature: vec![0xAB; 64],
        }
    }
}

/// Extension stub whose user dismisses every prompt.
struct RejectingExtension {
    inner: ApprovingExtension,
}

#[async_trait]
impl ExtensionProvider for RejectingExtension {
    fn kind(&self) -> &'static str {
        "keplr"
    }

    fn detect(&self) -> Availability {
        Availability::Available
    }

    async fn suggest_chain(&self, _chain_info: &ChainInfo) -> Result<(), String> {
        Ok(())
    }

    async fn enable(&self, _chain_id: &str) -> Result<(), String> {
        Ok(())
    }

    async fn accounts(&self, _chain_id: &str) -> Result<Vec<SigningIdentity>, String> {
        self.inner.accounts(_chain_id).await
    }

    async fn sign_direct(
        &self,
        _chain_id: &str,
        _address: &str,
        _body_bytes: &[u8],
        _auth_info_bytes: &[u8],
        _account_number: u64,
    ) -> ExtensionSignOutcome {
        ExtensionSignOutcome::Rejected
    }
}

async fn extension_wallet(
    provider: Arc<dyn ExtensionProvider>,
    estimator: Arc<FixedEstimator>,
    fee_config: StaticFeeConfig,
    starting_sequence: u64,
) -> BaseWallet {
    let signer = BrowserExtensionSigner::connect(provider, &chain_info())
        .await
        .unwrap();

    BaseWallet::use_account(
        CHAIN_ID,
        FEE_DENOM,
        Arc::new(signer),
        Arc::new(SteppingFetcher {
            next_sequence: AtomicU64::new(starting_sequence),
        }),
        Arc::new(fee_config),
        estimator,
    )
    .await
    .unwrap()
}

fn unls(amount: &str) -> Coin {
    Coin {
        denom: FEE_DENOM.to_string(),
        amount: amount.to_string(),
    }
}

#[tokio::test]
async fn extension_happy_path_produces_a_priced_broadcastable_tx() {
    let provider = Arc::new(ApprovingExtension::new());
    let estimator = Arc::new(FixedEstimator::new(100_000));

    let wallet = extension_wallet(
        provider.clone(),
        estimator.clone(),
        fee_config(1.4, 0.025),
        5,
    )
    .await;

    let memo = Memo::new("").unwrap();
    let ready = wallet
        .transfer_amount("nolus1recipient", vec![unls("10")], &memo)
        .await
        .unwrap();

    // round(100000 * 1.4)
    assert_eq!(ready.gas_limit, 140_000);
    assert_eq!(ready.tx_hash.len(), 64);
    assert!(ready.tx_hash.chars().all(|c| c.is_ascii_hexdigit()));
    assert!(!ready.raw_bytes.is_empty());

    // the simulate call saw the fetched sequence
    assert_eq!(*estimator.seen_sequences.lock().unwrap(), vec![5]);

    // the fee the user approved is priced in the configured denom
    let signed = provider.signed.lock().unwrap();
    assert_eq!(signed.len(), 1);
    let auth_info = AuthInfo::decode(signed[0].1.as_slice()).unwrap();
    let fee = auth_info.fee.unwrap();
    assert_eq!(fee.gas_limit, 140_000);
    assert_eq!(fee.amount.len(), 1);
    assert_eq!(fee.amount[0].denom, FEE_DENOM);
    let priced: u64 = fee.amount[0].amount.parse().unwrap();
    assert!((3500..=3501).contains(&priced));
}

#[tokio::test]
async fn consecutive_attempts_use_strictly_increasing_sequences() {
    let provider = Arc::new(ApprovingExtension::new());
    let estimator = Arc::new(FixedEstimator::new(90_000));

    let wallet = extension_wallet(
        provider,
        estimator.clone(),
        fee_config(1.4, 0.025),
        7,
    )
    .await;

    let memo = Memo::new("").unwrap();
    wallet
        .transfer_amount("nolus1recipient", vec![unls("1")], &memo)
        .await
        .unwrap();
    wallet
        .transfer_amount("nolus1recipient", vec![unls("1")], &memo)
        .await
        .unwrap();

    let sequences = estimator.seen_sequences.lock().unwrap().clone();
    assert_eq!(sequences, vec![7, 8]);
    assert!(sequences.windows(2).all(|w| w[0] < w[1]));
}

#[tokio::test]
async fn multi_message_body_is_atomic() {
    let provider = Arc::new(ApprovingExtension::new());
    let estimator = Arc::new(FixedEstimator::new(250_000));

    let wallet = extension_wallet(
        provider.clone(),
        estimator,
        fee_config(1.4, 0.025),
        0,
    )
    .await;

    let msgs: Vec<Any> = (0..3)
        .map(|i| {
            messages::bank_send(wallet.address(), "nolus1recipient", vec![unls(&i.to_string())])
                .unwrap()
        })
        .collect();

    let memo = Memo::new("batch").unwrap();
    wallet.build_tx(&msgs, &memo).await.unwrap();

    let signed = provider.signed.lock().unwrap();
    let body = TxBody::decode(signed[0].0.as_slice()).unwrap();
    assert_eq!(body.messages.len(), 3);
    assert_eq!(body.memo, "batch");

    for (i, any) in body.messages.iter().enumerate() {
        let msg = MsgSend::decode(any.value.as_slice()).unwrap();
        assert_eq!(msg.amount[0].amount, i.to_string());
    }
}

#[tokio::test]
async fn missing_fee_config_aborts_before_signing() {
    let provider = Arc::new(ApprovingExtension::new());
    let estimator = Arc::new(FixedEstimator::new(100_000));

    let wallet = extension_wallet(
        provider.clone(),
        estimator,
        StaticFeeConfig(None),
        0,
    )
    .await;

    let memo = Memo::new("").unwrap();
    let err = wallet
        .transfer_amount("nolus1recipient", vec![unls("10")], &memo)
        .await
        .unwrap_err();

    assert!(matches!(
        err.detail(),
        ErrorDetail::GasConfigUnavailable(_)
    ));
    assert!(provider.signed.lock().unwrap().is_empty());
}

#[tokio::test]
async fn user_rejection_is_a_distinct_outcome() {
    let provider = Arc::new(RejectingExtension {
        inner: ApprovingExtension::new(),
    });
    let estimator = Arc::new(FixedEstimator::new(100_000));

    let wallet = extension_wallet(provider, estimator, fee_config(1.4, 0.025), 0).await;

    let memo = Memo::new("").unwrap();
    let err = wallet
        .transfer_amount("nolus1recipient", vec![unls("10")], &memo)
        .await
        .unwrap_err();

    assert!(err.is_user_rejection());
}

#[tokio::test]
async fn multiplier_override_applies_per_leading_message_type() {
    let provider = Arc::new(ApprovingExtension::new());
    let estimator = Arc::new(FixedEstimator::new(100_000));

    let mut config = fee_config(1.4, 0.025);
    config
        .0
        .as_mut()
        .unwrap()
        .multiplier_overrides
        .insert(messages::EXECUTE_CONTRACT_TYPE_URL.to_string(), 2.0);

    let wallet = extension_wallet(provider, estimator, config, 0).await;

    let memo = Memo::new("").unwrap();
    let ready = wallet
        .execute_contract("nolus1contract", b"{}".to_vec(), &[], &memo)
        .await
        .unwrap();

    assert_eq!(ready.gas_limit, 200_000);
}

#[tokio::test]
async fn raw_key_wallet_signs_locally() {
    let key_pair = Secp256k1KeyPair::from_secret_bytes(&[0x33; 32], "nolus").unwrap();
    let address = key_pair.account().to_string();
    let estimator = Arc::new(FixedEstimator::new(80_000));

    let wallet = BaseWallet::use_account(
        CHAIN_ID,
        FEE_DENOM,
        Arc::new(RawKeySigner::new(key_pair)),
        Arc::new(SteppingFetcher {
            next_sequence: AtomicU64::new(0),
        }),
        Arc::new(fee_config(1.5, 0.025)),
        estimator,
    )
    .await
    .unwrap();

    assert_eq!(wallet.address(), address);

    let memo = Memo::new("").unwrap();
    let ready = wallet
        .transfer_amount("nolus1recipient", vec![unls("10")], &memo)
        .await
        .unwrap();

    assert_eq!(ready.gas_limit, 120_000);
    assert!(!ready.raw_bytes.is_empty());
}

/// Signer that owns its simulation path, counting how each capability is
/// dispatched.
struct SelfSimulatingSigner {
    identity: SigningIdentity,
    single_calls: AtomicU64,
    multi_calls: AtomicU64,
}

impl SelfSimulatingSigner {
    fn new() -> Self {
        Self {
            identity: SigningIdentity {
                address: "nolus1sender".to_string(),
                public_key: PublicKey::secp256k1(&[0x02; 33]).unwrap(),
            },
            single_calls: AtomicU64::new(0),
            multi_calls: AtomicU64::new(0),
        }
    }
}

#[async_trait]
impl TxSigner for SelfSimulatingSigner {
    fn backend_name(&self) -> &'static str {
        "solana-bridge"
    }

    async fn accounts(&self) -> Result<Vec<SigningIdentity>, nolus_wallet::Error> {
        Ok(vec![self.identity.clone()])
    }

    async fn sign_tx(&self, request: SignRequest<'_>) -> Result<SignedTx, nolus_wallet::Error> {
        let signer_info = encode_signer_info(Some(&self.identity.public_key), request.sequence)?;
        let (body, body_bytes) = tx_body_and_bytes(request.messages, request.memo)?;
        let (auth_info, auth_info_bytes) = auth_info_and_bytes(signer_info, request.fee.clone())?;

        Ok(SignedTx {
            body,
            body_bytes,
            auth_info,
            auth_info_bytes,
            signatures: vec![vec![0u8; 64]],
        })
    }

    fn own_simulation(&self) -> Option<&dyn OwnSimulation> {
        Some(self)
    }
}

#[async_trait]
impl OwnSimulation for SelfSimulatingSigner {
    async fn simulate_tx(
        &self,
        _message: &Any,
        _memo: &Memo,
    ) -> Result<GasEstimate, nolus_wallet::Error> {
        self.single_calls.fetch_add(1, Ordering::SeqCst);
        Ok(GasEstimate::new(55_000))
    }

    async fn simulate_multi_tx(
        &self,
        messages: &[Any],
        _memo: &Memo,
    ) -> Result<GasEstimate, nolus_wallet::Error> {
        self.multi_calls.fetch_add(1, Ordering::SeqCst);
        Ok(GasEstimate::new(55_000 * messages.len() as u64))
    }
}

#[tokio::test]
async fn own_simulation_backend_bypasses_the_local_estimator() {
    let signer = Arc::new(SelfSimulatingSigner::new());
    let estimator = Arc::new(FixedEstimator::new(999_999));

    let wallet = BaseWallet::use_account(
        CHAIN_ID,
        FEE_DENOM,
        signer.clone(),
        Arc::new(SteppingFetcher {
            next_sequence: AtomicU64::new(0),
        }),
        Arc::new(fee_config(1.4, 0.025)),
        estimator.clone(),
    )
    .await
    .unwrap();

    let memo = Memo::new("").unwrap();

    // single message dispatches to the single-message capability
    let ready = wallet
        .transfer_amount("nolus1recipient", vec![unls("10")], &memo)
        .await
        .unwrap();
    assert_eq!(ready.gas_limit, 77_000);
    assert_eq!(signer.single_calls.load(Ordering::SeqCst), 1);
    assert_eq!(signer.multi_calls.load(Ordering::SeqCst), 0);

    // multiple messages dispatch to the multi-message capability
    let msgs: Vec<Any> = (0..3)
        .map(|_| messages::bank_send(wallet.address(), "nolus1recipient", vec![unls("1")]).unwrap())
        .collect();
    wallet.build_tx(&msgs, &memo).await.unwrap();
    assert_eq!(signer.single_calls.load(Ordering::SeqCst), 1);
    assert_eq!(signer.multi_calls.load(Ordering::SeqCst), 1);

    // the local estimator was never consulted
    assert!(estimator.seen_sequences.lock().unwrap().is_empty());
}

/// Backend exposing no signing identities.
struct NoIdentitySigner;

#[async_trait]
impl TxSigner for NoIdentitySigner {
    fn backend_name(&self) -> &'static str {
        "ledger"
    }

    async fn accounts(&self) -> Result<Vec<SigningIdentity>, nolus_wallet::Error> {
        Ok(vec![])
    }

    async fn sign_tx(&self, _request: SignRequest<'_>) -> Result<SignedTx, nolus_wallet::Error> {
        Err(nolus_wallet::Error::missing_account(
            self.backend_name().to_string(),
        ))
    }
}

#[tokio::test]
async fn binding_to_an_identityless_backend_is_a_missing_account() {
    let err = BaseWallet::use_account(
        CHAIN_ID,
        FEE_DENOM,
        Arc::new(NoIdentitySigner),
        Arc::new(SteppingFetcher {
            next_sequence: AtomicU64::new(0),
        }),
        Arc::new(fee_config(1.4, 0.025)),
        Arc::new(FixedEstimator::new(0)),
    )
    .await
    .unwrap_err();

    match err.detail() {
        ErrorDetail::MissingAccount(sub) => assert_eq!(sub.backend, "ledger"),
        detail => panic!("unexpected error: {detail}"),
    }
}
