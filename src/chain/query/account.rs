//! On-chain account retrieval and decoding.
//!
//! The connected networks return several account shapes: the base account,
//! the module account, the four Cosmos-SDK vesting wrappers, Ethermint-style
//! eth accounts and Stride's periodic vesting wrapper. All wrappers unwrap
//! recursively to their embedded base account; a wrapper without one
//! violates the wrapper's own invariant and is a fatal decode error. The
//! recognized set is fixed; a new chain-specific shape is an explicit
//! extension here, not a generic fallback.

use cosmos_sdk_proto::cosmos::auth::v1beta1::{BaseAccount, ModuleAccount};
use cosmos_sdk_proto::cosmos::vesting::v1beta1::{
    BaseVestingAccount, ContinuousVestingAccount, DelayedVestingAccount, PeriodicVestingAccount,
};
use http::uri::Uri;
use ibc_proto::cosmos::auth::v1beta1::query_client::QueryClient;
use ibc_proto::cosmos::auth::v1beta1::QueryAccountRequest;
use ibc_proto::google::protobuf::Any;
use prost::Message;
use tracing::info;

use crate::account::{Account, AccountNumber, AccountSequence};
use crate::error::Error;
use crate::keyring::pubkey::decode_pubkey;

pub const BASE_ACCOUNT_TYPE_URL: &str = "/cosmos.auth.v1beta1.BaseAccount";
pub const MODULE_ACCOUNT_TYPE_URL: &str = "/cosmos.auth.v1beta1.ModuleAccount";
pub const BASE_VESTING_ACCOUNT_TYPE_URL: &str = "/cosmos.vesting.v1beta1.BaseVestingAccount";
pub const CONTINUOUS_VESTING_ACCOUNT_TYPE_URL: &str =
    "/cosmos.vesting.v1beta1.ContinuousVestingAccount";
pub const DELAYED_VESTING_ACCOUNT_TYPE_URL: &str = "/cosmos.vesting.v1beta1.DelayedVestingAccount";
pub const PERIODIC_VESTING_ACCOUNT_TYPE_URL: &str =
    "/cosmos.vesting.v1beta1.PeriodicVestingAccount";
pub const STRIDE_PERIODIC_VESTING_ACCOUNT_TYPE_URL: &str =
    "/stride.vesting.StridePeriodicVestingAccount";

/// `ethermint.types.v1.EthAccount`; declared locally so the embedded base
/// account shares the decoder's protobuf types.
#[derive(Clone, PartialEq, ::prost::Message)]
struct EthAccount {
    #[prost(message, optional, tag = "1")]
    base_account: Option<BaseAccount>,
    #[prost(string, tag = "2")]
    code_hash: String,
}

/// `stride.vesting.StridePeriodicVestingAccount`; only the embedded vesting
/// wrapper is of interest, remaining fields are skipped by prost.
#[derive(Clone, PartialEq, ::prost::Message)]
struct StridePeriodicVestingAccount {
    #[prost(message, optional, tag = "1")]
    base_vesting_account: Option<BaseVestingAccount>,
}

/// Uses the gRPC client to retrieve a fresh account snapshot; the sequence
/// it carries is only valid for a single signing attempt.
pub async fn query_account(grpc_address: &Uri, account_address: &str) -> Result<Account, Error> {
    let mut client = QueryClient::connect(grpc_address.clone())
        .await
        .map_err(Error::grpc_transport)?;

    let request = tonic::Request::new(QueryAccountRequest {
        address: account_address.to_string(),
    });

    let response = client
        .account(request)
        .await
        .map_err(|e| Error::grpc_status("query_account".to_string(), e))?;

    // Querying for an account might fail, i.e. if the account doesn't actually exist
    let resp_account = match response.into_inner().account {
        Some(account) => account,
        None => return Err(Error::empty_query_account(account_address.to_string())),
    };

    let account = decode_account(&resp_account.type_url, &resp_account.value)?;

    info!(
        sequence = %account.sequence,
        number = %account.number,
        "retrieved account",
    );

    Ok(account)
}

/// Decode a heterogeneous on-chain account payload into the normalized
/// account record.
pub fn decode_account(type_url: &str, bytes: &[u8]) -> Result<Account, Error> {
    match type_url {
        BASE_ACCOUNT_TYPE_URL => {
            let base = BaseAccount::decode(bytes)
                .map_err(|e| Error::protobuf_decode("BaseAccount".to_string(), e))?;
            account_from_base(base)
        }
        MODULE_ACCOUNT_TYPE_URL => {
            let module = ModuleAccount::decode(bytes)
                .map_err(|e| Error::protobuf_decode("ModuleAccount".to_string(), e))?;
            account_from_base(module.base_account.ok_or_else(Error::empty_base_account)?)
        }
        BASE_VESTING_ACCOUNT_TYPE_URL => {
            let vesting = BaseVestingAccount::decode(bytes)
                .map_err(|e| Error::protobuf_decode("BaseVestingAccount".to_string(), e))?;
            account_from_base_vesting(vesting)
        }
        CONTINUOUS_VESTING_ACCOUNT_TYPE_URL => {
            let vesting = ContinuousVestingAccount::decode(bytes)
                .map_err(|e| Error::protobuf_decode("ContinuousVestingAccount".to_string(), e))?;
            account_from_base_vesting(
                vesting
                    .base_vesting_account
                    .ok_or_else(Error::empty_base_account)?,
            )
        }
        DELAYED_VESTING_ACCOUNT_TYPE_URL => {
            let vesting = DelayedVestingAccount::decode(bytes)
                .map_err(|e| Error::protobuf_decode("DelayedVestingAccount".to_string(), e))?;
            account_from_base_vesting(
                vesting
                    .base_vesting_account
                    .ok_or_else(Error::empty_base_account)?,
            )
        }
        PERIODIC_VESTING_ACCOUNT_TYPE_URL => {
            let vesting = PeriodicVestingAccount::decode(bytes)
                .map_err(|e| Error::protobuf_decode("PeriodicVestingAccount".to_string(), e))?;
            account_from_base_vesting(
                vesting
                    .base_vesting_account
                    .ok_or_else(Error::empty_base_account)?,
            )
        }
        STRIDE_PERIODIC_VESTING_ACCOUNT_TYPE_URL => {
            let vesting = StridePeriodicVestingAccount::decode(bytes).map_err(|e| {
                Error::protobuf_decode("StridePeriodicVestingAccount".to_string(), e)
            })?;
            account_from_base_vesting(
                vesting
                    .base_vesting_account
                    .ok_or_else(Error::empty_base_account)?,
            )
        }
        url if url.ends_with(".EthAccount") => {
            let eth = EthAccount::decode(bytes)
                .map_err(|e| Error::protobuf_decode("EthAccount".to_string(), e))?;
            account_from_base(eth.base_account.ok_or_else(Error::empty_base_account)?)
        }
        other => Err(Error::unsupported_account_type(other.to_string())),
    }
}

fn account_from_base_vesting(vesting: BaseVestingAccount) -> Result<Account, Error> {
    account_from_base(vesting.base_account.ok_or_else(Error::empty_base_account)?)
}

fn account_from_base(base: BaseAccount) -> Result<Account, Error> {
    let pk_any = base.pub_key.map(|pk| Any {
        type_url: pk.type_url,
        value: pk.value,
    });

    Ok(Account {
        address: base.address,
        public_key: decode_pubkey(pk_any.as_ref())?,
        number: AccountNumber::new(base.account_number),
        sequence: AccountSequence::new(base.sequence),
    })
}
