//! Builders for the chain messages the wallet signs.
//!
//! The wallet itself treats messages as opaque `Any` payloads; only the type
//! URL matters to it (fee differentiation). These helpers produce correctly
//! typed payloads for the operations the dashboard exposes.

use cosmos_sdk_proto::cosmos::distribution::v1beta1::MsgWithdrawDelegatorReward;
use cosmos_sdk_proto::cosmos::gov::v1beta1::MsgVote;
use cosmos_sdk_proto::cosmos::staking::v1beta1::{MsgDelegate, MsgUndelegate};
use cosmos_sdk_proto::cosmwasm::wasm::v1::MsgExecuteContract;
use ibc_proto::cosmos::bank::v1beta1::MsgSend;
use ibc_proto::cosmos::base::v1beta1::Coin;
use ibc_proto::google::protobuf::Any;
use ibc_proto::ibc::applications::transfer::v1::MsgTransfer;
use prost::Message;

use crate::error::Error;

pub use cosmos_sdk_proto::cosmos::gov::v1beta1::VoteOption;

pub const BANK_SEND_TYPE_URL: &str = "/cosmos.bank.v1beta1.MsgSend";
pub const IBC_TRANSFER_TYPE_URL: &str = "/ibc.applications.transfer.v1.MsgTransfer";
pub const EXECUTE_CONTRACT_TYPE_URL: &str = "/cosmwasm.wasm.v1.MsgExecuteContract";
pub const DELEGATE_TYPE_URL: &str = "/cosmos.staking.v1beta1.MsgDelegate";
pub const UNDELEGATE_TYPE_URL: &str = "/cosmos.staking.v1beta1.MsgUndelegate";
pub const VOTE_TYPE_URL: &str = "/cosmos.gov.v1beta1.MsgVote";
pub const WITHDRAW_REWARDS_TYPE_URL: &str =
    "/cosmos.distribution.v1beta1.MsgWithdrawDelegatorReward";

const IBC_TRANSFER_PORT: &str = "transfer";

fn encode_to_any<M: Message>(type_url: &str, message: &M) -> Result<Any, Error> {
    let mut value = Vec::new();
    message
        .encode(&mut value)
        .map_err(|e| Error::protobuf_encode(type_url.to_string(), e))?;

    Ok(Any {
        type_url: type_url.to_string(),
        value,
    })
}

fn sdk_coin(coin: &Coin) -> cosmos_sdk_proto::cosmos::base::v1beta1::Coin {
    cosmos_sdk_proto::cosmos::base::v1beta1::Coin {
        denom: coin.denom.clone(),
        amount: coin.amount.clone(),
    }
}

pub fn bank_send(
    from_address: &str,
    to_address: &str,
    amount: Vec<Coin>,
) -> Result<Any, Error> {
    let msg = MsgSend {
        from_address: from_address.to_string(),
        to_address: to_address.to_string(),
        amount,
    };

    encode_to_any(BANK_SEND_TYPE_URL, &msg)
}

/// ICS-20 transfer over the canonical `transfer` port. The timeout is given
/// as an absolute unix timestamp in nanoseconds; height-based timeouts are
/// not used by this wallet.
pub fn ibc_transfer(
    sender: &str,
    receiver: &str,
    source_channel: &str,
    token: Coin,
    timeout_timestamp_ns: u64,
    memo: &str,
) -> Result<Any, Error> {
    let msg = MsgTransfer {
        source_port: IBC_TRANSFER_PORT.to_string(),
        source_channel: source_channel.to_string(),
        token: Some(token),
        sender: sender.to_string(),
        receiver: receiver.to_string(),
        timeout_height: None,
        timeout_timestamp: timeout_timestamp_ns,
        memo: memo.to_string(),
    };

    encode_to_any(IBC_TRANSFER_TYPE_URL, &msg)
}

pub fn execute_contract(
    sender: &str,
    contract: &str,
    msg_json: Vec<u8>,
    funds: &[Coin],
) -> Result<Any, Error> {
    let msg = MsgExecuteContract {
        sender: sender.to_string(),
        contract: contract.to_string(),
        msg: msg_json,
        funds: funds.iter().map(sdk_coin).collect(),
    };

    encode_to_any(EXECUTE_CONTRACT_TYPE_URL, &msg)
}

pub fn delegate(
    delegator_address: &str,
    validator_address: &str,
    amount: &Coin,
) -> Result<Any, Error> {
    let msg = MsgDelegate {
        delegator_address: delegator_address.to_string(),
        validator_address: validator_address.to_string(),
        amount: Some(sdk_coin(amount)),
    };

    encode_to_any(DELEGATE_TYPE_URL, &msg)
}

pub fn undelegate(
    delegator_address: &str,
    validator_address: &str,
    amount: &Coin,
) -> Result<Any, Error> {
    let msg = MsgUndelegate {
        delegator_address: delegator_address.to_string(),
        validator_address: validator_address.to_string(),
        amount: Some(sdk_coin(amount)),
    };

    encode_to_any(UNDELEGATE_TYPE_URL, &msg)
}

pub fn vote(voter: &str, proposal_id: u64, option: VoteOption) -> Result<Any, Error> {
    let msg = MsgVote {
        proposal_id,
        voter: voter.to_string(),
        option: option as i32,
    };

    encode_to_any(VOTE_TYPE_URL, &msg)
}

pub fn withdraw_rewards(
    delegator_address: &str,
    validator_address: &str,
) -> Result<Any, Error> {
    let msg = MsgWithdrawDelegatorReward {
        delegator_address: delegator_address.to_string(),
        validator_address: validator_address.to_string(),
    };

    encode_to_any(WITHDRAW_REWARDS_TYPE_URL, &msg)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unls(amount: &str) -> Coin {
        Coin {
            denom: "unls".to_string(),
            amount: amount.to_string(),
        }
    }

    #[test]
    fn bank_send_carries_the_expected_type_url() {
        let any = bank_send("nolus1from", "nolus1to", vec![unls("10")]).unwrap();

        assert_eq!(any.type_url, BANK_SEND_TYPE_URL);

        let decoded = MsgSend::decode(any.value.as_slice()).unwrap();
        assert_eq!(decoded.from_address, "nolus1from");
        assert_eq!(decoded.amount.len(), 1);
    }

    #[test]
    fn ibc_transfer_uses_the_transfer_port() {
        let any = ibc_transfer(
            "nolus1from",
            "osmo1to",
            "channel-0",
            unls("10"),
            1_700_000_000_000_000_000,
            "",
        )
        .unwrap();

        let decoded = MsgTransfer::decode(any.value.as_slice()).unwrap();
        assert_eq!(decoded.source_port, "transfer");
        assert_eq!(decoded.source_channel, "channel-0");
        assert!(decoded.timeout_height.is_none());
    }

    #[test]
    fn vote_encodes_the_option() {
        let any = vote("nolus1voter", 7, VoteOption::Yes).unwrap();

        let decoded = MsgVote::decode(any.value.as_slice()).unwrap();
        assert_eq!(decoded.proposal_id, 7);
        assert_eq!(decoded.option, VoteOption::Yes as i32);
    }
}
