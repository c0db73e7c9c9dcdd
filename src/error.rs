//! Errors raised by the wallet core.
//!
//! Every collaborator failure (endpoint, fee config, chain query) propagates
//! as a typed error up through the wallet to the caller. The UI layer is
//! expected to map each member to actionable text; the core never substitutes
//! fallbacks for missing configuration.

use flex_error::{define_error, DisplayOnly, TraceError};
use prost::{DecodeError, EncodeError};
use tendermint_rpc::Error as TendermintRpcError;
use tonic::transport::Error as TransportError;
use tonic::Status;

use crate::keyring::errors::Error as KeyringError;

define_error! {
    Error {
        Rpc
            { url: String }
            [ TraceError<TendermintRpcError> ]
            |e| { format_args!("RPC error to endpoint {}", e.url) },

        GrpcTransport
            [ TraceError<TransportError> ]
            |_| { "error in underlying transport when making gRPC call" },

        GrpcStatus
            { query: String }
            [ DisplayOnly<Status> ]
            |e| { format_args!("gRPC call `{}` failed with status", e.query) },

        Connection
            { reason: String }
            |e| { format_args!("failed to establish chain connection: {}", e.reason) },

        ConnectionDestroyed
            |_| { "connection has been destroyed and can no longer be used" },

        ConnectTimeout
            { url: String, seconds: u64 }
            |e| {
                format_args!("connecting to {} timed out after {}s", e.url, e.seconds)
            },

        ChainIdUnavailable
            { url: String }
            |e| { format_args!("node at {} returned no chain identifier", e.url) },

        BalanceUnavailable
            { address: String, denom: String }
            |e| {
                format_args!("no balance returned for account {} and denom {}",
                    e.address, e.denom)
            },

        BlockHeightUnavailable
            { url: String }
            |e| { format_args!("node at {} returned no block height", e.url) },

        SequenceFetch
            { address: String, reason: String }
            |e| {
                format_args!("failed to fetch account sequence for {}: {}",
                    e.address, e.reason)
            },

        Simulation
            { reason: String }
            |e| { format_args!("transaction simulation failed: {}", e.reason) },

        GasConfigUnavailable
            |_| { "gas price configuration is unavailable; refusing to guess a fee" },

        SigningRejected
            { backend: String }
            |e| { format_args!("signature request rejected by the user on {}", e.backend) },

        UnsupportedAccountType
            { type_url: String }
            |e| { format_args!("unsupported on-chain account type {}", e.type_url) },

        EmptyQueryAccount
            { address: String }
            |e| { format_args!("query/account for address {} returned no account", e.address) },

        EmptyBaseAccount
            |_| { "wrapper account carries no embedded base account" },

        UnrecognizedPubkeyType
            { type_url: String }
            |e| { format_args!("unrecognized public key type {}", e.type_url) },

        MalformedPubkey
            { reason: String }
            |e| { format_args!("malformed public key: {}", e.reason) },

        MissingAccount
            { backend: String }
            |e| { format_args!("signer backend {} exposes no accounts", e.backend) },

        ExtensionNotInstalled
            { kind: String }
            |e| { format_args!("{} browser extension is not installed", e.kind) },

        ExtensionOutdated
            { kind: String, detected: String, minimum: String }
            |e| {
                format_args!("{} browser extension version {} is older than required {}",
                    e.kind, e.detected, e.minimum)
            },

        SuggestChainFailed
            { chain_id: String, reason: String }
            |e| {
                format_args!("suggesting chain {} to the extension failed: {}",
                    e.chain_id, e.reason)
            },

        WalletFetchFailed
            { backend: String, reason: String }
            |e| {
                format_args!("fetching wallet from backend {} failed: {}",
                    e.backend, e.reason)
            },

        HardwareTransportTimeout
            { transport: String, seconds: u64 }
            |e| {
                format_args!("hardware transport {} did not become available within {}s",
                    e.transport, e.seconds)
            },

        HardwareTransport
            { transport: String, reason: String }
            |e| { format_args!("hardware transport {} error: {}", e.transport, e.reason) },

        ProtobufEncode
            { payload_type: String }
            [ TraceError<EncodeError> ]
            |e| { format_args!("error encoding protobuf {}", e.payload_type) },

        ProtobufDecode
            { payload_type: String }
            [ TraceError<DecodeError> ]
            |e| { format_args!("error decoding protobuf {}", e.payload_type) },

        KeyBase
            [ KeyringError ]
            |_| { "keyring error" },

        InvalidMessage
            { reason: String }
            |e| { format_args!("invalid chain message: {}", e.reason) },
    }
}

impl Error {
    /// Whether this failure is an expected user decision rather than a fault.
    ///
    /// Surrounding code must not log these at error level.
    pub fn is_user_rejection(&self) -> bool {
        matches!(self.detail(), ErrorDetail::SigningRejected(_))
    }
}
