//! Types used during transaction construction.

use core::fmt;

use ibc_proto::cosmos::tx::v1beta1::{AuthInfo, Fee, TxBody};

/// A fully signed transaction, pre-serialization.
#[derive(Clone, Debug)]
pub struct SignedTx {
    pub body: TxBody,
    pub body_bytes: Vec<u8>,
    pub auth_info: AuthInfo,
    pub auth_info_bytes: Vec<u8>,
    pub signatures: Vec<Vec<u8>>,
}

/// Gas consumption estimated by a dry-run simulation.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct GasEstimate {
    pub gas_used: u64,
}

impl GasEstimate {
    pub fn new(gas_used: u64) -> Self {
        Self { gas_used }
    }
}

impl fmt::Display for GasEstimate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.gas_used)
    }
}

/// Broadcast-ready output of a successful build attempt.
///
/// Created once per attempt and discarded after broadcast; the caller owns
/// broadcast and any retry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReadyTx {
    /// Raw `TxRaw` bytes to submit to the chain.
    pub raw_bytes: Vec<u8>,
    /// Lowercase hex of `sha256(raw_bytes)`.
    pub tx_hash: String,
    /// Fee that was attached to the transaction.
    pub gas_limit: u64,
}

/// Pretty-printer for fees in log lines.
pub struct PrettyFee<'a>(pub &'a Fee);

impl fmt::Display for PrettyFee<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let amount = match self.0.amount.first() {
            Some(coin) => format!("{}{}", coin.amount, coin.denom),
            None => "<no amount specified>".to_string(),
        };

        f.debug_struct("Fee")
            .field("amount", &amount)
            .field("gas_limit", &self.0.gas_limit)
            .finish()
    }
}
