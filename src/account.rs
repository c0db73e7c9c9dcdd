//! Domain types for on-chain accounts.

use core::fmt;

use crate::keyring::pubkey::PublicKey;

/// Snapshot of an on-chain account at query time.
///
/// The sequence changes with every confirmed transaction from the address;
/// a stale snapshot produces a signature-domain mismatch and a broadcast
/// rejection, so snapshots are re-fetched before every signing attempt and
/// never cached across attempts.
#[derive(Clone, Debug, PartialEq)]
pub struct Account {
    pub address: String,
    pub public_key: Option<PublicKey>,
    pub number: AccountNumber,
    pub sequence: AccountSequence,
}

/// Newtype for account numbers
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct AccountNumber(u64);

impl AccountNumber {
    pub fn new(number: u64) -> Self {
        Self(number)
    }

    pub fn to_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for AccountNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Newtype for account sequence numbers
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct AccountSequence(u64);

impl AccountSequence {
    pub fn new(sequence: u64) -> Self {
        Self(sequence)
    }

    pub fn to_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for AccountSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Balance for a specific denom.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Balance {
    pub denom: String,
    pub amount: String,
}

impl fmt::Display for Balance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.amount, self.denom)
    }
}
