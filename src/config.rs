//! Configuration-related types.
//!
//! Fee pricing is supplied by an external backend config collaborator and is
//! treated as authoritative: the core never queries the chain's fee module
//! and never falls back to hardcoded prices.

use core::fmt;
use std::collections::BTreeMap;

use serde::de::Unexpected;
use serde::{de::Error as _, Deserialize, Deserializer, Serialize, Serializer};

const MAX_MEMO_LEN: usize = 256;

/// A transaction memo, bounded at deserialization time.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Memo(String);

impl Memo {
    pub fn new(memo: impl Into<String>) -> Result<Self, String> {
        let memo = memo.into();
        if memo.len() > MAX_MEMO_LEN {
            return Err(format!("memo must be no longer than {} characters", MAX_MEMO_LEN));
        }
        Ok(Self(memo))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<'de> Deserialize<'de> for Memo {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;

        Memo::new(s.clone()).map_err(|_| {
            D::Error::invalid_value(
                Unexpected::Str(&s),
                &format!("a string of at most {} characters", MAX_MEMO_LEN).as_str(),
            )
        })
    }
}

impl Serialize for Memo {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.0.serialize(serializer)
    }
}

impl fmt::Display for Memo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Gas price for a single denom.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GasPrice {
    pub price: f64,
    pub denom: String,
}

impl GasPrice {
    pub const fn new(price: f64, denom: String) -> Self {
        Self { price, denom }
    }
}

impl fmt::Display for GasPrice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.price, self.denom)
    }
}

/// Authoritative gas pricing fetched once per session from the backend
/// config collaborator.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FeeConfig {
    /// Per-denom gas prices.
    pub gas_prices: BTreeMap<String, f64>,
    /// Safety margin applied to simulated gas.
    pub gas_multiplier: f64,
    /// Optional multiplier overrides keyed by message type URL; the first
    /// message of a transaction selects the override.
    #[serde(default)]
    pub multiplier_overrides: BTreeMap<String, f64>,
}

impl FeeConfig {
    pub fn price_for(&self, denom: &str) -> Option<GasPrice> {
        self.gas_prices
            .get(denom)
            .map(|price| GasPrice::new(*price, denom.to_string()))
    }

    pub fn multiplier_for(&self, type_url: &str) -> f64 {
        self.multiplier_overrides
            .get(type_url)
            .copied()
            .unwrap_or(self.gas_multiplier)
    }
}

/// Chain-registration payload passed to browser-extension suggest-chain
/// handshakes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChainInfo {
    pub chain_id: String,
    pub chain_name: String,
    pub rpc: String,
    pub rest: String,
    pub bech32_prefix: String,
    pub fee_denoms: Vec<String>,
    pub staking_denom: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memo_is_bounded() {
        assert!(Memo::new("a".repeat(MAX_MEMO_LEN)).is_ok());
        assert!(Memo::new("a".repeat(MAX_MEMO_LEN + 1)).is_err());
    }

    #[test]
    fn multiplier_override_selection() {
        let mut config = FeeConfig {
            gas_prices: BTreeMap::from([("unls".to_string(), 0.025)]),
            gas_multiplier: 1.4,
            multiplier_overrides: BTreeMap::new(),
        };
        config
            .multiplier_overrides
            .insert("/cosmwasm.wasm.v1.MsgExecuteContract".to_string(), 2.0);

        assert_eq!(config.multiplier_for("/cosmos.bank.v1beta1.MsgSend"), 1.4);
        assert_eq!(
            config.multiplier_for("/cosmwasm.wasm.v1.MsgExecuteContract"),
            2.0
        );
    }

    #[test]
    fn price_lookup() {
        let config = FeeConfig {
            gas_prices: BTreeMap::from([("unls".to_string(), 0.025)]),
            gas_multiplier: 1.4,
            multiplier_overrides: BTreeMap::new(),
        };

        let price = config.price_for("unls").unwrap();
        assert_eq!(price.denom, "unls");
        assert!(config.price_for("uosmo").is_none());
    }
}
