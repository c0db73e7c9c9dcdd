//! Gas-to-fee arithmetic.
//!
//! The gas limit is the simulated amount scaled by the configured
//! multiplier and rounded half-up to the nearest integer. Rounding (not
//! truncation) keeps fee estimation in parity with the chain's gas
//! metering; marginal simulations must not under-provision by a unit.

use ibc_proto::cosmos::base::v1beta1::Coin;
use ibc_proto::cosmos::tx::v1beta1::Fee;
use num_bigint::BigInt;
use num_rational::BigRational;

use crate::config::GasPrice;

/// Multiply `gas` by the multiplier and round half-up to the nearest
/// integer.
pub fn apply_multiplier(gas: u64, multiplier: f64) -> u64 {
    assert!(multiplier.is_finite() && multiplier >= 0.0);

    let gas = BigInt::from(gas);
    let multiplier = BigRational::from_float(multiplier).expect("multiplier is finite");

    // BigRational::round rounds half away from zero, which for non-negative
    // operands is exactly round-half-up.
    let (_, digits) = (multiplier * gas).round().to_integer().to_u64_digits();
    match digits.len() {
        0 => 0,
        1 => digits[0],
        _ => u64::MAX,
    }
}

/// Price `gas_limit` units of gas in the given denom, rounding the amount up
/// so the fee never underpays by a fraction of a unit.
pub fn calculate_fee_amount(gas_limit: u64, gas_price: &GasPrice) -> Coin {
    assert!(gas_price.price.is_finite());

    let gas = BigInt::from(gas_limit);
    let price = BigRational::from_float(gas_price.price).expect("price is finite");
    let amount = (price * gas).ceil().to_integer();

    Coin {
        denom: gas_price.denom.clone(),
        amount: amount.to_string(),
    }
}

/// Assemble the full fee for an adjusted gas amount.
pub fn gas_amount_to_fee(gas_used: u64, multiplier: f64, gas_price: &GasPrice) -> Fee {
    let gas_limit = apply_multiplier(gas_used, multiplier);
    let amount = calculate_fee_amount(gas_limit, gas_price);

    Fee {
        amount: vec![amount],
        gas_limit,
        payer: "".to_string(),
        granter: "".to_string(),
    }
}
