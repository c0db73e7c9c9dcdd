//! Transaction assembly: protobuf encoding, gas math, and estimation.

pub mod encode;
pub mod estimate;
pub mod gas;
pub mod types;
