//! Read-only chain access: connection lifecycle, queries and simulation.

pub mod connection;
pub mod query;
pub mod simulate;

pub use connection::Connection;
