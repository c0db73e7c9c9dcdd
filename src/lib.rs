//! Multi-wallet transaction construction for the Nolus network.
//!
//! This crate is the signing core consumed by an application shell: it
//! connects to a chain, decodes on-chain accounts, estimates gas by dry-run
//! simulation, prices fees from externally supplied configuration, and signs
//! through interchangeable backends (browser extension, Ledger hardware,
//! raw key, social login, Solana bridge).
//!
//! Entry points are [`factory::WalletFactory`] for creating a bound
//! [`wallet::BaseWallet`], and [`chain::Connection`] for read-only queries.

pub mod account;
pub mod chain;
pub mod config;
pub mod error;
pub mod factory;
pub mod keyring;
pub mod messages;
pub mod provider;
pub mod signer;
pub mod tx;
pub mod wallet;

pub use error::Error;
