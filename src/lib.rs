//! Client SDK for versioned staking/deposit contracts.
//!
//! - [`domain`]: capability traits, the contract version set, ABI blob
//!   decoding and the confirmation relay
//! - [`infrastructure`]: alloy-backed providers, contract handles and
//!   pending-transaction watchers
//! - [`config`]: TOML configuration (endpoints, deployments)

pub mod config;
pub mod domain;
pub mod infrastructure;

#[cfg(any(test, feature = "test-helpers"))]
pub mod testing;
