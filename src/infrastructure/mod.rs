//! Infrastructure layer - External service integrations
//!
//! This layer contains:
//! - Alloy-based Ethereum provider implementations
//! - Contract handles that decode logs using alloy-dyn-abi
//! - Pending-transaction watchers that emit confirmations

pub mod abi;
pub mod ethereum;

pub use ethereum::{
    create_provider, Confirmation, ContractHandle, EthereumProvider, EventQuery,
    PendingTransaction, ProviderConfig,
};
