//! Ethereum infrastructure - Alloy provider implementations

mod handle;
mod pending;
mod provider;

pub use handle::{ContractHandle, EventQuery};
pub use pending::{Confirmation, PendingTransaction};
pub use provider::{create_provider, AlloyProvider, EthereumProvider, ProviderConfig};
