//! Domain layer - traits and pure logic, independent of any transport

pub mod abi;
pub mod confirmation;
pub mod contract;

pub use abi::{decode_compressed_abi, decode_contract_abi, AbiDecodeError, DecodedArg, DecodedEvent};
pub use confirmation::{relay_confirmations, ConfirmationListener, EmitsConfirmations};
pub use contract::{ContractVersionSet, SupportsPastEventQuery, VersionSetError};
