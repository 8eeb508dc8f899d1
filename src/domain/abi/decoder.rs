//! Decoded event types

use alloy_primitives::{Address, B256};
use serde::{Deserialize, Serialize};

/// A decoded event argument
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodedArg {
    /// Parameter name (or "arg{n}" if unnamed)
    pub name: String,
    /// Solidity type (e.g., "address", "uint256", "(uint256,address)")
    pub kind: String,
    /// Whether the argument came from a topic
    pub indexed: bool,
    /// Decoded value as a formatted string
    pub value: String,
}

/// One event log decoded against a contract ABI
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodedEvent {
    /// Event name
    pub name: String,
    /// Full event signature (e.g., "Deposit(address,uint256)")
    pub signature: String,
    /// Contract that emitted the log
    pub address: Address,
    pub block_number: Option<u64>,
    pub transaction_hash: Option<B256>,
    pub log_index: Option<u64>,
    /// Decoded arguments in declaration order
    pub arguments: Vec<DecodedArg>,
}

impl DecodedEvent {
    /// Look up an argument by name
    pub fn arg(&self, name: &str) -> Option<&DecodedArg> {
        self.arguments.iter().find(|arg| arg.name == name)
    }
}
