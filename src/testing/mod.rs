//! Helpers for test suites: deposit byte layouts, token transfer
//! assertions and in-memory doubles for the capability traits.
//!
//! Compiled for this crate's own tests and behind the `test-helpers`
//! feature for downstream test suites.

mod credentials;
mod mocks;
mod transfers;

pub use credentials::{
    bls_withdrawal_credentials, deposit_data_root, eth1_withdrawal_credentials, DepositBatch,
    DepositData, PUBKEY_LENGTH, SIGNATURE_LENGTH,
};
pub use mocks::{MockContract, MockEmitter, StaticLogProvider};
pub use transfers::{
    assert_transfer, assert_transfer_in_receipt, token_balance, transfers_in, BalanceChange,
    IERC20,
};
