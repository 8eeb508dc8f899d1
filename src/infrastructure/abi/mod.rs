//! ABI infrastructure - log decoding with alloy-dyn-abi

mod decoder;

pub use decoder::decode_log;
