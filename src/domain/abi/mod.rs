//! ABI domain models
//!
//! Compressed ABI blobs and the decoded event types handed back to callers,
//! independent of the RPC transport.

mod compressed;
mod decoder;

pub use compressed::{
    decode_compressed_abi, decode_contract_abi, encode_compressed_abi, AbiDecodeError,
};
pub use decoder::{DecodedArg, DecodedEvent};
