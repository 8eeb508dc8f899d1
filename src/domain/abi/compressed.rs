//! Compressed ABI blobs: base64 over a zlib (or raw deflate) stream of JSON

use std::io::{Read, Write};

use alloy_json_abi::JsonAbi;
use base64::engine::{general_purpose, Engine};
use flate2::read::{DeflateDecoder, ZlibDecoder};
use flate2::write::ZlibEncoder;
use flate2::Compression;
use thiserror::Error;

/// Errors from decoding a compressed ABI blob
#[derive(Debug, Error)]
pub enum AbiDecodeError {
    #[error("invalid base64: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("failed to inflate ABI: {0}")]
    Decompress(#[from] std::io::Error),
    #[error("ABI is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Decode a base64, deflate-compressed JSON document into a JSON value.
///
/// Both zlib-wrapped and raw deflate streams are accepted.
pub fn decode_compressed_abi(encoded: &str) -> Result<serde_json::Value, AbiDecodeError> {
    let json = inflate(encoded)?;
    Ok(serde_json::from_slice(&json)?)
}

/// Decode a compressed ABI blob straight into a typed contract ABI
pub fn decode_contract_abi(encoded: &str) -> Result<JsonAbi, AbiDecodeError> {
    let json = inflate(encoded)?;
    Ok(serde_json::from_slice(&json)?)
}

/// Compress a JSON document into the blob format read by [`decode_compressed_abi`]
pub fn encode_compressed_abi(value: &serde_json::Value) -> Result<String, AbiDecodeError> {
    let json = serde_json::to_vec(value)?;
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(&json)?;
    let compressed = encoder.finish()?;
    Ok(general_purpose::STANDARD.encode(compressed))
}

fn inflate(encoded: &str) -> Result<Vec<u8>, AbiDecodeError> {
    let compressed = general_purpose::STANDARD.decode(encoded.trim())?;

    let mut out = Vec::new();
    if has_zlib_header(&compressed) {
        ZlibDecoder::new(compressed.as_slice()).read_to_end(&mut out)?;
    } else {
        DeflateDecoder::new(compressed.as_slice()).read_to_end(&mut out)?;
    }
    Ok(out)
}

/// RFC 1950: CM must be 8 (deflate) and CMF/FLG must be a multiple of 31
fn has_zlib_header(bytes: &[u8]) -> bool {
    match bytes {
        [cmf, flg, ..] => cmf & 0x0f == 8 && (u16::from(*cmf) << 8 | u16::from(*flg)) % 31 == 0,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::DeflateEncoder;
    use serde_json::json;

    #[test]
    fn test_decode_simple_document() {
        let encoded = encode_compressed_abi(&json!({"a": 1})).unwrap();
        let decoded = decode_compressed_abi(&encoded).unwrap();
        assert_eq!(decoded, json!({"a": 1}));
    }

    #[test]
    fn test_decode_raw_deflate() {
        let mut encoder = DeflateEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(br#"[{"type":"fallback"}]"#).unwrap();
        let encoded = general_purpose::STANDARD.encode(encoder.finish().unwrap());

        let decoded = decode_compressed_abi(&encoded).unwrap();
        assert_eq!(decoded, json!([{"type": "fallback"}]));
    }

    #[test]
    fn test_surrounding_whitespace_ignored() {
        let encoded = encode_compressed_abi(&json!([])).unwrap();
        let decoded = decode_compressed_abi(&format!("  {}\n", encoded)).unwrap();
        assert_eq!(decoded, json!([]));
    }

    #[test]
    fn test_invalid_base64() {
        let err = decode_compressed_abi("not base64!!").unwrap_err();
        assert!(matches!(err, AbiDecodeError::Base64(_)));
    }

    #[test]
    fn test_not_compressed() {
        // valid base64 and a valid zlib header, garbage after it
        let encoded = general_purpose::STANDARD.encode([0x78, 0x9c, 0xff, 0xff, 0xff, 0xff]);
        let err = decode_compressed_abi(&encoded).unwrap_err();
        assert!(matches!(err, AbiDecodeError::Decompress(_)));
    }

    #[test]
    fn test_not_json() {
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(b"{not json").unwrap();
        let encoded = general_purpose::STANDARD.encode(encoder.finish().unwrap());

        let err = decode_compressed_abi(&encoded).unwrap_err();
        assert!(matches!(err, AbiDecodeError::Json(_)));
    }

    #[test]
    fn test_decode_contract_abi_events() {
        let abi = json!([{
            "type": "event",
            "name": "Deposit",
            "anonymous": false,
            "inputs": [
                {"name": "sender", "type": "address", "indexed": true, "internalType": "address"},
                {"name": "amount", "type": "uint256", "indexed": false, "internalType": "uint256"}
            ]
        }]);
        let encoded = encode_compressed_abi(&abi).unwrap();

        let parsed = decode_contract_abi(&encoded).unwrap();
        let deposit = &parsed.events["Deposit"][0];
        assert_eq!(deposit.signature(), "Deposit(address,uint256)");
    }
}
