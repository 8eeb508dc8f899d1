//! Event log decoding using alloy-dyn-abi

use alloy::rpc::types::Log;
use alloy_dyn_abi::{DynSolValue, EventExt};
use alloy_json_abi::Event;
use anyhow::{bail, Context, Result};

use crate::domain::abi::{DecodedArg, DecodedEvent};

/// Decode a raw log against one event definition
pub fn decode_log(event: &Event, log: &Log) -> Result<DecodedEvent> {
    if !event.anonymous && log.topic0() != Some(&event.selector()) {
        bail!(
            "topic mismatch: log is not a {} event",
            event.signature()
        );
    }

    let decoded = event
        .decode_log(&log.inner.data)
        .with_context(|| format!("Failed to decode {} log", event.name))?;

    // indexed values come from topics, the rest from data, each in order
    let mut indexed = decoded.indexed.iter();
    let mut body = decoded.body.iter();

    let arguments = event
        .inputs
        .iter()
        .enumerate()
        .map(|(idx, param)| {
            let value = if param.indexed {
                indexed.next()
            } else {
                body.next()
            };
            let name = if param.name.trim().is_empty() {
                format!("arg{}", idx)
            } else {
                param.name.clone()
            };

            DecodedArg {
                name,
                kind: param.selector_type().into_owned(),
                indexed: param.indexed,
                value: value.map(format_dyn_sol_value).unwrap_or_default(),
            }
        })
        .collect();

    Ok(DecodedEvent {
        name: event.name.clone(),
        signature: event.signature(),
        address: log.address(),
        block_number: log.block_number,
        transaction_hash: log.transaction_hash,
        log_index: log.log_index,
        arguments,
    })
}

/// Format a DynSolValue for display
fn format_dyn_sol_value(value: &DynSolValue) -> String {
    match value {
        DynSolValue::Bool(b) => b.to_string(),
        DynSolValue::Int(i, _) => i.to_string(),
        DynSolValue::Uint(u, _) => u.to_string(),
        DynSolValue::FixedBytes(word, size) => {
            let bytes = &word.as_slice()[..(*size).min(32)];
            format!("0x{}", hex::encode(bytes))
        }
        DynSolValue::Address(addr) => format!("{:?}", addr),
        DynSolValue::Function(func) => format!("0x{}", hex::encode(func.as_slice())),
        DynSolValue::Bytes(bytes) => format!("0x{}", hex::encode(bytes)),
        DynSolValue::String(s) => s.clone(),
        DynSolValue::Array(arr) | DynSolValue::FixedArray(arr) => {
            let items: Vec<String> = arr.iter().map(format_dyn_sol_value).collect();
            format!("[{}]", items.join(", "))
        }
        DynSolValue::Tuple(fields) => {
            let items: Vec<String> = fields.iter().map(format_dyn_sol_value).collect();
            format!("({})", items.join(", "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::{address, b256, Address, LogData, B256, U256};
    use alloy_json_abi::EventParam;

    fn deposit_event() -> Event {
        Event {
            name: "Deposit".to_string(),
            inputs: vec![
                EventParam {
                    ty: "address".to_string(),
                    name: "sender".to_string(),
                    indexed: true,
                    components: vec![],
                    internal_type: None,
                },
                EventParam {
                    ty: "uint256".to_string(),
                    name: "amount".to_string(),
                    indexed: false,
                    components: vec![],
                    internal_type: None,
                },
            ],
            anonymous: false,
        }
    }

    fn make_log(contract: Address, topics: Vec<B256>, data: Vec<u8>) -> Log {
        Log {
            inner: alloy::primitives::Log {
                address: contract,
                data: LogData::new_unchecked(topics, data.into()),
            },
            block_hash: None,
            block_number: Some(17),
            block_timestamp: None,
            transaction_hash: None,
            transaction_index: None,
            log_index: Some(3),
            removed: false,
        }
    }

    #[test]
    fn test_decode_deposit() {
        let event = deposit_event();
        let contract = address!("00000000219ab540356cBB839Cbe05303d7705Fa");
        let sender = address!("1234567890123456789012345678901234567890");

        let log = make_log(
            contract,
            vec![event.selector(), sender.into_word()],
            U256::from(32_000_000_000u64).to_be_bytes_vec(),
        );

        let decoded = decode_log(&event, &log).unwrap();
        assert_eq!(decoded.name, "Deposit");
        assert_eq!(decoded.signature, "Deposit(address,uint256)");
        assert_eq!(decoded.address, contract);
        assert_eq!(decoded.block_number, Some(17));
        assert_eq!(decoded.log_index, Some(3));

        let sender_arg = decoded.arg("sender").unwrap();
        assert!(sender_arg.indexed);
        assert!(sender_arg.value.contains("1234567890"));

        let amount = decoded.arg("amount").unwrap();
        assert!(!amount.indexed);
        assert_eq!(amount.kind, "uint256");
        assert_eq!(amount.value, "32000000000");
    }

    #[test]
    fn test_topic_mismatch() {
        let event = deposit_event();
        let log = make_log(
            Address::ZERO,
            vec![b256!("ddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef")],
            Vec::new(),
        );

        let err = decode_log(&event, &log).unwrap_err();
        assert!(err.to_string().contains("topic mismatch"));
    }
}
