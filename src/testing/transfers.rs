//! ERC-20 transfer assertions

use alloy::primitives::{Address, Bytes, U256};
use alloy::rpc::types::{Log, TransactionReceipt, TransactionRequest};
use alloy::sol;
use alloy::sol_types::{SolCall, SolEvent};
use anyhow::{bail, ensure, Context, Result};

use crate::infrastructure::ethereum::EthereumProvider;

sol! {
    #[derive(Debug, PartialEq, Eq)]
    interface IERC20 {
        event Transfer(address indexed from, address indexed to, uint256 value);
        function balanceOf(address account) external view returns (uint256);
    }
}

/// All `Transfer` events emitted by `token` in `logs`, in log order
pub fn transfers_in(logs: &[Log], token: Address) -> Vec<IERC20::Transfer> {
    logs.iter()
        .filter(|log| log.address() == token)
        .filter(|log| log.topic0() == Some(&IERC20::Transfer::SIGNATURE_HASH))
        .filter_map(|log| log.log_decode::<IERC20::Transfer>().ok())
        .map(|decoded| decoded.inner.data)
        .collect()
}

/// Fail unless `token` emitted exactly one matching `Transfer(from, to, value)`
pub fn assert_transfer(
    logs: &[Log],
    token: Address,
    from: Address,
    to: Address,
    value: U256,
) -> Result<()> {
    let transfers = transfers_in(logs, token);
    let matching = transfers
        .iter()
        .filter(|t| t.from == from && t.to == to && t.value == value)
        .count();

    if matching == 0 {
        bail!(
            "no Transfer({from}, {to}, {value}) from token {token}; saw {} transfer(s): {:?}",
            transfers.len(),
            transfers
        );
    }
    ensure!(
        matching == 1,
        "expected one Transfer({from}, {to}, {value}) from token {token}, saw {matching}"
    );
    Ok(())
}

/// [`assert_transfer`] over the logs of a mined transaction
pub fn assert_transfer_in_receipt(
    receipt: &TransactionReceipt,
    token: Address,
    from: Address,
    to: Address,
    value: U256,
) -> Result<()> {
    ensure!(receipt.status(), "transaction {} reverted", receipt.transaction_hash);
    assert_transfer(receipt.inner.logs(), token, from, to, value)
}

/// `token.balanceOf(account)` via `eth_call`
pub async fn token_balance(
    provider: &dyn EthereumProvider,
    token: Address,
    account: Address,
) -> Result<U256> {
    let call = IERC20::balanceOfCall { account };
    let request = TransactionRequest::default()
        .to(token)
        .input(Bytes::from(call.abi_encode()).into());
    let output = provider
        .call(request)
        .await
        .with_context(|| format!("balanceOf({account}) on {token}"))?;
    IERC20::balanceOfCall::abi_decode_returns(&output)
        .with_context(|| format!("decode balanceOf result from {token}"))
}

/// Native balance of `account` in wei
pub async fn native_balance(provider: &dyn EthereumProvider, account: Address) -> Result<U256> {
    provider
        .get_balance(account)
        .await
        .with_context(|| format!("eth_getBalance({account})"))
}

/// Direction and size of a balance movement between two snapshots
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BalanceChange {
    Increased(U256),
    Decreased(U256),
    Unchanged,
}

impl BalanceChange {
    pub fn between(before: U256, after: U256) -> Self {
        match after.cmp(&before) {
            std::cmp::Ordering::Greater => BalanceChange::Increased(after - before),
            std::cmp::Ordering::Less => BalanceChange::Decreased(before - after),
            std::cmp::Ordering::Equal => BalanceChange::Unchanged,
        }
    }

    /// Fail unless the movement between `before` and `after` is `self`
    pub fn assert_between(self, before: U256, after: U256) -> Result<()> {
        let actual = Self::between(before, after);
        ensure!(
            actual == self,
            "expected balance change {:?}, got {:?} ({} -> {})",
            self,
            actual,
            before,
            after
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::StaticLogProvider;
    use alloy::primitives::address;

    const TOKEN: Address = address!("ae7ab96520de3a18e5e111b5eaab095312d7fe84");
    const ALICE: Address = address!("1111111111111111111111111111111111111111");
    const BOB: Address = address!("2222222222222222222222222222222222222222");

    fn transfer_log(token: Address, from: Address, to: Address, value: u64) -> Log {
        let event = IERC20::Transfer {
            from,
            to,
            value: U256::from(value),
        };
        Log {
            inner: alloy::primitives::Log {
                address: token,
                data: event.encode_log_data(),
            },
            block_hash: None,
            block_number: None,
            block_timestamp: None,
            transaction_hash: None,
            transaction_index: None,
            log_index: None,
            removed: false,
        }
    }

    #[test]
    fn test_transfer_found() {
        let logs = vec![transfer_log(TOKEN, ALICE, BOB, 100)];
        assert!(assert_transfer(&logs, TOKEN, ALICE, BOB, U256::from(100)).is_ok());
    }

    #[test]
    fn test_transfer_wrong_value() {
        let logs = vec![transfer_log(TOKEN, ALICE, BOB, 100)];
        let err = assert_transfer(&logs, TOKEN, ALICE, BOB, U256::from(99)).unwrap_err();
        assert!(err.to_string().contains("saw 1 transfer"));
    }

    #[test]
    fn test_transfer_from_other_token_ignored() {
        let logs = vec![transfer_log(Address::ZERO, ALICE, BOB, 100)];
        assert!(transfers_in(&logs, TOKEN).is_empty());
        assert!(assert_transfer(&logs, TOKEN, ALICE, BOB, U256::from(100)).is_err());
    }

    #[test]
    fn test_duplicate_transfer_rejected() {
        let logs = vec![
            transfer_log(TOKEN, ALICE, BOB, 5),
            transfer_log(TOKEN, ALICE, BOB, 5),
        ];
        let err = assert_transfer(&logs, TOKEN, ALICE, BOB, U256::from(5)).unwrap_err();
        assert!(err.to_string().contains("saw 2"));
    }

    #[test]
    fn test_balance_change() {
        let before = U256::from(10);
        assert_eq!(
            BalanceChange::between(before, U256::from(15)),
            BalanceChange::Increased(U256::from(5))
        );
        assert_eq!(
            BalanceChange::between(before, U256::from(4)),
            BalanceChange::Decreased(U256::from(6))
        );
        assert!(BalanceChange::Unchanged.assert_between(before, before).is_ok());
        assert!(BalanceChange::Unchanged
            .assert_between(before, U256::from(11))
            .is_err());
    }

    #[tokio::test]
    async fn test_token_balance_decodes_call() {
        let provider = StaticLogProvider::new(Vec::new())
            .with_call_result(U256::from(1234).to_be_bytes_vec());

        let balance = token_balance(&provider, TOKEN, ALICE).await.unwrap();
        assert_eq!(balance, U256::from(1234));
    }

    #[tokio::test]
    async fn test_native_balance_change() {
        let earlier = StaticLogProvider::new(Vec::new()).with_balance(ALICE, U256::from(50));
        let later = StaticLogProvider::new(Vec::new()).with_balance(ALICE, U256::from(18));

        let before = native_balance(&earlier, ALICE).await.unwrap();
        let after = native_balance(&later, ALICE).await.unwrap();
        BalanceChange::Decreased(U256::from(32))
            .assert_between(before, after)
            .unwrap();

        let untouched = StaticLogProvider::new(Vec::new());
        assert_eq!(native_balance(&untouched, BOB).await.unwrap(), U256::ZERO);
    }
}
