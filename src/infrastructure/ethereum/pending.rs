//! Pending transaction watcher that emits block confirmations

use std::ops::RangeInclusive;
use std::sync::Arc;
use std::time::Duration;

use alloy::primitives::B256;
use alloy::rpc::types::TransactionReceipt;
use anyhow::{Context, Result};
use tracing::debug;

use crate::domain::confirmation::{ConfirmationListener, EmitsConfirmations};
use crate::infrastructure::ethereum::EthereumProvider;

/// A confirmation notification
#[derive(Debug, Clone)]
pub struct Confirmation {
    /// 1 for the block that mined the transaction, +1 per block on top
    pub number: u64,
    pub receipt: TransactionReceipt,
}

/// A submitted transaction being watched until it is buried deep enough
pub struct PendingTransaction {
    provider: Arc<dyn EthereumProvider>,
    tx_hash: B256,
    required_confirmations: u64,
    poll_interval: Duration,
    listeners: Vec<ConfirmationListener<Confirmation>>,
}

impl PendingTransaction {
    pub fn new(provider: Arc<dyn EthereumProvider>, tx_hash: B256) -> Self {
        Self {
            provider,
            tx_hash,
            required_confirmations: 1,
            poll_interval: Duration::from_secs(1),
            listeners: Vec::new(),
        }
    }

    /// Number of confirmations to wait for (at least 1)
    pub fn with_required_confirmations(mut self, confirmations: u64) -> Self {
        self.required_confirmations = confirmations.max(1);
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn tx_hash(&self) -> B256 {
        self.tx_hash
    }

    /// Wait until the transaction has the required confirmations, notifying
    /// listeners once per confirmation along the way.
    pub async fn confirmed(mut self) -> Result<TransactionReceipt> {
        let mut notified = 0u64;
        loop {
            if let Some(receipt) = self.provider.get_receipt(self.tx_hash).await? {
                let mined_in = receipt
                    .block_number
                    .context("receipt has no block number")?;
                let head = self.provider.block_number().await?;

                for number in
                    confirmations_to_emit(notified, mined_in, head, self.required_confirmations)
                {
                    debug!(tx = %self.tx_hash, confirmation = number, "confirmation");
                    let confirmation = Confirmation {
                        number,
                        receipt: receipt.clone(),
                    };
                    for listener in self.listeners.iter_mut() {
                        listener(&confirmation);
                    }
                    notified = number;
                }

                if notified >= self.required_confirmations {
                    return Ok(receipt);
                }
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }
}

impl EmitsConfirmations for PendingTransaction {
    type Confirmation = Confirmation;

    fn on_confirmation(&mut self, listener: ConfirmationListener<Confirmation>) {
        self.listeners.push(listener);
    }
}

/// Confirmation numbers not yet announced, given the block the transaction
/// was mined in and the current head. Empty when nothing new happened.
fn confirmations_to_emit(
    notified: u64,
    mined_in: u64,
    head: u64,
    required: u64,
) -> RangeInclusive<u64> {
    let depth = if head < mined_in {
        0
    } else {
        head - mined_in + 1
    };
    (notified + 1)..=depth.min(required)
}
