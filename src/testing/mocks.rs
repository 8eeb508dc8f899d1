//! In-memory doubles for contract handles, emitters and providers

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use alloy::primitives::{Address, Bytes, B256, U256};
use alloy::rpc::types::{Filter, Log, TransactionReceipt, TransactionRequest};
use anyhow::{anyhow, Result};

use crate::domain::confirmation::{ConfirmationListener, EmitsConfirmations};
use crate::domain::contract::SupportsPastEventQuery;
use crate::infrastructure::ethereum::EthereumProvider;

/// Contract handle with canned events per event name, or a canned failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockContract<E = &'static str> {
    events: HashMap<String, Vec<E>>,
    failure: Option<String>,
}

impl<E> MockContract<E> {
    pub fn new() -> Self {
        Self {
            events: HashMap::new(),
            failure: None,
        }
    }

    pub fn with_events(event_name: &str, events: Vec<E>) -> Self {
        let mut mock = Self::new();
        mock.events.insert(event_name.to_string(), events);
        mock
    }

    /// Every query fails with `message`
    pub fn failing(message: &str) -> Self {
        Self {
            events: HashMap::new(),
            failure: Some(message.to_string()),
        }
    }
}

impl<E> Default for MockContract<E> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl<E> SupportsPastEventQuery for MockContract<E>
where
    E: Clone + Send + Sync,
{
    type Event = E;
    type Options = ();

    async fn get_past_events(&self, event_name: &str, _options: &()) -> Result<Vec<E>> {
        if let Some(message) = &self.failure {
            return Err(anyhow!("{}", message));
        }
        Ok(self.events.get(event_name).cloned().unwrap_or_default())
    }
}

/// Emitter that records listeners and fans out [`MockEmitter::emit`] calls
pub struct MockEmitter<C> {
    listeners: Vec<ConfirmationListener<C>>,
}

impl<C> MockEmitter<C> {
    pub fn new() -> Self {
        Self {
            listeners: Vec::new(),
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    pub fn emit(&mut self, confirmation: &C) {
        for listener in self.listeners.iter_mut() {
            listener(confirmation);
        }
    }
}

impl<C> Default for MockEmitter<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> EmitsConfirmations for MockEmitter<C> {
    type Confirmation = C;

    fn on_confirmation(&mut self, listener: ConfirmationListener<C>) {
        self.listeners.push(listener);
    }
}

/// Provider serving fixed logs, receipts, call results and balances.
///
/// Every `get_logs` call returns all stored logs whose address matches the
/// filter; the last filter seen is kept for inspection. The head advances
/// by `block_step` after each `block_number` query.
#[derive(Default)]
pub struct StaticLogProvider {
    logs: Vec<Log>,
    head: AtomicU64,
    block_step: u64,
    receipts: HashMap<B256, TransactionReceipt>,
    call_results: Mutex<Vec<Bytes>>,
    balances: HashMap<Address, U256>,
    last_filter: Mutex<Option<Filter>>,
}

impl StaticLogProvider {
    pub fn new(logs: Vec<Log>) -> Self {
        Self {
            logs,
            ..Self::default()
        }
    }

    pub fn with_block_number(self, block_number: u64) -> Self {
        self.head.store(block_number, Ordering::SeqCst);
        self
    }

    pub fn with_block_step(mut self, step: u64) -> Self {
        self.block_step = step;
        self
    }

    pub fn with_receipt(mut self, receipt: TransactionReceipt) -> Self {
        self.receipts.insert(receipt.transaction_hash, receipt);
        self
    }

    /// Queue a return value for the next `eth_call`
    pub fn with_call_result(self, result: impl Into<Bytes>) -> Self {
        if let Ok(mut results) = self.call_results.lock() {
            results.push(result.into());
        }
        self
    }

    pub fn with_balance(mut self, address: Address, balance: U256) -> Self {
        self.balances.insert(address, balance);
        self
    }

    pub fn last_filter(&self) -> Option<Filter> {
        self.last_filter.lock().ok().and_then(|f| f.clone())
    }
}

#[async_trait::async_trait]
impl EthereumProvider for StaticLogProvider {
    async fn block_number(&self) -> Result<u64> {
        Ok(self.head.fetch_add(self.block_step, Ordering::SeqCst))
    }

    async fn chain_id(&self) -> Result<u64> {
        Ok(31337)
    }

    async fn get_receipt(&self, hash: B256) -> Result<Option<TransactionReceipt>> {
        Ok(self.receipts.get(&hash).cloned())
    }

    async fn get_logs(&self, filter: &Filter) -> Result<Vec<Log>> {
        if let Ok(mut last) = self.last_filter.lock() {
            *last = Some(filter.clone());
        }
        Ok(self
            .logs
            .iter()
            .filter(|log| filter.address.matches(&log.address()))
            .cloned()
            .collect())
    }

    async fn call(&self, _request: TransactionRequest) -> Result<Bytes> {
        let mut results = self
            .call_results
            .lock()
            .map_err(|_| anyhow!("call results poisoned"))?;
        if results.is_empty() {
            return Err(anyhow!("no call result queued"));
        }
        Ok(results.remove(0))
    }

    async fn get_balance(&self, address: Address) -> Result<U256> {
        Ok(self.balances.get(&address).copied().unwrap_or_default())
    }

    fn endpoint_name(&self) -> String {
        "static".to_string()
    }
}
