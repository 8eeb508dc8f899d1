//! Alloy-backed handle for one deployed contract version

use std::sync::Arc;

use alloy::primitives::{Address, B256};
use alloy::rpc::types::{BlockNumberOrTag, Filter, Log};
use alloy_json_abi::{Event, JsonAbi};
use anyhow::{bail, Result};
use tracing::debug;

use crate::domain::abi::DecodedEvent;
use crate::domain::contract::SupportsPastEventQuery;
use crate::infrastructure::abi::decode_log;
use crate::infrastructure::ethereum::EthereumProvider;

/// Block range for a past-event query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventQuery {
    pub from_block: BlockNumberOrTag,
    pub to_block: BlockNumberOrTag,
}

impl Default for EventQuery {
    fn default() -> Self {
        Self {
            from_block: BlockNumberOrTag::Earliest,
            to_block: BlockNumberOrTag::Latest,
        }
    }
}

impl EventQuery {
    pub fn from_block(mut self, block: impl Into<BlockNumberOrTag>) -> Self {
        self.from_block = block.into();
        self
    }

    pub fn to_block(mut self, block: impl Into<BlockNumberOrTag>) -> Self {
        self.to_block = block.into();
        self
    }
}

/// One deployed contract: its address, its ABI and the node to ask
#[derive(Clone)]
pub struct ContractHandle {
    address: Address,
    abi: Arc<JsonAbi>,
    provider: Arc<dyn EthereumProvider>,
}

impl std::fmt::Debug for ContractHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContractHandle")
            .field("address", &self.address)
            .field("endpoint", &self.provider.endpoint_name())
            .finish()
    }
}

impl ContractHandle {
    pub fn new(address: Address, abi: Arc<JsonAbi>, provider: Arc<dyn EthereumProvider>) -> Self {
        Self {
            address,
            abi,
            provider,
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn abi(&self) -> &JsonAbi {
        &self.abi
    }

    pub fn provider(&self) -> &Arc<dyn EthereumProvider> {
        &self.provider
    }

    /// All overloads of an event, by name
    fn events_named(&self, event_name: &str) -> Result<&[Event]> {
        match self.abi.events.get(event_name) {
            Some(events) if !events.is_empty() => Ok(events),
            _ => bail!("event '{}' not found in contract ABI", event_name),
        }
    }

    fn filter_for(&self, events: &[Event], options: &EventQuery) -> Filter {
        let filter = Filter::new()
            .address(self.address)
            .from_block(options.from_block)
            .to_block(options.to_block);

        // anonymous logs carry no selector topic to filter on
        if events.iter().any(|event| event.anonymous) {
            return filter;
        }
        let selectors: Vec<B256> = events.iter().map(Event::selector).collect();
        filter.event_signature(selectors)
    }

    /// Decode `log` with the overload it belongs to, or `None` when it
    /// belongs to none of them.
    ///
    /// A selector match decides for named overloads. Logs carrying the
    /// selector of some other ABI event are skipped; anything else is tried
    /// against the anonymous overloads in ABI order.
    fn decode_matching(&self, events: &[Event], log: &Log) -> Option<Result<DecodedEvent>> {
        let topic0 = log.topic0();
        if let Some(event) = events
            .iter()
            .find(|event| !event.anonymous && topic0 == Some(&event.selector()))
        {
            return Some(decode_log(event, log));
        }

        let other_event = self
            .abi
            .events()
            .any(|event| !event.anonymous && topic0 == Some(&event.selector()));
        if other_event {
            return None;
        }

        events
            .iter()
            .filter(|event| event.anonymous)
            .find_map(|event| decode_log(event, log).ok())
            .map(Ok)
    }
}

#[async_trait::async_trait]
impl SupportsPastEventQuery for ContractHandle {
    type Event = DecodedEvent;
    type Options = EventQuery;

    async fn get_past_events(
        &self,
        event_name: &str,
        options: &EventQuery,
    ) -> Result<Vec<DecodedEvent>> {
        let events = self.events_named(event_name)?;
        let filter = self.filter_for(events, options);

        debug!(
            address = %self.address,
            event = event_name,
            from = %options.from_block,
            to = %options.to_block,
            "fetching logs"
        );
        let logs = self.provider.get_logs(&filter).await?;

        logs.iter()
            .filter_map(|log| self.decode_matching(events, log))
            .collect()
    }
}
