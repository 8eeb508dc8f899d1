//! Contract handles and the version set built over them

mod version_set;

pub use version_set::{ContractVersionSet, VersionSetError};

/// A contract handle that can look up historical events.
///
/// Implemented by the alloy-backed `ContractHandle` and by in-memory doubles.
#[async_trait::async_trait]
pub trait SupportsPastEventQuery: Send + Sync {
    /// One decoded event record
    type Event: Send;
    /// Filter/range options understood by the handle
    type Options: Send + Sync;

    /// Fetch past events named `event_name` matching `options`, in the
    /// order the chain produced them.
    async fn get_past_events(
        &self,
        event_name: &str,
        options: &Self::Options,
    ) -> anyhow::Result<Vec<Self::Event>>;
}
