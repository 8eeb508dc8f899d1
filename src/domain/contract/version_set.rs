//! Ordered set of deployments of one logical contract

use futures::future::try_join_all;
use thiserror::Error;
use tracing::debug;

use super::SupportsPastEventQuery;

/// Errors raised by [`ContractVersionSet`]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VersionSetError {
    /// A version set needs at least one deployment
    #[error("contract version set must contain at least one handle")]
    Empty,
    /// Requested version is outside `1..=len`
    #[error("contract version {version} out of bounds (1..={len})")]
    OutOfBounds { version: usize, len: usize },
}

/// Successive deployments of the same contract, oldest first.
///
/// Versions are numbered from 1: version 1 is the first deployment and
/// version `len()` is the current one. The set never changes after
/// construction.
#[derive(Debug, Clone)]
pub struct ContractVersionSet<H> {
    handles: Vec<H>,
}

impl<H> ContractVersionSet<H> {
    /// Build a set from handles ordered oldest to newest
    pub fn new(handles: Vec<H>) -> Result<Self, VersionSetError> {
        if handles.is_empty() {
            return Err(VersionSetError::Empty);
        }
        Ok(Self { handles })
    }

    /// The newest deployment
    pub fn current(&self) -> &H {
        // non-empty by construction
        &self.handles[self.handles.len() - 1]
    }

    /// The oldest deployment
    pub fn first(&self) -> &H {
        &self.handles[0]
    }

    /// Look up a deployment by 1-based version number
    pub fn at(&self, version: usize) -> Result<&H, VersionSetError> {
        version
            .checked_sub(1)
            .and_then(|idx| self.handles.get(idx))
            .ok_or(VersionSetError::OutOfBounds {
                version,
                len: self.handles.len(),
            })
    }

    /// Number of deployments
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    /// Always false: a set is never empty
    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Handles oldest to newest
    pub fn iter(&self) -> impl Iterator<Item = &H> {
        self.handles.iter()
    }

    /// `(version, handle)` pairs oldest to newest
    pub fn versions(&self) -> impl Iterator<Item = (usize, &H)> {
        self.handles.iter().enumerate().map(|(idx, h)| (idx + 1, h))
    }
}

impl<H: SupportsPastEventQuery> ContractVersionSet<H> {
    /// Query every deployment concurrently and concatenate the results.
    ///
    /// Events from older deployments come first; each deployment's own
    /// ordering is kept. If any single query fails the whole call fails and
    /// no partial list is returned.
    pub async fn get_past_events(
        &self,
        event_name: &str,
        options: &H::Options,
    ) -> anyhow::Result<Vec<H::Event>> {
        debug!(
            event = event_name,
            versions = self.handles.len(),
            "querying past events across versions"
        );

        let per_version = try_join_all(
            self.handles
                .iter()
                .map(|handle| handle.get_past_events(event_name, options)),
        )
        .await?;

        let events: Vec<H::Event> = per_version.into_iter().flatten().collect();
        debug!(event = event_name, count = events.len(), "collected past events");
        Ok(events)
    }
}
