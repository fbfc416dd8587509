//! Feed error types.

use storyfeed_core::error::DomainError;
use thiserror::Error;

/// Errors surfaced by the feed context.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FeedError {
    /// Fetching either story source failed. The feed is left empty.
    #[error("story aggregation failed: {0}")]
    AggregationFailed(#[from] DomainError),
}
