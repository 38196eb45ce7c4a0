//! Feed update errors.

use crate::providers::ProviderError;

/// Why a feed update failed. Recorded as the feed's last error; never
/// propagated past the coordinator.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FeedError {
    /// The provider (or both rail providers) returned nothing usable
    #[error("no data from upstream: {0}")]
    NoData(#[source] ProviderError),

    /// The fetch panicked
    #[error("fetch panicked: {0}")]
    Panicked(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = FeedError::NoData(ProviderError::RateLimited);
        assert_eq!(err.to_string(), "no data from upstream: rate limited");

        let err = FeedError::Panicked("index out of bounds".into());
        assert_eq!(err.to_string(), "fetch panicked: index out of bounds");
    }
}
