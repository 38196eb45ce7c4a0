//! Domain error types.
//!
//! These errors represent validation failures for feed parameters. They
//! are raised when configuration is turned into domain values, never
//! while a feed is polling.

use super::InvalidCrs;

/// Domain-level validation errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomainError {
    /// Station or destination code is not a CRS code
    #[error(transparent)]
    InvalidCrs(#[from] InvalidCrs),

    /// Row count outside the range the boards accept
    #[error("row count {0} out of range (1-20)")]
    RowCountOutOfRange(u32),

    /// Time window outside the configurable range
    #[error("time window {0} minutes out of range (30-300)")]
    TimeWindowOutOfRange(u32),

    /// Filter direction other than `to` or `from`
    #[error("invalid filter type {0:?}: expected \"to\" or \"from\"")]
    InvalidFilterType(String),
}
