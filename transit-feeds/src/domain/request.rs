//! Rail board request parameters.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use super::{Crs, DomainError};

/// Number of services requested from a board, bounded to 1..=20.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RowCount(u8);

impl RowCount {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 20;

    pub fn new(rows: u32) -> Result<Self, DomainError> {
        if (u32::from(Self::MIN)..=u32::from(Self::MAX)).contains(&rows) {
            Ok(Self(rows as u8))
        } else {
            Err(DomainError::RowCountOutOfRange(rows))
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl Default for RowCount {
    fn default() -> Self {
        Self(10)
    }
}

/// Board look-ahead window in minutes, bounded to 30..=300.
///
/// The bound is checked once when configuration is read; providers with
/// a narrower limit (Darwin caps at 120) clamp on their side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeWindow(u16);

impl TimeWindow {
    pub const MIN: u16 = 30;
    pub const MAX: u16 = 300;

    pub fn new(minutes: u32) -> Result<Self, DomainError> {
        if (u32::from(Self::MIN)..=u32::from(Self::MAX)).contains(&minutes) {
            Ok(Self(minutes as u16))
        } else {
            Err(DomainError::TimeWindowOutOfRange(minutes))
        }
    }

    pub fn minutes(self) -> u16 {
        self.0
    }
}

impl Default for TimeWindow {
    fn default() -> Self {
        Self(120)
    }
}

/// Direction of a destination filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterType {
    /// Services calling at the filter station after this one.
    To,
    /// Services that called at the filter station before this one.
    From,
}

impl FilterType {
    pub fn as_str(self) -> &'static str {
        match self {
            FilterType::To => "to",
            FilterType::From => "from",
        }
    }
}

impl fmt::Display for FilterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FilterType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "to" => Ok(FilterType::To),
            "from" => Ok(FilterType::From),
            other => Err(DomainError::InvalidFilterType(other.to_string())),
        }
    }
}

/// A destination filter applied to a board request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct DestinationFilter {
    pub crs: Crs,
    pub direction: FilterType,
}

/// One logical board request, shared verbatim by both rail providers.
///
/// Immutable once built; a feed coordinator issues the same request on
/// every tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeedRequest {
    station: Crs,
    num_rows: RowCount,
    filter: Option<DestinationFilter>,
    time_window: TimeWindow,
    time_offset: i16,
}

impl FeedRequest {
    /// Create an unfiltered request with no time offset.
    pub fn new(station: Crs, num_rows: RowCount, time_window: TimeWindow) -> Self {
        Self {
            station,
            num_rows,
            filter: None,
            time_window,
            time_offset: 0,
        }
    }

    /// Restrict the board to services calling at (or from) `crs`.
    pub fn with_filter(mut self, crs: Crs, direction: FilterType) -> Self {
        self.filter = Some(DestinationFilter { crs, direction });
        self
    }

    /// Shift the board start by `minutes` from now.
    pub fn with_time_offset(mut self, minutes: i16) -> Self {
        self.time_offset = minutes;
        self
    }

    pub fn station(&self) -> Crs {
        self.station
    }

    pub fn num_rows(&self) -> RowCount {
        self.num_rows
    }

    pub fn filter(&self) -> Option<DestinationFilter> {
        self.filter
    }

    pub fn time_window(&self) -> TimeWindow {
        self.time_window
    }

    pub fn time_offset(&self) -> i16 {
        self.time_offset
    }
}
