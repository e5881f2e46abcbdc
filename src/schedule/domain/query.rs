//! Filter, sort and pagination types for schedule listings.

use super::{ParseSortError, Schedule};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Range over the scheduled slot start, `[from, until)`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    /// Inclusive lower bound.
    pub from: Option<DateTime<Utc>>,
    /// Exclusive upper bound.
    pub until: Option<DateTime<Utc>>,
}

impl DateRange {
    /// Returns whether `instant` satisfies both bounds.
    #[must_use]
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.from.is_none_or(|from| from <= instant) && self.until.is_none_or(|until| instant < until)
    }
}

/// Sortable schedule columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleSortField {
    /// Planned slot start.
    ScheduledSlotFrom,
    /// Planned slot end.
    ScheduledSlotTo,
    /// Service label.
    ServiceName,
    /// Lifecycle status label.
    VisitStatus,
    /// Creation timestamp.
    CreatedAt,
    /// Last update timestamp.
    UpdatedAt,
}

impl ScheduleSortField {
    /// Returns the storage column name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ScheduledSlotFrom => "scheduled_slot_from",
            Self::ScheduledSlotTo => "scheduled_slot_to",
            Self::ServiceName => "service_name",
            Self::VisitStatus => "visit_status",
            Self::CreatedAt => "created_at",
            Self::UpdatedAt => "updated_at",
        }
    }
}

impl TryFrom<&str> for ScheduleSortField {
    type Error = ParseSortError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "scheduled_slot_from" => Ok(Self::ScheduledSlotFrom),
            "scheduled_slot_to" => Ok(Self::ScheduledSlotTo),
            "service_name" => Ok(Self::ServiceName),
            "visit_status" => Ok(Self::VisitStatus),
            "created_at" => Ok(Self::CreatedAt),
            "updated_at" => Ok(Self::UpdatedAt),
            _ => Err(ParseSortError(value.to_owned())),
        }
    }
}

impl fmt::Display for ScheduleSortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    /// Ascending.
    #[default]
    Asc,
    /// Descending.
    Desc,
}

impl TryFrom<&str> for SortDirection {
    type Error = ParseSortError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            _ => Err(ParseSortError(value.to_owned())),
        }
    }
}

/// Listing options for the paginated assignee query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleFilters {
    slot_from: DateRange,
    sort_by: Vec<ScheduleSortField>,
    direction: SortDirection,
    page: u64,
    page_size: u64,
}

impl Default for ScheduleFilters {
    fn default() -> Self {
        Self {
            slot_from: DateRange::default(),
            sort_by: Vec::new(),
            direction: SortDirection::Asc,
            page: 1,
            page_size: Self::DEFAULT_PAGE_SIZE,
        }
    }
}

impl ScheduleFilters {
    /// Page size used when none, or zero, is requested.
    pub const DEFAULT_PAGE_SIZE: u64 = 10;
    /// Largest page size a caller may request.
    pub const MAX_PAGE_SIZE: u64 = 100;

    /// Creates filters for the first page with default size and no range.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restricts results to slots starting inside `range`.
    #[must_use]
    pub const fn with_slot_from_range(mut self, range: DateRange) -> Self {
        self.slot_from = range;
        self
    }

    /// Orders results by `fields` in `direction`.
    #[must_use]
    pub fn with_sort(
        mut self,
        fields: impl IntoIterator<Item = ScheduleSortField>,
        direction: SortDirection,
    ) -> Self {
        self.sort_by = fields.into_iter().collect();
        self.direction = direction;
        self
    }

    /// Selects a 1-based page; zero selects the first page.
    #[must_use]
    pub const fn with_page(mut self, page: u64) -> Self {
        self.page = if page == 0 { 1 } else { page };
        self
    }

    /// Sets the page size, clamped to `1..=MAX_PAGE_SIZE`; zero selects the
    /// default.
    #[must_use]
    pub const fn with_page_size(mut self, page_size: u64) -> Self {
        self.page_size = if page_size == 0 {
            Self::DEFAULT_PAGE_SIZE
        } else if page_size > Self::MAX_PAGE_SIZE {
            Self::MAX_PAGE_SIZE
        } else {
            page_size
        };
        self
    }

    /// Returns the slot start range.
    #[must_use]
    pub const fn slot_from_range(&self) -> DateRange {
        self.slot_from
    }

    /// Returns the sort fields in priority order.
    #[must_use]
    pub fn sort_by(&self) -> &[ScheduleSortField] {
        &self.sort_by
    }

    /// Returns the sort direction.
    #[must_use]
    pub const fn direction(&self) -> SortDirection {
        self.direction
    }

    /// Returns the 1-based page number.
    #[must_use]
    pub const fn page(&self) -> u64 {
        self.page
    }

    /// Returns the page size.
    #[must_use]
    pub const fn page_size(&self) -> u64 {
        self.page_size
    }

    /// Returns the number of rows skipped before this page.
    #[must_use]
    pub const fn offset(&self) -> u64 {
        self.page.saturating_sub(1).saturating_mul(self.page_size)
    }
}

/// One page of schedules with totals.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SchedulePage {
    /// Schedules on this page.
    pub data: Vec<Schedule>,
    /// Number of schedules matching the filters across all pages.
    pub total: u64,
    /// 1-based page number.
    pub page: u64,
    /// Page size used.
    pub page_size: u64,
    /// Number of pages needed for `total`.
    pub total_pages: u64,
}

impl SchedulePage {
    /// Assembles a page for `filters`.
    #[must_use]
    pub fn new(data: Vec<Schedule>, total: u64, filters: &ScheduleFilters) -> Self {
        let page_size = filters.page_size();
        Self {
            data,
            total,
            page: filters.page(),
            page_size,
            total_pages: total.div_ceil(page_size),
        }
    }

    /// Returns whether pages follow this one.
    #[must_use]
    pub const fn has_next(&self) -> bool {
        self.page < self.total_pages
    }
}
