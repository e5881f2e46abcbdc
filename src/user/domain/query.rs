//! Search options and result pages for the user directory.

use super::User;
use serde::Serialize;

/// Options for the paginated user search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserFilters {
    text: Option<String>,
    role: Option<String>,
    page: u64,
    page_size: u64,
}

impl Default for UserFilters {
    fn default() -> Self {
        Self {
            text: None,
            role: None,
            page: 1,
            page_size: Self::DEFAULT_PAGE_SIZE,
        }
    }
}

impl UserFilters {
    /// Page size used when none, or zero, is requested.
    pub const DEFAULT_PAGE_SIZE: u64 = 10;
    /// Largest page size a caller may request.
    pub const MAX_PAGE_SIZE: u64 = 100;

    /// Creates filters for the first page matching every user.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Keeps users whose name, login or email contains `text`, ignoring
    /// case. Blank text matches everyone.
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        let trimmed = text.into().trim().to_owned();
        self.text = (!trimmed.is_empty()).then_some(trimmed);
        self
    }

    /// Keeps users holding exactly `role`.
    #[must_use]
    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
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

    /// Returns the search text, if any.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// Returns the role filter, if any.
    #[must_use]
    pub fn role(&self) -> Option<&str> {
        self.role.as_deref()
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

    /// Returns whether `user` passes the text and role filters.
    #[must_use]
    pub fn matches(&self, user: &User) -> bool {
        let role_matches = self.role().is_none_or(|role| user.role() == role);
        let text_matches = self.text().is_none_or(|text| {
            let needle = text.to_lowercase();
            [
                user.user_name(),
                user.email(),
                user.first_name(),
                user.last_name(),
            ]
            .iter()
            .any(|field| field.to_lowercase().contains(&needle))
        });
        role_matches && text_matches
    }
}

/// One page of users with totals.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserPage {
    /// Users on this page.
    pub data: Vec<User>,
    /// Number of users matching the filters across all pages.
    pub total: u64,
    /// 1-based page number.
    pub page: u64,
    /// Page size used.
    pub page_size: u64,
    /// Number of pages needed for `total`.
    pub total_pages: u64,
}

impl UserPage {
    /// Assembles a page for `filters`.
    #[must_use]
    pub fn new(data: Vec<User>, total: u64, filters: &UserFilters) -> Self {
        let page_size = filters.page_size();
        Self {
            data,
            total,
            page: filters.page(),
            page_size,
            total_pages: total.div_ceil(page_size),
        }
    }
}
