//! Admin dashboard derived state: filtering, pagination and the page
//! window shown under the table.
//!
//! Nothing here is stored. The view is recomputed from the full
//! registration list every time the filter or the page changes.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::registration::Registration;

/// Rows per dashboard page.
pub const DEFAULT_PAGE_SIZE: usize = 10;

// ---------------------------------------------------------------------------
// Filter
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportStatusFilter {
    #[default]
    All,
    Exported,
    Unexported,
}

impl FromStr for ExportStatusFilter {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(Self::All),
            "exported" => Ok(Self::Exported),
            "unexported" => Ok(Self::Unexported),
            other => Err(CoreError::Validation(format!(
                "export_status must be one of all, exported, unexported; got '{other}'"
            ))),
        }
    }
}

/// Three independent predicates combined with AND.
///
/// `group: None` means all groups; an empty `leader` matches every leader.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DashboardFilter {
    pub group: Option<String>,
    pub leader: String,
    pub export_status: ExportStatusFilter,
}

impl DashboardFilter {
    pub fn matches(&self, registration: &Registration) -> bool {
        if let Some(group) = &self.group {
            if registration.platinum_group != *group {
                return false;
            }
        }

        if !self.leader.is_empty()
            && !registration
                .leader_name
                .to_lowercase()
                .contains(&self.leader.to_lowercase())
        {
            return false;
        }

        match self.export_status {
            ExportStatusFilter::All => true,
            ExportStatusFilter::Exported => registration.exported_to_sheet,
            ExportStatusFilter::Unexported => !registration.exported_to_sheet,
        }
    }

    /// Whether any predicate narrows the list.
    pub fn is_active(&self) -> bool {
        self.group.is_some()
            || !self.leader.is_empty()
            || self.export_status != ExportStatusFilter::All
    }

    pub fn apply<'a>(&self, registrations: &'a [Registration]) -> Vec<&'a Registration> {
        registrations.iter().filter(|r| self.matches(r)).collect()
    }
}

// ---------------------------------------------------------------------------
// Pagination
// ---------------------------------------------------------------------------

/// Number of pages needed for `len` items (zero when there are no items).
pub fn total_pages(len: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 0;
    }
    len.div_ceil(page_size)
}

/// Slice out one 1-based page. Out-of-range pages are empty.
pub fn page_slice<T>(items: &[T], page: usize, page_size: usize) -> &[T] {
    if page == 0 || page_size == 0 {
        return &[];
    }
    let start = (page - 1).saturating_mul(page_size);
    if start >= items.len() {
        return &[];
    }
    let end = (start + page_size).min(items.len());
    &items[start..end]
}

/// One entry of the page selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PageLink {
    Page { number: usize, current: bool },
    Ellipsis,
}

/// Page selector: the first and last pages plus current±1, with an ellipsis
/// at current±2 and nothing beyond.
pub fn page_window(current: usize, total: usize) -> Vec<PageLink> {
    let mut links = Vec::new();
    for page in 1..=total {
        let near = page + 1 >= current && page <= current + 1;
        if page == 1 || page == total || near {
            links.push(PageLink::Page {
                number: page,
                current: page == current,
            });
        } else if page + 2 == current || page == current + 2 {
            links.push(PageLink::Ellipsis);
        }
    }
    links
}

// ---------------------------------------------------------------------------
// View
// ---------------------------------------------------------------------------

/// The current filter and page of the dashboard table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardView {
    filter: DashboardFilter,
    page: usize,
    page_size: usize,
}

/// One rendered dashboard page.
#[derive(Debug, Serialize)]
pub struct DashboardPage<'a> {
    pub items: Vec<&'a Registration>,
    pub page: usize,
    pub page_size: usize,
    pub total_pages: usize,
    pub total_filtered: usize,
    /// 1-based index of the first row on this page, 0 when empty.
    pub first_row: usize,
    pub last_row: usize,
    pub page_window: Vec<PageLink>,
}

impl DashboardView {
    pub fn new(page_size: usize) -> Self {
        Self {
            filter: DashboardFilter::default(),
            page: 1,
            page_size: page_size.max(1),
        }
    }

    pub fn filter(&self) -> &DashboardFilter {
        &self.filter
    }

    pub fn page(&self) -> usize {
        self.page
    }

    /// Replace the filter. Any change sends the view back to page 1.
    pub fn set_filter(&mut self, filter: DashboardFilter) {
        if filter != self.filter {
            self.filter = filter;
            self.page = 1;
        }
    }

    pub fn set_page(&mut self, page: usize) {
        self.page = page.max(1);
    }

    pub fn next_page(&mut self, total_pages: usize) {
        self.page = (self.page + 1).min(total_pages.max(1));
    }

    pub fn previous_page(&mut self) {
        self.page = self.page.saturating_sub(1).max(1);
    }

    /// Filter and paginate. The requested page is clamped into range.
    pub fn render<'a>(&self, registrations: &'a [Registration]) -> DashboardPage<'a> {
        let filtered = self.filter.apply(registrations);
        let total_filtered = filtered.len();
        let total_pages = total_pages(total_filtered, self.page_size);
        let page = self.page.clamp(1, total_pages.max(1));
        let items = page_slice(&filtered, page, self.page_size).to_vec();

        let first_row = if items.is_empty() {
            0
        } else {
            (page - 1) * self.page_size + 1
        };
        let last_row = if items.is_empty() {
            0
        } else {
            first_row + items.len() - 1
        };

        DashboardPage {
            items,
            page,
            page_size: self.page_size,
            total_pages,
            total_filtered,
            first_row,
            last_row,
            page_window: page_window(page, total_pages),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
