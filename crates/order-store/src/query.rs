use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Order, OrderStatus};

/// Page used when the caller asks for a non-positive page.
pub const DEFAULT_PAGE: usize = 1;

/// Page size used when the caller asks for a non-positive page size.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Filters and pagination for listing orders.
///
/// Soft-deleted orders are never listed. All filters are optional and
/// combine with AND. Pagination values are normalized rather than rejected.
#[derive(Debug, Clone, Default)]
pub struct ListOptions {
    /// Filter by exact status.
    pub status: Option<OrderStatus>,

    /// Filter by exact customer ID.
    pub customer_id: Option<String>,

    /// Filter by orders created at or after this timestamp (inclusive).
    pub created_from: Option<DateTime<Utc>>,

    /// Filter by orders created at or before this timestamp (inclusive).
    pub created_to: Option<DateTime<Utc>>,

    /// 1-based page number. Non-positive means the first page.
    pub page: i64,

    /// Items per page. Non-positive means the default page size.
    pub page_size: i64,
}

impl ListOptions {
    /// Creates options with no filters and default pagination.
    pub fn new() -> Self {
        Self::default()
    }

    /// Filters by status.
    pub fn status(mut self, status: OrderStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Filters by customer.
    pub fn customer_id(mut self, customer_id: impl Into<String>) -> Self {
        self.customer_id = Some(customer_id.into());
        self
    }

    /// Filters to orders created at or after this timestamp.
    pub fn created_from(mut self, timestamp: DateTime<Utc>) -> Self {
        self.created_from = Some(timestamp);
        self
    }

    /// Filters to orders created at or before this timestamp.
    pub fn created_to(mut self, timestamp: DateTime<Utc>) -> Self {
        self.created_to = Some(timestamp);
        self
    }

    /// Selects the page to return.
    pub fn page(mut self, page: i64) -> Self {
        self.page = page;
        self
    }

    /// Sets the page size.
    pub fn page_size(mut self, page_size: i64) -> Self {
        self.page_size = page_size;
        self
    }

    /// Returns true if a live order passes every filter.
    pub fn matches(&self, order: &Order) -> bool {
        if order.is_deleted() {
            return false;
        }
        if let Some(status) = self.status
            && order.status != status
        {
            return false;
        }
        if let Some(ref customer_id) = self.customer_id
            && &order.customer_id != customer_id
        {
            return false;
        }
        if let Some(from) = self.created_from
            && order.created_at < from
        {
            return false;
        }
        if let Some(to) = self.created_to
            && order.created_at > to
        {
            return false;
        }
        true
    }

    /// Returns the normalized `(page, page_size)` pair.
    pub fn normalized_paging(&self) -> (usize, usize) {
        let page = usize::try_from(self.page)
            .ok()
            .filter(|&p| p > 0)
            .unwrap_or(DEFAULT_PAGE);
        let page_size = usize::try_from(self.page_size)
            .ok()
            .filter(|&s| s > 0)
            .unwrap_or(DEFAULT_PAGE_SIZE);
        (page, page_size)
    }
}

/// One page of a filtered, ordered result set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListResult<T> {
    pub items: Vec<T>,
    pub page: usize,
    pub page_size: usize,
    pub total_items: usize,
    pub total_pages: usize,
}

impl<T> ListResult<T> {
    /// Cuts the requested page out of an already filtered and sorted set.
    ///
    /// A page past the end yields no items but still reports the totals.
    /// `page` and `page_size` must already be normalized (both > 0).
    pub fn paginate(all: Vec<T>, page: usize, page_size: usize) -> Self {
        let total_items = all.len();
        let total_pages = total_items.div_ceil(page_size);

        let items = match page.saturating_sub(1).checked_mul(page_size) {
            Some(start) if start < total_items => {
                let end = start.saturating_add(page_size).min(total_items);
                all.into_iter().skip(start).take(end - start).collect()
            }
            _ => Vec::new(),
        };

        Self {
            items,
            page,
            page_size,
            total_items,
            total_pages,
        }
    }

    /// Transforms every item, keeping the page metadata.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> ListResult<U> {
        ListResult {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            page_size: self.page_size,
            total_items: self.total_items,
            total_pages: self.total_pages,
        }
    }
}
