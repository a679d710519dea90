//! Page type for paginated list results.

use crate::model::Record;

/// One page of a list response.
///
/// # Example
///
/// ```ignore
/// let mut pages = Paginator::new().pages(&client, "/v3/tables/Orders/records", &query);
///
/// while let Some(page) = pages.next().await {
///     let page = page?;
///     println!("page {} has {} records", page.page_number(), page.len());
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct Page {
    records: Vec<Record>,
    /// `Pagination.TotalCount` from the response, when the backend sent it.
    total_count: Option<usize>,
    page_number: usize,
    page_size: usize,
}

impl Page {
    /// Creates a new page from the records of one response.
    pub fn new(records: Vec<Record>, page_number: usize, page_size: usize) -> Self {
        Self {
            records,
            total_count: None,
            page_number,
            page_size,
        }
    }

    /// Sets the total record count.
    pub fn with_total_count(mut self, count: usize) -> Self {
        self.total_count = Some(count);
        self
    }

    /// Returns a reference to the records in this page.
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Consumes the page and returns the records.
    pub fn into_records(self) -> Vec<Record> {
        self.records
    }

    /// Returns the total record count, if the backend reported it.
    pub fn total_count(&self) -> Option<usize> {
        self.total_count
    }

    /// The 1-based number of this page.
    pub fn page_number(&self) -> usize {
        self.page_number
    }

    /// The page size that was requested.
    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Returns `true` if this page has no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Returns the number of records in this page.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` if the page holds fewer records than requested.
    pub fn is_short(&self) -> bool {
        self.records.len() < self.page_size
    }
}
