//! Materializes paginated list endpoints.

use super::ApiRequest;
use super::Transport;
use super::query::MAX_PAGE_SIZE;
use super::query::Page;
use super::query::PageKeys;
use super::query::QueryParams;
use super::query::clamp_page_size;
use crate::error::Error;
use crate::error::LimitExceededError;
use crate::model::Record;
use crate::response::ListResponse;

/// Default hard cap on page fetches per collection.
pub const DEFAULT_MAX_PAGES: usize = 1000;

/// Fetches every page of a list endpoint and concatenates the records.
///
/// # Example
///
/// ```ignore
/// use caspio_lib::api::{Paginator, query::PageKeys};
///
/// let files = Paginator::new()
///     .keys(PageKeys::Plain)
///     .fetch_all(&client, "/v3/files", &QueryParams::new())
///     .await?;
/// ```
#[derive(Debug, Clone)]
pub struct Paginator {
    page_size: usize,
    max_pages: usize,
    max_records: Option<usize>,
    keys: PageKeys,
}

impl Default for Paginator {
    fn default() -> Self {
        Self {
            page_size: MAX_PAGE_SIZE,
            max_pages: DEFAULT_MAX_PAGES,
            max_records: None,
            keys: PageKeys::Prefixed,
        }
    }
}

impl Paginator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records per request, clamped to `[5, 1000]`.
    pub fn page_size(mut self, size: usize) -> Self {
        self.page_size = clamp_page_size(size);
        self
    }

    /// Maximum number of page fetches before giving up.
    pub fn max_pages(mut self, max_pages: usize) -> Self {
        self.max_pages = max_pages.max(1);
        self
    }

    /// Stop as soon as this many records have been collected.
    ///
    /// `0` means no bound.
    pub fn max_records(mut self, max_records: usize) -> Self {
        self.max_records = (max_records > 0).then_some(max_records);
        self
    }

    pub fn keys(mut self, keys: PageKeys) -> Self {
        self.keys = keys;
        self
    }

    /// Starts a page-by-page iteration over `endpoint`.
    pub fn pages<'a, T: Transport + ?Sized>(
        &self,
        transport: &'a T,
        endpoint: impl Into<String>,
        base_query: &QueryParams,
    ) -> Pages<'a, T> {
        Pages {
            transport,
            endpoint: endpoint.into(),
            base_query: base_query.clone(),
            keys: self.keys,
            page_size: self.page_size,
            max_pages: self.max_pages,
            page_number: 1,
            fetched: 0,
            termination: Termination::Pending,
            finished: false,
        }
    }

    /// Fetches all records of `endpoint`.
    ///
    /// Fails with [`LimitExceededError::Pages`] if the result set does not
    /// end within `max_pages` fetches. With `max_records` set, the first
    /// `max_records` records are returned as soon as they are available.
    pub async fn fetch_all<T: Transport + ?Sized>(
        &self,
        transport: &T,
        endpoint: &str,
        base_query: &QueryParams,
    ) -> Result<Vec<Record>, Error> {
        let mut pages = self.pages(transport, endpoint, base_query);
        let mut records = Vec::new();

        while let Some(page) = pages.next().await {
            records.extend(page?.into_records());

            if let Some(max) = self.max_records.filter(|max| records.len() >= *max) {
                records.truncate(max);
                return Ok(records);
            }
        }

        Ok(records)
    }
}

/// How a [`Pages`] iteration knows it has reached the end.
///
/// Decided by the first response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// No page fetched yet.
    Pending,
    /// The first page reported `TotalCount`.
    CountKnown(usize),
    /// No count reported; the first empty or short page ends the set.
    CountUnknown,
}

impl Termination {
    fn is_last(&self, page_number: usize, page_size: usize, received: usize) -> bool {
        match self {
            Self::Pending => false,
            Self::CountKnown(total) => page_number.saturating_mul(page_size) >= *total,
            Self::CountUnknown => received == 0 || received < page_size,
        }
    }
}

/// Async iterator over the pages of a list endpoint.
///
/// Created by [`Paginator::pages`].
pub struct Pages<'a, T: ?Sized> {
    transport: &'a T,
    endpoint: String,
    base_query: QueryParams,
    keys: PageKeys,
    page_size: usize,
    max_pages: usize,
    page_number: usize,
    fetched: usize,
    termination: Termination,
    finished: bool,
}

impl<T: Transport + ?Sized> Pages<'_, T> {
    /// Fetches the next page.
    ///
    /// Returns `None` after the last page or after an error.
    pub async fn next(&mut self) -> Option<Result<Page, Error>> {
        if self.finished {
            return None;
        }

        if self.fetched >= self.max_pages {
            self.finished = true;
            log::debug!(
                "{}: no end after {} pages, giving up",
                self.endpoint,
                self.fetched
            );
            return Some(Err(LimitExceededError::Pages {
                max_pages: self.max_pages,
            }
            .into()));
        }

        let page = match self.fetch().await {
            Ok(page) => page,
            Err(e) => {
                self.finished = true;
                return Some(Err(e));
            }
        };

        if self.termination == Termination::Pending {
            self.termination = match page.total_count() {
                Some(total) => Termination::CountKnown(total),
                None => Termination::CountUnknown,
            };
        }

        self.fetched += 1;
        self.finished = self
            .termination
            .is_last(self.page_number, self.page_size, page.len());

        log::debug!(
            "{}: page {} returned {} records ({:?}{})",
            self.endpoint,
            self.page_number,
            page.len(),
            self.termination,
            if self.finished { ", last" } else { "" }
        );

        self.page_number += 1;
        Some(Ok(page))
    }

    /// The termination mode, once the first page has been seen.
    pub fn termination(&self) -> Termination {
        self.termination
    }

    /// Number of pages fetched so far.
    pub fn fetched(&self) -> usize {
        self.fetched
    }

    async fn fetch(&self) -> Result<Page, Error> {
        let query = self
            .base_query
            .merged(&self.keys.page(self.page_number, self.page_size));
        let response = self
            .transport
            .request(ApiRequest::get(&self.endpoint).query(query))
            .await?;

        let list: ListResponse<Record> = response.into_list()?;
        let total_count = list.total_count();
        let page = Page::new(list.into_items(), self.page_number, self.page_size);

        Ok(match total_count {
            Some(total) => page.with_total_count(total),
            None => page,
        })
    }
}

/// Fetches one list response with `query` exactly as given.
pub async fn fetch_list<T: Transport + ?Sized>(
    transport: &T,
    endpoint: &str,
    query: &QueryParams,
) -> Result<Vec<Record>, Error> {
    let response = transport
        .request(ApiRequest::get(endpoint).query(query.clone()))
        .await?;
    let list: ListResponse<Record> = response.into_list()?;
    Ok(list.into_items())
}
