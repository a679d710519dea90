//! Query-string parameters and pagination directives.

/// Record-endpoint parameter names.
pub mod keys {
    pub const WHERE: &str = "q.where";
    pub const SELECT: &str = "q.select";
    pub const GROUP_BY: &str = "q.groupBy";
    pub const ORDER_BY: &str = "q.orderBy";
    pub const LIMIT: &str = "q.limit";
    pub const PAGE_NUMBER: &str = "q.pageNumber";
    pub const PAGE_SIZE: &str = "q.pageSize";

    pub const EXTERNAL_KEY: &str = "externalKey";
    pub const SORT_FIELD: &str = "sortField";
    pub const SORT_DESCENDING: &str = "sortDescending";
    pub const PLAIN_PAGE_NUMBER: &str = "pageNumber";
    pub const PLAIN_PAGE_SIZE: &str = "pageSize";
}

/// Smallest page size the API accepts.
pub const MIN_PAGE_SIZE: usize = 5;
/// Largest page size (and `q.limit`) the API accepts.
pub const MAX_PAGE_SIZE: usize = 1000;

/// Clamps a page size to `[MIN_PAGE_SIZE, MAX_PAGE_SIZE]`.
pub fn clamp_page_size(size: usize) -> usize {
    size.clamp(MIN_PAGE_SIZE, MAX_PAGE_SIZE)
}

/// An ordered set of query-string parameters.
///
/// Keys are case-sensitive (`where` and `Where` are different parameters).
/// Setting an existing key replaces its value in place, so merging one set
/// over another behaves like an object spread.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `key` to `value`, replacing any previous value.
    pub fn set(&mut self, key: impl Into<String>, value: impl ToString) -> &mut Self {
        let key = key.into();
        let value = value.to_string();
        match self.pairs.iter_mut().find(|(k, _)| *k == key) {
            Some(pair) => pair.1 = value,
            None => self.pairs.push((key, value)),
        }
        self
    }

    /// Builder-style [`set`](Self::set).
    pub fn with(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.set(key, value);
        self
    }

    /// Sets `key` only when `value` is non-empty after trimming.
    pub fn set_trimmed(&mut self, key: impl Into<String>, value: &str) -> &mut Self {
        let value = value.trim();
        if !value.is_empty() {
            self.set(key, value);
        }
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Overlays `other` onto `self`; `other` wins on conflicts.
    pub fn merge(&mut self, other: &QueryParams) -> &mut Self {
        for (key, value) in &other.pairs {
            self.set(key.clone(), value);
        }
        self
    }

    /// Returns a copy of `self` with `other` overlaid.
    pub fn merged(&self, other: &QueryParams) -> QueryParams {
        let mut out = self.clone();
        out.merge(other);
        out
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }
}

/// Which page-directive names an endpoint family expects.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PageKeys {
    /// `q.pageNumber` / `q.pageSize` (table, view and directory records).
    #[default]
    Prefixed,
    /// `pageNumber` / `pageSize` (files and folders).
    Plain,
}

impl PageKeys {
    /// Returns the parameters selecting one page.
    pub fn page(self, page_number: usize, page_size: usize) -> QueryParams {
        let (number_key, size_key) = match self {
            Self::Prefixed => (keys::PAGE_NUMBER, keys::PAGE_SIZE),
            Self::Plain => (keys::PLAIN_PAGE_NUMBER, keys::PLAIN_PAGE_SIZE),
        };
        QueryParams::new()
            .with(number_key, page_number)
            .with(size_key, page_size)
    }
}

/// Explicit pagination directives supplied by a caller in advanced mode.
///
/// Zero or absent values mean "not requested".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PaginationDirectives {
    pub limit: Option<usize>,
    pub page_number: Option<usize>,
    pub page_size: Option<usize>,
}

impl PaginationDirectives {
    /// Converts the directives to `q.*` parameters.
    ///
    /// A page number or page size wins over a limit: the missing half
    /// defaults to page 1 / size 1000 and the size is clamped to `[5, 1000]`.
    /// A limit alone becomes `q.limit`, capped at 1000.
    pub fn to_params(&self) -> QueryParams {
        let page_number = self.page_number.filter(|n| *n > 0);
        let page_size = self.page_size.filter(|n| *n > 0);

        if page_number.is_some() || page_size.is_some() {
            return QueryParams::new()
                .with(keys::PAGE_NUMBER, page_number.unwrap_or(1))
                .with(
                    keys::PAGE_SIZE,
                    page_size.map(clamp_page_size).unwrap_or(MAX_PAGE_SIZE),
                );
        }

        match self.limit.filter(|n| *n > 0) {
            Some(limit) => QueryParams::new().with(keys::LIMIT, limit.min(MAX_PAGE_SIZE)),
            None => QueryParams::new(),
        }
    }
}
