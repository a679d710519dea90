//! Query construction for record, file and folder endpoints.
//!
//! # Clause builders
//!
//! - [`build_where`] - filter conditions to a `q.where` clause
//! - [`build_select`] - field specifications to `q.select` / `q.groupBy`
//! - [`build_order_by`] - sort specifications to `q.orderBy`
//!
//! # Composition
//!
//! - [`RecordQuery`] - typed specifications to query parameters
//! - [`RawQuery`] - caller-written clauses plus [`PaginationDirectives`]
//! - [`QueryParams`] - ordered, case-sensitive query-string parameters
//! - [`Page`] - one page of a list response

mod builder;
mod filter;
mod order;
mod page;
mod params;
mod select;

pub use builder::BuiltQuery;
pub use builder::RawQuery;
pub use builder::RecordQuery;
pub use filter::build_where;
pub use filter::validate_filter;
pub use filter::FilterCondition;
pub use filter::Operator;
pub use order::build_order_by;
pub use order::Direction;
pub use order::SortSpec;
pub use page::Page;
pub use params::clamp_page_size;
pub use params::keys;
pub use params::PageKeys;
pub use params::PaginationDirectives;
pub use params::QueryParams;
pub use params::MAX_PAGE_SIZE;
pub use params::MIN_PAGE_SIZE;
pub use select::build_select;
pub use select::Aggregation;
pub use select::FieldSpec;
pub use select::SelectClause;
