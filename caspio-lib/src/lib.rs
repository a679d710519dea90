//! Caspio REST API client library
//!
//! Query construction, pagination and folder traversal for the Caspio REST
//! API (v3): record selection with typed filters, sorts and aggregations,
//! record writes with list-field encoding, and file/folder listings.
//!
//! # Example
//!
//! ```ignore
//! use caspio_lib::CaspioClient;
//! use caspio_lib::api::{RecordSource, ReturnMode, SelectRecords, select_records};
//! use caspio_lib::api::query::{FilterCondition, RecordQuery};
//!
//! let client = CaspioClient::builder()
//!     .integration_url("c1abc123.caspio.com")
//!     .token_provider(provider)
//!     .build()?;
//!
//! let query = RecordQuery::new().filter(FilterCondition::new("Status", "equals", "Active"));
//! let rows = select_records(
//!     &client,
//!     &RecordSource::Table("Orders".into()),
//!     &SelectRecords::basic(query, ReturnMode::All),
//! )
//! .await?;
//! ```

pub mod api;
pub mod auth;
pub mod error;
pub mod model;
pub mod rate_limit;
pub mod response;

mod client;

pub use client::*;
