//! Typed models

mod attachment;
mod directory;
mod field;
mod file;
mod folder;
mod list_value;

pub use attachment::*;
pub use directory::*;
pub use field::*;
pub use file::*;
pub use folder::*;
pub use list_value::*;

/// A record as returned by the API: field name to JSON value, in backend order.
pub type Record = serde_json::Map<String, serde_json::Value>;
