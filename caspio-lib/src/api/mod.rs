//! REST API operations
//!
//! Every operation is a free function generic over [`Transport`], so it runs
//! against [`CaspioClient`](crate::CaspioClient) or any other implementation.

mod attachments;
mod batch;
mod directories;
mod files;
mod folders;
#[cfg(test)]
mod mock;
mod pagination;
pub mod query;
mod records;
mod tasks;
mod transport;

pub use attachments::*;
pub use batch::*;
pub use directories::*;
pub use files::*;
pub use folders::*;
pub use pagination::*;
pub use records::*;
pub use tasks::*;
pub use transport::*;
