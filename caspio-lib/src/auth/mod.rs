//! Authentication
//!
//! Token acquisition happens outside this crate; the client only consumes
//! tokens through [`TokenProvider`].

mod token;

pub use token::AccessToken;
pub use token::StaticTokenProvider;
pub use token::TokenProvider;
