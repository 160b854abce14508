//! Typed client for the document-query (RAG) backend.
//!
//! One method per backend endpoint. Endpoints that require authentication
//! take the bearer token as an argument.

mod auth;
mod client;
mod documents;
mod error;
mod types;
mod users;

pub use auth::*;
pub use client::*;
pub use documents::*;
pub use error::*;
pub use types::*;
pub use users::*;
