//! Bounded-concurrency page fetching.
//!
//! [`PageClient`] performs single requests over a pooled connection;
//! [`FetchEngine`] fans a URL list out across Tokio tasks behind a semaphore
//! and collects a keyed [`FetchReport`].

mod client;
mod engine;
mod error;

pub(crate) use client::build_http_client;
pub use client::PageClient;
pub use engine::{FetchEngine, FetchFailure, FetchReport, document_key};
pub use error::FetchError;
