//! Catalog Core Library
//!
//! This library harvests structured records for the public catalog of
//! shuttle hardware-design projects and derives per-project metrics from
//! their repositories.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`fetch`] - Bounded-concurrency page fetching over a shared client
//! - [`cache`] - Directory-backed cache of fetched detail pages
//! - [`index`] - Project URL discovery from the public index
//! - [`record`] - Record type, field extraction, record store and queries
//! - [`remote`] - Rate-limit-aware repository contents client
//! - [`pins`] - Maximum macro pin count from DEF and LEF files
//! - [`filter`] - Narrowing records by ids piped on stdin
//! - [`pipeline`] - Full rebuild orchestration
//! - [`config`] - Explicit settings passed to every component

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod cache;
pub mod config;
pub mod fetch;
pub mod filter;
pub mod index;
pub mod markup;
pub mod pins;
pub mod pipeline;
pub mod record;
pub mod remote;
mod user_agent;

// Re-export commonly used types
pub use cache::{CacheError, DocumentCache};
pub use config::{Credentials, DEFAULT_CONCURRENCY, Settings};
pub use fetch::{FetchEngine, FetchError, FetchReport, PageClient, document_key};
pub use pins::{PinCountEngine, PinSurvey, count_pins};
pub use pipeline::{PipelineError, RebuildReport, rebuild_cache, rebuild_records};
pub use record::{
    ExtractError, Field, FieldExtractor, NOT_AVAILABLE, ProjectRecord, RecordStore, StoreError,
};
pub use remote::{GitHubClient, RemoteError, RemoteFile, RemoteFiles, RepoRef};
