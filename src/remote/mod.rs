//! Rate-limit-aware access to files in hosted repositories.

mod client;
mod error;
mod repo;

pub use client::{
    GitHubClient, RATE_LIMIT_REMAINING, RATE_LIMIT_RESET, RAW_MEDIA_TYPE, RemoteFile, RemoteFiles,
    decode_contents,
};
pub use error::RemoteError;
pub use repo::RepoRef;
