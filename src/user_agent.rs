//! Shared User-Agent strings for page and contents-API HTTP clients.
//!
//! The contents API rejects requests without a User-Agent, so every client
//! built by this crate identifies the tool the same way.

/// Default User-Agent for catalog page and contents API requests.
#[must_use]
pub(crate) fn default_user_agent() -> String {
    let version = env!("CARGO_PKG_VERSION");
    format!("mpw-catalog/{version} (catalog-harvester)")
}
