//! Persistence boundary for session history and the user profile.

mod memory;

use anyhow::Result;
use async_trait::async_trait;
use thiserror::Error;

use crate::db::models::{ProfileRecord, SessionRecord};

pub use memory::MemoryStore;

/// Stored data that could not be decoded. Stores log it and fall back to
/// empty defaults instead of handing it to callers.
#[derive(Debug, Error)]
#[error("corrupt persisted {what}: {detail}")]
pub struct CorruptPersistedData {
    pub what: &'static str,
    pub detail: String,
}

impl CorruptPersistedData {
    pub fn new(what: &'static str, detail: impl std::fmt::Display) -> Self {
        Self {
            what,
            detail: detail.to_string(),
        }
    }
}

#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Append a finished session. Records are never rewritten.
    async fn append_session(&self, record: &SessionRecord) -> Result<()>;

    /// Every readable session. Order is store-defined; sort with
    /// [`crate::sort_newest_first`] before running trend analytics.
    async fn list_sessions(&self) -> Result<Vec<SessionRecord>>;

    async fn get_profile(&self) -> Result<Option<ProfileRecord>>;

    /// Replace the stored profile (last write wins).
    async fn set_profile(&self, profile: &ProfileRecord) -> Result<()>;
}
