use std::sync::{Mutex, MutexGuard};

use anyhow::{bail, Result};
use async_trait::async_trait;

use crate::db::models::{ProfileRecord, SessionRecord};

use super::SessionStore;

#[derive(Default)]
struct MemoryData {
    sessions: Vec<SessionRecord>,
    profile: Option<ProfileRecord>,
}

/// Process-local store. Sessions are listed in insertion order.
#[derive(Default)]
pub struct MemoryStore {
    data: Mutex<MemoryData>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn session_count(&self) -> usize {
        self.lock().sessions.len()
    }

    fn lock(&self) -> MutexGuard<'_, MemoryData> {
        match self.data.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn append_session(&self, record: &SessionRecord) -> Result<()> {
        let mut data = self.lock();
        if data.sessions.iter().any(|existing| existing.id == record.id) {
            bail!("session {} already stored", record.id);
        }
        data.sessions.push(record.clone());
        Ok(())
    }

    async fn list_sessions(&self) -> Result<Vec<SessionRecord>> {
        Ok(self.lock().sessions.clone())
    }

    async fn get_profile(&self) -> Result<Option<ProfileRecord>> {
        Ok(self.lock().profile.clone())
    }

    async fn set_profile(&self, profile: &ProfileRecord) -> Result<()> {
        let normalized = profile.normalized()?;
        self.lock().profile = Some(normalized);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str) -> SessionRecord {
        SessionRecord {
            id: id.into(),
            pose_id: "tree".into(),
            score: 70,
            stability: 72,
            duration_seconds: 42,
            started_at_epoch_ms: 1_700_000_000_000,
            top_correction_areas: vec!["Gaze".into()],
            feedback_summary: "Good effort".into(),
        }
    }

    #[tokio::test]
    async fn append_then_list_returns_copies() {
        let store = MemoryStore::new();
        store.append_session(&record("a")).await.unwrap();
        store.append_session(&record("b")).await.unwrap();

        let mut listed = store.list_sessions().await.unwrap();
        listed[0].score = 1;

        let again = store.list_sessions().await.unwrap();
        assert_eq!(again.len(), 2);
        assert_eq!(again[0].score, 70);
    }

    #[tokio::test]
    async fn duplicate_ids_are_rejected() {
        let store = MemoryStore::new();
        store.append_session(&record("a")).await.unwrap();
        assert!(store.append_session(&record("a")).await.is_err());
        assert_eq!(store.session_count(), 1);
    }

    #[tokio::test]
    async fn profile_last_write_wins() {
        let store = MemoryStore::new();
        assert!(store.get_profile().await.unwrap().is_none());

        store.set_profile(&ProfileRecord::new("first")).await.unwrap();
        store.set_profile(&ProfileRecord::new("second")).await.unwrap();

        let profile = store.get_profile().await.unwrap().unwrap();
        assert_eq!(profile.username, "second");
    }
}
