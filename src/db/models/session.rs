//! Completed practice session records.
//!
//! A `SessionRecord` is written once, when a live session ends, and never
//! updated afterwards.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Upper bound on `top_correction_areas`.
pub const MAX_TOP_CORRECTION_AREAS: usize = 2;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    pub id: String,
    pub pose_id: String,
    /// Accuracy, 0..=100.
    pub score: u8,
    /// 0..=100.
    pub stability: u8,
    pub duration_seconds: u64,
    pub started_at_epoch_ms: i64,
    /// Distinct areas, most corrected first, at most two.
    pub top_correction_areas: Vec<String>,
    pub feedback_summary: String,
}

impl SessionRecord {
    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_millis_opt(self.started_at_epoch_ms).single()
    }
}

/// Sort a history in place so the most recent session comes first.
///
/// Stores may return sessions in any order; the trend and streak analytics
/// expect newest-first input.
pub fn sort_newest_first(history: &mut [SessionRecord]) {
    history.sort_by(|a, b| b.started_at_epoch_ms.cmp(&a.started_at_epoch_ms));
}
