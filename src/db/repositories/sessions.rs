use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{params, Row};

use crate::db::{
    helpers::{decode_areas, encode_areas, to_i64, to_percent, to_u64},
    models::{SessionRecord, MAX_TOP_CORRECTION_AREAS},
    Database,
};
use crate::store::CorruptPersistedData;

const ENABLE_LOGS: bool = true;

use crate::log_warn;

const SESSION_COLUMNS: &str =
    "id, pose_id, score, stability, duration_secs, started_at_ms, top_corrections, feedback";

fn row_to_session(row: &Row) -> Result<SessionRecord> {
    let id: String = row.get("id")?;
    let score: i64 = row.get("score")?;
    let stability: i64 = row.get("stability")?;
    let duration_secs: i64 = row.get("duration_secs")?;
    let top_corrections: String = row.get("top_corrections")?;

    // Damaged area lists degrade to "no recorded corrections" instead of
    // dropping the whole session.
    let mut top_correction_areas = match decode_areas(&top_corrections) {
        Ok(areas) => areas,
        Err(err) => {
            log_warn!(
                "{}",
                CorruptPersistedData::new("correction areas", format!("session {id}: {err:#}"))
            );
            Vec::new()
        }
    };
    top_correction_areas.truncate(MAX_TOP_CORRECTION_AREAS);

    Ok(SessionRecord {
        pose_id: row.get("pose_id")?,
        score: to_percent(score, "score")?,
        stability: to_percent(stability, "stability")?,
        duration_seconds: to_u64(duration_secs, "duration_secs")?,
        started_at_epoch_ms: row.get("started_at_ms")?,
        top_correction_areas,
        feedback_summary: row.get("feedback")?,
        id,
    })
}

impl Database {
    pub async fn insert_session(&self, record: &SessionRecord) -> Result<()> {
        let record = record.clone();
        self.execute(move |conn| {
            conn.execute(
                "INSERT INTO sessions (id, pose_id, score, stability, duration_secs, started_at_ms, top_corrections, feedback, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                params![
                    record.id,
                    record.pose_id,
                    record.score,
                    record.stability,
                    to_i64(record.duration_seconds)?,
                    record.started_at_epoch_ms,
                    encode_areas(&record.top_correction_areas)?,
                    record.feedback_summary,
                    Utc::now().to_rfc3339(),
                ],
            )
            .with_context(|| "failed to insert session")?;
            Ok(())
        })
        .await
    }

    /// Newest first. Rows that fail to decode are logged and skipped.
    pub async fn list_sessions(&self) -> Result<Vec<SessionRecord>> {
        self.execute(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {SESSION_COLUMNS}
                 FROM sessions
                 ORDER BY started_at_ms DESC"
            ))?;

            let mut rows = stmt.query([])?;
            let mut sessions = Vec::new();
            while let Some(row) = rows.next()? {
                match row_to_session(row) {
                    Ok(session) => sessions.push(session),
                    Err(err) => {
                        log_warn!(
                            "skipping stored session: {}",
                            CorruptPersistedData::new("session row", format!("{err:#}"))
                        );
                    }
                }
            }

            Ok(sessions)
        })
        .await
    }
}
