use anyhow::Result;
use chrono::Utc;
use rusqlite::{params, Row};

use crate::db::{helpers::parse_datetime, models::ProfileRecord, Database};
use crate::store::CorruptPersistedData;

const ENABLE_LOGS: bool = true;

use crate::log_warn;

fn row_to_profile(row: &Row) -> Result<ProfileRecord> {
    let updated_at: String = row.get("updated_at")?;
    parse_datetime(&updated_at, "updated_at")?;

    let profile = ProfileRecord {
        username: row.get("username")?,
        email: row.get("email")?,
        gender: row.get("gender")?,
        height: row.get("height")?,
    };
    profile.normalized()
}

impl Database {
    /// `None` when no profile was saved or the stored one is unreadable.
    pub async fn load_profile(&self) -> Result<Option<ProfileRecord>> {
        self.execute(|conn| {
            let mut stmt = conn.prepare(
                "SELECT username, email, gender, height, updated_at
                 FROM profile
                 WHERE id = 1",
            )?;

            let mut rows = stmt.query([])?;
            let profile = match rows.next()? {
                Some(row) => match row_to_profile(row) {
                    Ok(profile) => Some(profile),
                    Err(err) => {
                        log_warn!(
                            "ignoring stored profile: {}",
                            CorruptPersistedData::new("profile", format!("{err:#}"))
                        );
                        None
                    }
                },
                None => None,
            };
            Ok(profile)
        })
        .await
    }

    pub async fn save_profile(&self, profile: &ProfileRecord) -> Result<()> {
        let profile = profile.normalized()?;
        self.execute(move |conn| {
            conn.execute(
                "INSERT INTO profile (id, username, email, gender, height, updated_at)
                 VALUES (1, ?1, ?2, ?3, ?4, ?5)
                 ON CONFLICT(id) DO UPDATE SET
                     username = excluded.username,
                     email = excluded.email,
                     gender = excluded.gender,
                     height = excluded.height,
                     updated_at = excluded.updated_at",
                params![
                    profile.username,
                    profile.email,
                    profile.gender,
                    profile.height,
                    Utc::now().to_rfc3339(),
                ],
            )?;
            Ok(())
        })
        .await
    }
}
