use chrono::{DateTime, TimeZone};
use serde::Serialize;

use crate::catalog::PoseCatalog;
use crate::db::models::{sort_newest_first, SessionRecord};
use crate::session::summary::format_duration;

use super::config::PatternConfig;
use super::patterns::{detect_patterns, Pattern};
use super::stats::{average_accuracy, most_practiced_subject, streak_at};

const GOOD_FORM_SCORE: u8 = 75;
const FAIR_FORM_SCORE: u8 = 55;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum FormRating {
    Good,
    Fair,
    NeedsWork,
}

impl FormRating {
    pub fn from_score(score: u8) -> Self {
        if score >= GOOD_FORM_SCORE {
            FormRating::Good
        } else if score >= FAIR_FORM_SCORE {
            FormRating::Fair
        } else {
            FormRating::NeedsWork
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            FormRating::Good => "Good",
            FormRating::Fair => "Fair",
            FormRating::NeedsWork => "Needs work",
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SessionCard {
    pub session_id: String,
    pub pose_name: String,
    pub score: u8,
    pub stability: u8,
    pub rating: FormRating,
    pub duration_label: String,
    /// Empty when the stored timestamp is out of range.
    pub date_label: String,
    pub top_correction_areas: Vec<String>,
    pub feedback: String,
}

impl SessionCard {
    fn build<Tz: TimeZone>(record: &SessionRecord, catalog: &PoseCatalog, tz: &Tz) -> Self
    where
        Tz::Offset: std::fmt::Display,
    {
        let date_label = record
            .started_at()
            .map(|started| started.with_timezone(tz).format("%-d %b %Y").to_string())
            .unwrap_or_default();

        Self {
            session_id: record.id.clone(),
            pose_name: catalog.display_name(&record.pose_id),
            score: record.score,
            stability: record.stability,
            rating: FormRating::from_score(record.score),
            duration_label: format_duration(record.duration_seconds),
            date_label,
            top_correction_areas: record.top_correction_areas.clone(),
            feedback: record.feedback_summary.clone(),
        }
    }

    /// e.g. `"82% Good"`.
    pub fn score_label(&self) -> String {
        format!("{}% {}", self.score, self.rating.label())
    }
}

/// Everything the profile page shows about past practice.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ProfileOverview {
    pub total_sessions: usize,
    /// Rounded; `None` without history.
    pub average_accuracy: Option<u8>,
    pub favourite_pose: Option<String>,
    pub streak: u32,
    pub last_session: Option<SessionCard>,
    pub patterns: Vec<Pattern>,
    pub history: Vec<SessionCard>,
}

impl ProfileOverview {
    /// `history` may be in any order; `now` anchors the streak and sets the
    /// timezone for dates.
    pub fn build<Tz: TimeZone>(
        history: &[SessionRecord],
        catalog: &PoseCatalog,
        now: DateTime<Tz>,
    ) -> Self
    where
        Tz::Offset: std::fmt::Display,
    {
        Self::build_with(history, catalog, now, &PatternConfig::default())
    }

    pub fn build_with<Tz: TimeZone>(
        history: &[SessionRecord],
        catalog: &PoseCatalog,
        now: DateTime<Tz>,
        config: &PatternConfig,
    ) -> Self
    where
        Tz::Offset: std::fmt::Display,
    {
        let mut sorted = history.to_vec();
        sort_newest_first(&mut sorted);

        let tz = now.timezone();
        let cards: Vec<SessionCard> = sorted
            .iter()
            .map(|record| SessionCard::build(record, catalog, &tz))
            .collect();

        let average = if sorted.is_empty() {
            None
        } else {
            Some(average_accuracy(&sorted).round().clamp(0.0, 100.0) as u8)
        };

        let favourite_pose = most_practiced_subject(&sorted).map(|pose_id| match catalog.get(&pose_id) {
            Some(pose) => pose.short_name(),
            None => pose_id,
        });

        Self {
            total_sessions: sorted.len(),
            average_accuracy: average,
            favourite_pose,
            streak: streak_at(&sorted, now),
            last_session: cards.first().cloned(),
            patterns: detect_patterns(&sorted, config),
            history: cards,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.total_sessions == 0
    }
}
