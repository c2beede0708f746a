use std::collections::HashSet;

use chrono::{DateTime, Duration, Local, NaiveDate, TimeZone};
use serde::Serialize;

use crate::db::models::SessionRecord;

/// Mean score, `0.0` for an empty history.
pub fn average_accuracy(history: &[SessionRecord]) -> f64 {
    if history.is_empty() {
        return 0.0;
    }
    let total: u64 = history.iter().map(|record| record.score as u64).sum();
    total as f64 / history.len() as f64
}

/// Most frequent pose id; ties go to whichever appears first in `history`.
pub fn most_practiced_subject(history: &[SessionRecord]) -> Option<String> {
    let mut counts: Vec<(&str, usize)> = Vec::new();
    for record in history {
        match counts.iter_mut().find(|(id, _)| *id == record.pose_id) {
            Some((_, count)) => *count += 1,
            None => counts.push((record.pose_id.as_str(), 1)),
        }
    }

    let mut best: Option<(&str, usize)> = None;
    for (id, count) in counts {
        if best.map_or(true, |(_, top)| count > top) {
            best = Some((id, count));
        }
    }
    best.map(|(id, _)| id.to_string())
}

/// Consecutive practice days ending today, in the local timezone.
pub fn streak(history: &[SessionRecord]) -> u32 {
    streak_at(history, Local::now())
}

/// Consecutive calendar days, walking back from `now`'s date, that have at
/// least one session. Days are taken in `now`'s timezone. A day without a
/// session ends the walk, including today.
pub fn streak_at<Tz: TimeZone>(history: &[SessionRecord], now: DateTime<Tz>) -> u32 {
    let tz = now.timezone();
    let days: HashSet<NaiveDate> = history
        .iter()
        .filter_map(|record| record.started_at())
        .map(|started| started.with_timezone(&tz).date_naive())
        .collect();

    let mut day = now.date_naive();
    let mut streak = 0;
    while days.contains(&day) {
        streak += 1;
        day = match day.checked_sub_signed(Duration::days(1)) {
            Some(previous) => previous,
            None => break,
        };
    }
    streak
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AreaFrequency {
    pub area: String,
    /// Records listing this area among their top corrections.
    pub count: usize,
    /// `count` as a rounded share of all records.
    pub percent: u8,
}

/// Correction areas ranked by how many records list them; ties keep
/// first-seen order.
pub fn correction_frequency_across_history(history: &[SessionRecord]) -> Vec<AreaFrequency> {
    let mut counts: Vec<(String, usize)> = Vec::new();
    for record in history {
        let mut seen = HashSet::new();
        for area in &record.top_correction_areas {
            if !seen.insert(area.as_str()) {
                continue;
            }
            match counts.iter_mut().find(|(name, _)| name == area) {
                Some((_, count)) => *count += 1,
                None => counts.push((area.clone(), 1)),
            }
        }
    }
    counts.sort_by(|a, b| b.1.cmp(&a.1));

    let total = history.len();
    counts
        .into_iter()
        .map(|(area, count)| AreaFrequency {
            percent: percent_of(count, total),
            area,
            count,
        })
        .collect()
}

pub(crate) fn percent_of(count: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    ((count as f64 / total as f64) * 100.0).round().clamp(0.0, 100.0) as u8
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::{FixedOffset, Utc};

    pub(crate) fn record(
        id: &str,
        pose: &str,
        score: u8,
        started_ms: i64,
        areas: &[&str],
    ) -> SessionRecord {
        SessionRecord {
            id: id.to_string(),
            pose_id: pose.to_string(),
            score,
            stability: score,
            duration_seconds: 90,
            started_at_epoch_ms: started_ms,
            top_correction_areas: areas.iter().map(|a| a.to_string()).collect(),
            feedback_summary: String::new(),
        }
    }

    const DAY_MS: i64 = 86_400_000;

    #[test]
    fn average_of_empty_history_is_zero() {
        assert_eq!(average_accuracy(&[]), 0.0);
    }

    #[test]
    fn average_lies_between_extremes() {
        let history = vec![
            record("a", "tree", 91, 0, &[]),
            record("b", "tree", 47, 0, &[]),
            record("c", "crow", 66, 0, &[]),
        ];
        let avg = average_accuracy(&history);
        assert!((47.0..=91.0).contains(&avg));
        assert!((avg - 68.0).abs() < 1e-9);
    }

    #[test]
    fn most_practiced_breaks_ties_by_first_seen() {
        let history = vec![
            record("a", "crow", 80, 0, &[]),
            record("b", "tree", 80, 0, &[]),
            record("c", "tree", 80, 0, &[]),
            record("d", "crow", 80, 0, &[]),
            record("e", "lotus", 80, 0, &[]),
        ];
        assert_eq!(most_practiced_subject(&history).as_deref(), Some("crow"));
        assert_eq!(most_practiced_subject(&[]), None);
    }

    #[test]
    fn streak_stops_at_first_gap() {
        let now = Utc.with_ymd_and_hms(2026, 10, 19, 18, 0, 0).unwrap();
        let today = now.timestamp_millis();
        let history = vec![
            record("a", "tree", 80, today - 3_600_000, &[]),
            record("b", "tree", 80, today - 5_000_000, &[]),
            record("c", "tree", 80, today - DAY_MS, &[]),
            record("d", "tree", 80, today - 3 * DAY_MS, &[]),
        ];

        assert_eq!(streak_at(&[], now), 0);
        assert_eq!(streak_at(&history, now), 2);
        assert_eq!(streak_at(&history[2..], now), 0);
    }

    #[test]
    fn streak_uses_calendar_days_of_the_anchor_timezone() {
        // 23:30 and 00:30 local are different days even though they are an
        // hour apart.
        let ist = FixedOffset::east_opt(5 * 3600 + 1800).unwrap();
        let now = ist.with_ymd_and_hms(2026, 10, 19, 0, 30, 0).unwrap();
        let late_yesterday = ist.with_ymd_and_hms(2026, 10, 18, 23, 30, 0).unwrap();

        let history = vec![
            record("a", "tree", 80, now.timestamp_millis(), &[]),
            record("b", "tree", 80, late_yesterday.timestamp_millis(), &[]),
        ];
        assert_eq!(streak_at(&history, now), 2);
    }

    #[test]
    fn area_frequency_counts_records_not_mentions() {
        let history = vec![
            record("a", "tree", 80, 0, &["Hips", "Knee"]),
            record("b", "tree", 80, 0, &["Knee", "Hips"]),
            record("c", "tree", 80, 0, &["Gaze"]),
            record("d", "tree", 80, 0, &["Hips", "Hips"]),
        ];
        let ranked = correction_frequency_across_history(&history);

        assert_eq!(ranked[0].area, "Hips");
        assert_eq!(ranked[0].count, 3);
        assert_eq!(ranked[0].percent, 75);
        assert_eq!(ranked[1].area, "Knee");
        assert_eq!(ranked[1].percent, 50);
        assert_eq!(ranked[2].percent, 25);
        assert!(correction_frequency_across_history(&[]).is_empty());
    }
}
