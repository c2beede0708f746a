use serde::Serialize;

use crate::db::models::SessionRecord;

use super::config::PatternConfig;
use super::stats::{average_accuracy, correction_frequency_across_history};

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum PatternKind {
    Recurring,
    Trend,
    Steady,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum TrendDirection {
    Improving,
    Declining,
    Steady,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Pattern {
    pub kind: PatternKind,
    /// Correction area for recurring patterns, a headline for trends.
    pub subject: String,
    pub description: String,
    pub frequency_percent: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub direction: Option<TrendDirection>,
}

impl Pattern {
    pub fn badge(&self) -> &'static str {
        match (self.kind, self.direction) {
            (PatternKind::Recurring, _) => "Recurring Issue",
            (_, Some(TrendDirection::Improving)) => "Positive Trend",
            (_, Some(TrendDirection::Declining)) => "Recurring Issue",
            _ => "Observation",
        }
    }
}

/// Mean scores of the recent half (first `n / 2` records of a newest-first
/// history) and the older half (the rest).
pub fn half_averages(history: &[SessionRecord]) -> (f64, f64) {
    let mid = history.len() / 2;
    (
        average_accuracy(&history[..mid]),
        average_accuracy(&history[mid..]),
    )
}

pub fn classify_trend(recent: f64, older: f64, tolerance: f64) -> TrendDirection {
    if recent - older > tolerance {
        TrendDirection::Improving
    } else if recent - older < -tolerance {
        TrendDirection::Declining
    } else {
        TrendDirection::Steady
    }
}

/// Recurring correction areas first, then one trend observation.
///
/// `history` must be newest first. Too-short histories yield nothing.
pub fn detect_patterns(history: &[SessionRecord], config: &PatternConfig) -> Vec<Pattern> {
    if history.len() < config.min_history.max(2) {
        return Vec::new();
    }

    let mut patterns: Vec<Pattern> = correction_frequency_across_history(history)
        .into_iter()
        .filter(|area| area.count > 0)
        .take(config.max_recurring)
        .map(|area| Pattern {
            kind: PatternKind::Recurring,
            description: format!(
                "You frequently receive corrections for {}, appearing in {}% of your sessions. Dedicating focused attention to this area will noticeably improve your overall accuracy.",
                area.area.to_lowercase(),
                area.percent
            ),
            subject: area.area,
            frequency_percent: area.percent,
            direction: None,
        })
        .collect();

    let (recent, older) = half_averages(history);
    let direction = classify_trend(recent, older, config.trend_tolerance);
    let recent_pct = recent.round().clamp(0.0, 100.0) as u8;
    let older_pct = older.round().clamp(0.0, 100.0) as u8;

    let (kind, subject, description) = match direction {
        TrendDirection::Improving => (
            PatternKind::Trend,
            "Improving Trend",
            format!(
                "Your accuracy has been climbing: recent sessions average {}% vs {}% earlier. Your consistency is paying off.",
                recent_pct, older_pct
            ),
        ),
        TrendDirection::Declining => (
            PatternKind::Trend,
            "Score Dipping",
            format!(
                "Recent sessions average {}% vs {}% earlier. This might be fatigue or attempting harder poses; shorter focused sessions may help.",
                recent_pct, older_pct
            ),
        ),
        TrendDirection::Steady => (
            PatternKind::Steady,
            "Steady Practice",
            format!(
                "Your scores are consistent across sessions, averaging {}%. You've built a stable baseline. Try pushing into harder poses to grow further.",
                recent_pct
            ),
        ),
    };

    patterns.push(Pattern {
        kind,
        subject: subject.to_string(),
        description,
        frequency_percent: recent_pct,
        direction: Some(direction),
    });

    patterns
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::stats::tests::record;

    #[test]
    fn fewer_than_two_records_yield_nothing() {
        let config = PatternConfig::default();
        assert!(detect_patterns(&[], &config).is_empty());
        assert!(detect_patterns(&[record("a", "tree", 90, 0, &["Hips"])], &config).is_empty());
    }

    #[test]
    fn rising_scores_are_improving() {
        let history = vec![
            record("new", "tree", 90, 2_000, &[]),
            record("old", "tree", 60, 1_000, &[]),
        ];
        let patterns = detect_patterns(&history, &PatternConfig::default());

        assert_eq!(patterns.len(), 1);
        let trend = &patterns[0];
        assert_eq!(trend.kind, PatternKind::Trend);
        assert_eq!(trend.direction, Some(TrendDirection::Improving));
        assert_eq!(trend.subject, "Improving Trend");
        assert_eq!(trend.frequency_percent, 90);
        assert_eq!(trend.badge(), "Positive Trend");
    }

    #[test]
    fn tolerance_band_is_exclusive() {
        assert_eq!(classify_trend(73.0, 70.0, 3.0), TrendDirection::Steady);
        assert_eq!(classify_trend(67.0, 70.0, 3.0), TrendDirection::Steady);
        assert_eq!(classify_trend(73.5, 70.0, 3.0), TrendDirection::Improving);
        assert_eq!(classify_trend(66.5, 70.0, 3.0), TrendDirection::Declining);
    }

    #[test]
    fn odd_histories_put_the_extra_record_in_the_older_half() {
        let history = vec![
            record("a", "tree", 60, 3_000, &[]),
            record("b", "tree", 90, 2_000, &[]),
            record("c", "tree", 90, 1_000, &[]),
        ];
        assert_eq!(half_averages(&history), (60.0, 90.0));

        let patterns = detect_patterns(&history, &PatternConfig::default());
        assert_eq!(patterns[0].subject, "Score Dipping");
        assert_eq!(patterns[0].frequency_percent, 60);
    }

    #[test]
    fn recurring_areas_come_first_and_are_capped() {
        let history = vec![
            record("a", "tree", 70, 4_000, &["Hips", "Knee"]),
            record("b", "tree", 71, 3_000, &["Hips", "Gaze"]),
            record("c", "tree", 70, 2_000, &["Hips", "Knee"]),
            record("d", "tree", 72, 1_000, &["Gaze"]),
        ];
        let patterns = detect_patterns(&history, &PatternConfig::default());

        assert_eq!(patterns.len(), 3);
        assert_eq!(patterns[0].kind, PatternKind::Recurring);
        assert_eq!(patterns[0].subject, "Hips");
        assert_eq!(patterns[0].frequency_percent, 75);
        assert!(patterns[0].description.contains("hips, appearing in 75%"));
        assert_eq!(patterns[1].subject, "Knee");
        assert_eq!(patterns[2].kind, PatternKind::Steady);
        assert_eq!(patterns[2].badge(), "Observation");
    }

    #[test]
    fn detection_is_deterministic() {
        let history = vec![
            record("a", "tree", 55, 2_000, &["Core"]),
            record("b", "crow", 85, 1_000, &["Wrists", "Core"]),
        ];
        let config = PatternConfig::default();
        assert_eq!(detect_patterns(&history, &config), detect_patterns(&history, &config));
    }
}
