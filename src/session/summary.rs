use chrono::{DateTime, Utc};

use crate::db::models::{SessionRecord, MAX_TOP_CORRECTION_AREAS};

use super::random::RandomSource;
use super::score::ScoreTier;
use super::state::{CorrectionTally, LiveSessionState};

const STABILITY_FLOOR: i64 = 40;
const STABILITY_CEILING: i64 = 99;
const STABILITY_JITTER_BIAS: f64 = 0.4;
const STABILITY_JITTER_SPREAD: f64 = 10.0;

/// Rounds halves toward positive infinity (`-2.5` becomes `-2`).
pub fn round_half_up(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}

/// `"Xm Ys"` once a minute has passed, otherwise `"Ys"`.
pub fn format_duration(seconds: u64) -> String {
    let minutes = seconds / 60;
    let rest = seconds % 60;
    if minutes > 0 {
        format!("{}m {}s", minutes, rest)
    } else {
        format!("{}s", rest)
    }
}

/// One-line note about the most corrected area.
pub fn highlight(tally: &CorrectionTally) -> String {
    match tally.top(1).into_iter().next() {
        Some((area, count)) if count > 0 => format!(
            "Most worked area: {}, corrected {} time{} during the session.",
            area,
            count,
            if count > 1 { "s" } else { "" }
        ),
        _ => "Your form was consistent throughout the session. Keep building on this.".to_string(),
    }
}

/// Mean of the score history, or the running score when no score tick
/// happened before the session ended.
pub fn accuracy(state: &LiveSessionState) -> u8 {
    if state.score_history.is_empty() {
        return round_half_up(state.current_score).clamp(0, 100) as u8;
    }
    let total: u64 = state.score_history.iter().map(|&s| s as u64).sum();
    let mean = total as f64 / state.score_history.len() as f64;
    round_half_up(mean).clamp(0, 100) as u8
}

/// Accuracy nudged by a slightly upward-biased jitter, kept within 40..=99.
pub fn stability(accuracy: u8, rng: &mut dyn RandomSource) -> u8 {
    let jitter = round_half_up((rng.next_f64() - STABILITY_JITTER_BIAS) * STABILITY_JITTER_SPREAD);
    (accuracy as i64 + jitter).clamp(STABILITY_FLOOR, STABILITY_CEILING) as u8
}

/// Turns the final live state into the immutable record that gets stored.
pub struct SummaryBuilder {
    addressee: String,
}

impl SummaryBuilder {
    /// `display_name` is the profile username; sessions without a profile
    /// address the user as "you".
    pub fn new(display_name: Option<&str>) -> Self {
        let addressee = display_name
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or("you")
            .to_string();
        Self { addressee }
    }

    pub fn congratulations(&self, accuracy: u8) -> String {
        let name = &self.addressee;
        match ScoreTier::from_score(accuracy) {
            ScoreTier::Good => format!(
                "Wonderful work, {}! Your form was consistent and your body alignment stayed on point throughout the session.",
                name
            ),
            ScoreTier::Fair => format!(
                "Good effort, {}! You kept at it and made real progress. A little more attention to the highlighted areas will have you nailing this pose.",
                name
            ),
            ScoreTier::Adjust => format!(
                "Keep going, {}. Every session builds the muscle memory. Focus on the areas flagged below in your next practice.",
                name
            ),
        }
    }

    pub fn build(
        &self,
        session_id: &str,
        state: &LiveSessionState,
        started_at: DateTime<Utc>,
        rng: &mut dyn RandomSource,
    ) -> SessionRecord {
        let score = accuracy(state);
        let stability = stability(score, rng);
        let top_correction_areas = state
            .correction_frequency
            .top(MAX_TOP_CORRECTION_AREAS)
            .into_iter()
            .map(|(area, _)| area)
            .collect();

        SessionRecord {
            id: session_id.to_string(),
            pose_id: state.pose_id.clone(),
            score,
            stability,
            duration_seconds: state.elapsed_seconds,
            started_at_epoch_ms: started_at.timestamp_millis(),
            top_correction_areas,
            feedback_summary: self.congratulations(score),
        }
    }
}
