use std::fmt;

use serde::{Deserialize, Serialize};

use crate::catalog::Correction;

use super::score::INITIAL_SCORE;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum SessionStatus {
    Idle,
    AwaitingResource,
    Live,
    /// Terminal. The next session needs a fresh controller.
    Ended,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Idle => "idle",
            SessionStatus::AwaitingResource => "awaiting resource",
            SessionStatus::Live => "live",
            SessionStatus::Ended => "ended",
        }
    }
}

impl Default for SessionStatus {
    fn default() -> Self {
        SessionStatus::Idle
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum EndReason {
    Stopped,
    ResourceLost,
}

/// Per-area correction counts that remember first-seen order, so ties
/// rank by whichever area was corrected first.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CorrectionTally {
    entries: Vec<(String, u32)>,
}

impl CorrectionTally {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment(&mut self, area: &str) {
        match self.entries.iter_mut().find(|(name, _)| name == area) {
            Some((_, count)) => *count += 1,
            None => self.entries.push((area.to_string(), 1)),
        }
    }

    pub fn count(&self, area: &str) -> u32 {
        self.entries
            .iter()
            .find(|(name, _)| name == area)
            .map(|(_, count)| *count)
            .unwrap_or(0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.entries.iter().map(|(name, count)| (name.as_str(), *count))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Up to `limit` areas by descending count; ties keep insertion order.
    pub fn top(&self, limit: usize) -> Vec<(String, u32)> {
        let mut ranked = self.entries.clone();
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked.truncate(limit);
        ranked
    }
}

/// Transient state of a live session. Only the controller's scheduler
/// callbacks mutate it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LiveSessionState {
    pub pose_id: String,
    pub elapsed_seconds: u64,
    /// Always within the simulated floor and ceiling while live.
    pub current_score: f64,
    pub score_history: Vec<u8>,
    pub correction_frequency: CorrectionTally,
}

impl LiveSessionState {
    pub fn new(pose_id: &str) -> Self {
        Self {
            pose_id: pose_id.to_string(),
            elapsed_seconds: 0,
            current_score: INITIAL_SCORE,
            score_history: Vec::new(),
            correction_frequency: CorrectionTally::new(),
        }
    }

    /// Count the displayed corrections. `Correct` feedback is praise, not a
    /// correction, and is never counted.
    pub fn record_corrections(&mut self, shown: &[Correction]) {
        for correction in shown.iter().filter(|c| c.is_error()) {
            self.correction_frequency.increment(&correction.area);
        }
    }
}
