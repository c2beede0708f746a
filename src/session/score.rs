use serde::{Deserialize, Serialize};

use super::random::RandomSource;
use super::state::LiveSessionState;

pub const INITIAL_SCORE: f64 = 72.0;
pub const SCORE_FLOOR: f64 = 36.0;
pub const SCORE_CEILING: f64 = 97.0;

/// Uniform draws are shifted down by this before scaling, so the mean step
/// is `-0.05 * DRIFT_SPREAD` and without intervention the score sags slowly.
const DRIFT_BIAS: f64 = 0.55;
const DRIFT_SPREAD: f64 = 14.0;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum ScoreTier {
    Good,
    Fair,
    Adjust,
}

impl ScoreTier {
    /// `>= 80` good, `60..=79` fair, below that adjust.
    pub fn from_score(score: u8) -> Self {
        match score {
            80..=u8::MAX => ScoreTier::Good,
            60..=79 => ScoreTier::Fair,
            _ => ScoreTier::Adjust,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ScoreTier::Good => "Good",
            ScoreTier::Fair => "Fair",
            ScoreTier::Adjust => "Adjust",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ScoreReading {
    pub score: u8,
    pub tier: ScoreTier,
}

/// Step applied to the running score for one uniform draw.
pub fn drift(sample: f64) -> f64 {
    (sample - DRIFT_BIAS) * DRIFT_SPREAD
}

/// Periodic perturbation of the simulated score.
pub struct ScoreScheduler;

impl ScoreScheduler {
    pub fn tick(state: &mut LiveSessionState, rng: &mut dyn RandomSource) -> ScoreReading {
        let next = state.current_score + drift(rng.next_f64());
        state.current_score = next.clamp(SCORE_FLOOR, SCORE_CEILING);

        let score = state.current_score.round() as u8;
        state.score_history.push(score);

        ScoreReading {
            score,
            tier: ScoreTier::from_score(score),
        }
    }
}
