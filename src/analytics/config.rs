/// Tunable thresholds for history pattern detection.
#[derive(Debug, Clone)]
pub struct PatternConfig {
    /// Histories shorter than this produce no patterns.
    pub min_history: usize,

    /// Recent-half mean must beat the older-half mean by more than this
    /// (in score points) to count as a trend.
    pub trend_tolerance: f64,

    /// Upper bound on recurring-area patterns.
    pub max_recurring: usize,
}

impl Default for PatternConfig {
    fn default() -> Self {
        Self {
            min_history: 2,
            trend_tolerance: 3.0,
            max_recurring: 2,
        }
    }
}
