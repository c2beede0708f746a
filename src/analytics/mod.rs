//! Pure statistics and rule-based pattern detection over session history.
//!
//! Nothing here touches storage, and only [`streak`] reads the clock, so
//! the same history always yields the same result.

pub mod config;
pub mod overview;
pub mod patterns;
pub mod stats;

pub use config::PatternConfig;
pub use overview::{FormRating, ProfileOverview, SessionCard};
pub use patterns::{classify_trend, detect_patterns, Pattern, PatternKind, TrendDirection};
pub use stats::{
    average_accuracy, correction_frequency_across_history, most_practiced_subject, streak,
    streak_at, AreaFrequency,
};
