use crate::catalog::Correction;

use super::random::RandomSource;
use super::state::LiveSessionState;

/// Corrections shown per feedback tick.
pub const FEEDBACK_SAMPLE_SIZE: usize = 3;

/// Draw up to `count` distinct items, uniformly, without replacement
/// (partial Fisher-Yates over the pool's indices).
pub fn sample_without_replacement<T: Clone>(
    pool: &[T],
    count: usize,
    rng: &mut dyn RandomSource,
) -> Vec<T> {
    let take = count.min(pool.len());
    let mut indices: Vec<usize> = (0..pool.len()).collect();

    for i in 0..take {
        let remaining = pool.len() - i;
        let offset = ((rng.next_f64() * remaining as f64) as usize).min(remaining - 1);
        indices.swap(i, i + offset);
    }

    indices[..take].iter().map(|&index| pool[index].clone()).collect()
}

/// Periodic sampler of the active pose's correction pool.
pub struct FeedbackScheduler;

impl FeedbackScheduler {
    /// One tick: pick the corrections to display and count the errors among
    /// them. An empty pool yields nothing and counts nothing.
    pub fn tick(
        pool: &[Correction],
        state: &mut LiveSessionState,
        rng: &mut dyn RandomSource,
    ) -> Vec<Correction> {
        let shown = sample_without_replacement(pool, FEEDBACK_SAMPLE_SIZE, rng);
        state.record_corrections(&shown);
        shown
    }
}
