use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_error};

/// Shortest period accepted for any periodic task.
pub const MIN_INTERVAL: Duration = Duration::from_millis(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionTimings {
    pub feedback_interval: Duration,
    pub score_interval: Duration,
    pub clock_interval: Duration,
    /// Emit a heartbeat every N clock ticks.
    pub heartbeat_every_ticks: u32,
}

impl SessionTimings {
    pub fn new(debug_mode: bool) -> Self {
        Self {
            feedback_interval: Duration::from_millis(3_600),
            score_interval: Duration::from_millis(2_800),
            clock_interval: Duration::from_secs(1),
            heartbeat_every_ticks: if debug_mode { 1 } else { 10 },
        }
    }

    /// Raise zero or tiny periods to [`MIN_INTERVAL`].
    pub fn sanitized(self) -> Self {
        Self {
            feedback_interval: self.feedback_interval.max(MIN_INTERVAL),
            score_interval: self.score_interval.max(MIN_INTERVAL),
            clock_interval: self.clock_interval.max(MIN_INTERVAL),
            heartbeat_every_ticks: self.heartbeat_every_ticks.max(1),
        }
    }
}

impl Default for SessionTimings {
    fn default() -> Self {
        Self::new(false)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FirstTick {
    Immediate,
    AfterPeriod,
}

/// A cancellable repeating task.
///
/// Once [`PeriodicTask::cancel`] returns, the callback will not run again:
/// a tick already in progress is awaited, and no new tick starts after the
/// token is cancelled.
pub struct PeriodicTask {
    name: &'static str,
    token: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl PeriodicTask {
    pub fn spawn<F, Fut>(
        name: &'static str,
        period: Duration,
        first_tick: FirstTick,
        parent: &CancellationToken,
        mut on_tick: F,
    ) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let period = period.max(MIN_INTERVAL);
        let token = parent.child_token();
        let loop_token = token.clone();

        let handle = tokio::spawn(async move {
            let start = match first_tick {
                FirstTick::Immediate => Instant::now(),
                FirstTick::AfterPeriod => Instant::now() + period,
            };
            let mut ticker = time::interval_at(start, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    biased;
                    _ = loop_token.cancelled() => break,
                    _ = ticker.tick() => on_tick().await,
                }
            }

            log_debug!("{} task stopped", name);
        });

        Self {
            name,
            token,
            handle: Some(handle),
        }
    }

    /// Idempotent. Waits for an in-flight tick to finish.
    pub async fn cancel(&mut self) {
        self.token.cancel();

        if let Some(handle) = self.handle.take() {
            if let Err(err) = handle.await {
                if !err.is_cancelled() {
                    log_error!("{} task ended abnormally: {}", self.name, err);
                }
            }
        }
    }
}

impl Drop for PeriodicTask {
    fn drop(&mut self) {
        self.token.cancel();
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}
