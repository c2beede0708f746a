use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::{broadcast, Mutex};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::{
    camera::{CameraHandle, CameraProvider, CaptureConstraints},
    catalog::{PoseCatalog, PoseDefinition},
    db::models::SessionRecord,
    store::SessionStore,
};

const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_error, log_info, log_warn};

use super::{
    errors::SessionError,
    events::{CompletedSession, SessionEvent},
    feedback::FeedbackScheduler,
    random::{RandomSource, StdRandom},
    scheduler::{FirstTick, PeriodicTask, SessionTimings},
    score::ScoreScheduler,
    state::{EndReason, LiveSessionState, SessionStatus},
    summary::{format_duration, highlight, SummaryBuilder},
};

const EVENT_CHANNEL_CAPACITY: usize = 256;

#[derive(Default)]
struct Lifecycle {
    status: SessionStatus,
    session_id: Option<String>,
    started_at: Option<DateTime<Utc>>,
    display_name: Option<String>,
    camera: Option<CameraHandle>,
    token: Option<CancellationToken>,
    tasks: Vec<PeriodicTask>,
    completed: Option<CompletedSession>,
}

/// Only the periodic tasks touch this while live.
struct LiveSession {
    state: Option<LiveSessionState>,
    rng: Box<dyn RandomSource>,
}

/// Owns one practice session from camera acquisition to the stored record.
///
/// A controller runs a single session: once `Ended`, build a new one.
/// Clones share the same session.
#[derive(Clone)]
pub struct SessionController {
    lifecycle: Arc<Mutex<Lifecycle>>,
    live: Arc<Mutex<LiveSession>>,
    catalog: Arc<PoseCatalog>,
    camera: Arc<dyn CameraProvider>,
    store: Arc<dyn SessionStore>,
    events: broadcast::Sender<SessionEvent>,
    timings: SessionTimings,
    constraints: CaptureConstraints,
}

impl SessionController {
    pub fn new(
        catalog: Arc<PoseCatalog>,
        camera: Arc<dyn CameraProvider>,
        store: Arc<dyn SessionStore>,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            lifecycle: Arc::new(Mutex::new(Lifecycle::default())),
            live: Arc::new(Mutex::new(LiveSession {
                state: None,
                rng: Box::new(StdRandom::from_entropy()),
            })),
            catalog,
            camera,
            store,
            events,
            timings: SessionTimings::default(),
            constraints: CaptureConstraints::default(),
        }
    }

    /// Replace the random source. Only meaningful before `start`.
    pub fn with_random(self, rng: Box<dyn RandomSource>) -> Self {
        Self {
            live: Arc::new(Mutex::new(LiveSession { state: None, rng })),
            ..self
        }
    }

    pub fn with_timings(self, timings: SessionTimings) -> Self {
        Self {
            timings: timings.sanitized(),
            ..self
        }
    }

    pub fn with_constraints(self, constraints: CaptureConstraints) -> Self {
        Self {
            constraints,
            ..self
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    pub async fn status(&self) -> SessionStatus {
        self.lifecycle.lock().await.status
    }

    /// Copy of the live state, `None` unless a session is running.
    pub async fn snapshot(&self) -> Option<LiveSessionState> {
        self.live.lock().await.state.clone()
    }

    /// Summary of the finished session, once `Ended`.
    pub async fn completed(&self) -> Option<CompletedSession> {
        self.lifecycle.lock().await.completed.clone()
    }

    /// Acquire the camera and go live. Returns the new session id.
    pub async fn start(&self, pose_id: &str) -> Result<String, SessionError> {
        let mut lifecycle = self.lifecycle.lock().await;
        if lifecycle.status != SessionStatus::Idle {
            return Err(SessionError::invalid_transition(lifecycle.status, "start"));
        }

        let pose = self
            .catalog
            .get(pose_id)
            .ok_or_else(|| SessionError::InvalidPose(pose_id.to_string()))?;

        let display_name = match self.store.get_profile().await {
            Ok(profile) => profile.map(|profile| profile.username),
            Err(err) => {
                log_warn!("Failed to load profile, addressing user anonymously: {}", err);
                None
            }
        };

        self.set_status(&mut lifecycle, SessionStatus::AwaitingResource);

        let handle = match self.camera.acquire(&self.constraints) {
            Ok(handle) => handle,
            Err(err) => {
                log_warn!("Camera acquisition failed for pose {}: {}", pose_id, err);
                self.set_status(&mut lifecycle, SessionStatus::Idle);
                return Err(SessionError::ResourcePermission(err));
            }
        };

        let session_id = Uuid::new_v4().to_string();
        let token = CancellationToken::new();
        let lost = handle.lost_signal();

        self.live.lock().await.state = Some(LiveSessionState::new(&pose.id));

        lifecycle.session_id = Some(session_id.clone());
        lifecycle.started_at = Some(Utc::now());
        lifecycle.display_name = display_name;
        lifecycle.camera = Some(handle);
        lifecycle.token = Some(token.clone());
        self.set_status(&mut lifecycle, SessionStatus::Live);

        lifecycle.tasks = vec![
            self.spawn_feedback(pose.clone(), &token),
            self.spawn_score(&token),
            self.spawn_clock(&token),
        ];
        self.spawn_loss_watcher(lost, token);

        log_info!("Session {} started for pose {}", session_id, pose.id);
        Ok(session_id)
    }

    /// End the live session and return its stored record.
    pub async fn stop(&self) -> Result<SessionRecord, SessionError> {
        let mut lifecycle = self.lifecycle.lock().await;
        if lifecycle.status != SessionStatus::Live {
            return Err(SessionError::invalid_transition(lifecycle.status, "stop"));
        }
        Ok(self.finish(&mut lifecycle, EndReason::Stopped).await)
    }

    /// Teardown after the camera disappeared. `None` when the session was
    /// no longer live.
    pub async fn end_after_resource_loss(&self) -> Option<SessionRecord> {
        let mut lifecycle = self.lifecycle.lock().await;
        if lifecycle.status != SessionStatus::Live {
            return None;
        }
        log_warn!(
            "Camera lost during session {}",
            lifecycle.session_id.as_deref().unwrap_or("?")
        );
        Some(self.finish(&mut lifecycle, EndReason::ResourceLost).await)
    }

    async fn finish(&self, lifecycle: &mut Lifecycle, reason: EndReason) -> SessionRecord {
        if let Some(token) = lifecycle.token.take() {
            token.cancel();
        }
        for task in lifecycle.tasks.iter_mut() {
            task.cancel().await;
        }
        lifecycle.tasks.clear();

        if let Some(handle) = lifecycle.camera.take() {
            if let Err(err) = self.camera.release(&handle) {
                log_error!("Failed to release camera {}: {}", handle.id(), err);
            }
        }

        let session_id = lifecycle
            .session_id
            .clone()
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        let started_at = lifecycle.started_at.unwrap_or_else(Utc::now);

        let (record, highlight_line) = {
            let mut live = self.live.lock().await;
            let LiveSession { state, rng } = &mut *live;
            let state = match state.take() {
                Some(state) => state,
                None => LiveSessionState::new(""),
            };
            let builder = SummaryBuilder::new(lifecycle.display_name.as_deref());
            let record = builder.build(&session_id, &state, started_at, rng.as_mut());
            (record, highlight(&state.correction_frequency))
        };

        self.set_status(lifecycle, SessionStatus::Ended);

        if let Err(err) = self.store.append_session(&record).await {
            log_error!("Failed to persist session {}: {}", record.id, err);
        }

        let completed = CompletedSession {
            duration_label: format_duration(record.duration_seconds),
            highlight: highlight_line,
            end_reason: reason,
            record: record.clone(),
        };
        lifecycle.completed = Some(completed.clone());
        let _ = self.events.send(SessionEvent::Completed(completed));

        log_info!(
            "Session {} ended ({:?}): score {} stability {} after {}s",
            record.id,
            reason,
            record.score,
            record.stability,
            record.duration_seconds
        );
        record
    }

    fn set_status(&self, lifecycle: &mut Lifecycle, status: SessionStatus) {
        lifecycle.status = status;
        let _ = self.events.send(SessionEvent::StateChanged { status });
    }

    fn spawn_feedback(&self, pose: Arc<PoseDefinition>, token: &CancellationToken) -> PeriodicTask {
        let live = self.live.clone();
        let events = self.events.clone();

        PeriodicTask::spawn(
            "feedback",
            self.timings.feedback_interval,
            FirstTick::Immediate,
            token,
            move || {
                let live = live.clone();
                let events = events.clone();
                let pose = pose.clone();
                async move {
                    let mut guard = live.lock().await;
                    let LiveSession { state, rng } = &mut *guard;
                    let Some(state) = state.as_mut() else {
                        return;
                    };
                    let shown = FeedbackScheduler::tick(&pose.corrections, state, rng.as_mut());
                    if !shown.is_empty() {
                        let _ = events.send(SessionEvent::Feedback {
                            pose_id: pose.id.clone(),
                            areas: shown,
                        });
                    }
                }
            },
        )
    }

    fn spawn_score(&self, token: &CancellationToken) -> PeriodicTask {
        let live = self.live.clone();
        let events = self.events.clone();

        PeriodicTask::spawn(
            "score",
            self.timings.score_interval,
            FirstTick::Immediate,
            token,
            move || {
                let live = live.clone();
                let events = events.clone();
                async move {
                    let mut guard = live.lock().await;
                    let LiveSession { state, rng } = &mut *guard;
                    let Some(state) = state.as_mut() else {
                        return;
                    };
                    let reading = ScoreScheduler::tick(state, rng.as_mut());
                    let _ = events.send(SessionEvent::Score {
                        score: reading.score,
                        tier: reading.tier,
                    });
                }
            },
        )
    }

    fn spawn_clock(&self, token: &CancellationToken) -> PeriodicTask {
        let live = self.live.clone();
        let events = self.events.clone();
        let heartbeat_every = self.timings.heartbeat_every_ticks.max(1);
        let mut ticks: u32 = 0;

        PeriodicTask::spawn(
            "clock",
            self.timings.clock_interval,
            FirstTick::AfterPeriod,
            token,
            move || {
                ticks = ticks.wrapping_add(1);
                let emit_heartbeat = ticks % heartbeat_every == 0;
                let live = live.clone();
                let events = events.clone();
                async move {
                    let elapsed = {
                        let mut guard = live.lock().await;
                        let Some(state) = guard.state.as_mut() else {
                            return;
                        };
                        state.elapsed_seconds += 1;
                        state.elapsed_seconds
                    };
                    if emit_heartbeat {
                        let _ = events.send(SessionEvent::Heartbeat {
                            elapsed_seconds: elapsed,
                        });
                    }
                }
            },
        )
    }

    /// Not joined on stop; the session token ends it.
    fn spawn_loss_watcher(&self, lost: CancellationToken, session: CancellationToken) {
        let controller = self.clone();
        tokio::spawn(async move {
            tokio::select! {
                biased;
                _ = session.cancelled() => {}
                _ = lost.cancelled() => {
                    controller.end_after_resource_loss().await;
                }
            }
            log_debug!("camera loss watcher stopped");
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::time::Duration;

    use anyhow::bail;
    use async_trait::async_trait;
    use tokio::sync::broadcast::error::TryRecvError;
    use tokio::time;

    use crate::camera::{CameraError, SimulatedCamera, SimulatedCameraMode};
    use crate::catalog::{Correction, Severity};
    use crate::db::models::ProfileRecord;
    use crate::session::random::SequenceRandom;
    use crate::store::MemoryStore;

    /// Hands out handles but can never give them back.
    #[derive(Default)]
    struct StuckCamera {
        release_attempts: AtomicU64,
    }

    impl CameraProvider for StuckCamera {
        fn acquire(&self, _constraints: &CaptureConstraints) -> Result<CameraHandle, CameraError> {
            Ok(CameraHandle::new(1))
        }

        fn release(&self, _handle: &CameraHandle) -> Result<(), CameraError> {
            self.release_attempts.fetch_add(1, Ordering::SeqCst);
            Err(CameraError::DeviceUnavailable)
        }
    }

    /// Reads succeed, every session write fails.
    struct ReadOnlyStore;

    #[async_trait]
    impl SessionStore for ReadOnlyStore {
        async fn append_session(&self, record: &SessionRecord) -> anyhow::Result<()> {
            bail!("disk full while writing session {}", record.id)
        }

        async fn list_sessions(&self) -> anyhow::Result<Vec<SessionRecord>> {
            Ok(Vec::new())
        }

        async fn get_profile(&self) -> anyhow::Result<Option<ProfileRecord>> {
            Ok(None)
        }

        async fn set_profile(&self, _profile: &ProfileRecord) -> anyhow::Result<()> {
            Ok(())
        }
    }

    struct Harness {
        controller: SessionController,
        camera: Arc<SimulatedCamera>,
        store: Arc<MemoryStore>,
    }

    fn harness_with(catalog: PoseCatalog, draw: f64) -> Harness {
        let camera = Arc::new(SimulatedCamera::available());
        let store = Arc::new(MemoryStore::new());
        let controller = SessionController::new(Arc::new(catalog), camera.clone(), store.clone())
            .with_random(Box::new(SequenceRandom::constant(draw)));
        Harness {
            controller,
            camera,
            store,
        }
    }

    fn harness(draw: f64) -> Harness {
        harness_with(PoseCatalog::builtin(), draw)
    }

    fn drain(rx: &mut broadcast::Receiver<SessionEvent>) -> Vec<SessionEvent> {
        let mut events = Vec::new();
        loop {
            match rx.try_recv() {
                Ok(event) => events.push(event),
                Err(TryRecvError::Lagged(_)) => continue,
                Err(_) => break,
            }
        }
        events
    }

    #[tokio::test(start_paused = true)]
    async fn unknown_pose_leaves_controller_idle() {
        let h = harness(0.5);
        let err = h.controller.start("handstand").await.unwrap_err();

        assert!(matches!(err, SessionError::InvalidPose(ref id) if id == "handstand"));
        assert_eq!(h.controller.status().await, SessionStatus::Idle);
        assert_eq!(h.camera.acquisitions(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn denied_camera_stays_idle_and_allows_retry() {
        let h = harness(0.5);
        h.camera.set_mode(SimulatedCameraMode::Denied);

        let err = h.controller.start("tree").await.unwrap_err();
        assert!(matches!(
            err,
            SessionError::ResourcePermission(CameraError::PermissionDenied)
        ));
        assert_eq!(h.controller.status().await, SessionStatus::Idle);
        assert!(h.controller.snapshot().await.is_none());

        h.camera.set_mode(SimulatedCameraMode::Available);
        h.controller.start("tree").await.unwrap();
        assert_eq!(h.controller.status().await, SessionStatus::Live);
        h.controller.stop().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn record_score_is_mean_of_recorded_ticks() {
        let h = harness(0.95);
        let session_id = h.controller.start("warrior2").await.unwrap();

        // Score ticks at 0s, 2.8s and 5.6s.
        time::sleep(Duration::from_millis(5_900)).await;
        let snapshot = h.controller.snapshot().await.unwrap();
        assert_eq!(snapshot.score_history, vec![78, 83, 89]);
        assert_eq!(snapshot.elapsed_seconds, 5);

        let record = h.controller.stop().await.unwrap();
        assert_eq!(record.id, session_id);
        assert_eq!(record.pose_id, "warrior2");
        assert_eq!(record.score, 83);
        assert!((88..=89).contains(&record.stability));
        assert_eq!(record.duration_seconds, 5);
        assert!(record.top_correction_areas.len() <= 2);
        assert!(record.feedback_summary.starts_with("Wonderful work, you!"));

        assert_eq!(h.controller.status().await, SessionStatus::Ended);
        assert!(h.controller.snapshot().await.is_none());
        assert_eq!(h.store.session_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn second_stop_is_an_invalid_transition() {
        let h = harness(0.5);
        h.controller.start("mountain").await.unwrap();
        time::sleep(Duration::from_secs(3)).await;

        h.controller.stop().await.unwrap();
        let err = h.controller.stop().await.unwrap_err();

        assert!(matches!(
            err,
            SessionError::InvalidTransition {
                from: SessionStatus::Ended,
                action: "stop"
            }
        ));
        assert_eq!(h.camera.releases(), 1);
        assert_eq!(h.store.session_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn transitions_outside_the_lifecycle_are_rejected() {
        let h = harness(0.5);
        assert!(matches!(
            h.controller.stop().await.unwrap_err(),
            SessionError::InvalidTransition {
                from: SessionStatus::Idle,
                ..
            }
        ));

        h.controller.start("crow").await.unwrap();
        assert!(matches!(
            h.controller.start("tree").await.unwrap_err(),
            SessionError::InvalidTransition {
                from: SessionStatus::Live,
                action: "start"
            }
        ));
        assert_eq!(h.camera.acquisitions(), 1);

        h.controller.stop().await.unwrap();
        assert!(matches!(
            h.controller.start("crow").await.unwrap_err(),
            SessionError::InvalidTransition {
                from: SessionStatus::Ended,
                ..
            }
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn nothing_is_emitted_after_completion() {
        let h = harness(0.3);
        let mut rx = h.controller.subscribe();

        h.controller.start("eagle").await.unwrap();
        time::sleep(Duration::from_secs(8)).await;
        h.controller.stop().await.unwrap();

        let events = drain(&mut rx);
        assert!(matches!(
            events.first(),
            Some(SessionEvent::StateChanged {
                status: SessionStatus::AwaitingResource
            })
        ));
        assert!(events
            .iter()
            .any(|event| matches!(event, SessionEvent::Feedback { .. })));
        assert!(events
            .iter()
            .any(|event| matches!(event, SessionEvent::Score { .. })));
        assert!(matches!(events.last(), Some(SessionEvent::Completed(_))));

        time::sleep(Duration::from_secs(30)).await;
        assert!(drain(&mut rx).is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn immediate_stop_falls_back_to_initial_score() {
        let h = harness(0.5);
        h.controller.start("child").await.unwrap();
        let record = h.controller.stop().await.unwrap();

        assert_eq!(record.score, 72);
        assert_eq!(record.duration_seconds, 0);
        let completed = h.controller.completed().await.unwrap();
        assert_eq!(completed.duration_label, "0s");
        assert_eq!(completed.end_reason, EndReason::Stopped);
    }

    #[tokio::test(start_paused = true)]
    async fn camera_loss_runs_the_same_teardown() {
        let h = harness(0.5);
        h.store
            .set_profile(&ProfileRecord::new("Mira"))
            .await
            .unwrap();
        h.controller.start("dancer").await.unwrap();
        time::sleep(Duration::from_secs(2)).await;

        assert!(h.camera.revoke());
        time::sleep(Duration::from_millis(50)).await;

        assert_eq!(h.controller.status().await, SessionStatus::Ended);
        assert_eq!(h.camera.releases(), 1);
        assert_eq!(h.store.session_count(), 1);

        let completed = h.controller.completed().await.unwrap();
        assert_eq!(completed.end_reason, EndReason::ResourceLost);
        assert!(completed.record.feedback_summary.contains("Mira"));
        assert!(h.controller.end_after_resource_loss().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn failed_release_and_failed_persist_still_end_the_session() {
        let camera = Arc::new(StuckCamera::default());
        let controller = SessionController::new(
            Arc::new(PoseCatalog::builtin()),
            camera.clone(),
            Arc::new(ReadOnlyStore),
        )
        .with_random(Box::new(SequenceRandom::constant(0.5)));
        let mut rx = controller.subscribe();

        let session_id = controller.start("tree").await.unwrap();
        time::sleep(Duration::from_millis(3_500)).await;

        let record = controller.stop().await.unwrap();
        assert_eq!(record.id, session_id);
        assert_eq!(record.duration_seconds, 3);
        assert_eq!(camera.release_attempts.load(Ordering::SeqCst), 1);
        assert_eq!(controller.status().await, SessionStatus::Ended);
        assert!(controller.snapshot().await.is_none());

        let completed = controller.completed().await.unwrap();
        assert_eq!(completed.record, record);
        assert!(matches!(
            drain(&mut rx).last(),
            Some(SessionEvent::Completed(_))
        ));

        assert!(matches!(
            controller.stop().await.unwrap_err(),
            SessionError::InvalidTransition {
                from: SessionStatus::Ended,
                action: "stop"
            }
        ));
        assert_eq!(camera.release_attempts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn praise_only_pool_never_records_areas() {
        let catalog = PoseCatalog::from_definitions(vec![PoseDefinition {
            id: "easy".into(),
            display_name: "Easy Pose".into(),
            alternate_name: "Sukhasana".into(),
            briefing: "Sit comfortably.".into(),
            corrections: vec![
                Correction::new("Spine", "Nice and tall", Severity::Correct),
                Correction::new("Shoulders", "Relaxed", Severity::Correct),
            ],
        }]);
        let h = harness_with(catalog, 0.7);

        h.controller.start("easy").await.unwrap();
        time::sleep(Duration::from_secs(20)).await;
        let record = h.controller.stop().await.unwrap();

        assert!(record.top_correction_areas.is_empty());
        let completed = h.controller.completed().await.unwrap();
        assert!(completed.highlight.starts_with("Your form was consistent"));
    }
}
