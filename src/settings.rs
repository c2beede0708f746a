use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::PathBuf,
    sync::{RwLock, RwLockReadGuard, RwLockWriteGuard},
    time::Duration,
};

use crate::camera::CaptureConstraints;
use crate::session::SessionTimings;

pub const SETTINGS_FILE_NAME: &str = "settings.json";

/// Scheduler periods as stored on disk, in milliseconds.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct TimingSettings {
    pub feedback_interval_ms: u64,
    pub score_interval_ms: u64,
    pub clock_interval_ms: u64,
    pub heartbeat_every_ticks: u32,
}

impl TimingSettings {
    pub fn to_timings(&self) -> SessionTimings {
        SessionTimings {
            feedback_interval: Duration::from_millis(self.feedback_interval_ms),
            score_interval: Duration::from_millis(self.score_interval_ms),
            clock_interval: Duration::from_millis(self.clock_interval_ms),
            heartbeat_every_ticks: self.heartbeat_every_ticks,
        }
        .sanitized()
    }
}

impl From<SessionTimings> for TimingSettings {
    fn from(timings: SessionTimings) -> Self {
        Self {
            feedback_interval_ms: timings.feedback_interval.as_millis() as u64,
            score_interval_ms: timings.score_interval.as_millis() as u64,
            clock_interval_ms: timings.clock_interval.as_millis() as u64,
            heartbeat_every_ticks: timings.heartbeat_every_ticks,
        }
    }
}

impl Default for TimingSettings {
    fn default() -> Self {
        SessionTimings::default().into()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct PracticeSettings {
    pub timings: TimingSettings,
    pub camera: CaptureConstraints,
}

/// JSON-backed practice settings. A missing or unreadable file yields the
/// defaults.
pub struct SettingsStore {
    path: PathBuf,
    data: RwLock<PracticeSettings>,
}

impl SettingsStore {
    pub fn new(path: PathBuf) -> Result<Self> {
        let data = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read settings from {}", path.display()))?;
            serde_json::from_str(&contents).unwrap_or_default()
        } else {
            PracticeSettings::default()
        };

        Ok(Self {
            path,
            data: RwLock::new(data),
        })
    }

    pub fn practice(&self) -> PracticeSettings {
        self.read().clone()
    }

    pub fn update_practice(&self, settings: PracticeSettings) -> Result<()> {
        let mut guard = self.write();
        *guard = settings;
        self.persist(&guard)
    }

    fn persist(&self, data: &PracticeSettings) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let serialized = serde_json::to_string_pretty(data)?;
        fs::write(&self.path, serialized)
            .with_context(|| format!("Failed to write settings to {}", self.path.display()))
    }

    fn read(&self) -> RwLockReadGuard<'_, PracticeSettings> {
        match self.data.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn write(&self) -> RwLockWriteGuard<'_, PracticeSettings> {
        match self.data.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}
