//! Camera resource boundary.
//!
//! A session holds at most one [`CameraHandle`]. Providers must make
//! `release` a no-op for handles that are already released.

mod simulated;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio_util::sync::CancellationToken;

pub use simulated::{SimulatedCamera, SimulatedCameraMode};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CameraError {
    #[error("camera permission denied")]
    PermissionDenied,
    #[error("camera device unavailable")]
    DeviceUnavailable,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum FacingMode {
    User,
    Environment,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CaptureConstraints {
    pub facing_mode: FacingMode,
    pub ideal_width: u32,
    pub ideal_height: u32,
}

impl Default for CaptureConstraints {
    fn default() -> Self {
        Self {
            facing_mode: FacingMode::User,
            ideal_width: 1280,
            ideal_height: 720,
        }
    }
}

/// Exclusive lease on a camera.
///
/// The loss token fires when the device goes away underneath the holder
/// (unplugged, permission revoked).
#[derive(Debug)]
pub struct CameraHandle {
    id: u64,
    lost: CancellationToken,
}

impl CameraHandle {
    pub fn new(id: u64) -> Self {
        Self {
            id,
            lost: CancellationToken::new(),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    /// Token cancelled when the device is lost.
    pub fn lost_signal(&self) -> CancellationToken {
        self.lost.clone()
    }

    pub fn is_lost(&self) -> bool {
        self.lost.is_cancelled()
    }
}

pub trait CameraProvider: Send + Sync {
    /// Denial is reported immediately; there is no acquisition timeout.
    fn acquire(&self, constraints: &CaptureConstraints) -> Result<CameraHandle, CameraError>;

    fn release(&self, handle: &CameraHandle) -> Result<(), CameraError>;
}
