use std::sync::{
    atomic::{AtomicU64, Ordering},
    Mutex, MutexGuard,
};

use tokio_util::sync::CancellationToken;

use super::{CameraError, CameraHandle, CameraProvider, CaptureConstraints};

const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimulatedCameraMode {
    Available,
    Denied,
    Unavailable,
}

#[derive(Default)]
struct LeaseState {
    active: Option<(u64, CancellationToken)>,
    acquisitions: u64,
    releases: u64,
}

/// Stand-in camera for environments without capture hardware. Allows one
/// lease at a time and counts acquisitions and effective releases.
pub struct SimulatedCamera {
    mode: Mutex<SimulatedCameraMode>,
    next_id: AtomicU64,
    lease: Mutex<LeaseState>,
}

impl SimulatedCamera {
    pub fn new(mode: SimulatedCameraMode) -> Self {
        Self {
            mode: Mutex::new(mode),
            next_id: AtomicU64::new(1),
            lease: Mutex::new(LeaseState::default()),
        }
    }

    pub fn available() -> Self {
        Self::new(SimulatedCameraMode::Available)
    }

    pub fn set_mode(&self, mode: SimulatedCameraMode) {
        *lock(&self.mode) = mode;
    }

    /// Simulate the device disappearing while leased. Returns whether a
    /// lease was active.
    pub fn revoke(&self) -> bool {
        let lease = lock(&self.lease);
        match &lease.active {
            Some((id, lost)) => {
                log_info!("simulated camera {} revoked", id);
                lost.cancel();
                true
            }
            None => false,
        }
    }

    pub fn is_leased(&self) -> bool {
        lock(&self.lease).active.is_some()
    }

    pub fn acquisitions(&self) -> u64 {
        lock(&self.lease).acquisitions
    }

    /// Releases that actually freed a lease.
    pub fn releases(&self) -> u64 {
        lock(&self.lease).releases
    }
}

impl Default for SimulatedCamera {
    fn default() -> Self {
        Self::available()
    }
}

impl CameraProvider for SimulatedCamera {
    fn acquire(&self, constraints: &CaptureConstraints) -> Result<CameraHandle, CameraError> {
        match *lock(&self.mode) {
            SimulatedCameraMode::Denied => return Err(CameraError::PermissionDenied),
            SimulatedCameraMode::Unavailable => return Err(CameraError::DeviceUnavailable),
            SimulatedCameraMode::Available => {}
        }

        let mut lease = lock(&self.lease);
        if lease.active.is_some() {
            return Err(CameraError::DeviceUnavailable);
        }

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let handle = CameraHandle::new(id);
        lease.active = Some((id, handle.lost_signal()));
        lease.acquisitions += 1;
        log_debug!(
            "simulated camera {} acquired at {}x{}",
            id,
            constraints.ideal_width,
            constraints.ideal_height
        );
        Ok(handle)
    }

    fn release(&self, handle: &CameraHandle) -> Result<(), CameraError> {
        let mut lease = lock(&self.lease);
        if matches!(&lease.active, Some((id, _)) if *id == handle.id()) {
            lease.active = None;
            lease.releases += 1;
            log_debug!("simulated camera {} released", handle.id());
        }
        Ok(())
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}
