use thiserror::Error;

use crate::camera::CameraError;

use super::state::SessionStatus;

/// Errors a caller can recover from; none of them leaves the controller in
/// a half-changed state.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("unknown pose id '{0}'")]
    InvalidPose(String),

    /// The controller stays `Idle`; the caller may retry.
    #[error("camera could not be acquired: {0}")]
    ResourcePermission(#[source] CameraError),

    #[error("cannot {action} while the session is {from}")]
    InvalidTransition {
        from: SessionStatus,
        action: &'static str,
    },
}

impl SessionError {
    pub fn invalid_transition(from: SessionStatus, action: &'static str) -> Self {
        SessionError::InvalidTransition { from, action }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offending_state() {
        let err = SessionError::invalid_transition(SessionStatus::Ended, "stop");
        assert_eq!(err.to_string(), "cannot stop while the session is ended");

        let err = SessionError::ResourcePermission(CameraError::PermissionDenied);
        assert_eq!(
            err.to_string(),
            "camera could not be acquired: camera permission denied"
        );
    }
}
