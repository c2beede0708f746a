use serde::Serialize;

use crate::catalog::Correction;
use crate::db::models::SessionRecord;

use super::score::ScoreTier;
use super::state::{EndReason, SessionStatus};

/// Everything a display needs once a session has ended.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CompletedSession {
    pub record: SessionRecord,
    pub duration_label: String,
    pub highlight: String,
    pub end_reason: EndReason,
}

/// Pushed to subscribers while a controller runs. Nothing is sent after
/// `Completed`.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum SessionEvent {
    StateChanged {
        status: SessionStatus,
    },
    #[serde(rename_all = "camelCase")]
    Feedback {
        pose_id: String,
        areas: Vec<Correction>,
    },
    Score {
        score: u8,
        tier: ScoreTier,
    },
    #[serde(rename_all = "camelCase")]
    Heartbeat {
        elapsed_seconds: u64,
    },
    Completed(CompletedSession),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn events_serialize_with_a_type_tag() {
        let event = SessionEvent::Heartbeat { elapsed_seconds: 20 };
        assert_eq!(
            serde_json::to_value(&event).unwrap(),
            json!({ "type": "heartbeat", "elapsedSeconds": 20 })
        );

        let event = SessionEvent::StateChanged {
            status: SessionStatus::AwaitingResource,
        };
        assert_eq!(
            serde_json::to_value(&event).unwrap(),
            json!({ "type": "stateChanged", "status": "awaitingResource" })
        );
    }
}
