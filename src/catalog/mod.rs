//! Static registry of the poses a user can practice.
//!
//! Definitions are built once and shared behind an `Arc`; nothing mutates
//! them after construction.

mod poses;

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum Severity {
    /// Positive reinforcement; never counted as a correction.
    Correct,
    Error,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Correct => "correct",
            Severity::Error => "error",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Correction {
    pub area: String,
    pub message: String,
    pub severity: Severity,
}

impl Correction {
    pub fn new(area: &str, message: &str, severity: Severity) -> Self {
        Self {
            area: area.to_string(),
            message: message.to_string(),
            severity,
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PoseDefinition {
    pub id: String,
    pub display_name: String,
    pub alternate_name: String,
    pub briefing: String,
    pub corrections: Vec<Correction>,
}

impl PoseDefinition {
    /// First two words of the display name, used where space is tight.
    pub fn short_name(&self) -> String {
        self.display_name
            .split_whitespace()
            .take(2)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[derive(Debug, Clone)]
pub struct PoseCatalog {
    order: Vec<String>,
    poses: HashMap<String, Arc<PoseDefinition>>,
}

impl PoseCatalog {
    /// The built-in pose set.
    pub fn builtin() -> Self {
        Self::from_definitions(poses::builtin_poses())
    }

    /// Later definitions with a duplicate id replace earlier ones but keep
    /// the earlier listing position.
    pub fn from_definitions(definitions: Vec<PoseDefinition>) -> Self {
        let mut order = Vec::with_capacity(definitions.len());
        let mut poses = HashMap::with_capacity(definitions.len());

        for definition in definitions {
            if !poses.contains_key(&definition.id) {
                order.push(definition.id.clone());
            }
            poses.insert(definition.id.clone(), Arc::new(definition));
        }

        Self { order, poses }
    }

    pub fn get(&self, pose_id: &str) -> Option<Arc<PoseDefinition>> {
        self.poses.get(pose_id).cloned()
    }

    /// Display name for a pose id, falling back to the id itself.
    pub fn display_name(&self, pose_id: &str) -> String {
        self.poses
            .get(pose_id)
            .map(|pose| pose.display_name.clone())
            .unwrap_or_else(|| pose_id.to_string())
    }

    /// Definitions in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<PoseDefinition>> {
        self.order.iter().filter_map(|id| self.poses.get(id))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

impl Default for PoseCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}
