use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

pub const DEFAULT_GENDER: &str = "prefer_not";

fn default_gender() -> String {
    DEFAULT_GENDER.to_string()
}

/// The single profile kept per user; saving replaces the previous one.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ProfileRecord {
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default = "default_gender")]
    pub gender: String,
    /// Free-form, as typed by the user (e.g. "172 cm").
    #[serde(default)]
    pub height: String,
}

impl ProfileRecord {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            email: String::new(),
            gender: default_gender(),
            height: String::new(),
        }
    }

    /// Trim every field and fill in the gender default. Fails when the
    /// username is blank.
    pub fn normalized(&self) -> Result<Self> {
        let username = self.username.trim();
        if username.is_empty() {
            bail!("profile username must not be empty");
        }

        let gender = match self.gender.trim() {
            "" => default_gender(),
            other => other.to_string(),
        };

        Ok(Self {
            username: username.to_string(),
            email: self.email.trim().to_string(),
            gender,
            height: self.height.trim().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalized_trims_and_defaults_gender() {
        let profile = ProfileRecord {
            username: "  asha ".into(),
            email: " asha@example.com ".into(),
            gender: "".into(),
            height: "160".into(),
        };

        let normalized = profile.normalized().unwrap();
        assert_eq!(normalized.username, "asha");
        assert_eq!(normalized.email, "asha@example.com");
        assert_eq!(normalized.gender, DEFAULT_GENDER);
    }

    #[test]
    fn blank_username_is_rejected() {
        assert!(ProfileRecord::new("   ").normalized().is_err());
    }

    #[test]
    fn missing_optional_fields_deserialize_with_defaults() {
        let profile: ProfileRecord = serde_json::from_str(r#"{"username":"ravi"}"#).unwrap();
        assert_eq!(profile.gender, DEFAULT_GENDER);
        assert!(profile.email.is_empty());
    }
}
