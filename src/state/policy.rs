//! Policy domain types shared by the forms, the API client and the views

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Lifecycle status of a policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PolicyStatus {
    #[default]
    Active,
    Lapsed,
    Cancelled,
    Expired,
    /// Any status this client does not know about
    #[serde(other)]
    Other,
}

impl PolicyStatus {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::Lapsed => "Lapsed",
            Self::Cancelled => "Cancelled",
            Self::Expired => "Expired",
            Self::Other => "Unknown",
        }
    }
}

/// Normalized payload sent to create a policy
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyDraft {
    pub name: String,
    pub company: String,
    pub value: f64,
    pub premium: f64,
    #[serde(serialize_with = "serialize_iso8601")]
    pub start_date: DateTime<Utc>,
    #[serde(serialize_with = "serialize_iso8601")]
    pub end_date: DateTime<Utc>,
    pub nominees: u8,
    pub status: PolicyStatus,
}

/// A policy as stored by the server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyResource {
    #[serde(deserialize_with = "deserialize_id", alias = "_id")]
    pub id: String,
    pub name: String,
    pub company: String,
    pub value: f64,
    pub premium: f64,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub nominees: u8,
    #[serde(default)]
    pub status: PolicyStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl PolicyResource {
    /// Term formatted as `YYYY-MM-DD → YYYY-MM-DD`
    pub fn term_label(&self) -> String {
        format!(
            "{} → {}",
            self.start_date.format("%Y-%m-%d"),
            self.end_date.format("%Y-%m-%d")
        )
    }
}

/// Login credentials. Only lives for the duration of one login call.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Serialize a timestamp the way browsers do (`2024-01-01T00:00:00.000Z`)
pub fn to_iso8601(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn serialize_iso8601<S: Serializer>(
    value: &DateTime<Utc>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&to_iso8601(value))
}

/// Servers disagree on whether ids are strings or numbers
fn deserialize_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(u64),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(s) => s,
        RawId::Number(n) => n.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn sample_draft() -> PolicyDraft {
        PolicyDraft {
            name: "Life".to_string(),
            company: "Met".to_string(),
            value: 100000.0,
            premium: 50.0,
            start_date: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            end_date: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
            nominees: 2,
            status: PolicyStatus::Active,
        }
    }

    #[test]
    fn test_draft_wire_format() {
        let json = serde_json::to_value(sample_draft()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "name": "Life",
                "company": "Met",
                "value": 100000.0,
                "premium": 50.0,
                "startDate": "2024-01-01T00:00:00.000Z",
                "endDate": "2025-01-01T00:00:00.000Z",
                "nominees": 2,
                "status": "Active"
            })
        );
    }

    #[test]
    fn test_resource_accepts_numeric_id() {
        let json = r#"{
            "id": 42,
            "name": "Life",
            "company": "Met",
            "value": 100000,
            "premium": 50,
            "startDate": "2024-01-01T00:00:00.000Z",
            "endDate": "2025-01-01T00:00:00.000Z",
            "nominees": 2
        }"#;
        let resource: PolicyResource = serde_json::from_str(json).unwrap();
        assert_eq!(resource.id, "42");
        assert_eq!(resource.status, PolicyStatus::Active);
        assert!(resource.created_at.is_none());
    }

    #[test]
    fn test_resource_accepts_mongo_style_id() {
        let json = r#"{
            "_id": "65a1f",
            "name": "Home",
            "company": "Allianz",
            "value": 2500.5,
            "premium": 12.25,
            "startDate": "2024-03-01T00:00:00Z",
            "endDate": "2024-09-01T00:00:00Z",
            "nominees": 1,
            "status": "Lapsed"
        }"#;
        let resource: PolicyResource = serde_json::from_str(json).unwrap();
        assert_eq!(resource.id, "65a1f");
        assert_eq!(resource.status, PolicyStatus::Lapsed);
        assert_eq!(resource.term_label(), "2024-03-01 → 2024-09-01");
    }

    #[test]
    fn test_unknown_status_maps_to_other() {
        let status: PolicyStatus = serde_json::from_str(r#""Suspended""#).unwrap();
        assert_eq!(status, PolicyStatus::Other);
        assert_eq!(status.label(), "Unknown");
    }

    #[test]
    fn test_credentials_debug_redacts_password() {
        let creds = Credentials {
            email: "a@b.co".to_string(),
            password: "hunter2".to_string(),
        };
        let debug = format!("{creds:?}");
        assert!(debug.contains("a@b.co"));
        assert!(!debug.contains("hunter2"));
    }
}
