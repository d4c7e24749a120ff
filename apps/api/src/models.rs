//! Core domain types shared across the API.
//!
//! Wire format is camelCase to match the CONNECTO web client. All
//! timestamps are UTC. Records carry string ids in the
//! `<prefix>_<millis>_<random6>` shape the external stores expect.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

// ────────────────────────────────────────────────────────────────────────────
// User profile (owned by the Relationship Store)
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    pub email: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub onboarding_completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resume: Option<ResumeMeta>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interview: Option<Interview>,
    #[serde(default)]
    pub preferences: Preferences,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserProfile {
    pub fn new(email: impl Into<String>, name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: prefixed_id("user"),
            email: email.into(),
            name: name.into(),
            image: None,
            onboarding_completed: false,
            resume: None,
            interview: None,
            preferences: Preferences::default(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Tone used for outreach generation when the user has not picked one.
    pub fn outreach_tone(&self) -> &str {
        self.preferences
            .outreach_tone
            .as_deref()
            .unwrap_or("professional")
    }
}

/// Resume metadata captured at onboarding. `content` is a summary string
/// ("filename + size") — real PDF parsing is out of scope.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeMeta {
    pub file_name: String,
    pub content: String,
    pub uploaded_at: DateTime<Utc>,
}

/// Answers from the onboarding interview.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Interview {
    #[serde(default)]
    pub career_goals: String,
    #[serde(default)]
    pub current_role: String,
    #[serde(default)]
    pub target_industries: Vec<String>,
    #[serde(default)]
    pub preferences: HashMap<String, serde_json::Value>,
    pub completed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outreach_tone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_template: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calendly_link: Option<String>,
    /// Most recent analyzer output, kept for follow-up suggestions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_search_filters: Option<ProfileFilters>,
}

// ────────────────────────────────────────────────────────────────────────────
// Candidate profiles (Profile Store)
// ────────────────────────────────────────────────────────────────────────────

/// A candidate contact held by the Profile Store. Immutable once stored,
/// except for re-sync overwrite by id.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileRecord {
    #[serde(default)]
    pub id: String,
    pub name: String,
    pub title: String,
    pub company: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub education: Option<Vec<String>>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mutual_connections: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub industry: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insight: Option<String>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

/// Structured search criteria produced by the request analyzer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileFilters {
    #[serde(default)]
    pub industries: Vec<String>,
    #[serde(default)]
    pub locations: Vec<String>,
    #[serde(default)]
    pub education: Vec<String>,
    #[serde(default)]
    pub seniority: Vec<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
}

impl ProfileFilters {
    pub fn is_empty(&self) -> bool {
        self.industries.is_empty()
            && self.locations.is_empty()
            && self.education.is_empty()
            && self.seniority.is_empty()
            && self.keywords.is_empty()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// CRM (Relationship Store)
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionStatus {
    Pending,
    Contacted,
    Connected,
    Declined,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageType {
    Email,
    Linkedin,
    Note,
}

/// Append-only entry in a connection's conversation history.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    #[serde(rename = "type")]
    pub message_type: MessageType,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    pub sent_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_received: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_received_at: Option<DateTime<Utc>>,
}

/// A candidate promoted into the user's CRM.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub role: String,
    pub company: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub education: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mutual_connections: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linkedin_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_review: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub status: ConnectionStatus,
    #[serde(default)]
    pub conversation_history: Vec<Message>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_contacted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Connection {
    /// Promotes a profile record into a fresh CRM connection for `user_id`.
    /// Status starts at `pending` with an empty tag list and history.
    pub fn from_profile(record: &ProfileRecord, user_id: &str) -> Self {
        let now = Utc::now();
        Self {
            id: record.id.clone(),
            user_id: user_id.to_string(),
            name: record.name.clone(),
            role: record.title.clone(),
            company: record.company.clone(),
            location: record.location.clone(),
            education: record.education.clone(),
            mutual_connections: record.mutual_connections,
            linkedin_url: record.source_url.clone(),
            email: None,
            ai_review: record.insight.clone(),
            tags: Vec::new(),
            status: ConnectionStatus::Pending,
            conversation_history: Vec::new(),
            last_contacted_at: None,
            created_at: now,
            updated_at: now,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Outreach
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutreachStatus {
    Draft,
    Sent,
    Replied,
    Failed,
}

/// A generated outreach draft. Status transitions beyond `draft` are not
/// driven by real send/reply events in this scope.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutreachMessage {
    pub id: String,
    pub user_id: String,
    pub connection_id: String,
    #[serde(rename = "type")]
    pub message_type: MessageType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    pub content: String,
    pub personalization_tokens: HashMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
    pub tone: String,
    pub status: OutreachStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub experiment_key: Option<String>,
    pub created_at: DateTime<Utc>,
}

// ────────────────────────────────────────────────────────────────────────────
// Id generation
// ────────────────────────────────────────────────────────────────────────────

const ID_CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";
const ID_SUFFIX_LEN: usize = 6;

/// Builds an id in the `<prefix>_<millis>_<random6>` shape the external
/// stores and the wire format use (e.g. `profile_1712…_k3x9q2`).
pub fn prefixed_id(prefix: &str) -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..ID_SUFFIX_LEN)
        .map(|_| ID_CHARSET[rng.gen_range(0..ID_CHARSET.len())] as char)
        .collect();
    format!("{prefix}_{}_{suffix}", Utc::now().timestamp_millis())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefixed_id_has_prefix_timestamp_and_suffix() {
        let id = prefixed_id("profile");
        let parts: Vec<&str> = id.splitn(3, '_').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "profile");
        assert!(parts[1].parse::<i64>().is_ok(), "millis segment: {}", parts[1]);
        assert_eq!(parts[2].len(), ID_SUFFIX_LEN);
        assert!(parts[2].bytes().all(|b| ID_CHARSET.contains(&b)));
    }

    #[test]
    fn prefixed_ids_are_distinct() {
        let a = prefixed_id("msg");
        let b = prefixed_id("msg");
        assert_ne!(a, b);
    }

    #[test]
    fn connection_status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&ConnectionStatus::Pending).unwrap(),
            "\"pending\""
        );
        let status: ConnectionStatus = serde_json::from_str("\"declined\"").unwrap();
        assert_eq!(status, ConnectionStatus::Declined);
    }

    #[test]
    fn profile_record_uses_camel_case_wire_names() {
        let record = ProfileRecord {
            id: "host_001".into(),
            name: "Sarah Chen".into(),
            title: "Senior Developer Advocate".into(),
            company: "Telnyx".into(),
            location: Some("San Francisco, CA".into()),
            education: Some(vec!["Stanford University".into()]),
            tags: vec!["hackathon".into()],
            mutual_connections: Some(3),
            source_url: Some("https://linkedin.com/in/sarahchen".into()),
            industry: Some("Technology".into()),
            insight: None,
            created_at: Utc::now(),
        };
        let value = serde_json::to_value(&record).unwrap();
        assert!(value.get("mutualConnections").is_some());
        assert!(value.get("sourceUrl").is_some());
        assert!(value.get("createdAt").is_some());
    }

    #[test]
    fn filters_default_to_empty_on_missing_fields() {
        let filters: ProfileFilters =
            serde_json::from_str(r#"{"keywords": ["fintech"]}"#).unwrap();
        assert_eq!(filters.keywords, vec!["fintech"]);
        assert!(filters.industries.is_empty());
        assert!(!filters.is_empty());
        assert!(ProfileFilters::default().is_empty());
    }

    #[test]
    fn connection_from_profile_starts_pending_and_untagged() {
        let record = ProfileRecord {
            id: "conn_1".into(),
            name: "Michael Rodriguez".into(),
            title: "Partner".into(),
            company: "Galaxy Interactive".into(),
            location: None,
            education: None,
            tags: vec!["vc".into()],
            mutual_connections: None,
            source_url: None,
            industry: None,
            insight: Some("Strong fit".into()),
            created_at: Utc::now(),
        };
        let conn = Connection::from_profile(&record, "user_1");
        assert_eq!(conn.status, ConnectionStatus::Pending);
        assert!(conn.tags.is_empty());
        assert!(conn.conversation_history.is_empty());
        assert_eq!(conn.role, "Partner");
        assert_eq!(conn.ai_review.as_deref(), Some("Strong fit"));
    }
}
