//! Store adapters for the external SaaS backends.
//!
//! Each adapter is an explicit trait with two implementations selected at
//! construction time: a remote one speaking the provider's wire format over
//! reqwest, and an in-memory one for demo mode and tests. Implementations
//! never fall back silently — upstream failures surface as `UpstreamError`
//! and each call site decides how to degrade.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

use crate::models::{
    prefixed_id, Connection, ConnectionStatus, Message, MessageType, OutreachMessage,
    ProfileFilters, ProfileRecord, UserProfile,
};

pub mod profiles;
pub mod relationship;
pub mod tracker;

pub use profiles::{MemoryProfileStore, RemoteProfileStore};
pub use relationship::{MemoryRelationshipStore, RemoteRelationshipStore};
pub use tracker::{ExperimentMetrics, MemoryTracker, RemoteTracker};

/// Failure of a third-party backend call. Distinct from `AppError` so callers
/// can tell a degraded answer from an authoritative one.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("{entity} not found: {id}")]
    Missing { entity: &'static str, id: String },

    #[error("{0} provider is not configured")]
    NotConfigured(&'static str),
}

/// Candidate-contact records, searchable by structured filters.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Stores (or overwrites by id) a profile record and returns its id.
    /// Records without an id are assigned a `profile_<millis>_<random6>` one.
    /// The store may infer/overwrite `industry` with its own heuristic.
    async fn store(&self, record: &ProfileRecord) -> Result<String, UpstreamError>;

    async fn get(&self, id: &str) -> Result<Option<ProfileRecord>, UpstreamError>;

    async fn query(
        &self,
        filters: &ProfileFilters,
        limit: usize,
    ) -> Result<Vec<ProfileRecord>, UpstreamError>;

    /// Stores several records in order, failing on the first upstream error.
    async fn store_bulk(&self, records: &[ProfileRecord]) -> Result<Vec<String>, UpstreamError> {
        let mut ids = Vec::with_capacity(records.len());
        for record in records {
            ids.push(self.store(record).await?);
        }
        Ok(ids)
    }
}

/// Tag/status filter for CRM listings. Empty tag list and `None` status match
/// everything.
#[derive(Debug, Clone, Default)]
pub struct ConnectionFilter {
    pub tags: Vec<String>,
    pub status: Option<ConnectionStatus>,
}

impl ConnectionFilter {
    pub fn matches(&self, connection: &Connection) -> bool {
        if !self.tags.is_empty() && !self.tags.iter().any(|t| connection.tags.contains(t)) {
            return false;
        }
        match self.status {
            Some(status) => connection.status == status,
            None => true,
        }
    }
}

/// Draft for a conversation-history entry; the store assigns id and timestamp.
#[derive(Debug, Clone)]
pub struct NewMessage {
    pub message_type: MessageType,
    pub content: String,
    pub subject: Option<String>,
}

/// Per-user CRM state: the user profile, connections and their conversation
/// history. Connections are indexed per user by a maintained id list.
#[async_trait]
pub trait RelationshipStore: Send + Sync {
    /// Full-record replace-on-update, keyed by email. Last writer wins.
    async fn put_user(&self, profile: &UserProfile) -> Result<(), UpstreamError>;

    async fn get_user(&self, email: &str) -> Result<Option<UserProfile>, UpstreamError>;

    async fn save_connection(&self, connection: &Connection) -> Result<(), UpstreamError>;

    async fn get_connection(
        &self,
        user_id: &str,
        connection_id: &str,
    ) -> Result<Option<Connection>, UpstreamError>;

    async fn list_connections(
        &self,
        user_id: &str,
        filter: &ConnectionFilter,
    ) -> Result<Vec<Connection>, UpstreamError>;

    /// Appends a message to a connection's conversation history and stamps
    /// `last_contacted_at`. Insertion order is preserved.
    async fn add_message(
        &self,
        user_id: &str,
        connection_id: &str,
        draft: NewMessage,
    ) -> Result<Connection, UpstreamError> {
        let mut connection = self
            .get_connection(user_id, connection_id)
            .await?
            .ok_or_else(|| UpstreamError::Missing {
                entity: "connection",
                id: connection_id.to_string(),
            })?;

        let now = chrono::Utc::now();
        connection.conversation_history.push(Message {
            id: prefixed_id("msg"),
            message_type: draft.message_type,
            content: draft.content,
            subject: draft.subject,
            sent_at: now,
            reply_received: None,
            reply_content: None,
            reply_received_at: None,
        });
        connection.last_contacted_at = Some(now);
        connection.updated_at = now;

        self.save_connection(&connection).await?;
        Ok(connection)
    }
}

/// Campaign parameters and metrics for generated outreach.
#[async_trait]
pub trait ExperimentTracker: Send + Sync {
    async fn create_experiment(
        &self,
        name: &str,
        parameters: HashMap<String, String>,
    ) -> Result<String, UpstreamError>;

    /// Logs a metric value. Logging `messages_sent` or `replies_received`
    /// recomputes `reply_rate_percent` from the current values.
    async fn log_metric(&self, key: &str, metric: &str, value: f64)
        -> Result<(), UpstreamError>;

    async fn log_event(
        &self,
        key: &str,
        name: &str,
        metadata: serde_json::Value,
    ) -> Result<(), UpstreamError>;

    async fn metrics(&self, key: &str) -> Result<Option<ExperimentMetrics>, UpstreamError>;

    fn dashboard_url(&self) -> String;

    /// Records a generated outreach message: one experiment per (user, tone)
    /// pair, the message logged as an event, and `messages_sent` updated.
    async fn track_outreach(&self, message: &OutreachMessage) -> Result<String, UpstreamError> {
        let key = match &message.experiment_key {
            Some(key) => key.clone(),
            None => {
                let name = format!("outreach_{}_{}", message.user_id, message.tone);
                let personalization = if message.personalization_tokens.len() > 3 {
                    "high"
                } else {
                    "medium"
                };
                let parameters = HashMap::from([
                    ("tone".to_string(), message.tone.clone()),
                    (
                        "template".to_string(),
                        message.template.clone().unwrap_or_else(|| "default".into()),
                    ),
                    (
                        "personalizationLevel".to_string(),
                        personalization.to_string(),
                    ),
                    ("userId".to_string(), message.user_id.clone()),
                ]);
                self.create_experiment(&name, parameters).await?
            }
        };

        self.log_event(
            &key,
            "outreach_message",
            serde_json::json!({
                "messageId": message.id,
                "connectionId": message.connection_id,
                "type": message.message_type,
                "subject": message.subject,
                "contentLength": message.content.len(),
                "status": message.status,
                "createdAt": message.created_at,
            }),
        )
        .await?;
        self.log_metric(&key, "messages_sent", 1.0).await?;

        Ok(key)
    }
}

/// Converts a typed value to a JSON body, mapping failures to `UpstreamError`.
pub(crate) fn to_json_value<T: Serialize>(value: &T) -> Result<serde_json::Value, UpstreamError> {
    Ok(serde_json::to_value(value)?)
}
