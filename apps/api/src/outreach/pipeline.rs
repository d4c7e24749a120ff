//! Outreach orchestration over the stores: per-connection drafts and
//! tag-targeted bulk campaigns.

use std::collections::HashMap;

use chrono::Utc;
use serde::Serialize;
use tracing::warn;

use crate::llm::Llm;
use crate::models::{
    prefixed_id, Connection, MessageType, OutreachMessage, OutreachStatus, UserProfile,
};
use crate::outreach::generator::{self, Recipient};
use crate::stores::{
    ConnectionFilter, ExperimentTracker, NewMessage, ProfileStore, RelationshipStore,
};

/// Generates a draft for each candidate profile id, promoting each one into
/// the caller's CRM. Unknown ids and upstream hiccups are skipped with a
/// warning rather than failing the batch.
///
/// Promotion goes through `Connection::from_profile`, so a re-run against an
/// already-promoted connection resets its tags and history.
pub async fn generate_for_connections(
    llm: &dyn Llm,
    profiles: &dyn ProfileStore,
    relationships: &dyn RelationshipStore,
    tracker: &dyn ExperimentTracker,
    user: &UserProfile,
    connection_ids: &[String],
) -> Vec<OutreachMessage> {
    let tone = user.outreach_tone().to_string();
    let mut messages = Vec::new();

    for connection_id in connection_ids {
        let record = match profiles.get(connection_id).await {
            Ok(Some(record)) => record,
            Ok(None) => {
                warn!("connection {connection_id} not found, skipping");
                continue;
            }
            Err(e) => {
                warn!("profile lookup failed for {connection_id}: {e}");
                continue;
            }
        };

        let recipient = Recipient {
            name: record.name.clone(),
            title: record.title.clone(),
            company: record.company.clone(),
            education: record.education.clone(),
        };
        let draft = generator::generate_message(llm, user, &recipient, &tone).await;

        let personalization_tokens = HashMap::from([
            ("recipientName".to_string(), record.name.clone()),
            ("recipientRole".to_string(), record.title.clone()),
            ("recipientCompany".to_string(), record.company.clone()),
            ("senderName".to_string(), user.name.clone()),
            ("tone".to_string(), tone.clone()),
        ]);

        let mut message = OutreachMessage {
            id: prefixed_id("msg"),
            user_id: user.id.clone(),
            connection_id: connection_id.clone(),
            message_type: MessageType::Email,
            subject: draft.subject,
            content: draft.content,
            personalization_tokens,
            template: user.preferences.custom_template.clone(),
            tone: tone.clone(),
            status: OutreachStatus::Draft,
            experiment_key: None,
            created_at: Utc::now(),
        };

        match tracker.track_outreach(&message).await {
            Ok(key) => message.experiment_key = Some(key),
            Err(e) => warn!("experiment tracking failed for {}: {e}", message.id),
        }

        if let Err(e) = relationships
            .save_connection(&Connection::from_profile(&record, &user.id))
            .await
        {
            warn!("failed to save connection {connection_id} to CRM: {e}");
        }

        messages.push(message);
    }

    messages
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkMessage {
    pub contact_id: String,
    pub subject: Option<String>,
    pub body: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkOutcome {
    pub count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub experiment_key: Option<String>,
    pub messages: Vec<BulkMessage>,
}

/// Generates outreach for every CRM connection carrying any of `tags`, logs
/// the drafts into each connection's conversation history, and records the
/// campaign as one experiment.
///
/// An empty tag list targets nobody. Matching everything here would blast a
/// draft at the entire CRM on a malformed request.
pub async fn bulk_outreach(
    llm: &dyn Llm,
    relationships: &dyn RelationshipStore,
    tracker: &dyn ExperimentTracker,
    user: &UserProfile,
    tags: &[String],
) -> Result<BulkOutcome, crate::stores::UpstreamError> {
    if tags.is_empty() {
        return Ok(BulkOutcome {
            count: 0,
            experiment_key: None,
            messages: Vec::new(),
        });
    }

    let filter = ConnectionFilter {
        tags: tags.to_vec(),
        status: None,
    };
    let connections = relationships.list_connections(&user.id, &filter).await?;
    if connections.is_empty() {
        return Ok(BulkOutcome {
            count: 0,
            experiment_key: None,
            messages: Vec::new(),
        });
    }

    let tone = user.outreach_tone().to_string();
    let drafts = futures::future::join_all(connections.iter().map(|connection| {
        let recipient = Recipient {
            name: connection.name.clone(),
            title: connection.role.clone(),
            company: connection.company.clone(),
            education: connection.education.clone(),
        };
        let tone = tone.clone();
        async move { generator::generate_message(llm, user, &recipient, &tone).await }
    }))
    .await;

    let campaign_name = format!(
        "bulk_campaign_{}_{}",
        tags.join("_"),
        Utc::now().timestamp_millis()
    );
    let parameters = HashMap::from([
        ("tone".to_string(), tone.clone()),
        ("personalizationLevel".to_string(), "high".to_string()),
        ("userId".to_string(), user.id.clone()),
    ]);
    let experiment_key = match tracker.create_experiment(&campaign_name, parameters).await {
        Ok(key) => key,
        Err(e) => {
            warn!("campaign experiment creation failed: {e}");
            prefixed_id("exp")
        }
    };

    let mut messages = Vec::with_capacity(drafts.len());
    for (connection, draft) in connections.iter().zip(drafts) {
        if let Err(e) = relationships
            .add_message(
                &user.id,
                &connection.id,
                NewMessage {
                    message_type: MessageType::Email,
                    content: draft.content.clone(),
                    subject: draft.subject.clone(),
                },
            )
            .await
        {
            warn!("failed to log draft on connection {}: {e}", connection.id);
        }

        messages.push(BulkMessage {
            contact_id: connection.id.clone(),
            subject: draft.subject,
            body: draft.content,
        });
    }

    if let Err(e) = tracker
        .log_metric(&experiment_key, "messages_sent", messages.len() as f64)
        .await
    {
        warn!("failed to log campaign metric: {e}");
    }

    Ok(BulkOutcome {
        count: messages.len(),
        experiment_key: Some(experiment_key),
        messages,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ProfileRecord;
    use crate::stores::{MemoryProfileStore, MemoryRelationshipStore, MemoryTracker};
    use crate::testing::StubLlm;

    fn record(id: &str, name: &str) -> ProfileRecord {
        ProfileRecord {
            id: id.into(),
            name: name.into(),
            title: "Partner".into(),
            company: "Galaxy Interactive".into(),
            location: None,
            education: None,
            tags: Vec::new(),
            mutual_connections: None,
            source_url: None,
            industry: None,
            insight: None,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn generates_tracks_and_promotes_each_connection() {
        let llm = StubLlm::with_responses(
            [r#"{"subject": "Hello", "content": "Hi Michael!"}"#],
        );
        let profiles = MemoryProfileStore::new();
        let relationships = MemoryRelationshipStore::new();
        let tracker = MemoryTracker::new("default", "connecto");
        let user = UserProfile::new("ada@example.com", "Ada");

        profiles.store(&record("conn_2", "Michael Rodriguez")).await.unwrap();

        let messages = generate_for_connections(
            &llm,
            &profiles,
            &relationships,
            &tracker,
            &user,
            &["conn_2".to_string()],
        )
        .await;

        assert_eq!(messages.len(), 1);
        let message = &messages[0];
        assert!(message.id.starts_with("msg_"));
        assert_eq!(message.status, OutreachStatus::Draft);
        assert!(message.experiment_key.is_some());
        assert_eq!(message.personalization_tokens["recipientName"], "Michael Rodriguez");

        let promoted = relationships
            .get_connection(&user.id, "conn_2")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(promoted.name, "Michael Rodriguez");
    }

    #[tokio::test]
    async fn unknown_ids_are_skipped_not_fatal() {
        let llm = StubLlm::with_responses(
            [r#"{"subject": "Hello", "content": "Hi!"}"#],
        );
        let profiles = MemoryProfileStore::new();
        let relationships = MemoryRelationshipStore::new();
        let tracker = MemoryTracker::new("default", "connecto");
        let user = UserProfile::new("ada@example.com", "Ada");

        profiles.store(&record("conn_1", "Sarah Chen")).await.unwrap();

        let messages = generate_for_connections(
            &llm,
            &profiles,
            &relationships,
            &tracker,
            &user,
            &["ghost".to_string(), "conn_1".to_string()],
        )
        .await;

        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].connection_id, "conn_1");
    }

    #[tokio::test]
    async fn repeat_generation_resets_connection_tags() {
        // Promotion rebuilds the connection from the profile record, wiping
        // tags added since the first promotion. Documented behavior.
        let llm = StubLlm::with_responses([
            r#"{"subject": "A", "content": "one"}"#,
            r#"{"subject": "B", "content": "two"}"#,
        ]);
        let profiles = MemoryProfileStore::new();
        let relationships = MemoryRelationshipStore::new();
        let tracker = MemoryTracker::new("default", "connecto");
        let user = UserProfile::new("ada@example.com", "Ada");
        let ids = vec!["conn_1".to_string()];

        profiles.store(&record("conn_1", "Sarah Chen")).await.unwrap();
        generate_for_connections(&llm, &profiles, &relationships, &tracker, &user, &ids).await;

        let mut tagged = relationships
            .get_connection(&user.id, "conn_1")
            .await
            .unwrap()
            .unwrap();
        tagged.tags = vec!["vip".into()];
        relationships.save_connection(&tagged).await.unwrap();

        generate_for_connections(&llm, &profiles, &relationships, &tracker, &user, &ids).await;

        let after = relationships
            .get_connection(&user.id, "conn_1")
            .await
            .unwrap()
            .unwrap();
        assert!(after.tags.is_empty());
    }

    #[tokio::test]
    async fn bulk_with_empty_tags_targets_nobody() {
        let llm = StubLlm::empty();
        let relationships = MemoryRelationshipStore::new();
        let tracker = MemoryTracker::new("default", "connecto");
        let user = UserProfile::new("ada@example.com", "Ada");

        let outcome = bulk_outreach(&llm, &relationships, &tracker, &user, &[])
            .await
            .unwrap();
        assert_eq!(outcome.count, 0);
        assert!(outcome.experiment_key.is_none());
        assert_eq!(tracker.experiment_count().await, 0);
    }

    #[tokio::test]
    async fn bulk_drafts_land_in_conversation_history() {
        let llm = StubLlm::with_responses([
            r#"{"subject": "Hello A", "content": "Hi A!"}"#,
            r#"{"subject": "Hello B", "content": "Hi B!"}"#,
        ]);
        let relationships = MemoryRelationshipStore::new();
        let tracker = MemoryTracker::new("default", "connecto");
        let user = UserProfile::new("ada@example.com", "Ada");

        for id in ["conn_1", "conn_2"] {
            let mut connection =
                Connection::from_profile(&record(id, &format!("Person {id}")), &user.id);
            connection.tags = vec!["hackathon".into()];
            relationships.save_connection(&connection).await.unwrap();
        }
        let untagged = Connection::from_profile(&record("conn_3", "Unrelated"), &user.id);
        relationships.save_connection(&untagged).await.unwrap();

        let outcome = bulk_outreach(
            &llm,
            &relationships,
            &tracker,
            &user,
            &["hackathon".to_string()],
        )
        .await
        .unwrap();

        assert_eq!(outcome.count, 2);
        assert!(outcome.experiment_key.is_some());

        let touched = relationships
            .get_connection(&user.id, "conn_1")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(touched.conversation_history.len(), 1);
        assert!(touched.last_contacted_at.is_some());

        let untouched = relationships
            .get_connection(&user.id, "conn_3")
            .await
            .unwrap()
            .unwrap();
        assert!(untouched.conversation_history.is_empty());
    }
}
