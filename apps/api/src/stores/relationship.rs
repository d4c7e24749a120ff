//! Relationship Store adapter — per-user CRM state.
//!
//! The remote implementation speaks the MemVerge-style memory API
//! (`POST /v1/memory/set`, `GET /v1/memory/get?key=...`) with a manually
//! maintained `connection_index:<user>` id list per user. The in-memory
//! implementation backs demo mode and tests.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use tokio::sync::RwLock;
use tracing::debug;

use crate::models::{Connection, UserProfile};
use crate::stores::{to_json_value, ConnectionFilter, RelationshipStore, UpstreamError};

fn user_key(email: &str) -> String {
    format!("user:{email}")
}

fn connection_key(user_id: &str, connection_id: &str) -> String {
    format!("connection:{user_id}:{connection_id}")
}

fn index_key(user_id: &str) -> String {
    format!("connection_index:{user_id}")
}

// ────────────────────────────────────────────────────────────────────────────
// In-memory implementation
// ────────────────────────────────────────────────────────────────────────────

#[derive(Default)]
struct MemoryInner {
    users: HashMap<String, UserProfile>,
    connections: HashMap<String, Connection>,
    index: HashMap<String, Vec<String>>,
}

#[derive(Default)]
pub struct MemoryRelationshipStore {
    inner: RwLock<MemoryInner>,
}

impl MemoryRelationshipStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RelationshipStore for MemoryRelationshipStore {
    async fn put_user(&self, profile: &UserProfile) -> Result<(), UpstreamError> {
        self.inner
            .write()
            .await
            .users
            .insert(user_key(&profile.email), profile.clone());
        Ok(())
    }

    async fn get_user(&self, email: &str) -> Result<Option<UserProfile>, UpstreamError> {
        Ok(self.inner.read().await.users.get(&user_key(email)).cloned())
    }

    async fn save_connection(&self, connection: &Connection) -> Result<(), UpstreamError> {
        let mut inner = self.inner.write().await;
        inner.connections.insert(
            connection_key(&connection.user_id, &connection.id),
            connection.clone(),
        );
        let ids = inner.index.entry(connection.user_id.clone()).or_default();
        if !ids.contains(&connection.id) {
            ids.push(connection.id.clone());
        }
        Ok(())
    }

    async fn get_connection(
        &self,
        user_id: &str,
        connection_id: &str,
    ) -> Result<Option<Connection>, UpstreamError> {
        Ok(self
            .inner
            .read()
            .await
            .connections
            .get(&connection_key(user_id, connection_id))
            .cloned())
    }

    async fn list_connections(
        &self,
        user_id: &str,
        filter: &ConnectionFilter,
    ) -> Result<Vec<Connection>, UpstreamError> {
        let inner = self.inner.read().await;
        let ids = inner.index.get(user_id).cloned().unwrap_or_default();
        Ok(ids
            .iter()
            .filter_map(|id| inner.connections.get(&connection_key(user_id, id)))
            .filter(|c| filter.matches(c))
            .cloned()
            .collect())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Remote implementation
// ────────────────────────────────────────────────────────────────────────────

pub struct RemoteRelationshipStore {
    client: Client,
    api_url: String,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct MemoryEnvelope {
    value: serde_json::Value,
}

impl RemoteRelationshipStore {
    pub fn new(api_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_url: api_url.into(),
            api_key: api_key.into(),
        }
    }

    async fn set(
        &self,
        key: &str,
        value: serde_json::Value,
        user_id: &str,
        record_type: &str,
    ) -> Result<(), UpstreamError> {
        let now = Utc::now();
        let response = self
            .client
            .post(format!("{}/v1/memory/set", self.api_url))
            .bearer_auth(&self.api_key)
            .json(&json!({
                "key": key,
                "value": value,
                "metadata": {
                    "userId": user_id,
                    "type": record_type,
                    "createdAt": now,
                    "updatedAt": now,
                },
            }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(UpstreamError::Api {
                status: status.as_u16(),
                message: response.text().await.unwrap_or_default(),
            });
        }
        debug!("wrote {record_type} record at key {key}");
        Ok(())
    }

    async fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, UpstreamError> {
        let response = self
            .client
            .get(format!("{}/v1/memory/get", self.api_url))
            .bearer_auth(&self.api_key)
            .query(&[("key", key)])
            .send()
            .await?;

        let status = response.status();
        if status.as_u16() == 404 {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(UpstreamError::Api {
                status: status.as_u16(),
                message: response.text().await.unwrap_or_default(),
            });
        }

        let envelope: MemoryEnvelope = response.json().await?;
        if envelope.value.is_null() {
            return Ok(None);
        }
        Ok(Some(serde_json::from_value(envelope.value)?))
    }
}

#[async_trait]
impl RelationshipStore for RemoteRelationshipStore {
    async fn put_user(&self, profile: &UserProfile) -> Result<(), UpstreamError> {
        self.set(
            &user_key(&profile.email),
            to_json_value(profile)?,
            &profile.id,
            "user_profile",
        )
        .await
    }

    async fn get_user(&self, email: &str) -> Result<Option<UserProfile>, UpstreamError> {
        self.get(&user_key(email)).await
    }

    async fn save_connection(&self, connection: &Connection) -> Result<(), UpstreamError> {
        self.set(
            &connection_key(&connection.user_id, &connection.id),
            to_json_value(connection)?,
            &connection.user_id,
            "connection",
        )
        .await?;

        // Read-modify-write of the per-user id index. Last writer wins.
        let key = index_key(&connection.user_id);
        let mut ids: Vec<String> = self.get(&key).await?.unwrap_or_default();
        if !ids.contains(&connection.id) {
            ids.push(connection.id.clone());
            self.set(&key, json!(ids), &connection.user_id, "connection_index")
                .await?;
        }
        Ok(())
    }

    async fn get_connection(
        &self,
        user_id: &str,
        connection_id: &str,
    ) -> Result<Option<Connection>, UpstreamError> {
        self.get(&connection_key(user_id, connection_id)).await
    }

    async fn list_connections(
        &self,
        user_id: &str,
        filter: &ConnectionFilter,
    ) -> Result<Vec<Connection>, UpstreamError> {
        let ids: Vec<String> = self.get(&index_key(user_id)).await?.unwrap_or_default();

        let fetches = ids
            .iter()
            .map(|id| self.get_connection(user_id, id));
        let fetched = futures::future::join_all(fetches).await;

        let mut connections = Vec::new();
        for result in fetched {
            if let Some(connection) = result? {
                if filter.matches(&connection) {
                    connections.push(connection);
                }
            }
        }
        Ok(connections)
    }
}
