//! Profile Store adapter — searchable candidate-contact records.
//!
//! The remote implementation speaks the ApertureData-style entity/query wire
//! format (basic-auth `POST /api/query` with AddEntity/FindEntity bodies).
//! The in-memory implementation backs demo mode and tests.

use std::collections::HashMap;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tokio::sync::RwLock;
use tracing::debug;

use crate::models::{prefixed_id, ProfileFilters, ProfileRecord};
use crate::stores::{to_json_value, ProfileStore, UpstreamError};

/// Maps well-known company names to an industry. The store applies this on
/// every write, so synced records may come back with `industry` overwritten.
pub fn infer_industry(company: &str) -> &'static str {
    const INDUSTRY_MAP: &[(&str, &str)] = &[
        ("google", "Technology"),
        ("facebook", "Technology"),
        ("meta", "Technology"),
        ("apple", "Technology"),
        ("microsoft", "Technology"),
        ("goldman", "Finance"),
        ("morgan", "Finance"),
        ("mckinsey", "Consulting"),
        ("bcg", "Consulting"),
        ("bain", "Consulting"),
    ];

    let lower = company.to_lowercase();
    INDUSTRY_MAP
        .iter()
        .find(|(needle, _)| lower.contains(needle))
        .map(|(_, industry)| *industry)
        .unwrap_or("Other")
}

fn normalize(record: &ProfileRecord) -> ProfileRecord {
    let mut stored = record.clone();
    if stored.id.is_empty() {
        stored.id = prefixed_id("profile");
    }
    stored.industry = Some(infer_industry(&stored.company).to_string());
    stored
}

fn matches_filters(record: &ProfileRecord, filters: &ProfileFilters) -> bool {
    if !filters.industries.is_empty() {
        let industry = record.industry.as_deref().unwrap_or("");
        if !filters
            .industries
            .iter()
            .any(|i| industry.eq_ignore_ascii_case(i))
        {
            return false;
        }
    }

    if !filters.locations.is_empty() {
        let location = record.location.as_deref().unwrap_or("").to_lowercase();
        if !filters
            .locations
            .iter()
            .any(|l| location.contains(&l.to_lowercase()))
        {
            return false;
        }
    }

    if !filters.education.is_empty() {
        let education = record.education.as_deref().unwrap_or(&[]);
        let matched = filters.education.iter().any(|wanted| {
            let wanted = wanted.to_lowercase();
            education.iter().any(|e| e.to_lowercase().contains(&wanted))
        });
        if !matched {
            return false;
        }
    }

    if !filters.keywords.is_empty() {
        let haystack = format!("{} {} {}", record.name, record.title, record.company)
            .to_lowercase();
        if !filters
            .keywords
            .iter()
            .any(|k| haystack.contains(&k.to_lowercase()))
        {
            return false;
        }
    }

    true
}

// ────────────────────────────────────────────────────────────────────────────
// In-memory implementation
// ────────────────────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct MemoryProfileStore {
    records: RwLock<HashMap<String, ProfileRecord>>,
}

impl MemoryProfileStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProfileStore for MemoryProfileStore {
    async fn store(&self, record: &ProfileRecord) -> Result<String, UpstreamError> {
        let stored = normalize(record);
        let id = stored.id.clone();
        self.records.write().await.insert(id.clone(), stored);
        Ok(id)
    }

    async fn get(&self, id: &str) -> Result<Option<ProfileRecord>, UpstreamError> {
        Ok(self.records.read().await.get(id).cloned())
    }

    async fn query(
        &self,
        filters: &ProfileFilters,
        limit: usize,
    ) -> Result<Vec<ProfileRecord>, UpstreamError> {
        let records = self.records.read().await;
        let mut matched: Vec<ProfileRecord> = records
            .values()
            .filter(|r| matches_filters(r, filters))
            .cloned()
            .collect();
        matched.sort_by(|a, b| a.id.cmp(&b.id));
        matched.truncate(limit);
        Ok(matched)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Remote implementation
// ────────────────────────────────────────────────────────────────────────────

pub struct RemoteProfileStore {
    client: Client,
    base_url: String,
    auth_header: String,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    entities: Vec<Entity>,
}

#[derive(Debug, Deserialize)]
struct Entity {
    _id: String,
    _properties: serde_json::Value,
}

impl Entity {
    fn into_record(self) -> Result<ProfileRecord, UpstreamError> {
        let mut properties = self._properties;
        if let Some(map) = properties.as_object_mut() {
            map.insert("id".into(), json!(self._id));
        }
        Ok(serde_json::from_value(properties)?)
    }
}

impl RemoteProfileStore {
    pub fn new(host: &str, port: u16, username: &str, password: &str) -> Self {
        let credentials = BASE64.encode(format!("{username}:{password}"));
        Self {
            client: Client::new(),
            base_url: format!("http://{host}:{port}"),
            auth_header: format!("Basic {credentials}"),
        }
    }

    async fn run_query(&self, body: serde_json::Value) -> Result<QueryResponse, UpstreamError> {
        let response = self
            .client
            .post(format!("{}/api/query", self.base_url))
            .header("Authorization", &self.auth_header)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(UpstreamError::Api {
                status: status.as_u16(),
                message: response.text().await.unwrap_or_default(),
            });
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl ProfileStore for RemoteProfileStore {
    async fn store(&self, record: &ProfileRecord) -> Result<String, UpstreamError> {
        let stored = normalize(record);
        let mut properties = to_json_value(&stored)?;
        if let Some(map) = properties.as_object_mut() {
            map.remove("id");
        }

        self.run_query(json!({
            "AddEntity": {
                "class": "Profile",
                "_id": stored.id,
                "properties": properties,
            }
        }))
        .await?;

        debug!("stored profile {} in remote profile store", stored.id);
        Ok(stored.id)
    }

    async fn get(&self, id: &str) -> Result<Option<ProfileRecord>, UpstreamError> {
        let response = self
            .run_query(json!({
                "FindEntity": {
                    "class": "Profile",
                    "constraints": { "_id": { "_eq": id } },
                    "results": { "all_properties": true },
                }
            }))
            .await?;

        response
            .entities
            .into_iter()
            .next()
            .map(Entity::into_record)
            .transpose()
    }

    async fn query(
        &self,
        filters: &ProfileFilters,
        limit: usize,
    ) -> Result<Vec<ProfileRecord>, UpstreamError> {
        let mut constraints = Vec::new();
        if !filters.industries.is_empty() {
            constraints.push(json!({ "_properties": { "industry": { "_in": filters.industries } } }));
        }
        if !filters.locations.is_empty() {
            constraints
                .push(json!({ "_properties": { "location": { "_contains_any": filters.locations } } }));
        }
        if !filters.education.is_empty() {
            constraints
                .push(json!({ "_properties": { "education": { "_contains_any": filters.education } } }));
        }
        if !filters.keywords.is_empty() {
            constraints
                .push(json!({ "_properties": { "name": { "_contains_any": filters.keywords } } }));
        }

        let constraint_body = if constraints.is_empty() {
            json!({})
        } else {
            json!({ "_and": constraints })
        };

        let response = self
            .run_query(json!({
                "FindEntity": {
                    "class": "Profile",
                    "constraints": constraint_body,
                    "results": { "all_properties": true, "limit": limit },
                }
            }))
            .await?;

        response
            .entities
            .into_iter()
            .map(Entity::into_record)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, company: &str, location: &str, education: &[&str]) -> ProfileRecord {
        ProfileRecord {
            id: String::new(),
            name: name.into(),
            title: "Partner".into(),
            company: company.into(),
            location: Some(location.into()),
            education: Some(education.iter().map(|e| e.to_string()).collect()),
            tags: Vec::new(),
            mutual_connections: None,
            source_url: None,
            industry: None,
            insight: None,
            created_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn industry_heuristic_maps_known_companies() {
        assert_eq!(infer_industry("Google"), "Technology");
        assert_eq!(infer_industry("Goldman Sachs"), "Finance");
        assert_eq!(infer_industry("McKinsey & Company"), "Consulting");
        assert_eq!(infer_industry("Bitkraft Ventures"), "Other");
    }

    #[tokio::test]
    async fn store_assigns_id_and_infers_industry() {
        let store = MemoryProfileStore::new();
        let id = store
            .store(&record("Sarah Chen", "Google", "Bay Area, CA", &["Stanford"]))
            .await
            .unwrap();
        assert!(id.starts_with("profile_"));

        let fetched = store.get(&id).await.unwrap().unwrap();
        assert_eq!(fetched.name, "Sarah Chen");
        assert_eq!(fetched.industry.as_deref(), Some("Technology"));
    }

    #[tokio::test]
    async fn store_preserves_caller_supplied_id() {
        let store = MemoryProfileStore::new();
        let mut r = record("Emily Watson", "ApertureData", "Palo Alto, CA", &["MIT"]);
        r.id = "host_003".into();
        let id = store.store(&r).await.unwrap();
        assert_eq!(id, "host_003");
        assert!(store.get("host_003").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn query_filters_location_by_substring_case_insensitive() {
        let store = MemoryProfileStore::new();
        store
            .store(&record("A", "X", "San Francisco, CA", &["Stanford"]))
            .await
            .unwrap();
        store
            .store(&record("B", "Y", "New York, NY", &["NYU"]))
            .await
            .unwrap();

        let filters = ProfileFilters {
            locations: vec!["san francisco".into()],
            ..Default::default()
        };
        let results = store.query(&filters, 50).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].name, "A");
    }

    #[tokio::test]
    async fn query_filters_education_by_membership() {
        let store = MemoryProfileStore::new();
        store
            .store(&record("A", "X", "Bay Area", &["Stanford University", "MBA"]))
            .await
            .unwrap();
        store.store(&record("B", "Y", "Bay Area", &["MIT"])).await.unwrap();

        let filters = ProfileFilters {
            education: vec!["stanford".into()],
            ..Default::default()
        };
        let results = store.query(&filters, 50).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].name, "A");
    }

    #[tokio::test]
    async fn query_respects_limit() {
        let store = MemoryProfileStore::new();
        for i in 0..5 {
            store
                .store(&record(&format!("P{i}"), "X", "Bay Area", &[]))
                .await
                .unwrap();
        }
        let results = store.query(&ProfileFilters::default(), 3).await.unwrap();
        assert_eq!(results.len(), 3);
    }
}
