//! Experiment Tracker adapter — campaign parameters and metrics for
//! generated outreach.
//!
//! The remote implementation speaks the Comet-style REST v2 write API. The
//! in-memory implementation backs demo mode and tests. Metric semantics are
//! last-value-wins gauges; `reply_rate_percent` is recomputed from
//! `messages_sent` / `replies_received` on every relevant log.

use std::collections::HashMap;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::sync::RwLock;
use tracing::debug;

use crate::models::prefixed_id;
use crate::stores::{ExperimentTracker, UpstreamError};

pub const METRIC_MESSAGES_SENT: &str = "messages_sent";
pub const METRIC_REPLIES_RECEIVED: &str = "replies_received";
pub const METRIC_REPLY_RATE: &str = "reply_rate_percent";
pub const METRIC_RESPONSE_TIME: &str = "response_time_hours";

/// Metric snapshot for one experiment.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExperimentMetrics {
    pub messages_sent: f64,
    pub replies_received: f64,
    pub reply_rate: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_response_time: Option<f64>,
}

impl ExperimentMetrics {
    fn from_map(metrics: &HashMap<String, f64>) -> Self {
        Self {
            messages_sent: metrics.get(METRIC_MESSAGES_SENT).copied().unwrap_or(0.0),
            replies_received: metrics.get(METRIC_REPLIES_RECEIVED).copied().unwrap_or(0.0),
            reply_rate: metrics.get(METRIC_REPLY_RATE).copied().unwrap_or(0.0),
            average_response_time: metrics.get(METRIC_RESPONSE_TIME).copied(),
        }
    }
}

fn reply_rate(metrics: &HashMap<String, f64>) -> Option<f64> {
    let sent = metrics.get(METRIC_MESSAGES_SENT).copied().unwrap_or(0.0);
    let replies = metrics.get(METRIC_REPLIES_RECEIVED).copied().unwrap_or(0.0);
    (sent > 0.0).then(|| replies / sent * 100.0)
}

// ────────────────────────────────────────────────────────────────────────────
// In-memory implementation
// ────────────────────────────────────────────────────────────────────────────

#[derive(Default)]
struct ExperimentRecord {
    #[allow(dead_code)]
    name: String,
    #[allow(dead_code)]
    parameters: HashMap<String, String>,
    metrics: HashMap<String, f64>,
    events: Vec<serde_json::Value>,
}

pub struct MemoryTracker {
    workspace: String,
    project: String,
    experiments: RwLock<HashMap<String, ExperimentRecord>>,
}

impl MemoryTracker {
    pub fn new(workspace: impl Into<String>, project: impl Into<String>) -> Self {
        Self {
            workspace: workspace.into(),
            project: project.into(),
            experiments: RwLock::new(HashMap::new()),
        }
    }

    #[cfg(test)]
    pub async fn experiment_count(&self) -> usize {
        self.experiments.read().await.len()
    }

    #[cfg(test)]
    pub async fn event_count(&self, key: &str) -> usize {
        self.experiments
            .read()
            .await
            .get(key)
            .map(|e| e.events.len())
            .unwrap_or(0)
    }
}

#[async_trait]
impl ExperimentTracker for MemoryTracker {
    async fn create_experiment(
        &self,
        name: &str,
        parameters: HashMap<String, String>,
    ) -> Result<String, UpstreamError> {
        let key = prefixed_id("exp");
        self.experiments.write().await.insert(
            key.clone(),
            ExperimentRecord {
                name: name.to_string(),
                parameters,
                ..Default::default()
            },
        );
        Ok(key)
    }

    async fn log_metric(&self, key: &str, metric: &str, value: f64) -> Result<(), UpstreamError> {
        let mut experiments = self.experiments.write().await;
        let record = experiments
            .get_mut(key)
            .ok_or_else(|| UpstreamError::Missing {
                entity: "experiment",
                id: key.to_string(),
            })?;

        record.metrics.insert(metric.to_string(), value);
        if matches!(metric, METRIC_MESSAGES_SENT | METRIC_REPLIES_RECEIVED) {
            if let Some(rate) = reply_rate(&record.metrics) {
                record.metrics.insert(METRIC_REPLY_RATE.to_string(), rate);
            }
        }
        Ok(())
    }

    async fn log_event(
        &self,
        key: &str,
        name: &str,
        metadata: serde_json::Value,
    ) -> Result<(), UpstreamError> {
        let mut experiments = self.experiments.write().await;
        let record = experiments
            .get_mut(key)
            .ok_or_else(|| UpstreamError::Missing {
                entity: "experiment",
                id: key.to_string(),
            })?;
        record.events.push(json!({ "name": name, "metadata": metadata }));
        Ok(())
    }

    async fn metrics(&self, key: &str) -> Result<Option<ExperimentMetrics>, UpstreamError> {
        Ok(self
            .experiments
            .read()
            .await
            .get(key)
            .map(|record| ExperimentMetrics::from_map(&record.metrics)))
    }

    fn dashboard_url(&self) -> String {
        format!("https://www.comet.ml/{}/{}", self.workspace, self.project)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Remote implementation
// ────────────────────────────────────────────────────────────────────────────

const COMET_BASE_URL: &str = "https://www.comet.ml/api/rest/v2";

pub struct RemoteTracker {
    client: Client,
    api_key: String,
    workspace: String,
    project: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateExperimentResponse {
    experiment_key: String,
}

#[derive(Debug, Deserialize)]
struct MetadataResponse {
    #[serde(default)]
    metrics: HashMap<String, f64>,
}

impl RemoteTracker {
    pub fn new(
        api_key: impl Into<String>,
        workspace: impl Into<String>,
        project: impl Into<String>,
    ) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            workspace: workspace.into(),
            project: project.into(),
        }
    }

    async fn write(&self, path: &str, body: serde_json::Value) -> Result<reqwest::Response, UpstreamError> {
        let response = self
            .client
            .post(format!("{COMET_BASE_URL}{path}"))
            .header("Authorization", &self.api_key)
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
        Ok(response)
    }

    async fn fetch_metrics(&self, key: &str) -> Result<HashMap<String, f64>, UpstreamError> {
        let response = self
            .client
            .get(format!("{COMET_BASE_URL}/experiment/metadata"))
            .header("Authorization", &self.api_key)
            .query(&[("experimentKey", key)])
            .send()
            .await?;

        let status = response.status();
        if status.as_u16() == 404 {
            return Ok(HashMap::new());
        }
        if !status.is_success() {
            return Err(UpstreamError::Api {
                status: status.as_u16(),
                message: response.text().await.unwrap_or_default(),
            });
        }

        let metadata: MetadataResponse = response.json().await?;
        Ok(metadata.metrics)
    }

    async fn post_metric(&self, key: &str, metric: &str, value: f64) -> Result<(), UpstreamError> {
        self.write(
            "/write/experiment/metric",
            json!({
                "experimentKey": key,
                "metricName": metric,
                "metricValue": value,
                "step": 0,
                "timestamp": chrono::Utc::now().timestamp_millis(),
            }),
        )
        .await?;
        Ok(())
    }
}

#[async_trait]
impl ExperimentTracker for RemoteTracker {
    async fn create_experiment(
        &self,
        name: &str,
        parameters: HashMap<String, String>,
    ) -> Result<String, UpstreamError> {
        let created: CreateExperimentResponse = self
            .write(
                "/write/experiment/create",
                json!({
                    "projectName": self.project,
                    "workspaceName": self.workspace,
                    "experimentName": name,
                }),
            )
            .await?
            .json()
            .await?;

        let parameter_list: Vec<serde_json::Value> = parameters
            .iter()
            .map(|(k, v)| json!({ "parameterName": k, "parameterValue": v }))
            .collect();
        self.write(
            "/write/experiment/parameter",
            json!({
                "experimentKey": created.experiment_key,
                "parameters": parameter_list,
            }),
        )
        .await?;

        debug!("created experiment {} ({name})", created.experiment_key);
        Ok(created.experiment_key)
    }

    async fn log_metric(&self, key: &str, metric: &str, value: f64) -> Result<(), UpstreamError> {
        self.post_metric(key, metric, value).await?;

        if matches!(metric, METRIC_MESSAGES_SENT | METRIC_REPLIES_RECEIVED) {
            let mut metrics = self.fetch_metrics(key).await?;
            metrics.insert(metric.to_string(), value);
            if let Some(rate) = reply_rate(&metrics) {
                self.post_metric(key, METRIC_REPLY_RATE, rate).await?;
            }
        }
        Ok(())
    }

    async fn log_event(
        &self,
        key: &str,
        name: &str,
        metadata: serde_json::Value,
    ) -> Result<(), UpstreamError> {
        let payload = json!({
            "type": "event",
            "name": name,
            "timestamp": chrono::Utc::now(),
            "metadata": metadata,
        });
        self.write(
            "/write/experiment/log-other",
            json!({
                "experimentKey": key,
                "logOtherData": payload.to_string(),
            }),
        )
        .await?;
        Ok(())
    }

    async fn metrics(&self, key: &str) -> Result<Option<ExperimentMetrics>, UpstreamError> {
        let metrics = self.fetch_metrics(key).await?;
        if metrics.is_empty() {
            return Ok(None);
        }
        Ok(Some(ExperimentMetrics::from_map(&metrics)))
    }

    fn dashboard_url(&self) -> String {
        format!("https://www.comet.ml/{}/{}", self.workspace, self.project)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MessageType, OutreachMessage, OutreachStatus};

    fn tracker() -> MemoryTracker {
        MemoryTracker::new("default", "connecto")
    }

    #[tokio::test]
    async fn reply_rate_recomputed_on_metric_log() {
        let t = tracker();
        let key = t.create_experiment("outreach_u1_professional", HashMap::new())
            .await
            .unwrap();

        t.log_metric(&key, METRIC_MESSAGES_SENT, 4.0).await.unwrap();
        t.log_metric(&key, METRIC_REPLIES_RECEIVED, 1.0).await.unwrap();

        let metrics = t.metrics(&key).await.unwrap().unwrap();
        assert_eq!(metrics.reply_rate, 25.0);
        assert_eq!(metrics.messages_sent, 4.0);
        assert_eq!(metrics.replies_received, 1.0);
    }

    #[tokio::test]
    async fn reply_rate_stays_zero_without_sent_messages() {
        let t = tracker();
        let key = t.create_experiment("e", HashMap::new()).await.unwrap();
        t.log_metric(&key, METRIC_REPLIES_RECEIVED, 2.0).await.unwrap();

        let metrics = t.metrics(&key).await.unwrap().unwrap();
        assert_eq!(metrics.reply_rate, 0.0);
    }

    #[tokio::test]
    async fn metric_log_on_unknown_experiment_is_missing() {
        let t = tracker();
        let result = t.log_metric("ghost", METRIC_MESSAGES_SENT, 1.0).await;
        assert!(matches!(result, Err(UpstreamError::Missing { .. })));
    }

    #[tokio::test]
    async fn track_outreach_creates_experiment_and_logs_event() {
        let t = tracker();
        let message = OutreachMessage {
            id: "msg_1".into(),
            user_id: "user_1".into(),
            connection_id: "conn_1".into(),
            message_type: MessageType::Email,
            subject: Some("Hello".into()),
            content: "body".into(),
            personalization_tokens: HashMap::from([
                ("recipientName".into(), "Sarah".into()),
                ("senderName".into(), "Ada".into()),
            ]),
            template: None,
            tone: "professional".into(),
            status: OutreachStatus::Draft,
            experiment_key: None,
            created_at: chrono::Utc::now(),
        };

        let key = t.track_outreach(&message).await.unwrap();
        assert_eq!(t.experiment_count().await, 1);
        assert_eq!(t.event_count(&key).await, 1);

        let metrics = t.metrics(&key).await.unwrap().unwrap();
        assert_eq!(metrics.messages_sent, 1.0);
    }

    #[tokio::test]
    async fn track_outreach_reuses_existing_experiment_key() {
        let t = tracker();
        let existing = t.create_experiment("e", HashMap::new()).await.unwrap();
        let message = OutreachMessage {
            id: "msg_2".into(),
            user_id: "user_1".into(),
            connection_id: "conn_1".into(),
            message_type: MessageType::Email,
            subject: None,
            content: "body".into(),
            personalization_tokens: HashMap::new(),
            template: None,
            tone: "friendly".into(),
            status: OutreachStatus::Draft,
            experiment_key: Some(existing.clone()),
            created_at: chrono::Utc::now(),
        };

        let key = t.track_outreach(&message).await.unwrap();
        assert_eq!(key, existing);
        assert_eq!(t.experiment_count().await, 1);
    }

    #[test]
    fn dashboard_url_includes_workspace_and_project() {
        let t = tracker();
        assert_eq!(t.dashboard_url(), "https://www.comet.ml/default/connecto");
    }
}
