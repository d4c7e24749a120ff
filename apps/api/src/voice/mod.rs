//! Voice/transcription adapter backed by the Telnyx v2 API.
//!
//! Only the operations the app actually exercises are wrapped: ephemeral
//! WebRTC credential tokens and one-shot transcription of an uploaded media
//! URL. There is no in-memory implementation — the token handler degrades to
//! a mock token on failure, transcription failures surface to the caller.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::stores::UpstreamError;

pub mod handlers;

const TELNYX_BASE_URL: &str = "https://api.telnyx.com/v2";
const TOKEN_TTL_SECONDS: i64 = 3600;

#[derive(Debug, Clone, Serialize)]
pub struct VoiceToken {
    pub token: String,
    pub expires_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transcription {
    pub text: String,
    pub confidence: f64,
}

#[async_trait]
pub trait VoiceProvider: Send + Sync {
    /// Mints an ephemeral telephony credential for a WebRTC session.
    async fn create_token(&self, session_name: &str) -> Result<VoiceToken, UpstreamError>;

    /// Transcribes audio already uploaded to a reachable media URL.
    async fn transcribe(&self, media_url: &str) -> Result<Transcription, UpstreamError>;
}

pub struct TelnyxVoice {
    client: Client,
    api_key: String,
    connection_id: String,
}

#[derive(Debug, Deserialize)]
struct TelnyxEnvelope<T> {
    data: T,
}

#[derive(Debug, Deserialize)]
struct CredentialData {
    token: String,
    expires_at: String,
}

#[derive(Debug, Deserialize)]
struct TranscriptionData {
    text: String,
    #[serde(default)]
    confidence: f64,
}

impl TelnyxVoice {
    pub fn new(api_key: impl Into<String>, connection_id: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            connection_id: connection_id.into(),
        }
    }

    async fn post<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        body: serde_json::Value,
    ) -> Result<T, UpstreamError> {
        let response = self
            .client
            .post(format!("{TELNYX_BASE_URL}{path}"))
            .bearer_auth(&self.api_key)
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

        let envelope: TelnyxEnvelope<T> = response.json().await?;
        Ok(envelope.data)
    }
}

#[async_trait]
impl VoiceProvider for TelnyxVoice {
    async fn create_token(&self, session_name: &str) -> Result<VoiceToken, UpstreamError> {
        let expires_at = (Utc::now() + Duration::seconds(TOKEN_TTL_SECONDS)).to_rfc3339();
        let credential: CredentialData = self
            .post(
                "/telephony_credentials",
                json!({
                    "connection_id": self.connection_id,
                    "name": session_name,
                    "expires_at": expires_at,
                }),
            )
            .await?;

        Ok(VoiceToken {
            token: credential.token,
            expires_at: credential.expires_at,
        })
    }

    async fn transcribe(&self, media_url: &str) -> Result<Transcription, UpstreamError> {
        let data: TranscriptionData = self
            .post(
                "/transcriptions",
                json!({
                    "media_url": media_url,
                    "language": "en",
                    "model": "default",
                }),
            )
            .await?;

        Ok(Transcription {
            text: data.text,
            confidence: data.confidence,
        })
    }
}
