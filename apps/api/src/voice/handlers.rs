use axum::{extract::State, Json};
use chrono::{Duration, Utc};
use serde::Deserialize;
use serde_json::json;
use tracing::warn;

use crate::auth::Session;
use crate::errors::AppError;
use crate::state::AppState;
use crate::stores::UpstreamError;
use crate::voice::Transcription;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscribeRequest {
    pub media_url: String,
}

/// GET /api/voice/token
///
/// Mints an ephemeral WebRTC credential. An unconfigured or failing provider
/// degrades to a mock token so the voice UI keeps working in development.
pub async fn handle_token(
    State(state): State<AppState>,
    session: Session,
) -> Json<serde_json::Value> {
    if let Some(voice) = &state.voice {
        let session_name = format!("session_{}_{}", session.email, Utc::now().timestamp_millis());
        match voice.create_token(&session_name).await {
            Ok(token) => {
                return Json(json!({
                    "token": token.token,
                    "expires_at": token.expires_at,
                }));
            }
            Err(e) => warn!("voice token creation failed: {e}"),
        }
    }

    Json(json!({
        "token": format!("mock_token_{}", Utc::now().timestamp_millis()),
        "expires_at": (Utc::now() + Duration::hours(1)).to_rfc3339(),
        "mock": true,
    }))
}

/// POST /api/voice/transcribe
pub async fn handle_transcribe(
    State(state): State<AppState>,
    _session: Session,
    Json(request): Json<TranscribeRequest>,
) -> Result<Json<Transcription>, AppError> {
    if request.media_url.is_empty() {
        return Err(AppError::Validation("Media URL required".into()));
    }

    let voice = state
        .voice
        .as_ref()
        .ok_or(AppError::Upstream(UpstreamError::NotConfigured("telnyx")))?;

    let transcription = voice.transcribe(&request.media_url).await?;
    Ok(Json(transcription))
}
