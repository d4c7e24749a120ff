use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::json;

use crate::auth::Session;
use crate::errors::AppError;
use crate::outreach::pipeline;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    #[serde(default)]
    pub connection_ids: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct MessagesQuery {
    #[serde(default)]
    pub ids: String,
}

/// POST /api/outreach/generate
pub async fn handle_generate(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<GenerateRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    let user = state
        .relationships
        .get_user(&session.email)
        .await?
        .ok_or_else(|| AppError::NotFound("User profile not found".into()))?;

    let messages = pipeline::generate_for_connections(
        state.llm.as_ref(),
        state.profiles.as_ref(),
        state.relationships.as_ref(),
        state.tracker.as_ref(),
        &user,
        &request.connection_ids,
    )
    .await;

    let message_ids: Vec<&str> = messages.iter().map(|m| m.id.as_str()).collect();
    Ok(Json(json!({
        "success": true,
        "messageIds": message_ids,
        "messages": messages,
    })))
}

/// GET /api/outreach/messages?ids=a,b,c
///
/// Generated drafts are not persisted anywhere yet, so this returns mock
/// placeholders for the requested ids.
pub async fn handle_messages(
    State(_state): State<AppState>,
    _session: Session,
    Query(query): Query<MessagesQuery>,
) -> Json<serde_json::Value> {
    let messages: Vec<serde_json::Value> = query
        .ids
        .split(',')
        .filter(|id| !id.is_empty())
        .map(|id| {
            json!({
                "id": id,
                "subject": "Introduction and Networking Opportunity",
                "content": "Mock content...",
                "status": "draft",
            })
        })
        .collect();

    Json(json!({ "messages": messages }))
}

/// POST /api/outreach/bulk
///
/// The body is parsed by hand so a missing or non-array `tags` yields the
/// same "Tags array required" validation error the client already handles.
pub async fn handle_bulk(
    State(state): State<AppState>,
    session: Session,
    Json(body): Json<serde_json::Value>,
) -> Result<Json<serde_json::Value>, AppError> {
    let tags: Vec<String> = body
        .get("tags")
        .and_then(|v| v.as_array())
        .ok_or_else(|| AppError::Validation("Tags array required".into()))?
        .iter()
        .filter_map(|v| v.as_str().map(str::to_string))
        .collect();

    let user = state
        .relationships
        .get_user(&session.email)
        .await?
        .ok_or_else(|| AppError::NotFound("User profile not found".into()))?;

    let outcome = pipeline::bulk_outreach(
        state.llm.as_ref(),
        state.relationships.as_ref(),
        state.tracker.as_ref(),
        &user,
        &tags,
    )
    .await?;

    if outcome.count == 0 {
        return Ok(Json(json!({
            "success": true,
            "message": "No connections found with specified tags",
            "count": 0,
        })));
    }

    Ok(Json(json!({
        "success": true,
        "count": outcome.count,
        "experimentKey": outcome.experiment_key,
        "messages": outcome.messages,
    })))
}

/// GET /api/metrics
///
/// Demo numbers. Real aggregation across experiments is a follow-up once the
/// tracker exposes a listing API.
pub async fn handle_metrics(
    State(state): State<AppState>,
    _session: Session,
) -> Json<serde_json::Value> {
    Json(json!({
        "metrics": {
            "messagesSent": 12,
            "repliesReceived": 5,
            "replyRate": 41.7,
            "averageResponseTime": 48,
            "dashboardUrl": state.tracker.dashboard_url(),
        }
    }))
}
