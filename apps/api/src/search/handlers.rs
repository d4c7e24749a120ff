use axum::{extract::State, Json};
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use crate::auth::Session;
use crate::errors::AppError;
use crate::search::{analyzer, pipeline};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    pub query: String,
}

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    #[serde(default)]
    pub prompt: String,
}

/// POST /api/connections/search
///
/// Runs the full pipeline: analyze the query, source and persist candidates,
/// attach insights. Degraded steps (LLM down, Profile Store down) still yield
/// a usable result set.
pub async fn handle_search(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<SearchRequest>,
) -> Result<Json<pipeline::SearchOutcome>, AppError> {
    let user = state
        .relationships
        .get_user(&session.email)
        .await?
        .ok_or_else(|| AppError::NotFound("User profile not found".into()))?;

    info!("search for {}: {:?}", session.email, request.query);
    let outcome = pipeline::run_search(
        state.llm.as_ref(),
        state.profiles.as_ref(),
        &user,
        &request.query,
    )
    .await;

    Ok(Json(outcome))
}

/// POST /api/requests/analyze
///
/// Analyzes a request without running the search, and remembers the filters
/// in the user's preferences for follow-up suggestions.
pub async fn handle_analyze(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<AnalyzeRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    if request.prompt.is_empty() {
        return Err(AppError::Validation("Prompt required".into()));
    }

    let mut user = state
        .relationships
        .get_user(&session.email)
        .await?
        .ok_or_else(|| AppError::NotFound("User profile not found".into()))?;

    let analysis = analyzer::analyze_request(state.llm.as_ref(), &request.prompt, &user).await;

    user.preferences.last_search_filters = Some(analysis.clone());
    user.updated_at = chrono::Utc::now();
    state.relationships.put_user(&user).await?;

    Ok(Json(json!({
        "success": true,
        "analysis": analysis,
        "filters": analysis,
    })))
}
