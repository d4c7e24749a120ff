use axum::{extract::State, Json};
use serde_json::json;
use tracing::warn;

use crate::auth::Session;
use crate::errors::AppError;
use crate::models::{prefixed_id, ProfileRecord};
use crate::profiles::demo;
use crate::state::AppState;

/// POST /api/profiles/sync
///
/// Bulk-stores scraped profiles. The body is parsed by hand: a missing or
/// non-array `profiles` is a validation error, while a record the store
/// rejects only degrades that record to its client-supplied id.
pub async fn handle_sync(
    State(state): State<AppState>,
    _session: Session,
    Json(body): Json<serde_json::Value>,
) -> Result<Json<serde_json::Value>, AppError> {
    let raw_profiles = body
        .get("profiles")
        .and_then(|v| v.as_array())
        .ok_or_else(|| AppError::Validation("Invalid profiles array".into()))?;

    let mut profile_ids = Vec::with_capacity(raw_profiles.len());
    for raw in raw_profiles {
        let record: ProfileRecord = serde_json::from_value(raw.clone())
            .map_err(|e| AppError::Validation(format!("Invalid profile record: {e}")))?;

        match state.profiles.store(&record).await {
            Ok(id) => profile_ids.push(id),
            Err(e) => {
                warn!("failed to sync profile {}: {e}", record.name);
                profile_ids.push(if record.id.is_empty() {
                    prefixed_id("profile")
                } else {
                    record.id
                });
            }
        }
    }

    Ok(Json(json!({
        "success": true,
        "profileIds": profile_ids,
        "count": profile_ids.len(),
    })))
}

/// GET /api/profiles/demo
///
/// Hackathon host seed data for demo mode.
pub async fn handle_demo(_session: Session) -> Json<serde_json::Value> {
    Json(json!({ "profiles": demo::demo_profiles() }))
}
