use axum::{extract::State, Json};
use serde_json::json;
use tracing::warn;

use crate::auth::Session;
use crate::errors::AppError;
use crate::state::AppState;
use crate::stores::ConnectionFilter;

/// GET /api/crm/connections
///
/// A Relationship Store outage degrades to an empty list rather than a 500;
/// the dashboard stays usable.
pub async fn handle_connections(
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<serde_json::Value>, AppError> {
    let user = state
        .relationships
        .get_user(&session.email)
        .await?
        .ok_or_else(|| AppError::NotFound("User profile not found".into()))?;

    let connections = match state
        .relationships
        .list_connections(&user.id, &ConnectionFilter::default())
        .await
    {
        Ok(connections) => connections,
        Err(e) => {
            warn!("failed to list connections for {}: {e}", user.id);
            Vec::new()
        }
    };

    Ok(Json(json!({ "connections": connections })))
}
