pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::state::AppState;
use crate::{crm, outreach, profiles, search, users, voice};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Profile Store
        .route("/api/profiles/sync", post(profiles::handlers::handle_sync))
        .route("/api/profiles/demo", get(profiles::handlers::handle_demo))
        // Search
        .route(
            "/api/connections/search",
            post(search::handlers::handle_search),
        )
        .route("/api/requests/analyze", post(search::handlers::handle_analyze))
        // Outreach
        .route(
            "/api/outreach/generate",
            post(outreach::handlers::handle_generate),
        )
        .route(
            "/api/outreach/messages",
            get(outreach::handlers::handle_messages),
        )
        .route("/api/outreach/bulk", post(outreach::handlers::handle_bulk))
        .route("/api/metrics", get(outreach::handlers::handle_metrics))
        // CRM
        .route("/api/crm/connections", get(crm::handlers::handle_connections))
        // User profile + onboarding
        .route(
            "/api/user/profile",
            get(users::handlers::handle_get_profile).put(users::handlers::handle_update_profile),
        )
        .route(
            "/api/onboarding/complete",
            post(users::handlers::handle_onboarding),
        )
        // Voice
        .route("/api/voice/token", get(voice::handlers::handle_token))
        .route(
            "/api/voice/transcribe",
            post(voice::handlers::handle_transcribe),
        )
        .with_state(state)
}
