mod auth;
mod config;
mod crm;
mod errors;
mod llm;
mod models;
mod outreach;
mod profiles;
mod routes;
mod search;
mod state;
mod stores;
#[cfg(test)]
mod testing;
mod users;
mod voice;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::llm::AnthropicClient;
use crate::routes::build_router;
use crate::state::AppState;
use crate::stores::{
    ExperimentTracker, MemoryProfileStore, MemoryRelationshipStore, MemoryTracker, ProfileStore,
    RelationshipStore, RemoteProfileStore, RemoteRelationshipStore, RemoteTracker,
};
use crate::voice::{TelnyxVoice, VoiceProvider};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting CONNECTO API v{}", env!("CARGO_PKG_VERSION"));

    let llm = Arc::new(AnthropicClient::new(config.anthropic_api_key.clone()));
    if config.anthropic_api_key.is_empty() {
        info!("ANTHROPIC_API_KEY not set: LLM calls will fail over to fallbacks");
    } else {
        info!("LLM client initialized (model: {})", llm::MODEL);
    }

    let profiles: Arc<dyn ProfileStore> = match &config.aperture {
        Some(aperture) => {
            info!("Profile store: remote ({}:{})", aperture.host, aperture.port);
            Arc::new(RemoteProfileStore::new(
                &aperture.host,
                aperture.port,
                &aperture.username,
                &aperture.password,
            ))
        }
        None => {
            info!("Profile store: in-memory (APERTURE_HOST not set)");
            Arc::new(MemoryProfileStore::new())
        }
    };

    let relationships: Arc<dyn RelationshipStore> = match &config.memverge {
        Some(memverge) => {
            info!("Relationship store: remote ({})", memverge.api_url);
            Arc::new(RemoteRelationshipStore::new(
                memverge.api_url.clone(),
                memverge.api_key.clone(),
            ))
        }
        None => {
            info!("Relationship store: in-memory (MEMVERGE_API_KEY not set)");
            Arc::new(MemoryRelationshipStore::new())
        }
    };

    let tracker: Arc<dyn ExperimentTracker> = match &config.comet_api_key {
        Some(api_key) => {
            info!(
                "Experiment tracker: remote ({}/{})",
                config.comet_workspace, config.comet_project
            );
            Arc::new(RemoteTracker::new(
                api_key.clone(),
                config.comet_workspace.clone(),
                config.comet_project.clone(),
            ))
        }
        None => {
            info!("Experiment tracker: in-memory (COMET_API_KEY not set)");
            Arc::new(MemoryTracker::new(
                config.comet_workspace.clone(),
                config.comet_project.clone(),
            ))
        }
    };

    let voice: Option<Arc<dyn VoiceProvider>> = match &config.telnyx {
        Some(telnyx) => {
            info!("Voice provider: Telnyx");
            Some(Arc::new(TelnyxVoice::new(
                telnyx.api_key.clone(),
                telnyx.connection_id.clone(),
            )))
        }
        None => {
            info!("Voice provider: none (mock tokens will be issued)");
            None
        }
    };

    let state = AppState {
        llm,
        profiles,
        relationships,
        tracker,
        voice,
        config: config.clone(),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: tighten CORS in production

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
