use std::sync::Arc;

use crate::config::Config;
use crate::llm::Llm;
use crate::stores::{ExperimentTracker, ProfileStore, RelationshipStore};
use crate::voice::VoiceProvider;

/// Shared application state injected into all route handlers via Axum extractors.
///
/// Every external dependency sits behind a trait object so tests can swap in
/// in-memory stores and stub LLMs without touching the handlers.
#[derive(Clone)]
pub struct AppState {
    pub llm: Arc<dyn Llm>,
    pub profiles: Arc<dyn ProfileStore>,
    pub relationships: Arc<dyn RelationshipStore>,
    pub tracker: Arc<dyn ExperimentTracker>,
    /// `None` when Telnyx is unconfigured; the token handler serves a mock
    /// token and transcription reports the provider as unavailable.
    pub voice: Option<Arc<dyn VoiceProvider>>,
    pub config: Config,
}
