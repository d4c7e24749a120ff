//! Test doubles and fixtures shared across unit and router tests.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::auth;
use crate::config::Config;
use crate::llm::{Llm, LlmError};
use crate::models::{Interview, UserProfile};
use crate::state::AppState;
use crate::stores::{
    MemoryProfileStore, MemoryRelationshipStore, MemoryTracker, UpstreamError,
};
use crate::voice::{Transcription, VoiceProvider, VoiceToken};

/// Scripted LLM: returns queued responses in order, then `EmptyContent`.
pub struct StubLlm {
    responses: Mutex<VecDeque<String>>,
}

impl StubLlm {
    pub fn with_responses<I, S>(responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            responses: Mutex::new(responses.into_iter().map(Into::into).collect()),
        }
    }

    pub fn empty() -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
        }
    }
}

#[async_trait]
impl Llm for StubLlm {
    async fn complete(&self, _system: &str, _prompt: &str) -> Result<String, LlmError> {
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or(LlmError::EmptyContent)
    }
}

/// LLM that always fails, for exercising fallback paths.
pub struct FailingLlm;

#[async_trait]
impl Llm for FailingLlm {
    async fn complete(&self, _system: &str, _prompt: &str) -> Result<String, LlmError> {
        Err(LlmError::Api {
            status: 500,
            message: "stub failure".into(),
        })
    }
}

/// Voice provider that always fails, for exercising the mock-token fallback.
pub struct FailingVoice;

#[async_trait]
impl VoiceProvider for FailingVoice {
    async fn create_token(&self, _session_name: &str) -> Result<VoiceToken, UpstreamError> {
        Err(UpstreamError::Api {
            status: 500,
            message: "stub failure".into(),
        })
    }

    async fn transcribe(&self, _media_url: &str) -> Result<Transcription, UpstreamError> {
        Err(UpstreamError::Api {
            status: 500,
            message: "stub failure".into(),
        })
    }
}

/// A user who has been through onboarding.
pub fn test_user(email: &str) -> UserProfile {
    let mut profile = UserProfile::new(email, "Ada Lovelace");
    profile.onboarding_completed = true;
    profile.interview = Some(Interview {
        career_goals: "Break into venture capital".into(),
        current_role: "Software Engineer".into(),
        target_industries: vec!["Gaming".into(), "Fintech".into()],
        preferences: HashMap::new(),
        completed_at: chrono::Utc::now(),
    });
    profile
}

/// AppState wired entirely to in-memory stores and the given LLM.
pub fn memory_state(llm: Arc<dyn Llm>) -> AppState {
    let config = Config::for_tests();
    AppState {
        llm,
        profiles: Arc::new(MemoryProfileStore::new()),
        relationships: Arc::new(MemoryRelationshipStore::new()),
        tracker: Arc::new(MemoryTracker::new(
            &config.comet_workspace,
            &config.comet_project,
        )),
        voice: None,
        config,
    }
}

/// `Authorization` header value for `email`, signed with the test secret.
pub fn auth_header(email: &str) -> String {
    format!("Bearer {}", auth::issue_token(email, "test-secret"))
}
