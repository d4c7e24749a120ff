use axum::{
    extract::{Multipart, State},
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use std::collections::HashMap;
use tracing::info;

use crate::auth::Session;
use crate::errors::AppError;
use crate::models::{Interview, Preferences, ResumeMeta, UserProfile};
use crate::state::AppState;

/// GET /api/user/profile
pub async fn handle_get_profile(
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<UserProfile>, AppError> {
    let profile = state
        .relationships
        .get_user(&session.email)
        .await?
        .ok_or_else(|| AppError::NotFound("Profile not found".into()))?;
    Ok(Json(profile))
}

/// Partial profile update. Omitted fields are untouched; `preferences` is a
/// whole-section replace, which is how the client sends it.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub image: Option<String>,
    pub onboarding_completed: Option<bool>,
    pub preferences: Option<Preferences>,
}

/// PUT /api/user/profile
///
/// The profile must already exist (sign-in creates it); the update is applied
/// as a full-record replace in the Relationship Store.
pub async fn handle_update_profile(
    State(state): State<AppState>,
    session: Session,
    Json(update): Json<ProfileUpdate>,
) -> Result<Json<UserProfile>, AppError> {
    let mut profile = state
        .relationships
        .get_user(&session.email)
        .await?
        .ok_or_else(|| AppError::NotFound("User profile not found".into()))?;

    if let Some(name) = update.name {
        profile.name = name;
    }
    if let Some(image) = update.image {
        profile.image = Some(image);
    }
    if let Some(completed) = update.onboarding_completed {
        profile.onboarding_completed = completed;
    }
    if let Some(preferences) = update.preferences {
        profile.preferences = preferences;
    }
    profile.updated_at = Utc::now();

    state.relationships.put_user(&profile).await?;
    Ok(Json(profile))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OnboardingAnswers {
    #[serde(default)]
    career_goals: String,
    #[serde(default)]
    current_role: String,
    #[serde(default)]
    target_industries: Vec<String>,
    #[serde(default)]
    preferences: HashMap<String, serde_json::Value>,
}

/// POST /api/onboarding/complete (multipart)
///
/// Fields: optional `resume` file, required `answers` JSON string. The resume
/// is not parsed; its stored content is a "filename + size" summary string.
/// Creates the profile on first onboarding if sign-in did not.
pub async fn handle_onboarding(
    State(state): State<AppState>,
    session: Session,
    mut multipart: Multipart,
) -> Result<Json<serde_json::Value>, AppError> {
    let mut resume: Option<ResumeMeta> = None;
    let mut answers: Option<OnboardingAnswers> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart body: {e}")))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("resume") => {
                let file_name = field.file_name().unwrap_or("resume.pdf").to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("Invalid resume upload: {e}")))?;
                resume = Some(ResumeMeta {
                    content: format!("Resume uploaded: {file_name} ({} bytes)", bytes.len()),
                    file_name,
                    uploaded_at: Utc::now(),
                });
            }
            Some("answers") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::Validation(format!("Invalid answers field: {e}")))?;
                answers = Some(
                    serde_json::from_str(&text)
                        .map_err(|e| AppError::Validation(format!("Invalid answers JSON: {e}")))?,
                );
            }
            _ => {}
        }
    }

    let answers =
        answers.ok_or_else(|| AppError::Validation("Answers field required".into()))?;

    let mut profile = match state.relationships.get_user(&session.email).await? {
        Some(profile) => profile,
        None => UserProfile::new(session.email.clone(), session.email.clone()),
    };

    profile.onboarding_completed = true;
    if resume.is_some() {
        profile.resume = resume;
    }
    profile.interview = Some(Interview {
        career_goals: answers.career_goals,
        current_role: answers.current_role,
        target_industries: answers.target_industries,
        preferences: answers.preferences,
        completed_at: Utc::now(),
    });
    profile.updated_at = Utc::now();

    state.relationships.put_user(&profile).await?;
    info!("onboarding completed for {}", session.email);

    Ok(Json(json!({
        "success": true,
        "profile": profile,
    })))
}
