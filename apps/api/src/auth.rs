//! Bearer-token session auth.
//!
//! Tokens are `base64url(email) + "." + base64(sha256(email + ":" + secret))`.
//! There is no expiry or revocation — this stands in for a real identity
//! provider in the demo and is only as strong as `SESSION_SECRET`.

use axum::{extract::FromRequestParts, http::request::Parts};
use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use base64::Engine;
use sha2::{Digest, Sha256};

use crate::errors::AppError;
use crate::state::AppState;

/// The authenticated caller, extracted from the `Authorization: Bearer` header.
#[derive(Debug, Clone)]
pub struct Session {
    pub email: String,
}

/// Mints a session token for `email`. Used by the (client-side) sign-in flow
/// and by tests building authenticated requests.
pub fn issue_token(email: &str, secret: &str) -> String {
    format!(
        "{}.{}",
        URL_SAFE_NO_PAD.encode(email),
        signature(email, secret)
    )
}

fn signature(email: &str, secret: &str) -> String {
    let digest = Sha256::digest(format!("{email}:{secret}").as_bytes());
    STANDARD.encode(digest)
}

fn verify(token: &str, secret: &str) -> Option<String> {
    let (encoded_email, sig) = token.split_once('.')?;
    let email = String::from_utf8(URL_SAFE_NO_PAD.decode(encoded_email).ok()?).ok()?;
    if sig == signature(&email, secret) {
        Some(email)
    } else {
        None
    }
}

#[axum::async_trait]
impl FromRequestParts<AppState> for Session {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or(AppError::Unauthorized)?;

        let token = header
            .strip_prefix("Bearer ")
            .ok_or(AppError::Unauthorized)?;

        let email =
            verify(token, &state.config.session_secret).ok_or(AppError::Unauthorized)?;
        Ok(Session { email })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issued_token_verifies_with_same_secret() {
        let token = issue_token("ada@example.com", "secret-a");
        assert_eq!(
            verify(&token, "secret-a").as_deref(),
            Some("ada@example.com")
        );
    }

    #[test]
    fn token_rejects_wrong_secret() {
        let token = issue_token("ada@example.com", "secret-a");
        assert!(verify(&token, "secret-b").is_none());
    }

    #[test]
    fn tampered_email_segment_is_rejected() {
        let token = issue_token("ada@example.com", "secret-a");
        let (_, sig) = token.split_once('.').unwrap();
        let forged = format!("{}.{sig}", URL_SAFE_NO_PAD.encode("eve@example.com"));
        assert!(verify(&forged, "secret-a").is_none());
    }

    #[test]
    fn malformed_tokens_are_rejected() {
        assert!(verify("", "s").is_none());
        assert!(verify("no-dot-here", "s").is_none());
        assert!(verify("!!!.sig", "s").is_none());
    }
}
