use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
///
/// Only `PORT`/`RUST_LOG`/`SESSION_SECRET` have code defaults; every provider
/// section is optional and its absence selects the in-memory (or mock)
/// implementation at startup instead of failing. This keeps the demo runnable
/// with zero configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub session_secret: String,
    /// Empty string means "unconfigured": LLM calls fail fast and every call
    /// site applies its fallback.
    pub anthropic_api_key: String,
    pub aperture: Option<ApertureConfig>,
    pub memverge: Option<MemvergeConfig>,
    pub comet_api_key: Option<String>,
    pub comet_workspace: String,
    pub comet_project: String,
    pub telnyx: Option<TelnyxConfig>,
}

/// Profile Store (ApertureData) connection settings.
#[derive(Debug, Clone)]
pub struct ApertureConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
}

/// Relationship Store (MemVerge) connection settings.
#[derive(Debug, Clone)]
pub struct MemvergeConfig {
    pub api_url: String,
    pub api_key: String,
}

/// Telephony (Telnyx) credentials.
#[derive(Debug, Clone)]
pub struct TelnyxConfig {
    pub api_key: String,
    pub connection_id: String,
}

const DEFAULT_SESSION_SECRET: &str = "connecto-dev-secret";

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let aperture = optional_env("APERTURE_HOST")
            .map(|host| -> Result<ApertureConfig> {
                Ok(ApertureConfig {
                    host,
                    port: std::env::var("APERTURE_PORT")
                        .unwrap_or_else(|_| "55555".to_string())
                        .parse::<u16>()
                        .context("APERTURE_PORT must be a valid port number")?,
                    username: std::env::var("APERTURE_USERNAME")
                        .unwrap_or_else(|_| "admin".to_string()),
                    password: std::env::var("APERTURE_PASSWORD")
                        .unwrap_or_else(|_| "admin".to_string()),
                })
            })
            .transpose()?;

        let memverge = optional_env("MEMVERGE_API_KEY").map(|api_key| MemvergeConfig {
            api_url: std::env::var("MEMVERGE_API_URL")
                .unwrap_or_else(|_| "https://api.memverge.io".to_string()),
            api_key,
        });

        let telnyx = match (
            optional_env("TELNYX_API_KEY"),
            optional_env("TELNYX_CONNECTION_ID"),
        ) {
            (Some(api_key), Some(connection_id)) => Some(TelnyxConfig {
                api_key,
                connection_id,
            }),
            _ => None,
        };

        Ok(Config {
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            session_secret: std::env::var("SESSION_SECRET")
                .unwrap_or_else(|_| DEFAULT_SESSION_SECRET.to_string()),
            anthropic_api_key: std::env::var("ANTHROPIC_API_KEY").unwrap_or_default(),
            aperture,
            memverge,
            comet_api_key: optional_env("COMET_API_KEY"),
            comet_workspace: std::env::var("COMET_WORKSPACE")
                .unwrap_or_else(|_| "default".to_string()),
            comet_project: std::env::var("COMET_PROJECT_NAME")
                .unwrap_or_else(|_| "connecto".to_string()),
            telnyx,
        })
    }

    #[cfg(test)]
    pub fn for_tests() -> Self {
        Config {
            port: 0,
            rust_log: "info".to_string(),
            session_secret: "test-secret".to_string(),
            anthropic_api_key: String::new(),
            aperture: None,
            memverge: None,
            comet_api_key: None,
            comet_workspace: "default".to_string(),
            comet_project: "connecto".to_string(),
            telnyx: None,
        }
    }
}

/// Treats unset AND empty variables as absent.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}
