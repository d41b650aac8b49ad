use anyhow::{ensure, Context, Result};
use axum_extra::extract::cookie::Key;
use std::env;

use crate::api::DEFAULT_API_URL;

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash-lite";

/// Secrets and model settings read from the environment.
///
/// `SECRET_KEY` and `GEMINI_API_KEY` are required; the process refuses to
/// start without them.
pub struct AppConfig {
    pub secret_key: String,
    pub api_key: String,
    pub model: String,
    pub api_url: String,
    pub system_prompt: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        let secret_key = env::var("SECRET_KEY")
            .context("SECRET_KEY must be set (cookie signing secret)")?;
        ensure!(
            secret_key.len() >= 32,
            "SECRET_KEY must be at least 32 bytes to derive a signing key"
        );

        let api_key =
            env::var("GEMINI_API_KEY").context("GEMINI_API_KEY must be set")?;

        let model = env::var("GEMINI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        let api_url = env::var("GEMINI_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        let system_prompt = env::var("SYSTEM_PROMPT").ok().filter(|s| !s.is_empty());

        Ok(Self {
            secret_key,
            api_key,
            model,
            api_url,
            system_prompt,
        })
    }

    /// Cookie signing key derived from the configured secret.
    pub fn cookie_key(&self) -> Key {
        Key::derive_from(self.secret_key.as_bytes())
    }
}
