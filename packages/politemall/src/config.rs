use base64::{engine::general_purpose::STANDARD, Engine as _};
use dotenvy::dotenv;
use std::env;

use crate::endpoints::Endpoints;
use crate::error::{PolitemallError, Result};

/// Default lifetime of a freshly issued session token cookie.
pub const DEFAULT_SESSION_TOKEN_MAX_AGE_DAYS: i64 = 7;

/// Client configuration loaded from environment variables
#[derive(Clone)]
pub struct Config {
    /// Decoded HMAC key for session tokens
    pub signing_key: Vec<u8>,
    pub endpoints: Endpoints,
    pub session_token_max_age: chrono::Duration,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("signing_key", &"<redacted>")
            .field("endpoints", &self.endpoints)
            .field("session_token_max_age", &self.session_token_max_age)
            .finish()
    }
}

impl Config {
    /// Config with default endpoints and token lifetime.
    pub fn new(signing_key: Vec<u8>) -> Self {
        Self {
            signing_key,
            endpoints: Endpoints::default(),
            session_token_max_age: chrono::Duration::days(DEFAULT_SESSION_TOKEN_MAX_AGE_DAYS),
        }
    }

    pub fn with_endpoints(mut self, endpoints: Endpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    pub fn with_session_token_max_age(mut self, max_age: chrono::Duration) -> Self {
        self.session_token_max_age = max_age;
        self
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        let raw_key = env::var("SIGNING_KEY")
            .map_err(|_| PolitemallError::Config("SIGNING_KEY must be set".into()))?;
        let signing_key = decode_signing_key(&raw_key)?;

        let defaults = Endpoints::default();
        let endpoints = Endpoints::new(
            env::var("SITE_URL_TEMPLATE").unwrap_or_else(|_| defaults.site_url_template().to_string()),
            env::var("BRIGHTSPACE_DOMAIN").unwrap_or_else(|_| defaults.brightspace_domain().to_string()),
        );

        let max_age_days = match env::var("SESSION_TOKEN_MAX_AGE_DAYS") {
            Ok(days) => days.parse::<i64>().map_err(|_| {
                PolitemallError::Config("SESSION_TOKEN_MAX_AGE_DAYS must be a whole number".into())
            })?,
            Err(_) => DEFAULT_SESSION_TOKEN_MAX_AGE_DAYS,
        };

        Ok(Self::new(signing_key)
            .with_endpoints(endpoints)
            .with_session_token_max_age(chrono::Duration::days(max_age_days)))
    }
}

/// Decode the base64 signing key supplied out-of-band.
pub fn decode_signing_key(raw: &str) -> Result<Vec<u8>> {
    let key = STANDARD
        .decode(raw.trim())
        .map_err(|e| PolitemallError::Config(format!("SIGNING_KEY is not valid base64: {}", e)))?;

    if key.is_empty() {
        return Err(PolitemallError::Config("SIGNING_KEY is empty".into()));
    }
    Ok(key)
}
