//! Brightspace hypermedia fetcher.

use reqwest::Client;
use siren::Entity;
use tracing::debug;
use url::Url;

use crate::error::{PolitemallError, Result};
use crate::http::{read_json, send};

/// Fetches Siren entities from `*.api.brightspace.com` with a bearer token.
#[derive(Clone)]
pub struct HypermediaClient {
    http: Client,
    token: String,
}

impl std::fmt::Debug for HypermediaClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HypermediaClient")
            .field("token", &"<redacted>")
            .finish()
    }
}

impl HypermediaClient {
    pub fn new(token: impl Into<String>) -> Self {
        Self::with_http_client(Client::new(), token)
    }

    /// Reuse an existing connection pool (e.g. the site client's).
    pub fn with_http_client(http: Client, token: impl Into<String>) -> Self {
        Self {
            http,
            token: token.into(),
        }
    }

    /// GET an absolute, fully-substituted URL and decode it as a Siren entity.
    pub async fn fetch_entity(&self, href: &str) -> Result<Entity> {
        let url = Url::parse(href).map_err(|source| PolitemallError::InvalidUrl {
            url: href.to_string(),
            source,
        })?;

        debug!(url = %url, "Fetching hypermedia entity");

        let request = self.http.get(url).bearer_auth(&self.token);
        let response = send(href, request).await?;
        read_json(href, response).await
    }
}
