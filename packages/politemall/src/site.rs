//! Client for the POLITEMall site API (`*.polite.edu.sg`).
//!
//! Authenticates with the D2L session cookies, which are scoped to the site
//! base URL and never sent anywhere else.

use reqwest::{cookie::Jar, Client};
use std::sync::Arc;
use tracing::debug;
use url::Url;

use crate::error::{PolitemallError, Result};
use crate::http::{read_json, send};
use crate::types::{ExchangedToken, WhoAmI};

const SESSION_COOKIE: &str = "d2lSessionVal";
const SECURE_SESSION_COOKIE: &str = "d2lSecureSessionVal";

const WHO_AM_I_PATH: &str = "d2l/api/lp/1.0/users/whoami";
const TOKEN_EXCHANGE_PATH: &str = "d2l/lp/auth/oauth2/token";
/// Scope requested from the token exchange; grants every Brightspace API.
const TOKEN_SCOPE: &str = "*:*:*";

#[derive(Clone)]
pub struct SiteClient {
    http: Client,
    base_url: Url,
}

impl std::fmt::Debug for SiteClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SiteClient")
            .field("base_url", &self.base_url.as_str())
            .finish()
    }
}

impl SiteClient {
    /// Create a client whose cookie jar holds the two D2L session cookies for `base_url`.
    pub fn new(base_url: Url, session_val: &str, secure_session_val: &str) -> Result<Self> {
        let jar = Arc::new(Jar::default());
        for (name, value) in [
            (SESSION_COOKIE, session_val),
            (SECURE_SESSION_COOKIE, secure_session_val),
        ] {
            validate_cookie_value(name, value)?;
            jar.add_cookie_str(&format!("{}={}", name, value), &base_url);
        }

        let http = Client::builder()
            .cookie_provider(jar)
            .build()
            .map_err(PolitemallError::Client)?;

        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The underlying connection pool, shared with the hypermedia client.
    pub fn http_client(&self) -> Client {
        self.http.clone()
    }

    /// `GET /d2l/api/lp/1.0/users/whoami`
    pub async fn who_am_i(&self) -> Result<WhoAmI> {
        let url = self.url(WHO_AM_I_PATH)?;
        debug!(url = %url, "Fetching whoami");

        let response = send(url.as_str(), self.http.get(url.clone())).await?;
        read_json(url.as_str(), response).await
    }

    /// `POST /d2l/lp/auth/oauth2/token`
    ///
    /// Exchanges the session cookies plus a CSRF token for a fresh Brightspace JWT.
    pub async fn exchange_csrf_token(&self, csrf_token: &str) -> Result<String> {
        let url = self.url(TOKEN_EXCHANGE_PATH)?;
        debug!(url = %url, "Exchanging CSRF token for a Brightspace token");

        let request = self
            .http
            .post(url.clone())
            .header("X-Csrf-Token", csrf_token)
            .form(&[("scope", TOKEN_SCOPE)]);
        let response = send(url.as_str(), request).await?;
        let token: ExchangedToken = read_json(url.as_str(), response).await?;

        Ok(token.access_token)
    }

    fn url(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|source| PolitemallError::InvalidUrl {
                url: path.to_string(),
                source,
            })
    }
}

// A value with `;` would smuggle cookie attributes (Domain, Path) into the jar.
fn validate_cookie_value(name: &'static str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(PolitemallError::MissingCredential(name));
    }
    let malformed = value
        .chars()
        .any(|c| c == ';' || c == ',' || c == '"' || c == '\\' || c.is_whitespace() || c.is_control());
    if malformed {
        return Err(PolitemallError::MalformedCredential(name));
    }
    Ok(())
}
