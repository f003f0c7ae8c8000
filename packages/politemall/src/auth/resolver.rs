use chrono::{DateTime, Utc};
use tracing::{info, warn};

use super::brightspace::{parse_brightspace_token, BrightspaceClaims};
use super::session_token::SessionTokenService;
use super::VerifiedUserId;
use crate::config::Config;
use crate::endpoints::Endpoints;
use crate::error::{PolitemallError, Result};
use crate::hypermedia::HypermediaClient;
use crate::session::Session;
use crate::site::SiteClient;

/// Raw credentials as they arrive with an end-user request.
#[derive(Clone, Default)]
pub struct Credentials {
    /// POLITEMall subdomain, e.g. `nplms`
    pub subdomain: String,
    /// `d2lSessionVal` cookie
    pub session_val: String,
    /// `d2lSecureSessionVal` cookie
    pub secure_session_val: String,
    /// Brightspace JWT as supplied by the client (unverified)
    pub brightspace_token: String,
    /// Previously issued POLITEShop session token
    pub session_token: Option<String>,
    /// CSRF token for the first-login token exchange
    pub csrf_token: Option<String>,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("subdomain", &self.subdomain)
            .field("session_token", &self.session_token.as_ref().map(|_| "<redacted>"))
            .field("csrf_token", &self.csrf_token.as_ref().map(|_| "<redacted>"))
            .finish_non_exhaustive()
    }
}

/// A session token minted during bootstrap, for the caller to persist (e.g. as a cookie).
#[derive(Clone, PartialEq, Eq)]
pub struct IssuedSessionToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub max_age: chrono::Duration,
}

impl std::fmt::Debug for IssuedSessionToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IssuedSessionToken")
            .field("token", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

#[derive(Debug)]
pub struct ResolvedSession {
    pub session: Session,
    /// Set only when the bootstrap path ran
    pub issued_token: Option<IssuedSessionToken>,
}

/// Turns [`Credentials`] into a [`Session`] with a verified user ID.
#[derive(Clone)]
pub struct CredentialResolver {
    tokens: SessionTokenService,
    endpoints: Endpoints,
    token_max_age: chrono::Duration,
}

impl CredentialResolver {
    pub fn new(config: &Config) -> Self {
        Self {
            tokens: SessionTokenService::new(&config.signing_key),
            endpoints: config.endpoints.clone(),
            token_max_age: config.session_token_max_age,
        }
    }

    pub async fn resolve(&self, credentials: &Credentials) -> Result<ResolvedSession> {
        // Site API: session cookies scoped to the subdomain
        let site_base = self.endpoints.site_base_url(&credentials.subdomain)?;
        let site = SiteClient::new(
            site_base,
            &credentials.session_val,
            &credentials.secure_session_val,
        )?;

        // Hypermedia API: claims are hints until cross-validated below
        let supplied = parse_brightspace_token(&credentials.brightspace_token)?;

        let session_token = credentials
            .session_token
            .as_deref()
            .filter(|token| !token.is_empty());

        let (user_id, issued_token) = match session_token {
            Some(token) => {
                let user_id = self.tokens.verify(token)?;
                info!(user_id = %user_id, "Resolved session from session token");
                (user_id, None)
            }
            None => {
                let csrf_token = credentials
                    .csrf_token
                    .as_deref()
                    .filter(|token| !token.is_empty())
                    .ok_or(PolitemallError::MissingCredential("CSRF token"))?;

                let user_id = self.bootstrap(&site, &supplied, csrf_token).await?;
                let issued = self.issue(&user_id)?;
                info!(user_id = %user_id, "Resolved session via token exchange, issued session token");
                (user_id, Some(issued))
            }
        };

        let hypermedia =
            HypermediaClient::with_http_client(site.http_client(), credentials.brightspace_token.clone());

        let session = Session::new(
            site,
            hypermedia,
            supplied.tenant_id,
            credentials.subdomain.clone(),
            user_id,
            self.endpoints.clone(),
        );

        Ok(ResolvedSession {
            session,
            issued_token,
        })
    }

    /// Exchange the CSRF token for a fresh Brightspace JWT and require it to name
    /// the same user as the one the caller supplied.
    async fn bootstrap(
        &self,
        site: &SiteClient,
        supplied: &BrightspaceClaims,
        csrf_token: &str,
    ) -> Result<VerifiedUserId> {
        let fresh_token = site.exchange_csrf_token(csrf_token).await?;
        let fresh = parse_brightspace_token(&fresh_token)?;

        if fresh.user_id != supplied.user_id {
            warn!(
                supplied = %supplied.user_id,
                exchanged = %fresh.user_id,
                "Brightspace token subject does not match exchanged token, possible impersonation"
            );
            return Err(PolitemallError::IdentityMismatch {
                supplied: supplied.user_id.clone(),
                exchanged: fresh.user_id,
            });
        }

        Ok(VerifiedUserId::new(fresh.user_id))
    }

    fn issue(&self, user_id: &VerifiedUserId) -> Result<IssuedSessionToken> {
        Ok(IssuedSessionToken {
            token: self.tokens.mint(user_id)?,
            expires_at: Utc::now() + self.token_max_age,
            max_age: self.token_max_age,
        })
    }
}
