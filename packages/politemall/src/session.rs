use async_trait::async_trait;
use siren::Entity;
use url::Url;

use crate::api::LmsApi;
use crate::auth::VerifiedUserId;
use crate::crawler::Crawler;
use crate::endpoints::Endpoints;
use crate::error::Result;
use crate::hypermedia::HypermediaClient;
use crate::site::SiteClient;
use crate::types::WhoAmI;

/// A fully authenticated, per-request view of one POLITEMall user.
///
/// Only [`CredentialResolver`](crate::auth::CredentialResolver) builds these, and
/// nothing mutates one afterwards, so it can be shared freely between the
/// concurrent fetches of a crawl.
#[derive(Debug, Clone)]
pub struct Session {
    site: SiteClient,
    hypermedia: HypermediaClient,
    tenant_id: String,
    subdomain: String,
    user_id: VerifiedUserId,
    endpoints: Endpoints,
}

impl Session {
    pub(crate) fn new(
        site: SiteClient,
        hypermedia: HypermediaClient,
        tenant_id: String,
        subdomain: String,
        user_id: VerifiedUserId,
        endpoints: Endpoints,
    ) -> Self {
        Self {
            site,
            hypermedia,
            tenant_id,
            subdomain,
            user_id,
            endpoints,
        }
    }

    pub fn user_id(&self) -> &VerifiedUserId {
        &self.user_id
    }

    /// Brightspace tenant, as claimed by the supplied bearer token.
    pub fn tenant_id(&self) -> &str {
        &self.tenant_id
    }

    pub fn subdomain(&self) -> &str {
        &self.subdomain
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    pub fn site(&self) -> &SiteClient {
        &self.site
    }

    pub fn hypermedia(&self) -> &HypermediaClient {
        &self.hypermedia
    }

    /// Crawler for this session's user and tenant.
    pub fn crawler(&self) -> Crawler<'_, Session> {
        Crawler::new(self, &self.endpoints, &self.tenant_id, &self.user_id)
    }
}

#[async_trait]
impl LmsApi for Session {
    fn site_url(&self) -> &Url {
        self.site.base_url()
    }

    async fn fetch_entity(&self, href: &str) -> Result<Entity> {
        self.hypermedia.fetch_entity(href).await
    }

    async fn who_am_i(&self) -> Result<WhoAmI> {
        self.site.who_am_i().await
    }
}
