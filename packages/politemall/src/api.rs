use async_trait::async_trait;
use siren::Entity;
use url::Url;

use crate::error::Result;
use crate::types::WhoAmI;

/// Network access needed by the crawler (to allow mocking)
#[async_trait]
pub trait LmsApi: Send + Sync {
    /// Base URL of the POLITEMall site.
    fn site_url(&self) -> &Url;

    /// Fetch one hypermedia entity by absolute URL.
    async fn fetch_entity(&self, href: &str) -> Result<Entity>;

    /// Basic profile of the user the site cookies belong to.
    async fn who_am_i(&self) -> Result<WhoAmI>;
}
