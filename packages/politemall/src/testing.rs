//! Testing utilities.
//!
//! [`MockApi`] serves canned Siren documents by URL so crawler logic can be
//! exercised without a network.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use serde_json::Value;
use siren::Entity;
use url::Url;

use crate::api::LmsApi;
use crate::error::{PolitemallError, Result};
use crate::types::WhoAmI;

/// Record of a call made to the mock API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockApiCall {
    FetchEntity { href: String },
    WhoAmI,
}

/// A mock [`LmsApi`] for testing.
///
/// Unknown URLs answer `404 Not Found`, the same as an unreachable document.
pub struct MockApi {
    site_url: Url,
    entities: Arc<RwLock<HashMap<String, Entity>>>,
    failures: Arc<RwLock<HashMap<String, u16>>>,
    who_am_i: Arc<RwLock<Option<WhoAmI>>>,
    calls: Arc<RwLock<Vec<MockApiCall>>>,
}

impl MockApi {
    pub fn new(site_url: Url) -> Self {
        Self {
            site_url,
            entities: Default::default(),
            failures: Default::default(),
            who_am_i: Default::default(),
            calls: Default::default(),
        }
    }

    /// Serve `document` (any Siren JSON) at `href`.
    ///
    /// Panics if `document` is not a valid entity.
    pub fn with_entity(self, href: impl Into<String>, document: Value) -> Self {
        let entity: Entity = serde_json::from_value(document).expect("invalid mock entity");
        self.entities.write().unwrap().insert(href.into(), entity);
        self
    }

    /// Make `href` fail with the given HTTP status.
    pub fn with_status(self, href: impl Into<String>, status: u16) -> Self {
        self.failures.write().unwrap().insert(href.into(), status);
        self
    }

    pub fn with_who_am_i(self, who_am_i: WhoAmI) -> Self {
        *self.who_am_i.write().unwrap() = Some(who_am_i);
        self
    }

    /// Get all calls made to this mock.
    pub fn calls(&self) -> Vec<MockApiCall> {
        self.calls.read().unwrap().clone()
    }

    /// Number of entity fetches made so far.
    pub fn fetch_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, MockApiCall::FetchEntity { .. }))
            .count()
    }
}

fn status_error(url: &str, status: u16) -> PolitemallError {
    let reason = reqwest::StatusCode::from_u16(status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .unwrap_or_default();
    PolitemallError::Status {
        url: url.to_string(),
        status,
        reason: reason.to_string(),
    }
}

#[async_trait]
impl LmsApi for MockApi {
    fn site_url(&self) -> &Url {
        &self.site_url
    }

    async fn fetch_entity(&self, href: &str) -> Result<Entity> {
        self.calls.write().unwrap().push(MockApiCall::FetchEntity {
            href: href.to_string(),
        });

        if let Some(status) = self.failures.read().unwrap().get(href) {
            return Err(status_error(href, *status));
        }

        self.entities
            .read()
            .unwrap()
            .get(href)
            .cloned()
            .ok_or_else(|| status_error(href, 404))
    }

    async fn who_am_i(&self) -> Result<WhoAmI> {
        self.calls.write().unwrap().push(MockApiCall::WhoAmI);

        let url = format!("{}d2l/api/lp/1.0/users/whoami", self.site_url);
        self.who_am_i
            .read()
            .unwrap()
            .clone()
            .ok_or_else(|| status_error(&url, 404))
    }
}
