//! POLITEMall Client
//!
//! Authenticates against POLITEMall (a D2L Brightspace deployment) and rebuilds
//! the academic hierarchy (school, user, semesters, modules, units, lessons,
//! activities) by crawling Brightspace's Siren hypermedia API.
//!
//! # Usage
//!
//! ```rust,ignore
//! use politemall::{Config, CredentialResolver, Credentials, MemoryStore};
//!
//! let config = Config::from_env()?;
//! let resolver = CredentialResolver::new(&config);
//!
//! let resolved = resolver.resolve(&credentials).await?;
//! if let Some(issued) = &resolved.issued_token {
//!     // hand issued.token back to the caller for next time
//! }
//!
//! let store = MemoryStore::new();
//! let report = politemall::sync_user(resolved.session.crawler(), &store).await?;
//! ```
//!
//! # Modules
//!
//! - [`auth`] - Credential chain: Brightspace JWT, session tokens, resolver
//! - [`crawler`] - Hypermedia graph → domain records
//! - [`store`] - Persistence seam and an in-memory store
//! - [`sync`] - Crawl-and-store flows

pub mod api;
pub mod auth;
pub mod config;
pub mod crawler;
pub mod endpoints;
pub mod error;
mod http;
pub mod hypermedia;
pub mod session;
pub mod site;
pub mod store;
pub mod sync;
pub mod types;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use api::LmsApi;
pub use auth::{
    parse_brightspace_token, BrightspaceClaims, CredentialResolver, Credentials,
    IssuedSessionToken, ResolvedSession, SessionTokenService, VerifiedUserId,
};
pub use config::Config;
pub use crawler::{Crawler, SemesterListing};
pub use endpoints::Endpoints;
pub use error::{ErrorClass, PolitemallError, Result, TokenKind};
pub use hypermedia::HypermediaClient;
pub use session::Session;
pub use site::SiteClient;
pub use store::{MemoryStore, Store};
pub use sync::{ensure_user_synced, module_units, sync_user, SyncReport};
pub use types::{Activity, Lesson, Module, School, Semester, Unit, User, WhoAmI};

// Re-export the hypermedia model
pub use siren;
