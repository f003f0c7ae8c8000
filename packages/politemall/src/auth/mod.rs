//! The credential chain.
//!
//! Three credentials with different trust levels feed into a [`Session`](crate::Session):
//!
//! - the D2L session cookies, used as-is for the site API;
//! - the Brightspace JWT, whose signature we cannot check, so its claims are only
//!   hints until cross-validated;
//! - the POLITEShop session token, minted and HMAC-signed here once a user ID has
//!   been cross-validated, so later requests can skip the exchange.

pub mod brightspace;
pub mod resolver;
pub mod session_token;

pub use brightspace::{parse_brightspace_token, BrightspaceClaims};
pub use resolver::{CredentialResolver, Credentials, IssuedSessionToken, ResolvedSession};
pub use session_token::SessionTokenService;

/// A user ID whose provenance has been checked.
///
/// Only produced by verifying a session token or by cross-checking a freshly
/// exchanged Brightspace token, so holding one is proof of verification.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VerifiedUserId(String);

impl VerifiedUserId {
    pub(crate) fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl std::fmt::Display for VerifiedUserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for VerifiedUserId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
