//! Typed errors for the POLITEMall client.
//!
//! Every failure the crawler or the credential chain can hit is one variant here,
//! carrying enough context (URL, document, token) to tell which element was at
//! fault. Nothing in this crate retries on any of them.

use siren::SirenError;
use thiserror::Error;

/// Result type alias for POLITEMall operations.
pub type Result<T> = std::result::Result<T, PolitemallError>;

/// Which token a token error is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Externally issued Brightspace bearer token (unverified)
    Brightspace,
    /// Locally minted POLITEShop session token
    Session,
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenKind::Brightspace => f.write_str("Brightspace token"),
            TokenKind::Session => f.write_str("session token"),
        }
    }
}

#[derive(Debug, Error)]
pub enum PolitemallError {
    /// No response was received (connection refused, DNS, TLS, body read)
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Upstream answered with a non-2xx status
    #[error("request to {url} failed with status {status} {reason}")]
    Status {
        url: String,
        status: u16,
        reason: String,
    },

    /// Response body could not be decoded
    #[error("malformed response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid URL {url:?}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// A required link, property, action or href was absent from a document
    #[error("{context}: {source}")]
    Document {
        context: String,
        #[source]
        source: SirenError,
    },

    #[error("cannot extract ID from {href:?}: {reason}")]
    InvalidId { href: String, reason: &'static str },

    #[error("invalid site subdomain {subdomain:?}")]
    InvalidSubdomain { subdomain: String },

    #[error("invalid {kind}: {reason}")]
    InvalidToken { kind: TokenKind, reason: String },

    #[error("missing credential: {0}")]
    MissingCredential(&'static str),

    #[error("malformed credential: {0}")]
    MalformedCredential(&'static str),

    /// The caller's bearer token names a different user than the freshly exchanged one
    #[error("user ID mismatch between supplied and exchanged Brightspace tokens")]
    IdentityMismatch { supplied: String, exchanged: String },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    /// Persistence collaborator failed
    #[error("store error: {0}")]
    Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Coarse classification for the HTTP layer that sits on top of this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Credentials are missing, malformed, forged or the server is misconfigured
    Authentication,
    /// POLITEMall / Brightspace misbehaved or changed shape
    Upstream,
    Internal,
}

impl PolitemallError {
    pub fn class(&self) -> ErrorClass {
        match self {
            PolitemallError::InvalidSubdomain { .. }
            | PolitemallError::InvalidToken { .. }
            | PolitemallError::MissingCredential(_)
            | PolitemallError::MalformedCredential(_)
            | PolitemallError::IdentityMismatch { .. }
            | PolitemallError::Config(_) => ErrorClass::Authentication,

            PolitemallError::Transport { .. }
            | PolitemallError::Status { .. }
            | PolitemallError::Decode { .. }
            | PolitemallError::InvalidUrl { .. }
            | PolitemallError::Document { .. }
            | PolitemallError::InvalidId { .. } => ErrorClass::Upstream,

            PolitemallError::Client(_) | PolitemallError::Store(_) => ErrorClass::Internal,
        }
    }

    pub(crate) fn invalid_token(kind: TokenKind, reason: impl Into<String>) -> Self {
        PolitemallError::InvalidToken {
            kind,
            reason: reason.into(),
        }
    }
}

/// Attaches the name of the document being parsed to a [`SirenError`].
pub(crate) trait DocumentContext<T> {
    fn in_document(self, context: &str) -> Result<T>;
}

impl<T> DocumentContext<T> for std::result::Result<T, SirenError> {
    fn in_document(self, context: &str) -> Result<T> {
        self.map_err(|source| PolitemallError::Document {
            context: context.to_string(),
            source,
        })
    }
}
