//! Shared fixtures for integration tests.

#![allow(dead_code)]

use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use politemall::{Config, Credentials, Endpoints};
use serde_json::{json, Value};
use wiremock::MockServer;

pub const SIGNING_KEY: &[u8] = b"test-signing-key";
pub const TENANT: &str = "746e9230-82d6-4d6b-bd68-5aa40aa19cce";

/// Brightspace-style JWT; the signing key is irrelevant since it is never verified.
pub fn brightspace_token(sub: &str) -> String {
    jwt(json!({ "sub": sub, "tenantid": TENANT }), b"not-our-key")
}

/// Session token signed with `key`.
pub fn session_token(sub: &str, key: &[u8]) -> String {
    jwt(json!({ "sub": sub }), key)
}

fn jwt(claims: Value, key: &[u8]) -> String {
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(key),
    )
    .unwrap()
}

/// Config whose site lives on the mock server.
pub fn config_for(server: &MockServer) -> Config {
    Config::new(SIGNING_KEY.to_vec()).with_endpoints(Endpoints::new(
        format!("{}/", server.uri()),
        "api.brightspace.test",
    ))
}

pub fn credentials(brightspace_sub: &str) -> Credentials {
    Credentials {
        subdomain: "nplms".into(),
        session_val: "session-value".into(),
        secure_session_val: "secure-session-value".into(),
        brightspace_token: brightspace_token(brightspace_sub),
        session_token: None,
        csrf_token: Some("csrf-value".into()),
    }
}
