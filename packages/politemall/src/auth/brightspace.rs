use jsonwebtoken::{decode, DecodingKey, Validation};
use serde_json::{Map, Value};

use crate::error::{PolitemallError, Result, TokenKind};

/// Claims read from a Brightspace JWT.
///
/// The signature is not verified, so `user_id` is only what the token claims.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrightspaceClaims {
    pub user_id: String,
    pub tenant_id: String,
}

/// Decode a Brightspace JWT without verifying it and pull out `sub` and `tenantid`.
pub fn parse_brightspace_token(token: &str) -> Result<BrightspaceClaims> {
    let mut validation = Validation::default();
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();

    let data = decode::<Map<String, Value>>(token, &DecodingKey::from_secret(&[]), &validation)
        .map_err(|e| PolitemallError::invalid_token(TokenKind::Brightspace, e.to_string()))?;
    let claims = data.claims;

    let tenant_id = match claims.get("tenantid") {
        Some(Value::String(tenant_id)) => tenant_id.clone(),
        Some(other) => {
            return Err(PolitemallError::invalid_token(
                TokenKind::Brightspace,
                format!("tenantid claim is {}", siren::json_type(other)),
            ))
        }
        None => {
            return Err(PolitemallError::invalid_token(
                TokenKind::Brightspace,
                "missing tenantid claim",
            ))
        }
    };

    let user_id = claims
        .get("sub")
        .and_then(Value::as_str)
        .filter(|sub| !sub.is_empty())
        .ok_or_else(|| PolitemallError::invalid_token(TokenKind::Brightspace, "missing sub claim"))?
        .to_string();

    Ok(BrightspaceClaims { user_id, tenant_id })
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use serde_json::json;

    fn token(claims: Value) -> String {
        // Signed with a key we never check against
        encode(&Header::default(), &claims, &EncodingKey::from_secret(b"brightspace")).unwrap()
    }

    #[test]
    fn test_parse_valid_token() {
        let claims = parse_brightspace_token(&token(json!({
            "sub": "490586",
            "tenantid": "746e9230-82d6-4d6b-bd68-5aa40aa19cce",
            "aud": "https://api.brightspace.com/auth/token",
            "exp": 1,
        })))
        .unwrap();

        assert_eq!(claims.user_id, "490586");
        assert_eq!(claims.tenant_id, "746e9230-82d6-4d6b-bd68-5aa40aa19cce");
    }

    #[test]
    fn test_missing_tenantid() {
        let err = parse_brightspace_token(&token(json!({ "sub": "u1" }))).unwrap_err();
        assert!(err.to_string().contains("missing tenantid claim"));
    }

    #[test]
    fn test_tenantid_wrong_type() {
        let err = parse_brightspace_token(&token(json!({ "sub": "u1", "tenantid": 42 }))).unwrap_err();
        assert!(err.to_string().contains("tenantid claim is a number"));
    }

    #[test]
    fn test_missing_or_empty_sub() {
        for claims in [json!({ "tenantid": "t" }), json!({ "sub": "", "tenantid": "t" })] {
            let err = parse_brightspace_token(&token(claims)).unwrap_err();
            assert!(err.to_string().contains("missing sub claim"));
        }
    }

    #[test]
    fn test_malformed_token() {
        let err = parse_brightspace_token("not-a-jwt").unwrap_err();
        assert!(matches!(
            err,
            PolitemallError::InvalidToken { kind: TokenKind::Brightspace, .. }
        ));
    }
}
