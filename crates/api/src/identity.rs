//! External identity-provider bridge.
//!
//! The mobile client signs users in against a hosted identity service
//! and hands the resulting ID token to the API, which verifies it and
//! reconciles the provider account with a local user row.
//!
//! This module contains only configuration and claim handling. The DB
//! reconciliation lives in the server's auth routes.

use serde::{Deserialize, Serialize};

use crate::ServiceError;

/// Identity-provider configuration, loaded from environment variables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityProviderConfig {
    /// Expected `iss` claim.
    pub issuer: String,
    /// Expected `aud` claim (the provider project id).
    pub audience: String,
    /// HS256 shared secret used to verify ID-token signatures.
    #[serde(skip_serializing)]
    pub secret: String,
}

impl IdentityProviderConfig {
    /// A provider with an empty secret is treated as not configured.
    pub fn is_configured(&self) -> bool {
        !self.secret.is_empty()
    }
}

/// Normalized identity extracted from a verified ID token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderClaims {
    /// Provider-side stable user id (`sub`).
    pub uid: String,
    pub email: String,
    pub name: Option<String>,
}

/// Check issuer/audience and pull the identity claims out of a decoded
/// token payload. Signature and expiry are the caller's business.
pub fn extract_claims(
    payload: &serde_json::Value,
    config: &IdentityProviderConfig,
) -> Result<ProviderClaims, ServiceError> {
    let iss = payload["iss"].as_str().unwrap_or_default();
    if iss != config.issuer {
        return Err(ServiceError::Unauthorized(format!(
            "unexpected token issuer '{iss}'"
        )));
    }

    let aud = payload["aud"].as_str().unwrap_or_default();
    if aud != config.audience {
        return Err(ServiceError::Unauthorized(
            "token audience mismatch".into(),
        ));
    }

    let uid = payload["sub"]
        .as_str()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ServiceError::Unauthorized("missing sub claim".into()))?
        .to_string();

    let email = payload["email"]
        .as_str()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ServiceError::BadRequest("token carries no email".into()))?
        .to_lowercase();

    let name = payload["name"].as_str().map(str::to_string);

    Ok(ProviderClaims { uid, email, name })
}

/// Verify an ID token end to end: signature, expiry, issuer, audience.
#[cfg(feature = "backend")]
pub fn verify_id_token(
    token: &str,
    config: &IdentityProviderConfig,
    now_unix: u64,
) -> Result<ProviderClaims, ServiceError> {
    if !config.is_configured() {
        return Err(ServiceError::Unauthorized(
            "identity provider not configured".into(),
        ));
    }
    let payload = crate::crypto::decode_jwt(token, &config.secret, now_unix)?;
    extract_claims(&payload, config)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> IdentityProviderConfig {
        IdentityProviderConfig {
            issuer: "https://id.trailpack.app".into(),
            audience: "trailpack-prod".into(),
            secret: "idp-secret".into(),
        }
    }

    fn claims() -> serde_json::Value {
        serde_json::json!({
            "iss": "https://id.trailpack.app",
            "aud": "trailpack-prod",
            "sub": "provider-uid-1",
            "email": "Hiker@Example.com",
            "name": "Hiker",
            "iat": 1_000,
            "exp": 2_000,
        })
    }

    #[test]
    fn extract_normalizes_email_to_lowercase() {
        let c = extract_claims(&claims(), &config()).unwrap();
        assert_eq!(c.uid, "provider-uid-1");
        assert_eq!(c.email, "hiker@example.com");
        assert_eq!(c.name.as_deref(), Some("Hiker"));
    }

    #[test]
    fn extract_rejects_wrong_issuer_or_audience() {
        let mut bad_iss = claims();
        bad_iss["iss"] = "https://elsewhere".into();
        assert!(extract_claims(&bad_iss, &config()).is_err());

        let mut bad_aud = claims();
        bad_aud["aud"] = "other-project".into();
        assert!(extract_claims(&bad_aud, &config()).is_err());
    }

    #[test]
    fn extract_requires_sub_and_email() {
        let mut no_sub = claims();
        no_sub["sub"] = "".into();
        assert!(extract_claims(&no_sub, &config()).is_err());

        let mut no_email = claims();
        no_email.as_object_mut().unwrap().remove("email");
        assert!(extract_claims(&no_email, &config()).is_err());
    }

    #[cfg(feature = "backend")]
    #[test]
    fn verify_checks_signature_expiry_and_claims() {
        let token = crate::crypto::sign_claims(&claims(), "idp-secret");

        let ok = verify_id_token(&token, &config(), 1_500).unwrap();
        assert_eq!(ok.uid, "provider-uid-1");

        // Expired
        assert!(verify_id_token(&token, &config(), 3_000).is_err());

        // Wrong secret
        let forged = crate::crypto::sign_claims(&claims(), "not-the-secret");
        assert!(verify_id_token(&forged, &config(), 1_500).is_err());

        // Unconfigured provider
        let mut unconfigured = config();
        unconfigured.secret.clear();
        assert!(verify_id_token(&token, &unconfigured, 1_500).is_err());
    }
}
