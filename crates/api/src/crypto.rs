//! Cryptographic helpers for authentication.
//!
//! - PBKDF2-SHA256 password hashing (600k iterations)
//! - HMAC-SHA256 JWT signing/verification
//!
//! Pure Rust throughout; no OS crypto bindings.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use hmac::{Hmac, Mac};
use pbkdf2::pbkdf2_hmac;
use sha2::Sha256;

use crate::ServiceError;

const PBKDF2_ITERATIONS: u32 = 600_000;
const SALT_LEN: usize = 16;
const HASH_LEN: usize = 32;

// ── Password hashing ────────────────────────────────────────────────────────

/// Hash a password with PBKDF2-SHA256. Returns `(hash_hex, salt_hex)`.
pub fn hash_password(password: &str) -> Result<(String, String), ServiceError> {
    let mut salt = [0u8; SALT_LEN];
    getrandom::getrandom(&mut salt)
        .map_err(|e| ServiceError::Internal(format!("RNG failure: {e}")))?;

    let mut hash = [0u8; HASH_LEN];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), &salt, PBKDF2_ITERATIONS, &mut hash);

    Ok((hex::encode(hash), hex::encode(salt)))
}

/// Verify a password against a stored hash and salt (both hex-encoded).
pub fn verify_password(password: &str, hash_hex: &str, salt_hex: &str) -> bool {
    let Ok(salt) = hex::decode(salt_hex) else {
        return false;
    };
    let Ok(expected) = hex::decode(hash_hex) else {
        return false;
    };

    let mut hash = [0u8; HASH_LEN];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), &salt, PBKDF2_ITERATIONS, &mut hash);

    constant_time_eq(&hash, &expected)
}

// ── JWT (HMAC-SHA256) ───────────────────────────────────────────────────────

/// JWT header (always HS256).
const JWT_HEADER: &str = r#"{"alg":"HS256","typ":"JWT"}"#;

/// Access token expiry: 1 hour in seconds.
pub const JWT_EXPIRY_SECS: u64 = 3600;

/// Refresh token expiry: 30 days in seconds.
pub const REFRESH_EXPIRY_SECS: u64 = 30 * 24 * 3600;

/// Sign an access token for the given user id.
pub fn sign_jwt(user_id: &str, secret: &str, now_unix: u64) -> String {
    let payload = serde_json::json!({
        "sub": user_id,
        "iat": now_unix,
        "exp": now_unix + JWT_EXPIRY_SECS,
    });
    sign_claims(&payload, secret)
}

/// Sign an arbitrary claims object as an HS256 JWT.
pub fn sign_claims(claims: &serde_json::Value, secret: &str) -> String {
    let header_b64 = URL_SAFE_NO_PAD.encode(JWT_HEADER.as_bytes());
    let payload_b64 = URL_SAFE_NO_PAD.encode(claims.to_string().as_bytes());

    let signing_input = format!("{header_b64}.{payload_b64}");
    let signature = hmac_sha256(secret.as_bytes(), signing_input.as_bytes());
    let sig_b64 = URL_SAFE_NO_PAD.encode(signature);

    format!("{signing_input}.{sig_b64}")
}

/// Verify an HS256 JWT's signature and expiry, returning the decoded
/// claims object.
pub fn decode_jwt(
    token: &str,
    secret: &str,
    now_unix: u64,
) -> Result<serde_json::Value, ServiceError> {
    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != 3 {
        return Err(ServiceError::Unauthorized("invalid token format".into()));
    }

    let signing_input = format!("{}.{}", parts[0], parts[1]);
    let expected_sig = hmac_sha256(secret.as_bytes(), signing_input.as_bytes());
    let actual_sig = URL_SAFE_NO_PAD
        .decode(parts[2])
        .map_err(|_| ServiceError::Unauthorized("invalid token signature encoding".into()))?;

    if !constant_time_eq(&expected_sig, &actual_sig) {
        return Err(ServiceError::Unauthorized("invalid token signature".into()));
    }

    let payload_bytes = URL_SAFE_NO_PAD
        .decode(parts[1])
        .map_err(|_| ServiceError::Unauthorized("invalid token payload encoding".into()))?;
    let claims: serde_json::Value = serde_json::from_slice(&payload_bytes)
        .map_err(|_| ServiceError::Unauthorized("invalid token payload".into()))?;

    let exp = claims["exp"]
        .as_u64()
        .ok_or_else(|| ServiceError::Unauthorized("missing exp claim".into()))?;
    if now_unix > exp {
        return Err(ServiceError::Unauthorized("token expired".into()));
    }

    Ok(claims)
}

/// Verify an access token and return its `sub` (user id).
pub fn verify_jwt(token: &str, secret: &str, now_unix: u64) -> Result<String, ServiceError> {
    let claims = decode_jwt(token, secret, now_unix)?;
    let sub = claims["sub"]
        .as_str()
        .ok_or_else(|| ServiceError::Unauthorized("missing sub claim".into()))?
        .to_string();
    Ok(sub)
}

/// Generate a secure random token (for refresh tokens). Returns hex-encoded.
pub fn generate_token() -> Result<String, ServiceError> {
    let mut bytes = [0u8; 32];
    getrandom::getrandom(&mut bytes)
        .map_err(|e| ServiceError::Internal(format!("RNG failure: {e}")))?;
    Ok(hex::encode(bytes))
}

/// Hash a token with SHA-256 for storage. Returns hex-encoded.
pub fn hash_token(token: &str) -> String {
    use sha2::Digest;
    let hash = sha2::Sha256::digest(token.as_bytes());
    hex::encode(hash)
}

// ── Internal ────────────────────────────────────────────────────────────────

fn hmac_sha256(key: &[u8], data: &[u8]) -> Vec<u8> {
    let mut mac = Hmac::<Sha256>::new_from_slice(key).expect("HMAC can take key of any size");
    mac.update(data);
    mac.finalize().into_bytes().to_vec()
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b.iter()).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_hash_verifies_and_rejects() {
        let (hash, salt) = hash_password("correct horse").unwrap();
        assert!(verify_password("correct horse", &hash, &salt));
        assert!(!verify_password("wrong horse", &hash, &salt));
        assert!(!verify_password("correct horse", "zz not hex", &salt));
    }

    #[test]
    fn jwt_round_trips_sub() {
        let token = sign_jwt("user-1", "secret", 1_000);
        assert_eq!(verify_jwt(&token, "secret", 1_001).unwrap(), "user-1");
    }

    #[test]
    fn jwt_rejects_wrong_secret_and_expiry() {
        let token = sign_jwt("user-1", "secret", 1_000);
        assert!(verify_jwt(&token, "other", 1_001).is_err());
        assert!(verify_jwt(&token, "secret", 1_000 + JWT_EXPIRY_SECS + 1).is_err());
    }

    #[test]
    fn jwt_rejects_tampered_payload() {
        let token = sign_jwt("user-1", "secret", 1_000);
        let mut parts: Vec<String> = token.split('.').map(str::to_string).collect();
        parts[1] = base64::engine::general_purpose::URL_SAFE_NO_PAD
            .encode(br#"{"sub":"user-2","exp":99999999}"#);
        assert!(verify_jwt(&parts.join("."), "secret", 1_001).is_err());
    }

    #[test]
    fn token_hash_is_stable_hex() {
        let t = generate_token().unwrap();
        assert_eq!(t.len(), 64);
        assert_eq!(hash_token(&t), hash_token(&t));
    }
}
