//! Shared business logic — framework-agnostic pure functions.
//!
//! Route handlers stay thin adapters over these.

use crate::{AuthTokenResponse, ServiceError, UserSummary};

// ─── Validation ─────────────────────────────────────────────────────────────

/// Validate and normalize an email address. Returns the lowercased, trimmed email.
pub fn validate_email(email: &str) -> Result<String, ServiceError> {
    let email = email.trim().to_lowercase();
    if email.is_empty() || !email.contains('@') || email.len() > 254 {
        return Err(ServiceError::BadRequest("invalid email address".into()));
    }
    Ok(email)
}

/// Validate a password (8-128 characters).
pub fn validate_password(password: &str) -> Result<(), ServiceError> {
    if password.len() < 8 {
        return Err(ServiceError::BadRequest(
            "password must be at least 8 characters".into(),
        ));
    }
    if password.len() > 128 {
        return Err(ServiceError::BadRequest(
            "password must be at most 128 characters".into(),
        ));
    }
    Ok(())
}

/// Validate and normalize a username. Returns the trimmed username.
pub fn validate_username(username: &str) -> Result<String, ServiceError> {
    let trimmed = username.trim().to_string();
    if trimmed.is_empty() || trimmed.len() > 64 {
        return Err(ServiceError::BadRequest(
            "username must be 1-64 characters".into(),
        ));
    }
    Ok(trimmed)
}

/// Validate a pack or trip name.
pub fn validate_name(name: &str) -> Result<String, ServiceError> {
    let trimmed = name.trim().to_string();
    if trimmed.is_empty() || trimmed.len() > 120 {
        return Err(ServiceError::BadRequest(
            "name must be 1-120 characters".into(),
        ));
    }
    Ok(trimmed)
}

/// Clamp an OSM search radius to sane bounds (meters).
pub fn clamp_radius(radius: Option<f64>) -> f64 {
    radius.unwrap_or(1000.0).clamp(100.0, 25_000.0)
}

// ─── Time ───────────────────────────────────────────────────────────────────

/// SQLite `datetime` formatting for a unix timestamp.
pub fn sqlite_datetime(unix: u64) -> Result<String, ServiceError> {
    let dt = chrono::DateTime::from_timestamp(unix as i64, 0)
        .ok_or_else(|| ServiceError::Internal("invalid timestamp".into()))?;
    Ok(dt.format("%Y-%m-%d %H:%M:%S").to_string())
}

// ─── Token Bundle ───────────────────────────────────────────────────────────

/// Pre-computed token bundle returned by [`prepare_token_bundle`].
///
/// Contains everything needed to insert a refresh token and return the
/// auth response. The caller only performs the DB INSERT.
pub struct TokenBundle {
    /// JWT access token.
    pub access_token: String,
    /// Raw refresh token (sent to the client).
    pub refresh_token: String,
    /// SHA-256 hash of the refresh token (stored in DB).
    pub token_hash: String,
    /// UUID primary key for the refresh_tokens row.
    pub token_id: String,
    /// `datetime` string for the refresh token expiry (DB column value).
    pub expires_at: String,
    /// Ready-to-return API response.
    pub response: AuthTokenResponse,
}

/// Build a [`TokenBundle`] containing a JWT, a refresh token, and the
/// auth response for the given user.
pub fn prepare_token_bundle(
    jwt_secret: &str,
    user: UserSummary,
    now_unix: u64,
) -> Result<TokenBundle, ServiceError> {
    use crate::crypto;

    let access_token = crypto::sign_jwt(&user.id, jwt_secret, now_unix);
    let refresh_token = crypto::generate_token()?;
    let token_hash = crypto::hash_token(&refresh_token);
    let token_id = uuid::Uuid::new_v4().to_string();
    let expires_at = sqlite_datetime(now_unix + crypto::REFRESH_EXPIRY_SECS)?;

    let response = AuthTokenResponse {
        access_token: access_token.clone(),
        refresh_token: refresh_token.clone(),
        expires_in: crypto::JWT_EXPIRY_SECS,
        user,
    };

    Ok(TokenBundle {
        access_token,
        refresh_token,
        token_hash,
        token_id,
        expires_at,
        response,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_is_trimmed_and_lowercased() {
        assert_eq!(
            validate_email("  Hiker@Example.COM ").unwrap(),
            "hiker@example.com"
        );
        assert!(validate_email("not-an-email").is_err());
        assert!(validate_email("").is_err());
    }

    #[test]
    fn password_length_bounds() {
        assert!(validate_password("short").is_err());
        assert!(validate_password("long enough").is_ok());
        assert!(validate_password(&"x".repeat(129)).is_err());
    }

    #[test]
    fn username_bounds() {
        assert_eq!(validate_username("  mallory  ").unwrap(), "mallory");
        assert!(validate_username("   ").is_err());
        assert!(validate_username(&"x".repeat(65)).is_err());
    }

    #[test]
    fn radius_clamps_to_bounds() {
        assert_eq!(clamp_radius(None), 1000.0);
        assert_eq!(clamp_radius(Some(1.0)), 100.0);
        assert_eq!(clamp_radius(Some(1e9)), 25_000.0);
    }

    #[test]
    fn sqlite_datetime_formats_utc() {
        assert_eq!(sqlite_datetime(0).unwrap(), "1970-01-01 00:00:00");
    }
}
