use axum::{
    extract::{FromRef, FromRequestParts, State},
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use rusqlite::OptionalExtension;
use uuid::Uuid;

use trailpack_api::identity::ProviderClaims;
use trailpack_api::{
    crypto, db as dbq, identity, service, AuthTokenResponse, LinkIdentityRequest, LoginRequest,
    LogoutRequest, OkResponse, RefreshRequest, RegisterRequest, UserSummary,
};

use crate::error::ApiErr;
use crate::storage::{credentials_from_row, sq_execute, sq_query_row, user_from_row, Db};
use crate::AppConfig;

/// Seconds since the unix epoch.
pub fn now_unix() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

// ---------------------------------------------------------------------------
// Auth extractor
// ---------------------------------------------------------------------------

/// Authenticated user extracted from the `Authorization: Bearer <jwt>`
/// header. Claims are checked against the DB so a deleted account stops
/// authenticating immediately.
pub struct AuthUser {
    pub user_id: String,
    pub username: String,
    pub role: String,
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    Db: FromRef<S>,
    AppConfig: FromRef<S>,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let config = AppConfig::from_ref(state);
        let db = Db::from_ref(state);

        let token = parts
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .ok_or_else(|| {
                ApiErr::unauthorized("missing or invalid Authorization header").into_response()
            })?
            .to_string();

        if config.jwt_secret.is_empty() {
            return Err(ApiErr::unauthorized("authentication not configured").into_response());
        }

        let user_id = crypto::verify_jwt(&token, &config.jwt_secret, now_unix())
            .map_err(|e| ApiErr::unauthorized(e.message().to_string()).into_response())?;

        let conn = db.conn();
        let user = sq_query_row(&conn, dbq::users::get_by_id(&user_id), user_from_row)
            .map_err(|_| ApiErr::unauthorized("unknown user").into_response())?;

        Ok(AuthUser {
            user_id: user.id,
            username: user.username,
            role: user.role,
        })
    }
}

/// Optional variant of [`AuthUser`]: anonymous requests flow through with
/// `None` instead of a 401. Used by listing endpoints whose visibility
/// rules differ for guests.
pub struct MaybeUser(pub Option<AuthUser>);

impl<S> FromRequestParts<S> for MaybeUser
where
    S: Send + Sync,
    Db: FromRef<S>,
    AppConfig: FromRef<S>,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Ok(MaybeUser(
            AuthUser::from_request_parts(parts, state).await.ok(),
        ))
    }
}

// ---------------------------------------------------------------------------
// Token issuance
// ---------------------------------------------------------------------------

/// Sign an access token, mint + store a refresh token, and build the
/// auth response for `user`.
pub fn issue_tokens(
    conn: &rusqlite::Connection,
    jwt_secret: &str,
    user: UserSummary,
) -> Result<AuthTokenResponse, ApiErr> {
    let bundle = service::prepare_token_bundle(jwt_secret, user, now_unix()).map_err(ApiErr::from)?;
    sq_execute(
        conn,
        dbq::users::insert_refresh_token(
            &bundle.token_id,
            &bundle.response.user.id,
            &bundle.token_hash,
            &bundle.expires_at,
        ),
    )
    .map_err(ApiErr::from_db("refresh token insert"))?;
    Ok(bundle.response)
}

// ---------------------------------------------------------------------------
// POST /api/auth/register
// ---------------------------------------------------------------------------

/// POST /api/auth/register — create an account with email + password.
pub async fn register(
    State(db): State<Db>,
    State(config): State<AppConfig>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthTokenResponse>), ApiErr> {
    let email = service::validate_email(&req.email).map_err(ApiErr::from)?;
    service::validate_password(&req.password).map_err(ApiErr::from)?;
    let username = service::validate_username(&req.username).map_err(ApiErr::from)?;

    if config.jwt_secret.is_empty() {
        return Err(ApiErr::internal("JWT_SECRET not configured"));
    }

    let (hash, salt) = crypto::hash_password(&req.password).map_err(ApiErr::from)?;
    let user_id = Uuid::new_v4().to_string();

    let conn = db.conn();
    match sq_execute(
        &conn,
        dbq::users::insert_with_password(&user_id, &username, &email, &hash, &salt),
    ) {
        Ok(_) => {}
        Err(rusqlite::Error::SqliteFailure(e, _))
            if e.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            return Err(ApiErr::conflict("email already in use"));
        }
        Err(e) => return Err(ApiErr::from_db("create user")(e)),
    }

    let user = sq_query_row(&conn, dbq::users::get_by_id(&user_id), user_from_row)
        .map_err(ApiErr::from_db("load created user"))?;
    let tokens = issue_tokens(&conn, &config.jwt_secret, user)?;

    Ok((StatusCode::CREATED, Json(tokens)))
}

// ---------------------------------------------------------------------------
// POST /api/auth/login
// ---------------------------------------------------------------------------

/// POST /api/auth/login — email + password. Unknown email and wrong
/// password are indistinguishable to the caller.
pub async fn login(
    State(db): State<Db>,
    State(config): State<AppConfig>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<AuthTokenResponse>, ApiErr> {
    let email = service::validate_email(&req.email).map_err(ApiErr::from)?;

    if config.jwt_secret.is_empty() {
        return Err(ApiErr::internal("JWT_SECRET not configured"));
    }

    let conn = db.conn();
    let row = sq_query_row(&conn, dbq::users::get_by_email(&email), |row| {
        Ok((user_from_row(row)?, credentials_from_row(row)?))
    })
    .optional()
    .map_err(ApiErr::from_db("login lookup"))?;

    let Some((user, (hash, salt))) = row else {
        return Err(ApiErr::unauthorized("invalid credentials"));
    };
    let (Some(hash), Some(salt)) = (hash, salt) else {
        // Provider-linked account with no password set.
        return Err(ApiErr::unauthorized("invalid credentials"));
    };

    if !crypto::verify_password(&req.password, &hash, &salt) {
        return Err(ApiErr::unauthorized("invalid credentials"));
    }

    let tokens = issue_tokens(&conn, &config.jwt_secret, user)?;
    Ok(Json(tokens))
}

// ---------------------------------------------------------------------------
// POST /api/auth/refresh
// ---------------------------------------------------------------------------

/// POST /api/auth/refresh — rotate a refresh token into a fresh bundle.
pub async fn refresh(
    State(db): State<Db>,
    State(config): State<AppConfig>,
    Json(req): Json<RefreshRequest>,
) -> Result<Json<AuthTokenResponse>, ApiErr> {
    let token_hash = crypto::hash_token(&req.refresh_token);

    let conn = db.conn();
    let row = sq_query_row(&conn, dbq::users::lookup_refresh_token(&token_hash), |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, String>(2)?,
        ))
    })
    .optional()
    .map_err(ApiErr::from_db("refresh lookup"))?;

    let Some((token_id, user_id, expires_at)) = row else {
        return Err(ApiErr::unauthorized("invalid refresh token"));
    };

    let now = service::sqlite_datetime(now_unix()).map_err(ApiErr::from)?;
    if expires_at < now {
        sq_execute(&conn, dbq::users::delete_refresh_token_by_id(&token_id)).ok();
        return Err(ApiErr::unauthorized("refresh token expired"));
    }

    // Rotation: the old token dies with the new issuance.
    sq_execute(&conn, dbq::users::delete_refresh_token_by_id(&token_id))
        .map_err(ApiErr::from_db("refresh rotation"))?;

    let user = sq_query_row(&conn, dbq::users::get_by_id(&user_id), user_from_row)
        .map_err(|_| ApiErr::unauthorized("unknown user"))?;
    let tokens = issue_tokens(&conn, &config.jwt_secret, user)?;

    Ok(Json(tokens))
}

// ---------------------------------------------------------------------------
// POST /api/auth/logout
// ---------------------------------------------------------------------------

/// POST /api/auth/logout — invalidate a refresh token.
pub async fn logout(
    State(db): State<Db>,
    Json(req): Json<LogoutRequest>,
) -> Result<Json<OkResponse>, ApiErr> {
    let token_hash = crypto::hash_token(&req.refresh_token);
    let conn = db.conn();
    sq_execute(&conn, dbq::users::delete_refresh_token(&token_hash))
        .map_err(ApiErr::from_db("logout"))?;
    Ok(Json(OkResponse { ok: true }))
}

// ---------------------------------------------------------------------------
// GET /api/auth/me
// ---------------------------------------------------------------------------

/// GET /api/auth/me — the caller's profile, provider link included.
pub async fn me(State(db): State<Db>, user: AuthUser) -> Result<Json<UserSummary>, ApiErr> {
    let conn = db.conn();
    let me = sq_query_row(&conn, dbq::users::get_by_id(&user.user_id), user_from_row)
        .map_err(|_| ApiErr::not_found("User cannot be found"))?;
    Ok(Json(me))
}

// ---------------------------------------------------------------------------
// POST /api/auth/link — external identity provider reconciliation
// ---------------------------------------------------------------------------

/// POST /api/auth/link — verify a provider ID token and reconcile it
/// with a local account. Verification failures come back as 400 with the
/// failure message.
pub async fn link(
    State(db): State<Db>,
    State(config): State<AppConfig>,
    Json(req): Json<LinkIdentityRequest>,
) -> Result<Json<UserSummary>, ApiErr> {
    let claims = identity::verify_id_token(&req.id_token, &config.idp, now_unix())
        .map_err(|e| ApiErr::bad_request(e.message().to_string()))?;

    let mut conn = db.conn();
    let user = link_identity(&mut conn, &claims)?;
    Ok(Json(user))
}

/// Find-or-create-or-backfill, in one transaction.
///
/// Idempotent: the first call for an email attaches the provider uid;
/// every later call observes it and changes nothing. A concurrent insert
/// losing the UNIQUE(email) race falls back to the winner's row.
pub fn link_identity(
    conn: &mut rusqlite::Connection,
    claims: &ProviderClaims,
) -> Result<UserSummary, ApiErr> {
    let tx = conn
        .transaction()
        .map_err(ApiErr::from_db("begin identity link"))?;

    let existing = sq_query_row(&tx, dbq::users::get_by_email(&claims.email), user_from_row)
        .optional()
        .map_err(ApiErr::from_db("identity link lookup"))?;

    let user_id = match existing {
        Some(user) => {
            if user.provider_uid.is_none() {
                sq_execute(&tx, dbq::users::set_provider_uid(&user.id, &claims.uid))
                    .map_err(ApiErr::from_db("provider uid backfill"))?;
            }
            user.id
        }
        None => {
            let user_id = Uuid::new_v4().to_string();
            let username = claims.email.split('@').next().unwrap_or("hiker");
            let inserted = sq_execute(
                &tx,
                dbq::users::insert_from_provider(
                    &user_id,
                    username,
                    &claims.email,
                    &claims.uid,
                    claims.name.as_deref(),
                ),
            );
            match inserted {
                Ok(_) => user_id,
                Err(rusqlite::Error::SqliteFailure(e, _))
                    if e.code == rusqlite::ErrorCode::ConstraintViolation =>
                {
                    // Lost the race: another request created this email.
                    sq_query_row(&tx, dbq::users::get_by_email(&claims.email), user_from_row)
                        .map_err(ApiErr::from_db("identity link re-read"))?
                        .id
                }
                Err(e) => return Err(ApiErr::from_db("identity link insert")(e)),
            }
        }
    };

    let user = sq_query_row(&tx, dbq::users::get_by_id(&user_id), user_from_row)
        .map_err(ApiErr::from_db("identity link load"))?;

    tx.commit().map_err(ApiErr::from_db("commit identity link"))?;
    Ok(user)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::init_memory_db;

    fn claims(email: &str) -> ProviderClaims {
        ProviderClaims {
            uid: format!("prov-{email}"),
            email: email.to_string(),
            name: Some("Hiker".to_string()),
        }
    }

    #[test]
    fn linking_unknown_email_creates_exactly_one_user() {
        let db = init_memory_db().unwrap();
        let mut conn = db.conn();

        let user = link_identity(&mut conn, &claims("new@example.com")).unwrap();
        assert_eq!(user.email, "new@example.com");
        assert_eq!(user.provider_uid.as_deref(), Some("prov-new@example.com"));

        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM users", [], |r| r.get(0))
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn linking_is_idempotent_for_known_email() {
        let db = init_memory_db().unwrap();
        let mut conn = db.conn();

        sq_execute(
            &conn,
            dbq::users::insert_with_password("u1", "hiker", "known@example.com", "h", "s"),
        )
        .unwrap();

        let first = link_identity(&mut conn, &claims("known@example.com")).unwrap();
        assert_eq!(first.id, "u1");
        assert_eq!(first.provider_uid.as_deref(), Some("prov-known@example.com"));

        let second = link_identity(&mut conn, &claims("known@example.com")).unwrap();
        assert_eq!(second.id, "u1");
        assert_eq!(second.provider_uid, first.provider_uid);

        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM users", [], |r| r.get(0))
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn backfill_never_overwrites_an_existing_provider_uid() {
        let db = init_memory_db().unwrap();
        let mut conn = db.conn();

        let first = link_identity(&mut conn, &claims("x@example.com")).unwrap();

        // Same email arriving from a different provider account keeps
        // the original uid.
        let mut other = claims("x@example.com");
        other.uid = "prov-other".to_string();
        let second = link_identity(&mut conn, &other).unwrap();
        assert_eq!(second.provider_uid, first.provider_uid);
    }

    fn test_config() -> crate::AppConfig {
        crate::AppConfig {
            base_url: "http://localhost:3000".to_string(),
            jwt_secret: "test-secret".to_string(),
            idp: identity::IdentityProviderConfig {
                issuer: "https://id.trailpack.app".to_string(),
                audience: "trailpack".to_string(),
                secret: "idp-secret".to_string(),
            },
            overpass_url: "http://localhost:0".to_string(),
        }
    }

    #[tokio::test]
    async fn login_with_wrong_password_is_401_and_issues_no_token() {
        let db = init_memory_db().unwrap();
        let config = test_config();

        register(
            State(db.clone()),
            State(config.clone()),
            Json(RegisterRequest {
                email: "hiker@example.com".into(),
                password: "correct horse".into(),
                username: "hiker".into(),
            }),
        )
        .await
        .expect("register");

        let err = login(
            State(db.clone()),
            State(config.clone()),
            Json(LoginRequest {
                email: "hiker@example.com".into(),
                password: "wrong horse".into(),
            }),
        )
        .await
        .expect_err("wrong password must fail");
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);

        // Only the registration refresh token exists; the failed login
        // minted nothing.
        let tokens: i64 = db
            .conn()
            .query_row("SELECT COUNT(*) FROM refresh_tokens", [], |r| r.get(0))
            .unwrap();
        assert_eq!(tokens, 1);
    }

    #[tokio::test]
    async fn duplicate_registration_is_409() {
        let db = init_memory_db().unwrap();
        let config = test_config();

        let req = || RegisterRequest {
            email: "same@example.com".into(),
            password: "long enough".into(),
            username: "first".into(),
        };
        register(State(db.clone()), State(config.clone()), Json(req()))
            .await
            .expect("first registration");
        let err = register(State(db.clone()), State(config.clone()), Json(req()))
            .await
            .expect_err("second registration must fail");
        assert_eq!(err.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn link_endpoint_rejects_forged_tokens_with_400() {
        let db = init_memory_db().unwrap();
        let config = test_config();

        let forged = crypto::sign_claims(
            &serde_json::json!({
                "iss": "https://id.trailpack.app",
                "aud": "trailpack",
                "sub": "prov-1",
                "email": "a@example.com",
                "exp": now_unix() + 600,
            }),
            "not-the-idp-secret",
        );
        let err = link(
            State(db.clone()),
            State(config.clone()),
            Json(LinkIdentityRequest { id_token: forged }),
        )
        .await
        .expect_err("forged token must fail");
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);

        let users: i64 = db
            .conn()
            .query_row("SELECT COUNT(*) FROM users", [], |r| r.get(0))
            .unwrap();
        assert_eq!(users, 0);
    }

    #[test]
    fn issued_tokens_verify_and_refresh_rows_are_stored() {
        let db = init_memory_db().unwrap();
        let conn = db.conn();

        sq_execute(
            &conn,
            dbq::users::insert_with_password("u1", "hiker", "a@example.com", "h", "s"),
        )
        .unwrap();
        let user = sq_query_row(&conn, dbq::users::get_by_id("u1"), user_from_row).unwrap();

        let tokens = issue_tokens(&conn, "secret", user).unwrap();
        assert_eq!(
            crypto::verify_jwt(&tokens.access_token, "secret", now_unix()).unwrap(),
            "u1"
        );

        let stored: i64 = conn
            .query_row("SELECT COUNT(*) FROM refresh_tokens", [], |r| r.get(0))
            .unwrap();
        assert_eq!(stored, 1);
    }
}
