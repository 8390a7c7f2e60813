//! User / auth query builders.

use sea_query::{Asterisk, Expr, Func, Order, Query, SqliteQueryBuilder};

use super::tables::{Favorites, RefreshTokens, Users};
use super::Built;

/// Column order shared by every full-user SELECT; row mappers on the
/// server side rely on it.
pub const USER_COLUMNS: [Users; 13] = [
    Users::Id,
    Users::Username,
    Users::Name,
    Users::Email,
    Users::ProviderUid,
    Users::Role,
    Users::IsCertifiedGuide,
    Users::ProfileImage,
    Users::PreferredWeather,
    Users::PreferredWeight,
    Users::CreatedAt,
    Users::PasswordHash,
    Users::PasswordSalt,
];

// ── Lookups ─────────────────────────────────────────────────────────────────

/// Full user row by id.
pub fn get_by_id(user_id: &str) -> Built {
    Query::select()
        .columns(USER_COLUMNS)
        .from(Users::Table)
        .and_where(Expr::col(Users::Id).eq(user_id))
        .build(SqliteQueryBuilder)
}

/// Full user row by (normalized) email.
pub fn get_by_email(email: &str) -> Built {
    Query::select()
        .columns(USER_COLUMNS)
        .from(Users::Table)
        .and_where(Expr::col(Users::Email).eq(email))
        .build(SqliteQueryBuilder)
}

/// Check email existence.
pub fn email_exists(email: &str) -> Built {
    Query::select()
        .expr(Expr::expr(Func::count(Expr::col(Asterisk))).gt(0))
        .from(Users::Table)
        .and_where(Expr::col(Users::Email).eq(email))
        .build(SqliteQueryBuilder)
}

/// All users, oldest first.
pub fn list_all() -> Built {
    Query::select()
        .columns(USER_COLUMNS)
        .from(Users::Table)
        .order_by(Users::CreatedAt, Order::Asc)
        .build(SqliteQueryBuilder)
}

// ── Inserts ─────────────────────────────────────────────────────────────────

/// Insert a user registered with email/password.
pub fn insert_with_password(
    id: &str,
    username: &str,
    email: &str,
    password_hash: &str,
    password_salt: &str,
) -> Built {
    Query::insert()
        .into_table(Users::Table)
        .columns([
            Users::Id,
            Users::Username,
            Users::Email,
            Users::PasswordHash,
            Users::PasswordSalt,
        ])
        .values_panic([
            id.into(),
            username.into(),
            email.into(),
            password_hash.into(),
            password_salt.into(),
        ])
        .build(SqliteQueryBuilder)
}

/// Insert a user created from a verified provider identity (no password).
pub fn insert_from_provider(
    id: &str,
    username: &str,
    email: &str,
    provider_uid: &str,
    name: Option<&str>,
) -> Built {
    Query::insert()
        .into_table(Users::Table)
        .columns([
            Users::Id,
            Users::Username,
            Users::Email,
            Users::ProviderUid,
            Users::Name,
        ])
        .values_panic([
            id.into(),
            username.into(),
            email.into(),
            provider_uid.into(),
            name.map(|s| s.to_string()).into(),
        ])
        .build(SqliteQueryBuilder)
}

// ── Updates ─────────────────────────────────────────────────────────────────

/// Backfill the provider uid on an already-registered account.
pub fn set_provider_uid(user_id: &str, provider_uid: &str) -> Built {
    Query::update()
        .table(Users::Table)
        .value(Users::ProviderUid, provider_uid)
        .and_where(Expr::col(Users::Id).eq(user_id))
        .and_where(Expr::col(Users::ProviderUid).is_null())
        .build(SqliteQueryBuilder)
}

pub fn update_username(user_id: &str, username: &str) -> Built {
    Query::update()
        .table(Users::Table)
        .value(Users::Username, username)
        .and_where(Expr::col(Users::Id).eq(user_id))
        .build(SqliteQueryBuilder)
}

pub fn update_name(user_id: &str, name: &str) -> Built {
    Query::update()
        .table(Users::Table)
        .value(Users::Name, name)
        .and_where(Expr::col(Users::Id).eq(user_id))
        .build(SqliteQueryBuilder)
}

pub fn update_profile_image(user_id: &str, profile_image: &str) -> Built {
    Query::update()
        .table(Users::Table)
        .value(Users::ProfileImage, profile_image)
        .and_where(Expr::col(Users::Id).eq(user_id))
        .build(SqliteQueryBuilder)
}

pub fn update_preferred_weather(user_id: &str, preferred_weather: &str) -> Built {
    Query::update()
        .table(Users::Table)
        .value(Users::PreferredWeather, preferred_weather)
        .and_where(Expr::col(Users::Id).eq(user_id))
        .build(SqliteQueryBuilder)
}

pub fn update_preferred_weight(user_id: &str, preferred_weight: &str) -> Built {
    Query::update()
        .table(Users::Table)
        .value(Users::PreferredWeight, preferred_weight)
        .and_where(Expr::col(Users::Id).eq(user_id))
        .build(SqliteQueryBuilder)
}

pub fn update_certified_guide(user_id: &str, is_certified_guide: bool) -> Built {
    Query::update()
        .table(Users::Table)
        .value(Users::IsCertifiedGuide, is_certified_guide)
        .and_where(Expr::col(Users::Id).eq(user_id))
        .build(SqliteQueryBuilder)
}

/// Stamp `updated_at` after a profile edit.
pub fn touch(user_id: &str, updated_at: &str) -> Built {
    Query::update()
        .table(Users::Table)
        .value(Users::UpdatedAt, updated_at)
        .and_where(Expr::col(Users::Id).eq(user_id))
        .build(SqliteQueryBuilder)
}

// ── Deletes ─────────────────────────────────────────────────────────────────

pub fn delete(user_id: &str) -> Built {
    Query::delete()
        .from_table(Users::Table)
        .and_where(Expr::col(Users::Id).eq(user_id))
        .build(SqliteQueryBuilder)
}

// ── Favorites ───────────────────────────────────────────────────────────────

/// Does this user already favorite this pack?
pub fn favorite_exists(user_id: &str, pack_id: &str) -> Built {
    Query::select()
        .expr(Expr::expr(Func::count(Expr::col(Asterisk))).gt(0))
        .from(Favorites::Table)
        .and_where(Expr::col(Favorites::UserId).eq(user_id))
        .and_where(Expr::col(Favorites::PackId).eq(pack_id))
        .build(SqliteQueryBuilder)
}

pub fn insert_favorite(user_id: &str, pack_id: &str) -> Built {
    Query::insert()
        .into_table(Favorites::Table)
        .columns([Favorites::UserId, Favorites::PackId])
        .values_panic([user_id.into(), pack_id.into()])
        .build(SqliteQueryBuilder)
}

pub fn delete_favorite(user_id: &str, pack_id: &str) -> Built {
    Query::delete()
        .from_table(Favorites::Table)
        .and_where(Expr::col(Favorites::UserId).eq(user_id))
        .and_where(Expr::col(Favorites::PackId).eq(pack_id))
        .build(SqliteQueryBuilder)
}

/// Pack ids this user has favorited, newest first.
pub fn favorite_ids(user_id: &str) -> Built {
    Query::select()
        .column(Favorites::PackId)
        .from(Favorites::Table)
        .and_where(Expr::col(Favorites::UserId).eq(user_id))
        .order_by(Favorites::CreatedAt, Order::Desc)
        .build(SqliteQueryBuilder)
}

// ── Refresh tokens ──────────────────────────────────────────────────────────

/// Insert refresh token.
pub fn insert_refresh_token(id: &str, user_id: &str, token_hash: &str, expires_at: &str) -> Built {
    Query::insert()
        .into_table(RefreshTokens::Table)
        .columns([
            RefreshTokens::Id,
            RefreshTokens::UserId,
            RefreshTokens::TokenHash,
            RefreshTokens::ExpiresAt,
        ])
        .values_panic([
            id.into(),
            user_id.into(),
            token_hash.into(),
            expires_at.into(),
        ])
        .build(SqliteQueryBuilder)
}

/// Lookup a refresh token row by hash.
pub fn lookup_refresh_token(token_hash: &str) -> Built {
    Query::select()
        .columns([
            RefreshTokens::Id,
            RefreshTokens::UserId,
            RefreshTokens::ExpiresAt,
        ])
        .from(RefreshTokens::Table)
        .and_where(Expr::col(RefreshTokens::TokenHash).eq(token_hash))
        .build(SqliteQueryBuilder)
}

/// Delete refresh token by hash (logout).
pub fn delete_refresh_token(token_hash: &str) -> Built {
    Query::delete()
        .from_table(RefreshTokens::Table)
        .and_where(Expr::col(RefreshTokens::TokenHash).eq(token_hash))
        .build(SqliteQueryBuilder)
}

/// Delete refresh token by row id (rotation).
pub fn delete_refresh_token_by_id(id: &str) -> Built {
    Query::delete()
        .from_table(RefreshTokens::Table)
        .and_where(Expr::col(RefreshTokens::Id).eq(id))
        .build(SqliteQueryBuilder)
}
