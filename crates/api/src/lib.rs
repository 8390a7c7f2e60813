//! Shared API types, crypto, and SQL builders for trailpack.
//!
//! This crate is the single source of truth for all API request/response
//! types. The axum server, the typed client, and the terminal UI all
//! consume these shapes; the server additionally enables the `backend`
//! feature for crypto and sea-query builders.

use serde::{Deserialize, Serialize};

// Re-export core geo/scoring types for convenience
pub use trailpack_core::geo::{Feature, FeatureCollection};
pub use trailpack_core::scoring::PackScore;

#[cfg(feature = "backend")]
pub mod crypto;
#[cfg(feature = "backend")]
pub mod db;
pub mod identity;
#[cfg(feature = "backend")]
pub mod service;

// ─── Shared Enums ────────────────────────────────────────────────────────────

/// What a template was cut from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TemplateKind {
    Pack,
    Item,
}

impl TemplateKind {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Pack => "pack",
            Self::Item => "item",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pack" => Some(Self::Pack),
            "item" => Some(Self::Item),
            _ => None,
        }
    }
}

impl std::fmt::Display for TemplateKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─── Auth ────────────────────────────────────────────────────────────────────

/// Email + password + username registration.
#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub username: String,
}

/// Email + password login.
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Returned on successful login / register / refresh.
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthTokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: u64,
    pub user: UserSummary,
}

/// Refresh token request.
#[derive(Debug, Serialize, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Logout request (invalidate refresh token).
#[derive(Debug, Serialize, Deserialize)]
pub struct LogoutRequest {
    pub refresh_token: String,
}

/// External identity-provider linking request. The token is the
/// provider-issued ID token for the signed-in account.
#[derive(Debug, Serialize, Deserialize)]
pub struct LinkIdentityRequest {
    pub id_token: String,
}

/// Generic success response for operations that don't return data.
#[derive(Debug, Serialize, Deserialize)]
pub struct OkResponse {
    pub ok: bool,
}

/// Message-only response kept for the legacy delete endpoint shape.
#[derive(Debug, Serialize, Deserialize)]
pub struct MsgResponse {
    pub msg: String,
}

// ─── Users ───────────────────────────────────────────────────────────────────

/// Flat user record. Password fields never leave the server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: String,
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub email: String,
    /// External identity-provider uid, once linked.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_uid: Option<String>,
    pub role: String,
    #[serde(default)]
    pub is_certified_guide: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred_weather: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred_weight: Option<String>,
    pub created_at: String,
}

/// User populated with owned packs and trips (list endpoint) or with
/// favorites (edit endpoint).
#[derive(Debug, Serialize, Deserialize)]
pub struct UserDetail {
    #[serde(flatten)]
    pub user: UserSummary,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub packs: Vec<PackSummary>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub trips: Vec<TripSummary>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub favorites: Vec<PackSummary>,
}

/// Returned by `GET /api/users`.
#[derive(Debug, Serialize, Deserialize)]
pub struct UserListResponse {
    pub users: Vec<UserDetail>,
}

/// Partial profile overwrite. The id rides in the body, as in the
/// original edit endpoint.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct UpdateUserRequest {
    pub user_id: String,
    pub username: Option<String>,
    pub name: Option<String>,
    pub profile_image: Option<String>,
    pub preferred_weather: Option<String>,
    pub preferred_weight: Option<String>,
    pub is_certified_guide: Option<bool>,
}

/// Body-borne id for `DELETE /api/users`.
#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteUserRequest {
    pub user_id: String,
}

/// Toggle a pack in the caller's favorites.
#[derive(Debug, Serialize, Deserialize)]
pub struct ToggleFavoriteRequest {
    pub pack_id: String,
}

/// Returned by the favorite toggle: the acting user plus their current
/// favorite pack ids.
#[derive(Debug, Serialize, Deserialize)]
pub struct FavoriteResponse {
    #[serde(flatten)]
    pub user: UserSummary,
    pub favorites: Vec<String>,
}

// ─── Packs & items ───────────────────────────────────────────────────────────

/// Request body for `POST /api/packs`.
#[derive(Debug, Serialize, Deserialize)]
pub struct CreatePackRequest {
    pub name: String,
    pub is_public: Option<bool>,
}

/// Request body for `PUT /api/packs/{id}`.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct UpdatePackRequest {
    pub name: Option<String>,
    pub is_public: Option<bool>,
}

/// Flat pack record returned by list endpoints and embedded in users.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackSummary {
    pub id: String,
    pub name: String,
    pub owner_id: String,
    pub is_public: bool,
    /// Denormalized cache of the summed item weights, grams.
    pub total_weight: f64,
    pub total_score: f64,
    pub favorites_count: i64,
    pub created_at: String,
}

/// Pack detail: summary plus items and the score breakdown.
#[derive(Debug, Serialize, Deserialize)]
pub struct PackDetailResponse {
    #[serde(flatten)]
    pub pack: PackSummary,
    pub items: Vec<ItemResponse>,
    pub score: PackScore,
}

/// Returned by `GET /api/packs`.
#[derive(Debug, Serialize, Deserialize)]
pub struct PackListResponse {
    pub packs: Vec<PackSummary>,
}

/// Query parameters for `GET /api/packs`.
#[derive(Debug, Default, Deserialize)]
pub struct PackListQuery {
    /// Restrict to one owner (still subject to visibility rules).
    pub owner_id: Option<String>,
}

/// Add a gear item to a pack. Creates the item row and the join row.
#[derive(Debug, Serialize, Deserialize)]
pub struct AddItemRequest {
    pub name: String,
    pub weight: f64,
    pub unit: Option<String>,
    pub quantity: Option<u32>,
    pub category: Option<String>,
}

/// Flat item record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemResponse {
    pub id: String,
    pub name: String,
    pub weight: f64,
    pub unit: String,
    pub quantity: u32,
    pub global: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<String>,
}

/// Returned by `GET /api/items`.
#[derive(Debug, Serialize, Deserialize)]
pub struct ItemListResponse {
    pub items: Vec<ItemResponse>,
}

// ─── Trips ───────────────────────────────────────────────────────────────────

/// Request body for `POST /api/trips`. Geometry, when present, is stored
/// as a `geojson` row and referenced by the trip.
#[derive(Debug, Serialize, Deserialize)]
pub struct CreateTripRequest {
    pub name: String,
    pub description: Option<String>,
    pub duration: Option<String>,
    pub weather: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub destination: Option<String>,
    pub is_public: Option<bool>,
    pub geojson: Option<Feature>,
}

/// Request body for `PUT /api/trips/{id}`.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct UpdateTripRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub duration: Option<String>,
    pub weather: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub destination: Option<String>,
    pub is_public: Option<bool>,
}

/// Flat trip record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TripSummary {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weather: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination: Option<String>,
    pub owner_id: String,
    pub is_public: bool,
    pub created_at: String,
}

/// Trip detail: summary plus the stored geometry, when any.
#[derive(Debug, Serialize, Deserialize)]
pub struct TripDetailResponse {
    #[serde(flatten)]
    pub trip: TripSummary,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geojson: Option<Feature>,
}

/// Returned by `GET /api/trips`.
#[derive(Debug, Serialize, Deserialize)]
pub struct TripListResponse {
    pub trips: Vec<TripSummary>,
}

// ─── Templates ───────────────────────────────────────────────────────────────

/// Request body for `POST /api/templates`.
#[derive(Debug, Serialize, Deserialize)]
pub struct CreateTemplateRequest {
    #[serde(rename = "type")]
    pub kind: TemplateKind,
    /// The pack or item the template is cut from.
    pub source_id: String,
    pub is_global: Option<bool>,
}

/// Single template record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateResponse {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: TemplateKind,
    pub source_id: String,
    pub is_global: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
    pub created_at: String,
}

/// Returned by `GET /api/templates`.
#[derive(Debug, Serialize, Deserialize)]
pub struct TemplateListResponse {
    pub templates: Vec<TemplateResponse>,
}

// ─── Conversations ───────────────────────────────────────────────────────────

/// One entry in a conversation's JSON-encoded history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationMessage {
    pub role: String,
    pub content: String,
    pub timestamp: String,
}

/// Append a message to a conversation; omitting `conversation_id`
/// starts a new one.
#[derive(Debug, Serialize, Deserialize)]
pub struct AppendMessageRequest {
    pub conversation_id: Option<String>,
    pub role: Option<String>,
    pub message: String,
}

/// Single conversation with its decoded history.
#[derive(Debug, Serialize, Deserialize)]
pub struct ConversationResponse {
    pub id: String,
    pub user_id: String,
    pub history: Vec<ConversationMessage>,
    pub created_at: String,
}

/// Returned by `GET /api/conversations`.
#[derive(Debug, Serialize, Deserialize)]
pub struct ConversationListResponse {
    pub conversations: Vec<ConversationResponse>,
}

// ─── OSM / geo ───────────────────────────────────────────────────────────────

/// Request body for `POST /api/osm/query` — fetch outdoor features
/// around a point from the configured Overpass mirror.
#[derive(Debug, Serialize, Deserialize)]
pub struct OsmQueryRequest {
    pub lat: f64,
    pub lon: f64,
    /// Search radius in meters. Defaults to 1000, clamped to [100, 25000].
    pub radius: Option<f64>,
}

// ─── Health ──────────────────────────────────────────────────────────────────

/// Returned by `GET /api/health` — server liveness check.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

// ─── Service Error ───────────────────────────────────────────────────────────

/// Framework-agnostic service error.
///
/// Each variant maps to an HTTP status code; the axum layer converts it
/// into a `{"error": "..."}` response.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub enum ServiceError {
    BadRequest(String),
    Unauthorized(String),
    Forbidden(String),
    NotFound(String),
    Conflict(String),
    Internal(String),
}

impl ServiceError {
    /// HTTP status code as a `u16`.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::BadRequest(_) => 400,
            Self::Unauthorized(_) => 401,
            Self::Forbidden(_) => 403,
            Self::NotFound(_) => 404,
            Self::Conflict(_) => 409,
            Self::Internal(_) => 500,
        }
    }

    /// The error message.
    pub fn message(&self) -> &str {
        match self {
            Self::BadRequest(m)
            | Self::Unauthorized(m)
            | Self::Forbidden(m)
            | Self::NotFound(m)
            | Self::Conflict(m)
            | Self::Internal(m) => m,
        }
    }
}

impl std::fmt::Display for ServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ServiceError {}

// ─── Error (wire shape) ──────────────────────────────────────────────────────

/// JSON error shape `{ "error": "..." }` returned by all error responses.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    pub error: String,
}

impl From<&ServiceError> for ApiError {
    fn from(e: &ServiceError) -> Self {
        Self {
            error: e.message().to_string(),
        }
    }
}
