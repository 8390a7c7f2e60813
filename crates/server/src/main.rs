mod error;
mod routes;
mod storage;

use axum::{
    extract::FromRef,
    routing::{delete, get, post, put},
    Router,
};
use std::path::PathBuf;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use trailpack_api::identity::IdentityProviderConfig;
use storage::Db;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: Db,
    pub config: AppConfig,
}

/// Server configuration loaded from environment variables.
#[derive(Clone)]
pub struct AppConfig {
    pub base_url: String,
    pub jwt_secret: String,
    pub idp: IdentityProviderConfig,
    pub overpass_url: String,
}

impl FromRef<AppState> for Db {
    fn from_ref(state: &AppState) -> Self {
        state.db.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}

fn env_or(name: &str, default: &str) -> String {
    std::env::var(name)
        .ok()
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| default.to_string())
}

/// Load the external identity-provider settings. An empty secret leaves
/// the linking endpoint disabled.
fn load_idp_config() -> IdentityProviderConfig {
    let secret = std::env::var("TRAILPACK_IDP_SECRET").unwrap_or_default();
    if secret.is_empty() {
        tracing::warn!("TRAILPACK_IDP_SECRET not set — identity linking will be disabled");
    }
    IdentityProviderConfig {
        issuer: env_or("TRAILPACK_IDP_ISSUER", "https://id.trailpack.app"),
        audience: env_or("TRAILPACK_IDP_AUDIENCE", "trailpack"),
        secret,
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "trailpack_server=info,tower_http=info".into()),
        )
        .init();

    // Data directory
    let data_dir = std::env::var("TRAILPACK_DATA_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("data"));

    tracing::info!("data directory: {}", data_dir.display());

    // Initialize database
    let db = storage::init_db(&data_dir)?;
    tracing::info!("database initialized");

    let base_url = env_or("BASE_URL", "http://localhost:3000");

    let jwt_secret = std::env::var("JWT_SECRET").unwrap_or_default();
    if jwt_secret.is_empty() {
        tracing::warn!("JWT_SECRET not set — authenticated endpoints will be disabled");
    }

    let config = AppConfig {
        base_url: base_url.clone(),
        jwt_secret,
        idp: load_idp_config(),
        overpass_url: env_or(
            "TRAILPACK_OVERPASS_URL",
            "https://overpass-api.de/api/interpreter",
        ),
    };

    let state = AppState { db, config };

    // Build API routes
    let api = Router::new()
        // Health
        .route("/health", get(routes::health::health))
        // Auth
        .route("/auth/register", post(routes::auth::register))
        .route("/auth/login", post(routes::auth::login))
        .route("/auth/refresh", post(routes::auth::refresh))
        .route("/auth/logout", post(routes::auth::logout))
        .route("/auth/me", get(routes::auth::me))
        .route("/auth/link", post(routes::auth::link))
        // Users — mutating endpoints keep the body-borne id of the
        // legacy controller
        .route("/users", get(routes::users::list_users))
        .route("/users", put(routes::users::edit_user))
        .route("/users", delete(routes::users::delete_user))
        .route("/users/favorite", post(routes::users::toggle_favorite))
        .route("/users/{id}", get(routes::users::get_user))
        // Packs + items
        .route("/packs", post(routes::packs::create_pack))
        .route("/packs", get(routes::packs::list_packs))
        .route(
            "/packs/{id}",
            get(routes::packs::get_pack)
                .put(routes::packs::update_pack)
                .delete(routes::packs::delete_pack),
        )
        .route("/packs/{id}/items", post(routes::packs::add_item))
        .route(
            "/packs/{id}/items/{item_id}",
            delete(routes::packs::remove_item),
        )
        .route("/items", get(routes::packs::list_items))
        // Trips
        .route("/trips", post(routes::trips::create_trip))
        .route("/trips", get(routes::trips::list_trips))
        .route(
            "/trips/{id}",
            get(routes::trips::get_trip)
                .put(routes::trips::update_trip)
                .delete(routes::trips::delete_trip),
        )
        // Templates
        .route("/templates", get(routes::templates::list_templates))
        .route("/templates", post(routes::templates::create_template))
        .route("/templates/{id}", delete(routes::templates::delete_template))
        // Conversations
        .route(
            "/conversations",
            get(routes::conversations::list_conversations),
        )
        .route("/conversations", post(routes::conversations::append_message))
        // OSM / geo
        .route("/osm/query", post(routes::osm::query))
        .route("/geo/{id}", get(routes::osm::get_geo));

    let app = Router::new()
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state);

    tracing::info!("starting server at {base_url}");

    let port = env_or("PORT", "3000");
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}")).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
