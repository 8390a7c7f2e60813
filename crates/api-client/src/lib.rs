pub mod client;
pub mod retry;

pub use client::ApiClient;
pub use retry::RetryConfig;
pub use trailpack_api;

/// Hosted production endpoint.
pub const PRODUCTION_API_URL: &str = "https://api.trailpack.app";

/// Resolve the API base URL for this process.
///
/// `TRAILPACK_API_URL` always wins; otherwise the build environment
/// decides between the hosted endpoint and a local dev server.
pub fn default_base_url() -> String {
    if let Ok(url) = std::env::var("TRAILPACK_API_URL") {
        if !url.is_empty() {
            return url;
        }
    }
    match std::env::var("TRAILPACK_ENV").as_deref() {
        Ok("production") => PRODUCTION_API_URL.to_string(),
        _ => "http://localhost:3000".to_string(),
    }
}
