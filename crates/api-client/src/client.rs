use std::time::Duration;

use anyhow::{bail, Result};
use serde::de::DeserializeOwned;

use trailpack_api::*;

/// Typed HTTP client for the trailpack API.
///
/// High-level methods cover each endpoint; the stored auth token rides
/// along on everything that needs one.
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
    auth_token: Option<String>,
}

impl ApiClient {
    /// Create a new client with the given base URL and timeout.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            auth_token: None,
        })
    }

    /// Create from an existing `reqwest::Client` (e.g. shared in tests).
    pub fn with_client(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            auth_token: None,
        }
    }

    pub fn set_auth(&mut self, token: String) {
        self.auth_token = Some(token);
    }

    pub fn clear_auth(&mut self) {
        self.auth_token = None;
    }

    pub fn auth_token(&self) -> Option<&str> {
        self.auth_token.as_deref()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api{}", self.base_url, path)
    }

    fn token_or_bail(&self) -> Result<&str> {
        self.auth_token
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("auth token not set"))
    }

    // ── Health ────────────────────────────────────────────────────────────

    pub async fn health(&self) -> Result<HealthResponse> {
        let resp = self.client.get(self.url("/health")).send().await?;
        parse_response(resp).await
    }

    // ── Auth ──────────────────────────────────────────────────────────────

    pub async fn register(&self, req: &RegisterRequest) -> Result<AuthTokenResponse> {
        let resp = self
            .client
            .post(self.url("/auth/register"))
            .json(req)
            .send()
            .await?;
        parse_response(resp).await
    }

    pub async fn login(&self, req: &LoginRequest) -> Result<AuthTokenResponse> {
        let resp = self
            .client
            .post(self.url("/auth/login"))
            .json(req)
            .send()
            .await?;
        parse_response(resp).await
    }

    pub async fn refresh(&self, req: &RefreshRequest) -> Result<AuthTokenResponse> {
        let resp = self
            .client
            .post(self.url("/auth/refresh"))
            .json(req)
            .send()
            .await?;
        parse_response(resp).await
    }

    pub async fn logout(&self, req: &LogoutRequest) -> Result<OkResponse> {
        let token = self.token_or_bail()?;
        let resp = self
            .client
            .post(self.url("/auth/logout"))
            .bearer_auth(token)
            .json(req)
            .send()
            .await?;
        parse_response(resp).await
    }

    pub async fn me(&self) -> Result<UserSummary> {
        let token = self.token_or_bail()?;
        let resp = self
            .client
            .get(self.url("/auth/me"))
            .bearer_auth(token)
            .send()
            .await?;
        parse_response(resp).await
    }

    /// Exchange a provider ID token for the reconciled local account.
    pub async fn link_identity(&self, req: &LinkIdentityRequest) -> Result<UserSummary> {
        let resp = self
            .client
            .post(self.url("/auth/link"))
            .json(req)
            .send()
            .await?;
        parse_response(resp).await
    }

    // ── Users ─────────────────────────────────────────────────────────────

    pub async fn list_users(&self) -> Result<UserListResponse> {
        let resp = self.client.get(self.url("/users")).send().await?;
        parse_response(resp).await
    }

    pub async fn get_user(&self, user_id: &str) -> Result<UserDetail> {
        let resp = self
            .client
            .get(self.url(&format!("/users/{user_id}")))
            .send()
            .await?;
        parse_response(resp).await
    }

    pub async fn update_user(&self, req: &UpdateUserRequest) -> Result<UserDetail> {
        let resp = self
            .client
            .put(self.url("/users"))
            .json(req)
            .send()
            .await?;
        parse_response(resp).await
    }

    pub async fn delete_user(&self, req: &DeleteUserRequest) -> Result<MsgResponse> {
        let resp = self
            .client
            .delete(self.url("/users"))
            .json(req)
            .send()
            .await?;
        parse_response(resp).await
    }

    pub async fn toggle_favorite(&self, req: &ToggleFavoriteRequest) -> Result<FavoriteResponse> {
        let token = self.token_or_bail()?;
        let resp = self
            .client
            .post(self.url("/users/favorite"))
            .bearer_auth(token)
            .json(req)
            .send()
            .await?;
        parse_response(resp).await
    }

    // ── Packs & items ─────────────────────────────────────────────────────

    pub async fn create_pack(&self, req: &CreatePackRequest) -> Result<PackSummary> {
        let token = self.token_or_bail()?;
        let resp = self
            .client
            .post(self.url("/packs"))
            .bearer_auth(token)
            .json(req)
            .send()
            .await?;
        parse_response(resp).await
    }

    pub async fn list_packs(&self, owner_id: Option<&str>) -> Result<PackListResponse> {
        let mut req = self.client.get(self.url("/packs"));
        if let Some(owner) = owner_id {
            req = req.query(&[("owner_id", owner)]);
        }
        if let Some(token) = self.auth_token() {
            req = req.bearer_auth(token);
        }
        let resp = req.send().await?;
        parse_response(resp).await
    }

    pub async fn get_pack(&self, pack_id: &str) -> Result<PackDetailResponse> {
        let mut req = self.client.get(self.url(&format!("/packs/{pack_id}")));
        if let Some(token) = self.auth_token() {
            req = req.bearer_auth(token);
        }
        let resp = req.send().await?;
        parse_response(resp).await
    }

    pub async fn update_pack(&self, pack_id: &str, req: &UpdatePackRequest) -> Result<PackSummary> {
        let token = self.token_or_bail()?;
        let resp = self
            .client
            .put(self.url(&format!("/packs/{pack_id}")))
            .bearer_auth(token)
            .json(req)
            .send()
            .await?;
        parse_response(resp).await
    }

    pub async fn delete_pack(&self, pack_id: &str) -> Result<MsgResponse> {
        let token = self.token_or_bail()?;
        let resp = self
            .client
            .delete(self.url(&format!("/packs/{pack_id}")))
            .bearer_auth(token)
            .send()
            .await?;
        parse_response(resp).await
    }

    pub async fn add_item(&self, pack_id: &str, req: &AddItemRequest) -> Result<ItemResponse> {
        let token = self.token_or_bail()?;
        let resp = self
            .client
            .post(self.url(&format!("/packs/{pack_id}/items")))
            .bearer_auth(token)
            .json(req)
            .send()
            .await?;
        parse_response(resp).await
    }

    pub async fn remove_item(&self, pack_id: &str, item_id: &str) -> Result<MsgResponse> {
        let token = self.token_or_bail()?;
        let resp = self
            .client
            .delete(self.url(&format!("/packs/{pack_id}/items/{item_id}")))
            .bearer_auth(token)
            .send()
            .await?;
        parse_response(resp).await
    }

    pub async fn list_items(&self) -> Result<ItemListResponse> {
        let mut req = self.client.get(self.url("/items"));
        if let Some(token) = self.auth_token() {
            req = req.bearer_auth(token);
        }
        let resp = req.send().await?;
        parse_response(resp).await
    }

    // ── Trips ─────────────────────────────────────────────────────────────

    pub async fn create_trip(&self, req: &CreateTripRequest) -> Result<TripDetailResponse> {
        let token = self.token_or_bail()?;
        let resp = self
            .client
            .post(self.url("/trips"))
            .bearer_auth(token)
            .json(req)
            .send()
            .await?;
        parse_response(resp).await
    }

    pub async fn list_trips(&self) -> Result<TripListResponse> {
        let mut req = self.client.get(self.url("/trips"));
        if let Some(token) = self.auth_token() {
            req = req.bearer_auth(token);
        }
        let resp = req.send().await?;
        parse_response(resp).await
    }

    pub async fn get_trip(&self, trip_id: &str) -> Result<TripDetailResponse> {
        let mut req = self.client.get(self.url(&format!("/trips/{trip_id}")));
        if let Some(token) = self.auth_token() {
            req = req.bearer_auth(token);
        }
        let resp = req.send().await?;
        parse_response(resp).await
    }

    pub async fn update_trip(&self, trip_id: &str, req: &UpdateTripRequest) -> Result<TripSummary> {
        let token = self.token_or_bail()?;
        let resp = self
            .client
            .put(self.url(&format!("/trips/{trip_id}")))
            .bearer_auth(token)
            .json(req)
            .send()
            .await?;
        parse_response(resp).await
    }

    pub async fn delete_trip(&self, trip_id: &str) -> Result<MsgResponse> {
        let token = self.token_or_bail()?;
        let resp = self
            .client
            .delete(self.url(&format!("/trips/{trip_id}")))
            .bearer_auth(token)
            .send()
            .await?;
        parse_response(resp).await
    }

    // ── Templates ─────────────────────────────────────────────────────────

    pub async fn list_templates(&self) -> Result<TemplateListResponse> {
        let mut req = self.client.get(self.url("/templates"));
        if let Some(token) = self.auth_token() {
            req = req.bearer_auth(token);
        }
        let resp = req.send().await?;
        parse_response(resp).await
    }

    pub async fn create_template(&self, req: &CreateTemplateRequest) -> Result<TemplateResponse> {
        let token = self.token_or_bail()?;
        let resp = self
            .client
            .post(self.url("/templates"))
            .bearer_auth(token)
            .json(req)
            .send()
            .await?;
        parse_response(resp).await
    }

    pub async fn delete_template(&self, template_id: &str) -> Result<MsgResponse> {
        let token = self.token_or_bail()?;
        let resp = self
            .client
            .delete(self.url(&format!("/templates/{template_id}")))
            .bearer_auth(token)
            .send()
            .await?;
        parse_response(resp).await
    }

    // ── Conversations ─────────────────────────────────────────────────────

    pub async fn list_conversations(&self) -> Result<ConversationListResponse> {
        let token = self.token_or_bail()?;
        let resp = self
            .client
            .get(self.url("/conversations"))
            .bearer_auth(token)
            .send()
            .await?;
        parse_response(resp).await
    }

    pub async fn append_message(&self, req: &AppendMessageRequest) -> Result<ConversationResponse> {
        let token = self.token_or_bail()?;
        let resp = self
            .client
            .post(self.url("/conversations"))
            .bearer_auth(token)
            .json(req)
            .send()
            .await?;
        parse_response(resp).await
    }

    // ── OSM / geo ─────────────────────────────────────────────────────────

    pub async fn osm_query(&self, req: &OsmQueryRequest) -> Result<FeatureCollection> {
        let resp = self
            .client
            .post(self.url("/osm/query"))
            .json(req)
            .send()
            .await?;
        parse_response(resp).await
    }

    pub async fn get_geo(&self, geo_id: &str) -> Result<Feature> {
        let resp = self
            .client
            .get(self.url(&format!("/geo/{geo_id}")))
            .send()
            .await?;
        parse_response(resp).await
    }
}

/// Decode a success body, or surface the server's `{"error": ...}`.
async fn parse_response<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T> {
    let status = resp.status();
    if status.is_success() {
        Ok(resp.json::<T>().await?)
    } else {
        let message = resp
            .json::<ApiError>()
            .await
            .map(|e| e.error)
            .unwrap_or_else(|_| status.to_string());
        bail!("API error ({status}): {message}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_is_normalized() {
        let client = ApiClient::new("http://localhost:3000/", Duration::from_secs(5)).unwrap();
        assert_eq!(client.base_url(), "http://localhost:3000");
        assert_eq!(client.url("/packs"), "http://localhost:3000/api/packs");
    }

    #[test]
    fn auth_token_is_required_for_protected_calls() {
        let mut client = ApiClient::new("http://localhost:3000", Duration::from_secs(5)).unwrap();
        assert!(client.token_or_bail().is_err());
        client.set_auth("jwt".into());
        assert_eq!(client.token_or_bail().unwrap(), "jwt");
        client.clear_auth();
        assert!(client.auth_token().is_none());
    }
}
