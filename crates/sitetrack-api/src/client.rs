use std::sync::{PoisonError, RwLock};

use reqwest::{Client, RequestBuilder, StatusCode};
use sitetrack_core::building::{Building, Level};
use sitetrack_core::project::Project;
use sitetrack_core::session::SessionValidity;
use sitetrack_core::step::StepDescriptor;
use tracing::debug;

use crate::{decode_items, ApiError};

/// Async HTTP client for the construction-project API.
///
/// Attaches `Authorization: Bearer <token>` to every call when a token
/// is set. A 401 surfaces as `ApiError::SessionExpired`; deciding what
/// to do about it belongs to the calling screen, not to this client or
/// the state core.
pub struct ApiClient {
    base_url: String,
    client: Client,
    /// Swapped on login/logout through a shared handle, so interior
    /// mutability instead of `&mut self`.
    token: RwLock<Option<String>>,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Self {
        let base_url = base_url.trim_end_matches('/').to_string();
        Self {
            base_url,
            client: Client::new(),
            token: RwLock::new(None),
        }
    }

    pub fn with_token(base_url: &str, token: String) -> Self {
        let client = Self::new(base_url);
        client.set_token(Some(token));
        client
    }

    pub fn set_token(&self, token: Option<String>) {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = token;
    }

    pub fn has_token(&self) -> bool {
        self.token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn with_auth(&self, builder: RequestBuilder) -> RequestBuilder {
        let token = self
            .token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        match token {
            Some(token) => builder.header("Authorization", format!("Bearer {token}")),
            None => builder,
        }
    }

    async fn get_value(&self, path: &str) -> Result<serde_json::Value, ApiError> {
        debug!("GET {path}");
        let builder = self.client.get(format!("{}{path}", self.base_url));
        let resp = self
            .with_auth(builder)
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| ApiError::Transport(format!("read body: {e}")))?;
        if status.is_success() {
            serde_json::from_str(&body).map_err(|e| ApiError::Decode(e.to_string()))
        } else {
            Err(error_for_status(status, &body))
        }
    }

    async fn get_list<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
    ) -> Result<Vec<T>, ApiError> {
        let value = self.get_value(path).await?;
        decode_items(value)
    }

    // -- Endpoints --

    pub async fn list_projects(&self) -> Result<Vec<Project>, ApiError> {
        self.get_list("/api/projects").await
    }

    /// Raw project overview document, stored as-is in the project
    /// context's `project_data`.
    pub async fn project_overview(
        &self,
        project_id: &str,
    ) -> Result<serde_json::Value, ApiError> {
        self.get_value(&format!("/api/projects/{project_id}/overview"))
            .await
    }

    pub async fn list_step_cards(
        &self,
        project_id: &str,
    ) -> Result<Vec<StepDescriptor>, ApiError> {
        self.get_list(&format!("/api/projects/{project_id}/steps"))
            .await
    }

    pub async fn list_buildings(
        &self,
        project_id: &str,
        step_id: &str,
    ) -> Result<Vec<Building>, ApiError> {
        self.get_list(&format!(
            "/api/projects/{project_id}/steps/{step_id}/buildings"
        ))
        .await
    }

    pub async fn list_levels(&self, building_id: &str) -> Result<Vec<Level>, ApiError> {
        self.get_list(&format!("/api/buildings/{building_id}/levels"))
            .await
    }

    /// Resolve a short-lived download URL for a stored image.
    pub async fn image_url(&self, file_key: &str) -> Result<String, ApiError> {
        let value = self.get_value(&format!("/api/files/{file_key}/url")).await?;
        url_from_value(value)
    }

    /// Check whether the current token is still accepted. A 401 maps to
    /// `SessionExpired` like any other call; a 2xx body carries the
    /// server's verdict.
    pub async fn validate_session(&self) -> Result<SessionValidity, ApiError> {
        let value = self.get_value("/api/session/validate").await?;
        serde_json::from_value(value).map_err(|e| ApiError::Decode(e.to_string()))
    }
}

/// The files endpoint answers with either a bare URL string or
/// `{ "url": … }` depending on server version; accept both.
fn url_from_value(value: serde_json::Value) -> Result<String, ApiError> {
    match value {
        serde_json::Value::String(url) => Ok(url),
        other => other["url"]
            .as_str()
            .map(String::from)
            .ok_or_else(|| ApiError::Decode("missing url in response".into())),
    }
}

fn error_for_status(status: StatusCode, body: &str) -> ApiError {
    let msg = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v["error"].as_str().map(String::from))
        .unwrap_or_else(|| body.to_string());

    match status {
        StatusCode::UNAUTHORIZED => ApiError::SessionExpired,
        StatusCode::NOT_FOUND => ApiError::NotFound(msg),
        StatusCode::BAD_REQUEST => ApiError::InvalidInput(msg),
        _ => ApiError::Transport(msg),
    }
}
