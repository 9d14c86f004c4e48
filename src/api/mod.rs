//! REST API client module.
//!
//! Every call carries a bearer token fetched fresh from the auth provider, and every
//! response is normalized into typed models before it leaves this module.

mod foods;
mod requests;
mod users;

use std::sync::Arc;

use reqwest::{Method, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::auth::AuthProvider;
use crate::config::Config;
use crate::errors::AppError;
use crate::models::{decode_ack, decode_item, decode_list, Acknowledgement};

/// Thin HTTP client for the marketplace backend.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    auth: Arc<dyn AuthProvider>,
}

impl ApiClient {
    /// Create a client from configuration.
    pub fn new(config: &Config, auth: Arc<dyn AuthProvider>) -> Result<Self, AppError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build HTTP client: {}", e)))?;
        Self::with_client(http, &config.backend_url, auth)
    }

    /// Create a client around an existing `reqwest::Client`.
    pub fn with_client(
        http: reqwest::Client,
        base_url: &str,
        auth: Arc<dyn AuthProvider>,
    ) -> Result<Self, AppError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| AppError::Config(format!("Invalid backend URL {}: {}", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(AppError::Config(format!(
                "Backend URL {} cannot be a base",
                base_url
            )));
        }
        Ok(Self {
            http,
            base_url,
            auth,
        })
    }

    /// Build an endpoint URL from path segments. Segments are percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, AppError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| AppError::Config("Backend URL cannot be a base".to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Send a request and return the body of a successful response.
    async fn send(
        &self,
        method: Method,
        segments: &[&str],
        body: Option<serde_json::Value>,
    ) -> Result<String, AppError> {
        let url = self.endpoint(segments)?;
        let mut request = self.http.request(method.clone(), url.clone());

        if let Some(token) = self.auth.id_token().await? {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(&body);
        }

        tracing::debug!("{} {}", method, url);
        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let err = AppError::from_response(status.as_u16(), &text);
            tracing::warn!("{} {} failed: {}", method, url, err);
            return Err(err);
        }

        tracing::debug!("{} {} -> {}", method, url, status);
        Ok(text)
    }

    async fn get_list<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<Vec<T>, AppError> {
        let body = self.send(Method::GET, segments, None).await?;
        decode_list(&body)
    }

    async fn get_item<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T, AppError> {
        let body = self.send(Method::GET, segments, None).await?;
        decode_item(&body)
    }

    async fn mutate<B: Serialize>(
        &self,
        method: Method,
        segments: &[&str],
        payload: Option<&B>,
    ) -> Result<Acknowledgement, AppError> {
        let body = payload.map(serde_json::to_value).transpose()?;
        let text = self.send(method, segments, body).await?;
        Ok(decode_ack(&text))
    }
}
