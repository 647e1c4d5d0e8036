use reqwest::{
    header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE},
    Client, Method,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, error};

use shared_config::AppConfig;

/// Failures talking to the data API, classified so callers can map them onto
/// their own taxonomy. Timeouts and 5xx are `Transient` (retryable by the
/// caller, never retried here).
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("data api authentication failed: {0}")]
    Auth(String),

    #[error("data api path not found: {0}")]
    MissingRoute(String),

    #[error("data api rejected the request ({status}): {body}")]
    Api { status: u16, body: String },

    #[error("data api unavailable: {0}")]
    Transient(String),

    #[error("failed to decode data api response: {0}")]
    Decode(String),

    #[error("write returned no representation")]
    EmptyRepresentation,
}

/// Thin client for the PostgREST-style data API. Row filters travel in the
/// query string (`column=eq.{value}`, `lt.`/`gt.`/`neq.`); writes that need
/// the stored row back send `Prefer: return=representation`.
#[derive(Clone)]
pub struct RestClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl RestClient {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.data_api_url.clone(),
            api_key: config.data_api_key.clone(),
        }
    }

    fn headers(&self, auth_token: Option<&str>) -> HeaderMap {
        let mut headers = HeaderMap::new();

        headers.insert("apikey", HeaderValue::from_str(&self.api_key).unwrap());
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        if let Some(token) = auth_token {
            headers.insert(
                AUTHORIZATION,
                HeaderValue::from_str(&format!("Bearer {}", token)).unwrap(),
            );
        }

        headers
    }

    pub async fn request<T>(
        &self,
        method: Method,
        path: &str,
        auth_token: Option<&str>,
        body: Option<Value>,
    ) -> Result<T, StoreError>
    where
        T: DeserializeOwned,
    {
        self.request_with_headers(method, path, auth_token, body, HeaderMap::new())
            .await
    }

    pub async fn request_with_headers<T>(
        &self,
        method: Method,
        path: &str,
        auth_token: Option<&str>,
        body: Option<Value>,
        extra_headers: HeaderMap,
    ) -> Result<T, StoreError>
    where
        T: DeserializeOwned,
    {
        let response = self
            .send(method, path, auth_token, body, extra_headers)
            .await?;

        response
            .json::<T>()
            .await
            .map_err(|e| StoreError::Decode(e.to_string()))
    }

    /// Variant for writes where the response body is irrelevant (deletes,
    /// status-only patches without representation).
    pub async fn execute(
        &self,
        method: Method,
        path: &str,
        auth_token: Option<&str>,
        body: Option<Value>,
    ) -> Result<(), StoreError> {
        self.send(method, path, auth_token, body, HeaderMap::new())
            .await?;
        Ok(())
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        auth_token: Option<&str>,
        body: Option<Value>,
        extra_headers: HeaderMap,
    ) -> Result<reqwest::Response, StoreError> {
        let url = format!("{}{}", self.base_url, path);
        debug!("Making request to {}", url);

        let mut headers = self.headers(auth_token);
        headers.extend(extra_headers);

        let mut req = self.client.request(method, &url).headers(headers);

        if let Some(body_data) = body {
            req = req.json(&body_data);
        }

        let response = req.send().await.map_err(|e| {
            if e.is_timeout() || e.is_connect() {
                StoreError::Transient(format!("request to {} failed: {}", url, e))
            } else {
                StoreError::Transient(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!("Data API error ({}): {}", status, error_text);

            return Err(match status.as_u16() {
                401 | 403 => StoreError::Auth(error_text),
                404 => StoreError::MissingRoute(error_text),
                408 | 429 | 500..=599 => StoreError::Transient(format!(
                    "data api returned {}: {}",
                    status, error_text
                )),
                other => StoreError::Api {
                    status: other,
                    body: error_text,
                },
            });
        }

        Ok(response)
    }

    /// `POST` returning the inserted rows.
    pub async fn insert<T>(
        &self,
        path: &str,
        auth_token: Option<&str>,
        body: Value,
    ) -> Result<T, StoreError>
    where
        T: DeserializeOwned,
    {
        self.request_with_headers(
            Method::POST,
            path,
            auth_token,
            Some(body),
            representation_headers(),
        )
        .await
    }

    /// `PATCH` against a filter path, returning the updated rows.
    pub async fn update<T>(
        &self,
        path: &str,
        auth_token: Option<&str>,
        body: Value,
    ) -> Result<T, StoreError>
    where
        T: DeserializeOwned,
    {
        self.request_with_headers(
            Method::PATCH,
            path,
            auth_token,
            Some(body),
            representation_headers(),
        )
        .await
    }

    pub async fn delete(&self, path: &str, auth_token: Option<&str>) -> Result<(), StoreError> {
        self.execute(Method::DELETE, path, auth_token, None).await
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

fn representation_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert("Prefer", HeaderValue::from_static("return=representation"));
    headers
}
