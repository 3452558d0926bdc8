//! Remote resource client for the task backend
//!
//! Every feature talks to the backend through [`Resource`], a thin wrapper
//! that maps list/get/create/update/patch/delete/custom operations onto one
//! HTTP call each against `{base_url}/{resource}/...`.
//!
//! # Failure policy
//!
//! The plain operations never return errors: failures are logged through
//! `tracing` and collapse to `None`, an empty `Vec`, or `false`. Callers
//! decide whether the UI shows anything. [`Resource::custom_detailed`] is the
//! one exception; it hands back a typed [`ApiError`] so the sources editor
//! can show the backend's `detail` message.
//!
//! # Authentication
//!
//! The bearer token is read from the durable store on every call, so a login
//! or logout elsewhere in the app takes effect on the next request without
//! rebuilding the client.

pub mod models;

use crate::storage::{SharedStore, TOKEN_KEY};
use anyhow::{Context, Result};
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::fmt::Display;
use std::time::Duration;

/// Errors surfaced by [`Resource::custom_detailed`] and the session module
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Connection refused, timeout, TLS failure, ...
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Backend answered with a non-success status
    #[error("HTTP {status}: {}", .detail.as_deref().unwrap_or("no detail"))]
    Status {
        status: StatusCode,
        detail: Option<String>,
    },

    /// Body was not the JSON we expected
    #[error("decode error: {0}")]
    Decode(String),
}

impl ApiError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Status { status, .. } if *status == StatusCode::UNAUTHORIZED)
    }

    /// Backend-provided `detail`, if the error carried one
    pub fn detail(&self) -> Option<&str> {
        match self {
            ApiError::Status { detail, .. } => detail.as_deref(),
            _ => None,
        }
    }
}

/// HTTP client bound to the backend base URL and the token store
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    store: SharedStore,
}

impl ApiClient {
    /// Create a client for `base_url` (e.g. `http://localhost:8000/api`)
    pub fn new(base_url: impl Into<String>, store: SharedStore, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        let base_url = base_url.into().trim_end_matches('/').to_string();

        Ok(Self {
            http,
            base_url,
            store,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Handle for a named resource collection
    pub fn resource(&self, name: &str) -> Resource {
        Resource {
            client: self.clone(),
            name: name.to_string(),
        }
    }

    /// Current bearer token, if one is stored
    pub fn token(&self) -> Option<String> {
        match self.store.get(TOKEN_KEY) {
            Ok(token) => token,
            Err(e) => {
                tracing::error!("Failed to read token: {:#}", e);
                None
            }
        }
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Start a request, attaching the bearer token when present
    pub(crate) fn request(&self, method: Method, url: &str) -> RequestBuilder {
        let builder = self.http.request(method, url);
        match self.token() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Send and decode a JSON response
    ///
    /// Empty bodies decode as `null` so endpoints answering `204` or `""`
    /// still succeed for `Value` callers.
    pub(crate) async fn send<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
    ) -> Result<T, ApiError> {
        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(ApiError::Status {
                status,
                detail: extract_detail(&body),
            });
        }

        let body = if body.trim().is_empty() { "null" } else { &body };
        serde_json::from_str(body).map_err(|e| ApiError::Decode(e.to_string()))
    }
}

/// Pull FastAPI's `{"detail": ...}` out of an error body
fn extract_detail(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    match value.get("detail")? {
        Value::String(s) => Some(s.clone()),
        Value::Null => None,
        // Validation errors come back as a list of objects
        other => Some(other.to_string()),
    }
}

/// A named collection on the backend (`news_task`, `crypto_task`, ...)
#[derive(Clone)]
pub struct Resource {
    client: ApiClient,
    name: String,
}

impl Resource {
    pub fn name(&self) -> &str {
        &self.name
    }

    fn collection_url(&self) -> String {
        self.client.url(&format!("{}/", self.name))
    }

    fn item_url(&self, id: impl Display) -> String {
        self.client.url(&format!("{}/{}", self.name, id))
    }

    fn action_url(&self, action: &str) -> String {
        let action = action.trim_matches('/');
        if action.is_empty() {
            self.collection_url()
        } else {
            self.client.url(&format!("{}/{}", self.name, action))
        }
    }

    /// `GET /{resource}/`
    pub async fn list<T: DeserializeOwned>(&self) -> Vec<T> {
        let builder = self.client.request(Method::GET, &self.collection_url());
        match self.client.send(builder).await {
            Ok(items) => items,
            Err(e) => {
                tracing::error!("Failed to fetch {}: {}", self.name, e);
                Vec::new()
            }
        }
    }

    /// `GET /{resource}/{id}`
    pub async fn get<T: DeserializeOwned>(&self, id: impl Display) -> Option<T> {
        let builder = self.client.request(Method::GET, &self.item_url(&id));
        self.log_failure(self.client.send(builder).await, "fetch", Some(&id))
    }

    /// `POST /{resource}/`
    pub async fn create<B: Serialize + ?Sized, T: DeserializeOwned>(&self, body: &B) -> Option<T> {
        let builder = self
            .client
            .request(Method::POST, &self.collection_url())
            .json(body);
        self.log_failure(self.client.send(builder).await, "create", None::<&str>)
    }

    /// `PUT /{resource}/{id}` with the full record
    pub async fn update<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        id: impl Display,
        body: &B,
    ) -> Option<T> {
        let builder = self
            .client
            .request(Method::PUT, &self.item_url(&id))
            .json(body);
        self.log_failure(self.client.send(builder).await, "update", Some(&id))
    }

    /// `PATCH /{resource}/{id}` with a partial record
    pub async fn patch<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        id: impl Display,
        body: &B,
    ) -> Option<T> {
        let builder = self
            .client
            .request(Method::PATCH, &self.item_url(&id))
            .json(body);
        self.log_failure(self.client.send(builder).await, "patch", Some(&id))
    }

    /// `DELETE /{resource}/{id}`
    pub async fn delete(&self, id: impl Display) -> bool {
        let builder = self.client.request(Method::DELETE, &self.item_url(&id));
        self.log_failure(self.client.send::<Value>(builder).await, "delete", Some(&id))
            .is_some()
    }

    /// Non-CRUD call: `{method} /{resource}/{action}` with an optional JSON body
    pub async fn custom_detailed(
        &self,
        method: Method,
        action: &str,
        body: Option<&Value>,
    ) -> Result<Value, ApiError> {
        let mut builder = self.client.request(method, &self.action_url(action));
        if let Some(body) = body {
            builder = builder.json(body);
        }
        self.client.send(builder).await
    }

    /// Like [`custom_detailed`](Self::custom_detailed) but logs and swallows failures
    pub async fn custom(&self, method: Method, action: &str, body: Option<&Value>) -> Option<Value> {
        match self.custom_detailed(method.clone(), action, body).await {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::error!("{} {}/{} failed: {}", method, self.name, action, e);
                None
            }
        }
    }

    /// Custom call decoded into a concrete type
    pub async fn custom_as<T: DeserializeOwned>(
        &self,
        method: Method,
        action: &str,
        body: Option<&Value>,
    ) -> Option<T> {
        let value = self.custom(method, action, body).await?;
        match serde_json::from_value(value) {
            Ok(decoded) => Some(decoded),
            Err(e) => {
                tracing::error!("Unexpected {}/{} payload: {}", self.name, action, e);
                None
            }
        }
    }

    fn log_failure<T>(
        &self,
        result: Result<T, ApiError>,
        op: &str,
        id: Option<impl Display>,
    ) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(e) => {
                match id {
                    Some(id) => tracing::error!("Failed to {} {} {}: {}", op, self.name, id, e),
                    None => tracing::error!("Failed to {} {}: {}", op, self.name, e),
                }
                None
            }
        }
    }
}
