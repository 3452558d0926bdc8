//! Session state: bearer credential lifecycle and session-change broadcast
//!
//! The token lives in the durable store under [`TOKEN_KEY`]; the API client
//! reads it from there on every request. This module owns the writes:
//! login stores it, logout and a rejected validation remove it.
//!
//! Session changes are published as typed [`SessionEvent`]s on a broadcast
//! channel. Views hold a receiver and react; dropping the receiver is the
//! unsubscribe.

use crate::api::models::User;
use crate::api::{ApiClient, ApiError};
use crate::storage::{SharedStore, TOKEN_KEY};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::sync::broadcast;

/// Buffered session events per subscriber before lagging
const EVENT_CAPACITY: usize = 16;

/// Session changes other parts of the app react to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// A token was stored after a successful login
    Established,
    /// The token was removed (logout or rejected validation)
    Cleared,
}

#[derive(Debug, Clone)]
pub struct LoginCredentials {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    access_token: Option<String>,
    #[allow(dead_code)]
    #[serde(default)]
    token_type: Option<String>,
}

#[derive(Debug, Serialize)]
struct RegisterRequest<'a> {
    email: &'a str,
    password: &'a str,
}

/// Credential holder shared by the TUI and CLI
#[derive(Clone)]
pub struct Session {
    client: ApiClient,
    store: SharedStore,
    events: broadcast::Sender<SessionEvent>,
}

impl Session {
    pub fn new(client: ApiClient, store: SharedStore) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            client,
            store,
            events,
        }
    }

    /// Subscribe to session changes
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    fn publish(&self, event: SessionEvent) {
        // No subscribers is fine (CLI mode)
        let _ = self.events.send(event);
    }

    /// Exchange username/password for a bearer token
    ///
    /// Returns `true` only when the backend handed back a token, which is
    /// then stored. Bad credentials, transport errors and malformed replies
    /// all yield `false` with nothing stored.
    pub async fn login(&self, credentials: &LoginCredentials) -> bool {
        let url = self.client.url("auth/jwt/login");
        let form = [
            ("username", credentials.username.as_str()),
            ("password", credentials.password.as_str()),
        ];
        let builder = self.client.request(Method::POST, &url).form(&form);

        let response: LoginResponse = match self.client.send(builder).await {
            Ok(response) => response,
            Err(e) => {
                tracing::error!("Login failed: {}", e);
                return false;
            }
        };

        let Some(token) = response.access_token.filter(|t| !t.is_empty()) else {
            tracing::error!("Login failed: response carried no access token");
            return false;
        };

        if let Err(e) = self.store.set(TOKEN_KEY, &token) {
            tracing::error!("Failed to store token: {:#}", e);
            return false;
        }

        tracing::info!("Logged in as {}", credentials.username);
        self.publish(SessionEvent::Established);
        true
    }

    /// Best-effort server logout, then unconditional local cleanup
    pub async fn logout(&self) {
        if self.get_token().is_some() {
            let url = self.client.url("auth/jwt/logout");
            let builder = self.client.request(Method::POST, &url);
            if let Err(e) = self.client.send::<serde_json::Value>(builder).await {
                tracing::warn!("Server logout failed: {}", e);
            }
        }

        self.remove_token();
        tracing::info!("Logged out");
        self.publish(SessionEvent::Cleared);
    }

    /// Whether the stored token is still accepted by the backend
    ///
    /// A stored token may be stale, so presence alone is not enough. A 401
    /// from the validation call removes the token and broadcasts
    /// [`SessionEvent::Cleared`]; other failures leave it in place.
    pub async fn is_authenticated(&self) -> bool {
        if self.get_token().is_none() {
            return false;
        }

        match self.fetch_current_user().await {
            Ok(_) => true,
            Err(e) if e.is_unauthorized() => {
                tracing::info!("Stored token rejected, clearing session");
                self.remove_token();
                self.publish(SessionEvent::Cleared);
                false
            }
            Err(e) => {
                tracing::error!("Failed to validate session: {}", e);
                false
            }
        }
    }

    /// `GET /users/me`, or `None` on any failure
    pub async fn current_user(&self) -> Option<User> {
        match self.fetch_current_user().await {
            Ok(user) => Some(user),
            Err(e) => {
                tracing::error!("Failed to get user: {}", e);
                None
            }
        }
    }

    async fn fetch_current_user(&self) -> Result<User, ApiError> {
        let url = self.client.url("users/me");
        let builder = self.client.request(Method::GET, &url);
        self.client.send(builder).await
    }

    pub fn get_token(&self) -> Option<String> {
        self.client.token()
    }

    pub fn remove_token(&self) {
        if let Err(e) = self.store.remove(TOKEN_KEY) {
            tracing::error!("Failed to remove token: {:#}", e);
        }
    }

    /// `POST /auth/register`
    pub async fn register(&self, email: &str, password: &str) -> Option<User> {
        let url = self.client.url("auth/register");
        let builder = self
            .client
            .request(Method::POST, &url)
            .json(&RegisterRequest { email, password });
        match self.client.send(builder).await {
            Ok(user) => Some(user),
            Err(e) => {
                tracing::error!("Registration failed: {}", e);
                None
            }
        }
    }

    /// `POST /auth/forgot-password`
    pub async fn request_password_reset(&self, email: &str) -> bool {
        self.post_ok("auth/forgot-password", json!({ "email": email }))
            .await
    }

    /// `POST /auth/reset-password`
    pub async fn reset_password(&self, token: &str, password: &str) -> bool {
        self.post_ok(
            "auth/reset-password",
            json!({ "token": token, "password": password }),
        )
        .await
    }

    async fn post_ok(&self, path: &str, body: serde_json::Value) -> bool {
        let url = self.client.url(path);
        let builder = self.client.request(Method::POST, &url).json(&body);
        match self.client.send::<serde_json::Value>(builder).await {
            Ok(_) => true,
            Err(e) => {
                tracing::error!("{} failed: {}", path, e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use std::time::Duration;
    use wiremock::matchers::{body_string_contains, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn session_for(server: &MockServer) -> (Session, SharedStore) {
        let store = MemoryStore::shared();
        let client = ApiClient::new(
            format!("{}/api", server.uri()),
            store.clone(),
            Duration::from_secs(5),
        )
        .unwrap();
        (Session::new(client, store.clone()), store)
    }

    fn credentials() -> LoginCredentials {
        LoginCredentials {
            username: "user@example.com".into(),
            password: "hunter2".into(),
        }
    }

    #[tokio::test]
    async fn test_login_stores_token_and_broadcasts() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/jwt/login"))
            .and(header("content-type", "application/x-www-form-urlencoded"))
            .and(body_string_contains("username=user%40example.com"))
            .and(body_string_contains("password=hunter2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(
                serde_json::json!({"access_token": "tok-1", "token_type": "bearer"}),
            ))
            .expect(1)
            .mount(&server)
            .await;

        let (session, store) = session_for(&server);
        let mut events = session.subscribe();

        assert!(session.login(&credentials()).await);
        assert_eq!(store.get(TOKEN_KEY).unwrap().as_deref(), Some("tok-1"));
        assert_eq!(events.recv().await.unwrap(), SessionEvent::Established);
    }

    #[tokio::test]
    async fn test_login_failure_stores_nothing() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/jwt/login"))
            .respond_with(
                ResponseTemplate::new(400)
                    .set_body_json(serde_json::json!({"detail": "LOGIN_BAD_CREDENTIALS"})),
            )
            .mount(&server)
            .await;

        let (session, store) = session_for(&server);
        assert!(!session.login(&credentials()).await);
        assert!(store.get(TOKEN_KEY).unwrap().is_none());
    }

    #[tokio::test]
    async fn test_login_without_token_in_response_fails() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/jwt/login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .mount(&server)
            .await;

        let (session, store) = session_for(&server);
        assert!(!session.login(&credentials()).await);
        assert!(store.get(TOKEN_KEY).unwrap().is_none());
    }

    #[tokio::test]
    async fn test_login_network_error_returns_false() {
        let store = MemoryStore::shared();
        // Nothing listens on port 9 locally
        let client =
            ApiClient::new("http://127.0.0.1:9/api", store.clone(), Duration::from_secs(1))
                .unwrap();
        let session = Session::new(client, store.clone());

        assert!(!session.login(&credentials()).await);
        assert!(store.get(TOKEN_KEY).unwrap().is_none());
    }

    #[tokio::test]
    async fn test_is_authenticated_clears_token_on_401() {
        for stale in ["stale", "", "eyJhbGciOiJIUzI1NiJ9.e30.x"] {
            let server = MockServer::start().await;
            Mock::given(method("GET"))
                .and(path("/api/users/me"))
                .respond_with(
                    ResponseTemplate::new(401)
                        .set_body_json(serde_json::json!({"detail": "Unauthorized"})),
                )
                .mount(&server)
                .await;

            let (session, store) = session_for(&server);
            store.set(TOKEN_KEY, stale).unwrap();
            let mut events = session.subscribe();

            assert!(!session.is_authenticated().await);
            assert!(store.get(TOKEN_KEY).unwrap().is_none());
            assert_eq!(events.recv().await.unwrap(), SessionEvent::Cleared);
        }
    }

    #[tokio::test]
    async fn test_is_authenticated_accepts_valid_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/users/me"))
            .and(header("Authorization", "Bearer good"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "6f0c", "email": "user@example.com",
                "is_active": true, "is_superuser": false, "is_verified": true
            })))
            .mount(&server)
            .await;

        let (session, store) = session_for(&server);
        store.set(TOKEN_KEY, "good").unwrap();

        assert!(session.is_authenticated().await);
        assert_eq!(store.get(TOKEN_KEY).unwrap().as_deref(), Some("good"));
        let user = session.current_user().await.unwrap();
        assert_eq!(user.email, "user@example.com");
    }

    #[tokio::test]
    async fn test_is_authenticated_without_token_skips_network() {
        let server = MockServer::start().await;
        let (session, _store) = session_for(&server);

        assert!(!session.is_authenticated().await);
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_server_error_keeps_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/users/me"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let (session, store) = session_for(&server);
        store.set(TOKEN_KEY, "maybe").unwrap();

        assert!(!session.is_authenticated().await);
        assert_eq!(store.get(TOKEN_KEY).unwrap().as_deref(), Some("maybe"));
    }

    #[tokio::test]
    async fn test_logout_clears_even_when_server_fails() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/jwt/logout"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&server)
            .await;

        let (session, store) = session_for(&server);
        store.set(TOKEN_KEY, "tok").unwrap();
        let mut events = session.subscribe();

        session.logout().await;
        assert!(store.get(TOKEN_KEY).unwrap().is_none());
        assert_eq!(events.recv().await.unwrap(), SessionEvent::Cleared);
    }

    #[tokio::test]
    async fn test_password_reset_calls() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/forgot-password"))
            .respond_with(ResponseTemplate::new(202))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/auth/reset-password"))
            .respond_with(ResponseTemplate::new(400))
            .mount(&server)
            .await;

        let (session, _store) = session_for(&server);
        assert!(session.request_password_reset("user@example.com").await);
        assert!(!session.reset_password("bad", "pw").await);
    }
}
