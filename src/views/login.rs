//! Login screen state

use super::form::{Field, Form};
use super::Status;
use crate::session::{LoginCredentials, Session};

pub struct LoginView {
    pub form: Form,
    pub status: Option<Status>,
}

impl Default for LoginView {
    fn default() -> Self {
        Self::new()
    }
}

impl LoginView {
    pub fn new() -> Self {
        Self {
            form: Form::new(vec![
                Field::text("username", "Email").required(),
                Field::secret("password", "Password").required(),
            ]),
            status: None,
        }
    }

    /// Try the typed credentials; the password is cleared either way
    ///
    /// Routing after success is driven by the session broadcast, not here.
    pub async fn submit(&mut self, session: &Session) -> bool {
        if let Err(e) = self.form.validate() {
            self.status = Some(Status::error(e.to_string()));
            return false;
        }
        let credentials = LoginCredentials {
            username: self.form.value("username").to_string(),
            password: self.form.value("password").to_string(),
        };
        self.form.set("password", "");

        if session.login(&credentials).await {
            self.status = None;
            true
        } else {
            self.status = Some(Status::error("Invalid credentials"));
            self.form.focus = 1;
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiClient;
    use crate::storage::{MemoryStore, TOKEN_KEY};
    use std::time::Duration;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn session_for(server: &MockServer) -> (Session, crate::storage::SharedStore) {
        let store = MemoryStore::shared();
        let client = ApiClient::new(
            format!("{}/api", server.uri()),
            store.clone(),
            Duration::from_secs(5),
        )
        .unwrap();
        (Session::new(client, store.clone()), store)
    }

    #[tokio::test]
    async fn test_blank_form_skips_network() {
        let server = MockServer::start().await;
        let (session, _) = session_for(&server);
        let mut view = LoginView::new();

        assert!(!view.submit(&session).await);
        assert_eq!(view.status, Some(Status::error("Required: Email, Password")));
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_rejected_login_shows_message_and_clears_password() {
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

        let mut view = LoginView::new();
        view.form.set("username", "user@example.com");
        view.form.set("password", "wrong");

        assert!(!view.submit(&session).await);
        assert_eq!(view.status, Some(Status::error("Invalid credentials")));
        assert_eq!(view.form.value("password"), "");
        assert_eq!(view.form.value("username"), "user@example.com");
        assert_eq!(store.get(TOKEN_KEY).unwrap(), None);
    }

    #[tokio::test]
    async fn test_successful_login_stores_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/jwt/login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(
                serde_json::json!({"access_token": "tok-9", "token_type": "bearer"}),
            ))
            .mount(&server)
            .await;
        let (session, store) = session_for(&server);

        let mut view = LoginView::new();
        view.form.set("username", "user@example.com");
        view.form.set("password", "hunter2");

        assert!(view.submit(&session).await);
        assert!(view.status.is_none());
        assert_eq!(store.get(TOKEN_KEY).unwrap().as_deref(), Some("tok-9"));
    }
}
