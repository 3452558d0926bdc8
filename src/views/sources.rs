//! Sources editor for one news task
//!
//! Two name→URL lists (Telegram channels and RSS feeds). Adding a source
//! asks the backend to validate it first; the list only changes once the
//! backend accepts the call, and a rejection shows the backend's `detail`.

use super::form::{Field, Form};
use super::{clamp_selection, select_next, select_prev, Status};
use crate::api::models::{NewsTask, SourceRequest, SourceType};
use crate::api::{ApiClient, ApiError, Resource};
use reqwest::Method;
use std::collections::BTreeMap;

use super::news_tasks::RESOURCE;

pub struct SourcesView {
    resource: Resource,
    pub task_id: i64,
    pub task_title: Option<String>,
    pub telegram: BTreeMap<String, String>,
    pub rss: BTreeMap<String, String>,
    /// List that keyboard actions apply to
    pub active: SourceType,
    pub selected: usize,
    /// Name/URL inputs for a new entry
    pub add_form: Form,
    pub status: Option<Status>,
}

fn add_form() -> Form {
    Form::new(vec![
        Field::text("name", "Name").required(),
        Field::text("url", "URL").required(),
    ])
}

/// Status text for a failed add/remove call
fn failure_message(error: &ApiError, fallback: &str) -> String {
    error
        .detail()
        .map(str::to_string)
        .unwrap_or_else(|| fallback.to_string())
}

impl SourcesView {
    pub fn new(client: &ApiClient, task_id: i64) -> Self {
        Self {
            resource: client.resource(RESOURCE),
            task_id,
            task_title: None,
            telegram: BTreeMap::new(),
            rss: BTreeMap::new(),
            active: SourceType::Telegram,
            selected: 0,
            add_form: add_form(),
            status: None,
        }
    }

    /// Fetch the task and take its current source maps
    pub async fn load(&mut self) {
        match self.resource.get::<NewsTask>(self.task_id).await {
            Some(task) => {
                self.task_title = Some(task.title);
                self.telegram = task.tg_urls;
                self.rss = task.rss_urls;
            }
            None => self.status = Some(Status::error("Failed to load task sources")),
        }
        let len = self.active_list().len();
        clamp_selection(&mut self.selected, len);
    }

    pub fn list(&self, source_type: SourceType) -> &BTreeMap<String, String> {
        match source_type {
            SourceType::Telegram => &self.telegram,
            SourceType::Rss => &self.rss,
        }
    }

    fn list_mut(&mut self, source_type: SourceType) -> &mut BTreeMap<String, String> {
        match source_type {
            SourceType::Telegram => &mut self.telegram,
            SourceType::Rss => &mut self.rss,
        }
    }

    pub fn active_list(&self) -> &BTreeMap<String, String> {
        self.list(self.active)
    }

    pub fn switch_list(&mut self) {
        self.active = match self.active {
            SourceType::Telegram => SourceType::Rss,
            SourceType::Rss => SourceType::Telegram,
        };
        self.selected = 0;
    }

    pub fn select_next(&mut self) {
        let len = self.active_list().len();
        select_next(&mut self.selected, len);
    }

    pub fn select_prev(&mut self) {
        select_prev(&mut self.selected);
    }

    pub fn selected_entry(&self) -> Option<(String, String)> {
        self.active_list()
            .iter()
            .nth(self.selected)
            .map(|(name, url)| (name.clone(), url.clone()))
    }

    fn request(&self, source_type: SourceType, name: &str, url: &str) -> SourceRequest {
        SourceRequest {
            source_url: url.to_string(),
            source_name: name.to_string(),
            source_type,
            task_id: self.task_id,
        }
    }

    /// `POST news_task/add_source` with the add form's name and URL
    pub async fn add(&mut self) -> bool {
        if let Err(e) = self.add_form.validate() {
            self.status = Some(Status::error(e.to_string()));
            return false;
        }
        let name = self.add_form.value("name").to_string();
        let url = self.add_form.value("url").to_string();
        let source_type = self.active;

        let body = match serde_json::to_value(self.request(source_type, &name, &url)) {
            Ok(body) => body,
            Err(e) => {
                tracing::error!("Failed to encode source request: {}", e);
                return false;
            }
        };

        match self
            .resource
            .custom_detailed(Method::POST, "add_source", Some(&body))
            .await
        {
            Ok(_) => {
                self.list_mut(source_type).insert(name.clone(), url);
                self.add_form.reset();
                self.status = Some(Status::info(format!(
                    "Added {} source \"{}\"",
                    source_type.label(),
                    name
                )));
                true
            }
            Err(e) => {
                tracing::error!("Error validating source {}: {}", url, e);
                self.status = Some(Status::error(failure_message(&e, "Failed to add source")));
                false
            }
        }
    }

    /// `DELETE news_task/remove_source` for the selected entry
    pub async fn remove_selected(&mut self) -> bool {
        let Some((name, url)) = self.selected_entry() else {
            return false;
        };
        let source_type = self.active;

        let body = match serde_json::to_value(self.request(source_type, &name, &url)) {
            Ok(body) => body,
            Err(e) => {
                tracing::error!("Failed to encode source request: {}", e);
                return false;
            }
        };

        match self
            .resource
            .custom_detailed(Method::DELETE, "remove_source", Some(&body))
            .await
        {
            Ok(_) => {
                self.list_mut(source_type).remove(&name);
                let len = self.active_list().len();
                clamp_selection(&mut self.selected, len);
                self.status = None;
                true
            }
            Err(e) => {
                tracing::error!("Error removing source {}: {}", name, e);
                self.status = Some(Status::error(failure_message(
                    &e,
                    "Failed to remove source",
                )));
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::views::test_support::client_for;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn loaded_view(server: &MockServer) -> SourcesView {
        Mock::given(method("GET"))
            .and(path("/api/news_task/12"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": 12,
                "title": "Elections",
                "description": "d",
                "is_active": true,
                "tg_urls": {"durov": "https://t.me/durov"},
                "rss_urls": {"bbc": "https://feeds.bbci.co.uk/news/rss.xml"}
            })))
            .mount(server)
            .await;
        let mut view = SourcesView::new(&client_for(server), 12);
        view.load().await;
        view
    }

    #[tokio::test]
    async fn test_load_fills_both_lists() {
        let server = MockServer::start().await;
        let view = loaded_view(&server).await;
        assert_eq!(view.task_title.as_deref(), Some("Elections"));
        assert_eq!(view.telegram.len(), 1);
        assert_eq!(view.rss.len(), 1);
        assert_eq!(
            view.selected_entry(),
            Some(("durov".to_string(), "https://t.me/durov".to_string()))
        );
    }

    #[tokio::test]
    async fn test_selection_stays_within_active_list() {
        let server = MockServer::start().await;
        let mut view = loaded_view(&server).await;
        view.rss.insert("ap".into(), "https://apnews.com/rss".into());
        view.switch_list();

        view.select_next();
        view.select_next();
        assert_eq!(view.selected, 1);
        assert_eq!(
            view.selected_entry(),
            Some(("bbc".to_string(), "https://feeds.bbci.co.uk/news/rss.xml".to_string()))
        );

        // Reload drops the extra entry; the index is pulled back into range
        view.load().await;
        assert_eq!(view.selected, 0);
        assert_eq!(view.selected_entry().map(|(name, _)| name), Some("bbc".to_string()));
    }

    #[tokio::test]
    async fn test_add_rss_source() {
        let server = MockServer::start().await;
        let mut view = loaded_view(&server).await;
        Mock::given(method("POST"))
            .and(path("/api/news_task/add_source"))
            .and(body_json(json!({
                "source_url": "https://example.com/feed",
                "source_name": "example",
                "source_type": "rss",
                "task_id": 12
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "ok"})))
            .expect(1)
            .mount(&server)
            .await;

        view.switch_list();
        view.add_form.set("name", "example");
        view.add_form.set("url", "https://example.com/feed");

        assert!(view.add().await);
        assert_eq!(view.rss.get("example").map(String::as_str), Some("https://example.com/feed"));
        assert_eq!(view.add_form.value("name"), "");
    }

    #[tokio::test]
    async fn test_rejected_add_shows_backend_detail() {
        let server = MockServer::start().await;
        let mut view = loaded_view(&server).await;
        Mock::given(method("POST"))
            .and(path("/api/news_task/add_source"))
            .respond_with(
                ResponseTemplate::new(400).set_body_json(json!({"detail": "Channel not found"})),
            )
            .mount(&server)
            .await;

        view.add_form.set("name", "ghost");
        view.add_form.set("url", "https://t.me/ghost");

        assert!(!view.add().await);
        assert_eq!(view.status, Some(Status::error("Channel not found")));
        assert!(!view.telegram.contains_key("ghost"));
    }

    #[tokio::test]
    async fn test_remove_failure_without_detail_uses_fallback() {
        let server = MockServer::start().await;
        let mut view = loaded_view(&server).await;
        Mock::given(method("DELETE"))
            .and(path("/api/news_task/remove_source"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        assert!(!view.remove_selected().await);
        assert_eq!(view.status, Some(Status::error("Failed to remove source")));
        assert_eq!(view.telegram.len(), 1);
    }

    #[tokio::test]
    async fn test_remove_sends_entry_and_drops_it() {
        let server = MockServer::start().await;
        let mut view = loaded_view(&server).await;
        Mock::given(method("DELETE"))
            .and(path("/api/news_task/remove_source"))
            .and(body_json(json!({
                "source_url": "https://t.me/durov",
                "source_name": "durov",
                "source_type": "telegram",
                "task_id": 12
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "ok"})))
            .expect(1)
            .mount(&server)
            .await;

        assert!(view.remove_selected().await);
        assert!(view.telegram.is_empty());
    }
}
