//! News tasks: table, create panel, inline edit, toggle, delete

use super::form::{Field, Form};
use super::{clamp_selection, select_next, select_prev, Status};
use crate::api::models::{NewsTask, NewsTaskCreate};
use crate::api::{ApiClient, Resource};
use reqwest::Method;
use serde_json::json;

pub const RESOURCE: &str = "news_task";

/// Inline edit of one row
#[derive(Debug, Clone)]
pub struct TaskEdit {
    pub id: i64,
    pub form: Form,
}

pub struct NewsTasksView {
    resource: Resource,
    pub tasks: Vec<NewsTask>,
    pub selected: usize,
    /// Open create panel, if any
    pub create: Option<Form>,
    pub editing: Option<TaskEdit>,
    pub status: Option<Status>,
}

fn create_form() -> Form {
    Form::new(vec![
        Field::text("title", "Title").required(),
        Field::text("description", "Description").required(),
        Field::text("end_date", "End date")
            .required()
            .hint("YYYY-MM-DDTHH:MM"),
        Field::text("link", "Link"),
    ])
}

fn edit_form(task: &NewsTask) -> Form {
    let mut form = Form::new(vec![
        Field::text("title", "Title").required(),
        Field::text("description", "Description").required(),
        Field::text("end_date", "End date").hint("YYYY-MM-DDTHH:MM"),
    ]);
    form.set("title", task.title.clone());
    form.set("description", task.description.clone());
    form.set("end_date", task.end_date.clone().unwrap_or_default());
    form
}

impl NewsTasksView {
    pub fn new(client: &ApiClient) -> Self {
        Self {
            resource: client.resource(RESOURCE),
            tasks: Vec::new(),
            selected: 0,
            create: None,
            editing: None,
            status: None,
        }
    }

    pub async fn load(&mut self) {
        self.tasks = self.resource.list().await;
        clamp_selection(&mut self.selected, self.tasks.len());
    }

    pub fn selected_task(&self) -> Option<&NewsTask> {
        self.tasks.get(self.selected)
    }

    pub fn select_next(&mut self) {
        select_next(&mut self.selected, self.tasks.len());
    }

    pub fn select_prev(&mut self) {
        select_prev(&mut self.selected);
    }

    // ─────────────────────────────────────────────────────────────────────
    // Create
    // ─────────────────────────────────────────────────────────────────────

    pub fn open_create(&mut self) {
        self.editing = None;
        self.create = Some(create_form());
    }

    pub fn close_create(&mut self) {
        self.create = None;
    }

    /// Validate and `POST /news_task/`; the panel closes on success
    ///
    /// Returns whether the task was created.
    pub async fn submit_create(&mut self) -> bool {
        let Some(form) = &self.create else {
            return false;
        };
        if let Err(e) = form.validate() {
            self.status = Some(Status::error(e.to_string()));
            return false;
        }

        let body = NewsTaskCreate {
            title: form.value("title").to_string(),
            description: form.value("description").to_string(),
            end_date: form.value("end_date").to_string(),
            link: form.optional("link"),
            ..Default::default()
        };

        match self.resource.create::<_, NewsTask>(&body).await {
            Some(task) => {
                self.status = Some(Status::info(format!("Created \"{}\"", task.title)));
                self.tasks.push(task);
                self.create = None;
                true
            }
            None => {
                self.status = Some(Status::error("Failed to create news task"));
                false
            }
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Edit / toggle / delete
    // ─────────────────────────────────────────────────────────────────────

    pub fn start_edit(&mut self) {
        if let Some(task) = self.selected_task() {
            self.editing = Some(TaskEdit {
                id: task.id,
                form: edit_form(task),
            });
            self.create = None;
        }
    }

    pub fn cancel_edit(&mut self) {
        self.editing = None;
    }

    /// One `PUT /news_task/{id}` with the edited fields over the stored record
    pub async fn save_edit(&mut self) -> bool {
        let Some(edit) = &self.editing else {
            return false;
        };
        if let Err(e) = edit.form.validate() {
            self.status = Some(Status::error(e.to_string()));
            return false;
        }
        let Some(original) = self.tasks.iter().find(|t| t.id == edit.id) else {
            self.editing = None;
            return false;
        };

        let updated = NewsTask {
            title: edit.form.value("title").to_string(),
            description: edit.form.value("description").to_string(),
            end_date: edit.form.optional("end_date").or_else(|| original.end_date.clone()),
            ..original.clone()
        };

        let id = edit.id;
        self.editing = None;
        self.put(id, &updated).await
    }

    /// Flip `is_active` on the selected row, sending the full record
    pub async fn toggle_active(&mut self) -> bool {
        let Some(task) = self.selected_task() else {
            return false;
        };
        let flipped = NewsTask {
            is_active: !task.is_active,
            ..task.clone()
        };
        self.put(flipped.id, &flipped).await
    }

    async fn put(&mut self, id: i64, task: &NewsTask) -> bool {
        match self.resource.update::<_, NewsTask>(id, task).await {
            Some(updated) => {
                if let Some(slot) = self.tasks.iter_mut().find(|t| t.id == updated.id) {
                    *slot = updated;
                }
                true
            }
            None => {
                self.status = Some(Status::error("Failed to update news task"));
                false
            }
        }
    }

    /// Delete the selected row immediately; it disappears only on success
    pub async fn delete_selected(&mut self) -> bool {
        let Some(id) = self.selected_task().map(|t| t.id) else {
            return false;
        };
        if !self.resource.delete(id).await {
            self.status = Some(Status::error("Failed to delete news task"));
            return false;
        }
        self.tasks.retain(|t| t.id != id);
        clamp_selection(&mut self.selected, self.tasks.len());
        true
    }

    /// Ask the backend to re-evaluate recent news for the selected task
    pub async fn check_relevant(&mut self) -> bool {
        let Some(id) = self.selected_task().map(|t| t.id) else {
            return false;
        };
        let body = json!({ "task_id": id });
        let ok = self
            .resource
            .custom(Method::POST, "checkRelevantNews", Some(&body))
            .await
            .is_some();
        self.status = Some(if ok {
            Status::info("Relevance check requested")
        } else {
            Status::error("Relevance check failed")
        });
        ok
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::views::test_support::client_for;
    use serde_json::{json, Value};
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn task_json(id: i64, title: &str, active: bool) -> Value {
        json!({
            "id": id,
            "title": title,
            "description": "desc",
            "end_date": "2025-01-01T00:00:00",
            "link": null,
            "is_active": active,
            "created_at": "2024-12-01T00:00:00",
            "positives": [],
            "false_positives": [],
            "rss_urls": {},
            "tg_urls": {}
        })
    }

    async fn loaded_view(server: &MockServer, tasks: Value) -> NewsTasksView {
        Mock::given(method("GET"))
            .and(path("/api/news_task/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(tasks))
            .mount(server)
            .await;
        let mut view = NewsTasksView::new(&client_for(server));
        view.load().await;
        view
    }

    #[tokio::test]
    async fn test_create_posts_exact_fields_and_clears_panel() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/news_task/"))
            .and(body_json(json!({
                "title": "Test",
                "description": "Test desc",
                "end_date": "2025-01-01T00:00"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(task_json(9, "Test", true)))
            .expect(1)
            .mount(&server)
            .await;

        let mut view = NewsTasksView::new(&client_for(&server));
        view.open_create();
        let form = view.create.as_mut().unwrap();
        form.set("title", "Test");
        form.set("description", "Test desc");
        form.set("end_date", "2025-01-01T00:00");

        assert!(view.submit_create().await);
        assert!(view.create.is_none());
        assert_eq!(view.tasks.len(), 1);
        assert_eq!(view.tasks[0].id, 9);
    }

    #[tokio::test]
    async fn test_create_with_missing_fields_sends_nothing() {
        let server = MockServer::start().await;
        let mut view = NewsTasksView::new(&client_for(&server));
        view.open_create();
        view.create.as_mut().unwrap().set("title", "Only title");

        assert!(!view.submit_create().await);
        assert!(view.create.is_some());
        assert_eq!(
            view.status,
            Some(Status::error("Required: Description, End date"))
        );
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failed_create_keeps_panel_open() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/news_task/"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let mut view = NewsTasksView::new(&client_for(&server));
        view.open_create();
        let form = view.create.as_mut().unwrap();
        form.set("title", "a");
        form.set("description", "b");
        form.set("end_date", "2025-01-01T00:00");

        assert!(!view.submit_create().await);
        assert!(view.create.is_some());
        assert!(view.status.as_ref().unwrap().is_error());
    }

    #[tokio::test]
    async fn test_toggle_sends_full_record_and_replaces_row() {
        let server = MockServer::start().await;
        let mut view = loaded_view(&server, json!([task_json(1, "a", true), task_json(2, "b", true)])).await;

        // Full record, only is_active flipped
        let expected = task_json(2, "b", false);
        Mock::given(method("PUT"))
            .and(path("/api/news_task/2"))
            .and(body_json(expected))
            .respond_with(ResponseTemplate::new(200).set_body_json(task_json(2, "b", false)))
            .expect(1)
            .mount(&server)
            .await;

        view.select_next();
        assert!(view.toggle_active().await);
        assert!(!view.tasks[1].is_active);
        assert!(view.tasks[0].is_active);
    }

    #[tokio::test]
    async fn test_save_edit_replaces_entry_with_server_response() {
        let server = MockServer::start().await;
        let mut view = loaded_view(&server, json!([task_json(5, "old", true)])).await;

        Mock::given(method("PUT"))
            .and(path("/api/news_task/5"))
            .respond_with(ResponseTemplate::new(200).set_body_json(task_json(5, "from server", true)))
            .expect(1)
            .mount(&server)
            .await;

        view.start_edit();
        view.editing.as_mut().unwrap().form.set("title", "new");
        assert!(view.save_edit().await);
        assert!(view.editing.is_none());
        assert_eq!(view.tasks[0].title, "from server");

        let requests = server.received_requests().await.unwrap();
        let put = requests.iter().find(|r| r.method.as_str() == "PUT").unwrap();
        let sent: Value = serde_json::from_slice(&put.body).unwrap();
        assert_eq!(sent["title"], "new");
        assert_eq!(sent["description"], "desc");
    }

    #[tokio::test]
    async fn test_delete_removes_row_only_on_success() {
        let server = MockServer::start().await;
        let mut view = loaded_view(&server, json!([task_json(1, "a", true), task_json(2, "b", true)])).await;

        Mock::given(method("DELETE"))
            .and(path("/api/news_task/1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "deleted"})))
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/api/news_task/2"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        assert!(view.delete_selected().await);
        assert_eq!(view.tasks.len(), 1);
        assert_eq!(view.tasks[0].id, 2);

        assert!(!view.delete_selected().await);
        assert_eq!(view.tasks.len(), 1);
    }

    #[tokio::test]
    async fn test_check_relevant_posts_task_id() {
        let server = MockServer::start().await;
        let mut view = loaded_view(&server, json!([task_json(3, "a", true)])).await;
        Mock::given(method("POST"))
            .and(path("/api/news_task/checkRelevantNews"))
            .and(body_json(json!({"task_id": 3})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "ok"})))
            .expect(1)
            .mount(&server)
            .await;

        assert!(view.check_relevant().await);
        assert_eq!(view.status, Some(Status::info("Relevance check requested")));
    }
}
