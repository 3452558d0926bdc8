//! Crypto tasks: price/percent targets per ticker

use super::form::{Field, Form};
use super::news_tasks::TaskEdit;
use super::{clamp_selection, select_next, select_prev, Status};
use crate::api::models::{CryptoTask, CryptoTaskCreate, CryptoTaskType, CRYPTO_TICKERS};
use crate::api::{ApiClient, Resource};

pub const RESOURCE: &str = "crypto_task";

const TASK_TYPES: &[&str] = &["price", "percent"];

pub struct CryptoTasksView {
    resource: Resource,
    pub tasks: Vec<CryptoTask>,
    pub selected: usize,
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
        Field::text("measurement_time", "Measure at")
            .required()
            .default_value("22:00")
            .hint("HH:MM"),
        Field::choice("ticker", "Ticker", CRYPTO_TICKERS).required(),
        Field::choice("type", "Type", TASK_TYPES).required(),
        Field::number("end_point", "Target")
            .required()
            .default_value("0"),
    ])
}

fn edit_form(task: &CryptoTask) -> Form {
    let mut form = Form::new(vec![
        Field::text("title", "Title").required(),
        Field::text("description", "Description"),
        Field::number("end_point", "Target").required(),
    ]);
    form.set("title", task.title.clone());
    form.set("description", task.description.clone().unwrap_or_default());
    form.set("end_point", task.end_point.to_string());
    form
}

fn parse_type(value: &str) -> CryptoTaskType {
    CryptoTaskType::all()
        .iter()
        .copied()
        .find(|t| t.as_str() == value)
        .unwrap_or_default()
}

impl CryptoTasksView {
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

    pub fn selected_task(&self) -> Option<&CryptoTask> {
        self.tasks.get(self.selected)
    }

    pub fn select_next(&mut self) {
        select_next(&mut self.selected, self.tasks.len());
    }

    pub fn select_prev(&mut self) {
        select_prev(&mut self.selected);
    }

    pub fn open_create(&mut self) {
        self.editing = None;
        self.create = Some(create_form());
    }

    pub fn close_create(&mut self) {
        self.create = None;
    }

    /// Validate and `POST /crypto_task/`; the panel closes on success
    pub async fn submit_create(&mut self) -> bool {
        let Some(form) = &self.create else {
            return false;
        };
        let end_point = match form.validate().and_then(|_| form.number("end_point")) {
            Ok(value) => value,
            Err(e) => {
                self.status = Some(Status::error(e.to_string()));
                return false;
            }
        };

        let body = CryptoTaskCreate {
            title: form.value("title").to_string(),
            description: form.value("description").to_string(),
            end_date: form.value("end_date").to_string(),
            end_point,
            measurement_time: form.value("measurement_time").to_string(),
            ticker: form.value("ticker").to_string(),
            task_type: parse_type(form.value("type")),
        };

        match self.resource.create::<_, CryptoTask>(&body).await {
            Some(task) => {
                self.status = Some(Status::info(format!("Created \"{}\"", task.title)));
                self.tasks.push(task);
                self.create = None;
                true
            }
            None => {
                self.status = Some(Status::error("Failed to create crypto task"));
                false
            }
        }
    }

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

    pub async fn save_edit(&mut self) -> bool {
        let Some(edit) = &self.editing else {
            return false;
        };
        let end_point = match edit.form.validate().and_then(|_| edit.form.number("end_point")) {
            Ok(value) => value,
            Err(e) => {
                self.status = Some(Status::error(e.to_string()));
                return false;
            }
        };
        let Some(original) = self.tasks.iter().find(|t| t.id == edit.id) else {
            self.editing = None;
            return false;
        };

        let updated = CryptoTask {
            title: edit.form.value("title").to_string(),
            description: edit.form.optional("description"),
            end_point,
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
        let flipped = CryptoTask {
            is_active: !task.is_active,
            ..task.clone()
        };
        self.put(flipped.id, &flipped).await
    }

    async fn put(&mut self, id: i64, task: &CryptoTask) -> bool {
        match self.resource.update::<_, CryptoTask>(id, task).await {
            Some(updated) => {
                if let Some(slot) = self.tasks.iter_mut().find(|t| t.id == updated.id) {
                    *slot = updated;
                }
                true
            }
            None => {
                self.status = Some(Status::error("Failed to update crypto task"));
                false
            }
        }
    }

    pub async fn delete_selected(&mut self) -> bool {
        let Some(id) = self.selected_task().map(|t| t.id) else {
            return false;
        };
        if !self.resource.delete(id).await {
            self.status = Some(Status::error("Failed to delete crypto task"));
            return false;
        }
        self.tasks.retain(|t| t.id != id);
        clamp_selection(&mut self.selected, self.tasks.len());
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::views::test_support::client_for;
    use serde_json::{json, Value};
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn task_json(id: i64, active: bool) -> Value {
        json!({
            "id": id,
            "title": "BTC above 100k",
            "description": "watch it",
            "end_date": "2025-06-01T00:00:00",
            "start_date": "2025-01-01T00:00:00",
            "start_point": 93000.5,
            "end_point": 100000.0,
            "measurement_time": "22:00:00",
            "ticker": "BTC",
            "type": "price",
            "is_active": active,
            "created_at": "2025-01-01T00:00:00",
            "user_id": "b1c2"
        })
    }

    async fn loaded_view(server: &MockServer, tasks: Value) -> CryptoTasksView {
        Mock::given(method("GET"))
            .and(path("/api/crypto_task/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(tasks))
            .mount(server)
            .await;
        let mut view = CryptoTasksView::new(&client_for(server));
        view.load().await;
        view
    }

    #[tokio::test]
    async fn test_toggle_inactive_task_sends_full_record_with_is_active_true() {
        let server = MockServer::start().await;
        let mut view = loaded_view(&server, json!([task_json(4, false)])).await;

        Mock::given(method("PUT"))
            .and(path("/api/crypto_task/4"))
            .and(body_json(task_json(4, true)))
            .respond_with(ResponseTemplate::new(200).set_body_json(task_json(4, true)))
            .expect(1)
            .mount(&server)
            .await;

        assert!(view.toggle_active().await);
        assert!(view.tasks[0].is_active);

        let puts = server
            .received_requests()
            .await
            .unwrap()
            .into_iter()
            .filter(|r| r.method.as_str() == "PUT")
            .count();
        assert_eq!(puts, 1);
    }

    #[tokio::test]
    async fn test_create_uses_form_defaults() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/crypto_task/"))
            .and(body_json(json!({
                "title": "t",
                "description": "d",
                "end_date": "2025-06-01T00:00",
                "end_point": 0.0,
                "measurement_time": "22:00",
                "ticker": "BTC",
                "type": "price"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(task_json(1, true)))
            .expect(1)
            .mount(&server)
            .await;

        let mut view = CryptoTasksView::new(&client_for(&server));
        view.open_create();
        let form = view.create.as_mut().unwrap();
        form.set("title", "t");
        form.set("description", "d");
        form.set("end_date", "2025-06-01T00:00");

        assert!(view.submit_create().await);
        assert!(view.create.is_none());
        assert_eq!(view.tasks.len(), 1);
    }

    #[tokio::test]
    async fn test_create_rejects_blank_target() {
        let server = MockServer::start().await;
        let mut view = CryptoTasksView::new(&client_for(&server));
        view.open_create();
        let form = view.create.as_mut().unwrap();
        form.set("title", "t");
        form.set("description", "d");
        form.set("end_date", "2025-06-01T00:00");
        form.set("end_point", "");

        assert!(!view.submit_create().await);
        assert_eq!(view.status, Some(Status::error("Required: Target")));
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_filters_row() {
        let server = MockServer::start().await;
        let mut view = loaded_view(&server, json!([task_json(1, true), task_json(2, true)])).await;
        Mock::given(method("DELETE"))
            .and(path("/api/crypto_task/2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "ok"})))
            .expect(1)
            .mount(&server)
            .await;

        view.select_next();
        assert!(view.delete_selected().await);
        assert_eq!(view.tasks.iter().map(|t| t.id).collect::<Vec<_>>(), vec![1]);
        assert_eq!(view.selected, 0);
    }

    #[tokio::test]
    async fn test_edit_keeps_untouched_fields() {
        let server = MockServer::start().await;
        let mut view = loaded_view(&server, json!([task_json(7, true)])).await;

        let mut expected = task_json(7, true);
        expected["end_point"] = json!(120000.0);
        Mock::given(method("PUT"))
            .and(path("/api/crypto_task/7"))
            .and(body_json(expected.clone()))
            .respond_with(ResponseTemplate::new(200).set_body_json(expected))
            .expect(1)
            .mount(&server)
            .await;

        view.start_edit();
        view.editing.as_mut().unwrap().form.set("end_point", "120000");
        assert!(view.save_edit().await);
        assert_eq!(view.tasks[0].end_point, 120000.0);
    }
}
