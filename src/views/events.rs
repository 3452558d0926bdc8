//! Tracked prediction-market events

use super::{clamp_selection, select_next, select_prev, Status};
use crate::api::models::Event;
use crate::api::{ApiClient, Resource};
use reqwest::Method;

pub const RESOURCE: &str = "events";

pub struct EventsView {
    resource: Resource,
    pub events: Vec<Event>,
    pub selected: usize,
    pub status: Option<Status>,
}

impl EventsView {
    pub fn new(client: &ApiClient) -> Self {
        Self {
            resource: client.resource(RESOURCE),
            events: Vec::new(),
            selected: 0,
            status: None,
        }
    }

    pub async fn load(&mut self) {
        self.events = self.resource.list().await;
        clamp_selection(&mut self.selected, self.events.len());
    }

    pub fn selected_event(&self) -> Option<&Event> {
        self.events.get(self.selected)
    }

    pub fn select_next(&mut self) {
        select_next(&mut self.selected, self.events.len());
    }

    pub fn select_prev(&mut self) {
        select_prev(&mut self.selected);
    }

    /// `GET /events/refresh`: the backend re-scrapes and returns the new list
    pub async fn refresh(&mut self) -> bool {
        match self
            .resource
            .custom_as::<Vec<Event>>(Method::GET, "refresh", None)
            .await
        {
            Some(events) => {
                self.status = Some(Status::info(format!("{} events", events.len())));
                self.events = events;
                clamp_selection(&mut self.selected, self.events.len());
                true
            }
            None => {
                self.status = Some(Status::error("Failed to refresh events"));
                false
            }
        }
    }

    /// `GET /events/{id}/toggle_pause`; the row takes the returned record
    pub async fn toggle_pause(&mut self) -> bool {
        let Some(id) = self.selected_event().map(|e| e.id.clone()) else {
            return false;
        };
        let action = format!("{}/toggle_pause", id);
        match self
            .resource
            .custom_as::<Event>(Method::GET, &action, None)
            .await
        {
            Some(updated) => {
                if let Some(slot) = self.events.iter_mut().find(|e| e.id == updated.id) {
                    *slot = updated;
                }
                true
            }
            None => {
                self.status = Some(Status::error("Failed to toggle event"));
                false
            }
        }
    }

    pub async fn delete_selected(&mut self) -> bool {
        let Some(id) = self.selected_event().map(|e| e.id.clone()) else {
            return false;
        };
        if !self.resource.delete(&id).await {
            self.status = Some(Status::error("Failed to delete event"));
            return false;
        }
        self.events.retain(|e| e.id != id);
        clamp_selection(&mut self.selected, self.events.len());
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::views::test_support::client_for;
    use serde_json::{json, Value};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn event_json(id: &str, active: bool) -> Value {
        json!({
            "id": id,
            "title": format!("Event {}", id),
            "description": "Will it happen?",
            "ends_at": "2025-12-31T00:00:00",
            "rules": "Resolves yes if it happens",
            "is_active": active,
            "positives": [],
            "false_positives": []
        })
    }

    async fn loaded_view(server: &MockServer) -> EventsView {
        Mock::given(method("GET"))
            .and(path("/api/events/"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!([event_json("a1", true), event_json("b2", true)])),
            )
            .mount(server)
            .await;
        let mut view = EventsView::new(&client_for(server));
        view.load().await;
        view
    }

    #[tokio::test]
    async fn test_toggle_pause_replaces_row() {
        let server = MockServer::start().await;
        let mut view = loaded_view(&server).await;
        Mock::given(method("GET"))
            .and(path("/api/events/b2/toggle_pause"))
            .respond_with(ResponseTemplate::new(200).set_body_json(event_json("b2", false)))
            .expect(1)
            .mount(&server)
            .await;

        view.select_next();
        assert!(view.toggle_pause().await);
        assert!(view.events[0].is_active);
        assert!(!view.events[1].is_active);
    }

    #[tokio::test]
    async fn test_refresh_replaces_list() {
        let server = MockServer::start().await;
        let mut view = loaded_view(&server).await;
        view.select_next();
        Mock::given(method("GET"))
            .and(path("/api/events/refresh"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([event_json("c3", true)])))
            .mount(&server)
            .await;

        assert!(view.refresh().await);
        assert_eq!(view.events.len(), 1);
        assert_eq!(view.selected, 0);
        assert_eq!(view.status, Some(Status::info("1 events")));
    }

    #[tokio::test]
    async fn test_failed_delete_keeps_row() {
        let server = MockServer::start().await;
        let mut view = loaded_view(&server).await;
        Mock::given(method("DELETE"))
            .and(path("/api/events/a1"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        assert!(!view.delete_selected().await);
        assert_eq!(view.events.len(), 2);
        assert_eq!(view.status, Some(Status::error("Failed to delete event")));
    }

    #[tokio::test]
    async fn test_delete_removes_row() {
        let server = MockServer::start().await;
        let mut view = loaded_view(&server).await;
        Mock::given(method("DELETE"))
            .and(path("/api/events/a1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
            .expect(1)
            .mount(&server)
            .await;

        assert!(view.delete_selected().await);
        assert_eq!(view.events.len(), 1);
        assert_eq!(view.events[0].id, "b2");
    }
}
