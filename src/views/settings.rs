//! Backend settings: LLM prompt text, post examples and API keys

use super::form::{Field, Form};
use super::{clamp_selection, select_next, select_prev, Status};
use crate::api::models::{ApiSettings, Prompt};
use crate::api::{ApiClient, Resource};
use reqwest::Method;

/// Which block of the settings screen has the keyboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SettingsSection {
    #[default]
    Prompt,
    Examples,
    Api,
}

impl SettingsSection {
    pub fn next(self) -> Self {
        match self {
            SettingsSection::Prompt => SettingsSection::Examples,
            SettingsSection::Examples => SettingsSection::Api,
            SettingsSection::Api => SettingsSection::Prompt,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            SettingsSection::Prompt => "Prompt",
            SettingsSection::Examples => "Post examples",
            SettingsSection::Api => "API keys",
        }
    }
}

pub struct SettingsView {
    prompt_resource: Resource,
    settings_resource: Resource,
    /// Last prompt record the backend returned
    pub prompt: Option<Prompt>,
    pub prompt_form: Form,
    /// Working copy of `post_examples`, saved together with the prompt
    pub examples: Vec<String>,
    pub selected_example: usize,
    pub example_form: Form,
    pub api_settings: Option<ApiSettings>,
    pub api_form: Form,
    pub section: SettingsSection,
    pub status: Option<Status>,
}

fn prompt_form() -> Form {
    Form::new(vec![
        Field::text("role", "System role"),
        Field::text("crypto_role", "Crypto role"),
        Field::text("suggest_post", "Suggested post"),
    ])
}

fn example_form() -> Form {
    Form::new(vec![Field::text("example", "New example").required()])
}

fn api_form() -> Form {
    Form::new(vec![Field::secret("deepseek", "DeepSeek key")])
}

impl SettingsView {
    pub fn new(client: &ApiClient) -> Self {
        Self {
            prompt_resource: client.resource("prompt"),
            settings_resource: client.resource("settings"),
            prompt: None,
            prompt_form: prompt_form(),
            examples: Vec::new(),
            selected_example: 0,
            example_form: example_form(),
            api_settings: None,
            api_form: api_form(),
            section: SettingsSection::default(),
            status: None,
        }
    }

    /// Fetch the prompt and API settings
    pub async fn load(&mut self) {
        match self
            .prompt_resource
            .custom_as::<Prompt>(Method::GET, "", None)
            .await
        {
            Some(prompt) => self.apply_prompt(prompt),
            None => self.status = Some(Status::error("Failed to load prompt settings")),
        }

        if let Some(settings) = self
            .settings_resource
            .custom_as::<ApiSettings>(Method::GET, "", None)
            .await
        {
            self.apply_api_settings(settings);
        }
    }

    fn apply_prompt(&mut self, prompt: Prompt) {
        self.prompt_form.set("role", prompt.role.clone());
        self.prompt_form.set("crypto_role", prompt.crypto_role.clone());
        self.prompt_form.set("suggest_post", prompt.suggest_post.clone());
        self.examples = prompt.post_examples.clone();
        clamp_selection(&mut self.selected_example, self.examples.len());
        self.prompt = Some(prompt);
    }

    fn apply_api_settings(&mut self, settings: ApiSettings) {
        self.api_form
            .set("deepseek", settings.deepseek.clone().unwrap_or_default());
        self.api_settings = Some(settings);
    }

    pub fn next_section(&mut self) {
        self.section = self.section.next();
    }

    /// `PUT /prompt/{id}` with the edited text and the current examples
    ///
    /// Does nothing until a prompt has been loaded; the backend owns the id.
    pub async fn save_prompt(&mut self) -> bool {
        let Some(current) = &self.prompt else {
            self.status = Some(Status::error("Prompt settings not loaded"));
            return false;
        };
        let edited = Prompt {
            id: current.id,
            role: self.prompt_form.value("role").to_string(),
            crypto_role: self.prompt_form.value("crypto_role").to_string(),
            suggest_post: self.prompt_form.value("suggest_post").to_string(),
            post_examples: self.examples.clone(),
        };

        match self
            .prompt_resource
            .update::<_, Prompt>(edited.id, &edited)
            .await
        {
            Some(updated) => {
                self.apply_prompt(updated);
                self.status = Some(Status::info("Prompt saved"));
                true
            }
            None => {
                self.status = Some(Status::error("Failed to save prompt"));
                false
            }
        }
    }

    /// `POST /prompt/reset`; the form takes the returned defaults
    pub async fn reset_prompt(&mut self) -> bool {
        match self
            .prompt_resource
            .custom_as::<Prompt>(Method::POST, "reset", None)
            .await
        {
            Some(prompt) => {
                self.apply_prompt(prompt);
                self.status = Some(Status::info("Prompt reset to defaults"));
                true
            }
            None => {
                self.status = Some(Status::error("Failed to reset prompt"));
                false
            }
        }
    }

    pub fn select_next_example(&mut self) {
        select_next(&mut self.selected_example, self.examples.len());
    }

    pub fn select_prev_example(&mut self) {
        select_prev(&mut self.selected_example);
    }

    /// Append the typed example to the working copy
    pub fn add_example(&mut self) -> bool {
        if let Err(e) = self.example_form.validate() {
            self.status = Some(Status::error(e.to_string()));
            return false;
        }
        self.examples
            .push(self.example_form.value("example").to_string());
        self.example_form.reset();
        self.status = Some(Status::info("Example added; save to keep it"));
        true
    }

    pub fn remove_selected_example(&mut self) -> bool {
        if self.selected_example >= self.examples.len() {
            return false;
        }
        self.examples.remove(self.selected_example);
        clamp_selection(&mut self.selected_example, self.examples.len());
        true
    }

    /// `PUT /settings/`; a blank key is sent as `null`
    pub async fn save_api_settings(&mut self) -> bool {
        let settings = ApiSettings {
            deepseek: self.api_form.optional("deepseek"),
            ..self.api_settings.clone().unwrap_or_default()
        };
        let body = match serde_json::to_value(&settings) {
            Ok(body) => body,
            Err(e) => {
                tracing::error!("Failed to encode API settings: {}", e);
                return false;
            }
        };

        match self
            .settings_resource
            .custom(Method::PUT, "", Some(&body))
            .await
        {
            Some(response) => {
                let saved = serde_json::from_value(response).unwrap_or(settings);
                self.apply_api_settings(saved);
                self.status = Some(Status::info("API settings saved"));
                true
            }
            None => {
                self.status = Some(Status::error("Failed to save API settings"));
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::views::test_support::client_for;
    use serde_json::{json, Value};
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn prompt_json() -> Value {
        json!({
            "id": 1,
            "role": "You are a news analyst",
            "crypto_role": "You track crypto",
            "suggest_post": "Write a post",
            "post_examples": ["first", "second"]
        })
    }

    async fn loaded_view(server: &MockServer) -> SettingsView {
        Mock::given(method("GET"))
            .and(path("/api/prompt/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(prompt_json()))
            .mount(server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/settings/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "deepseek": "sk-old",
                "rss_urls": {},
                "tg_urls": {}
            })))
            .mount(server)
            .await;
        let mut view = SettingsView::new(&client_for(server));
        view.load().await;
        view
    }

    #[tokio::test]
    async fn test_load_fills_forms() {
        let server = MockServer::start().await;
        let view = loaded_view(&server).await;
        assert_eq!(view.prompt_form.value("role"), "You are a news analyst");
        assert_eq!(view.examples, vec!["first", "second"]);
        assert_eq!(view.api_form.value("deepseek"), "sk-old");
        assert!(view.status.is_none());
    }

    #[tokio::test]
    async fn test_save_prompt_puts_edited_record() {
        let server = MockServer::start().await;
        let mut view = loaded_view(&server).await;

        let mut expected = prompt_json();
        expected["role"] = json!("Be brief");
        expected["post_examples"] = json!(["second", "third"]);
        Mock::given(method("PUT"))
            .and(path("/api/prompt/1"))
            .and(body_json(expected.clone()))
            .respond_with(ResponseTemplate::new(200).set_body_json(expected))
            .expect(1)
            .mount(&server)
            .await;

        view.prompt_form.set("role", "Be brief");
        view.remove_selected_example();
        view.example_form.set("example", "third");
        assert!(view.add_example());

        assert!(view.save_prompt().await);
        assert_eq!(view.prompt.as_ref().map(|p| p.role.as_str()), Some("Be brief"));
        assert_eq!(view.status, Some(Status::info("Prompt saved")));
    }

    #[tokio::test]
    async fn test_save_without_loaded_prompt_sends_nothing() {
        let server = MockServer::start().await;
        let mut view = SettingsView::new(&client_for(&server));
        assert!(!view.save_prompt().await);
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_reset_replaces_form_values() {
        let server = MockServer::start().await;
        let mut view = loaded_view(&server).await;
        Mock::given(method("POST"))
            .and(path("/api/prompt/reset"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": 1,
                "role": "default role",
                "crypto_role": "default crypto",
                "suggest_post": "default post",
                "post_examples": []
            })))
            .expect(1)
            .mount(&server)
            .await;

        view.prompt_form.set("role", "unsaved edit");
        assert!(view.reset_prompt().await);
        assert_eq!(view.prompt_form.value("role"), "default role");
        assert!(view.examples.is_empty());
    }

    #[tokio::test]
    async fn test_blank_deepseek_key_is_sent_as_null() {
        let server = MockServer::start().await;
        let mut view = loaded_view(&server).await;
        Mock::given(method("PUT"))
            .and(path("/api/settings/"))
            .and(body_json(json!({"deepseek": null, "rss_urls": {}, "tg_urls": {}})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "deepseek": null,
                "rss_urls": {},
                "tg_urls": {}
            })))
            .expect(1)
            .mount(&server)
            .await;

        view.api_form.set("deepseek", "   ");
        assert!(view.save_api_settings().await);
        assert_eq!(view.api_settings.and_then(|s| s.deepseek), None);
    }

    #[test]
    fn test_empty_example_is_rejected() {
        let store = crate::storage::MemoryStore::shared();
        let client =
            ApiClient::new("http://127.0.0.1:9/api", store, std::time::Duration::from_secs(1))
                .unwrap();
        let mut view = SettingsView::new(&client);
        assert!(!view.add_example());
        assert_eq!(view.status, Some(Status::error("Required: New example")));
        assert_eq!(SettingsSection::Api.next(), SettingsSection::Prompt);
    }
}
