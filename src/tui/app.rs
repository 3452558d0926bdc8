// TUI application state
//
// App holds everything the event loop and the renderer share: the backend
// handles (client, session, router), the screen for the current route, the
// live feed while the Live Results route is shown, and UI chrome state
// (theme, toast, logs panel).
//
// Keyboard handling never awaits. It returns an `Action`, and the loop
// runs `App::perform` for it, so every network call happens in one place.

use super::clipboard;
use super::components::Toast;
use super::theme::{Theme, ThemeKind};
use crate::api::models::User;
use crate::api::ApiClient;
use crate::config::Config;
use crate::feed::{FeedEntry, FeedHandle, FeedState};
use crate::logging::LogBuffer;
use crate::router::{Route, Router};
use crate::session::Session;
use crate::storage::SharedStore;
use crate::views::{
    CryptoTasksView, EventsView, LoginView, NewsTasksView, SettingsView, SourcesView, Status,
};
use std::time::Instant;
use tokio::sync::watch;

/// Screen state for the current route
pub enum Screen {
    Login(LoginView),
    NewsTasks(NewsTasksView),
    CryptoTasks(CryptoTasksView),
    Sources(SourcesView),
    /// Entries live in the feed handle
    LiveResults,
    Events(EventsView),
    Settings(SettingsView),
}

impl Screen {
    /// Status line of the view behind this screen
    pub fn status(&self) -> Option<&Status> {
        match self {
            Screen::Login(v) => v.status.as_ref(),
            Screen::NewsTasks(v) => v.status.as_ref(),
            Screen::CryptoTasks(v) => v.status.as_ref(),
            Screen::Sources(v) => v.status.as_ref(),
            Screen::LiveResults => None,
            Screen::Events(v) => v.status.as_ref(),
            Screen::Settings(v) => v.status.as_ref(),
        }
    }
}

/// Work that needs the network; produced by key handling, run by the loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Login,
    Logout,
    /// Re-enter the current route (refetch its data)
    Reload,
    SubmitCreate,
    SaveEdit,
    ToggleActive,
    DeleteSelected,
    CheckRelevant,
    AddSource,
    RemoveSource,
    RefreshEvents,
    TogglePause,
    SavePrompt,
    ResetPrompt,
    SaveApiSettings,
}

impl Action {
    /// Shown in the status bar while the call is in flight
    pub fn label(&self) -> &'static str {
        match self {
            Action::Login => "Signing in",
            Action::Logout => "Signing out",
            Action::Reload => "Loading",
            Action::SubmitCreate => "Creating",
            Action::SaveEdit | Action::SavePrompt | Action::SaveApiSettings => "Saving",
            Action::ToggleActive | Action::TogglePause => "Updating",
            Action::DeleteSelected | Action::RemoveSource => "Deleting",
            Action::CheckRelevant => "Checking news",
            Action::AddSource => "Validating source",
            Action::RefreshEvents => "Refreshing events",
            Action::ResetPrompt => "Resetting",
        }
    }
}

/// Main application state for the TUI
pub struct App {
    pub config: Config,
    pub client: ApiClient,
    pub session: Session,
    pub router: Router,
    store: SharedStore,

    /// Route the screen was built for
    pub route: Option<Route>,
    pub screen: Option<Screen>,

    /// Keyboard goes to the open form instead of shortcuts
    ///
    /// Create/edit panels imply this on their own; the flag covers the
    /// always-visible forms of the sources and settings screens.
    pub form_focus: bool,

    /// Live feed, running only while Live Results is shown
    pub feed: Option<FeedHandle>,
    pub feed_selected: usize,

    /// Signed-in user for the title bar
    pub user: Option<User>,

    pub log_buffer: LogBuffer,
    pub show_logs: bool,

    pub theme_kind: ThemeKind,
    pub theme: Theme,

    pub toast: Option<Toast>,

    /// Label of the action in flight
    pub busy: Option<&'static str>,

    pub should_quit: bool,

    pub start_time: Instant,
}

impl App {
    pub fn new(
        config: Config,
        client: ApiClient,
        session: Session,
        router: Router,
        store: SharedStore,
        log_buffer: LogBuffer,
    ) -> Self {
        let theme_kind = ThemeKind::from_name(&config.theme);
        Self {
            config,
            client,
            session,
            router,
            store,
            route: None,
            screen: None,
            form_focus: false,
            feed: None,
            feed_selected: 0,
            user: None,
            log_buffer,
            show_logs: false,
            theme_kind,
            theme: theme_kind.theme(),
            toast: None,
            busy: None,
            should_quit: false,
            start_time: Instant::now(),
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Chrome
    // ─────────────────────────────────────────────────────────────────────────

    /// Cycle to the next theme
    pub fn next_theme(&mut self) {
        self.theme_kind = self.theme_kind.next();
        self.theme = self.theme_kind.theme();
        self.show_toast(format!("Theme: {}", self.theme_kind.name()));
    }

    pub fn toggle_logs(&mut self) {
        self.show_logs = !self.show_logs;
    }

    pub fn show_toast(&mut self, message: impl Into<String>) {
        self.toast = Some(Toast::new(message));
    }

    pub fn clear_expired_toast(&mut self) {
        if self.toast.as_ref().is_some_and(|t| t.is_expired()) {
            self.toast = None;
        }
    }

    pub fn uptime(&self) -> String {
        let secs = self.start_time.elapsed().as_secs();
        format!("{:02}:{:02}:{:02}", secs / 3600, (secs % 3600) / 60, secs % 60)
    }

    /// Whether keystrokes should be typed into a form
    pub fn is_typing(&self) -> bool {
        match &self.screen {
            Some(Screen::Login(_)) => true,
            Some(Screen::NewsTasks(v)) => v.create.is_some() || v.editing.is_some(),
            Some(Screen::CryptoTasks(v)) => v.create.is_some() || v.editing.is_some(),
            Some(Screen::Sources(_)) | Some(Screen::Settings(_)) => self.form_focus,
            _ => false,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Feed
    // ─────────────────────────────────────────────────────────────────────────

    pub fn feed_entries(&self) -> Vec<FeedEntry> {
        self.feed
            .as_ref()
            .map(|f| f.entries_newest_first())
            .unwrap_or_default()
    }

    pub fn feed_state(&self) -> Option<FeedState> {
        self.feed.as_ref().map(|f| f.state())
    }

    /// Receiver the loop waits on for new feed entries
    pub fn feed_updates(&self) -> Option<watch::Receiver<u64>> {
        self.feed.as_ref().map(|f| f.revision_receiver())
    }

    fn start_feed(&mut self) {
        if self.feed.is_none() {
            tracing::info!("Subscribing to live results at {}", self.config.ws_url);
            self.feed = Some(FeedHandle::start(
                self.config.ws_url.clone(),
                self.store.clone(),
                self.config.feed.to_feed_config(),
            ));
        }
        self.feed_selected = 0;
    }

    fn stop_feed(&mut self) {
        if let Some(feed) = self.feed.take() {
            tracing::debug!("Live results closed");
            feed.shutdown();
        }
    }

    /// Copy the selected entry's link
    pub fn copy_feed_link(&mut self) {
        let link = self
            .feed_entries()
            .get(self.feed_selected)
            .and_then(|e| e.news_link().map(str::to_string));
        match link {
            Some(link) => match clipboard::copy_to_clipboard(&link) {
                Ok(()) => self.show_toast("✓ Link copied"),
                Err(e) => {
                    tracing::warn!("Clipboard unavailable: {:#}", e);
                    self.toast = Some(Toast::error("✗ Failed to copy"));
                }
            },
            None => self.show_toast("No link for this entry"),
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Routing and session
    // ─────────────────────────────────────────────────────────────────────────

    /// Build and load the screen for a route
    ///
    /// Routes behind auth redirect to Login when no token is stored. The
    /// feed only runs while Live Results is the current route.
    pub async fn enter_route(&mut self, route: Option<Route>) {
        if let Some(r) = route {
            if r.requires_auth() && self.session.get_token().is_none() {
                self.router.navigate(Route::Login);
                return;
            }
        }

        if route != Some(Route::LiveResults) {
            self.stop_feed();
        }
        self.form_focus = false;
        self.route = route;

        self.screen = match route {
            None => None,
            Some(Route::Login) => Some(Screen::Login(LoginView::new())),
            Some(Route::NewsTasks) => {
                let mut view = NewsTasksView::new(&self.client);
                view.load().await;
                Some(Screen::NewsTasks(view))
            }
            Some(Route::CryptoTasks) => {
                let mut view = CryptoTasksView::new(&self.client);
                view.load().await;
                Some(Screen::CryptoTasks(view))
            }
            Some(Route::Sources { task_id }) => {
                let mut view = SourcesView::new(&self.client, task_id);
                view.load().await;
                Some(Screen::Sources(view))
            }
            Some(Route::LiveResults) => {
                self.start_feed();
                Some(Screen::LiveResults)
            }
            Some(Route::Events) => {
                let mut view = EventsView::new(&self.client);
                view.load().await;
                Some(Screen::Events(view))
            }
            Some(Route::Settings) => {
                let mut view = SettingsView::new(&self.client);
                view.load().await;
                Some(Screen::Settings(view))
            }
        };
    }

    /// Signed in: fetch the user and leave the login screen
    pub async fn on_session_established(&mut self) {
        self.user = self.session.current_user().await;
        if let Some(user) = &self.user {
            self.show_toast(format!("Signed in as {}", user.email));
        }
        self.router.navigate(Route::NewsTasks);
    }

    /// Token gone: drop everything user-specific and show the login screen
    pub fn on_session_cleared(&mut self) {
        self.user = None;
        self.stop_feed();
        self.router.navigate(Route::Login);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Actions
    // ─────────────────────────────────────────────────────────────────────────

    /// Run one network action against the current screen
    pub async fn perform(&mut self, action: Action) {
        tracing::debug!("Action: {:?}", action);
        match action {
            Action::Login => {
                if let Some(Screen::Login(view)) = &mut self.screen {
                    view.submit(&self.session).await;
                }
            }
            Action::Logout => self.session.logout().await,
            Action::Reload => self.enter_route(self.route).await,
            _ => self.perform_on_screen(action).await,
        }
    }

    async fn perform_on_screen(&mut self, action: Action) {
        let Some(screen) = &mut self.screen else {
            return;
        };
        match (screen, action) {
            (Screen::NewsTasks(v), Action::SubmitCreate) => {
                v.submit_create().await;
            }
            (Screen::NewsTasks(v), Action::SaveEdit) => {
                v.save_edit().await;
            }
            (Screen::NewsTasks(v), Action::ToggleActive) => {
                v.toggle_active().await;
            }
            (Screen::NewsTasks(v), Action::DeleteSelected) => {
                v.delete_selected().await;
            }
            (Screen::NewsTasks(v), Action::CheckRelevant) => {
                v.check_relevant().await;
            }
            (Screen::CryptoTasks(v), Action::SubmitCreate) => {
                v.submit_create().await;
            }
            (Screen::CryptoTasks(v), Action::SaveEdit) => {
                v.save_edit().await;
            }
            (Screen::CryptoTasks(v), Action::ToggleActive) => {
                v.toggle_active().await;
            }
            (Screen::CryptoTasks(v), Action::DeleteSelected) => {
                v.delete_selected().await;
            }
            (Screen::Sources(v), Action::AddSource) => {
                if v.add().await {
                    self.form_focus = false;
                }
            }
            (Screen::Sources(v), Action::RemoveSource) => {
                v.remove_selected().await;
            }
            (Screen::Events(v), Action::RefreshEvents) => {
                v.refresh().await;
            }
            (Screen::Events(v), Action::TogglePause) => {
                v.toggle_pause().await;
            }
            (Screen::Events(v), Action::DeleteSelected) => {
                v.delete_selected().await;
            }
            (Screen::Settings(v), Action::SavePrompt) => {
                if v.save_prompt().await {
                    self.form_focus = false;
                }
            }
            (Screen::Settings(v), Action::ResetPrompt) => {
                v.reset_prompt().await;
            }
            (Screen::Settings(v), Action::SaveApiSettings) => {
                if v.save_api_settings().await {
                    self.form_focus = false;
                }
            }
            (_, action) => tracing::debug!("{:?} does not apply to this screen", action),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::storage::{MemoryStore, Store, TOKEN_KEY};
    use std::time::Duration;

    /// App wired to an unreachable backend; enough for key handling
    pub(crate) fn offline_app(with_token: bool) -> App {
        let store = MemoryStore::shared();
        if with_token {
            store.set(TOKEN_KEY, "token").unwrap();
        }
        let config = Config {
            api_url: "http://127.0.0.1:9/api".to_string(),
            ws_url: "ws://127.0.0.1:9/ws".to_string(),
            ..Config::default()
        };
        let client =
            ApiClient::new(config.api_url.clone(), store.clone(), Duration::from_millis(200))
                .unwrap();
        let session = Session::new(client.clone(), store.clone());
        App::new(
            config,
            client,
            session,
            Router::new(),
            store,
            LogBuffer::new(),
        )
    }

    #[tokio::test]
    async fn test_protected_route_without_token_redirects_to_login() {
        let mut app = offline_app(false);
        app.enter_route(Some(Route::Events)).await;
        assert!(app.screen.is_none());
        assert_eq!(app.router.current(), Some(Route::Login));
    }

    #[tokio::test]
    async fn test_feed_runs_only_on_live_results() {
        let mut app = offline_app(true);
        app.enter_route(Some(Route::LiveResults)).await;
        assert!(app.feed.is_some());
        assert!(app.feed_updates().is_some());

        app.enter_route(Some(Route::Login)).await;
        assert!(app.feed.is_none());
        assert!(matches!(app.screen, Some(Screen::Login(_))));
        assert!(app.is_typing());
    }

    #[tokio::test]
    async fn test_session_cleared_routes_to_login() {
        let mut app = offline_app(true);
        app.enter_route(Some(Route::LiveResults)).await;
        app.on_session_cleared();
        assert!(app.feed.is_none());
        assert_eq!(app.router.current(), Some(Route::Login));
    }

    #[test]
    fn test_theme_comes_from_config_and_cycles() {
        let mut app = offline_app(false);
        assert_eq!(app.theme_kind, ThemeKind::Dark);
        app.next_theme();
        assert_eq!(app.theme_kind, ThemeKind::Light);
        assert!(app.toast.is_some());
    }
}
