// Router - the single "what is in the main panel" slot
//
// Any part of the app may replace the current route; last write wins and
// there is no back stack. Navigation is a conscious single-slot design:
// the side nav, login flow, session events and task rows all point the
// same slot somewhere else, and the renderer only ever shows one route.
//
// Subscribers get a `watch::Receiver` and re-render on every change.

use tokio::sync::watch;

/// Named routes with their typed parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Login,
    NewsTasks,
    CryptoTasks,
    /// Sources editor for one news task
    Sources { task_id: i64 },
    LiveResults,
    Events,
    Settings,
}

impl Route {
    /// Routes reachable from the side navigation, in display order
    pub fn nav_items() -> &'static [Route] {
        &[
            Route::NewsTasks,
            Route::CryptoTasks,
            Route::LiveResults,
            Route::Events,
            Route::Settings,
        ]
    }

    /// Title for the nav and title bar
    pub fn title(&self) -> &'static str {
        match self {
            Route::Login => "Login",
            Route::NewsTasks => "News Tasks",
            Route::CryptoTasks => "Crypto Tasks",
            Route::Sources { .. } => "Sources",
            Route::LiveResults => "Live Results",
            Route::Events => "Events",
            Route::Settings => "Settings",
        }
    }

    /// Whether the route needs an authenticated session
    pub fn requires_auth(&self) -> bool {
        !matches!(self, Route::Login)
    }
}

/// Process-wide route slot
///
/// Cloning shares the slot; every clone sees and may replace the same route.
#[derive(Clone)]
pub struct Router {
    slot: watch::Sender<Option<Route>>,
}

impl Router {
    pub fn new() -> Self {
        let (slot, _) = watch::channel(None);
        Self { slot }
    }

    /// Currently displayed route (`None` = empty panel)
    pub fn current(&self) -> Option<Route> {
        *self.slot.borrow()
    }

    /// Replace the displayed route
    pub fn set(&self, route: Option<Route>) {
        let previous = self.slot.send_replace(route);
        if previous != route {
            tracing::debug!("Route {:?} -> {:?}", previous, route);
        }
    }

    /// Convenience for `set(Some(route))`
    pub fn navigate(&self, route: Route) {
        self.set(Some(route));
    }

    /// Receiver that wakes on every `set`
    pub fn subscribe(&self) -> watch::Receiver<Option<Route>> {
        self.slot.subscribe()
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}
