//! Feature views: state and actions behind each screen
//!
//! Each view owns its display state (rows, selection, open forms, status
//! line) and exposes async actions that call the backend through the
//! resource client. Rendering lives in `tui::views`; the CLI reuses the
//! same actions for its table output.
//!
//! Client failures are already logged by the client; views only translate
//! them into a [`Status`] line where the user needs feedback.

pub mod crypto_tasks;
pub mod events;
pub mod form;
pub mod login;
pub mod news_tasks;
pub mod settings;
pub mod sources;

pub use crypto_tasks::CryptoTasksView;
pub use events::EventsView;
pub use form::{Field, FieldKind, Form, ValidationError};
pub use login::LoginView;
pub use news_tasks::NewsTasksView;
pub use settings::SettingsView;
pub use sources::SourcesView;

/// One-line feedback shown under a view
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    Info(String),
    Error(String),
}

impl Status {
    pub fn info(message: impl Into<String>) -> Self {
        Status::Info(message.into())
    }

    pub fn error(message: impl Into<String>) -> Self {
        Status::Error(message.into())
    }

    pub fn message(&self) -> &str {
        match self {
            Status::Info(m) | Status::Error(m) => m,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Status::Error(_))
    }
}

/// Move a selection index down, stopping at the last row
pub(crate) fn select_next(selected: &mut usize, len: usize) {
    if *selected + 1 < len {
        *selected += 1;
    }
}

/// Move a selection index up, stopping at the first row
pub(crate) fn select_prev(selected: &mut usize) {
    *selected = selected.saturating_sub(1);
}

/// Keep a selection inside `0..len` after rows were removed
pub(crate) fn clamp_selection(selected: &mut usize, len: usize) {
    if *selected >= len {
        *selected = len.saturating_sub(1);
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selection_helpers() {
        let mut selected = 0;
        select_prev(&mut selected);
        assert_eq!(selected, 0);
        select_next(&mut selected, 2);
        select_next(&mut selected, 2);
        assert_eq!(selected, 1);

        clamp_selection(&mut selected, 1);
        assert_eq!(selected, 0);
        clamp_selection(&mut selected, 0);
        assert_eq!(selected, 0);
    }

    #[test]
    fn test_status_accessors() {
        let status = Status::error("boom");
        assert!(status.is_error());
        assert_eq!(status.message(), "boom");
        assert!(!Status::info("ok").is_error());
    }
}
