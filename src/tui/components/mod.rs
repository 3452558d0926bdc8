// Components module - reusable UI building blocks
//
// Shell components are rendered around every view:
// - Title bar: app name, route, signed-in user
// - Nav: top-level routes with number shortcuts
// - Status bar: key hints, busy indicator, feed state
// - Logs panel: system log entries (toggled with 'L')
//
// The form widget and formatters are shared by the route views.

pub mod form;
pub mod formatters;
pub mod logs_panel;
pub mod nav;
pub mod status_bar;
pub mod title_bar;
pub mod toast;

pub use toast::Toast;

use crate::tui::app::App;
use ratatui::{layout::Rect, Frame};

/// Render the title bar (convenience wrapper)
pub fn render_title(f: &mut Frame, area: Rect, app: &App) {
    title_bar::render(f, area, app);
}

/// Render the status bar (convenience wrapper)
pub fn render_status(f: &mut Frame, area: Rect, app: &App) {
    status_bar::render(f, area, app);
}

/// Render the logs panel (convenience wrapper)
pub fn render_logs_panel(f: &mut Frame, area: Rect, app: &App) {
    logs_panel::render(f, area, app);
}

/// Render the side navigation (convenience wrapper)
pub fn render_nav(f: &mut Frame, area: Rect, app: &App) {
    nav::render(f, area, app);
}

pub use formatters::{active_label, format_target, pad_to_width, truncate_to_width};
