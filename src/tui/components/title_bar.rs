// Title bar component
//
// Renders the app name, the current route and the signed-in user.

use crate::tui::app::App;
use ratatui::{
    layout::Rect,
    style::Style,
    text::Line,
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// Render the title bar at the top of the screen
///
/// Shows:
/// - App name and version
/// - Current route title (with the task id on the sources editor)
/// - Signed-in user, right-aligned in the border
pub fn render(f: &mut Frame, area: Rect, app: &App) {
    let route = match app.route {
        Some(crate::router::Route::Sources { task_id }) => format!("Sources · task #{}", task_id),
        Some(route) => route.title().to_string(),
        None => String::new(),
    };

    let title_text = if route.is_empty() {
        format!(" 📰 newswatch v{}", crate::config::VERSION)
    } else {
        format!(" 📰 newswatch v{} ──── {}", crate::config::VERSION, route)
    };

    let user = app
        .user
        .as_ref()
        .map(|u| format!(" {} ", u.email))
        .unwrap_or_default();

    let title = Paragraph::new(title_text)
        .style(app.theme.title_style())
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(app.theme.border_type)
                .border_style(Style::default().fg(app.theme.title))
                .title_top(Line::from(user).right_aligned()),
        );

    f.render_widget(title, area);
}
