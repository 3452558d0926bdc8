// Login view - centered credential form

use super::render_status_line;
use crate::tui::components::form;
use crate::tui::theme::Theme;
use crate::views::LoginView;
use ratatui::{
    layout::{Constraint, Direction, Flex, Layout, Rect},
    Frame,
};

pub fn render(f: &mut Frame, area: Rect, view: &LoginView, theme: &Theme) {
    let [column] = Layout::horizontal([Constraint::Max(60)])
        .flex(Flex::Center)
        .areas(area);
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .flex(Flex::Center)
        .constraints([Constraint::Length(4), Constraint::Length(1)])
        .split(column);

    form::render(f, rows[0], &view.form, "Sign in", true, theme);
    render_status_line(f, Some(rows[1]), view.status.as_ref(), theme);
}
