// Views module - screen-level rendering logic
//
// Each route has a full-screen renderer in the content slot:
// - Login: credential form
// - News / Crypto tasks: task table plus create or edit panel
// - Sources: Telegram and RSS lists for one news task
// - Live results: feed entries, newest first
// - Events: tracked market events
// - Settings: prompt, post examples and API keys
//
// This module builds the shell around the content slot and dispatches to
// the renderer for the current screen.

mod crypto_tasks;
mod events;
mod live_results;
mod login;
mod news_tasks;
mod settings;
mod sources;

pub(crate) use live_results::FeedRow;

use super::app::{App, Screen};
use super::layout::Breakpoint;
use crate::tui::components;
use crate::tui::theme::Theme;
use crate::views::Status;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph};
use ratatui::Frame;

/// Width of the side navigation
const NAV_WIDTH: u16 = 20;
/// Height of the logs panel when shown
const LOGS_HEIGHT: u16 = 8;

/// Main UI render function - called on every frame
pub fn draw(f: &mut Frame, app: &mut App) {
    let bg_block = Block::default().style(Style::default().bg(app.theme.background));
    f.render_widget(bg_block, f.area());

    let mut constraints = vec![Constraint::Length(3), Constraint::Min(5)];
    if app.show_logs {
        constraints.push(Constraint::Length(LOGS_HEIGHT));
    }
    constraints.push(Constraint::Length(2));

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(f.area());

    components::render_title(f, chunks[0], app);
    if app.show_logs {
        components::render_logs_panel(f, chunks[2], app);
    }
    components::render_status(f, chunks[chunks.len() - 1], app);

    // Body: nav on the left unless the terminal is narrow or nobody is signed in
    let body = chunks[1];
    let show_nav = Breakpoint::from_width(body.width).at_least(Breakpoint::Normal)
        && !matches!(app.screen, Some(Screen::Login(_)));
    let content = if show_nav {
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(NAV_WIDTH), Constraint::Min(20)])
            .split(body);
        components::render_nav(f, cols[0], app);
        cols[1]
    } else {
        body
    };

    match &app.screen {
        Some(Screen::Login(view)) => login::render(f, content, view, &app.theme),
        Some(Screen::NewsTasks(view)) => news_tasks::render(f, content, view, &app.theme),
        Some(Screen::CryptoTasks(view)) => crypto_tasks::render(f, content, view, &app.theme),
        Some(Screen::Sources(view)) => sources::render(f, content, view, app.form_focus, &app.theme),
        Some(Screen::LiveResults) => live_results::render(f, content, app),
        Some(Screen::Events(view)) => events::render(f, content, view, &app.theme),
        Some(Screen::Settings(view)) => {
            settings::render(f, content, view, app.form_focus, &app.theme)
        }
        None => {}
    }

    if let Some(ref toast) = app.toast {
        toast.render(f, f.area(), &app.theme);
    }

    app.clear_expired_toast();
}

// ─────────────────────────────────────────────────────────────────────────────
// Shared helpers for route renderers
// ─────────────────────────────────────────────────────────────────────────────

/// Split off a one-line status row at the bottom when there is a status
pub(super) fn split_status(area: Rect, status: Option<&Status>) -> (Rect, Option<Rect>) {
    if status.is_none() || area.height < 4 {
        return (area, None);
    }
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1)])
        .split(area);
    (rows[0], Some(rows[1]))
}

pub(super) fn render_status_line(f: &mut Frame, area: Option<Rect>, status: Option<&Status>, theme: &Theme) {
    let (Some(area), Some(status)) = (area, status) else {
        return;
    };
    let style = if status.is_error() {
        theme.error_style()
    } else {
        theme.success_style()
    };
    let icon = if status.is_error() { "✗" } else { "✓" };
    let line = Line::from(vec![Span::styled(format!(" {} {}", icon, status.message()), style)]);
    f.render_widget(Paragraph::new(line), area);
}

/// Split content into a list and a side panel, stacking on narrow terminals
pub(super) fn split_with_panel(area: Rect, panel_height: u16) -> (Rect, Rect) {
    if Breakpoint::from_width(area.width).at_least(Breakpoint::Wide) {
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
            .split(area);
        (cols[0], cols[1])
    } else {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(3), Constraint::Length(panel_height)])
            .split(area);
        (rows[0], rows[1])
    }
}
