// Status bar component
//
// Renders key hints for the current screen on the left and session facts
// (busy indicator, feed state, theme, uptime) on the right.

use crate::tui::app::{App, Screen};
use crate::tui::layout::Breakpoint;
use crate::views::settings::SettingsSection;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// Key hints for whatever currently has the keyboard
pub fn key_hints(app: &App) -> &'static str {
    if app.is_typing() {
        return match app.screen {
            Some(Screen::Login(_)) => "Tab:next field  Enter:sign in  Ctrl-C:quit",
            _ => "Tab:next field  ←→:choose  Enter:submit  Esc:cancel",
        };
    }
    match &app.screen {
        Some(Screen::NewsTasks(_)) => {
            "n:new  e:edit  Space:on/off  d:delete  s:sources  c:check news  r:reload"
        }
        Some(Screen::CryptoTasks(_)) => "n:new  e:edit  Space:on/off  d:delete  r:reload",
        Some(Screen::Sources(_)) => "Tab:switch list  a:add  d:remove  Esc:back",
        Some(Screen::LiveResults) => "↑↓:select  y:copy link  g:newest",
        Some(Screen::Events(_)) => "f:refresh from markets  Space:pause  d:delete  r:reload",
        Some(Screen::Settings(v)) => match v.section {
            SettingsSection::Examples => "Tab:section  a:add  d:remove  s:save  x:reset",
            _ => "Tab:section  e:edit  s:save  x:reset",
        },
        Some(Screen::Login(_)) | None => "q:quit",
    }
}

/// Render the status bar
///
/// Adapts to terminal width:
/// - Wide: hints plus feed state, theme and uptime
/// - Narrow: hints, busy indicator only
pub fn render(f: &mut Frame, area: Rect, app: &App) {
    let bp = Breakpoint::from_width(area.width);

    let mut facts = Vec::new();
    if let Some(label) = app.busy {
        facts.push(format!("⏳ {}…", label));
    }
    if bp.at_least(Breakpoint::Wide) {
        if let Some(state) = app.feed_state() {
            facts.push(format!("📡 {}", state.label()));
        }
        facts.push(format!("🎨 {}", app.theme_kind.name()));
        facts.push(format!("⏱ {}", app.uptime()));
    }
    let right = facts.join(" │ ");

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Min(10),
            Constraint::Length(right.chars().count() as u16 + 2),
        ])
        .split(area);

    let block = Block::default().borders(Borders::TOP);
    let hints = Paragraph::new(format!(" {}  1-5:views  t:theme  L:logs  O:logout", key_hints(app)))
        .style(app.theme.muted_style())
        .block(block.clone());
    let status = Paragraph::new(right)
        .style(Style::default().fg(app.theme.status_bar))
        .block(block);

    f.render_widget(hints, chunks[0]);
    f.render_widget(status, chunks[1]);
}
