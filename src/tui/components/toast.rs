//! Short-lived overlay in the bottom-right corner
//!
//! Confirms things that happen outside the current view: theme changes,
//! sign-in, clipboard copies. Failures stay up longer and use the error
//! color.

use crate::tui::theme::Theme;
use ratatui::{
    layout::{Alignment, Rect},
    style::Style,
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};
use std::time::{Duration, Instant};
use unicode_width::UnicodeWidthStr;

const INFO_TTL: Duration = Duration::from_secs(2);
const ERROR_TTL: Duration = Duration::from_secs(4);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Info,
    Error,
}

pub struct Toast {
    pub message: String,
    pub kind: ToastKind,
    shown_at: Instant,
}

impl Toast {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: ToastKind::Info,
            shown_at: Instant::now(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: ToastKind::Error,
            ..Self::new(message)
        }
    }

    fn ttl(&self) -> Duration {
        match self.kind {
            ToastKind::Info => INFO_TTL,
            ToastKind::Error => ERROR_TTL,
        }
    }

    pub fn is_expired(&self) -> bool {
        self.shown_at.elapsed() >= self.ttl()
    }

    /// Draw over whatever is underneath
    pub fn render(&self, f: &mut Frame, area: Rect, theme: &Theme) {
        let width = (self.message.width() as u16 + 4).min(area.width.saturating_sub(4));
        let toast_area = Rect::new(
            area.right().saturating_sub(width + 2),
            area.bottom().saturating_sub(5),
            width,
            3,
        );

        let accent = match self.kind {
            ToastKind::Info => theme.highlight,
            ToastKind::Error => theme.error,
        };
        let paragraph = Paragraph::new(self.message.as_str())
            .alignment(Alignment::Center)
            .style(Style::default().fg(theme.foreground))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_type(theme.border_type)
                    .border_style(Style::default().fg(accent))
                    .style(Style::default().bg(theme.background)),
            );

        f.render_widget(Clear, toast_area);
        f.render_widget(paragraph, toast_area);
    }
}
