// Theme system for the TUI
//
// Themes are switched at runtime with 't'. Each theme defines colors for
// every UI element; render code asks the theme for styles instead of
// hardcoding colors.

use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::BorderType;

/// Available themes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThemeKind {
    #[default]
    Dark,
    Light,
    Monochrome,
    HighContrast,
}

impl ThemeKind {
    /// Get all available themes
    pub fn all() -> &'static [ThemeKind] {
        &[
            ThemeKind::Dark,
            ThemeKind::Light,
            ThemeKind::Monochrome,
            ThemeKind::HighContrast,
        ]
    }

    /// Get the next theme in the cycle
    pub fn next(self) -> Self {
        let themes = Self::all();
        let current = themes.iter().position(|&t| t == self).unwrap_or(0);
        themes[(current + 1) % themes.len()]
    }

    /// Get the previous theme in the cycle
    pub fn prev(self) -> Self {
        let themes = Self::all();
        let current = themes.iter().position(|&t| t == self).unwrap_or(0);
        themes[(current + themes.len() - 1) % themes.len()]
    }

    /// Get display name (also the config file spelling)
    pub fn name(&self) -> &'static str {
        match self {
            ThemeKind::Dark => "Dark",
            ThemeKind::Light => "Light",
            ThemeKind::Monochrome => "Monochrome",
            ThemeKind::HighContrast => "High Contrast",
        }
    }

    /// Look up a theme by name, ignoring case, spaces and underscores
    ///
    /// Unknown names fall back to the default theme.
    pub fn from_name(name: &str) -> Self {
        let wanted: String = name
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '_' && *c != '-')
            .flat_map(char::to_lowercase)
            .collect();
        Self::all()
            .iter()
            .copied()
            .find(|t| t.name().replace(' ', "").to_lowercase() == wanted)
            .unwrap_or_default()
    }

    /// Get the theme configuration
    pub fn theme(&self) -> Theme {
        match self {
            ThemeKind::Dark => Theme::dark(),
            ThemeKind::Light => Theme::light(),
            ThemeKind::Monochrome => Theme::monochrome(),
            ThemeKind::HighContrast => Theme::high_contrast(),
        }
    }
}

/// Complete theme definition with all UI colors
#[derive(Debug, Clone)]
pub struct Theme {
    // Base colors
    pub background: Color,
    pub foreground: Color,
    pub muted: Color,
    pub border: Color,
    pub highlight: Color,
    pub border_type: BorderType,

    // Title and status
    pub title: Color,
    pub status_bar: Color,

    // Selection
    pub selection: Color,
    pub selection_fg: Color,

    // Outcomes (feed results, active flags, status lines)
    pub success: Color,
    pub error: Color,
    pub warning: Color,

    // Log levels
    pub log_error: Color,
    pub log_warn: Color,
    pub log_info: Color,
    pub log_debug: Color,
    pub log_trace: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}

impl Theme {
    /// Dark theme (default)
    pub fn dark() -> Self {
        Self {
            background: Color::Reset,
            foreground: Color::White,
            muted: Color::DarkGray,
            border: Color::Gray,
            highlight: Color::Cyan,
            border_type: BorderType::Rounded,

            title: Color::Cyan,
            status_bar: Color::Green,

            selection: Color::DarkGray,
            selection_fg: Color::Yellow,

            success: Color::Green,
            error: Color::Red,
            warning: Color::Yellow,

            log_error: Color::Red,
            log_warn: Color::Yellow,
            log_info: Color::Blue,
            log_debug: Color::Gray,
            log_trace: Color::DarkGray,
        }
    }

    /// Light theme
    pub fn light() -> Self {
        Self {
            background: Color::White,
            foreground: Color::Black,
            muted: Color::Gray,
            border: Color::DarkGray,
            highlight: Color::Blue,
            border_type: BorderType::Rounded,

            title: Color::Blue,
            status_bar: Color::DarkGray,

            selection: Color::LightBlue,
            selection_fg: Color::Black,

            success: Color::Green,
            error: Color::Red,
            warning: Color::Rgb(184, 134, 11), // Dark goldenrod

            log_error: Color::Red,
            log_warn: Color::Rgb(184, 134, 11),
            log_info: Color::Blue,
            log_debug: Color::DarkGray,
            log_trace: Color::Gray,
        }
    }

    /// No color at all; emphasis comes from modifiers only
    pub fn monochrome() -> Self {
        Self {
            background: Color::Reset,
            foreground: Color::Reset,
            muted: Color::Reset,
            border: Color::Reset,
            highlight: Color::Reset,
            border_type: BorderType::Plain,

            title: Color::Reset,
            status_bar: Color::Reset,

            selection: Color::Reset,
            selection_fg: Color::Reset,

            success: Color::Reset,
            error: Color::Reset,
            warning: Color::Reset,

            log_error: Color::Reset,
            log_warn: Color::Reset,
            log_info: Color::Reset,
            log_debug: Color::Reset,
            log_trace: Color::Reset,
        }
    }

    /// Bright primaries on black
    pub fn high_contrast() -> Self {
        Self {
            background: Color::Black,
            foreground: Color::White,
            muted: Color::Gray,
            border: Color::White,
            highlight: Color::LightYellow,
            border_type: BorderType::Thick,

            title: Color::LightYellow,
            status_bar: Color::LightGreen,

            selection: Color::White,
            selection_fg: Color::Black,

            success: Color::LightGreen,
            error: Color::LightRed,
            warning: Color::LightYellow,

            log_error: Color::LightRed,
            log_warn: Color::LightYellow,
            log_info: Color::LightCyan,
            log_debug: Color::White,
            log_trace: Color::Gray,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Style helpers
    // ─────────────────────────────────────────────────────────────────────────

    pub fn base_style(&self) -> Style {
        Style::default().fg(self.foreground).bg(self.background)
    }

    pub fn border_style(&self, focused: bool) -> Style {
        if focused {
            Style::default().fg(self.highlight)
        } else {
            Style::default().fg(self.border)
        }
    }

    pub fn title_style(&self) -> Style {
        Style::default().fg(self.title).add_modifier(Modifier::BOLD)
    }

    pub fn muted_style(&self) -> Style {
        Style::default().fg(self.muted)
    }

    /// Selection keeps REVERSED so it stays visible in monochrome
    pub fn selected_style(&self) -> Style {
        let style = Style::default()
            .fg(self.selection_fg)
            .bg(self.selection)
            .add_modifier(Modifier::BOLD);
        if self.selection == Color::Reset {
            style.add_modifier(Modifier::REVERSED)
        } else {
            style
        }
    }

    pub fn error_style(&self) -> Style {
        Style::default().fg(self.error).add_modifier(Modifier::BOLD)
    }

    pub fn success_style(&self) -> Style {
        Style::default().fg(self.success)
    }

    /// Style for a yes/no/unknown outcome
    pub fn outcome_style(&self, outcome: Option<bool>) -> Style {
        match outcome {
            Some(true) => self.success_style(),
            Some(false) => Style::default().fg(self.error),
            None => self.muted_style(),
        }
    }
}
