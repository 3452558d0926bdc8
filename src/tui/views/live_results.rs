// Live results view
//
// One row per feed entry, newest first. Missing fields get readable
// placeholders instead of blank cells.

use crate::feed::{FeedEntry, FeedState};
use crate::tui::app::App;
use crate::tui::components::truncate_to_width;
use ratatui::{
    layout::{Constraint, Rect},
    style::Style,
    text::Line,
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};

/// Display strings for one feed entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct FeedRow {
    pub title: String,
    pub link: Option<String>,
    pub task: String,
    pub date: String,
    pub result: &'static str,
    pub outcome: Option<bool>,
}

impl FeedRow {
    pub fn from_entry(entry: &FeedEntry) -> Self {
        Self {
            title: entry.news_title().unwrap_or("No title available").to_string(),
            link: entry.news_link().map(str::to_string),
            task: entry.task_title().unwrap_or("Unknown").to_string(),
            date: entry
                .pub_date()
                .map(format_pub_date)
                .unwrap_or_else(|| "Unknown date".to_string()),
            result: match entry.result() {
                Some(true) => "True",
                Some(false) => "False",
                None => "Unknown",
            },
            outcome: entry.result(),
        }
    }
}

/// Local date-time for RFC 3339 / RFC 2822 stamps, verbatim otherwise
fn format_pub_date(raw: &str) -> String {
    let parsed = chrono::DateTime::parse_from_rfc3339(raw)
        .or_else(|_| chrono::DateTime::parse_from_rfc2822(raw));
    match parsed {
        Ok(dt) => dt
            .with_timezone(&chrono::Local)
            .format("%Y-%m-%d %H:%M")
            .to_string(),
        Err(_) => raw.to_string(),
    }
}

fn state_style(state: Option<FeedState>, app: &App) -> Style {
    match state {
        Some(FeedState::Open) => app.theme.success_style(),
        Some(FeedState::ClosedFinal) => app.theme.error_style(),
        _ => Style::default().fg(app.theme.warning),
    }
}

pub fn render(f: &mut Frame, area: Rect, app: &App) {
    let entries = app.feed_entries();
    let state = app.feed_state();
    let state_label = state.map(|s| s.label()).unwrap_or_else(|| "Stopped".to_string());

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(app.theme.border_style(true))
        .title(format!(" Live Results ({}) ", entries.len()))
        .title_top(
            Line::styled(format!(" {} ", state_label), state_style(state, app)).right_aligned(),
        );

    if entries.is_empty() {
        let text = Paragraph::new("  Waiting for results…")
            .style(app.theme.muted_style())
            .block(block);
        f.render_widget(text, area);
        return;
    }

    let title_width = (area.width as usize).saturating_sub(60).max(20);
    let rows: Vec<Row> = entries
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            let row = FeedRow::from_entry(entry);
            let style = if i == app.feed_selected {
                app.theme.selected_style()
            } else {
                app.theme.base_style()
            };
            Row::new(vec![
                Cell::from(truncate_to_width(&row.title, title_width)),
                Cell::from(truncate_to_width(&row.task, 24)),
                Cell::from(row.date),
                Cell::from(row.result).style(app.theme.outcome_style(row.outcome)),
            ])
            .style(style)
        })
        .collect();

    let header = Row::new(vec!["News", "Task", "Published", "Result"])
        .style(app.theme.title_style())
        .bottom_margin(1);

    let table = Table::new(
        rows,
        [
            Constraint::Min(20),
            Constraint::Length(24),
            Constraint::Length(17),
            Constraint::Length(8),
        ],
    )
    .header(header)
    .block(block);

    f.render_widget(table, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::decode_frame;

    #[test]
    fn test_full_entry() {
        let entry = decode_frame(
            r#"{"news": {"title": "Rates cut", "link": "https://x.io/a", "pub_date": "not a date"},
                "task": {"id": 3, "title": "Central banks", "result": false}}"#,
        )
        .unwrap();
        let row = FeedRow::from_entry(&entry);
        assert_eq!(row.title, "Rates cut");
        assert_eq!(row.link.as_deref(), Some("https://x.io/a"));
        assert_eq!(row.task, "Central banks");
        assert_eq!(row.date, "not a date");
        assert_eq!(row.result, "False");
    }

    #[test]
    fn test_missing_fields_use_placeholders() {
        let entry = decode_frame(r#"{"unexpected": 1}"#).unwrap();
        let row = FeedRow::from_entry(&entry);
        assert_eq!(row.title, "No title available");
        assert_eq!(row.task, "Unknown");
        assert_eq!(row.date, "Unknown date");
        assert_eq!(row.result, "Unknown");
        assert_eq!(row.link, None);
    }

    #[test]
    fn test_rfc3339_dates_are_reformatted() {
        let formatted = format_pub_date("2025-03-01T10:00:00+00:00");
        assert_eq!(formatted.len(), "2025-03-01 10:00".len());
        assert!(formatted.starts_with("2025-0"));
    }
}
