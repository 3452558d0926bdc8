// Events view - tracked market events with rules for the selected one

use super::{render_status_line, split_status, split_with_panel};
use crate::api::models::{display_date, Event};
use crate::tui::components::active_label;
use crate::tui::theme::Theme;
use crate::views::EventsView;
use ratatui::{
    layout::{Constraint, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, Wrap},
    Frame,
};

fn event_row<'a>(event: &'a Event, selected: bool, theme: &Theme) -> Row<'a> {
    let style = if selected {
        theme.selected_style()
    } else {
        theme.base_style()
    };
    Row::new(vec![
        Cell::from(event.title.as_str()),
        Cell::from(display_date(&event.ends_at)),
        Cell::from(format!("{}/{}", event.positives.len(), event.false_positives.len())),
        Cell::from(active_label(event.is_active)).style(theme.outcome_style(Some(event.is_active))),
    ])
    .style(style)
}

fn render_detail(f: &mut Frame, area: Rect, event: Option<&Event>, theme: &Theme) {
    let lines = match event {
        Some(event) => vec![
            Line::from(Span::styled(event.title.as_str(), theme.title_style())),
            Line::from(""),
            Line::from(event.description.as_str()),
            Line::from(""),
            Line::from(Span::styled("Rules", theme.muted_style())),
            Line::from(event.rules.as_str()),
        ],
        None => vec![Line::from(Span::styled("No event selected", theme.muted_style()))],
    };
    let detail = Paragraph::new(lines).wrap(Wrap { trim: true }).block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(theme.border_type)
            .border_style(theme.border_style(false))
            .title(" Details "),
    );
    f.render_widget(detail, area);
}

pub fn render(f: &mut Frame, area: Rect, view: &EventsView, theme: &Theme) {
    let (area, status_area) = split_status(area, view.status.as_ref());
    let (list_area, detail_area) = split_with_panel(area, 8);

    let rows: Vec<Row> = view
        .events
        .iter()
        .enumerate()
        .map(|(i, event)| event_row(event, i == view.selected, theme))
        .collect();
    let header = Row::new(vec!["Title", "Ends", "+/-", "State"])
        .style(theme.title_style())
        .bottom_margin(1);
    let table = Table::new(
        rows,
        [
            Constraint::Min(16),
            Constraint::Length(10),
            Constraint::Length(7),
            Constraint::Length(9),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(theme.border_type)
            .border_style(theme.border_style(true))
            .title(format!(" Events ({}) ", view.events.len())),
    );
    f.render_widget(table, list_area);

    render_detail(f, detail_area, view.selected_event(), theme);
    render_status_line(f, status_area, view.status.as_ref(), theme);
}
