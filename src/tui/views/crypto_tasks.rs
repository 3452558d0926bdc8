// Crypto tasks view - ticker targets with a create or edit panel

use super::{render_status_line, split_status, split_with_panel};
use crate::api::models::{display_date, CryptoTask, CryptoTaskType};
use crate::tui::components::{active_label, form, format_target};
use crate::tui::theme::Theme;
use crate::views::CryptoTasksView;
use ratatui::{
    layout::{Constraint, Rect},
    widgets::{Block, Borders, Cell, Row, Table},
    Frame,
};

fn target_text(task: &CryptoTask) -> String {
    match task.task_type {
        CryptoTaskType::Price => format!("${}", format_target(task.end_point)),
        CryptoTaskType::Percent => format!("{}%", format_target(task.end_point)),
    }
}

fn task_row<'a>(task: &'a CryptoTask, selected: bool, theme: &Theme) -> Row<'a> {
    let style = if selected {
        theme.selected_style()
    } else {
        theme.base_style()
    };
    Row::new(vec![
        Cell::from(task.id.to_string()),
        Cell::from(task.title.as_str()),
        Cell::from(task.ticker.as_str()),
        Cell::from(target_text(task)),
        Cell::from(display_date(&task.end_date)),
        Cell::from(task.measurement_time.as_str()),
        Cell::from(active_label(task.is_active)).style(theme.outcome_style(Some(task.is_active))),
    ])
    .style(style)
}

pub fn render(f: &mut Frame, area: Rect, view: &CryptoTasksView, theme: &Theme) {
    let (area, status_area) = split_status(area, view.status.as_ref());

    let panel = match (&view.editing, &view.create) {
        (Some(edit), _) => Some((&edit.form, format!("Edit task #{}", edit.id))),
        (None, Some(create)) => Some((create, "New crypto task".to_string())),
        (None, None) => None,
    };
    let (list_area, panel_area) = match &panel {
        Some((form, _)) => {
            let (list, panel) = split_with_panel(area, form.fields.len() as u16 + 2);
            (list, Some(panel))
        }
        None => (area, None),
    };

    let rows: Vec<Row> = view
        .tasks
        .iter()
        .enumerate()
        .map(|(i, task)| task_row(task, i == view.selected, theme))
        .collect();
    let header = Row::new(vec!["#", "Title", "Ticker", "Target", "Ends", "At", "State"])
        .style(theme.title_style())
        .bottom_margin(1);
    let table = Table::new(
        rows,
        [
            Constraint::Length(5),
            Constraint::Min(14),
            Constraint::Length(6),
            Constraint::Length(12),
            Constraint::Length(10),
            Constraint::Length(8),
            Constraint::Length(9),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(theme.border_type)
            .border_style(theme.border_style(panel.is_none()))
            .title(format!(" Crypto Tasks ({}) ", view.tasks.len())),
    );
    f.render_widget(table, list_area);

    if let (Some((form, title)), Some(panel_area)) = (panel, panel_area) {
        form::render(f, panel_area, form, &title, true, theme);
    }

    render_status_line(f, status_area, view.status.as_ref(), theme);
}
