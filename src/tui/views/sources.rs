// Sources view - Telegram and RSS lists side by side, add form below

use super::{render_status_line, split_status};
use crate::api::models::SourceType;
use crate::tui::components::form;
use crate::tui::theme::Theme;
use crate::views::SourcesView;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

fn render_list(
    f: &mut Frame,
    area: Rect,
    view: &SourcesView,
    source_type: SourceType,
    theme: &Theme,
) {
    let active = view.active == source_type;
    let items: Vec<ListItem> = view
        .list(source_type)
        .iter()
        .enumerate()
        .map(|(i, (name, url))| {
            let line = Line::from(vec![
                Span::raw(format!(" {} ", name)),
                Span::styled(url.as_str(), theme.muted_style()),
            ]);
            if active && i == view.selected {
                ListItem::new(line).style(theme.selected_style())
            } else {
                ListItem::new(line)
            }
        })
        .collect();

    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(theme.border_type)
            .border_style(theme.border_style(active))
            .title(format!(
                " {} ({}) ",
                source_type.label(),
                view.list(source_type).len()
            )),
    );
    f.render_widget(list, area);
}

pub fn render(f: &mut Frame, area: Rect, view: &SourcesView, form_focus: bool, theme: &Theme) {
    let (area, status_area) = split_status(area, view.status.as_ref());

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(4),
            Constraint::Length(view.add_form.fields.len() as u16 + 2),
        ])
        .split(area);

    let heading = match &view.task_title {
        Some(title) => format!(" Sources for \"{}\"", title),
        None => format!(" Sources for task #{}", view.task_id),
    };
    f.render_widget(
        Paragraph::new(heading).style(theme.title_style()),
        rows[0],
    );

    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(rows[1]);
    render_list(f, cols[0], view, SourceType::Telegram, theme);
    render_list(f, cols[1], view, SourceType::Rss, theme);

    let title = format!("Add {} source", view.active.label());
    form::render(f, rows[2], &view.add_form, &title, form_focus, theme);

    render_status_line(f, status_area, view.status.as_ref(), theme);
}
