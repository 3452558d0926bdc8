// Settings view - prompt text, post examples and API keys
//
// Three stacked blocks; Tab moves between them and the active one gets
// the highlighted border.

use super::{render_status_line, split_status};
use crate::tui::components::{form, truncate_to_width};
use crate::tui::theme::Theme;
use crate::views::settings::{SettingsSection, SettingsView};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

fn render_examples(f: &mut Frame, area: Rect, view: &SettingsView, form_focus: bool, theme: &Theme) {
    let active = view.section == SettingsSection::Examples;
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(3)])
        .split(area);

    let width = rows[0].width.saturating_sub(4) as usize;
    let items: Vec<ListItem> = view
        .examples
        .iter()
        .enumerate()
        .map(|(i, example)| {
            let item = ListItem::new(format!(" {}", truncate_to_width(example, width)));
            if active && i == view.selected_example {
                item.style(theme.selected_style())
            } else {
                item
            }
        })
        .collect();
    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(theme.border_type)
            .border_style(theme.border_style(active && !form_focus))
            .title(format!(" Post examples ({}) ", view.examples.len())),
    );
    f.render_widget(list, rows[0]);

    form::render(f, rows[1], &view.example_form, "Add example", active && form_focus, theme);
}

pub fn render(f: &mut Frame, area: Rect, view: &SettingsView, form_focus: bool, theme: &Theme) {
    let (area, status_area) = split_status(area, view.status.as_ref());

    if view.prompt.is_none() && view.api_settings.is_none() {
        let empty = Paragraph::new("  Settings unavailable. Press r to retry.")
            .style(theme.muted_style())
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_type(theme.border_type)
                    .title(" Settings "),
            );
        f.render_widget(empty, area);
        render_status_line(f, status_area, view.status.as_ref(), theme);
        return;
    }

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(view.prompt_form.fields.len() as u16 + 2),
            Constraint::Min(6),
            Constraint::Length(view.api_form.fields.len() as u16 + 2),
        ])
        .split(area);

    let section = view.section;
    form::render(
        f,
        rows[0],
        &view.prompt_form,
        SettingsSection::Prompt.title(),
        section == SettingsSection::Prompt && form_focus,
        theme,
    );
    render_examples(f, rows[1], view, form_focus, theme);
    form::render(
        f,
        rows[2],
        &view.api_form,
        SettingsSection::Api.title(),
        section == SettingsSection::Api && form_focus,
        theme,
    );

    render_status_line(f, status_area, view.status.as_ref(), theme);
}
