// Form widget
//
// Draws a `views::Form` as one "Label: value" line per field. The focused
// field is highlighted only while the form has the keyboard.

use crate::tui::theme::Theme;
use crate::views::{Field, FieldKind, Form};
use ratatui::{
    layout::Rect,
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// Display text for a field value
fn field_text(field: &Field) -> String {
    match field.kind {
        FieldKind::Choice(_) => format!("‹ {} ›", field.value),
        _ => field.display_value(),
    }
}

fn field_line<'a>(field: &'a Field, focused: bool, label_width: usize, theme: &Theme) -> Line<'a> {
    let marker = if field.required { "*" } else { " " };
    let label = Span::styled(
        format!("{:>width$}{} ", field.label, marker, width = label_width),
        theme.muted_style(),
    );

    let value = if field.value.is_empty() && !focused {
        Span::styled(field.hint.unwrap_or("").to_string(), theme.muted_style())
    } else if focused {
        let cursor = if matches!(field.kind, FieldKind::Choice(_)) { "" } else { "▏" };
        Span::styled(
            format!("{}{}", field_text(field), cursor),
            theme.selected_style(),
        )
    } else {
        Span::styled(field_text(field), theme.base_style())
    };

    Line::from(vec![label, value])
}

/// Lines for every field, without a surrounding block
pub fn lines<'a>(form: &'a Form, active: bool, theme: &Theme) -> Vec<Line<'a>> {
    let label_width = form
        .fields
        .iter()
        .map(|f| f.label.chars().count())
        .max()
        .unwrap_or(0);
    form.fields
        .iter()
        .enumerate()
        .map(|(i, field)| field_line(field, active && i == form.focus, label_width, theme))
        .collect()
}

/// Render a form inside a titled block
pub fn render(f: &mut Frame, area: Rect, form: &Form, title: &str, active: bool, theme: &Theme) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(theme.border_type)
        .border_style(theme.border_style(active))
        .title(format!(" {} ", title))
        .title_style(if active {
            theme.title_style()
        } else {
            theme.muted_style().add_modifier(Modifier::BOLD)
        });
    f.render_widget(Paragraph::new(lines(form, active, theme)).block(block), area);
}
