// Side navigation
//
// Lists the top-level routes with their number shortcuts. The sources
// editor highlights News Tasks, since it is reached from there.

use crate::router::Route;
use crate::tui::app::App;
use ratatui::{
    layout::Rect,
    widgets::{Block, Borders, List, ListItem},
    Frame,
};

/// Nav entry that should look selected for a route
fn highlighted(route: Option<Route>) -> Option<Route> {
    match route {
        Some(Route::Sources { .. }) => Some(Route::NewsTasks),
        other => other,
    }
}

pub fn render(f: &mut Frame, area: Rect, app: &App) {
    let current = highlighted(app.route);
    let items: Vec<ListItem> = Route::nav_items()
        .iter()
        .enumerate()
        .map(|(i, route)| {
            let text = format!(" {} {}", i + 1, route.title());
            if Some(*route) == current {
                ListItem::new(text).style(app.theme.selected_style())
            } else {
                ListItem::new(text).style(app.theme.base_style())
            }
        })
        .collect();

    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(app.theme.border_type)
            .border_style(app.theme.border_style(false))
            .title(" Views "),
    );
    f.render_widget(list, area);
}
