// TUI module - Terminal User Interface
//
// This module manages the terminal UI using ratatui. It handles:
// - Terminal initialization and cleanup
// - Event loop (keyboard input, timer ticks, route/session/feed changes)
// - Layered key dispatch
// - Running network actions produced by key handling

pub mod app;
pub mod clipboard;
pub mod components;
pub mod layout;
pub mod theme;
pub mod views;

use crate::router::Route;
use crate::session::SessionEvent;
use crate::views::settings::SettingsSection;
use crate::views::Form;
use anyhow::{Context, Result};
use app::{Action, App, Screen};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::time::Duration;
use tokio::sync::{broadcast, watch};

/// Run the TUI
///
/// Sets up the terminal, runs the event loop, and restores the terminal
/// even when the loop fails.
pub async fn run_tui(mut app: App) -> Result<()> {
    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("Failed to setup terminal")?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;

    let result = run_event_loop(&mut terminal, &mut app).await;

    disable_raw_mode().context("Failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("Failed to restore terminal")?;
    terminal.show_cursor().context("Failed to show cursor")?;

    result
}

/// Wait for the next feed revision; never resolves without a feed
async fn feed_changed(rx: &mut Option<watch::Receiver<u64>>) -> bool {
    match rx {
        Some(rx) => rx.changed().await.is_ok(),
        None => std::future::pending().await,
    }
}

/// Main event loop
///
/// Waits on whichever happens first:
/// 1. Keyboard input
/// 2. Timer tick (periodic redraw, toast expiry)
/// 3. Route change from the router slot
/// 4. Session broadcast (login/logout)
/// 5. A new live feed entry
///
/// Actions produced by key handling are awaited after a redraw that shows
/// the busy indicator.
async fn run_event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<()> {
    let mut tick_interval = tokio::time::interval(Duration::from_millis(200));
    let mut route_rx = app.router.subscribe();
    let mut session_rx = app.session.subscribe();

    app.enter_route(app.router.current()).await;
    let mut feed_rx = app.feed_updates();

    loop {
        terminal
            .draw(|f| views::draw(f, app))
            .context("Failed to draw terminal")?;

        let mut pending: Option<Action> = None;

        tokio::select! {
            _ = async {
                if event::poll(Duration::from_millis(10)).unwrap_or(false) {
                    if let Ok(Event::Key(key_event)) = event::read() {
                        pending = handle_key_event(app, key_event);
                    }
                }
            } => {}

            _ = tick_interval.tick() => {
                app.clear_expired_toast();
            }

            Ok(()) = route_rx.changed() => {
                let route = *route_rx.borrow_and_update();
                app.enter_route(route).await;
                feed_rx = app.feed_updates();
            }

            event = session_rx.recv() => {
                match event {
                    Ok(SessionEvent::Established) => app.on_session_established().await,
                    Ok(SessionEvent::Cleared) => app.on_session_cleared(),
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        tracing::warn!("Missed {} session events", n);
                    }
                    Err(broadcast::error::RecvError::Closed) => {}
                }
            }

            alive = feed_changed(&mut feed_rx) => {
                if !alive {
                    feed_rx = None;
                }
            }
        }

        if let Some(action) = pending {
            app.busy = Some(action.label());
            terminal
                .draw(|f| views::draw(f, app))
                .context("Failed to draw terminal")?;
            app.perform(action).await;
            app.busy = None;
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

/// Handle keyboard input
/// Layered dispatch: Ctrl-C → Form → Global → Route-specific
pub(crate) fn handle_key_event(app: &mut App, key_event: KeyEvent) -> Option<Action> {
    if key_event.kind != KeyEventKind::Press {
        return None;
    }

    // Layer 0: Ctrl-C always quits, even mid-form
    if key_event.code == KeyCode::Char('c') && key_event.modifiers.contains(KeyModifiers::CONTROL)
    {
        app.should_quit = true;
        return None;
    }

    // Layer 1: an open form captures all input
    if app.is_typing() {
        return handle_form_keys(app, key_event);
    }

    // Layer 2: global keys
    if handle_global_keys(app, &key_event) {
        return None;
    }
    if let Some(action) = global_action(&key_event) {
        return Some(action);
    }

    // Layer 3: route-specific keys
    match app.screen {
        Some(Screen::NewsTasks(_)) => handle_news_keys(app, key_event.code),
        Some(Screen::CryptoTasks(_)) => handle_crypto_keys(app, key_event.code),
        Some(Screen::Sources(_)) => handle_sources_keys(app, key_event.code),
        Some(Screen::LiveResults) => {
            handle_feed_keys(app, key_event.code);
            None
        }
        Some(Screen::Events(_)) => handle_events_keys(app, key_event.code),
        Some(Screen::Settings(_)) => handle_settings_keys(app, key_event.code),
        Some(Screen::Login(_)) | None => None,
    }
}

/// Handle global keys - returns true if handled
fn handle_global_keys(app: &mut App, key_event: &KeyEvent) -> bool {
    match key_event.code {
        KeyCode::Char('q') | KeyCode::Char('Q') => {
            app.should_quit = true;
            true
        }
        KeyCode::Char('t') => {
            app.next_theme();
            true
        }
        KeyCode::Char('L') => {
            app.toggle_logs();
            true
        }
        // Direct navigation: 1..=5 or F1..=F5 follow the side nav order
        KeyCode::Char(c @ '1'..='5') => {
            navigate_nav(app, c as usize - '1' as usize);
            true
        }
        KeyCode::F(n @ 1..=5) => {
            navigate_nav(app, n as usize - 1);
            true
        }
        _ => false,
    }
}

fn global_action(key_event: &KeyEvent) -> Option<Action> {
    match key_event.code {
        KeyCode::Char('O') => Some(Action::Logout),
        KeyCode::Char('r') => Some(Action::Reload),
        _ => None,
    }
}

fn navigate_nav(app: &mut App, index: usize) {
    if app.route == Some(Route::Login) {
        return;
    }
    if let Some(route) = Route::nav_items().get(index) {
        app.router.navigate(*route);
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Forms
// ─────────────────────────────────────────────────────────────────────────────

/// What a key did to a form
enum FormKey {
    Edited,
    Submit,
    Cancel,
}

fn edit_form(form: &mut Form, key: KeyCode) -> FormKey {
    match key {
        KeyCode::Enter => return FormKey::Submit,
        KeyCode::Esc => return FormKey::Cancel,
        KeyCode::Tab | KeyCode::Down => form.next_field(),
        KeyCode::BackTab | KeyCode::Up => form.prev_field(),
        KeyCode::Left => form.cycle_choice(false),
        KeyCode::Right => form.cycle_choice(true),
        KeyCode::Backspace => form.backspace(),
        KeyCode::Char(c) => form.insert_char(c),
        _ => {}
    }
    FormKey::Edited
}

fn handle_form_keys(app: &mut App, key_event: KeyEvent) -> Option<Action> {
    let key = key_event.code;
    match &mut app.screen {
        Some(Screen::Login(view)) => match edit_form(&mut view.form, key) {
            FormKey::Submit => Some(Action::Login),
            FormKey::Cancel | FormKey::Edited => None,
        },
        Some(Screen::NewsTasks(view)) => {
            if let Some(edit) = &mut view.editing {
                match edit_form(&mut edit.form, key) {
                    FormKey::Submit => return Some(Action::SaveEdit),
                    FormKey::Cancel => view.cancel_edit(),
                    FormKey::Edited => {}
                }
            } else if let Some(form) = &mut view.create {
                match edit_form(form, key) {
                    FormKey::Submit => return Some(Action::SubmitCreate),
                    FormKey::Cancel => view.close_create(),
                    FormKey::Edited => {}
                }
            }
            None
        }
        Some(Screen::CryptoTasks(view)) => {
            if let Some(edit) = &mut view.editing {
                match edit_form(&mut edit.form, key) {
                    FormKey::Submit => return Some(Action::SaveEdit),
                    FormKey::Cancel => view.cancel_edit(),
                    FormKey::Edited => {}
                }
            } else if let Some(form) = &mut view.create {
                match edit_form(form, key) {
                    FormKey::Submit => return Some(Action::SubmitCreate),
                    FormKey::Cancel => view.close_create(),
                    FormKey::Edited => {}
                }
            }
            None
        }
        Some(Screen::Sources(view)) => match edit_form(&mut view.add_form, key) {
            FormKey::Submit => Some(Action::AddSource),
            FormKey::Cancel => {
                app.form_focus = false;
                None
            }
            FormKey::Edited => None,
        },
        Some(Screen::Settings(view)) => {
            let form = match view.section {
                SettingsSection::Prompt => &mut view.prompt_form,
                SettingsSection::Examples => &mut view.example_form,
                SettingsSection::Api => &mut view.api_form,
            };
            match edit_form(form, key) {
                FormKey::Submit => match view.section {
                    SettingsSection::Prompt => Some(Action::SavePrompt),
                    SettingsSection::Api => Some(Action::SaveApiSettings),
                    SettingsSection::Examples => {
                        if view.add_example() {
                            app.form_focus = false;
                        }
                        None
                    }
                },
                FormKey::Cancel => {
                    app.form_focus = false;
                    None
                }
                FormKey::Edited => None,
            }
        }
        _ => None,
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Route keys
// ─────────────────────────────────────────────────────────────────────────────

fn handle_news_keys(app: &mut App, key: KeyCode) -> Option<Action> {
    let Some(Screen::NewsTasks(view)) = &mut app.screen else {
        return None;
    };
    match key {
        KeyCode::Down | KeyCode::Char('j') => view.select_next(),
        KeyCode::Up | KeyCode::Char('k') => view.select_prev(),
        KeyCode::Char('n') => view.open_create(),
        KeyCode::Char('e') | KeyCode::Enter => view.start_edit(),
        KeyCode::Char(' ') => return Some(Action::ToggleActive),
        KeyCode::Char('d') | KeyCode::Delete => return Some(Action::DeleteSelected),
        KeyCode::Char('c') => return Some(Action::CheckRelevant),
        KeyCode::Char('s') => {
            if let Some(task) = view.selected_task() {
                app.router.navigate(Route::Sources { task_id: task.id });
            }
        }
        _ => {}
    }
    None
}

fn handle_crypto_keys(app: &mut App, key: KeyCode) -> Option<Action> {
    let Some(Screen::CryptoTasks(view)) = &mut app.screen else {
        return None;
    };
    match key {
        KeyCode::Down | KeyCode::Char('j') => view.select_next(),
        KeyCode::Up | KeyCode::Char('k') => view.select_prev(),
        KeyCode::Char('n') => view.open_create(),
        KeyCode::Char('e') | KeyCode::Enter => view.start_edit(),
        KeyCode::Char(' ') => return Some(Action::ToggleActive),
        KeyCode::Char('d') | KeyCode::Delete => return Some(Action::DeleteSelected),
        _ => {}
    }
    None
}

fn handle_sources_keys(app: &mut App, key: KeyCode) -> Option<Action> {
    let Some(Screen::Sources(view)) = &mut app.screen else {
        return None;
    };
    match key {
        KeyCode::Down | KeyCode::Char('j') => view.select_next(),
        KeyCode::Up | KeyCode::Char('k') => view.select_prev(),
        KeyCode::Tab | KeyCode::Left | KeyCode::Right => view.switch_list(),
        KeyCode::Char('a') | KeyCode::Char('n') => app.form_focus = true,
        KeyCode::Char('d') | KeyCode::Delete => return Some(Action::RemoveSource),
        KeyCode::Esc => app.router.navigate(Route::NewsTasks),
        _ => {}
    }
    None
}

fn handle_feed_keys(app: &mut App, key: KeyCode) {
    let len = app.feed.as_ref().map(|f| f.len()).unwrap_or(0);
    match key {
        KeyCode::Down | KeyCode::Char('j') => {
            if app.feed_selected + 1 < len {
                app.feed_selected += 1;
            }
        }
        KeyCode::Up | KeyCode::Char('k') => {
            app.feed_selected = app.feed_selected.saturating_sub(1);
        }
        KeyCode::Home | KeyCode::Char('g') => app.feed_selected = 0,
        KeyCode::Char('y') => app.copy_feed_link(),
        _ => {}
    }
}

fn handle_events_keys(app: &mut App, key: KeyCode) -> Option<Action> {
    let Some(Screen::Events(view)) = &mut app.screen else {
        return None;
    };
    match key {
        KeyCode::Down | KeyCode::Char('j') => view.select_next(),
        KeyCode::Up | KeyCode::Char('k') => view.select_prev(),
        KeyCode::Char('f') => return Some(Action::RefreshEvents),
        KeyCode::Char(' ') | KeyCode::Char('p') => return Some(Action::TogglePause),
        KeyCode::Char('d') | KeyCode::Delete => return Some(Action::DeleteSelected),
        _ => {}
    }
    None
}

fn handle_settings_keys(app: &mut App, key: KeyCode) -> Option<Action> {
    let Some(Screen::Settings(view)) = &mut app.screen else {
        return None;
    };
    match key {
        KeyCode::Tab => view.next_section(),
        KeyCode::Char('e') | KeyCode::Enter | KeyCode::Char('a') => app.form_focus = true,
        KeyCode::Char('s') => {
            return Some(match view.section {
                SettingsSection::Api => Action::SaveApiSettings,
                _ => Action::SavePrompt,
            })
        }
        KeyCode::Char('x') => return Some(Action::ResetPrompt),
        KeyCode::Down | KeyCode::Char('j') if view.section == SettingsSection::Examples => {
            view.select_next_example()
        }
        KeyCode::Up | KeyCode::Char('k') if view.section == SettingsSection::Examples => {
            view.select_prev_example()
        }
        KeyCode::Char('d') if view.section == SettingsSection::Examples => {
            view.remove_selected_example();
        }
        _ => {}
    }
    None
}
