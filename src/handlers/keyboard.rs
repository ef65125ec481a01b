use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::app::{App, DialogMode, SidebarTab};
use crate::markers::Layer;
use crate::models::RequestAction;
use crate::ui::help_content_height;

pub enum KeyAction {
    Continue,
    Quit,
}

pub async fn handle_key_event(app: &mut App, key: KeyEvent) -> KeyAction {
    // Ctrl+C always quits
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return KeyAction::Quit;
    }

    // Handle dialogs first (highest priority)
    if app.is_dialog_open() {
        return handle_dialog_input(app, key).await;
    }

    // Help panel - any key dismisses it (except j/k for scrolling)
    if app.show_help {
        match key.code {
            KeyCode::Char('j') => {
                let max_scroll = help_content_height().saturating_sub(20);
                if app.help.scroll_offset < max_scroll {
                    app.help.scroll_offset += 1;
                }
            }
            KeyCode::Char('k') => {
                app.help.scroll_offset = app.help.scroll_offset.saturating_sub(1);
            }
            _ => {
                app.show_help = false;
                app.help.scroll_offset = 0;
            }
        }
        return KeyAction::Continue;
    }

    if !app.api.is_authenticated() {
        return handle_signed_out(app, key);
    }

    handle_normal_mode(app, key).await
}

async fn handle_dialog_input(app: &mut App, key: KeyEvent) -> KeyAction {
    match app.dialog.mode {
        DialogMode::None => {}

        DialogMode::ConfirmAlert | DialogMode::ConfirmDanger => match key.code {
            KeyCode::Enter | KeyCode::Char('y') | KeyCode::Char('Y') => {
                app.submit_dialog().await;
            }
            KeyCode::Esc | KeyCode::Char('n') | KeyCode::Char('N') => {
                app.close_dialog();
            }
            _ => {}
        },

        DialogMode::Login | DialogMode::Register | DialogMode::AddFriend | DialogMode::AddLocation => {
            match key.code {
                KeyCode::Enter => {
                    app.submit_dialog().await;
                }
                KeyCode::Esc => {
                    app.close_dialog();
                }
                KeyCode::Char('r') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                    app.dialog.toggle_auth_mode();
                }
                KeyCode::Tab | KeyCode::Down => app.dialog.next_field(),
                KeyCode::BackTab | KeyCode::Up => app.dialog.prev_field(),
                KeyCode::Left | KeyCode::Right if app.dialog.mode == DialogMode::AddLocation => {
                    app.dialog.location_kind = app.dialog.location_kind.next();
                }
                KeyCode::Backspace => {
                    app.dialog.pop_char();
                }
                KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                    app.dialog.push_char(c);
                }
                _ => {}
            }
        }
    }

    KeyAction::Continue
}

fn handle_signed_out(app: &mut App, key: KeyEvent) -> KeyAction {
    match key.code {
        KeyCode::Char('q') => return KeyAction::Quit,
        KeyCode::Char('L') | KeyCode::Enter => app.open_dialog(DialogMode::Login),
        KeyCode::Char('?') => app.show_help = true,
        _ => {}
    }
    KeyAction::Continue
}

async fn handle_normal_mode(app: &mut App, key: KeyEvent) -> KeyAction {
    match key.code {
        KeyCode::Char('q') => return KeyAction::Quit,
        KeyCode::Char('?') => app.show_help = true,

        // Sidebar navigation
        KeyCode::Char('j') | KeyCode::Down => {
            let len = app.tab_len(app.sidebar.tab);
            app.sidebar.move_down(len);
            app.clear_map_selection();
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.sidebar.move_up();
            app.clear_map_selection();
        }
        KeyCode::Tab | KeyCode::Char('l') => {
            let next = app.sidebar.tab.next();
            switch_tab(app, next);
        }
        KeyCode::BackTab | KeyCode::Char('h') => {
            let prev = app.sidebar.tab.prev();
            switch_tab(app, prev);
        }
        KeyCode::Enter => app.focus_selected().await,

        // Map
        KeyCode::Char('+') | KeyCode::Char('=') => app.zoom_in(),
        KeyCode::Char('-') => app.zoom_out(),
        KeyCode::Char('1') => app.toggle_layer(Layer::Friends),
        KeyCode::Char('2') => app.toggle_layer(Layer::Locations),
        KeyCode::Char('3') => app.toggle_layer(Layer::Weather),
        KeyCode::Char('4') => app.toggle_layer(Layer::Disasters),
        KeyCode::Char('w') => {
            app.refresh_weather().await;
            app.refresh_disasters().await;
        }
        KeyCode::Char('c') => app.focus_self().await,
        KeyCode::Char('m') => app.cycle_map_selection(),
        KeyCode::Esc => app.clear_map_selection(),
        KeyCode::Char('p') => {
            app.share_position().await;
        }

        // Friends and places
        KeyCode::Char('a') => app.open_dialog(DialogMode::AddFriend),
        KeyCode::Char('y') => app.respond_to_selected_request(RequestAction::Accept).await,
        KeyCode::Char('x') => app.respond_to_selected_request(RequestAction::Reject).await,
        KeyCode::Char('n') => app.open_add_location(),

        // Safety
        KeyCode::Char('s') => {
            app.mark_safe().await;
        }
        KeyCode::Char('!') => app.open_dialog(DialogMode::ConfirmAlert),
        KeyCode::Char('D') => app.open_dialog(DialogMode::ConfirmDanger),

        // Session
        KeyCode::Char('r') => {
            let report = app.run_refresh_cycle().await;
            if report.is_clean() {
                app.notifications.info("Data refreshed");
            } else if app.api.is_authenticated() {
                let failed: Vec<String> = report.failures().map(|(c, _)| c.to_string()).collect();
                app.notifications.error(format!("Could not refresh {}", failed.join(", ")));
            }
        }
        KeyCode::Char('o') => app.logout().await,

        _ => {}
    }

    KeyAction::Continue
}

fn switch_tab(app: &mut App, tab: SidebarTab) {
    app.sidebar.tab = tab;
    app.clear_map_selection();
    let len = app.tab_len(tab);
    app.sidebar.clamp(tab, len);
}
