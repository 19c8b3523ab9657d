use crate::app::{App, MenuItem};
use crate::state::messages::NetworkRequest;
use chrono::Local;
use crossterm::event::KeyCode::Char;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};

pub async fn handle_key_bindings(
    key_event: KeyEvent,
    app: &Arc<Mutex<App>>,
    network_requests: &mpsc::Sender<NetworkRequest>,
) {
    let mut guard = app.lock().await;
    let mut request = None;

    match (guard.state.active_tab, key_event.code, key_event.modifiers) {
        // Quit
        (_, Char('q'), _) | (_, Char('c'), KeyModifiers::CONTROL) => {
            crate::cleanup_terminal();
            std::process::exit(0);
        }

        // Page switching
        (_, Char('1'), _) => guard.update_tab(MenuItem::Overlay),
        (_, Char('2'), _) => guard.update_tab(MenuItem::Standby),
        (_, Char('3'), _) => guard.update_tab(MenuItem::Teams),
        (_, Char('4'), _) => guard.update_tab(MenuItem::Rankings),
        (_, Char('5'), _) => guard.update_tab(MenuItem::Admin),
        (_, Char('?'), _) => guard.update_tab(MenuItem::Help),
        (MenuItem::Help, KeyCode::Esc, _) => guard.exit_help(),

        // Standby countdown
        (MenuItem::Standby, Char('j') | KeyCode::Down, _) => guard.countdown_next_slot(),
        (MenuItem::Standby, Char('k') | KeyCode::Up, _) => guard.countdown_prev_slot(),
        (MenuItem::Standby, KeyCode::Enter, _) => {
            guard.countdown_confirm(Local::now().naive_local())
        }
        (MenuItem::Standby, Char('c'), _) => guard.countdown_change_time(),

        // Teams
        (MenuItem::Teams, Char('j') | KeyCode::Down, _) => guard.teams_scroll_down(),
        (MenuItem::Teams, Char('k') | KeyCode::Up, _) => guard.teams_scroll_up(),

        // Admin dashboard
        (MenuItem::Admin, Char('j') | KeyCode::Down, _) => guard.admin_move_down(),
        (MenuItem::Admin, Char('k') | KeyCode::Up, _) => guard.admin_move_up(),
        (MenuItem::Admin, KeyCode::Tab | Char('h') | Char('l'), _) => guard.admin_switch_focus(),
        (MenuItem::Admin, KeyCode::Enter | Char(' '), _) => {
            request = guard
                .admin_toggle_selected()
                .map(|patch| NetworkRequest::UpdateStreamControl { patch });
        }
        (MenuItem::Admin, Char('x'), _) => {
            request = guard
                .admin_clear_stream()
                .map(|patch| NetworkRequest::UpdateStreamControl { patch });
        }
        (MenuItem::Admin, Char('r'), _) => request = Some(NetworkRequest::RefreshTournament),

        // Global
        (_, Char('f'), _) => guard.toggle_full_screen(),
        (_, Char('"'), _) => guard.toggle_show_logs(),

        _ => {}
    }

    if let Some(request) = request {
        drop(guard);
        let _ = network_requests.send(request).await;
    }
}
