use crate::state::app_settings::AppSettings;
use crate::state::app_state::{AdminFocus, AppState};
use chrono::{Local, NaiveDateTime};
use poolcast_api::control::{KNOWN_SECTIONS, StreamControlPatch};
use poolcast_api::{Match, StreamControl, TournamentSnapshot};

#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub enum MenuItem {
    #[default]
    Overlay,
    Standby,
    Teams,
    Rankings,
    Admin,
    Help,
}

impl MenuItem {
    /// Pages shown in the tab bar, in key order.
    pub const PAGES: [MenuItem; 5] = [
        MenuItem::Overlay,
        MenuItem::Standby,
        MenuItem::Teams,
        MenuItem::Rankings,
        MenuItem::Admin,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            MenuItem::Overlay => "Overlay",
            MenuItem::Standby => "Standby",
            MenuItem::Teams => "Teams",
            MenuItem::Rankings => "Rankings",
            MenuItem::Admin => "Admin",
            MenuItem::Help => "Help",
        }
    }

    pub fn needs_tournament(&self) -> bool {
        !matches!(self, MenuItem::Help)
    }

    pub fn needs_stream_control(&self) -> bool {
        matches!(self, MenuItem::Overlay | MenuItem::Admin)
    }
}

pub struct App {
    pub settings: AppSettings,
    pub state: AppState,
}

impl App {
    pub fn new(settings: AppSettings) -> Self {
        Self { state: AppState::new(), settings }
    }

    // -----------------------------------------------------------------------
    // Feed and network handlers, called from main_ui_loop
    // -----------------------------------------------------------------------

    pub fn on_tournament_update(&mut self, snapshot: Option<TournamentSnapshot>) {
        self.state.tournament = snapshot.into();
        let match_count = self.match_count();
        self.state.admin.clamp(match_count);
    }

    pub fn on_stream_control_update(&mut self, control: StreamControl) {
        self.state.stored_control = control.clone();
        self.state.control = control;
    }

    pub fn on_tournament_refreshed(&mut self, snapshot: Option<TournamentSnapshot>) {
        self.state.last_error = None;
        self.state.admin.last_refresh = Some(Local::now());
        self.state.admin.status_message = Some(match &snapshot {
            Some(s) => format!("refreshed {}", s.id),
            None => format!("{} does not exist", self.settings.tournament_id),
        });
        self.on_tournament_update(snapshot);
    }

    pub fn on_stream_control_saved(&mut self) {
        self.state.last_error = None;
        self.state.admin.status_message = Some("stream control saved".to_string());
    }

    /// Drop the optimistic toggles: the document still holds the last
    /// delivered value and the subscription will not resend it.
    pub fn on_stream_control_failed(&mut self, message: String) {
        self.state.control = self.state.stored_control.clone();
        self.on_error(message);
    }

    pub fn on_error(&mut self, message: String) {
        self.state.admin.status_message = None;
        self.state.last_error = Some(message);
    }

    // -----------------------------------------------------------------------
    // Tab management
    // -----------------------------------------------------------------------

    pub fn update_tab(&mut self, next: MenuItem) {
        if self.state.active_tab == next {
            return;
        }
        self.state.previous_tab = self.state.active_tab;
        self.state.active_tab = next;
        if next == MenuItem::Teams {
            self.state.teams_scroll = 0;
        }
    }

    pub fn exit_help(&mut self) {
        if self.state.active_tab == MenuItem::Help {
            self.state.active_tab = self.state.previous_tab;
        }
    }

    pub fn toggle_show_logs(&mut self) {
        self.state.show_logs = !self.state.show_logs;
    }

    pub fn toggle_full_screen(&mut self) {
        self.settings.full_screen = !self.settings.full_screen;
    }

    // -----------------------------------------------------------------------
    // Overlay
    // -----------------------------------------------------------------------

    /// Matches for the scoreboard: the streamed selection in its order, or
    /// the active round when nothing is selected.
    pub fn overlay_matches(&self) -> Vec<&Match> {
        let Some(snapshot) = self.state.tournament.snapshot() else {
            return Vec::new();
        };
        let streamed: Vec<&Match> = self
            .state
            .control
            .stream_matches
            .iter()
            .filter_map(|id| snapshot.find_match(id))
            .collect();
        if !streamed.is_empty() {
            return streamed;
        }
        snapshot
            .active_round()
            .map(|round| round.matches.iter().collect())
            .unwrap_or_default()
    }

    // -----------------------------------------------------------------------
    // Standby countdown
    // -----------------------------------------------------------------------

    pub fn countdown_next_slot(&mut self) {
        self.state.countdown.next_slot();
    }

    pub fn countdown_prev_slot(&mut self) {
        self.state.countdown.prev_slot();
    }

    pub fn countdown_confirm(&mut self, now: NaiveDateTime) {
        self.state.countdown.confirm(now);
    }

    pub fn countdown_change_time(&mut self) {
        self.state.countdown.change_time();
    }

    /// Returns true when the page needs a redraw.
    pub fn on_countdown_tick(&mut self, now: NaiveDateTime) -> bool {
        self.state.countdown.tick(now)
    }

    // -----------------------------------------------------------------------
    // Teams
    // -----------------------------------------------------------------------

    pub fn teams_scroll_down(&mut self) {
        let max = self
            .state
            .tournament
            .snapshot()
            .map_or(0, |s| s.teams.len().saturating_sub(1)) as u16;
        self.state.teams_scroll = (self.state.teams_scroll + 1).min(max);
    }

    pub fn teams_scroll_up(&mut self) {
        self.state.teams_scroll = self.state.teams_scroll.saturating_sub(1);
    }

    // -----------------------------------------------------------------------
    // Admin dashboard
    // -----------------------------------------------------------------------

    pub fn match_count(&self) -> usize {
        self.state
            .tournament
            .snapshot()
            .map_or(0, |s| s.all_matches().count())
    }

    pub fn admin_move_down(&mut self) {
        let match_count = self.match_count();
        self.state.admin.move_down(match_count, KNOWN_SECTIONS.len());
    }

    pub fn admin_move_up(&mut self) {
        self.state.admin.move_up();
    }

    pub fn admin_switch_focus(&mut self) {
        self.state.admin.switch_focus();
    }

    /// Flip the item under the cursor and return the write that persists it.
    /// The local control is updated right away; the subscription brings the
    /// stored value back on its next poll.
    pub fn admin_toggle_selected(&mut self) -> Option<StreamControlPatch> {
        match self.state.admin.focus {
            AdminFocus::Matches => {
                let match_id = self
                    .state
                    .tournament
                    .snapshot()?
                    .all_matches()
                    .nth(self.state.admin.selected_match)?
                    .match_id
                    .clone();
                if match_id.is_empty() {
                    return None;
                }
                self.state.control.toggle_match(&match_id);
                Some(StreamControlPatch::stream_matches(&self.state.control))
            }
            AdminFocus::Sections => {
                let section = KNOWN_SECTIONS.get(self.state.admin.selected_section)?;
                self.state.control.toggle_section(section);
                Some(StreamControlPatch::hidden_sections(&self.state.control))
            }
        }
    }

    /// Clear the stream selection so the overlay follows the active round.
    pub fn admin_clear_stream(&mut self) -> Option<StreamControlPatch> {
        if self.state.control.stream_matches.is_empty() {
            return None;
        }
        self.state.control.stream_matches.clear();
        Some(StreamControlPatch::stream_matches(&self.state.control))
    }
}
