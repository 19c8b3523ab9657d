use crate::app::MenuItem;
use crate::state::countdown::Countdown;
use chrono::{DateTime, Local};
use poolcast_api::{StreamControl, TournamentSnapshot};

// ---------------------------------------------------------------------------
// Tournament feed
// ---------------------------------------------------------------------------

/// Latest delivery of the tournament subscription.
#[derive(Debug, Default)]
pub enum TournamentFeed {
    /// Nothing received yet.
    #[default]
    Waiting,
    /// The document is missing or could not be read.
    Unavailable,
    Ready(TournamentSnapshot),
}

impl TournamentFeed {
    pub fn snapshot(&self) -> Option<&TournamentSnapshot> {
        match self {
            TournamentFeed::Ready(snapshot) => Some(snapshot),
            _ => None,
        }
    }

    pub fn waiting_message(&self) -> &'static str {
        match self {
            TournamentFeed::Waiting => "Connecting to the scoring feed...",
            TournamentFeed::Unavailable => "Waiting for tournament data...",
            TournamentFeed::Ready(_) => "",
        }
    }
}

impl From<Option<TournamentSnapshot>> for TournamentFeed {
    fn from(snapshot: Option<TournamentSnapshot>) -> Self {
        snapshot.map_or(TournamentFeed::Unavailable, TournamentFeed::Ready)
    }
}

// ---------------------------------------------------------------------------
// Admin dashboard
// ---------------------------------------------------------------------------

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum AdminFocus {
    #[default]
    Matches,
    Sections,
}

#[derive(Debug, Default)]
pub struct AdminState {
    pub focus: AdminFocus,
    pub selected_match: usize,
    pub selected_section: usize,
    pub last_refresh: Option<DateTime<Local>>,
    pub status_message: Option<String>,
}

impl AdminState {
    pub fn move_down(&mut self, match_count: usize, section_count: usize) {
        match self.focus {
            AdminFocus::Matches => {
                if self.selected_match + 1 < match_count {
                    self.selected_match += 1;
                }
            }
            AdminFocus::Sections => {
                if self.selected_section + 1 < section_count {
                    self.selected_section += 1;
                }
            }
        }
    }

    pub fn move_up(&mut self) {
        match self.focus {
            AdminFocus::Matches => self.selected_match = self.selected_match.saturating_sub(1),
            AdminFocus::Sections => self.selected_section = self.selected_section.saturating_sub(1),
        }
    }

    pub fn switch_focus(&mut self) {
        self.focus = match self.focus {
            AdminFocus::Matches => AdminFocus::Sections,
            AdminFocus::Sections => AdminFocus::Matches,
        };
    }

    /// Keep the match cursor inside a list that may have shrunk.
    pub fn clamp(&mut self, match_count: usize) {
        self.selected_match = self.selected_match.min(match_count.saturating_sub(1));
    }
}

// ---------------------------------------------------------------------------
// Root app state
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct AppState {
    pub active_tab: MenuItem,
    pub previous_tab: MenuItem,
    pub show_logs: bool,
    pub last_error: Option<String>,
    pub tournament: TournamentFeed,
    /// What the admin toggles and the overlay work from.
    pub control: StreamControl,
    /// Last value the subscription delivered.
    pub stored_control: StreamControl,
    pub countdown: Countdown,
    pub admin: AdminState,
    pub teams_scroll: u16,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feed_from_delivery() {
        assert!(matches!(TournamentFeed::from(None), TournamentFeed::Unavailable));
        let feed = TournamentFeed::from(Some(TournamentSnapshot::default()));
        assert!(feed.snapshot().is_some());
    }

    #[test]
    fn admin_cursor_stays_in_bounds() {
        let mut admin = AdminState::default();
        admin.move_up();
        assert_eq!(admin.selected_match, 0);
        admin.move_down(2, 6);
        admin.move_down(2, 6);
        assert_eq!(admin.selected_match, 1);

        admin.switch_focus();
        admin.move_down(2, 6);
        assert_eq!(admin.selected_section, 1);
        assert_eq!(admin.selected_match, 1);

        admin.clamp(0);
        assert_eq!(admin.selected_match, 0);
    }
}
