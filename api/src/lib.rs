pub mod client;
pub mod control;
pub mod firestore;
pub mod listener;
pub mod normalize;
pub mod source;
pub mod wire;

use chrono::{DateTime, Utc};
use std::collections::BTreeSet;

// ---------------------------------------------------------------------------
// Domain types, independent of the wire shape of the document
// ---------------------------------------------------------------------------

/// One normalized view of `streaming/<tournament-id>`.
///
/// Built fresh for every update of the backing document. Every field is
/// populated: missing data shows up as the documented default, never as a
/// partially built value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TournamentSnapshot {
    pub id: String,
    pub name: String,
    pub status: TournamentStatus,
    pub current_round: String,
    pub teams: Vec<Team>,
    pub rounds: Vec<Round>,
    pub streaming_mode: StreamingMode,
    /// Epoch 0 when the document carries no usable value.
    pub last_web_update: DateTime<Utc>,
    pub pushed_at: DateTime<Utc>,
    pub pushed_by: String,
}

impl TournamentSnapshot {
    pub fn team_by_id(&self, team_id: &str) -> Option<&Team> {
        self.teams.iter().find(|t| t.id == team_id)
    }

    /// The round named by `current_round`, if the document has one.
    pub fn active_round(&self) -> Option<&Round> {
        if self.current_round.is_empty() {
            return None;
        }
        self.rounds.iter().find(|r| r.round_name == self.current_round)
    }

    /// Every match across all rounds, in round order.
    pub fn all_matches(&self) -> impl Iterator<Item = &Match> {
        self.rounds.iter().flat_map(|r| r.matches.iter())
    }

    pub fn find_match(&self, match_id: &str) -> Option<&Match> {
        self.all_matches().find(|m| m.match_id == match_id)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TournamentStatus {
    #[default]
    Setup,
    Live,
    Completed,
}

impl TournamentStatus {
    /// Unknown values fall back to `Setup`.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "live" => TournamentStatus::Live,
            "completed" => TournamentStatus::Completed,
            _ => TournamentStatus::Setup,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TournamentStatus::Setup => "SETUP",
            TournamentStatus::Live => "LIVE",
            TournamentStatus::Completed => "COMPLETED",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StreamingMode {
    #[default]
    Normal,
    Streaming,
    Manual,
}

impl StreamingMode {
    /// Unknown values fall back to `Normal`.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "streaming" => StreamingMode::Streaming,
            "manual" => StreamingMode::Manual,
            _ => StreamingMode::Normal,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            StreamingMode::Normal => "normal",
            StreamingMode::Streaming => "streaming",
            StreamingMode::Manual => "manual",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Team {
    pub id: String,
    pub name: String,
    pub manager: String,
    pub captain: String,
    pub players: Vec<Player>,
    pub color: String,
    pub icon: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Player {
    pub id: String,
    pub name: String,
    pub captain: bool,
}

/// Well-known round keys written by the scoring app.
pub const SEMI_FINAL_1: &str = "semiFinal1";
pub const SEMI_FINAL_2: &str = "semiFinal2";
pub const FINAL: &str = "final";

pub const DEFAULT_WINS_NEEDED: u32 = 5;

#[derive(Debug, Clone, PartialEq)]
pub struct Round {
    pub round_name: String,
    pub is_completed: bool,
    pub winner_team_id: Option<String>,
    pub matches: Vec<Match>,
    pub team1_wins: u32,
    pub team2_wins: u32,
    pub wins_needed: u32,
}

impl Default for Round {
    fn default() -> Self {
        Self {
            round_name: String::new(),
            is_completed: false,
            winner_team_id: None,
            matches: Vec::new(),
            team1_wins: 0,
            team2_wins: 0,
            wins_needed: DEFAULT_WINS_NEEDED,
        }
    }
}

impl Round {
    /// Display label for the well-known round keys; other keys pass through.
    pub fn label(&self) -> String {
        match self.round_name.as_str() {
            SEMI_FINAL_1 => "Semi-Final 1".to_string(),
            SEMI_FINAL_2 => "Semi-Final 2".to_string(),
            FINAL => "Final".to_string(),
            other => other.to_string(),
        }
    }

    /// True once either side has reached `wins_needed` or the round is flagged complete.
    pub fn is_decided(&self) -> bool {
        self.is_completed
            || (self.wins_needed > 0
                && (self.team1_wins >= self.wins_needed || self.team2_wins >= self.wins_needed))
    }

    /// The two teams contesting this round, taken from its first match.
    pub fn sides(&self) -> Option<(&MatchSide, &MatchSide)> {
        self.matches.first().map(|m| (&m.team1, &m.team2))
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Match {
    pub match_id: String,
    pub round_name: String,
    pub match_number: u32,
    pub team1: MatchSide,
    pub team2: MatchSide,
    pub is_completed: bool,
    pub winner_id: Option<String>,
    pub race_to_score: u32,
    pub last_updated: DateTime<Utc>,
}

impl Match {
    /// A match is live once a rack has been scored and no winner is recorded.
    pub fn is_live(&self) -> bool {
        !self.is_completed && (self.team1.score > 0 || self.team2.score > 0)
    }

    pub fn winner(&self) -> Option<&MatchSide> {
        let winner_id = self.winner_id.as_deref()?;
        [&self.team1, &self.team2]
            .into_iter()
            .find(|side| side.id == winner_id)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MatchSide {
    pub id: String,
    pub name: String,
    pub score: u32,
    pub color: String,
    pub icon: String,
}

/// Placeholder the scoring app writes before a team is assigned.
pub const UNKNOWN_TEAM: &str = "Unknown Team";

impl MatchSide {
    pub fn is_placeholder(&self) -> bool {
        self.id.trim().is_empty() || self.name.trim().is_empty() || self.name == UNKNOWN_TEAM
    }
}

/// Contents of `streaming/current_stream_control`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StreamControl {
    /// Match ids selected for the overlay, in display order.
    pub stream_matches: Vec<String>,
    pub hidden_sections: BTreeSet<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_and_mode_fall_back_on_unknown_values() {
        assert_eq!(TournamentStatus::parse("LIVE"), TournamentStatus::Live);
        assert_eq!(TournamentStatus::parse("paused"), TournamentStatus::Setup);
        assert_eq!(StreamingMode::parse("manual"), StreamingMode::Manual);
        assert_eq!(StreamingMode::parse(""), StreamingMode::Normal);
    }

    #[test]
    fn round_is_decided_when_a_side_reaches_wins_needed() {
        let mut round = Round { team1_wins: 4, team2_wins: 2, ..Default::default() };
        assert!(!round.is_decided());
        round.team1_wins = 5;
        assert!(round.is_decided());
    }

    #[test]
    fn match_winner_resolves_by_side_id() {
        let m = Match {
            team1: MatchSide { id: "t1".into(), name: "Sharks".into(), ..Default::default() },
            team2: MatchSide { id: "t2".into(), name: "Cues".into(), ..Default::default() },
            winner_id: Some("t2".into()),
            is_completed: true,
            ..Default::default()
        };
        assert_eq!(m.winner().map(|s| s.name.as_str()), Some("Cues"));
        assert!(!m.is_live());
    }

    #[test]
    fn placeholder_side_detection() {
        let side = MatchSide { id: "t1".into(), name: UNKNOWN_TEAM.into(), ..Default::default() };
        assert!(side.is_placeholder());
        let side = MatchSide { id: "t1".into(), name: "Breakers".into(), ..Default::default() };
        assert!(!side.is_placeholder());
    }
}
