use crate::wire::{
    RawCount, RawDocument, RawMatch, RawMatchSide, RawPlayer, RawRound, RawRounds, RawTeam,
    RawText, RawTimestamp,
};
use crate::{
    DEFAULT_WINS_NEEDED, FINAL, Match, MatchSide, Player, Round, SEMI_FINAL_1, SEMI_FINAL_2,
    StreamingMode, Team, TournamentSnapshot, TournamentStatus, UNKNOWN_TEAM,
};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use log::{debug, trace};
use serde_json::Value;

/// Name the scoring app writes into empty roster slots.
const PLACEHOLDER_PLAYER: &str = "Player";

/// Sort weight of rounds whose key is not one of the known rounds.
const UNKNOWN_ROUND_PRIORITY: u32 = 999;

/// The value timestamps degrade to.
pub fn epoch() -> DateTime<Utc> {
    DateTime::<Utc>::default()
}

// ---------------------------------------------------------------------------
// Document → snapshot
// ---------------------------------------------------------------------------

/// Normalize one tournament document.
///
/// `None` means the document does not exist. Any existing document, however
/// malformed, produces a complete snapshot: each field is taken from the top
/// level, then from `overview`, then from its default.
pub fn normalize_document(doc_id: &str, raw: Option<&Value>) -> Option<TournamentSnapshot> {
    let Some(raw) = raw else {
        debug!("streaming/{doc_id}: document absent");
        return None;
    };

    let RawDocument { top, overview } = RawDocument::parse(raw);

    let rounds = ordered_rounds(top.rounds.or(overview.rounds));
    let teams = resolve_teams(top.teams, overview.teams, &rounds);

    let snapshot = TournamentSnapshot {
        id: text_or(top.id, overview.id, doc_id),
        name: text_or(top.name, overview.name, ""),
        status: first_text(top.status, overview.status)
            .map(|s| TournamentStatus::parse(&s))
            .unwrap_or_default(),
        current_round: text_or(top.current_round, overview.current_round, ""),
        streaming_mode: first_text(top.streaming_mode, overview.streaming_mode)
            .map(|s| StreamingMode::parse(&s))
            .unwrap_or_default(),
        last_web_update: normalize_timestamp(top.last_web_update.or(overview.last_web_update).as_ref()),
        pushed_at: normalize_timestamp(top.pushed_at.or(overview.pushed_at).as_ref()),
        pushed_by: text_or(top.pushed_by, overview.pushed_by, ""),
        rounds: rounds.iter().map(build_round).collect(),
        teams,
    };

    debug!(
        "streaming/{doc_id}: {} rounds, {} teams, status {}",
        snapshot.rounds.len(),
        snapshot.teams.len(),
        snapshot.status.label()
    );
    Some(snapshot)
}

/// First non-empty text of the two scopes.
fn first_text(top: Option<RawText>, overview: Option<RawText>) -> Option<String> {
    [top, overview]
        .into_iter()
        .flatten()
        .map(RawText::into_string)
        .find(|s| !s.is_empty())
}

fn text_or(top: Option<RawText>, overview: Option<RawText>, default: &str) -> String {
    first_text(top, overview).unwrap_or_else(|| default.to_string())
}

fn text(raw: Option<RawText>) -> String {
    raw.map(RawText::into_string).unwrap_or_default()
}

fn non_empty(raw: Option<RawText>) -> Option<String> {
    raw.map(RawText::into_string).filter(|s| !s.trim().is_empty())
}

fn count(raw: Option<&RawCount>) -> u32 {
    raw.map(RawCount::to_u32).unwrap_or(0)
}

// ---------------------------------------------------------------------------
// Rounds
// ---------------------------------------------------------------------------

/// A round with its resolved name and decoded matches, in display order.
struct OrderedRound {
    name: String,
    raw: RawRound,
    matches: Vec<RawMatch>,
}

/// Sort weight of a round key: semi-finals first, the final after, the rest last.
pub fn round_priority(round_name: &str) -> u32 {
    match round_name {
        SEMI_FINAL_1 => 1,
        SEMI_FINAL_2 => 2,
        FINAL => 3,
        _ => UNKNOWN_ROUND_PRIORITY,
    }
}

fn ordered_rounds(raw: Option<RawRounds>) -> Vec<OrderedRound> {
    let Some(raw) = raw else {
        trace!("no rounds in document");
        return Vec::new();
    };

    match raw {
        // Lists are already ordered by the app.
        RawRounds::List(items) => items
            .iter()
            .map(|value| {
                let mut round = RawRound::from_value(value);
                let name = text(round.round_name.take());
                into_ordered(name, round)
            })
            .collect(),
        // Keyed maps carry no order of their own; the key is the round name.
        RawRounds::Keyed(map) => {
            let mut rounds: Vec<OrderedRound> = map
                .into_iter()
                .map(|(key, value)| into_ordered(key, RawRound::from_value(&value)))
                .collect();
            rounds.sort_by_key(|r| round_priority(&r.name));
            rounds
        }
    }
}

fn into_ordered(name: String, mut raw: RawRound) -> OrderedRound {
    let matches = raw
        .matches
        .take()
        .map(|m| m.into_matches())
        .unwrap_or_default();
    OrderedRound { name, raw, matches }
}

fn build_round(round: &OrderedRound) -> Round {
    let raw = &round.raw;
    Round {
        round_name: round.name.clone(),
        is_completed: raw.is_completed.unwrap_or(false),
        winner_team_id: non_empty(raw.winner_team_id.clone()),
        matches: round
            .matches
            .iter()
            .map(|m| build_match(&round.name, m))
            .collect(),
        team1_wins: count(raw.team1_wins.as_ref()),
        team2_wins: count(raw.team2_wins.as_ref()),
        wins_needed: raw
            .wins_needed
            .as_ref()
            .map(RawCount::to_u32)
            .unwrap_or(DEFAULT_WINS_NEEDED),
    }
}

fn build_match(round_name: &str, raw: &RawMatch) -> Match {
    Match {
        match_id: text(raw.match_id.clone()),
        round_name: non_empty(raw.round_name.clone()).unwrap_or_else(|| round_name.to_string()),
        match_number: count(raw.match_number.as_ref()),
        team1: raw.team1.as_ref().map(build_side).unwrap_or_default(),
        team2: raw.team2.as_ref().map(build_side).unwrap_or_default(),
        is_completed: raw.is_completed.unwrap_or(false),
        winner_id: non_empty(raw.winner_id.clone()),
        race_to_score: count(raw.race_to_score.as_ref()),
        last_updated: normalize_timestamp(raw.last_updated.as_ref()),
    }
}

fn build_side(raw: &RawMatchSide) -> MatchSide {
    MatchSide {
        id: text(raw.id.clone()),
        name: text(raw.name.clone()),
        score: count(raw.score.as_ref()),
        color: text(raw.color.clone()),
        icon: text(raw.icon.clone()),
    }
}

// ---------------------------------------------------------------------------
// Teams
// ---------------------------------------------------------------------------

/// Canonical list first, then `overview.teams`, then whatever the matches reveal.
fn resolve_teams(
    top: Option<Vec<RawTeam>>,
    overview: Option<Vec<RawTeam>>,
    rounds: &[OrderedRound],
) -> Vec<Team> {
    if let Some(teams) = top.filter(|t| !t.is_empty()) {
        return teams.into_iter().map(build_team).collect();
    }
    if let Some(teams) = overview.filter(|t| !t.is_empty()) {
        trace!("using overview.teams");
        return teams.into_iter().map(build_team).collect();
    }
    let teams = reconstruct_teams(rounds);
    debug!("no canonical team list, reconstructed {} teams from matches", teams.len());
    teams
}

fn build_team(raw: RawTeam) -> Team {
    let id = text(raw.id);
    let players = raw
        .players
        .unwrap_or_default()
        .into_iter()
        .enumerate()
        .map(|(index, player)| build_player(&id, index, player))
        .collect();
    Team {
        name: text(raw.name),
        manager: text(raw.manager),
        captain: text(raw.captain),
        players,
        color: text(raw.color),
        icon: text(raw.icon),
        id,
    }
}

/// Players without an id get the same synthesized id as reconstructed ones.
fn build_player(team_id: &str, index: usize, raw: RawPlayer) -> Player {
    match raw {
        RawPlayer::Name(name) => Player {
            id: synthesized_player_id(team_id, index),
            name,
            captain: false,
        },
        RawPlayer::Full(fields) => Player {
            id: non_empty(fields.id).unwrap_or_else(|| synthesized_player_id(team_id, index)),
            name: text(fields.name),
            captain: fields.captain.unwrap_or(false),
        },
    }
}

fn synthesized_player_id(team_id: &str, index: usize) -> String {
    format!("{team_id}_player_{index}")
}

/// Rebuild the team list from the sides embedded in matches.
///
/// A side counts when it has an id and a real name. The first occurrence of
/// an id wins; later matches never overwrite it.
fn reconstruct_teams(rounds: &[OrderedRound]) -> Vec<Team> {
    let mut teams: Vec<Team> = Vec::new();

    for side in rounds
        .iter()
        .flat_map(|r| r.matches.iter())
        .flat_map(|m| m.sides())
    {
        let Some(id) = non_empty(side.id.clone()) else {
            continue;
        };
        let name = text(side.name.clone());
        if name.trim().is_empty() || name == UNKNOWN_TEAM {
            continue;
        }
        if teams.iter().any(|t| t.id == id) {
            continue;
        }

        let players = side
            .player_names
            .as_ref()
            .map(|names| parse_player_names(&id, &names.joined()))
            .unwrap_or_default();
        trace!("reconstructed team {id} ({name}) with {} players", players.len());

        teams.push(Team {
            name,
            manager: String::new(),
            captain: String::new(),
            players,
            color: text(side.color.clone()),
            icon: text(side.icon.clone()),
            id,
        });
    }

    teams
}

/// Parse a comma-joined roster. Blank entries and the `"Player"` placeholder
/// are dropped; captaincy cannot be recovered from a name list.
pub fn parse_player_names(team_id: &str, joined: &str) -> Vec<Player> {
    joined
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty() && *name != PLACEHOLDER_PLAYER)
        .enumerate()
        .map(|(index, name)| Player {
            id: synthesized_player_id(team_id, index),
            name: name.to_string(),
            captain: false,
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Timestamps
// ---------------------------------------------------------------------------

/// Best-effort timestamp conversion. Anything unusable becomes epoch 0.
pub fn normalize_timestamp(raw: Option<&RawTimestamp>) -> DateTime<Utc> {
    let parsed = match raw {
        Some(RawTimestamp::Text(s)) => parse_time_text(s),
        Some(RawTimestamp::Millis(ms)) => from_millis(*ms),
        Some(RawTimestamp::Seconds(ts)) => DateTime::from_timestamp(ts.seconds, ts.nanoseconds),
        None => None,
    };
    parsed.unwrap_or_else(epoch)
}

fn parse_time_text(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.with_timezone(&Utc));
    }
    // Zone-less ISO text is read as UTC.
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(naive.and_utc());
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc());
    }
    s.parse::<f64>().ok().and_then(from_millis)
}

fn from_millis(ms: f64) -> Option<DateTime<Utc>> {
    if !ms.is_finite() {
        return None;
    }
    DateTime::from_timestamp_millis(ms as i64)
}
