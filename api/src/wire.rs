/// Raw shapes of the documents written by the scoring app.
///
/// The app is inconsistent: fields live at the top level or under `overview`,
/// rounds and matches arrive as lists or as keyed maps, numbers arrive as
/// strings and timestamps in three encodings. Everything here decodes
/// leniently: a field with the wrong shape is treated as absent instead of
/// failing the whole document. The mapping to domain types is in normalize.rs.
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Number, Value};

/// Decode a field, treating a shape mismatch as absent.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(T::deserialize(value).ok())
}

/// Decode a list field, dropping elements with the wrong shape.
fn lenient_list<'de, D, T>(deserializer: D) -> Result<Option<Vec<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let Value::Array(items) = Value::deserialize(deserializer)? else {
        return Ok(None);
    };
    Ok(Some(
        items
            .into_iter()
            .filter_map(|item| T::deserialize(item).ok())
            .collect(),
    ))
}

// ---------------------------------------------------------------------------
// Scalars
// ---------------------------------------------------------------------------

/// Identifier or label that may have been written as a number or flag.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawText {
    Text(String),
    Number(Number),
    Flag(bool),
}

impl RawText {
    pub fn into_string(self) -> String {
        match self {
            RawText::Text(s) => s,
            RawText::Number(n) => n.to_string(),
            RawText::Flag(b) => b.to_string(),
        }
    }
}

/// Counter that may have been written as a string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawCount {
    Number(f64),
    Text(String),
}

impl RawCount {
    /// Negative, fractional and unparsable counts clamp toward 0.
    pub fn to_u32(&self) -> u32 {
        let n = match self {
            RawCount::Number(n) => *n,
            RawCount::Text(s) => s.trim().parse::<f64>().unwrap_or(0.0),
        };
        if n.is_finite() && n > 0.0 { n as u32 } else { 0 }
    }
}

/// The three timestamp encodings found in the wild.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawTimestamp {
    /// ISO 8601 / RFC 3339 text, or epoch milliseconds as text.
    Text(String),
    /// Epoch milliseconds.
    Millis(f64),
    /// Server timestamp object: `{seconds, nanoseconds}` or `{_seconds, _nanoseconds}`.
    Seconds(RawSeconds),
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawSeconds {
    #[serde(alias = "_seconds")]
    pub seconds: i64,
    #[serde(alias = "_nanoseconds", default)]
    pub nanoseconds: u32,
}

// ---------------------------------------------------------------------------
// Tournament document
// ---------------------------------------------------------------------------

/// `streaming/<tournament-id>` split into its two field scopes.
#[derive(Debug, Default)]
pub struct RawDocument {
    pub top: RawTournamentFields,
    pub overview: RawTournamentFields,
}

impl RawDocument {
    pub fn parse(value: &Value) -> Self {
        Self {
            top: RawTournamentFields::from_value(value),
            overview: value
                .get("overview")
                .map(RawTournamentFields::from_value)
                .unwrap_or_default(),
        }
    }
}

/// Fields that may appear either at the top level or under `overview`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTournamentFields {
    #[serde(default, deserialize_with = "lenient")]
    pub id: Option<RawText>,
    #[serde(default, deserialize_with = "lenient")]
    pub name: Option<RawText>,
    #[serde(default, deserialize_with = "lenient")]
    pub status: Option<RawText>,
    #[serde(default, deserialize_with = "lenient")]
    pub current_round: Option<RawText>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub teams: Option<Vec<RawTeam>>,
    #[serde(default, deserialize_with = "lenient")]
    pub rounds: Option<RawRounds>,
    #[serde(default, deserialize_with = "lenient")]
    pub streaming_mode: Option<RawText>,
    #[serde(default, deserialize_with = "lenient")]
    pub last_web_update: Option<RawTimestamp>,
    #[serde(default, deserialize_with = "lenient")]
    pub pushed_at: Option<RawTimestamp>,
    #[serde(default, deserialize_with = "lenient")]
    pub pushed_by: Option<RawText>,
}

impl RawTournamentFields {
    /// Non-object values decode as "nothing present".
    pub fn from_value(value: &Value) -> Self {
        if !value.is_object() {
            return Self::default();
        }
        Self::deserialize(value).unwrap_or_default()
    }
}

/// `rounds` is either an ordered list or a map keyed by round name.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawRounds {
    List(Vec<Value>),
    /// Keys keep document order (serde_json `preserve_order`).
    Keyed(Map<String, Value>),
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawRound {
    #[serde(default, deserialize_with = "lenient")]
    pub round_name: Option<RawText>,
    #[serde(default, deserialize_with = "lenient")]
    pub is_completed: Option<bool>,
    #[serde(default, deserialize_with = "lenient")]
    pub winner_team_id: Option<RawText>,
    #[serde(default, deserialize_with = "lenient")]
    pub matches: Option<RawMatches>,
    #[serde(default, deserialize_with = "lenient")]
    pub team1_wins: Option<RawCount>,
    #[serde(default, deserialize_with = "lenient")]
    pub team2_wins: Option<RawCount>,
    #[serde(default, deserialize_with = "lenient")]
    pub wins_needed: Option<RawCount>,
}

impl RawRound {
    pub fn from_value(value: &Value) -> Self {
        if !value.is_object() {
            return Self::default();
        }
        Self::deserialize(value).unwrap_or_default()
    }
}

/// Same list-or-map polymorphism as rounds.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawMatches {
    List(Vec<Value>),
    Keyed(Map<String, Value>),
}

impl RawMatches {
    /// Matches in document order; map keys are only used for ordering.
    pub fn into_matches(self) -> Vec<RawMatch> {
        let values: Vec<Value> = match self {
            RawMatches::List(items) => items,
            RawMatches::Keyed(map) => map.into_iter().map(|(_, v)| v).collect(),
        };
        values.iter().map(RawMatch::from_value).collect()
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawMatch {
    #[serde(default, deserialize_with = "lenient")]
    pub match_id: Option<RawText>,
    #[serde(default, deserialize_with = "lenient")]
    pub round_name: Option<RawText>,
    #[serde(default, deserialize_with = "lenient")]
    pub match_number: Option<RawCount>,
    #[serde(default, deserialize_with = "lenient")]
    pub team1: Option<RawMatchSide>,
    #[serde(default, deserialize_with = "lenient")]
    pub team2: Option<RawMatchSide>,
    #[serde(default, deserialize_with = "lenient")]
    pub is_completed: Option<bool>,
    #[serde(default, deserialize_with = "lenient")]
    pub winner_id: Option<RawText>,
    #[serde(default, deserialize_with = "lenient")]
    pub race_to_score: Option<RawCount>,
    #[serde(default, deserialize_with = "lenient")]
    pub last_updated: Option<RawTimestamp>,
}

impl RawMatch {
    pub fn from_value(value: &Value) -> Self {
        if !value.is_object() {
            return Self::default();
        }
        Self::deserialize(value).unwrap_or_default()
    }

    pub fn sides(&self) -> impl Iterator<Item = &RawMatchSide> {
        self.team1.iter().chain(self.team2.iter())
    }
}

/// One side of a match as embedded by the scoring app.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawMatchSide {
    #[serde(default, deserialize_with = "lenient")]
    pub id: Option<RawText>,
    #[serde(default, deserialize_with = "lenient")]
    pub name: Option<RawText>,
    #[serde(default, deserialize_with = "lenient")]
    pub score: Option<RawCount>,
    #[serde(default, deserialize_with = "lenient")]
    pub color: Option<RawText>,
    #[serde(default, deserialize_with = "lenient")]
    pub icon: Option<RawText>,
    /// Roster carried along with the match: "Ann, Bob, Cy".
    #[serde(default, deserialize_with = "lenient")]
    pub player_names: Option<RawPlayerNames>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawPlayerNames {
    Joined(String),
    List(Vec<String>),
}

impl RawPlayerNames {
    pub fn joined(&self) -> String {
        match self {
            RawPlayerNames::Joined(s) => s.clone(),
            RawPlayerNames::List(names) => names.join(","),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTeam {
    #[serde(default, deserialize_with = "lenient")]
    pub id: Option<RawText>,
    #[serde(default, deserialize_with = "lenient")]
    pub name: Option<RawText>,
    #[serde(default, deserialize_with = "lenient")]
    pub manager: Option<RawText>,
    #[serde(default, deserialize_with = "lenient")]
    pub captain: Option<RawText>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub players: Option<Vec<RawPlayer>>,
    #[serde(default, deserialize_with = "lenient")]
    pub color: Option<RawText>,
    #[serde(default, deserialize_with = "lenient")]
    pub icon: Option<RawText>,
}

/// Canonical rosters hold player objects; older documents hold bare names.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawPlayer {
    Name(String),
    Full(RawPlayerFields),
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawPlayerFields {
    #[serde(default, deserialize_with = "lenient")]
    pub id: Option<RawText>,
    #[serde(default, deserialize_with = "lenient")]
    pub name: Option<RawText>,
    #[serde(default, deserialize_with = "lenient")]
    pub captain: Option<bool>,
}

// ---------------------------------------------------------------------------
// Stream control document
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawStreamControl {
    #[serde(default, deserialize_with = "lenient_list")]
    pub stream_matches: Option<Vec<RawText>>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub hidden_sections: Option<Vec<RawText>>,
}

impl RawStreamControl {
    pub fn from_value(value: &Value) -> Self {
        if !value.is_object() {
            return Self::default();
        }
        Self::deserialize(value).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn malformed_fields_are_dropped_not_fatal() {
        let raw = RawTournamentFields::from_value(&json!({
            "name": "Friday League",
            "teams": "not-a-list",
            "rounds": 42,
            "status": { "nested": true },
        }));
        assert_eq!(raw.name.map(RawText::into_string).as_deref(), Some("Friday League"));
        assert!(raw.teams.is_none());
        assert!(raw.rounds.is_none());
        assert!(raw.status.is_none());
    }

    #[test]
    fn non_object_document_decodes_as_empty() {
        let raw = RawTournamentFields::from_value(&json!(["unexpected"]));
        assert!(raw.name.is_none());
        assert!(raw.rounds.is_none());
    }

    #[test]
    fn rounds_decode_as_list_or_keyed_map() {
        let list = RawTournamentFields::from_value(&json!({ "rounds": [{ "roundName": "final" }] }));
        assert!(matches!(list.rounds, Some(RawRounds::List(ref v)) if v.len() == 1));

        let keyed = RawTournamentFields::from_value(&json!({ "rounds": { "final": {}, "semiFinal1": {} } }));
        let Some(RawRounds::Keyed(map)) = keyed.rounds else {
            panic!("expected keyed rounds");
        };
        let keys: Vec<&str> = map.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["final", "semiFinal1"]);
    }

    #[test]
    fn counts_accept_strings_and_clamp_negatives() {
        let round = RawRound::from_value(&json!({ "team1Wins": "3", "team2Wins": -2, "winsNeeded": 7.0 }));
        assert_eq!(round.team1_wins.map(|c| c.to_u32()), Some(3));
        assert_eq!(round.team2_wins.map(|c| c.to_u32()), Some(0));
        assert_eq!(round.wins_needed.map(|c| c.to_u32()), Some(7));
    }

    #[test]
    fn timestamp_variants() {
        let m = RawMatch::from_value(&json!({ "lastUpdated": { "_seconds": 10, "_nanoseconds": 5 } }));
        assert!(matches!(m.last_updated, Some(RawTimestamp::Seconds(RawSeconds { seconds: 10, nanoseconds: 5 }))));

        let m = RawMatch::from_value(&json!({ "lastUpdated": 1_700_000_000_000u64 }));
        assert!(matches!(m.last_updated, Some(RawTimestamp::Millis(_))));

        let m = RawMatch::from_value(&json!({ "lastUpdated": true }));
        assert!(m.last_updated.is_none());
    }

    #[test]
    fn players_accept_bare_names_and_objects() {
        let team: RawTeam = serde_json::from_value(json!({
            "id": 7,
            "players": ["Ann", { "id": "p2", "name": "Bob", "captain": true }, 12]
        }))
        .unwrap();
        assert_eq!(team.id.map(RawText::into_string).as_deref(), Some("7"));
        let players = team.players.unwrap();
        assert_eq!(players.len(), 2);
        assert!(matches!(players[0], RawPlayer::Name(ref n) if n == "Ann"));
        assert!(matches!(players[1], RawPlayer::Full(RawPlayerFields { captain: Some(true), .. })));
    }
}
