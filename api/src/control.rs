use crate::StreamControl;
use crate::wire::{RawStreamControl, RawText};
use serde_json::{Map, Value};
use std::collections::BTreeSet;

pub const SECTION_HEADER: &str = "header";
pub const SECTION_SCOREBOARD: &str = "scoreboard";
pub const SECTION_SERIES: &str = "series";
pub const SECTION_ROUNDS: &str = "rounds";
pub const SECTION_TEAMS: &str = "teams";
pub const SECTION_TICKER: &str = "ticker";

/// Overlay sections in the order they are drawn and listed on the admin page.
pub const KNOWN_SECTIONS: [&str; 6] = [
    SECTION_HEADER,
    SECTION_SCOREBOARD,
    SECTION_SERIES,
    SECTION_ROUNDS,
    SECTION_TEAMS,
    SECTION_TICKER,
];

const STREAM_MATCHES_FIELD: &str = "streamMatches";
const HIDDEN_SECTIONS_FIELD: &str = "hiddenSections";

/// Absent or malformed control documents yield an empty control.
pub fn normalize_control(raw: Option<&Value>) -> StreamControl {
    let Some(raw) = raw else {
        return StreamControl::default();
    };
    let raw = RawStreamControl::from_value(raw);

    let mut stream_matches = Vec::new();
    for id in texts(raw.stream_matches) {
        if !stream_matches.contains(&id) {
            stream_matches.push(id);
        }
    }

    StreamControl {
        stream_matches,
        hidden_sections: texts(raw.hidden_sections).collect(),
    }
}

fn texts(list: Option<Vec<RawText>>) -> impl Iterator<Item = String> {
    list.unwrap_or_default()
        .into_iter()
        .map(RawText::into_string)
        .filter(|s| !s.trim().is_empty())
}

impl StreamControl {
    pub fn is_hidden(&self, section: &str) -> bool {
        self.hidden_sections.contains(section)
    }

    pub fn is_streamed(&self, match_id: &str) -> bool {
        self.stream_matches.iter().any(|id| id == match_id)
    }

    /// Add the match to the end of the stream list, or remove it if present.
    pub fn toggle_match(&mut self, match_id: &str) {
        if self.is_streamed(match_id) {
            self.stream_matches.retain(|id| id != match_id);
        } else {
            self.stream_matches.push(match_id.to_string());
        }
    }

    pub fn toggle_section(&mut self, section: &str) {
        if !self.hidden_sections.remove(section) {
            self.hidden_sections.insert(section.to_string());
        }
    }
}

/// A merge-update of the control document. Unset fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StreamControlPatch {
    pub stream_matches: Option<Vec<String>>,
    pub hidden_sections: Option<BTreeSet<String>>,
}

impl StreamControlPatch {
    pub fn stream_matches(control: &StreamControl) -> Self {
        Self {
            stream_matches: Some(control.stream_matches.clone()),
            ..Default::default()
        }
    }

    pub fn hidden_sections(control: &StreamControl) -> Self {
        Self {
            hidden_sections: Some(control.hidden_sections.clone()),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.stream_matches.is_none() && self.hidden_sections.is_none()
    }

    /// Field map for the write; its keys double as the update mask.
    pub fn into_fields(self) -> Map<String, Value> {
        let mut fields = Map::new();
        if let Some(ids) = self.stream_matches {
            fields.insert(
                STREAM_MATCHES_FIELD.to_string(),
                Value::Array(ids.into_iter().map(Value::String).collect()),
            );
        }
        if let Some(sections) = self.hidden_sections {
            fields.insert(
                HIDDEN_SECTIONS_FIELD.to_string(),
                Value::Array(sections.into_iter().map(Value::String).collect()),
            );
        }
        fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn absent_control_is_empty() {
        assert_eq!(normalize_control(None), StreamControl::default());
    }

    #[test]
    fn malformed_control_is_empty() {
        assert_eq!(normalize_control(Some(&json!("oops"))), StreamControl::default());
        let control = normalize_control(Some(&json!({
            "streamMatches": "m1",
            "hiddenSections": { "teams": true },
        })));
        assert_eq!(control, StreamControl::default());
    }

    #[test]
    fn keeps_stream_order_and_drops_duplicates() {
        let control = normalize_control(Some(&json!({
            "streamMatches": ["m3", "m1", "", "m3", 7],
            "hiddenSections": ["ticker", "teams", "ticker"],
        })));
        assert_eq!(control.stream_matches, vec!["m3", "m1", "7"]);
        assert_eq!(
            control.hidden_sections,
            BTreeSet::from(["teams".to_string(), "ticker".to_string()])
        );
    }

    #[test]
    fn toggles_flip_membership() {
        let mut control = StreamControl::default();
        control.toggle_match("m1");
        control.toggle_match("m2");
        assert!(control.is_streamed("m1"));
        control.toggle_match("m1");
        assert_eq!(control.stream_matches, vec!["m2"]);

        control.toggle_section(SECTION_TICKER);
        assert!(control.is_hidden(SECTION_TICKER));
        control.toggle_section(SECTION_TICKER);
        assert!(!control.is_hidden(SECTION_TICKER));
    }

    #[test]
    fn patch_only_writes_named_fields() {
        let mut control = StreamControl::default();
        control.toggle_section(SECTION_SERIES);

        let fields = StreamControlPatch::hidden_sections(&control).into_fields();
        assert_eq!(fields.len(), 1);
        assert_eq!(fields["hiddenSections"], json!(["series"]));

        assert!(StreamControlPatch::default().is_empty());
        assert!(StreamControlPatch::default().into_fields().is_empty());
    }
}
