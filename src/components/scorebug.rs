use poolcast_api::{Match, MatchSide};
use std::str::FromStr;
use tui::buffer::Buffer;
use tui::layout::Rect;
use tui::style::{Color, Modifier, Style};
use tui::widgets::{Block, BorderType, Borders, Widget};

/// Rows taken by one score bug: border, two team rows, status row, border.
pub const SCOREBUG_HEIGHT: u16 = 5;
/// Narrowest bug that still fits a name and a score.
pub const SCOREBUG_MIN_WIDTH: u16 = 16;

/// Broadcast-style score box for one match.
pub struct ScoreBug<'a> {
    pub game: &'a Match,
    pub round_label: &'a str,
    pub highlight: bool,
}

impl Widget for ScoreBug<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width < SCOREBUG_MIN_WIDTH || area.height < SCOREBUG_HEIGHT {
            return;
        }
        let border = if self.highlight { Color::Yellow } else { Color::DarkGray };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(border))
            .title(format!(" {} · Match {} ", self.round_label, self.game.match_number));
        let inner = block.inner(area);
        block.render(area, buf);

        let winner_id = self.game.winner_id.as_deref();
        for (row, side) in [&self.game.team1, &self.game.team2].into_iter().enumerate() {
            let won = winner_id.is_some_and(|id| id == side.id);
            render_side(side, won, inner.x, inner.y + row as u16, inner.width, buf);
        }

        let (status, style) = status_line(self.game);
        let status: String = status.chars().take(inner.width as usize).collect();
        buf.set_string(inner.x, inner.y + 2, status, style);
    }
}

fn render_side(side: &MatchSide, won: bool, x: u16, y: u16, width: u16, buf: &mut Buffer) {
    let score = side.score.to_string();
    let name_width = (width as usize).saturating_sub(score.len() + 3);
    let name = if side.is_placeholder() { "TBD" } else { side.name.as_str() };
    let name: String = name.chars().take(name_width).collect();

    let swatch = team_color(&side.color).unwrap_or(Color::Gray);
    buf.set_string(x, y, "▌", Style::default().fg(swatch));

    let mut style = Style::default().fg(Color::White);
    if won {
        style = style.fg(Color::Green).add_modifier(Modifier::BOLD);
    }
    buf.set_string(x + 2, y, name, style);
    let score_x = x + width.saturating_sub(score.len() as u16);
    buf.set_string(score_x, y, score, style.add_modifier(Modifier::BOLD));
}

fn status_line(game: &Match) -> (String, Style) {
    if game.is_completed {
        let text = match game.winner() {
            Some(side) => format!("FINAL · {} wins", side.name),
            None => "FINAL".to_string(),
        };
        return (text, Style::default().fg(Color::Green));
    }
    let race = if game.race_to_score > 0 {
        format!("race to {}", game.race_to_score)
    } else {
        String::new()
    };
    if game.is_live() {
        (format!("● LIVE  {race}"), Style::default().fg(Color::Red).add_modifier(Modifier::BOLD))
    } else {
        (format!("UP NEXT  {race}"), Style::default().fg(Color::DarkGray))
    }
}

/// Team colors arrive as names or `#rrggbb`.
pub fn team_color(color: &str) -> Option<Color> {
    let color = color.trim();
    if color.is_empty() {
        return None;
    }
    Color::from_str(color).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn side(id: &str, name: &str, score: u32) -> MatchSide {
        MatchSide { id: id.into(), name: name.into(), score, color: "#3366ff".into(), ..Default::default() }
    }

    fn row_text(buf: &Buffer, y: u16) -> String {
        (0..buf.area.width)
            .filter_map(|x| buf.cell((x, y)).map(|c| c.symbol().to_string()))
            .collect()
    }

    #[test]
    fn renders_names_scores_and_live_status() {
        let game = Match {
            match_id: "m1".into(),
            match_number: 3,
            team1: side("a", "Breakers", 4),
            team2: side("b", "Cue Ballers", 2),
            race_to_score: 7,
            ..Default::default()
        };
        let area = Rect::new(0, 0, 40, SCOREBUG_HEIGHT);
        let mut buf = Buffer::empty(area);
        ScoreBug { game: &game, round_label: "Final", highlight: false }.render(area, &mut buf);

        assert!(row_text(&buf, 0).contains("Final · Match 3"));
        assert!(row_text(&buf, 1).contains("Breakers"));
        assert!(row_text(&buf, 1).trim_end_matches('│').trim_end().ends_with('4'));
        assert!(row_text(&buf, 2).contains("Cue Ballers"));
        assert!(row_text(&buf, 3).contains("LIVE"));
        assert!(row_text(&buf, 3).contains("race to 7"));
    }

    #[test]
    fn placeholder_side_shows_tbd() {
        let game = Match { team1: side("", "Unknown Team", 0), ..Default::default() };
        let area = Rect::new(0, 0, 30, SCOREBUG_HEIGHT);
        let mut buf = Buffer::empty(area);
        ScoreBug { game: &game, round_label: "Semi-Final 1", highlight: true }.render(area, &mut buf);
        assert!(row_text(&buf, 1).contains("TBD"));
        assert!(row_text(&buf, 3).contains("UP NEXT"));
    }

    #[test]
    fn parses_named_and_hex_colors() {
        assert_eq!(team_color("red"), Some(Color::Red));
        assert_eq!(team_color("#ff0000"), Some(Color::Rgb(255, 0, 0)));
        assert_eq!(team_color(""), None);
        assert_eq!(team_color("not a color"), None);
    }
}
