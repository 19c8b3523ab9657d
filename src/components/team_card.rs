use crate::components::scorebug::team_color;
use poolcast_api::Team;
use tui::buffer::Buffer;
use tui::layout::Rect;
use tui::style::{Color, Modifier, Style};
use tui::text::{Line, Span};
use tui::widgets::{Block, BorderType, Borders, Paragraph, Widget, Wrap};

/// Roster card for the teams page.
pub struct TeamCard<'a> {
    pub team: &'a Team,
}

impl TeamCard<'_> {
    /// Height needed to show the whole roster.
    pub fn height(team: &Team) -> u16 {
        // borders + manager + captain + blank + players
        (5 + team.players.len().max(1)) as u16
    }
}

impl Widget for TeamCard<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let accent = team_color(&self.team.color).unwrap_or(Color::White);
        let title = if self.team.icon.is_empty() {
            format!(" {} ", self.team.name)
        } else {
            format!(" {} {} ", self.team.icon, self.team.name)
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(accent))
            .title(Span::styled(title, Style::default().fg(accent).add_modifier(Modifier::BOLD)));

        let dim = Style::default().fg(Color::DarkGray);
        let mut lines = vec![
            Line::from(vec![Span::styled("Manager  ", dim), Span::raw(or_dash(&self.team.manager))]),
            Line::from(vec![Span::styled("Captain  ", dim), Span::raw(or_dash(&self.team.captain))]),
            Line::from(""),
        ];
        if self.team.players.is_empty() {
            lines.push(Line::styled("No players listed", dim));
        }
        for player in &self.team.players {
            let is_captain = player.captain || (!self.team.captain.is_empty() && player.name == self.team.captain);
            let marker = if is_captain { "★ " } else { "  " };
            lines.push(Line::from(vec![
                Span::styled(marker, Style::default().fg(Color::Yellow)),
                Span::raw(player.name.clone()),
            ]));
        }

        Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: false })
            .render(area, buf);
    }
}

fn or_dash(value: &str) -> String {
    if value.trim().is_empty() { "-".to_string() } else { value.to_string() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use poolcast_api::Player;

    #[test]
    fn marks_captain_and_lists_players() {
        let team = Team {
            id: "t1".into(),
            name: "Breakers".into(),
            manager: "Sam".into(),
            captain: "Ann".into(),
            players: vec![
                Player { id: "p1".into(), name: "Ann".into(), captain: false },
                Player { id: "p2".into(), name: "Bo".into(), captain: false },
            ],
            ..Default::default()
        };
        let area = Rect::new(0, 0, 30, TeamCard::height(&team));
        let mut buf = Buffer::empty(area);
        TeamCard { team: &team }.render(area, &mut buf);

        let rows: Vec<String> = (0..area.height)
            .map(|y| (0..area.width).filter_map(|x| buf.cell((x, y)).map(|c| c.symbol().to_string())).collect())
            .collect();
        assert!(rows[0].contains("Breakers"));
        assert!(rows[1].contains("Sam"));
        assert!(rows.iter().any(|r| r.contains("★ Ann")));
        assert!(rows.iter().any(|r| r.contains("  Bo")));
    }
}
