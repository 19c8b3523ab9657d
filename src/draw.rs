use chrono::{DateTime, Local, Utc};
use log::error;
use poolcast_api::control::{
    KNOWN_SECTIONS, SECTION_HEADER, SECTION_ROUNDS, SECTION_SCOREBOARD, SECTION_SERIES,
    SECTION_TEAMS, SECTION_TICKER,
};
use poolcast_api::{Match, Round, TournamentSnapshot, TournamentStatus};
use tui::backend::Backend;
use tui::layout::{Alignment, Constraint, Layout, Rect};
use tui::style::{Color, Modifier, Style};
use tui::text::{Line, Span};
use tui::widgets::{Block, BorderType, Borders, Paragraph, Tabs, Wrap};
use tui::{Frame, Terminal};
use tui_logger::TuiLoggerWidget;

use crate::app::{App, MenuItem};
use crate::components::scorebug::{SCOREBUG_HEIGHT, SCOREBUG_MIN_WIDTH, ScoreBug, team_color};
use crate::components::team_card::TeamCard;
use crate::state::app_state::AdminFocus;
use crate::state::countdown::{Countdown, SLOTS_PER_DAY, format_remaining, slot_label};
use crate::state::network::{ERROR_CHAR, LoadingState};
use crate::state::ranking::{RankedPlayer, build_ranking};
use crate::ui::layout::LayoutAreas;

/// Preferred width of one score bug on the overlay.
const SCOREBUG_WIDTH: u16 = 34;
const TEAM_CARD_WIDTH: u16 = 34;

pub fn draw<B>(terminal: &mut Terminal<B>, app: &mut App, loading: LoadingState)
where
    B: Backend,
{
    let current_size = terminal.size().unwrap_or_default();
    if current_size.width <= 10 || current_size.height <= 10 {
        return;
    }

    let mut layout = LayoutAreas::new(current_size);

    let result = terminal.draw(|f| {
        layout.update(f.area(), app.settings.full_screen, app.state.show_logs);

        if !app.settings.full_screen {
            draw_tabs(f, layout.tab_bar, app);
        }

        match app.state.active_tab {
            MenuItem::Overlay => draw_overlay(f, layout.main, app),
            MenuItem::Standby => draw_standby(f, layout.main, app),
            MenuItem::Teams => draw_teams(f, layout.main, app),
            MenuItem::Rankings => draw_rankings(f, layout.main, app),
            MenuItem::Admin => draw_admin(f, layout.main, app),
            MenuItem::Help => draw_help(f, layout.main),
        }

        if let Some(logs) = layout.logs {
            draw_logs(f, logs);
        }

        draw_loading_spinner(f, f.area(), app, loading);
    });
    if let Err(e) = result {
        error!("failed to draw frame: {e}");
    }
}

pub fn default_border<'a>(color: Color) -> Block<'a> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(color))
}

fn draw_tabs(f: &mut Frame, tab_bar: [Rect; 2], app: &App) {
    let style = Style::default().fg(Color::White);
    let border_type = BorderType::Rounded;

    let tab_index = MenuItem::PAGES
        .iter()
        .position(|page| *page == app.state.active_tab)
        .unwrap_or(0);

    let titles: Vec<Line> = MenuItem::PAGES
        .iter()
        .enumerate()
        .map(|(i, page)| Line::from(format!("{} {}", i + 1, page.title())))
        .collect();
    let tabs = Tabs::new(titles)
        .block(
            Block::default()
                .borders(Borders::LEFT | Borders::BOTTOM | Borders::TOP)
                .border_type(border_type),
        )
        .highlight_style(Style::default().add_modifier(Modifier::UNDERLINED))
        .select(tab_index)
        .style(style);
    f.render_widget(tabs, tab_bar[0]);

    let help = Paragraph::new("Help: ? ")
        .alignment(Alignment::Right)
        .block(
            Block::default()
                .borders(Borders::RIGHT | Borders::BOTTOM | Borders::TOP)
                .border_type(border_type),
        )
        .style(style);
    f.render_widget(help, tab_bar[1]);
}

/// Shown in place of a page while there is no tournament to display.
fn draw_waiting(f: &mut Frame, area: Rect, app: &App) {
    let mut lines = vec![Line::styled(
        app.state.tournament.waiting_message(),
        Style::default().fg(Color::DarkGray),
    )];
    if let Some(err) = app.state.last_error.as_deref() {
        lines.push(Line::from(""));
        lines.push(Line::styled(err.to_string(), Style::default().fg(Color::Red)));
    }
    let [_, middle, _] = Layout::vertical([
        Constraint::Fill(1),
        Constraint::Length(lines.len() as u16),
        Constraint::Fill(1),
    ])
    .areas(area);
    f.render_widget(
        Paragraph::new(lines).alignment(Alignment::Center).wrap(Wrap { trim: true }),
        middle,
    );
}

fn draw_placeholder(f: &mut Frame, area: Rect, msg: &str) {
    f.render_widget(
        Paragraph::new(msg.to_string())
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center),
        area,
    );
}

// ---------------------------------------------------------------------------
// Overlay
// ---------------------------------------------------------------------------

fn draw_overlay(f: &mut Frame, area: Rect, app: &App) {
    let block = default_border(Color::White).title(" Overlay ");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let Some(snapshot) = app.state.tournament.snapshot() else {
        draw_waiting(f, inner, app);
        return;
    };

    let sections: Vec<(&str, Constraint)> = KNOWN_SECTIONS
        .iter()
        .copied()
        .filter(|section| !app.state.control.is_hidden(section))
        .map(|section| (section, section_constraint(section, snapshot)))
        .collect();
    if sections.is_empty() {
        draw_placeholder(f, inner, "All overlay sections are hidden");
        return;
    }

    let matches = app.overlay_matches();
    let areas = Layout::vertical(sections.iter().map(|(_, c)| *c)).split(inner);
    for ((section, _), rect) in sections.iter().zip(areas.iter()) {
        match *section {
            SECTION_HEADER => draw_overlay_header(f, *rect, snapshot),
            SECTION_SCOREBOARD => draw_overlay_scoreboard(f, *rect, snapshot, &matches),
            SECTION_SERIES => draw_overlay_series(f, *rect, snapshot),
            SECTION_ROUNDS => draw_overlay_rounds(f, *rect, snapshot),
            SECTION_TEAMS => draw_overlay_teams(f, *rect, snapshot),
            SECTION_TICKER => draw_overlay_ticker(f, *rect, snapshot),
            _ => {}
        }
    }
}

fn section_constraint(section: &str, snapshot: &TournamentSnapshot) -> Constraint {
    match section {
        SECTION_HEADER => Constraint::Length(2),
        SECTION_SCOREBOARD => Constraint::Min(SCOREBUG_HEIGHT),
        SECTION_SERIES => Constraint::Length(3),
        SECTION_ROUNDS => Constraint::Length(snapshot.rounds.len().clamp(1, 6) as u16 + 2),
        SECTION_TEAMS => Constraint::Length(1),
        _ => Constraint::Length(1),
    }
}

fn status_style(status: TournamentStatus) -> Style {
    match status {
        TournamentStatus::Live => Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        TournamentStatus::Completed => Style::default().fg(Color::Green),
        TournamentStatus::Setup => Style::default().fg(Color::DarkGray),
    }
}

fn draw_overlay_header(f: &mut Frame, area: Rect, snapshot: &TournamentSnapshot) {
    let name = if snapshot.name.is_empty() { snapshot.id.as_str() } else { snapshot.name.as_str() };
    let round = snapshot
        .active_round()
        .map(Round::label)
        .unwrap_or_else(|| snapshot.current_round.clone());
    let lines = vec![
        Line::from(vec![
            Span::styled(name.to_string(), Style::default().add_modifier(Modifier::BOLD)),
            Span::raw("  "),
            Span::styled(snapshot.status.label(), status_style(snapshot.status)),
        ]),
        Line::styled(round, Style::default().fg(Color::Gray)),
    ];
    f.render_widget(Paragraph::new(lines).alignment(Alignment::Center), area);
}

fn draw_overlay_scoreboard(
    f: &mut Frame,
    area: Rect,
    snapshot: &TournamentSnapshot,
    matches: &[&Match],
) {
    if matches.is_empty() {
        draw_placeholder(f, area, "No matches selected for the stream");
        return;
    }
    if area.width < SCOREBUG_MIN_WIDTH || area.height < SCOREBUG_HEIGHT {
        return;
    }

    let cols = (area.width / SCOREBUG_WIDTH).max(1) as usize;
    let rows = (area.height / SCOREBUG_HEIGHT).max(1) as usize;
    let width = area.width / cols as u16;

    for (idx, game) in matches.iter().take(cols * rows).enumerate() {
        let col = (idx % cols) as u16;
        let row = (idx / cols) as u16;
        let cell = Rect::new(
            area.x + col * width,
            area.y + row * SCOREBUG_HEIGHT,
            width,
            SCOREBUG_HEIGHT,
        );
        let round_label = snapshot
            .rounds
            .iter()
            .find(|r| r.round_name == game.round_name)
            .map(Round::label)
            .unwrap_or_else(|| game.round_name.clone());
        f.render_widget(
            ScoreBug { game, round_label: &round_label, highlight: game.is_live() },
            cell,
        );
    }
}

/// The round whose series score the overlay shows: the current one, else the
/// first still undecided.
fn series_round(snapshot: &TournamentSnapshot) -> Option<&Round> {
    snapshot
        .active_round()
        .or_else(|| snapshot.rounds.iter().find(|r| !r.is_decided()))
}

fn draw_overlay_series(f: &mut Frame, area: Rect, snapshot: &TournamentSnapshot) {
    let block = default_border(Color::DarkGray).title(" Series ");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let Some(round) = series_round(snapshot) else {
        draw_placeholder(f, inner, "No series in progress");
        return;
    };
    let (left, right) = round
        .sides()
        .map(|(a, b)| (a.name.clone(), b.name.clone()))
        .unwrap_or_else(|| ("Team 1".to_string(), "Team 2".to_string()));
    let bold = Style::default().add_modifier(Modifier::BOLD);
    let line = Line::from(vec![
        Span::styled(format!("{} ", round.label()), Style::default().fg(Color::Gray)),
        Span::raw(format!(" {left} ")),
        Span::styled(format!("{} - {}", round.team1_wins, round.team2_wins), bold),
        Span::raw(format!(" {right} ")),
        Span::styled(
            format!("  first to {}", round.wins_needed),
            Style::default().fg(Color::DarkGray),
        ),
    ]);
    f.render_widget(Paragraph::new(line).alignment(Alignment::Center), inner);
}

fn draw_overlay_rounds(f: &mut Frame, area: Rect, snapshot: &TournamentSnapshot) {
    let block = default_border(Color::DarkGray).title(" Rounds ");
    let inner = block.inner(area);
    f.render_widget(block, area);

    if snapshot.rounds.is_empty() {
        draw_placeholder(f, inner, "No rounds yet");
        return;
    }

    let lines: Vec<Line> = snapshot
        .rounds
        .iter()
        .map(|round| {
            let state = match round.winner_team_id.as_deref().and_then(|id| snapshot.team_by_id(id)) {
                Some(team) => Span::styled(format!("won by {}", team.name), Style::default().fg(Color::Green)),
                None if round.is_decided() => Span::styled("decided", Style::default().fg(Color::Green)),
                None if round.round_name == snapshot.current_round => {
                    Span::styled("in progress", Style::default().fg(Color::Red))
                }
                None => Span::styled("upcoming", Style::default().fg(Color::DarkGray)),
            };
            Line::from(vec![
                Span::raw(format!("{:<14}", round.label())),
                Span::raw(format!("{:>2} - {:<2}  ", round.team1_wins, round.team2_wins)),
                state,
            ])
        })
        .collect();
    f.render_widget(Paragraph::new(lines), inner);
}

fn draw_overlay_teams(f: &mut Frame, area: Rect, snapshot: &TournamentSnapshot) {
    let mut spans = Vec::new();
    for team in &snapshot.teams {
        if !spans.is_empty() {
            spans.push(Span::styled("  |  ", Style::default().fg(Color::DarkGray)));
        }
        let color = team_color(&team.color).unwrap_or(Color::White);
        spans.push(Span::styled(team.name.clone(), Style::default().fg(color)));
    }
    f.render_widget(Paragraph::new(Line::from(spans)).alignment(Alignment::Center), area);
}

fn draw_overlay_ticker(f: &mut Frame, area: Rect, snapshot: &TournamentSnapshot) {
    let results: Vec<String> = snapshot
        .all_matches()
        .filter(|m| m.is_completed || m.is_live())
        .map(|m| format!("{} {}-{} {}", m.team1.name, m.team1.score, m.team2.score, m.team2.name))
        .collect();
    let text = if results.is_empty() {
        let by = if snapshot.pushed_by.is_empty() { "-" } else { snapshot.pushed_by.as_str() };
        format!("Updated by {by}")
    } else {
        results.join("   •   ")
    };
    f.render_widget(
        Paragraph::new(text).style(Style::default().fg(Color::Black).bg(Color::Yellow)),
        area,
    );
}

// ---------------------------------------------------------------------------
// Standby
// ---------------------------------------------------------------------------

fn draw_standby(f: &mut Frame, area: Rect, app: &App) {
    let block = default_border(Color::White).title(" Standby ");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let title = app
        .state
        .tournament
        .snapshot()
        .map(|s| if s.name.is_empty() { s.id.clone() } else { s.name.clone() })
        .unwrap_or_else(|| "Pool Tournament".to_string());

    let [title_area, body, hint_area] = Layout::vertical([
        Constraint::Length(2),
        Constraint::Fill(1),
        Constraint::Length(1),
    ])
    .areas(inner);
    f.render_widget(
        Paragraph::new(title)
            .style(Style::default().add_modifier(Modifier::BOLD))
            .alignment(Alignment::Center),
        title_area,
    );

    let dim = Style::default().fg(Color::DarkGray);
    let (lines, hint) = match app.state.countdown {
        Countdown::SelectingTime { slot } => {
            let window = (body.height as usize).clamp(1, 9);
            let half = window / 2;
            let mut lines = vec![Line::styled("Broadcast starts at", dim)];
            for offset in 0..window {
                let s = (slot + SLOTS_PER_DAY + offset - half) % SLOTS_PER_DAY;
                let label = slot_label(s);
                lines.push(if s == slot {
                    Line::styled(
                        format!("> {label} <"),
                        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
                    )
                } else {
                    Line::styled(label, dim)
                });
            }
            (lines, "↑/↓ choose time  Enter start countdown")
        }
        Countdown::Counting { target, remaining, .. } => (
            vec![
                Line::styled("Starting in", dim),
                Line::from(""),
                Line::styled(
                    format_remaining(remaining),
                    Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
                ),
                Line::from(""),
                Line::styled(format!("at {}", target.format("%H:%M")), dim),
            ],
            "c change time",
        ),
        Countdown::Live => (
            vec![Line::styled(
                "● WE ARE LIVE",
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            )],
            "c pick a new start time",
        ),
    };

    let height = (lines.len() as u16).min(body.height);
    let [_, middle, _] = Layout::vertical([
        Constraint::Fill(1),
        Constraint::Length(height),
        Constraint::Fill(1),
    ])
    .areas(body);
    f.render_widget(Paragraph::new(lines).alignment(Alignment::Center), middle);
    f.render_widget(Paragraph::new(hint).style(dim).alignment(Alignment::Center), hint_area);
}

// ---------------------------------------------------------------------------
// Teams
// ---------------------------------------------------------------------------

fn draw_teams(f: &mut Frame, area: Rect, app: &App) {
    let block = default_border(Color::White).title(" Teams ");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let Some(snapshot) = app.state.tournament.snapshot() else {
        draw_waiting(f, inner, app);
        return;
    };
    if snapshot.teams.is_empty() {
        draw_placeholder(f, inner, "No teams yet");
        return;
    }

    let cols = (inner.width / TEAM_CARD_WIDTH).max(1) as usize;
    let width = inner.width / cols as u16;
    let mut column_y = vec![inner.y; cols];
    let bottom = inner.y + inner.height;

    for (idx, team) in snapshot.teams.iter().skip(app.state.teams_scroll as usize).enumerate() {
        let col = idx % cols;
        let y = column_y[col];
        if y >= bottom {
            continue;
        }
        let height = TeamCard::height(team).min(bottom - y);
        let rect = Rect::new(inner.x + col as u16 * width, y, width, height);
        f.render_widget(TeamCard { team }, rect);
        column_y[col] = y + height;
    }
}

// ---------------------------------------------------------------------------
// Rankings
// ---------------------------------------------------------------------------

fn draw_rankings(f: &mut Frame, area: Rect, app: &App) {
    let block = default_border(Color::White).title(" Player Rankings ");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let Some(snapshot) = app.state.tournament.snapshot() else {
        draw_waiting(f, inner, app);
        return;
    };
    let view = build_ranking(snapshot, &mut rand::thread_rng());
    if view.is_empty() {
        draw_placeholder(f, inner, "No players yet");
        return;
    }

    let [left, right] =
        Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)]).areas(inner);
    f.render_widget(Paragraph::new(ranking_lines(&view.left, 1)), left);
    f.render_widget(Paragraph::new(ranking_lines(&view.right, 2)), right);
}

/// Left column holds ranks 1, 3, 5..., right column 2, 4, 6...
fn ranking_lines(players: &[RankedPlayer], first_rank: usize) -> Vec<Line<'static>> {
    players
        .iter()
        .enumerate()
        .map(|(i, player)| {
            Line::from(vec![
                Span::styled(format!("{:>3}. ", first_rank + 2 * i), Style::default().fg(Color::DarkGray)),
                Span::styled(format!("{:<18}", player.name), Style::default().add_modifier(Modifier::BOLD)),
                Span::styled(format!("{:<16}", player.team_name), Style::default().fg(Color::Gray)),
                Span::styled(format!("{:>3}", player.score), Style::default().fg(Color::Yellow)),
            ])
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Admin dashboard
// ---------------------------------------------------------------------------

fn draw_admin(f: &mut Frame, area: Rect, app: &App) {
    let [matches_area, side] =
        Layout::horizontal([Constraint::Percentage(60), Constraint::Percentage(40)]).areas(area);
    let [sections_area, status_area] = Layout::vertical([
        Constraint::Length(KNOWN_SECTIONS.len() as u16 + 2),
        Constraint::Fill(1),
    ])
    .areas(side);

    draw_admin_matches(f, matches_area, app);
    draw_admin_sections(f, sections_area, app);
    draw_admin_status(f, status_area, app);
}

fn focus_color(app: &App, focus: AdminFocus) -> Color {
    if app.state.admin.focus == focus { Color::Yellow } else { Color::DarkGray }
}

fn draw_admin_matches(f: &mut Frame, area: Rect, app: &App) {
    let block = default_border(focus_color(app, AdminFocus::Matches)).title(" Stream matches ");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let Some(snapshot) = app.state.tournament.snapshot() else {
        draw_waiting(f, inner, app);
        return;
    };

    let matches: Vec<&Match> = snapshot.all_matches().collect();
    if matches.is_empty() {
        draw_placeholder(f, inner, "No matches in this tournament");
        return;
    }

    let selected = app.state.admin.selected_match;
    let visible = inner.height.max(1) as usize;
    let offset = selected.saturating_sub(visible - 1);
    let lines: Vec<Line> = matches
        .iter()
        .enumerate()
        .skip(offset)
        .take(visible)
        .map(|(idx, game)| {
            let streamed = app.state.control.is_streamed(&game.match_id);
            let cursor = if idx == selected && app.state.admin.focus == AdminFocus::Matches {
                ">"
            } else {
                " "
            };
            let check = if streamed { "[x]" } else { "[ ]" };
            let style = if streamed {
                Style::default().fg(Color::Green)
            } else {
                Style::default()
            };
            Line::styled(
                format!(
                    "{cursor} {check} {:<12} #{:<2} {} {}-{} {}",
                    game.round_name,
                    game.match_number,
                    game.team1.name,
                    game.team1.score,
                    game.team2.score,
                    game.team2.name
                ),
                style,
            )
        })
        .collect();
    f.render_widget(Paragraph::new(lines), inner);
}

fn draw_admin_sections(f: &mut Frame, area: Rect, app: &App) {
    let block = default_border(focus_color(app, AdminFocus::Sections)).title(" Overlay sections ");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let lines: Vec<Line> = KNOWN_SECTIONS
        .iter()
        .enumerate()
        .map(|(idx, section)| {
            let cursor = if idx == app.state.admin.selected_section
                && app.state.admin.focus == AdminFocus::Sections
            {
                ">"
            } else {
                " "
            };
            let (state, style) = if app.state.control.is_hidden(section) {
                ("hidden ", Style::default().fg(Color::DarkGray))
            } else {
                ("visible", Style::default().fg(Color::Green))
            };
            Line::from(vec![Span::raw(format!("{cursor} ")), Span::styled(state, style), Span::raw(format!("  {section}"))])
        })
        .collect();
    f.render_widget(Paragraph::new(lines), inner);
}

fn format_timestamp(ts: DateTime<Utc>) -> String {
    if ts.timestamp() == 0 {
        return "-".to_string();
    }
    ts.with_timezone(&Local).format("%d %b %H:%M:%S").to_string()
}

fn draw_admin_status(f: &mut Frame, area: Rect, app: &App) {
    let block = default_border(Color::DarkGray).title(" Status ");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let dim = Style::default().fg(Color::DarkGray);
    let row = |label: &str, value: String| {
        Line::from(vec![Span::styled(format!("{label:<13}"), dim), Span::raw(value)])
    };

    let mut lines = vec![row("Document", format!("streaming/{}", app.settings.tournament_id))];
    if let Some(s) = app.state.tournament.snapshot() {
        lines.push(row("Status", s.status.label().to_string()));
        lines.push(row("Round", s.current_round.clone()));
        lines.push(row("Mode", s.streaming_mode.label().to_string()));
        lines.push(row("Pushed by", if s.pushed_by.is_empty() { "-".to_string() } else { s.pushed_by.clone() }));
        lines.push(row("Pushed at", format_timestamp(s.pushed_at)));
        lines.push(row("Web update", format_timestamp(s.last_web_update)));
    } else {
        lines.push(row("Status", app.state.tournament.waiting_message().to_string()));
    }
    lines.push(row(
        "Refreshed",
        app.state
            .admin
            .last_refresh
            .map(|t| t.format("%H:%M:%S").to_string())
            .unwrap_or_else(|| "-".to_string()),
    ));
    lines.push(Line::from(""));
    if let Some(err) = app.state.last_error.as_deref() {
        lines.push(Line::styled(err.to_string(), Style::default().fg(Color::Red)));
    } else if let Some(msg) = app.state.admin.status_message.as_deref() {
        lines.push(Line::styled(msg.to_string(), Style::default().fg(Color::Green)));
    }
    lines.push(Line::styled(
        "Tab focus  Space toggle  x clear stream  r refresh",
        dim,
    ));
    f.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), inner);
}

// ---------------------------------------------------------------------------
// Help, logs, spinner
// ---------------------------------------------------------------------------

fn draw_help(f: &mut Frame, area: Rect) {
    let block = default_border(Color::White).title(" Help ");
    let key = Style::default().fg(Color::Yellow);
    let entry = |keys: &str, what: &str| {
        Line::from(vec![Span::styled(format!("  {keys:<14}"), key), Span::raw(what.to_string())])
    };
    let lines = vec![
        Line::styled("Pages", Style::default().add_modifier(Modifier::BOLD)),
        entry("1-5", "overlay, standby, teams, rankings, admin"),
        entry("?  Esc", "open / close this help"),
        entry("f", "toggle full screen"),
        entry("\"", "toggle log pane"),
        entry("q  Ctrl-c", "quit"),
        Line::from(""),
        Line::styled("Standby", Style::default().add_modifier(Modifier::BOLD)),
        entry("↑/↓  k/j", "choose start time"),
        entry("Enter", "start countdown"),
        entry("c", "change time"),
        Line::from(""),
        Line::styled("Admin", Style::default().add_modifier(Modifier::BOLD)),
        entry("Tab  h/l", "switch between matches and sections"),
        entry("↑/↓  k/j", "move cursor"),
        entry("Space  Enter", "toggle streamed match / hidden section"),
        entry("x", "clear streamed matches"),
        entry("r", "re-read the tournament document"),
    ];
    f.render_widget(Paragraph::new(lines).block(block), area);
}

fn draw_logs(f: &mut Frame, area: Rect) {
    let logs = TuiLoggerWidget::default()
        .block(default_border(Color::DarkGray).title(" Logs "))
        .style_error(Style::default().fg(Color::Red))
        .style_warn(Style::default().fg(Color::Yellow))
        .style_info(Style::default().fg(Color::White))
        .style_debug(Style::default().fg(Color::Gray));
    f.render_widget(logs, area);
}

fn draw_loading_spinner(f: &mut Frame, area: Rect, app: &App, loading: LoadingState) {
    if !loading.is_loading && loading.spinner_char != ERROR_CHAR {
        return;
    }
    let style = match loading.spinner_char {
        ERROR_CHAR => Style::default().fg(Color::Red),
        _ => Style::default().fg(Color::White),
    };
    let spinner = Paragraph::new(loading.spinner_char.to_string())
        .alignment(Alignment::Right)
        .style(style);
    let area = if app.settings.full_screen {
        Rect::new(area.width.saturating_sub(3), area.height.saturating_sub(2), 1, 1)
    } else {
        Rect::new(area.width.saturating_sub(11), 1, 1, 1)
    };
    f.render_widget(spinner, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn epoch_timestamps_render_as_dash() {
        assert_eq!(format_timestamp(DateTime::<Utc>::default()), "-");
        let ts = Utc.with_ymd_and_hms(2025, 3, 14, 18, 30, 0).unwrap();
        assert_ne!(format_timestamp(ts), "-");
    }

    #[test]
    fn series_prefers_current_round_then_first_undecided() {
        let decided = Round { round_name: "semiFinal1".into(), team1_wins: 5, ..Default::default() };
        let open = Round { round_name: "semiFinal2".into(), team1_wins: 2, ..Default::default() };
        let mut snapshot = TournamentSnapshot {
            rounds: vec![decided, open, Round { round_name: "final".into(), ..Default::default() }],
            ..Default::default()
        };
        assert_eq!(series_round(&snapshot).map(|r| r.round_name.as_str()), Some("semiFinal2"));

        snapshot.current_round = "final".into();
        assert_eq!(series_round(&snapshot).map(|r| r.round_name.as_str()), Some("final"));
    }

    #[test]
    fn ranking_lines_number_columns_by_parity() {
        let player = |name: &str| RankedPlayer { name: name.into(), team_name: "T".into(), score: 50 };
        let right = ranking_lines(&[player("b"), player("d")], 2);
        let text: Vec<String> = right
            .iter()
            .map(|l| l.spans.iter().map(|s| s.content.to_string()).collect())
            .collect();
        assert!(text[0].starts_with("  2. b"));
        assert!(text[1].starts_with("  4. d"));
    }
}
