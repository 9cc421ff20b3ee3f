use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget, Wrap},
};
use time_humanize::{Accuracy, HumanTime, Tense};
use tugmath::question::Difficulty;
use tugmath::score::ScoreEntry;
use tugmath::session::{MatchSession, Mode, Phase, Side};
use unicode_width::UnicodeWidthStr;

use crate::{App, Screen};

const HORIZONTAL_MARGIN: u16 = 4;
const VERTICAL_MARGIN: u16 = 1;

const LEFT_COLOR: Color = Color::Cyan;
const RIGHT_COLOR: Color = Color::Red;

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        match &self.screen {
            Screen::Menu => render_menu(self, area, buf),
            Screen::NameEntry => render_name_entry(self, area, buf),
            Screen::Playing => {
                if let Some(session) = &self.session {
                    render_match(self, session, area, buf);
                }
            }
            Screen::Leaderboard => render_leaderboard(self, area, buf),
            Screen::GameOver => render_game_over(self, area, buf),
        }
    }
}

fn bold() -> Style {
    Style::default().add_modifier(Modifier::BOLD)
}

fn dim() -> Style {
    Style::default().add_modifier(Modifier::DIM)
}

fn selected_style() -> Style {
    bold().fg(Color::Yellow)
}

fn render_menu(app: &App, area: Rect, buf: &mut Buffer) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(2),
            Constraint::Length(2),
            Constraint::Length(2),
            Constraint::Length(2),
            Constraint::Min(1),
        ])
        .split(area);

    Paragraph::new(Span::styled("MATH TUG WAR", bold().fg(Color::Yellow)))
        .alignment(Alignment::Center)
        .render(chunks[0], buf);

    let mode_spans = vec![
        Span::styled("mode    ", dim()),
        pick_span("Player vs Player", app.config.mode == Mode::PvP),
        Span::raw("   "),
        pick_span("Player vs BOT", app.config.mode == Mode::PvBot),
    ];
    Paragraph::new(Line::from(mode_spans))
        .alignment(Alignment::Center)
        .render(chunks[1], buf);

    let diff_spans = vec![
        Span::styled("tier    ", dim()),
        pick_span("EASY", app.config.difficulty == Difficulty::Easy),
        Span::raw("   "),
        pick_span("MEDIUM", app.config.difficulty == Difficulty::Mid),
        Span::raw("   "),
        pick_span("HARD", app.config.difficulty == Difficulty::Hard),
    ];
    Paragraph::new(Line::from(diff_spans))
        .alignment(Alignment::Center)
        .render(chunks[2], buf);

    Paragraph::new(Line::from(vec![
        Span::styled("target  ", dim()),
        Span::styled(format!("{} pulls", app.config.target), bold()),
        Span::styled(format!("   round {}s", app.config.round_secs), dim()),
    ]))
    .alignment(Alignment::Center)
    .render(chunks[3], buf);

    Paragraph::new(Span::styled(
        "(m)ode  (d)ifficulty  (+/-) target  (enter) start  (l)eaderboard  (esc) quit",
        dim(),
    ))
    .alignment(Alignment::Center)
    .render(chunks[4], buf);
}

fn pick_span(label: &str, selected: bool) -> Span<'_> {
    if selected {
        Span::styled(format!("[{}]", label), selected_style())
    } else {
        Span::styled(format!(" {} ", label), dim())
    }
}

fn render_name_entry(app: &App, area: Rect, buf: &mut Buffer) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(2),
            Constraint::Length(2),
            Constraint::Min(1),
        ])
        .split(area);

    Paragraph::new(Span::styled("ENTER NAMES", bold()))
        .alignment(Alignment::Center)
        .render(chunks[0], buf);

    let field = |label: &str, value: &str, active: bool| {
        let cursor = if active { "_" } else { "" };
        Line::from(vec![
            Span::styled(format!("{:<10}", label), dim()),
            Span::styled(
                format!("{}{}", value, cursor),
                if active { selected_style() } else { bold() },
            ),
        ])
    };
    Paragraph::new(field("PLAYER 1", &app.name_entry.left, app.name_entry.active == 0))
        .alignment(Alignment::Center)
        .render(chunks[1], buf);
    Paragraph::new(field("PLAYER 2", &app.name_entry.right, app.name_entry.active == 1))
        .alignment(Alignment::Center)
        .render(chunks[2], buf);

    Paragraph::new(Span::styled(
        "(tab) switch  (enter) go  (esc) back",
        dim(),
    ))
    .alignment(Alignment::Center)
    .render(chunks[3], buf);
}

fn render_match(app: &App, session: &MatchSession, area: Rect, buf: &mut Buffer) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Length(2), // names + score
            Constraint::Length(2), // round timer
            Constraint::Length(2), // question prompt
            Constraint::Length(3), // rope gauge
            Constraint::Length(2), // input buffers
            Constraint::Min(1),    // status / help line
        ])
        .split(area);

    let left = session.player(Side::Left);
    let right = session.player(Side::Right);

    // Names with the running score between them
    let mut header = vec![
        Span::styled(&left.name, bold().fg(LEFT_COLOR)),
        Span::raw("  "),
        Span::styled(
            format!("{} - {}", left.correct_count, right.correct_count),
            bold(),
        ),
        Span::raw("  "),
        Span::styled(&right.name, bold().fg(RIGHT_COLOR)),
    ];
    if session.is_paused() {
        header.push(Span::styled("   ⏸ PAUSED", bold().fg(Color::Yellow)));
    }
    Paragraph::new(Line::from(header))
        .alignment(Alignment::Center)
        .render(chunks[0], buf);

    match session.phase() {
        Phase::Countdown => {
            let secs = session.countdown_remaining(app.now).as_secs_f64();
            let text = if secs > 0.5 {
                format!("{}", secs.ceil() as u64)
            } else {
                "GO!".to_string()
            };
            Paragraph::new(Span::styled(text, bold().fg(Color::Green)))
                .alignment(Alignment::Center)
                .render(chunks[2], buf);
        }
        Phase::Active => {
            let remaining = session.remaining_round_time(app.now).as_secs();
            let timer_style = if remaining <= 5 {
                bold().fg(RIGHT_COLOR)
            } else {
                dim()
            };
            Paragraph::new(Span::styled(format!("time {}s", remaining), timer_style))
                .alignment(Alignment::Center)
                .render(chunks[1], buf);

            // Center while the prompt fits on one line
            let fits = session.prompt().width() < chunks[2].width as usize;
            Paragraph::new(Span::styled(session.prompt().to_string(), bold()))
                .alignment(if fits {
                    Alignment::Center
                } else {
                    Alignment::Left
                })
                .wrap(Wrap { trim: true })
                .render(chunks[2], buf);

            let buffers = Line::from(vec![
                Span::styled(
                    format!("{:<8}", pad_buffer(&left.buffer)),
                    bold().fg(LEFT_COLOR),
                ),
                Span::styled("        ", dim()),
                Span::styled(
                    format!("{:>8}", pad_buffer(&right.buffer)),
                    bold().fg(RIGHT_COLOR),
                ),
            ]);
            Paragraph::new(buffers)
                .alignment(Alignment::Center)
                .render(chunks[4], buf);

            Paragraph::new(Span::styled(
                "left: 0-9 . /  (enter) submit  (del) clear   right: qwertyuiop k l  (space) submit  (j) clear   (tab) pause  (+/-) target  (f5) reset",
                dim(),
            ))
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .render(chunks[5], buf);
        }
        Phase::Over => {
            let winner = session.winner_name().unwrap_or("NOBODY");
            Paragraph::new(Span::styled(
                format!("{} WINS!", winner),
                bold().fg(Color::Green),
            ))
            .alignment(Alignment::Center)
            .render(chunks[2], buf);
        }
    }

    render_rope(session, chunks[3], buf);
}

fn pad_buffer(buffer: &str) -> String {
    if buffer.is_empty() {
        "·".to_string()
    } else {
        buffer.to_string()
    }
}

/// One cell per rope unit between the two target lines, marker at the
/// current position. Left pull is negative, shown toward the left edge.
fn render_rope(session: &MatchSession, area: Rect, buf: &mut Buffer) {
    let target = session.target();
    let position = session.position().clamp(-target, target);
    let mut spans: Vec<Span> = Vec::with_capacity((2 * target + 3) as usize);
    spans.push(Span::styled("⟦", bold().fg(LEFT_COLOR)));
    for cell in -target..=target {
        if cell == position {
            spans.push(Span::styled("●", bold().fg(Color::Yellow)));
        } else if cell == 0 {
            spans.push(Span::styled("┼", dim()));
        } else {
            spans.push(Span::styled("─", dim()));
        }
    }
    spans.push(Span::styled("⟧", bold().fg(RIGHT_COLOR)));
    Paragraph::new(Line::from(spans))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::NONE))
        .render(area, buf);
}

fn render_leaderboard(app: &App, area: Rect, buf: &mut Buffer) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Length(2),
            Constraint::Length(1),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .split(area);

    Paragraph::new(Line::from(vec![
        Span::styled("LEADERBOARD  ", bold()),
        Span::styled(
            format!("{} / {}", app.board.mode, app.board.difficulty),
            selected_style(),
        ),
    ]))
    .alignment(Alignment::Center)
    .render(chunks[0], buf);

    Paragraph::new(Span::styled(
        format!(
            "{:<4} {:<12} {:>9}  {:<16} {}",
            "#", "NAME", "TIME", "WHEN", "WINNER"
        ),
        dim(),
    ))
    .alignment(Alignment::Left)
    .render(chunks[1], buf);

    let lines: Vec<Line> = if app.board.entries.is_empty() {
        vec![Line::from(Span::styled("NO SCORES YET", dim()))]
    } else {
        app.board
            .entries
            .iter()
            .enumerate()
            .map(|(i, entry)| score_line(i, entry))
            .collect()
    };
    Paragraph::new(lines)
        .alignment(Alignment::Left)
        .render(chunks[2], buf);

    Paragraph::new(Span::styled(
        "(m)ode  (d)ifficulty  (esc) back",
        dim(),
    ))
    .alignment(Alignment::Center)
    .render(chunks[3], buf);
}

fn score_line(rank: usize, entry: &ScoreEntry) -> Line<'_> {
    let age_secs = (chrono::Local::now() - entry.recorded_at)
        .num_seconds()
        .max(0) as u64;
    let when = HumanTime::from(std::time::Duration::from_secs(age_secs))
        .to_text_en(Accuracy::Rough, Tense::Past);
    // PvP boards carry both participants; the winner's own row gets color
    let name_style = if entry.name == entry.winner_name {
        bold().fg(Color::Green)
    } else {
        bold()
    };
    Line::from(vec![
        Span::styled(format!("{:<4}", rank + 1), dim()),
        Span::styled(format!("{:<12}", entry.name), name_style),
        Span::raw(format!(
            "{:>8.2}s  {:<16} ",
            entry.elapsed_ms as f64 / 1000.0,
            when
        )),
        Span::styled(&entry.winner_name, bold().fg(LEFT_COLOR)),
    ])
}

fn render_game_over(app: &App, area: Rect, buf: &mut Buffer) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(2),
            Constraint::Length(2),
            Constraint::Min(1),
        ])
        .split(area);

    let Some(result) = &app.last_result else {
        return;
    };

    Paragraph::new(Span::styled(
        format!("{} WINS THE TUG OF WAR!", result.winner_name),
        bold().fg(Color::Green),
    ))
    .alignment(Alignment::Center)
    .render(chunks[0], buf);

    Paragraph::new(Span::styled(
        format!(
            "{} {} - {} {}   ({:.2}s, {} {})",
            result.left_name,
            result.left_correct,
            result.right_correct,
            result.right_name,
            result.elapsed_ms as f64 / 1000.0,
            result.mode,
            result.difficulty,
        ),
        bold(),
    ))
    .alignment(Alignment::Center)
    .render(chunks[1], buf);

    Paragraph::new(Span::styled(
        "(enter) main menu  (l)eaderboard  (esc) quit",
        dim(),
    ))
    .alignment(Alignment::Center)
    .render(chunks[2], buf);
}
