mod ui;

use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    event::{KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{
    error::Error,
    io::{self, stdin},
    time::{Duration, Instant},
};

use tugmath::config::{Config, ConfigStore, FileConfigStore};
use tugmath::question::Difficulty;
use tugmath::runtime::{CrosstermEventSource, GameEvent, Runner};
use tugmath::score::{LeaderboardDb, MatchLog, ScoreEntry, ScoreSink};
use tugmath::session::{
    MatchEvent, MatchResult, MatchSession, Mode, Side, TARGET_MAX, TARGET_MIN,
};

const TICK_RATE_MS: u64 = 100;
const MAX_NAME_LEN: usize = 10;
const BOARD_SIZE: usize = 10;

/// math tug-of-war quiz for the terminal
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A math tug-of-war quiz TUI: answer arithmetic, fraction, and root problems faster than your opponent (or the bot) to pull the rope past the target line."
)]
pub struct Cli {
    /// game mode
    #[clap(short = 'm', long, value_enum)]
    mode: Option<Mode>,

    /// question difficulty
    #[clap(short = 'd', long, value_enum)]
    difficulty: Option<Difficulty>,

    /// pulls needed to win (3-20)
    #[clap(short = 't', long)]
    target: Option<i32>,

    /// seconds per question
    #[clap(short = 's', long)]
    round_secs: Option<u64>,

    /// your display name (left side)
    #[clap(short = 'n', long)]
    name: Option<String>,

    /// print the leaderboard for the selected mode/difficulty and exit
    #[clap(long)]
    list_scores: bool,
}

impl Cli {
    fn apply_to(&self, config: &mut Config) {
        if let Some(mode) = self.mode {
            config.mode = mode;
        }
        if let Some(difficulty) = self.difficulty {
            config.difficulty = difficulty;
        }
        if let Some(target) = self.target {
            config.target = target.clamp(TARGET_MIN, TARGET_MAX);
        }
        if let Some(secs) = self.round_secs {
            config.round_secs = secs.max(1);
        }
        if let Some(name) = &self.name {
            config.left_name = name.trim().to_uppercase();
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Screen {
    Menu,
    NameEntry,
    Playing,
    Leaderboard,
    GameOver,
}

#[derive(Debug, Default)]
pub struct NameEntryState {
    pub left: String,
    pub right: String,
    pub active: usize,
}

#[derive(Debug)]
pub struct BoardState {
    pub mode: Mode,
    pub difficulty: Difficulty,
    pub entries: Vec<ScoreEntry>,
}

pub struct App {
    pub screen: Screen,
    pub config: Config,
    pub session: Option<MatchSession>,
    pub name_entry: NameEntryState,
    pub board: BoardState,
    pub last_result: Option<MatchResult>,
    pub now: Instant,
    leaderboard: Option<LeaderboardDb>,
    match_log: Option<MatchLog>,
    config_store: FileConfigStore,
}

impl App {
    pub fn new(config: Config, config_store: FileConfigStore) -> Self {
        let board = BoardState {
            mode: config.mode,
            difficulty: config.difficulty,
            entries: Vec::new(),
        };
        Self {
            screen: Screen::Menu,
            config,
            session: None,
            name_entry: NameEntryState::default(),
            board,
            last_result: None,
            now: Instant::now(),
            leaderboard: LeaderboardDb::new().ok(),
            match_log: MatchLog::new(),
            config_store,
        }
    }

    fn start_match(&mut self) {
        let _ = self.config_store.save(&self.config);
        let session_config = self.config.to_session_config();
        self.session = Some(MatchSession::new(session_config, Instant::now()));
        self.last_result = None;
        self.screen = Screen::Playing;
    }

    fn abandon_match(&mut self) {
        // Returning to the menu discards the session wholesale
        self.session = None;
        self.screen = Screen::Menu;
    }

    fn reload_board(&mut self) {
        self.board.entries = self
            .leaderboard
            .as_ref()
            .and_then(|db| {
                db.top_scores(self.board.mode, self.board.difficulty, BOARD_SIZE)
                    .ok()
            })
            .unwrap_or_default();
    }

    fn show_leaderboard(&mut self) {
        self.board.mode = self.config.mode;
        self.board.difficulty = self.config.difficulty;
        self.reload_board();
        self.screen = Screen::Leaderboard;
    }

    /// Persist a finished match to every sink. Storage failures never
    /// touch session state.
    fn record_result(&mut self, result: &MatchResult) {
        if let Some(db) = self.leaderboard.as_mut() {
            let _ = db.record(result);
        }
        if let Some(log) = self.match_log.as_mut() {
            let _ = log.record(result);
        }
        self.last_result = Some(result.clone());
    }

    fn drain_session_events(&mut self) {
        let events = match self.session.as_mut() {
            Some(session) => session.drain_events(),
            None => return,
        };
        for event in events {
            if let MatchEvent::MatchEnded(result) = event {
                self.record_result(&result);
                self.screen = Screen::GameOver;
            }
        }
    }
}

fn cycle_difficulty(difficulty: Difficulty) -> Difficulty {
    match difficulty {
        Difficulty::Easy => Difficulty::Mid,
        Difficulty::Mid => Difficulty::Hard,
        Difficulty::Hard => Difficulty::Easy,
    }
}

fn toggle_mode(mode: Mode) -> Mode {
    match mode {
        Mode::PvP => Mode::PvBot,
        Mode::PvBot => Mode::PvP,
    }
}

/// Right-hand player keymap for PvP: a numpad laid over the top letter
/// row, with k/l standing in for the decimal point and fraction bar.
fn right_side_char(c: char) -> Option<char> {
    match c {
        'q' => Some('1'),
        'w' => Some('2'),
        'e' => Some('3'),
        'r' => Some('4'),
        't' => Some('5'),
        'y' => Some('6'),
        'u' => Some('7'),
        'i' => Some('8'),
        'o' => Some('9'),
        'p' => Some('0'),
        'k' => Some('.'),
        'l' => Some('/'),
        _ => None,
    }
}

fn print_scores(config: &Config) {
    let entries = LeaderboardDb::new()
        .ok()
        .and_then(|db| db.top_scores(config.mode, config.difficulty, BOARD_SIZE).ok())
        .unwrap_or_default();
    println!("{} / {}", config.mode, config.difficulty);
    if entries.is_empty() {
        println!("no scores yet");
        return;
    }
    for (i, entry) in entries.iter().enumerate() {
        println!(
            "{:>2}. {:<12} {:>8.2}s  {}",
            i + 1,
            entry.name,
            entry.elapsed_ms as f64 / 1000.0,
            entry.recorded_at.format("%Y-%m-%d %H:%M"),
        );
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    let config_store = FileConfigStore::new();
    let mut config = config_store.load();
    cli.apply_to(&mut config);

    if cli.list_scores {
        print_scores(&config);
        return Ok(());
    }

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(config, config_store);
    let runner = Runner::new(
        CrosstermEventSource::new(),
        Duration::from_millis(TICK_RATE_MS),
    );
    let res = run_app(&mut terminal, &mut app, &runner);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res
}

fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    runner: &Runner<CrosstermEventSource>,
) -> Result<(), Box<dyn Error>> {
    loop {
        app.now = Instant::now();
        terminal.draw(|f| f.render_widget(&*app, f.area()))?;

        match runner.step() {
            GameEvent::Tick => {
                app.now = Instant::now();
                if let Some(session) = app.session.as_mut() {
                    session.tick(app.now);
                }
                app.drain_session_events();
            }
            GameEvent::Resize => {}
            GameEvent::Key(key) => {
                if key.modifiers.contains(KeyModifiers::CONTROL)
                    && key.code == KeyCode::Char('c')
                {
                    break;
                }
                let quit = handle_key(app, key);
                app.drain_session_events();
                if quit {
                    break;
                }
            }
        }
    }
    Ok(())
}

/// Returns true when the app should exit.
fn handle_key(app: &mut App, key: KeyEvent) -> bool {
    match app.screen {
        Screen::Menu => handle_menu_key(app, key),
        Screen::NameEntry => handle_name_entry_key(app, key),
        Screen::Playing => handle_match_key(app, key),
        Screen::Leaderboard => handle_leaderboard_key(app, key),
        Screen::GameOver => handle_game_over_key(app, key),
    }
}

fn handle_menu_key(app: &mut App, key: KeyEvent) -> bool {
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') => return true,
        KeyCode::Char('m') => app.config.mode = toggle_mode(app.config.mode),
        KeyCode::Char('d') => app.config.difficulty = cycle_difficulty(app.config.difficulty),
        KeyCode::Char('+') | KeyCode::Char('=') => {
            app.config.target = (app.config.target + 1).clamp(TARGET_MIN, TARGET_MAX);
        }
        KeyCode::Char('-') => {
            app.config.target = (app.config.target - 1).clamp(TARGET_MIN, TARGET_MAX);
        }
        KeyCode::Char('l') => app.show_leaderboard(),
        KeyCode::Enter => match app.config.mode {
            Mode::PvP => {
                app.name_entry = NameEntryState::default();
                app.screen = Screen::NameEntry;
            }
            Mode::PvBot => {
                app.config.right_name = "BOT".to_string();
                app.start_match();
            }
        },
        _ => {}
    }
    false
}

fn handle_name_entry_key(app: &mut App, key: KeyEvent) -> bool {
    match key.code {
        KeyCode::Esc => app.screen = Screen::Menu,
        KeyCode::Tab => app.name_entry.active = 1 - app.name_entry.active,
        KeyCode::Backspace => {
            let field = active_name_field(app);
            field.pop();
        }
        KeyCode::Enter => {
            if app.name_entry.active == 0 {
                app.name_entry.active = 1;
            } else {
                let left = app.name_entry.left.trim().to_string();
                let right = app.name_entry.right.trim().to_string();
                app.config.left_name = if left.is_empty() {
                    "PLAYER 1".to_string()
                } else {
                    left
                };
                app.config.right_name = if right.is_empty() {
                    "PLAYER 2".to_string()
                } else {
                    right
                };
                app.start_match();
            }
        }
        KeyCode::Char(c) if c.is_alphanumeric() || c == ' ' => {
            let field = active_name_field(app);
            if field.len() < MAX_NAME_LEN {
                field.extend(c.to_uppercase());
            }
        }
        _ => {}
    }
    false
}

fn active_name_field(app: &mut App) -> &mut String {
    if app.name_entry.active == 0 {
        &mut app.name_entry.left
    } else {
        &mut app.name_entry.right
    }
}

fn handle_match_key(app: &mut App, key: KeyEvent) -> bool {
    let now = Instant::now();
    let pvp = app.config.mode == Mode::PvP;
    let Some(session) = app.session.as_mut() else {
        app.screen = Screen::Menu;
        return false;
    };
    match key.code {
        KeyCode::Esc => app.abandon_match(),
        KeyCode::Tab => session.toggle_pause(now),
        KeyCode::F(5) => session.reset(now),
        KeyCode::Char('+') | KeyCode::Char('=') => session.adjust_target(1, now),
        KeyCode::Char('-') => session.adjust_target(-1, now),
        KeyCode::Enter => session.submit(Side::Left, now),
        KeyCode::Backspace => session.backspace(Side::Left),
        KeyCode::Delete => session.clear_input(Side::Left),
        // Right-side keymap only applies when a human sits there
        KeyCode::Char(' ') if pvp => session.submit(Side::Right, now),
        KeyCode::Char('j') if pvp => session.clear_input(Side::Right),
        KeyCode::Char('h') if pvp => session.backspace(Side::Right),
        KeyCode::Char(c @ ('0'..='9' | '.' | '/')) => session.input_char(Side::Left, c),
        KeyCode::Char(c) if pvp => {
            if let Some(mapped) = right_side_char(c) {
                session.input_char(Side::Right, mapped);
            }
        }
        _ => {}
    }
    false
}

fn handle_leaderboard_key(app: &mut App, key: KeyEvent) -> bool {
    match key.code {
        KeyCode::Esc => app.screen = Screen::Menu,
        KeyCode::Char('m') => {
            app.board.mode = toggle_mode(app.board.mode);
            app.reload_board();
        }
        KeyCode::Char('d') => {
            app.board.difficulty = cycle_difficulty(app.board.difficulty);
            app.reload_board();
        }
        _ => {}
    }
    false
}

fn handle_game_over_key(app: &mut App, key: KeyEvent) -> bool {
    match key.code {
        KeyCode::Esc => return true,
        KeyCode::Enter => {
            app.session = None;
            app.screen = Screen::Menu;
        }
        KeyCode::Char('l') => app.show_leaderboard(),
        _ => {}
    }
    false
}
