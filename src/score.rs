use crate::question::Difficulty;
use crate::session::{MatchResult, Mode};
use chrono::{DateTime, Local};
use directories::ProjectDirs;
use rusqlite::{params, Connection, Result};
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Scoring collaborator seam: the session engine emits a `MatchResult`
/// once; anything implementing this decides how to persist it.
pub trait ScoreSink {
    fn record(&mut self, result: &MatchResult) -> io::Result<()>;
}

/// One leaderboard row as read back for display.
#[derive(Debug, Clone)]
pub struct ScoreEntry {
    pub name: String,
    pub winner_name: String,
    pub elapsed_ms: u64,
    pub recorded_at: DateTime<Local>,
}

/// SQLite-backed leaderboard under the state directory.
#[derive(Debug)]
pub struct LeaderboardDb {
    conn: Connection,
}

impl LeaderboardDb {
    pub fn new() -> Result<Self> {
        let db_path = Self::db_path().unwrap_or_else(|| PathBuf::from("tugmath_scores.db"));
        Self::open_at(&db_path)
    }

    pub fn open_at(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                rusqlite::Error::SqliteFailure(
                    rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_CANTOPEN),
                    Some(format!("Failed to create directory: {}", e)),
                )
            })?;
        }

        let conn = Connection::open(path)?;
        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS scores (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                mode TEXT NOT NULL,
                difficulty TEXT NOT NULL,
                elapsed_ms INTEGER NOT NULL,
                winner TEXT NOT NULL,
                recorded_at TEXT NOT NULL
            )
            "#,
            [],
        )?;
        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_scores_board ON scores(mode, difficulty, elapsed_ms)",
            [],
        )?;

        Ok(LeaderboardDb { conn })
    }

    /// Database file under $HOME/.local/state/tugmath
    fn db_path() -> Option<PathBuf> {
        if let Ok(home) = std::env::var("HOME") {
            let state_dir = PathBuf::from(home)
                .join(".local")
                .join("state")
                .join("tugmath");
            Some(state_dir.join("leaderboard.db"))
        } else if let Some(proj_dirs) = ProjectDirs::from("", "", "tugmath") {
            Some(proj_dirs.data_local_dir().join("leaderboard.db"))
        } else {
            None
        }
    }

    fn insert(
        &self,
        name: &str,
        mode: Mode,
        difficulty: Difficulty,
        elapsed_ms: u64,
        winner: &str,
    ) -> Result<()> {
        self.conn.execute(
            r#"
            INSERT INTO scores (name, mode, difficulty, elapsed_ms, winner, recorded_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                name,
                mode.to_string(),
                difficulty.to_string(),
                elapsed_ms,
                winner,
                Local::now().to_rfc3339(),
            ],
        )?;
        Ok(())
    }


    /// Fastest matches first; the board keeps the best `limit` per
    /// mode + difficulty combination.
    pub fn top_scores(
        &self,
        mode: Mode,
        difficulty: Difficulty,
        limit: usize,
    ) -> Result<Vec<ScoreEntry>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT name, winner, elapsed_ms, recorded_at
            FROM scores
            WHERE mode = ?1 AND difficulty = ?2
            ORDER BY elapsed_ms ASC
            LIMIT ?3
            "#,
        )?;

        let rows = stmt.query_map(
            params![mode.to_string(), difficulty.to_string(), limit as i64],
            |row| {
                let recorded_at_str: String = row.get(3)?;
                let recorded_at = DateTime::parse_from_rfc3339(&recorded_at_str)
                    .map_err(|_| {
                        rusqlite::Error::InvalidColumnType(
                            3,
                            "recorded_at".to_string(),
                            rusqlite::types::Type::Text,
                        )
                    })?
                    .with_timezone(&Local);
                Ok(ScoreEntry {
                    name: row.get(0)?,
                    winner_name: row.get(1)?,
                    elapsed_ms: row.get(2)?,
                    recorded_at,
                })
            },
        )?;

        let mut entries = Vec::new();
        for entry in rows {
            entries.push(entry?);
        }
        Ok(entries)
    }
}

impl ScoreSink for LeaderboardDb {
    /// PvP stores one row per participant sharing the winner column.
    /// The bot never makes the board: a PvBot win stores the human's row
    /// only, and a PvBot loss stores nothing. PvBot has no timeout
    /// nudges, so the rope total equals the count difference and the bot
    /// won exactly when it out-answered the human.
    fn record(&mut self, result: &MatchResult) -> io::Result<()> {
        let names: Vec<&str> = match result.mode {
            Mode::PvP => vec![&result.left_name, &result.right_name],
            Mode::PvBot if result.right_correct > result.left_correct => Vec::new(),
            Mode::PvBot => vec![&result.left_name],
        };
        for name in names {
            self.insert(
                name,
                result.mode,
                result.difficulty,
                result.elapsed_ms,
                &result.winner_name,
            )
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
        }
        Ok(())
    }
}

/// Append-only CSV log of every completed match, one line per match.
#[derive(Debug, Clone)]
pub struct MatchLog {
    path: PathBuf,
}

impl MatchLog {
    pub fn new() -> Option<Self> {
        let proj_dirs = ProjectDirs::from("", "", "tugmath")?;
        Some(Self {
            path: proj_dirs.config_dir().join("matches.csv"),
        })
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }
}

impl ScoreSink for MatchLog {
    fn record(&mut self, result: &MatchResult) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        // If the log doesn't exist yet, we need to emit a header
        let needs_header = !self.path.exists();

        let mut log_file = OpenOptions::new()
            .append(true)
            .create(true)
            .open(&self.path)?;

        if needs_header {
            writeln!(
                log_file,
                "date,mode,difficulty,left,right,winner,elapsed_secs,left_correct,right_correct"
            )?;
        }

        writeln!(
            log_file,
            "{},{},{},{},{},{},{:.2},{},{}",
            Local::now().format("%c"),
            result.mode,
            result.difficulty,
            result.left_name,
            result.right_name,
            result.winner_name,
            result.elapsed_ms as f64 / 1000.0,
            result.left_correct,
            result.right_correct,
        )?;

        Ok(())
    }
}
