use std::path::{Path, PathBuf};

use log::warn;
use rusqlite::{Connection, OptionalExtension, params};

const BEST_SCORE_KEY: &str = "best_score";

/// Summary for a completed game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub score: u64,
    pub highest_tile: u32,
    pub steps: u64,
}

/// Best-score persistence consumed by the session.
///
/// Implementations tolerate missing or unreadable prior data (loads as 0)
/// and report write failures without interrupting a move in progress.
pub trait ScorePersistence {
    fn load_best(&mut self) -> u64;
    fn save_best(&mut self, best: u64);
    fn record_run(&mut self, run: RunSummary);
    /// Finished games, newest first.
    fn recent_runs(&mut self, limit: usize) -> Vec<RunSummary>;
}

/// SQLite-backed score store: `scores.db` with a `meta` key/value table
/// (holding `best_score`) and a `runs` history table.
pub struct ScoreStore {
    data_dir: PathBuf,
    conn: Connection,
}

impl ScoreStore {
    /// Create or open the store under `dir`, ensure schema exists.
    pub fn new<P: AsRef<Path>>(dir: P) -> Result<Self, rusqlite::Error> {
        let data_dir = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&data_dir)
            .map_err(|_e| rusqlite::Error::ExecuteReturnedResults)?;
        let db_path = data_dir.join("scores.db");
        let conn = Connection::open(db_path)?;
        conn.pragma_update(None, "journal_mode", &"WAL")?;
        conn.pragma_update(None, "synchronous", &"NORMAL")?;
        // Create schema if missing
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS meta (
                meta_key TEXT PRIMARY KEY,
                meta_value TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS runs (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                score INT NOT NULL,
                highest_tile INT NOT NULL,
                steps INT NOT NULL
            );
            "#,
        )?;
        Ok(Self { data_dir, conn })
    }

    /// Read the persisted best score; `None` if never saved or unparseable.
    pub fn read_best(&self) -> Result<Option<u64>, rusqlite::Error> {
        let value = self
            .conn
            .query_row(
                "SELECT meta_value FROM meta WHERE meta_key = ?1",
                params![BEST_SCORE_KEY],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value.and_then(|v| v.parse().ok()))
    }

    /// Insert or update the persisted best score.
    pub fn write_best(&mut self, best: u64) -> Result<(), rusqlite::Error> {
        self.conn.execute(
            "INSERT INTO meta (meta_key, meta_value) VALUES (?1, ?2)
             ON CONFLICT(meta_key) DO UPDATE SET meta_value=excluded.meta_value",
            params![BEST_SCORE_KEY, best.to_string()],
        )?;
        Ok(())
    }

    /// Append a finished game to the history.
    pub fn insert_run(&mut self, run: RunSummary) -> Result<(), rusqlite::Error> {
        self.conn.execute(
            "INSERT INTO runs (score, highest_tile, steps) VALUES (?1, ?2, ?3)",
            params![run.score as i64, run.highest_tile as i64, run.steps as i64],
        )?;
        Ok(())
    }

    /// Fetch up to `limit` finished games, newest first.
    pub fn read_recent_runs(&self, limit: usize) -> Result<Vec<RunSummary>, rusqlite::Error> {
        let mut stmt = self.conn.prepare(
            "SELECT score, highest_tile, steps FROM runs ORDER BY id DESC LIMIT ?1",
        )?;
        let rows = stmt.query_map(params![limit as i64], |row| {
            Ok(RunSummary {
                score: row.get::<_, i64>(0)? as u64,
                highest_tile: row.get::<_, i64>(1)? as u32,
                steps: row.get::<_, i64>(2)? as u64,
            })
        })?;
        rows.collect()
    }

    /// Absolute path to the data directory.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}

impl ScorePersistence for ScoreStore {
    fn load_best(&mut self) -> u64 {
        match self.read_best() {
            Ok(Some(best)) => best,
            Ok(None) => 0,
            Err(err) => {
                warn!("failed to read best score ({err}); starting from 0");
                0
            }
        }
    }

    fn save_best(&mut self, best: u64) {
        if let Err(err) = self.write_best(best) {
            warn!("failed to persist best score {best}: {err}");
        }
    }

    fn record_run(&mut self, run: RunSummary) {
        if let Err(err) = self.insert_run(run) {
            warn!("failed to record finished game: {err}");
        }
    }

    fn recent_runs(&mut self, limit: usize) -> Vec<RunSummary> {
        match self.read_recent_runs(limit) {
            Ok(runs) => runs,
            Err(err) => {
                warn!("failed to read game history: {err}");
                Vec::new()
            }
        }
    }
}

/// In-process store: used by tests and as the fallback when the database
/// cannot be opened. Nothing survives the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    best: u64,
    runs: Vec<RunSummary>,
}

impl ScorePersistence for MemoryStore {
    fn load_best(&mut self) -> u64 {
        self.best
    }

    fn save_best(&mut self, best: u64) {
        self.best = best;
    }

    fn record_run(&mut self, run: RunSummary) {
        self.runs.push(run);
    }

    fn recent_runs(&mut self, limit: usize) -> Vec<RunSummary> {
        self.runs.iter().rev().take(limit).copied().collect()
    }
}
