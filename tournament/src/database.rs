// ═══════════════════════════════════════════════════════════════════════
// Database — SQLite storage for tournament results and ELO ratings
// ═══════════════════════════════════════════════════════════════════════

use crate::runner::GameResult;
use rusqlite::{params, Connection, Result};

/// K-factor for rating updates.
pub const ELO_K: f64 = 32.0;

/// One leaderboard row.
#[derive(Debug, Clone, PartialEq)]
pub struct Standing {
    pub name: String,
    pub elo: f64,
    pub games: u32,
    pub wins: u32,
    pub average_score: f64,
}

pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open (or create) a database at the given path.
    pub fn new(path: &str) -> Result<Self> {
        let db = Database { conn: Connection::open(path)? };
        db.create_schema()?;
        Ok(db)
    }

    /// In-memory database (useful for tests).
    pub fn in_memory() -> Result<Self> {
        let db = Database { conn: Connection::open_in_memory()? };
        db.create_schema()?;
        Ok(db)
    }

    fn create_schema(&self) -> Result<()> {
        self.conn.execute_batch("
            CREATE TABLE IF NOT EXISTS agents (
                id          INTEGER PRIMARY KEY,
                name        TEXT NOT NULL UNIQUE,
                elo         REAL NOT NULL DEFAULT 1500.0,
                games       INTEGER NOT NULL DEFAULT 0,
                wins        INTEGER NOT NULL DEFAULT 0
            );

            CREATE TABLE IF NOT EXISTS games (
                id          INTEGER PRIMARY KEY,
                seed        INTEGER NOT NULL,
                players     INTEGER NOT NULL,
                winner_seat INTEGER NOT NULL,
                played_at   TEXT NOT NULL DEFAULT (datetime('now'))
            );

            CREATE TABLE IF NOT EXISTS scores (
                id          INTEGER PRIMARY KEY,
                game_id     INTEGER NOT NULL REFERENCES games(id),
                agent_id    INTEGER NOT NULL REFERENCES agents(id),
                seat        INTEGER NOT NULL,
                wonder      TEXT NOT NULL,
                military    INTEGER NOT NULL,
                treasury    INTEGER NOT NULL,
                wonder_vp   INTEGER NOT NULL,
                civic       INTEGER NOT NULL,
                commerce    INTEGER NOT NULL,
                guilds      INTEGER NOT NULL,
                science     INTEGER NOT NULL,
                total       INTEGER NOT NULL,
                rank        INTEGER NOT NULL
            );
        ")
    }

    /// Register an agent (or return existing ID).
    pub fn register_agent(&self, name: &str) -> Result<i64> {
        register(&self.conn, name)
    }

    /// Store a completed game, its per-seat scores, and update agent
    /// stats and ratings, all in one transaction.
    pub fn store_game(&mut self, result: &GameResult) -> Result<i64> {
        let tx = self.conn.transaction()?;
        tx.execute(
            "INSERT INTO games (seed, players, winner_seat) VALUES (?1, ?2, ?3)",
            params![result.seed as i64, result.players.len() as i64, result.winner as i64],
        )?;
        let game_id = tx.last_insert_rowid();

        let mut winner_id = None;
        let mut loser_ids = Vec::new();
        for pr in &result.players {
            let agent_id = register(&tx, &pr.agent_name)?;
            let s = &pr.score;
            tx.execute(
                "INSERT INTO scores (game_id, agent_id, seat, wonder, military, treasury, wonder_vp,
                                     civic, commerce, guilds, science, total, rank)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
                params![
                    game_id,
                    agent_id,
                    pr.seat as i64,
                    pr.wonder,
                    s.military,
                    s.treasury,
                    s.wonder,
                    s.civic,
                    s.commerce,
                    s.guilds,
                    s.science,
                    s.total,
                    pr.rank as i64,
                ],
            )?;
            let won = pr.seat == result.winner;
            tx.execute(
                "UPDATE agents SET games = games + 1, wins = wins + ?1 WHERE id = ?2",
                params![won as i64, agent_id],
            )?;
            if won {
                winner_id = Some(agent_id);
            } else {
                loser_ids.push(agent_id);
            }
        }

        if let Some(winner_id) = winner_id {
            update_elo(&tx, winner_id, &loser_ids, ELO_K)?;
        }
        tx.commit()?;
        Ok(game_id)
    }

    /// Update ELO ratings for a set of agents after a game.
    pub fn update_elo(&self, winner_id: i64, loser_ids: &[i64], k: f64) -> Result<()> {
        update_elo(&self.conn, winner_id, loser_ids, k)
    }

    pub fn elo(&self, name: &str) -> Result<f64> {
        self.conn.query_row("SELECT elo FROM agents WHERE name = ?1", params![name], |row| row.get(0))
    }

    /// Get ELO leaderboard.
    pub fn leaderboard(&self) -> Result<Vec<Standing>> {
        let mut stmt = self.conn.prepare(
            "SELECT a.name, a.elo, a.games, a.wins, COALESCE(AVG(s.total), 0.0)
             FROM agents a LEFT JOIN scores s ON s.agent_id = a.id
             GROUP BY a.id
             ORDER BY a.elo DESC"
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(Standing {
                name: row.get(0)?,
                elo: row.get(1)?,
                games: row.get(2)?,
                wins: row.get(3)?,
                average_score: row.get(4)?,
            })
        })?;
        rows.collect()
    }

    /// Get total number of games stored.
    pub fn game_count(&self) -> Result<u32> {
        self.conn.query_row("SELECT COUNT(*) FROM games", [], |row| row.get(0))
    }
}

fn register(conn: &Connection, name: &str) -> Result<i64> {
    conn.execute("INSERT OR IGNORE INTO agents (name) VALUES (?1)", params![name])?;
    conn.query_row("SELECT id FROM agents WHERE name = ?1", params![name], |row| row.get(0))
}

/// Simple multiplayer ELO: the winner plays a pairwise match against
/// every other seat. Seats held by the winner's own agent are skipped.
fn update_elo(conn: &Connection, winner_id: i64, loser_ids: &[i64], k: f64) -> Result<()> {
    let elo_of = |id: i64| -> Result<f64> {
        conn.query_row("SELECT elo FROM agents WHERE id = ?1", params![id], |row| row.get(0))
    };

    for &loser_id in loser_ids.iter().filter(|&&id| id != winner_id) {
        let winner_elo = elo_of(winner_id)?;
        let loser_elo = elo_of(loser_id)?;

        let expected_winner = 1.0 / (1.0 + 10f64.powf((loser_elo - winner_elo) / 400.0));
        let expected_loser = 1.0 - expected_winner;

        let delta_w = k * (1.0 - expected_winner);
        let delta_l = k * (0.0 - expected_loser);

        conn.execute("UPDATE agents SET elo = elo + ?1 WHERE id = ?2", params![delta_w, winner_id])?;
        conn.execute("UPDATE agents SET elo = elo + ?1 WHERE id = ?2", params![delta_l, loser_id])?;
    }
    Ok(())
}
