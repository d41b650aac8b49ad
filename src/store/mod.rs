//! SQLite-backed conversation history.
//!
//! One durable table of turns keyed by session id. Insertion order is the
//! chronology; the autoincrement id doubles as the sequence number.

use std::path::Path;
use std::sync::{Arc, Mutex};

use rusqlite::{params, Connection};

use crate::models::{Role, Turn};

pub type StoreResult<T> = Result<T, rusqlite::Error>;

/// Shared handle to the turn log.
///
/// Create one store at startup and clone the handle wherever history access
/// is needed. Every operation is a single statement, so concurrent requests
/// interleave at statement granularity and nothing spans the upstream call.
#[derive(Clone)]
pub struct HistoryStore {
    conn: Arc<Mutex<Connection>>,
}

impl HistoryStore {
    /// Open or create the history database at the given path.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        Self::from_connection(Connection::open(path)?)
    }

    /// In-memory database, for tests.
    pub fn open_in_memory() -> StoreResult<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> StoreResult<Self> {
        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> StoreResult<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS turns (
                id         INTEGER PRIMARY KEY AUTOINCREMENT,
                session_id TEXT NOT NULL,
                role       TEXT NOT NULL CHECK(role IN ('user', 'model')),
                content    TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_turns_session ON turns(session_id, id);
            "#,
        )?;
        Ok(())
    }

    /// Append one turn. The insert commits before this returns, so the turn
    /// survives a process restart.
    pub fn append(&self, session_id: &str, role: Role, content: &str) -> StoreResult<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO turns (session_id, role, content) VALUES (?1, ?2, ?3)",
            params![session_id, role.as_str(), content],
        )?;
        Ok(())
    }

    /// The latest `limit` turns for a session, oldest-first.
    ///
    /// The model API wants history in chronological order while the cheap
    /// query shape is newest-N, so the window is selected descending and
    /// reversed here. The cap lives in the SQL LIMIT; at most `limit` rows
    /// ever leave the database.
    pub fn load_recent(&self, session_id: &str, limit: usize) -> StoreResult<Vec<Turn>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT role, content FROM turns WHERE session_id = ?1 ORDER BY id DESC LIMIT ?2",
        )?;
        let mut turns = stmt
            .query_map(params![session_id, limit as i64], |row| {
                let role_text: String = row.get(0)?;
                let role = Role::from_str(&role_text).ok_or_else(|| {
                    rusqlite::Error::FromSqlConversionFailure(
                        0,
                        rusqlite::types::Type::Text,
                        format!("unknown role {role_text:?}").into(),
                    )
                })?;
                Ok(Turn {
                    role,
                    content: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        turns.reverse();
        Ok(turns)
    }

    /// Delete every turn belonging to a session. Clearing an unknown or
    /// already-empty session succeeds with no effect.
    pub fn clear(&self, session_id: &str) -> StoreResult<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "DELETE FROM turns WHERE session_id = ?1",
            params![session_id],
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exchange(store: &HistoryStore, session: &str, n: usize) {
        for i in 0..n {
            store
                .append(session, Role::User, &format!("question {i}"))
                .unwrap();
            store
                .append(session, Role::Model, &format!("answer {i}"))
                .unwrap();
        }
    }

    #[test]
    fn load_recent_returns_min_of_stored_and_limit() {
        let store = HistoryStore::open_in_memory().unwrap();

        exchange(&store, "s1", 3);
        assert_eq!(store.load_recent("s1", 10).unwrap().len(), 6);

        exchange(&store, "s1", 4);
        let turns = store.load_recent("s1", 10).unwrap();
        assert_eq!(turns.len(), 10);
    }

    #[test]
    fn window_is_chronological_and_ends_with_newest() {
        let store = HistoryStore::open_in_memory().unwrap();
        exchange(&store, "s1", 7);

        let turns = store.load_recent("s1", 4).unwrap();
        assert_eq!(
            turns,
            vec![
                Turn::new(Role::User, "question 5"),
                Turn::new(Role::Model, "answer 5"),
                Turn::new(Role::User, "question 6"),
                Turn::new(Role::Model, "answer 6"),
            ]
        );
    }

    #[test]
    fn sessions_do_not_leak_into_each_other() {
        let store = HistoryStore::open_in_memory().unwrap();
        exchange(&store, "s1", 2);
        exchange(&store, "s2", 1);

        assert_eq!(store.load_recent("s1", 10).unwrap().len(), 4);
        assert_eq!(store.load_recent("s2", 10).unwrap().len(), 2);
    }

    #[test]
    fn clear_removes_all_turns_and_is_idempotent() {
        let store = HistoryStore::open_in_memory().unwrap();
        exchange(&store, "s1", 3);

        store.clear("s1").unwrap();
        assert!(store.load_recent("s1", 10).unwrap().is_empty());

        // Clearing again, or clearing a session that never existed, is fine.
        store.clear("s1").unwrap();
        store.clear("nope").unwrap();
    }

    #[test]
    fn turns_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.db");

        {
            let store = HistoryStore::open(&path).unwrap();
            exchange(&store, "s1", 1);
        }

        let store = HistoryStore::open(&path).unwrap();
        let turns = store.load_recent("s1", 10).unwrap();
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[0], Turn::new(Role::User, "question 0"));
    }
}
