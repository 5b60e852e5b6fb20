//! SQLite-backed key-value store.
//!
//! A local stand-in for the hosted service with the same contract:
//! per-player private key-value rows, login by installation id.
//! Requests execute eagerly and complete at the next poll, which
//! preserves the one-tick round trip the sync layer expects.

use super::{AccessScope, RemoteStore, RequestId, StorePoll, StoreResponse, TransportError};
use crate::error::GameResult;
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::HashMap;
use uuid::Uuid;

pub struct SqliteStore {
    conn: Connection,
    /// Player record of the last successful login; get/set require it.
    player_id: Option<String>,
    next_request: RequestId,
    completed: HashMap<RequestId, Result<StoreResponse, TransportError>>,
}

impl SqliteStore {
    pub fn open(path: &str) -> GameResult<Self> {
        let conn = Connection::open(path)?;
        // WAL mode: better concurrent read performance.
        let _ = conn.execute_batch("PRAGMA journal_mode=WAL;");
        Ok(Self::wrap(conn))
    }

    /// Open an in-memory database (used in tests).
    pub fn in_memory() -> GameResult<Self> {
        Ok(Self::wrap(Connection::open_in_memory()?))
    }

    fn wrap(conn: Connection) -> Self {
        Self {
            conn,
            player_id: None,
            next_request: 1,
            completed: HashMap::new(),
        }
    }

    /// Apply the schema. Idempotent.
    pub fn migrate(&self) -> GameResult<()> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS player (
                 custom_id  TEXT PRIMARY KEY,
                 player_id  TEXT NOT NULL
             );
             CREATE TABLE IF NOT EXISTS user_data (
                 player_id  TEXT NOT NULL,
                 key        TEXT NOT NULL,
                 value      TEXT NOT NULL,
                 PRIMARY KEY (player_id, key)
             );",
        )?;
        Ok(())
    }

    fn finish(&mut self, result: Result<StoreResponse, TransportError>) -> RequestId {
        let id = self.next_request;
        self.next_request += 1;
        self.completed.insert(id, result);
        id
    }

    fn login(&mut self, custom_id: &str) -> Result<StoreResponse, TransportError> {
        let existing: Option<String> = self
            .conn
            .query_row(
                "SELECT player_id FROM player WHERE custom_id = ?1",
                params![custom_id],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| TransportError::Unavailable(e.to_string()))?;

        let player_id = match existing {
            Some(id) => id,
            None => {
                // Accounts are created on first login.
                let id = format!("pf-{}", Uuid::new_v4().simple());
                self.conn
                    .execute(
                        "INSERT INTO player (custom_id, player_id) VALUES (?1, ?2)",
                        params![custom_id, id],
                    )
                    .map_err(|e| TransportError::Unavailable(e.to_string()))?;
                id
            }
        };
        self.player_id = Some(player_id.clone());
        Ok(StoreResponse::LoggedIn { player_id })
    }

    fn get(&mut self, keys: &[String]) -> Result<StoreResponse, TransportError> {
        let player_id = self
            .player_id
            .clone()
            .ok_or_else(|| TransportError::AuthRejected("not logged in".into()))?;
        let mut values = HashMap::new();
        for key in keys {
            let value: Option<String> = self
                .conn
                .query_row(
                    "SELECT value FROM user_data WHERE player_id = ?1 AND key = ?2",
                    params![player_id, key],
                    |row| row.get(0),
                )
                .optional()
                .map_err(|e| TransportError::Unavailable(e.to_string()))?;
            if let Some(value) = value {
                values.insert(key.clone(), value);
            }
        }
        Ok(StoreResponse::Values(values))
    }

    fn set(
        &mut self,
        values: HashMap<String, String>,
    ) -> Result<StoreResponse, TransportError> {
        let player_id = self
            .player_id
            .clone()
            .ok_or_else(|| TransportError::AuthRejected("not logged in".into()))?;
        for (key, value) in values {
            self.conn
                .execute(
                    "INSERT INTO user_data (player_id, key, value) VALUES (?1, ?2, ?3)
                     ON CONFLICT (player_id, key) DO UPDATE SET value = excluded.value",
                    params![player_id, key, value],
                )
                .map_err(|e| TransportError::Unavailable(e.to_string()))?;
        }
        Ok(StoreResponse::Ack)
    }
}

impl RemoteStore for SqliteStore {
    fn begin_login(&mut self, custom_id: &str) -> RequestId {
        let result = self.login(custom_id);
        self.finish(result)
    }

    fn begin_get(&mut self, keys: &[String]) -> RequestId {
        let result = self.get(keys);
        self.finish(result)
    }

    fn begin_set(&mut self, values: HashMap<String, String>, _scope: AccessScope) -> RequestId {
        let result = self.set(values);
        self.finish(result)
    }

    fn poll(&mut self, id: RequestId) -> StorePoll {
        match self.completed.remove(&id) {
            Some(result) => StorePoll::Ready(result),
            None => StorePoll::Pending,
        }
    }
}
