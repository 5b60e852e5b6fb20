//! Remote key-value store contract and backends.
//!
//! The service is modeled as a polled, continuation-style transport:
//! `begin_*` issues a request and returns immediately; `poll` reports
//! `Pending` until the round trip completes. The sync layer pumps
//! polls from the game tick, so the engine never blocks on the network
//! and in-flight state is deterministic under test.
//!
//! RULE: only this module knows how requests complete. The sync layer
//! sees requests, polls, and terminal results — nothing else.

mod memory;
mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use std::collections::HashMap;
use thiserror::Error;

/// Opaque handle for one in-flight request.
pub type RequestId = u64;

/// Visibility of stored values. The engine only ever writes private
/// per-player data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessScope {
    Private,
}

/// Terminal success payloads.
#[derive(Debug, Clone)]
pub enum StoreResponse {
    LoggedIn { player_id: String },
    /// Keys absent on the server are absent from the map.
    Values(HashMap<String, String>),
    Ack,
}

/// Terminal failures. Reported via notifications and retried by the
/// sync layer's own policy — never surfaced as a crate error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("authentication rejected: {0}")]
    AuthRejected(String),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Clone)]
pub enum StorePoll {
    Pending,
    Ready(Result<StoreResponse, TransportError>),
}

/// The authenticated key-value service the engine persists through.
///
/// Get/set operate on the player record established by the most recent
/// successful login. Timeout semantics belong to the implementation;
/// the engine imposes none of its own.
pub trait RemoteStore {
    fn begin_login(&mut self, custom_id: &str) -> RequestId;

    fn begin_get(&mut self, keys: &[String]) -> RequestId;

    fn begin_set(
        &mut self,
        values: HashMap<String, String>,
        scope: AccessScope,
    ) -> RequestId;

    /// Poll an in-flight request. Polling an unknown or already
    /// consumed id yields `Pending` forever; the sync layer never does
    /// this.
    fn poll(&mut self, id: RequestId) -> StorePoll;
}
