//! In-memory store with scriptable latency and failure injection.
//!
//! The test double for the remote service, also used by the headless
//! runner. Requests stay `Pending` for `latency_polls` polls before
//! executing, so single-flight and in-flight interleavings are
//! observable from tests.

use super::{AccessScope, RemoteStore, RequestId, StorePoll, StoreResponse, TransportError};
use std::collections::HashMap;

enum PendingOp {
    Login { custom_id: String },
    Get { keys: Vec<String> },
    Set { values: HashMap<String, String> },
}

pub struct MemoryStore {
    data: HashMap<String, String>,
    logged_in: bool,
    latency_polls: u32,
    in_flight: HashMap<RequestId, (u32, PendingOp)>,
    next_request: RequestId,
    /// Fail the next n operations of each kind.
    pub fail_logins: u32,
    pub fail_gets: u32,
    pub fail_sets: u32,
    /// Operation counters for assertions.
    pub login_count: u64,
    pub get_count: u64,
    pub set_count: u64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::with_latency(0)
    }

    /// `latency_polls` polls return `Pending` before a request
    /// completes.
    pub fn with_latency(latency_polls: u32) -> Self {
        Self {
            data: HashMap::new(),
            logged_in: false,
            latency_polls,
            in_flight: HashMap::new(),
            next_request: 1,
            fail_logins: 0,
            fail_gets: 0,
            fail_sets: 0,
            login_count: 0,
            get_count: 0,
            set_count: 0,
        }
    }

    /// Direct access to stored values, for test assertions.
    pub fn stored(&self, key: &str) -> Option<&String> {
        self.data.get(key)
    }

    /// Seed a value server-side without going through a set request.
    pub fn insert_raw(&mut self, key: &str, value: &str) {
        self.data.insert(key.to_string(), value.to_string());
    }

    pub fn remove_raw(&mut self, key: &str) {
        self.data.remove(key);
    }

    fn enqueue(&mut self, op: PendingOp) -> RequestId {
        let id = self.next_request;
        self.next_request += 1;
        self.in_flight.insert(id, (self.latency_polls, op));
        id
    }

    fn execute(&mut self, op: PendingOp) -> Result<StoreResponse, TransportError> {
        match op {
            PendingOp::Login { custom_id } => {
                self.login_count += 1;
                if self.fail_logins > 0 {
                    self.fail_logins -= 1;
                    return Err(TransportError::AuthRejected("injected failure".into()));
                }
                self.logged_in = true;
                Ok(StoreResponse::LoggedIn {
                    player_id: format!("mem-{custom_id}"),
                })
            }
            PendingOp::Get { keys } => {
                self.get_count += 1;
                if self.fail_gets > 0 {
                    self.fail_gets -= 1;
                    return Err(TransportError::Unavailable("injected failure".into()));
                }
                if !self.logged_in {
                    return Err(TransportError::AuthRejected("not logged in".into()));
                }
                let values = keys
                    .iter()
                    .filter_map(|k| self.data.get(k).map(|v| (k.clone(), v.clone())))
                    .collect();
                Ok(StoreResponse::Values(values))
            }
            PendingOp::Set { values } => {
                self.set_count += 1;
                if self.fail_sets > 0 {
                    self.fail_sets -= 1;
                    return Err(TransportError::Unavailable("injected failure".into()));
                }
                if !self.logged_in {
                    return Err(TransportError::AuthRejected("not logged in".into()));
                }
                self.data.extend(values);
                Ok(StoreResponse::Ack)
            }
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl RemoteStore for MemoryStore {
    fn begin_login(&mut self, custom_id: &str) -> RequestId {
        self.enqueue(PendingOp::Login {
            custom_id: custom_id.to_string(),
        })
    }

    fn begin_get(&mut self, keys: &[String]) -> RequestId {
        self.enqueue(PendingOp::Get {
            keys: keys.to_vec(),
        })
    }

    fn begin_set(&mut self, values: HashMap<String, String>, _scope: AccessScope) -> RequestId {
        self.enqueue(PendingOp::Set { values })
    }

    fn poll(&mut self, id: RequestId) -> StorePoll {
        let Some((remaining, op)) = self.in_flight.remove(&id) else {
            return StorePoll::Pending;
        };
        if remaining > 0 {
            self.in_flight.insert(id, (remaining - 1, op));
            return StorePoll::Pending;
        }
        StorePoll::Ready(self.execute(op))
    }
}
