//! Persistence sync — authentication, save, and load against the
//! remote key-value store.
//!
//! RULES:
//!   - Single-flight per kind: a save issued while one is outstanding
//!     is dropped, not queued. Same for load and login.
//!   - Snapshots are validated locally before any network call.
//!   - Every save dual-writes primary + backup plus two metadata keys.
//!   - A load falls back primary → backup; both unusable means "no
//!     save found", a normal fresh-start outcome, never an error.
//!   - Auth failures retry after a fixed delay, forever. Deliberate
//!     simplicity for a low-stakes client: no backoff growth, no cap.
//!
//! Save and load are not mutually exclusive with each other; the later
//! write wins on the remote key.

use crate::config::SyncConfig;
use crate::snapshot::{GameSnapshot, SnapshotRejection, SNAPSHOT_VERSION};
use crate::store::{
    AccessScope, RemoteStore, RequestId, StorePoll, StoreResponse,
};
use crate::types::Seconds;
use std::collections::HashMap;

pub const SAVE_DATA_KEY: &str = "GameSaveData";
pub const BACKUP_SAVE_KEY: &str = "GameSaveDataBackup";
pub const LAST_SAVE_TIME_KEY: &str = "LastSaveTime";
pub const SAVE_VERSION_KEY: &str = "SaveVersion";

#[derive(Debug)]
enum AuthState {
    LoggedOut,
    InFlight { request: RequestId },
    RetryAt { at: Seconds },
    LoggedIn { player_id: String },
}

/// How a save request was disposed of at the boundary.
#[derive(Debug, Clone, PartialEq)]
pub enum SaveRequest {
    Started,
    DroppedInFlight,
    NotLoggedIn,
    /// Failed the local sanity check; no network call was made.
    Rejected(SnapshotRejection),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadRequest {
    Started,
    DroppedInFlight,
    NotLoggedIn,
}

/// Terminal results surfaced by `pump`. The session converts these to
/// notifications and applies loaded snapshots.
#[derive(Debug, Clone)]
pub enum SyncOutcome {
    LoggedIn { player_id: String },
    LoginFailed,
    Saved,
    SaveFailed,
    Loaded(GameSnapshot),
    LoadFailed,
    NoSaveFound,
}

pub struct SyncSession {
    config: SyncConfig,
    custom_id: String,
    auth: AuthState,
    pending_save: Option<RequestId>,
    pending_load: Option<RequestId>,
    last_save_at: Seconds,
    progress_at_last_save: f64,
}

impl SyncSession {
    pub fn new(config: SyncConfig, custom_id: String) -> Self {
        Self {
            config,
            custom_id,
            auth: AuthState::LoggedOut,
            pending_save: None,
            pending_load: None,
            last_save_at: 0.0,
            progress_at_last_save: 0.0,
        }
    }

    pub fn is_logged_in(&self) -> bool {
        matches!(self.auth, AuthState::LoggedIn { .. })
    }

    pub fn player_id(&self) -> Option<&str> {
        match &self.auth {
            AuthState::LoggedIn { player_id } => Some(player_id),
            _ => None,
        }
    }

    pub fn is_saving(&self) -> bool {
        self.pending_save.is_some()
    }

    pub fn is_loading(&self) -> bool {
        self.pending_load.is_some()
    }

    /// Begin the initial login. No-op unless currently logged out.
    pub fn start(&mut self, store: &mut dyn RemoteStore) {
        if let AuthState::LoggedOut = self.auth {
            log::debug!("attempting login");
            let request = store.begin_login(&self.custom_id);
            self.auth = AuthState::InFlight { request };
        }
    }

    /// Teardown: stop issuing requests and abandon pending
    /// continuations. In-flight requests are fire-and-forget.
    pub fn log_out(&mut self) {
        self.auth = AuthState::LoggedOut;
        self.pending_save = None;
        self.pending_load = None;
    }

    /// Issue a save. The snapshot is validated here, before any
    /// network call; the trigger baselines (interval timer and
    /// progress delta) reset when the request starts.
    pub fn request_save(
        &mut self,
        snapshot: &GameSnapshot,
        now: Seconds,
        store: &mut dyn RemoteStore,
    ) -> SaveRequest {
        if !self.is_logged_in() {
            log::warn!("cannot save: not logged in");
            return SaveRequest::NotLoggedIn;
        }
        if self.pending_save.is_some() {
            log::debug!("save already in flight, dropping request");
            return SaveRequest::DroppedInFlight;
        }
        if let Err(rejection) = snapshot.validate(self.config.balance_ceiling) {
            log::warn!("save rejected before transmission: {rejection}");
            return SaveRequest::Rejected(rejection);
        }
        let json = match snapshot.to_json() {
            Ok(json) => json,
            Err(e) => {
                // Serialization of a validated snapshot should never
                // fail; treat it like a local rejection if it does.
                log::error!("snapshot serialization failed: {e}");
                return SaveRequest::Rejected(SnapshotRejection::Unserializable(e.to_string()));
            }
        };

        let mut values = HashMap::new();
        values.insert(SAVE_DATA_KEY.to_string(), json.clone());
        values.insert(BACKUP_SAVE_KEY.to_string(), json);
        values.insert(LAST_SAVE_TIME_KEY.to_string(), snapshot.saved_at.clone());
        values.insert(SAVE_VERSION_KEY.to_string(), SNAPSHOT_VERSION.to_string());

        let request = store.begin_set(values, AccessScope::Private);
        self.pending_save = Some(request);
        self.last_save_at = now;
        self.progress_at_last_save = progress_metric(snapshot);
        SaveRequest::Started
    }

    /// Issue a load of all save keys.
    pub fn request_load(&mut self, store: &mut dyn RemoteStore) -> LoadRequest {
        if !self.is_logged_in() {
            log::warn!("cannot load: not logged in");
            return LoadRequest::NotLoggedIn;
        }
        if self.pending_load.is_some() {
            log::debug!("load already in flight, dropping request");
            return LoadRequest::DroppedInFlight;
        }
        let keys = [
            SAVE_DATA_KEY,
            BACKUP_SAVE_KEY,
            LAST_SAVE_TIME_KEY,
            SAVE_VERSION_KEY,
        ]
        .map(String::from);
        let request = store.begin_get(&keys);
        self.pending_load = Some(request);
        LoadRequest::Started
    }

    /// True when an auto-save should fire: either the wall-clock
    /// interval elapsed or cumulative progress crossed the threshold
    /// since the last save. Requires login and no save in flight.
    pub fn auto_save_due(&self, now: Seconds, current_progress: f64) -> bool {
        if !self.is_logged_in() || self.pending_save.is_some() {
            return false;
        }
        if now - self.last_save_at >= self.config.auto_save_interval_seconds {
            return true;
        }
        current_progress - self.progress_at_last_save >= self.config.progress_delta_threshold
    }

    /// Reset the auto-save baselines without saving. Called after a
    /// load replaces the state, so the jump in lifetime counters does
    /// not itself trip the progress-delta trigger.
    pub fn rebaseline(&mut self, now: Seconds, current_progress: f64) {
        self.last_save_at = now;
        self.progress_at_last_save = current_progress;
    }

    /// Poll in-flight requests and drive the login retry schedule.
    /// Called once per game tick.
    pub fn pump(&mut self, now: Seconds, store: &mut dyn RemoteStore) -> Vec<SyncOutcome> {
        let mut outcomes = Vec::new();

        match self.auth {
            AuthState::InFlight { request } => match store.poll(request) {
                StorePoll::Pending => {}
                StorePoll::Ready(Ok(StoreResponse::LoggedIn { player_id })) => {
                    log::info!("login succeeded: {player_id}");
                    self.auth = AuthState::LoggedIn {
                        player_id: player_id.clone(),
                    };
                    self.last_save_at = now;
                    outcomes.push(SyncOutcome::LoggedIn { player_id });
                }
                StorePoll::Ready(Ok(_)) | StorePoll::Ready(Err(_)) => {
                    let at = now + self.config.login_retry_delay_seconds;
                    log::warn!("login failed, retrying at t={at:.1}s");
                    self.auth = AuthState::RetryAt { at };
                    outcomes.push(SyncOutcome::LoginFailed);
                }
            },
            AuthState::RetryAt { at } if now >= at => {
                log::debug!("retrying login");
                let request = store.begin_login(&self.custom_id);
                self.auth = AuthState::InFlight { request };
            }
            _ => {}
        }

        if let Some(request) = self.pending_save {
            match store.poll(request) {
                StorePoll::Pending => {}
                StorePoll::Ready(Ok(_)) => {
                    log::debug!("save completed");
                    self.pending_save = None;
                    outcomes.push(SyncOutcome::Saved);
                }
                StorePoll::Ready(Err(e)) => {
                    log::warn!("save failed: {e}");
                    self.pending_save = None;
                    outcomes.push(SyncOutcome::SaveFailed);
                }
            }
        }

        if let Some(request) = self.pending_load {
            match store.poll(request) {
                StorePoll::Pending => {}
                StorePoll::Ready(Ok(StoreResponse::Values(values))) => {
                    self.pending_load = None;
                    outcomes.push(self.resolve_loaded(values));
                }
                StorePoll::Ready(Ok(_)) => {
                    log::warn!("unexpected load response shape");
                    self.pending_load = None;
                    outcomes.push(SyncOutcome::LoadFailed);
                }
                StorePoll::Ready(Err(e)) => {
                    log::warn!("load failed: {e}");
                    self.pending_load = None;
                    outcomes.push(SyncOutcome::LoadFailed);
                }
            }
        }

        outcomes
    }

    /// Pick the first usable snapshot: primary, then backup. Anything
    /// missing, malformed, or failing validation is skipped.
    fn resolve_loaded(&self, values: HashMap<String, String>) -> SyncOutcome {
        for key in [SAVE_DATA_KEY, BACKUP_SAVE_KEY] {
            let Some(json) = values.get(key) else {
                continue;
            };
            match GameSnapshot::from_json(json) {
                Ok(snapshot) => match snapshot.validate(self.config.balance_ceiling) {
                    Ok(()) => {
                        if key == BACKUP_SAVE_KEY {
                            log::warn!("primary save unusable, loaded from backup");
                        }
                        return SyncOutcome::Loaded(snapshot);
                    }
                    Err(rejection) => {
                        log::warn!("save under '{key}' failed validation: {rejection}");
                    }
                },
                Err(e) => log::warn!("save under '{key}' is malformed: {e}"),
            }
        }
        log::info!("no usable save found, starting fresh");
        SyncOutcome::NoSaveFound
    }
}

/// The cumulative progress metric driving the delta-based auto-save:
/// earned + spent + 0.1 × manual actions.
pub fn progress_metric(snapshot: &GameSnapshot) -> f64 {
    snapshot.total_earned as f64
        + snapshot.total_spent as f64
        + 0.1 * snapshot.total_manual_actions as f64
}

/// Same metric computed from live counters, for the due-check between
/// snapshots.
pub fn live_progress_metric(economy: &crate::economy::EconomyState) -> f64 {
    economy.total_earned as f64
        + economy.total_spent as f64
        + 0.1 * economy.total_manual_actions as f64
}
