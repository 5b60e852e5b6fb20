use clicker_core::catalog::UpgradeLedger;
use clicker_core::config::{GameConfig, SyncConfig};
use clicker_core::economy::EconomyState;
use clicker_core::snapshot::GameSnapshot;
use clicker_core::store::MemoryStore;
use clicker_core::sync::{
    LoadRequest, SaveRequest, SyncOutcome, SyncSession, BACKUP_SAVE_KEY, LAST_SAVE_TIME_KEY,
    SAVE_DATA_KEY, SAVE_VERSION_KEY,
};

// ── Test helpers ────────────────────────────────────────────────────

fn sync_config() -> SyncConfig {
    GameConfig::default().sync
}

fn make_sync() -> SyncSession {
    SyncSession::new(sync_config(), "device-test".into())
}

/// Drive the login handshake to completion at t=0.
fn logged_in(store: &mut MemoryStore) -> SyncSession {
    let mut sync = make_sync();
    sync.start(store);
    let outcomes = sync.pump(0.0, store);
    assert!(
        matches!(outcomes.first(), Some(SyncOutcome::LoggedIn { .. })),
        "login handshake failed: {outcomes:?}"
    );
    sync
}

fn valid_snapshot() -> GameSnapshot {
    let mut economy = EconomyState::new(1);
    economy.credit(1_234, true);
    let ledger = UpgradeLedger::from_config(&GameConfig::default().catalog);
    GameSnapshot::capture(&economy, &ledger)
}

/// Pump until quiet or `limit` iterations, collecting outcomes.
fn pump_until_quiet(
    sync: &mut SyncSession,
    store: &mut MemoryStore,
    now: f64,
    limit: u32,
) -> Vec<SyncOutcome> {
    let mut all = Vec::new();
    for _ in 0..limit {
        let outcomes = sync.pump(now, store);
        let quiet = outcomes.is_empty() && !sync.is_saving() && !sync.is_loading();
        all.extend(outcomes);
        if quiet {
            break;
        }
    }
    all
}

// ── Dual-write ──────────────────────────────────────────────────────

/// Every save writes the snapshot under both the primary and backup
/// keys plus the two metadata keys, in a single set.
#[test]
fn save_dual_writes_all_four_keys() {
    let mut store = MemoryStore::new();
    let mut sync = logged_in(&mut store);
    let snapshot = valid_snapshot();

    assert_eq!(
        sync.request_save(&snapshot, 1.0, &mut store),
        SaveRequest::Started
    );
    let outcomes = pump_until_quiet(&mut sync, &mut store, 1.0, 10);
    assert!(matches!(outcomes.first(), Some(SyncOutcome::Saved)));

    let primary = store.stored(SAVE_DATA_KEY).expect("primary written");
    let backup = store.stored(BACKUP_SAVE_KEY).expect("backup written");
    assert_eq!(primary, backup);
    assert_eq!(store.stored(SAVE_VERSION_KEY).map(String::as_str), Some("1"));
    assert_eq!(
        store.stored(LAST_SAVE_TIME_KEY),
        Some(&snapshot.saved_at)
    );
    assert_eq!(store.set_count, 1, "one set call per save");
}

// ── Single-flight ───────────────────────────────────────────────────

/// A save issued while one is outstanding is dropped, not queued:
/// exactly one set reaches the store.
#[test]
fn concurrent_save_is_dropped() {
    let mut store = MemoryStore::with_latency(5);
    let mut sync = make_sync();
    sync.start(&mut store);
    for _ in 0..10 {
        sync.pump(0.0, &mut store);
        if sync.is_logged_in() {
            break;
        }
    }
    let snapshot = valid_snapshot();

    assert_eq!(
        sync.request_save(&snapshot, 1.0, &mut store),
        SaveRequest::Started
    );
    assert_eq!(
        sync.request_save(&snapshot, 1.0, &mut store),
        SaveRequest::DroppedInFlight
    );

    pump_until_quiet(&mut sync, &mut store, 2.0, 20);
    assert_eq!(store.set_count, 1);
}

#[test]
fn concurrent_load_is_dropped() {
    let mut store = MemoryStore::with_latency(5);
    let mut sync = make_sync();
    sync.start(&mut store);
    for _ in 0..10 {
        sync.pump(0.0, &mut store);
        if sync.is_logged_in() {
            break;
        }
    }

    assert_eq!(sync.request_load(&mut store), LoadRequest::Started);
    assert_eq!(sync.request_load(&mut store), LoadRequest::DroppedInFlight);

    pump_until_quiet(&mut sync, &mut store, 1.0, 20);
    assert_eq!(store.get_count, 1);
}

/// Save and load are NOT mutually exclusive with each other — both may
/// be in flight at once.
#[test]
fn save_and_load_may_overlap() {
    let mut store = MemoryStore::with_latency(5);
    let mut sync = make_sync();
    sync.start(&mut store);
    for _ in 0..10 {
        sync.pump(0.0, &mut store);
        if sync.is_logged_in() {
            break;
        }
    }

    assert_eq!(
        sync.request_save(&valid_snapshot(), 1.0, &mut store),
        SaveRequest::Started
    );
    assert_eq!(sync.request_load(&mut store), LoadRequest::Started);
    assert!(sync.is_saving() && sync.is_loading());
}

// ── Pre-send validation ─────────────────────────────────────────────

/// A snapshot with a negative balance is rejected locally: no network
/// call of any kind is made.
#[test]
fn invalid_snapshot_never_reaches_the_store() {
    let mut store = MemoryStore::new();
    let mut sync = logged_in(&mut store);
    let mut snapshot = valid_snapshot();
    snapshot.balance = -1;

    let result = sync.request_save(&snapshot, 1.0, &mut store);

    assert!(matches!(result, SaveRequest::Rejected(_)));
    assert_eq!(store.set_count, 0);
    assert!(!sync.is_saving());
}

#[test]
fn save_requires_login() {
    let mut store = MemoryStore::new();
    let mut sync = make_sync();

    assert_eq!(
        sync.request_save(&valid_snapshot(), 0.0, &mut store),
        SaveRequest::NotLoggedIn
    );
    assert_eq!(sync.request_load(&mut store), LoadRequest::NotLoggedIn);
}

// ── Load fallback ───────────────────────────────────────────────────

/// A malformed primary falls back to the backup key.
#[test]
fn malformed_primary_falls_back_to_backup() {
    let mut store = MemoryStore::new();
    let snapshot = valid_snapshot();
    store.insert_raw(SAVE_DATA_KEY, "{not json");
    store.insert_raw(BACKUP_SAVE_KEY, &snapshot.to_json().unwrap());
    let mut sync = logged_in(&mut store);

    sync.request_load(&mut store);
    let outcomes = pump_until_quiet(&mut sync, &mut store, 1.0, 10);

    match outcomes.first() {
        Some(SyncOutcome::Loaded(loaded)) => assert_eq!(*loaded, snapshot),
        other => panic!("expected Loaded, got {other:?}"),
    }
}

/// A primary that parses but fails validation also falls back.
#[test]
fn invalid_primary_falls_back_to_backup() {
    let mut store = MemoryStore::new();
    let good = valid_snapshot();
    let mut bad = good.clone();
    bad.balance = -7;
    store.insert_raw(SAVE_DATA_KEY, &bad.to_json().unwrap());
    store.insert_raw(BACKUP_SAVE_KEY, &good.to_json().unwrap());
    let mut sync = logged_in(&mut store);

    sync.request_load(&mut store);
    let outcomes = pump_until_quiet(&mut sync, &mut store, 1.0, 10);

    assert!(matches!(outcomes.first(), Some(SyncOutcome::Loaded(s)) if *s == good));
}

/// Both keys unusable is a fresh-start outcome, never an error.
#[test]
fn both_keys_unusable_means_no_save_found() {
    let mut store = MemoryStore::new();
    store.insert_raw(SAVE_DATA_KEY, "garbage");
    store.insert_raw(BACKUP_SAVE_KEY, "also garbage");
    let mut sync = logged_in(&mut store);

    sync.request_load(&mut store);
    let outcomes = pump_until_quiet(&mut sync, &mut store, 1.0, 10);

    assert!(matches!(outcomes.first(), Some(SyncOutcome::NoSaveFound)));
}

#[test]
fn empty_store_means_no_save_found() {
    let mut store = MemoryStore::new();
    let mut sync = logged_in(&mut store);

    sync.request_load(&mut store);
    let outcomes = pump_until_quiet(&mut sync, &mut store, 1.0, 10);

    assert!(matches!(outcomes.first(), Some(SyncOutcome::NoSaveFound)));
}

/// Transport failure on load is reported and clears the in-flight
/// flag so a later load can run.
#[test]
fn load_transport_failure_is_reported() {
    let mut store = MemoryStore::new();
    store.fail_gets = 1;
    let mut sync = logged_in(&mut store);

    sync.request_load(&mut store);
    let outcomes = pump_until_quiet(&mut sync, &mut store, 1.0, 10);

    assert!(matches!(outcomes.first(), Some(SyncOutcome::LoadFailed)));
    assert!(!sync.is_loading());
    assert_eq!(sync.request_load(&mut store), LoadRequest::Started);
}

// ── Auth retry ──────────────────────────────────────────────────────

/// A failed login retries once per fixed delay, indefinitely, and
/// succeeds as soon as the store accepts.
#[test]
fn login_retries_after_fixed_delay() {
    let mut store = MemoryStore::new();
    store.fail_logins = 2;
    let mut sync = make_sync();

    sync.start(&mut store);
    let outcomes = sync.pump(0.0, &mut store);
    assert!(matches!(outcomes.first(), Some(SyncOutcome::LoginFailed)));
    assert_eq!(store.login_count, 1);

    // Before the 5 s delay elapses, no retry is issued.
    sync.pump(3.0, &mut store);
    assert_eq!(store.login_count, 1);

    // Second attempt at t=5 also fails; third at t=10 succeeds.
    sync.pump(5.0, &mut store); // issues retry
    let outcomes = sync.pump(5.0, &mut store);
    assert!(matches!(outcomes.first(), Some(SyncOutcome::LoginFailed)));
    assert_eq!(store.login_count, 2);

    sync.pump(10.0, &mut store);
    let outcomes = sync.pump(10.0, &mut store);
    assert!(matches!(outcomes.first(), Some(SyncOutcome::LoggedIn { .. })));
    assert_eq!(store.login_count, 3);
    assert!(sync.is_logged_in());
}

// ── Auto-save scheduling ────────────────────────────────────────────

/// The interval trigger fires once the configured wall-clock span has
/// passed since the last save request.
#[test]
fn interval_trigger_fires_after_configured_span() {
    let mut store = MemoryStore::new();
    let mut sync = logged_in(&mut store); // baselines at t=0

    assert!(!sync.auto_save_due(179.0, 0.0));
    assert!(sync.auto_save_due(180.0, 0.0));
}

/// The progress-delta trigger fires when earned + spent + 0.1×manual
/// grows past the threshold since the last save.
#[test]
fn progress_delta_trigger_fires_at_threshold() {
    let mut store = MemoryStore::new();
    let mut sync = logged_in(&mut store);
    let snapshot = valid_snapshot(); // earned 1234, manual 1
    sync.request_save(&snapshot, 0.0, &mut store);
    pump_until_quiet(&mut sync, &mut store, 0.0, 10);

    let baseline = 1_234.0 + 0.0 + 0.1;
    assert!(!sync.auto_save_due(1.0, baseline + 499.9));
    assert!(sync.auto_save_due(1.0, baseline + 500.0));
}

#[test]
fn auto_save_requires_login_and_no_inflight_save() {
    let mut store = MemoryStore::with_latency(10);
    let mut sync = make_sync();
    assert!(!sync.auto_save_due(10_000.0, 1e9), "logged out: never due");

    sync.start(&mut store);
    for _ in 0..20 {
        sync.pump(0.0, &mut store);
        if sync.is_logged_in() {
            break;
        }
    }
    sync.request_save(&valid_snapshot(), 0.0, &mut store);
    assert!(sync.is_saving());
    assert!(
        !sync.auto_save_due(10_000.0, 1e9),
        "in-flight save suppresses the trigger"
    );
}

/// Rebaselining after a load keeps the jump in lifetime counters from
/// tripping the delta trigger.
#[test]
fn rebaseline_absorbs_loaded_counters() {
    let mut store = MemoryStore::new();
    let mut sync = logged_in(&mut store);

    assert!(sync.auto_save_due(1.0, 1e9));
    sync.rebaseline(1.0, 1e9);
    assert!(!sync.auto_save_due(2.0, 1e9 + 100.0));
}

/// A failed save surfaces SaveFailed and leaves the next interval
/// trigger armed.
#[test]
fn failed_save_reports_and_rearms() {
    let mut store = MemoryStore::new();
    store.fail_sets = 1;
    let mut sync = logged_in(&mut store);

    sync.request_save(&valid_snapshot(), 10.0, &mut store);
    let outcomes = pump_until_quiet(&mut sync, &mut store, 10.0, 10);

    assert!(matches!(outcomes.first(), Some(SyncOutcome::SaveFailed)));
    assert!(!sync.is_saving());
    assert!(sync.auto_save_due(10.0 + 180.0, 0.0));
}
