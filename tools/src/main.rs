//! session-runner: headless driver for clicker-core.
//!
//! Replays a scripted play session against a real store backend and
//! prints an end-of-run summary. Useful for eyeballing engine behavior
//! without any presentation layer.
//!
//! Usage:
//!   session-runner --seed 42 --ticks 20000 --db save.db
//!   session-runner --seed 42 --ticks 20000            (in-memory)
//!   session-runner --seed 42 --ticks 20000 --json     (machine-readable summary)

use anyhow::Result;
use clicker_core::{
    command::PlayerCommand,
    config::GameConfig,
    event::Notification,
    identity,
    session::GameSession,
    store::{MemoryStore, RemoteStore, SqliteStore},
};
use serde::Serialize;
use std::env;

#[derive(Serialize)]
struct RunSummary {
    seed: u64,
    ticks: u64,
    balance: u64,
    total_earned: u64,
    total_spent: u64,
    manual_actions: u64,
    click_power: u64,
    auto_rate: f64,
    purchases: u64,
    quests_claimed: u64,
    saves_completed: u64,
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let seed = parse_arg(&args, "--seed", 42u64);
    let ticks = parse_arg(&args, "--ticks", 20_000u64);
    let db = args
        .windows(2)
        .find(|w| w[0] == "--db")
        .map(|w| w[1].clone());
    let json_output = args.iter().any(|a| a == "--json");

    if !json_output {
        println!("clicker-core — session-runner");
        println!("  seed:  {seed}");
        println!("  ticks: {ticks}");
        println!("  db:    {}", db.as_deref().unwrap_or("(in-memory)"));
        println!();
    }

    let mut store: Box<dyn RemoteStore> = match &db {
        Some(path) => {
            let store = SqliteStore::open(path)?;
            store.migrate()?;
            Box::new(store)
        }
        None => Box::new(MemoryStore::with_latency(3)),
    };

    let config = GameConfig::default();
    let mut session = GameSession::new(config, seed, identity::ephemeral_id());
    session.start(store.as_mut());

    let mut saves = 0u64;
    let mut claims = 0u64;
    let mut purchases = 0u64;

    for tick in 0..ticks {
        session.tick(store.as_mut());

        // Scripted play: click every 3rd tick, try the catalog and the
        // quest pool once a "second" (every 10th tick).
        if tick % 3 == 0 {
            session.handle_command(PlayerCommand::ManualAction, store.as_mut());
        }
        if tick % 10 == 0 {
            for index in 0..session.ledger.len() {
                if session
                    .ledger
                    .price_of(index)
                    .is_some_and(|p| p <= session.economy.balance)
                {
                    use clicker_core::catalog::PurchaseOutcome;
                    if session.purchase(index, store.as_mut()) == PurchaseOutcome::Applied {
                        purchases += 1;
                    }
                    break;
                }
            }
            let claimable: Vec<u64> = session
                .quests
                .pool()
                .iter()
                .filter(|q| q.completed() && !q.claimed())
                .map(|q| q.id)
                .collect();
            for quest_id in claimable {
                if session.claim(quest_id, store.as_mut()) {
                    claims += 1;
                }
            }
        }

        for notification in session.drain_notifications() {
            match notification {
                Notification::DataSaved => saves += 1,
                Notification::LoginSucceeded { ref player_id } => {
                    log::info!("logged in as {player_id}");
                }
                Notification::SaveFailed | Notification::LoadFailed => {
                    log::warn!("{notification:?}");
                }
                _ => log::debug!("{notification:?}"),
            }
        }
    }

    session.shutdown();

    if json_output {
        let summary = RunSummary {
            seed,
            ticks,
            balance: session.economy.balance,
            total_earned: session.economy.total_earned,
            total_spent: session.economy.total_spent,
            manual_actions: session.economy.total_manual_actions,
            click_power: session.economy.click_power(),
            auto_rate: session.economy.auto_rate,
            purchases,
            quests_claimed: claims,
            saves_completed: saves,
        };
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!("── end of run ─────────────────────────────");
    println!("  balance:          {}", session.economy.balance);
    println!("  total earned:     {}", session.economy.total_earned);
    println!("  total spent:      {}", session.economy.total_spent);
    println!("  manual actions:   {}", session.economy.total_manual_actions);
    println!("  click power:      {}", session.economy.click_power());
    println!("  auto rate:        {:.1}/s", session.economy.auto_rate);
    println!("  purchases:        {purchases}");
    println!("  quests claimed:   {claims}");
    println!("  saves completed:  {saves}");
    println!(
        "  next refresh in:  {:.0}s",
        session.time_until_quest_refresh()
    );

    Ok(())
}

fn parse_arg<T: std::str::FromStr>(args: &[String], name: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == name)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}
