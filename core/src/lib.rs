//! clicker-core — the progression-tracking engine for an incremental
//! clicker game.
//!
//! Owns all mutable player state: the resource counter and
//! multipliers, the purchasable upgrade catalog, the rotating quest
//! pool, and the sync layer that keeps a snapshot of it all durable in
//! a remote key-value store. Presentation (rendering, animation,
//! layout) lives entirely outside this crate and talks to it through
//! `PlayerCommand` in and drained `Notification`s out.
//!
//! Single-threaded cooperative model: all mutation happens on the
//! logical game tick plus discrete commands. Network round trips are
//! polled continuations, never blocking waits.

pub mod catalog;
pub mod clock;
pub mod command;
pub mod config;
pub mod economy;
pub mod error;
pub mod event;
pub mod identity;
pub mod quest;
pub mod rng;
pub mod session;
pub mod snapshot;
pub mod store;
pub mod sync;
pub mod types;
