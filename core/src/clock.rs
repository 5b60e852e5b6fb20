//! Logical game clock — owns tick state and elapsed game time.
//!
//! Everything time-driven (auto-accumulation, the quest countdown,
//! auto-save scheduling, login retry) reads this clock, never a platform
//! timer. Tests advance it deterministically; the runner maps one tick
//! to `tick_interval` real seconds.

use crate::types::{Seconds, Tick};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GameClock {
    pub current_tick: Tick,
    pub elapsed_seconds: Seconds,
    pub tick_interval: Seconds,
    pub paused: bool,
}

impl GameClock {
    pub fn new(tick_interval: Seconds) -> Self {
        assert!(tick_interval > 0.0, "tick_interval must be positive");
        Self {
            current_tick: 0,
            elapsed_seconds: 0.0,
            tick_interval,
            paused: false,
        }
    }

    /// Advance one tick. Returns the delta in game seconds.
    /// Panics if called while paused — callers must check.
    pub fn advance(&mut self) -> Seconds {
        assert!(!self.paused, "advance() called on paused clock");
        self.current_tick += 1;
        self.elapsed_seconds += self.tick_interval;
        self.tick_interval
    }

    /// Current game time in seconds since session start.
    pub fn now(&self) -> Seconds {
        self.elapsed_seconds
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }
}
