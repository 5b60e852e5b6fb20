//! Economy state — the resource counter, multipliers, and the
//! auto-accumulation tick.
//!
//! INVARIANT: `balance == total_earned - total_spent` after every
//! operation. All lifetime counters are monotonic.

use crate::event::GameEvent;
use crate::types::Seconds;

#[derive(Debug, Clone, PartialEq)]
pub struct EconomyState {
    pub balance: u64,
    pub base_click_power: u64,
    pub click_multiplier: u64,
    pub auto_rate: f64,
    pub total_earned: u64,
    pub total_spent: u64,
    pub total_manual_actions: u64,
    /// Fractional units accumulated by `tick` but not yet credited.
    /// Never persisted; a reload starts the carry at zero.
    carry: f64,
}

impl EconomyState {
    pub fn new(base_click_power: u64) -> Self {
        assert!(base_click_power >= 1, "base click power must be >= 1");
        Self {
            balance: 0,
            base_click_power,
            click_multiplier: 0,
            auto_rate: 0.0,
            total_earned: 0,
            total_spent: 0,
            total_manual_actions: 0,
            carry: 0.0,
        }
    }

    /// Units produced by one manual action.
    pub fn click_power(&self) -> u64 {
        self.base_click_power + self.click_multiplier
    }

    /// Add `amount` to the balance. Manual credits also count one
    /// manual action.
    pub fn credit(&mut self, amount: u64, manual: bool) -> GameEvent {
        self.balance += amount;
        self.total_earned += amount;
        if manual {
            self.total_manual_actions += 1;
        }
        debug_assert_eq!(self.balance, self.total_earned - self.total_spent);
        GameEvent::ResourceEarned { amount, manual }
    }

    /// Spend `amount` if the balance allows it. On failure nothing
    /// changes and `None` is returned — never an error.
    pub fn debit(&mut self, amount: u64) -> Option<GameEvent> {
        if self.balance < amount {
            return None;
        }
        self.balance -= amount;
        self.total_spent += amount;
        debug_assert_eq!(self.balance, self.total_earned - self.total_spent);
        Some(GameEvent::ResourceSpent { amount })
    }

    /// Accumulate automated production for `delta` seconds.
    ///
    /// Fractions are carried between ticks so a low rate (say 0.2/s at
    /// a 0.1 s tick) still pays out in full over time instead of being
    /// truncated away each tick.
    pub fn tick(&mut self, delta: Seconds) -> Option<GameEvent> {
        if self.auto_rate <= 0.0 || delta <= 0.0 {
            return None;
        }
        self.carry += self.auto_rate * delta;
        if self.carry < 1.0 {
            return None;
        }
        let whole = self.carry.floor();
        self.carry -= whole;
        Some(self.credit(whole as u64, false))
    }

    /// Additive and cumulative: applying a boost twice doubles it.
    pub fn apply_power_boost(&mut self, amount: u64) {
        self.click_multiplier += amount;
    }

    pub fn apply_rate_boost(&mut self, amount: f64) {
        assert!(amount >= 0.0, "rate boost must be non-negative");
        self.auto_rate += amount;
    }

    /// Wholesale replacement on load. The caller has already validated
    /// the incoming values; the fractional carry restarts at zero.
    pub fn replace(
        &mut self,
        balance: u64,
        click_multiplier: u64,
        auto_rate: f64,
        total_earned: u64,
        total_spent: u64,
        total_manual_actions: u64,
    ) {
        self.balance = balance;
        self.click_multiplier = click_multiplier;
        self.auto_rate = auto_rate;
        self.total_earned = total_earned;
        self.total_spent = total_spent;
        self.total_manual_actions = total_manual_actions;
        self.carry = 0.0;
    }
}
