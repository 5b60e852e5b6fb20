//! Quest engine — a rotating pool of objectives drawn from the
//! template table.
//!
//! State machine per instance, one-way only:
//!   InProgress → Completed → Claimed (terminal)
//!
//! The pool is redrawn when the countdown elapses, and immediately
//! after the claim that leaves no completed-unclaimed instance behind.
//! Claiming is the only non-timer refresh trigger; `claim` reports the
//! exhaustion and the caller redraws once the reward has been credited
//! against the old pool.

use crate::config::{QuestConfig, RefreshPolicy};
use crate::rng::GameRng;
use crate::types::{QuestId, Seconds};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectiveType {
    ManualActions,
    SpendResources,
    EarnResources,
    BuyRateBoosts,
    BuyPowerBoosts,
    ChangeCosmetic,
}

/// Immutable quest definition. `description` carries a `{target}`
/// placeholder substituted for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestTemplate {
    pub title: String,
    pub description: String,
    pub objective: ObjectiveType,
    pub target_amount: u64,
    pub reward_amount: u64,
}

impl QuestTemplate {
    pub fn formatted_description(&self) -> String {
        self.description
            .replace("{target}", &self.target_amount.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum QuestState {
    InProgress,
    Completed,
    Claimed,
}

#[derive(Debug, Clone)]
pub struct ActiveQuest {
    pub id: QuestId,
    /// Index into the template table this instance was drawn from.
    pub template_index: usize,
    pub template: QuestTemplate,
    pub progress: u64,
    state: QuestState,
}

impl ActiveQuest {
    fn new(id: QuestId, template_index: usize, template: QuestTemplate) -> Self {
        Self {
            id,
            template_index,
            template,
            progress: 0,
            state: QuestState::InProgress,
        }
    }

    /// Add progress and clamp to the target. Returns true if anything
    /// changed. No-op once completed.
    fn add_progress(&mut self, amount: u64) -> bool {
        if self.state != QuestState::InProgress || amount == 0 {
            return false;
        }
        self.progress = (self.progress + amount).min(self.template.target_amount);
        if self.progress == self.template.target_amount {
            self.state = QuestState::Completed;
            log::debug!("quest '{}' completed", self.template.title);
        }
        true
    }

    /// True once the target was reached. Monotonic — stays true after
    /// the reward is claimed.
    pub fn completed(&self) -> bool {
        self.state != QuestState::InProgress
    }

    pub fn claimed(&self) -> bool {
        self.state == QuestState::Claimed
    }

    pub fn progress_fraction(&self) -> f64 {
        if self.template.target_amount == 0 {
            return 1.0;
        }
        (self.progress as f64 / self.template.target_amount as f64).clamp(0.0, 1.0)
    }
}

pub struct QuestEngine {
    templates: Vec<QuestTemplate>,
    pool: Vec<ActiveQuest>,
    pool_size: usize,
    refresh_interval: Seconds,
    refresh_policy: RefreshPolicy,
    time_until_refresh: Seconds,
    next_quest_id: QuestId,
}

impl QuestEngine {
    /// Build the engine and draw the initial pool.
    pub fn new(config: &QuestConfig, rng: &mut GameRng) -> Self {
        let mut engine = Self {
            templates: config.templates.clone(),
            pool: Vec::new(),
            pool_size: config.active_quest_count,
            refresh_interval: config.refresh_interval_seconds,
            refresh_policy: config.refresh_policy,
            time_until_refresh: config.refresh_interval_seconds,
            next_quest_id: 1,
        };
        engine.refresh(rng);
        engine
    }

    pub fn pool(&self) -> &[ActiveQuest] {
        &self.pool
    }

    /// Non-negative countdown until the next automatic refresh.
    pub fn time_until_refresh(&self) -> Seconds {
        self.time_until_refresh.max(0.0)
    }

    /// Redraw the pool from a uniform permutation of the template
    /// table. Under the carry-over policy, completed-unclaimed
    /// instances survive and only the remaining slots are redrawn.
    /// Resets the countdown.
    pub fn refresh(&mut self, rng: &mut GameRng) {
        let carried: Vec<ActiveQuest> = match self.refresh_policy {
            RefreshPolicy::Forfeit => Vec::new(),
            RefreshPolicy::CarryOver => {
                let kept: Vec<ActiveQuest> = self
                    .pool
                    .drain(..)
                    .filter(|q| q.completed() && !q.claimed())
                    .collect();
                if !kept.is_empty() {
                    log::debug!("carrying {} unclaimed quest(s) across refresh", kept.len());
                }
                kept
            }
        };

        let mut order: Vec<usize> = (0..self.templates.len()).collect();
        rng.shuffle(&mut order);

        let mut pool = carried;
        for template_index in order {
            if pool.len() >= self.pool_size.min(self.templates.len()) {
                break;
            }
            if pool.iter().any(|q| q.template_index == template_index) {
                continue;
            }
            let id = self.next_quest_id;
            self.next_quest_id += 1;
            pool.push(ActiveQuest::new(
                id,
                template_index,
                self.templates[template_index].clone(),
            ));
        }
        self.pool = pool;
        self.time_until_refresh = self.refresh_interval;
        log::debug!("quest pool refreshed: {} active", self.pool.len());
    }

    /// Drive the countdown. Returns true if the pool was redrawn.
    pub fn tick(&mut self, delta: Seconds, rng: &mut GameRng) -> bool {
        self.time_until_refresh -= delta;
        if self.time_until_refresh > 0.0 {
            return false;
        }
        self.refresh(rng);
        true
    }

    /// Feed one trackable event to every matching in-progress
    /// instance. Returns true if any instance changed — the caller
    /// emits a single pool-changed signal per call, never one per
    /// instance.
    pub fn record_event(&mut self, objective: ObjectiveType, amount: u64) -> bool {
        let mut changed = false;
        for quest in &mut self.pool {
            if quest.template.objective == objective {
                changed |= quest.add_progress(amount);
            }
        }
        changed
    }

    /// Claim a completed quest's reward. Returns the reward amount,
    /// which the caller credits through the economy (non-manual).
    /// Fails without side effects unless the instance is exactly in
    /// the Completed state. When the claim leaves every completed
    /// instance claimed, `pool_exhausted` is set and the caller must
    /// `refresh` — after crediting the reward, so the credit counts
    /// against the old pool and fresh instances start at zero.
    pub fn claim(&mut self, id: QuestId) -> Option<ClaimOutcome> {
        let quest = self.pool.iter_mut().find(|q| q.id == id)?;
        if quest.state != QuestState::Completed {
            return None;
        }
        quest.state = QuestState::Claimed;
        let reward = quest.template.reward_amount;
        log::debug!("claimed quest '{}' for {reward}", quest.template.title);

        let unclaimed_remain = self
            .pool
            .iter()
            .any(|q| q.completed() && !q.claimed());
        Some(ClaimOutcome {
            reward,
            pool_exhausted: !unclaimed_remain,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClaimOutcome {
    pub reward: u64,
    /// True when this claim emptied the completed-unclaimed set; the
    /// caller redraws the pool once the reward has been credited.
    pub pool_exhausted: bool,
}
