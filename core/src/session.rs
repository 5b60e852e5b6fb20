//! The game session — the explicitly constructed aggregate that owns
//! all mutable player state.
//!
//! ORDERING (fixed, never reordered): every command and every tick
//! runs economy mutation to completion first, then the quest-progress
//! update for the events it emitted, then the save-trigger check.
//!
//! RULES:
//!   - No globals. The session is passed by reference to whoever
//!     needs it; lifecycle belongs to the application bootstrap.
//!   - The presentation layer talks to the session only through
//!     `PlayerCommand` in and drained `Notification`s out.
//!   - The sync layer never holds game state — it sees a snapshot at
//!     save time and hands back a snapshot at load time.

use crate::{
    catalog::{PurchaseOutcome, UpgradeLedger},
    clock::GameClock,
    command::PlayerCommand,
    config::GameConfig,
    economy::EconomyState,
    event::{GameEvent, Notification},
    quest::{ObjectiveType, QuestEngine},
    rng::GameRng,
    snapshot::GameSnapshot,
    store::RemoteStore,
    sync::{live_progress_metric, SaveRequest, SyncOutcome, SyncSession},
    types::{QuestId, SlotIndex},
};
use std::collections::VecDeque;

pub struct GameSession {
    pub config: GameConfig,
    pub clock: GameClock,
    pub economy: EconomyState,
    pub ledger: UpgradeLedger,
    pub quests: QuestEngine,
    sync: SyncSession,
    rng: GameRng,
    notifications: VecDeque<Notification>,
}

impl GameSession {
    /// Build a fully wired session. The initial quest pool is drawn
    /// here; call `start` to begin the login handshake.
    pub fn new(config: GameConfig, seed: u64, custom_id: String) -> Self {
        let mut rng = GameRng::new(seed);
        let economy = EconomyState::new(config.base_click_power);
        let ledger = UpgradeLedger::from_config(&config.catalog);
        let quests = QuestEngine::new(&config.quests, &mut rng);
        let sync = SyncSession::new(config.sync.clone(), custom_id);
        let clock = GameClock::new(config.tick_interval_seconds);
        Self {
            config,
            clock,
            economy,
            ledger,
            quests,
            sync,
            rng,
            notifications: VecDeque::new(),
        }
    }

    /// Kick off authentication against the remote store.
    pub fn start(&mut self, store: &mut dyn RemoteStore) {
        self.sync.start(store);
    }

    pub fn is_logged_in(&self) -> bool {
        self.sync.is_logged_in()
    }

    pub fn player_id(&self) -> Option<&str> {
        self.sync.player_id()
    }

    pub fn is_saving(&self) -> bool {
        self.sync.is_saving()
    }

    pub fn is_loading(&self) -> bool {
        self.sync.is_loading()
    }

    /// Drain queued outbound notifications, oldest first.
    pub fn drain_notifications(&mut self) -> Vec<Notification> {
        self.notifications.drain(..).collect()
    }

    /// Dispatch one inbound command from the presentation layer.
    pub fn handle_command(&mut self, command: PlayerCommand, store: &mut dyn RemoteStore) {
        match command {
            PlayerCommand::ManualAction => self.manual_action(),
            PlayerCommand::Purchase { index } => {
                self.purchase(index, store);
            }
            PlayerCommand::ClaimQuest { quest_id } => {
                self.claim(quest_id, store);
            }
            PlayerCommand::EquipCosmetic { index } => self.equip_cosmetic(index),
            PlayerCommand::ManualSave => self.save_now(store),
            PlayerCommand::ManualLoad => self.load_now(store),
            PlayerCommand::FocusLost => {
                // Backgrounding is a save opportunity, nothing more.
                self.save_now(store);
            }
        }
    }

    /// One manual action: credit the click power as a manual earn.
    pub fn manual_action(&mut self) {
        let amount = self.economy.click_power();
        let event = self.economy.credit(amount, true);
        self.dispatch_events(vec![event]);
    }

    /// Attempt a purchase. On success, a save fires immediately; a
    /// failure is reported through a notification so command-driven
    /// embedders see it too.
    pub fn purchase(&mut self, index: SlotIndex, store: &mut dyn RemoteStore) -> PurchaseOutcome {
        let (outcome, events) = self.ledger.purchase(index, &mut self.economy);
        if outcome == PurchaseOutcome::Applied {
            self.dispatch_events(events);
            self.save_now(store);
        } else {
            self.notify(Notification::PurchaseRejected { index, outcome });
        }
        outcome
    }

    /// Claim a completed quest. The reward is credited non-manually
    /// and feeds quest progress like any other earn, against the old
    /// pool — an exhausted pool redraws only after the credit lands,
    /// so fresh instances start at zero. A save fires on success.
    pub fn claim(&mut self, quest_id: QuestId, store: &mut dyn RemoteStore) -> bool {
        let Some(outcome) = self.quests.claim(quest_id) else {
            return false;
        };
        let mut events = vec![GameEvent::RewardClaimed {
            quest_id,
            amount: outcome.reward,
        }];
        events.push(self.economy.credit(outcome.reward, false));
        let (economy_changed, _) = self.fan_out(events);
        if outcome.pool_exhausted {
            self.quests.refresh(&mut self.rng);
        }
        if economy_changed {
            self.notify(Notification::EconomyChanged);
        }
        // The Completed → Claimed transition alone changed the pool.
        self.notify(Notification::QuestPoolChanged);
        self.save_now(store);
        true
    }

    pub fn equip_cosmetic(&mut self, index: SlotIndex) {
        if let Some(event) = self.ledger.equip(index) {
            self.dispatch_events(vec![event]);
        }
    }

    /// Advance one tick: auto-accumulation, quest countdown, then the
    /// sync pump and auto-save check. A no-op while the clock is
    /// paused (after `shutdown`).
    pub fn tick(&mut self, store: &mut dyn RemoteStore) {
        if self.clock.paused {
            return;
        }
        let delta = self.clock.advance();

        if let Some(event) = self.economy.tick(delta) {
            self.dispatch_events(vec![event]);
        }

        if self.quests.tick(delta, &mut self.rng) {
            self.notify(Notification::QuestPoolChanged);
        }

        let now = self.clock.now();
        for outcome in self.sync.pump(now, store) {
            self.apply_sync_outcome(outcome, store);
        }

        if self
            .sync
            .auto_save_due(now, live_progress_metric(&self.economy))
        {
            log::debug!("auto-save triggered");
            self.save_now(store);
        }
    }

    pub fn time_until_quest_refresh(&self) -> f64 {
        self.quests.time_until_refresh()
    }

    /// Capture and transmit a snapshot, honoring single-flight and
    /// pre-send validation.
    pub fn save_now(&mut self, store: &mut dyn RemoteStore) {
        let snapshot = GameSnapshot::capture(&self.economy, &self.ledger);
        match self.sync.request_save(&snapshot, self.clock.now(), store) {
            SaveRequest::Started
            | SaveRequest::DroppedInFlight
            | SaveRequest::NotLoggedIn => {}
            SaveRequest::Rejected(rejection) => {
                self.notify(Notification::SaveRejected {
                    reason: rejection.to_string(),
                });
            }
        }
    }

    pub fn load_now(&mut self, store: &mut dyn RemoteStore) {
        self.sync.request_load(store);
    }

    /// End the session: abandon in-flight sync continuations.
    pub fn shutdown(&mut self) {
        self.sync.log_out();
        self.clock.pause();
    }

    // ── Internals ──────────────────────────────────────────────

    /// Map completed sync operations to state changes and
    /// notifications. A successful login immediately requests a load,
    /// mirroring the session-start handshake.
    fn apply_sync_outcome(&mut self, outcome: SyncOutcome, store: &mut dyn RemoteStore) {
        match outcome {
            SyncOutcome::LoggedIn { player_id } => {
                self.notify(Notification::LoginSucceeded { player_id });
                self.sync.request_load(store);
            }
            SyncOutcome::LoginFailed => self.notify(Notification::LoginFailed),
            SyncOutcome::Saved => self.notify(Notification::DataSaved),
            SyncOutcome::SaveFailed => self.notify(Notification::SaveFailed),
            SyncOutcome::Loaded(snapshot) => {
                snapshot.apply(&mut self.economy, &mut self.ledger);
                self.sync
                    .rebaseline(self.clock.now(), live_progress_metric(&self.economy));
                self.notify(Notification::DataLoaded);
                self.notify(Notification::EconomyChanged);
            }
            SyncOutcome::LoadFailed => self.notify(Notification::LoadFailed),
            SyncOutcome::NoSaveFound => self.notify(Notification::NoSaveFound),
        }
    }

    /// Fan events out to the quest engine, in raised order, and queue
    /// the presentation notifications. One aggregated pool-changed
    /// signal per batch, never one per instance.
    fn dispatch_events(&mut self, events: Vec<GameEvent>) {
        let (economy_changed, pool_changed) = self.fan_out(events);
        if economy_changed {
            self.notify(Notification::EconomyChanged);
        }
        if pool_changed {
            self.notify(Notification::QuestPoolChanged);
        }
    }

    /// Feed events to the quest engine in raised order. Returns
    /// (economy changed, quest pool changed) without queuing
    /// notifications — the caller aggregates those.
    fn fan_out(&mut self, events: Vec<GameEvent>) -> (bool, bool) {
        let mut pool_changed = false;
        let mut economy_changed = false;

        for event in events {
            match event {
                GameEvent::ResourceEarned { amount, manual } => {
                    economy_changed = true;
                    pool_changed |= self
                        .quests
                        .record_event(ObjectiveType::EarnResources, amount);
                    if manual {
                        pool_changed |=
                            self.quests.record_event(ObjectiveType::ManualActions, 1);
                    }
                }
                GameEvent::ResourceSpent { amount } => {
                    economy_changed = true;
                    pool_changed |= self
                        .quests
                        .record_event(ObjectiveType::SpendResources, amount);
                }
                GameEvent::UpgradePurchased { kind, .. } => {
                    economy_changed = true;
                    let objective = match kind {
                        crate::catalog::UpgradeKind::RateBoost => {
                            Some(ObjectiveType::BuyRateBoosts)
                        }
                        crate::catalog::UpgradeKind::PowerBoost => {
                            Some(ObjectiveType::BuyPowerBoosts)
                        }
                        crate::catalog::UpgradeKind::CosmeticSkin => None,
                    };
                    if let Some(objective) = objective {
                        pool_changed |= self.quests.record_event(objective, 1);
                    }
                }
                GameEvent::SkinChanged { .. } => {
                    pool_changed |= self
                        .quests
                        .record_event(ObjectiveType::ChangeCosmetic, 1);
                }
                GameEvent::RewardClaimed { .. } => {
                    // The credited reward arrives as its own
                    // ResourceEarned event.
                }
            }
        }

        (economy_changed, pool_changed)
    }

    fn notify(&mut self, notification: Notification) {
        self.notifications.push_back(notification);
    }
}
