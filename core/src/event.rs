//! The event bus — economy mutations fan out to the quest engine and
//! the save-trigger check through these events.
//!
//! RULE: events are processed in the order they are raised. A credit
//! finishes updating the balance before the quest progress it drives is
//! computed, and that finishes before any save-trigger check runs.

use crate::catalog::{PurchaseOutcome, UpgradeKind};
use crate::types::{QuestId, SlotIndex};
use serde::{Deserialize, Serialize};

/// Every event emitted by a state mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameEvent {
    ResourceEarned { amount: u64, manual: bool },
    ResourceSpent { amount: u64 },
    UpgradePurchased { index: SlotIndex, kind: UpgradeKind },
    SkinChanged { index: SlotIndex },
    RewardClaimed { quest_id: QuestId, amount: u64 },
}

/// Outbound status notifications consumed by the presentation layer.
///
/// The session queues these; the embedder drains them after each
/// command or tick. No callback is ever wired into core logic, so the
/// engine is fully testable without a presentation layer attached.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Notification {
    LoginSucceeded { player_id: String },
    LoginFailed,
    DataSaved,
    SaveFailed,
    /// Snapshot failed local validation; no network call was made.
    SaveRejected { reason: String },
    /// A purchase attempt did not go through; `outcome` says why.
    PurchaseRejected { index: SlotIndex, outcome: PurchaseOutcome },
    DataLoaded,
    LoadFailed,
    /// Neither primary nor backup key held a usable save. Fresh start,
    /// not an error.
    NoSaveFound,
    QuestPoolChanged,
    EconomyChanged,
}
