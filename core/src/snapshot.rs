//! Snapshot serialization — the full persistent game state to/from
//! JSON.
//!
//! Wire fields use signed integers so a corrupted or hand-edited save
//! still parses and is then rejected by `validate` instead of failing
//! opaquely in deserialization. Active quests are deliberately absent:
//! the pool is session-scoped and redrawn after a load.

use crate::catalog::UpgradeLedger;
use crate::economy::EconomyState;
use crate::error::GameResult;
use crate::types::SlotIndex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Bump on any incompatible format change.
pub const SNAPSHOT_VERSION: u32 = 1;

/// `saved_at` wire format, e.g. `2026-08-30 14:03:17`.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpgradeSave {
    pub index: SlotIndex,
    pub level: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub balance: i64,
    pub click_multiplier: i64,
    pub auto_rate: f64,
    pub total_earned: i64,
    pub total_spent: i64,
    pub total_manual_actions: i64,
    pub rate_boosts_bought: i64,
    pub power_boosts_bought: i64,
    pub skins_changed: i64,
    /// Every slot with level > 0.
    pub upgrades: Vec<UpgradeSave>,
    pub owned_cosmetics: Vec<SlotIndex>,
    /// -1 when no cosmetic is equipped.
    pub equipped_cosmetic: i64,
    pub saved_at: String,
    pub version: u32,
}

/// Why a snapshot failed the sanity check. Recovered locally (backup
/// key or fresh state) — never fatal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SnapshotRejection {
    #[error("negative value in field '{field}'")]
    NegativeValue { field: &'static str },

    #[error("balance {balance} exceeds sanity ceiling {ceiling}")]
    BalanceCeiling { balance: i64, ceiling: u64 },

    #[error("auto rate is not a finite non-negative number")]
    BadAutoRate,

    #[error("balance {balance} != earned {earned} - spent {spent}")]
    CounterDrift {
        balance: i64,
        earned: i64,
        spent: i64,
    },

    #[error("unsupported snapshot version {0}")]
    UnsupportedVersion(u32),

    #[error("snapshot could not be serialized: {0}")]
    Unserializable(String),
}

impl GameSnapshot {
    /// Capture the current persistent state. `saved_at` is stamped
    /// with the current UTC time.
    pub fn capture(economy: &EconomyState, ledger: &UpgradeLedger) -> Self {
        Self {
            balance: economy.balance as i64,
            click_multiplier: economy.click_multiplier as i64,
            auto_rate: economy.auto_rate,
            total_earned: economy.total_earned as i64,
            total_spent: economy.total_spent as i64,
            total_manual_actions: economy.total_manual_actions as i64,
            rate_boosts_bought: ledger.rate_boosts_bought() as i64,
            power_boosts_bought: ledger.power_boosts_bought() as i64,
            skins_changed: ledger.skins_changed() as i64,
            upgrades: ledger
                .upgrade_levels()
                .into_iter()
                .map(|(index, level)| UpgradeSave { index, level })
                .collect(),
            owned_cosmetics: ledger.owned_cosmetics(),
            equipped_cosmetic: ledger
                .equipped_cosmetic()
                .map(|i| i as i64)
                .unwrap_or(-1),
            saved_at: chrono::Utc::now().format(TIMESTAMP_FORMAT).to_string(),
            version: SNAPSHOT_VERSION,
        }
    }

    pub fn to_json(&self) -> GameResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> GameResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Sanity check, run both before transmission and on receipt.
    pub fn validate(&self, balance_ceiling: u64) -> Result<(), SnapshotRejection> {
        let signed_fields: [(&'static str, i64); 8] = [
            ("balance", self.balance),
            ("click_multiplier", self.click_multiplier),
            ("total_earned", self.total_earned),
            ("total_spent", self.total_spent),
            ("total_manual_actions", self.total_manual_actions),
            ("rate_boosts_bought", self.rate_boosts_bought),
            ("power_boosts_bought", self.power_boosts_bought),
            ("skins_changed", self.skins_changed),
        ];
        for (field, value) in signed_fields {
            if value < 0 {
                return Err(SnapshotRejection::NegativeValue { field });
            }
        }
        if !self.auto_rate.is_finite() || self.auto_rate < 0.0 {
            return Err(SnapshotRejection::BadAutoRate);
        }
        if self.balance as u64 > balance_ceiling {
            return Err(SnapshotRejection::BalanceCeiling {
                balance: self.balance,
                ceiling: balance_ceiling,
            });
        }
        if self.balance != self.total_earned - self.total_spent {
            return Err(SnapshotRejection::CounterDrift {
                balance: self.balance,
                earned: self.total_earned,
                spent: self.total_spent,
            });
        }
        if self.version == 0 || self.version > SNAPSHOT_VERSION {
            return Err(SnapshotRejection::UnsupportedVersion(self.version));
        }
        Ok(())
    }

    /// Load-replace into a live economy and ledger. The snapshot must
    /// already have passed `validate` — values are assumed
    /// non-negative here.
    pub fn apply(&self, economy: &mut EconomyState, ledger: &mut UpgradeLedger) {
        economy.replace(
            self.balance as u64,
            self.click_multiplier as u64,
            self.auto_rate,
            self.total_earned as u64,
            self.total_spent as u64,
            self.total_manual_actions as u64,
        );
        let levels: Vec<(SlotIndex, u32)> = self
            .upgrades
            .iter()
            .map(|u| (u.index, u.level))
            .collect();
        let equipped = if self.equipped_cosmetic >= 0 {
            Some(self.equipped_cosmetic as SlotIndex)
        } else {
            None
        };
        ledger.replace(
            &levels,
            &self.owned_cosmetics,
            equipped,
            self.skins_changed as u64,
            self.rate_boosts_bought as u64,
            self.power_boosts_bought as u64,
        );
    }
}
