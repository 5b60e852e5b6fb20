//! Upgrade catalog and purchase ledger.
//!
//! One entry per catalog slot, indexed. Boosts (rate, power) level up
//! with an exponential price curve; cosmetics are one-time purchases
//! tracked in an ownership set.

use crate::config::UpgradeConfig;
use crate::economy::EconomyState;
use crate::event::GameEvent;
use crate::types::SlotIndex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Price growth factor per boost level.
const PRICE_GROWTH: f64 = 1.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpgradeKind {
    RateBoost,
    PowerBoost,
    CosmeticSkin,
}

#[derive(Debug, Clone)]
pub struct UpgradeEntry {
    pub label: String,
    pub kind: UpgradeKind,
    pub base_price: u64,
    /// Click-power gained per purchase (power boosts only).
    pub power_gain: u64,
    /// Units/second gained per purchase (rate boosts only).
    pub rate_gain: f64,
    /// Purchase count. Always 0 for cosmetics — they have no level.
    pub level: u32,
}

/// Outcome of a purchase attempt. User errors are values, not errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PurchaseOutcome {
    Applied,
    InsufficientFunds,
    AlreadyOwned,
    InvalidIndex,
}

pub struct UpgradeLedger {
    entries: Vec<UpgradeEntry>,
    owned_cosmetics: BTreeSet<SlotIndex>,
    equipped_cosmetic: Option<SlotIndex>,
    skins_changed: u64,
    rate_boosts_bought: u64,
    power_boosts_bought: u64,
}

impl UpgradeLedger {
    pub fn from_config(catalog: &[UpgradeConfig]) -> Self {
        let entries = catalog
            .iter()
            .map(|c| UpgradeEntry {
                label: c.label.clone(),
                kind: c.kind,
                base_price: c.base_price,
                power_gain: c.power_gain,
                rate_gain: c.rate_gain,
                level: 0,
            })
            .collect();
        Self {
            entries,
            owned_cosmetics: BTreeSet::new(),
            equipped_cosmetic: None,
            skins_changed: 0,
            rate_boosts_bought: 0,
            power_boosts_bought: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entry(&self, index: SlotIndex) -> Option<&UpgradeEntry> {
        self.entries.get(index)
    }

    /// Current price of a slot. Recomputed on every query — it depends
    /// on the mutable level and must never be cached.
    pub fn price_of(&self, index: SlotIndex) -> Option<u64> {
        let entry = self.entries.get(index)?;
        let price = match entry.kind {
            UpgradeKind::CosmeticSkin => entry.base_price,
            UpgradeKind::RateBoost | UpgradeKind::PowerBoost => {
                let scaled =
                    entry.base_price as f64 * PRICE_GROWTH.powi(entry.level as i32);
                scaled.round() as u64
            }
        };
        Some(price)
    }

    /// Attempt a purchase. Atomic: either the debit, the level or
    /// ownership change, and the emitted events all happen, or nothing
    /// does. On success the returned events are ordered debit first.
    pub fn purchase(
        &mut self,
        index: SlotIndex,
        economy: &mut EconomyState,
    ) -> (PurchaseOutcome, Vec<GameEvent>) {
        let Some(entry) = self.entries.get(index) else {
            return (PurchaseOutcome::InvalidIndex, Vec::new());
        };
        let kind = entry.kind;

        if kind == UpgradeKind::CosmeticSkin && self.owned_cosmetics.contains(&index) {
            return (PurchaseOutcome::AlreadyOwned, Vec::new());
        }

        // price_of cannot fail here — the index was just checked.
        let price = self.price_of(index).unwrap_or(u64::MAX);
        let Some(spent) = economy.debit(price) else {
            return (PurchaseOutcome::InsufficientFunds, Vec::new());
        };

        let mut events = vec![spent];
        match kind {
            UpgradeKind::RateBoost => {
                let gain = self.entries[index].rate_gain;
                self.entries[index].level += 1;
                self.rate_boosts_bought += 1;
                economy.apply_rate_boost(gain);
                events.push(GameEvent::UpgradePurchased { index, kind });
            }
            UpgradeKind::PowerBoost => {
                let gain = self.entries[index].power_gain;
                self.entries[index].level += 1;
                self.power_boosts_bought += 1;
                economy.apply_power_boost(gain);
                events.push(GameEvent::UpgradePurchased { index, kind });
            }
            UpgradeKind::CosmeticSkin => {
                self.owned_cosmetics.insert(index);
                events.push(GameEvent::UpgradePurchased { index, kind });
                // A freshly bought skin is equipped immediately.
                self.equipped_cosmetic = Some(index);
                self.skins_changed += 1;
                events.push(GameEvent::SkinChanged { index });
            }
        }
        log::debug!("purchased slot {index} ({kind:?}) for {price}");
        (PurchaseOutcome::Applied, events)
    }

    /// Re-equip an already-owned cosmetic. Returns the change event,
    /// or `None` if the slot is not an owned cosmetic or is already
    /// equipped.
    pub fn equip(&mut self, index: SlotIndex) -> Option<GameEvent> {
        if !self.owned_cosmetics.contains(&index) {
            return None;
        }
        if self.equipped_cosmetic == Some(index) {
            return None;
        }
        self.equipped_cosmetic = Some(index);
        self.skins_changed += 1;
        Some(GameEvent::SkinChanged { index })
    }

    /// Snapshot copy of the ownership set. Mutating the returned vec
    /// never touches the ledger.
    pub fn owned_cosmetics(&self) -> Vec<SlotIndex> {
        self.owned_cosmetics.iter().copied().collect()
    }

    pub fn equipped_cosmetic(&self) -> Option<SlotIndex> {
        self.equipped_cosmetic
    }

    pub fn skins_changed(&self) -> u64 {
        self.skins_changed
    }

    pub fn rate_boosts_bought(&self) -> u64 {
        self.rate_boosts_bought
    }

    pub fn power_boosts_bought(&self) -> u64 {
        self.power_boosts_bought
    }

    /// Levels of every slot with at least one purchase.
    pub fn upgrade_levels(&self) -> Vec<(SlotIndex, u32)> {
        self.entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.level > 0)
            .map(|(i, e)| (i, e.level))
            .collect()
    }

    /// Wholesale replacement on load. Unknown indices (a save from a
    /// larger catalog) are dropped with a warning rather than failing
    /// the load.
    pub fn replace(
        &mut self,
        levels: &[(SlotIndex, u32)],
        owned: &[SlotIndex],
        equipped: Option<SlotIndex>,
        skins_changed: u64,
        rate_boosts_bought: u64,
        power_boosts_bought: u64,
    ) {
        for entry in &mut self.entries {
            entry.level = 0;
        }
        for &(index, level) in levels {
            match self.entries.get_mut(index) {
                Some(entry) => entry.level = level,
                None => log::warn!("dropping saved level for unknown slot {index}"),
            }
        }
        self.owned_cosmetics = owned
            .iter()
            .copied()
            .filter(|&i| {
                let known = matches!(
                    self.entries.get(i).map(|e| e.kind),
                    Some(UpgradeKind::CosmeticSkin)
                );
                if !known {
                    log::warn!("dropping saved cosmetic for unknown slot {i}");
                }
                known
            })
            .collect();
        self.equipped_cosmetic = equipped.filter(|i| self.owned_cosmetics.contains(i));
        self.skins_changed = skins_changed;
        self.rate_boosts_bought = rate_boosts_bought;
        self.power_boosts_bought = power_boosts_bought;
    }
}
