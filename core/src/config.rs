//! Typed configuration — the upgrade catalog, the quest template
//! table, and sync tuning.
//!
//! Quest templates are a static data table loaded once at startup and
//! immutable thereafter. The built-in defaults describe the stock
//! cookie game; embedders may load their own table from JSON.

use crate::catalog::UpgradeKind;
use crate::error::GameResult;
use crate::quest::{ObjectiveType, QuestTemplate};
use crate::types::Seconds;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpgradeConfig {
    pub label: String,
    pub kind: UpgradeKind,
    pub base_price: u64,
    #[serde(default)]
    pub power_gain: u64,
    #[serde(default)]
    pub rate_gain: f64,
}

/// What happens to completed-but-unclaimed quests when the pool
/// refreshes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefreshPolicy {
    /// Discard everything, forfeiting unclaimed rewards.
    Forfeit,
    /// Keep completed-unclaimed instances; only the rest are redrawn.
    CarryOver,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestConfig {
    pub active_quest_count: usize,
    pub refresh_interval_seconds: Seconds,
    pub refresh_policy: RefreshPolicy,
    pub templates: Vec<QuestTemplate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    pub auto_save_interval_seconds: Seconds,
    /// Auto-save once earned + spent + 0.1 × manual actions has grown
    /// by this much since the last save.
    pub progress_delta_threshold: f64,
    pub login_retry_delay_seconds: Seconds,
    /// Sanity ceiling for the balance. An anti-corruption guard, not
    /// anti-cheat enforcement.
    pub balance_ceiling: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameConfig {
    pub base_click_power: u64,
    pub tick_interval_seconds: Seconds,
    pub catalog: Vec<UpgradeConfig>,
    pub quests: QuestConfig,
    pub sync: SyncConfig,
}

impl GameConfig {
    pub fn from_json(json: &str) -> GameResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            base_click_power: 1,
            tick_interval_seconds: 0.1,
            catalog: default_catalog(),
            quests: QuestConfig {
                active_quest_count: 3,
                refresh_interval_seconds: 300.0,
                refresh_policy: RefreshPolicy::Forfeit,
                templates: default_quest_templates(),
            },
            sync: SyncConfig {
                auto_save_interval_seconds: 180.0,
                progress_delta_threshold: 500.0,
                login_retry_delay_seconds: 5.0,
                balance_ceiling: 999_999_999,
            },
        }
    }
}

fn default_catalog() -> Vec<UpgradeConfig> {
    fn rate(label: &str, base_price: u64, rate_gain: f64) -> UpgradeConfig {
        UpgradeConfig {
            label: label.to_string(),
            kind: UpgradeKind::RateBoost,
            base_price,
            power_gain: 0,
            rate_gain,
        }
    }
    fn power(label: &str, base_price: u64, power_gain: u64) -> UpgradeConfig {
        UpgradeConfig {
            label: label.to_string(),
            kind: UpgradeKind::PowerBoost,
            base_price,
            power_gain,
            rate_gain: 0.0,
        }
    }
    fn skin(label: &str, base_price: u64) -> UpgradeConfig {
        UpgradeConfig {
            label: label.to_string(),
            kind: UpgradeKind::CosmeticSkin,
            base_price,
            power_gain: 0,
            rate_gain: 0.0,
        }
    }
    vec![
        rate("Auto Clicker", 100, 1.0),
        rate("Cookie Factory", 500, 5.0),
        power("Click Multiplier", 200, 1),
        power("Golden Finger", 750, 2),
        skin("Chocolate Cookie", 250),
        skin("Rainbow Cookie", 1000),
    ]
}

fn default_quest_templates() -> Vec<QuestTemplate> {
    fn quest(
        title: &str,
        description: &str,
        objective: ObjectiveType,
        target_amount: u64,
        reward_amount: u64,
    ) -> QuestTemplate {
        QuestTemplate {
            title: title.to_string(),
            description: description.to_string(),
            objective,
            target_amount,
            reward_amount,
        }
    }
    vec![
        quest(
            "Cookie Clicker Novice",
            "Click cookies {target} times",
            ObjectiveType::ManualActions,
            50,
            100,
        ),
        quest(
            "Big Spender",
            "Spend {target} cookies",
            ObjectiveType::SpendResources,
            200,
            150,
        ),
        quest(
            "Cookie Collector",
            "Earn {target} cookies total",
            ObjectiveType::EarnResources,
            500,
            250,
        ),
        quest(
            "Automation Enthusiast",
            "Buy {target} Auto Clickers",
            ObjectiveType::BuyRateBoosts,
            2,
            200,
        ),
        quest(
            "Power User",
            "Buy {target} Click Multipliers",
            ObjectiveType::BuyPowerBoosts,
            3,
            300,
        ),
        quest(
            "Style Master",
            "Change cookie skin {target} time",
            ObjectiveType::ChangeCosmetic,
            1,
            100,
        ),
    ]
}
