use crate::types::{QuestId, SlotIndex};
use serde::{Deserialize, Serialize};

/// All commands the presentation layer can issue.
/// Variants are added over time — never removed or reordered.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum PlayerCommand {
    /// One manual action (a click), worth the current click power.
    ManualAction,
    Purchase { index: SlotIndex },
    ClaimQuest { quest_id: QuestId },
    /// Re-equip an already-owned cosmetic.
    EquipCosmetic { index: SlotIndex },
    ManualSave,
    ManualLoad,
    /// Application backgrounded or lost focus — save opportunity.
    FocusLost,
}
