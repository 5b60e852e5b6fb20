//! Shared primitive types used across the entire engine.

/// One step of the logical game clock.
pub type Tick = u64;

/// Elapsed game time in seconds, advanced by the logical clock.
pub type Seconds = f64;

/// Index of a slot in the upgrade catalog.
pub type SlotIndex = usize;

/// Session-unique identifier of an active quest instance.
pub type QuestId = u64;
