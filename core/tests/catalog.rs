use clicker_core::catalog::{PurchaseOutcome, UpgradeLedger};
use clicker_core::config::GameConfig;
use clicker_core::economy::EconomyState;

// ── Test helpers ────────────────────────────────────────────────────

// Default catalog layout: slots 0-1 rate boosts (100, 500),
// slots 2-3 power boosts (200, 750), slots 4-5 cosmetics (250, 1000).
fn make_ledger() -> UpgradeLedger {
    UpgradeLedger::from_config(&GameConfig::default().catalog)
}

fn rich_economy() -> EconomyState {
    let mut economy = EconomyState::new(1);
    economy.credit(1_000_000, false);
    economy
}

// ── Pricing ─────────────────────────────────────────────────────────

/// Boost price follows round(base × 1.5^level): 200 at level 0, 300
/// after one purchase, 450 after two.
#[test]
fn boost_price_grows_exponentially() {
    let mut ledger = make_ledger();
    let mut economy = rich_economy();

    assert_eq!(ledger.price_of(2), Some(200));

    let (outcome, _) = ledger.purchase(2, &mut economy);
    assert_eq!(outcome, PurchaseOutcome::Applied);
    assert_eq!(ledger.price_of(2), Some(300));

    ledger.purchase(2, &mut economy);
    assert_eq!(ledger.price_of(2), Some(450));
}

/// Cosmetic price never moves; cosmetics have no level.
#[test]
fn cosmetic_price_is_flat() {
    let mut ledger = make_ledger();
    let mut economy = rich_economy();

    assert_eq!(ledger.price_of(4), Some(250));
    ledger.purchase(4, &mut economy);
    assert_eq!(ledger.price_of(4), Some(250));
    assert_eq!(ledger.entry(4).map(|e| e.level), Some(0));
}

#[test]
fn price_of_unknown_slot_is_none() {
    let ledger = make_ledger();
    assert_eq!(ledger.price_of(99), None);
}

// ── Purchase semantics ──────────────────────────────────────────────

/// A failed purchase (insufficient funds) must leave no trace: no
/// debit, no level change.
#[test]
fn insufficient_funds_is_atomic() {
    let mut ledger = make_ledger();
    let mut economy = EconomyState::new(1);
    economy.credit(50, false);

    let (outcome, events) = ledger.purchase(0, &mut economy);

    assert_eq!(outcome, PurchaseOutcome::InsufficientFunds);
    assert!(events.is_empty());
    assert_eq!(economy.balance, 50);
    assert_eq!(ledger.entry(0).map(|e| e.level), Some(0));
}

#[test]
fn invalid_index_is_rejected_without_charge() {
    let mut ledger = make_ledger();
    let mut economy = rich_economy();
    let before = economy.balance;

    let (outcome, _) = ledger.purchase(42, &mut economy);

    assert_eq!(outcome, PurchaseOutcome::InvalidIndex);
    assert_eq!(economy.balance, before);
}

/// Repurchasing an owned cosmetic is rejected before any debit.
#[test]
fn owned_cosmetic_cannot_be_repurchased() {
    let mut ledger = make_ledger();
    let mut economy = rich_economy();

    assert_eq!(ledger.purchase(4, &mut economy).0, PurchaseOutcome::Applied);
    let balance_after_first = economy.balance;

    let (outcome, events) = ledger.purchase(4, &mut economy);

    assert_eq!(outcome, PurchaseOutcome::AlreadyOwned);
    assert!(events.is_empty());
    assert_eq!(economy.balance, balance_after_first);
}

/// A rate-boost purchase debits the price, bumps the level, and raises
/// the auto rate by the slot's gain.
#[test]
fn rate_boost_purchase_applies_full_effect() {
    let mut ledger = make_ledger();
    let mut economy = rich_economy();
    let before = economy.balance;

    let (outcome, events) = ledger.purchase(0, &mut economy);

    assert_eq!(outcome, PurchaseOutcome::Applied);
    assert_eq!(economy.balance, before - 100);
    assert_eq!(ledger.entry(0).map(|e| e.level), Some(1));
    assert!((economy.auto_rate - 1.0).abs() < 1e-9);
    assert_eq!(ledger.rate_boosts_bought(), 1);
    // Debit event first, then the purchase event.
    assert_eq!(events.len(), 2);
}

/// Boost levels have no cap — every successful purchase increments.
#[test]
fn boost_levels_are_uncapped() {
    let mut ledger = make_ledger();
    let mut economy = EconomyState::new(1);
    economy.credit(u32::MAX as u64, false);

    for _ in 0..10 {
        let (outcome, _) = ledger.purchase(2, &mut economy);
        assert_eq!(outcome, PurchaseOutcome::Applied);
    }
    assert_eq!(ledger.entry(2).map(|e| e.level), Some(10));
    assert_eq!(economy.click_power(), 11);
}

// ── Cosmetics and ownership ─────────────────────────────────────────

/// Buying a cosmetic equips it and counts one skin change.
#[test]
fn cosmetic_purchase_equips_immediately() {
    let mut ledger = make_ledger();
    let mut economy = rich_economy();

    ledger.purchase(4, &mut economy);

    assert_eq!(ledger.equipped_cosmetic(), Some(4));
    assert_eq!(ledger.skins_changed(), 1);
    assert_eq!(ledger.owned_cosmetics(), vec![4]);
}

/// The ownership snapshot is a copy — mutating it leaves the ledger
/// untouched.
#[test]
fn owned_cosmetics_returns_a_snapshot_copy() {
    let mut ledger = make_ledger();
    let mut economy = rich_economy();
    ledger.purchase(4, &mut economy);

    let mut owned = ledger.owned_cosmetics();
    owned.push(5);
    owned.clear();

    assert_eq!(ledger.owned_cosmetics(), vec![4]);
}

/// Re-equipping an owned skin counts a change; equipping the current
/// one or an unowned slot does nothing.
#[test]
fn equip_only_switches_between_owned_skins() {
    let mut ledger = make_ledger();
    let mut economy = rich_economy();
    ledger.purchase(4, &mut economy);
    ledger.purchase(5, &mut economy); // equips 5

    assert!(ledger.equip(4).is_some());
    assert_eq!(ledger.equipped_cosmetic(), Some(4));
    assert_eq!(ledger.skins_changed(), 3);

    assert!(ledger.equip(4).is_none(), "already equipped");
    assert!(ledger.equip(0).is_none(), "not a cosmetic");
    assert_eq!(ledger.skins_changed(), 3);
}
