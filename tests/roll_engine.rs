//! Integration tests for weighted, tier-gated shop rolls

use autobattler::shop::{Catalog, CreatureInstance, ItemInstance, RollEngine, ShopError};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde_json::json;
use std::sync::Arc;

fn single_template_catalog() -> Catalog {
    Catalog::from_value(json!({
        "pets": {
            "A": {
                "tier": 1,
                "packs": ["StandardPack"],
                "baseAttack": 1,
                "baseHealth": 1,
                "probabilities": [
                    { "turn": 1, "perSlot": { "StandardPack": 1.0 } }
                ]
            }
        },
        "turns": {
            "turn-1": { "levelUpTier": 3, "creatureShopSlots": 3, "itemShopSlots": 0 }
        }
    }))
    .unwrap()
}

fn tiered_catalog() -> Catalog {
    let mut pets = serde_json::Map::new();
    for tier in 1..=6 {
        for n in 0..3 {
            pets.insert(
                format!("pet-t{}-{}", tier, n),
                json!({
                    "tier": tier,
                    "packs": ["StandardPack"],
                    "baseAttack": tier,
                    "baseHealth": tier,
                    "probabilities": [
                        { "turn": "turn-1", "perSlot": { "StandardPack": 1.0 } }
                    ]
                }),
            );
        }
    }
    pets.insert(
        "pet-expansion".to_string(),
        json!({
            "tier": 1,
            "packs": ["ExpansionPack1"],
            "baseAttack": 1,
            "baseHealth": 1,
            "probabilities": [{ "turn": 1, "perSlot": { "ExpansionPack1": 5.0 } }]
        }),
    );
    pets.insert(
        "pet-bee".to_string(),
        json!({
            "tier": "N/A",
            "packs": ["StandardPack"],
            "baseAttack": 1,
            "baseHealth": 1,
            "probabilities": [{ "turn": 1, "perSlot": { "StandardPack": 5.0 } }]
        }),
    );

    Catalog::from_value(json!({
        "pets": pets,
        "foods": {
            "food-apple": {
                "tier": 1,
                "packs": ["StandardPack"],
                "probabilities": [{ "turn": 1, "perSlot": { "StandardPack": 1.0 } }]
            },
            "food-steak": {
                "tier": 6,
                "packs": ["StandardPack"],
                "probabilities": [{ "turn": 1, "perSlot": { "StandardPack": 1.0 } }]
            }
        },
        "turns": {
            "turn-1": { "levelUpTier": 2, "animalShopSlots": 3, "foodShopSlots": 1 },
            "turn-3": { "levelUpTier": 3, "animalShopSlots": 3, "foodShopSlots": 2 },
            "turn-5": { "levelUpTier": 4, "animalShopSlots": 4, "foodShopSlots": 2 },
            "turn-9": { "levelUpTier": 7, "animalShopSlots": 5, "foodShopSlots": 2 }
        }
    }))
    .unwrap()
}

#[test]
fn test_single_template_fills_every_slot() {
    let catalog = single_template_catalog();
    let engine = RollEngine::new(&catalog, "StandardPack");
    let mut rng = StdRng::seed_from_u64(1);

    let slate = engine.roll(1, &[], &[], &mut rng).unwrap();
    assert_eq!(slate.creatures.len(), 3);
    assert!(slate.creatures.iter().all(|c| c.template_id() == "A"));
    assert!(slate.items.is_empty());

    // Independent draws still give every copy its own identity.
    assert_ne!(slate.creatures[0].id(), slate.creatures[1].id());
    assert_ne!(slate.creatures[1].id(), slate.creatures[2].id());
}

#[test]
fn test_every_offer_is_below_level_up_tier() {
    let catalog = tiered_catalog();
    let engine = RollEngine::new(&catalog, "StandardPack");

    for seed in 0..25 {
        let mut rng = StdRng::seed_from_u64(seed);
        for turn in 1..=10 {
            let limit = catalog.turn_config(turn).unwrap().level_up_tier;
            let slate = engine.roll(turn, &[], &[], &mut rng).unwrap();
            for creature in &slate.creatures {
                let tier = creature.template().tier.value().unwrap();
                assert!(tier < limit, "turn {} offered tier {}", turn, tier);
            }
            for item in &slate.items {
                assert!(item.tier().value().unwrap() < limit);
            }
        }
    }
}

#[test]
fn test_other_packs_and_unobtainable_never_offered() {
    let catalog = tiered_catalog();
    let engine = RollEngine::new(&catalog, "StandardPack");
    let mut rng = StdRng::seed_from_u64(99);

    for _ in 0..50 {
        let slate = engine.roll(1, &[], &[], &mut rng).unwrap();
        for creature in &slate.creatures {
            assert_ne!(creature.template_id(), "pet-expansion");
            assert_ne!(creature.template_id(), "pet-bee");
        }
    }

    // The expansion shop only knows its own template.
    let expansion = RollEngine::new(&catalog, "ExpansionPack1");
    let slate = expansion.roll(1, &[], &[], &mut rng).unwrap();
    assert_eq!(slate.creatures.len(), 3);
    assert!(slate
        .creatures
        .iter()
        .all(|c| c.template_id() == "pet-expansion"));
    assert!(slate.items.is_empty());
}

#[test]
fn test_frozen_entries_kept_and_only_remaining_slots_drawn() {
    let catalog = tiered_catalog();
    let engine = RollEngine::new(&catalog, "StandardPack");
    let mut rng = StdRng::seed_from_u64(5);

    // Frozen copies of a tier the current turn would never offer.
    let high = Arc::clone(catalog.creature("pet-t6-0").unwrap());
    let frozen: Vec<CreatureInstance> = (0..2)
        .map(|_| CreatureInstance::materialize(Arc::clone(&high), &mut rng))
        .collect();
    let frozen_item = ItemInstance::materialize(
        Arc::clone(catalog.item("food-steak").unwrap()),
        &mut rng,
    );

    let slate = engine
        .roll(1, &frozen, std::slice::from_ref(&frozen_item), &mut rng)
        .unwrap();

    assert_eq!(slate.creatures.len(), 3);
    assert_eq!(slate.creatures[0], frozen[0]);
    assert_eq!(slate.creatures[1], frozen[1]);
    assert_eq!(slate.creatures[2].template().tier.value(), Some(1));

    // The single item slot is already taken by the frozen item.
    assert_eq!(slate.items, vec![frozen_item]);
}

#[test]
fn test_frozen_beyond_slot_count_clamps_draws_to_zero() {
    let catalog = single_template_catalog();
    let engine = RollEngine::new(&catalog, "StandardPack");
    let mut rng = StdRng::seed_from_u64(8);

    let template = Arc::clone(catalog.creature("A").unwrap());
    let frozen: Vec<CreatureInstance> = (0..5)
        .map(|_| CreatureInstance::materialize(Arc::clone(&template), &mut rng))
        .collect();

    let slate = engine.roll(1, &frozen, &[], &mut rng).unwrap();
    assert_eq!(slate.creatures, frozen);
}

#[test]
fn test_same_seed_same_slate() {
    let catalog = tiered_catalog();
    let engine = RollEngine::new(&catalog, "StandardPack");

    let mut a = StdRng::seed_from_u64(1234);
    let mut b = StdRng::seed_from_u64(1234);
    for turn in 1..=6 {
        let left = engine.roll(turn, &[], &[], &mut a).unwrap();
        let right = engine.roll(turn, &[], &[], &mut b).unwrap();
        assert_eq!(left, right);
    }
}

#[test]
fn test_later_turns_reuse_last_configuration() {
    let catalog = tiered_catalog();
    let engine = RollEngine::new(&catalog, "StandardPack");
    let mut rng = StdRng::seed_from_u64(3);

    let slate = engine.roll(30, &[], &[], &mut rng).unwrap();
    assert_eq!(slate.creatures.len(), 5);
    assert_eq!(slate.items.len(), 2);
}

#[test]
fn test_turn_zero_is_a_contract_violation() {
    let catalog = single_template_catalog();
    let engine = RollEngine::new(&catalog, "StandardPack");
    let mut rng = StdRng::seed_from_u64(3);
    assert!(matches!(
        engine.roll(0, &[], &[], &mut rng),
        Err(ShopError::UnknownTurn(0))
    ));
}
