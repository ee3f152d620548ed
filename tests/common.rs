//! Test utilities & fixtures.
//! A tiny catalog with one shop creature, one shop item and a few
//! trigger-bearing creatures that never appear in the shop.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use autobattler::config::ShopConfig;
use autobattler::shop::{Catalog, CreatureInstance};
use rand::Rng;
use serde_json::json;

/// Path of the catalog shipped under `data/`.
#[allow(dead_code)]
pub fn bundled_catalog_path() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("data")
        .join("catalog.json")
}

pub fn fixture_catalog() -> Catalog {
    Catalog::from_value(json!({
        "pets": {
            "pet-a": {
                "name": "A",
                "tier": 1,
                "packs": ["StandardPack"],
                "baseAttack": 1,
                "baseHealth": 2,
                "probabilities": [{ "turn": 1, "perSlot": { "StandardPack": 1.0 } }]
            },
            "pet-swan": {
                "name": "Swan",
                "tier": 5,
                "packs": ["StandardPack"],
                "baseAttack": 1,
                "baseHealth": 3,
                "level1Ability": {
                    "description": "Start of turn: Gain 1 gold.",
                    "trigger": "StartOfTurn",
                    "triggeredBy": { "kind": "Self" },
                    "effect": { "kind": "GainGold", "amount": 1 }
                }
            },
            "pet-giraffe": {
                "name": "Giraffe",
                "tier": 5,
                "packs": ["StandardPack"],
                "baseAttack": 2,
                "baseHealth": 4,
                "level1Ability": {
                    "description": "End turn: Give friend ahead +1/+1.",
                    "trigger": "EndOfTurn",
                    "triggeredBy": { "kind": "Self" },
                    "effect": { "kind": "ModifyStats", "attackAmount": 1, "healthAmount": 1 }
                },
                "level2Ability": {
                    "description": "End turn: Give 2 friends ahead +1/+1.",
                    "trigger": "EndOfTurn",
                    "triggeredBy": { "kind": "Self" },
                    "effect": { "kind": "ModifyStats", "attackAmount": 1, "healthAmount": 1, "n": 2 }
                }
            },
            "pet-bison": {
                "name": "Bison",
                "tier": 5,
                "packs": ["StandardPack"],
                "baseAttack": 4,
                "baseHealth": 4,
                "level2Ability": {
                    "description": "End turn: Gain +2/+2.",
                    "trigger": "EndOfTurn",
                    "triggeredBy": { "kind": "Self" },
                    "effect": { "kind": "ModifyStats", "attackAmount": 2, "healthAmount": 2 }
                }
            }
        },
        "foods": {
            "food-a": {
                "name": "Apple",
                "tier": 1,
                "packs": ["StandardPack"],
                "cost": 3,
                "probabilities": [{ "turn": 1, "perSlot": { "StandardPack": 1.0 } }]
            }
        },
        "turns": {
            "turn-1": { "levelUpTier": 3, "animalShopSlots": 3, "foodShopSlots": 1 }
        }
    }))
    .unwrap()
}

#[allow(dead_code)]
pub fn rules(stipend: u32, roster_capacity: usize) -> ShopConfig {
    ShopConfig {
        stipend,
        roster_capacity,
        ..ShopConfig::default()
    }
}

/// Fresh instance of `template_id` from the fixture catalog.
#[allow(dead_code)]
pub fn creature<R: Rng>(catalog: &Catalog, template_id: &str, rng: &mut R) -> CreatureInstance {
    let template = catalog.creature(template_id).unwrap();
    CreatureInstance::materialize(Arc::clone(template), rng)
}
