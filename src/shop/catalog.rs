//! Catalog ingestion: creature/item templates and the per-turn shop table.
//!
//! The catalog is loaded once from JSON shaped like the public Super Auto Pets
//! data dump (`pets`, `foods`, `turns`), validated, and then handed to the
//! engine as an immutable value. Malformed data fails here, never later.

use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;
use std::sync::Arc;

use crate::shop::errors::CatalogError;
use crate::shop::types::{
    Ability, CreatureTemplate, ItemTemplate, SlotWeights, Tier, TurnConfig, DEFAULT_COST,
    MAX_ABILITY_SLOTS,
};

/// Immutable reference data for the shop engine.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    creatures: BTreeMap<String, Arc<CreatureTemplate>>,
    items: BTreeMap<String, Arc<ItemTemplate>>,
    turns: BTreeMap<u32, TurnConfig>,
}

impl Catalog {
    /// Build a catalog from already typed templates. Turn 1 must be present.
    pub fn new(
        creatures: impl IntoIterator<Item = CreatureTemplate>,
        items: impl IntoIterator<Item = ItemTemplate>,
        turns: BTreeMap<u32, TurnConfig>,
    ) -> Result<Self, CatalogError> {
        if !turns.contains_key(&1) {
            return Err(CatalogError::MissingFirstTurn);
        }
        if let Some((turn, _)) = turns.iter().find(|(_, cfg)| cfg.level_up_tier == 0) {
            return Err(CatalogError::InvalidTurnConfig(*turn));
        }
        Ok(Self {
            creatures: creatures
                .into_iter()
                .map(|t| (t.id.clone(), Arc::new(t)))
                .collect(),
            items: items
                .into_iter()
                .map(|t| (t.id.clone(), Arc::new(t)))
                .collect(),
            turns,
        })
    }

    /// Load a catalog from a JSON file.
    pub fn load_from_json<P: AsRef<Path>>(path: P) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)?;
        let seed: CatalogSeed =
            serde_json::from_str(&contents).map_err(|source| CatalogError::Parse {
                context: path.display().to_string(),
                source,
            })?;
        let catalog = Self::from_seed(seed)?;
        log::info!(
            "loaded catalog {}: {} creatures, {} items, {} turns",
            path.display(),
            catalog.creatures.len(),
            catalog.items.len(),
            catalog.turns.len()
        );
        Ok(catalog)
    }

    pub fn from_json_str(json: &str) -> Result<Self, CatalogError> {
        let seed: CatalogSeed =
            serde_json::from_str(json).map_err(|source| CatalogError::Parse {
                context: "catalog".to_string(),
                source,
            })?;
        Self::from_seed(seed)
    }

    pub fn from_value(value: serde_json::Value) -> Result<Self, CatalogError> {
        let seed: CatalogSeed =
            serde_json::from_value(value).map_err(|source| CatalogError::Parse {
                context: "catalog".to_string(),
                source,
            })?;
        Self::from_seed(seed)
    }

    /// Validate raw seed data and convert it into typed templates.
    pub fn from_seed(seed: CatalogSeed) -> Result<Self, CatalogError> {
        let creatures = seed
            .pets
            .into_iter()
            .map(|(key, raw)| raw.into_template(key))
            .collect::<Result<Vec<_>, _>>()?;
        let items = seed
            .foods
            .into_iter()
            .map(|(key, raw)| raw.into_template(key))
            .collect::<Result<Vec<_>, _>>()?;
        let mut turns = BTreeMap::new();
        for (key, raw) in seed.turns {
            let turn = parse_turn_key(&key)?;
            let config = TurnConfig {
                level_up_tier: raw.level_up_tier,
                creature_slots: raw.creature_shop_slots,
                item_slots: raw.item_shop_slots,
            };
            if turns.insert(turn, config).is_some() {
                return Err(CatalogError::DuplicateTurn { turn, key });
            }
        }

        Self::new(creatures, items, turns)
    }

    pub fn creature(&self, id: &str) -> Option<&Arc<CreatureTemplate>> {
        self.creatures.get(id)
    }

    pub fn item(&self, id: &str) -> Option<&Arc<ItemTemplate>> {
        self.items.get(id)
    }

    /// Creature templates in id order.
    pub fn creatures(&self) -> impl Iterator<Item = &Arc<CreatureTemplate>> {
        self.creatures.values()
    }

    /// Item templates in id order.
    pub fn items(&self) -> impl Iterator<Item = &Arc<ItemTemplate>> {
        self.items.values()
    }

    /// Shop layout for `turn`. Turns past the table reuse the last entry;
    /// turn 0 has no configuration.
    pub fn turn_config(&self, turn: u32) -> Option<&TurnConfig> {
        if turn == 0 {
            return None;
        }
        self.turns.range(..=turn).next_back().map(|(_, cfg)| cfg)
    }

    pub fn turn_count(&self) -> usize {
        self.turns.len()
    }
}

/// Parse `turn-N` or `N`.
pub fn parse_turn_key(key: &str) -> Result<u32, CatalogError> {
    let digits = key.strip_prefix("turn-").unwrap_or(key);
    match digits.trim().parse::<u32>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(CatalogError::InvalidTurnKey(key.to_string())),
    }
}

// ============================================================================
// Raw JSON schema
// ============================================================================

/// Top-level catalog document as it appears on disk.
#[derive(Debug, Deserialize)]
pub struct CatalogSeed {
    #[serde(default, alias = "creatures")]
    pub pets: BTreeMap<String, CreatureSeed>,
    #[serde(default, alias = "items")]
    pub foods: BTreeMap<String, ItemSeed>,
    pub turns: BTreeMap<String, TurnSeed>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum TierSeed {
    Number(i64),
    Text(String),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum TurnRef {
    Number(u32),
    Key(String),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProbabilitySeed {
    #[serde(default)]
    pub kind: Option<String>,
    pub turn: TurnRef,
    #[serde(default)]
    pub per_slot: BTreeMap<String, f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatureSeed {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    pub tier: TierSeed,
    #[serde(default)]
    pub packs: Vec<String>,
    #[serde(default)]
    pub probabilities: Vec<ProbabilitySeed>,
    pub base_attack: i32,
    pub base_health: i32,
    #[serde(default)]
    pub cost: Option<u32>,
    #[serde(default)]
    pub level1_ability: Option<Ability>,
    #[serde(default)]
    pub level2_ability: Option<Ability>,
    #[serde(default)]
    pub level3_ability: Option<Ability>,
    /// Alternative to the numbered fields: a list indexed by level - 1.
    #[serde(default)]
    pub abilities: Vec<Option<Ability>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemSeed {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    pub tier: TierSeed,
    #[serde(default)]
    pub packs: Vec<String>,
    #[serde(default)]
    pub probabilities: Vec<ProbabilitySeed>,
    #[serde(default)]
    pub cost: Option<u32>,
    #[serde(default)]
    pub ability: Option<Ability>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnSeed {
    pub level_up_tier: u8,
    #[serde(alias = "animalShopSlots")]
    pub creature_shop_slots: usize,
    #[serde(alias = "foodShopSlots")]
    pub item_shop_slots: usize,
}

fn check_id(key: &str, id: Option<String>) -> Result<(), CatalogError> {
    match id {
        Some(id) if id != key => Err(CatalogError::IdMismatch {
            key: key.to_string(),
            id,
        }),
        _ => Ok(()),
    }
}

fn convert_tier(id: &str, tier: TierSeed) -> Result<Tier, CatalogError> {
    match tier {
        TierSeed::Number(n) => u8::try_from(n)
            .ok()
            .filter(|t| *t > 0)
            .map(Tier::Numeric)
            .ok_or_else(|| CatalogError::InvalidTier {
                id: id.to_string(),
                tier: n,
            }),
        TierSeed::Text(_) => Ok(Tier::Unobtainable),
    }
}

fn convert_probabilities(
    id: &str,
    seeds: Vec<ProbabilitySeed>,
) -> Result<Vec<SlotWeights>, CatalogError> {
    let mut weights = Vec::with_capacity(seeds.len());
    for seed in seeds {
        // Level-up offers and other non-shop tables are not used by the roll.
        if seed.kind.as_deref().is_some_and(|k| k != "shop") {
            continue;
        }
        let turn = match seed.turn {
            TurnRef::Number(0) => return Err(CatalogError::InvalidTurnKey("0".to_string())),
            TurnRef::Number(n) => n,
            TurnRef::Key(key) => parse_turn_key(&key)?,
        };
        for (pack, weight) in &seed.per_slot {
            if !weight.is_finite() || *weight < 0.0 {
                return Err(CatalogError::InvalidProbability {
                    id: id.to_string(),
                    pack: pack.clone(),
                    weight: *weight,
                });
            }
        }
        weights.push(SlotWeights {
            turn,
            per_slot: seed.per_slot,
        });
    }
    weights.sort_by_key(|w| w.turn);
    Ok(weights)
}

impl CreatureSeed {
    fn into_template(self, key: String) -> Result<CreatureTemplate, CatalogError> {
        check_id(&key, self.id)?;
        let tier = convert_tier(&key, self.tier)?;
        let probabilities = convert_probabilities(&key, self.probabilities)?;

        let mut abilities = if self.abilities.is_empty() {
            vec![self.level1_ability, self.level2_ability, self.level3_ability]
        } else {
            self.abilities
        };
        if abilities.len() > MAX_ABILITY_SLOTS {
            return Err(CatalogError::TooManyAbilities {
                id: key,
                count: abilities.len(),
            });
        }
        while matches!(abilities.last(), Some(None)) {
            abilities.pop();
        }

        Ok(CreatureTemplate {
            name: self.name.unwrap_or_else(|| key.clone()),
            id: key,
            tier,
            packs: self.packs.into_iter().collect::<BTreeSet<_>>(),
            probabilities,
            base_attack: self.base_attack,
            base_health: self.base_health,
            cost: self.cost.unwrap_or(DEFAULT_COST),
            abilities,
        })
    }
}

impl ItemSeed {
    fn into_template(self, key: String) -> Result<ItemTemplate, CatalogError> {
        check_id(&key, self.id)?;
        let tier = convert_tier(&key, self.tier)?;
        let probabilities = convert_probabilities(&key, self.probabilities)?;
        Ok(ItemTemplate {
            name: self.name.unwrap_or_else(|| key.clone()),
            id: key,
            tier,
            packs: self.packs.into_iter().collect(),
            probabilities,
            cost: self.cost.unwrap_or(DEFAULT_COST),
            ability: self.ability,
        })
    }
}
