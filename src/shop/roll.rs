//! Weighted, tier-gated shop rolls.

use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;
use std::sync::Arc;

use crate::shop::catalog::Catalog;
use crate::shop::errors::ShopError;
use crate::shop::types::{CreatureInstance, ItemInstance, ShopTemplate, TurnConfig};

/// Instances offered for purchase in one roll. Frozen carry-over entries
/// come first, in the order they were supplied.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Slate {
    pub creatures: Vec<CreatureInstance>,
    pub items: Vec<ItemInstance>,
}

/// Produces shop slates from a catalog for one pack (shop type).
#[derive(Debug, Clone, Copy)]
pub struct RollEngine<'a> {
    catalog: &'a Catalog,
    pack: &'a str,
}

impl<'a> RollEngine<'a> {
    pub fn new(catalog: &'a Catalog, pack: &'a str) -> Self {
        Self { catalog, pack }
    }

    pub fn turn_config(&self, turn: u32) -> Result<&'a TurnConfig, ShopError> {
        self.catalog
            .turn_config(turn)
            .ok_or(ShopError::UnknownTurn(turn))
    }

    /// Roll the shop for `turn`, keeping the frozen instances and drawing the
    /// remaining slots with replacement.
    pub fn roll<R: Rng + ?Sized>(
        &self,
        turn: u32,
        frozen_creatures: &[CreatureInstance],
        frozen_items: &[ItemInstance],
        rng: &mut R,
    ) -> Result<Slate, ShopError> {
        let config = self.turn_config(turn)?;

        let creature_draws = config.creature_slots.saturating_sub(frozen_creatures.len());
        let item_draws = config.item_slots.saturating_sub(frozen_items.len());

        let creature_pool = self.eligible(self.catalog.creatures(), turn, config);
        let item_pool = self.eligible(self.catalog.items(), turn, config);

        let mut creatures = frozen_creatures.to_vec();
        for template in draw(&creature_pool, creature_draws, rng) {
            creatures.push(CreatureInstance::materialize(Arc::clone(template), rng));
        }

        let mut items = frozen_items.to_vec();
        for template in draw(&item_pool, item_draws, rng) {
            items.push(ItemInstance::materialize(Arc::clone(template), rng));
        }

        log::debug!(
            "rolled turn {} ({}): {} frozen + {} new creatures, {} frozen + {} new items",
            turn,
            self.pack,
            frozen_creatures.len(),
            creatures.len() - frozen_creatures.len(),
            frozen_items.len(),
            items.len() - frozen_items.len()
        );

        Ok(Slate { creatures, items })
    }

    /// Templates that may appear this turn together with their weights.
    /// Templates weighing nothing are left out.
    fn eligible<'t, T, I>(&self, templates: I, turn: u32, config: &TurnConfig) -> Vec<(&'t Arc<T>, f64)>
    where
        T: ShopTemplate + 't,
        I: Iterator<Item = &'t Arc<T>>,
    {
        templates
            .filter(|t| t.offered_in(self.pack, config.level_up_tier))
            .map(|t| (t, t.weight(turn, self.pack)))
            .filter(|(_, w)| *w > 0.0)
            .collect()
    }
}

/// Draw `count` templates independently (with replacement). An empty pool
/// yields nothing.
fn draw<'t, T, R: Rng + ?Sized>(
    pool: &[(&'t Arc<T>, f64)],
    count: usize,
    rng: &mut R,
) -> Vec<&'t Arc<T>> {
    if count == 0 || pool.is_empty() {
        return Vec::new();
    }
    let dist = match WeightedIndex::new(pool.iter().map(|(_, w)| *w)) {
        Ok(dist) => dist,
        Err(e) => {
            log::warn!("shop roll skipped: {}", e);
            return Vec::new();
        }
    };
    (0..count).map(|_| pool[dist.sample(rng)].0).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shop::types::{CreatureTemplate, SlotWeights, Tier};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::BTreeMap;

    fn creature(id: &str, tier: Tier, weight: f64) -> CreatureTemplate {
        CreatureTemplate {
            id: id.to_string(),
            name: id.to_string(),
            tier,
            packs: ["StandardPack".to_string()].into_iter().collect(),
            probabilities: vec![SlotWeights {
                turn: 1,
                per_slot: [("StandardPack".to_string(), weight)].into_iter().collect(),
            }],
            base_attack: 1,
            base_health: 1,
            cost: 3,
            abilities: Vec::new(),
        }
    }

    fn catalog(creatures: Vec<CreatureTemplate>, slots: usize) -> Catalog {
        let mut turns = BTreeMap::new();
        turns.insert(
            1,
            TurnConfig {
                level_up_tier: 3,
                creature_slots: slots,
                item_slots: 1,
            },
        );
        Catalog::new(creatures, Vec::new(), turns).unwrap()
    }

    #[test]
    fn test_zero_weight_templates_never_drawn() {
        let catalog = catalog(
            vec![
                creature("pet-ant", Tier::Numeric(1), 1.0),
                creature("pet-ghost", Tier::Numeric(1), 0.0),
            ],
            5,
        );
        let engine = RollEngine::new(&catalog, "StandardPack");
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..20 {
            let slate = engine.roll(1, &[], &[], &mut rng).unwrap();
            assert!(slate.creatures.iter().all(|c| c.template_id() == "pet-ant"));
        }
    }

    #[test]
    fn test_turn_zero_is_rejected() {
        let catalog = catalog(vec![creature("pet-ant", Tier::Numeric(1), 1.0)], 3);
        let engine = RollEngine::new(&catalog, "StandardPack");
        let mut rng = StdRng::seed_from_u64(1);
        assert!(matches!(
            engine.roll(0, &[], &[], &mut rng),
            Err(ShopError::UnknownTurn(0))
        ));
    }

    #[test]
    fn test_empty_pool_gives_empty_slate() {
        let catalog = catalog(vec![creature("pet-sloth", Tier::Unobtainable, 1.0)], 3);
        let engine = RollEngine::new(&catalog, "StandardPack");
        let mut rng = StdRng::seed_from_u64(1);
        let slate = engine.roll(1, &[], &[], &mut rng).unwrap();
        assert!(slate.creatures.is_empty());
        assert!(slate.items.is_empty());
    }
}
