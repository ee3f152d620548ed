use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

use crate::shop::progression::level_for_experience;

/// Purchase cost used when a template omits `cost`.
pub const DEFAULT_COST: u32 = 3;

/// Creatures carry at most one ability per level.
pub const MAX_ABILITY_SLOTS: usize = 3;

/// Experience carried by a freshly materialized creature copy.
pub const STARTING_EXPERIENCE: u32 = 1;

/// Event fired when a player's shop turn opens.
pub const START_OF_TURN: &str = "StartOfTurn";

/// Event fired when a player ends their shop turn.
pub const END_OF_TURN: &str = "EndOfTurn";

/// Identity of a creature or item copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct InstanceId(pub Uuid);

impl InstanceId {
    /// Build an id from the supplied random source so seeded runs reproduce ids.
    pub fn from_rng<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let bytes: [u8; 16] = rng.gen();
        Self(uuid::Builder::from_random_bytes(bytes).into_uuid())
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Shop tier of a template. Unobtainable templates never appear in a shop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Numeric(u8),
    Unobtainable,
}

impl Tier {
    pub fn value(&self) -> Option<u8> {
        match self {
            Tier::Numeric(t) => Some(*t),
            Tier::Unobtainable => None,
        }
    }

    /// True when the tier is numeric and strictly below `threshold`.
    pub fn is_below(&self, threshold: u8) -> bool {
        matches!(self, Tier::Numeric(t) if *t < threshold)
    }
}

/// Who can set off an ability. Carried as data; the dispatcher matches on the
/// trigger name only.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TriggeredBy {
    #[serde(default)]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub n: Option<u32>,
}

/// One ability slot of a creature or the single ability of an item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ability {
    #[serde(default)]
    pub description: String,
    pub trigger: String,
    #[serde(default)]
    pub triggered_by: TriggeredBy,
    /// Opaque effect payload handed to the effect resolver untouched.
    #[serde(default)]
    pub effect: serde_json::Value,
}

impl Ability {
    pub fn reacts_to(&self, event: &str) -> bool {
        self.trigger == event
    }
}

/// Appearance weights for one turn, keyed by pack name.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SlotWeights {
    pub turn: u32,
    pub per_slot: BTreeMap<String, f64>,
}

/// Weight of `pack` at `turn`, taken from the entry with the greatest turn not
/// after `turn`. Missing entries weigh nothing.
pub fn weight_at(probabilities: &[SlotWeights], turn: u32, pack: &str) -> f64 {
    probabilities
        .iter()
        .filter(|w| w.turn <= turn)
        .max_by_key(|w| w.turn)
        .and_then(|w| w.per_slot.get(pack).copied())
        .unwrap_or(0.0)
}

/// Common view over creature and item templates used by the shop roll.
pub trait ShopTemplate {
    fn id(&self) -> &str;
    fn tier(&self) -> Tier;
    fn packs(&self) -> &BTreeSet<String>;
    fn probabilities(&self) -> &[SlotWeights];

    /// Whether this template may be offered in `pack` while `level_up_tier` is
    /// the exclusion threshold.
    fn offered_in(&self, pack: &str, level_up_tier: u8) -> bool {
        self.packs().contains(pack) && self.tier().is_below(level_up_tier)
    }

    fn weight(&self, turn: u32, pack: &str) -> f64 {
        weight_at(self.probabilities(), turn, pack)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreatureTemplate {
    pub id: String,
    pub name: String,
    pub tier: Tier,
    pub packs: BTreeSet<String>,
    pub probabilities: Vec<SlotWeights>,
    pub base_attack: i32,
    pub base_health: i32,
    pub cost: u32,
    /// Indexed by `level - 1`; `None` marks a level without an ability.
    pub abilities: Vec<Option<Ability>>,
}

impl CreatureTemplate {
    pub fn ability_at_level(&self, level: u8) -> Option<&Ability> {
        let index = usize::from(level).checked_sub(1)?;
        self.abilities.get(index).and_then(Option::as_ref)
    }
}

impl ShopTemplate for CreatureTemplate {
    fn id(&self) -> &str {
        &self.id
    }

    fn tier(&self) -> Tier {
        self.tier
    }

    fn packs(&self) -> &BTreeSet<String> {
        &self.packs
    }

    fn probabilities(&self) -> &[SlotWeights] {
        &self.probabilities
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ItemTemplate {
    pub id: String,
    pub name: String,
    pub tier: Tier,
    pub packs: BTreeSet<String>,
    pub probabilities: Vec<SlotWeights>,
    pub cost: u32,
    pub ability: Option<Ability>,
}

impl ShopTemplate for ItemTemplate {
    fn id(&self) -> &str {
        &self.id
    }

    fn tier(&self) -> Tier {
        self.tier
    }

    fn packs(&self) -> &BTreeSet<String> {
        &self.packs
    }

    fn probabilities(&self) -> &[SlotWeights] {
        &self.probabilities
    }
}

/// Shop layout for one turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TurnConfig {
    /// Templates with a tier at or above this value are not offered.
    pub level_up_tier: u8,
    pub creature_slots: usize,
    pub item_slots: usize,
}

/// Status applied to a creature (e.g. a held item). The payload is opaque.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusEffect {
    pub name: String,
    #[serde(default)]
    pub payload: serde_json::Value,
}

/// A concrete creature copy, either on a shop slate or in a roster.
#[derive(Debug, Clone, PartialEq)]
pub struct CreatureInstance {
    pub(crate) id: InstanceId,
    pub(crate) template: Arc<CreatureTemplate>,
    pub(crate) experience: u32,
    pub(crate) base_attack: i32,
    pub(crate) base_health: i32,
    pub(crate) status: Option<StatusEffect>,
    pub(crate) owner: Option<usize>,
}

impl CreatureInstance {
    pub fn new(id: InstanceId, template: Arc<CreatureTemplate>) -> Self {
        Self {
            id,
            base_attack: template.base_attack,
            base_health: template.base_health,
            template,
            experience: STARTING_EXPERIENCE,
            status: None,
            owner: None,
        }
    }

    /// Materialize a fresh copy of `template` with an id drawn from `rng`.
    pub fn materialize<R: Rng + ?Sized>(template: Arc<CreatureTemplate>, rng: &mut R) -> Self {
        Self::new(InstanceId::from_rng(rng), template)
    }

    /// Override the starting experience of a freshly built instance.
    pub fn with_experience(mut self, experience: u32) -> Self {
        self.experience = experience;
        self
    }

    pub fn id(&self) -> InstanceId {
        self.id
    }

    pub fn template(&self) -> &CreatureTemplate {
        &self.template
    }

    pub fn template_id(&self) -> &str {
        &self.template.id
    }

    pub fn experience(&self) -> u32 {
        self.experience
    }

    pub fn level(&self) -> u8 {
        level_for_experience(self.experience)
    }

    pub fn base_attack(&self) -> i32 {
        self.base_attack
    }

    pub fn base_health(&self) -> i32 {
        self.base_health
    }

    pub fn cost(&self) -> u32 {
        self.template.cost
    }

    pub fn owner(&self) -> Option<usize> {
        self.owner
    }

    pub fn status(&self) -> Option<&StatusEffect> {
        self.status.as_ref()
    }

    pub fn set_status(&mut self, status: StatusEffect) {
        self.status = Some(status);
    }

    pub fn clear_status(&mut self) -> Option<StatusEffect> {
        self.status.take()
    }

    /// The ability active at the current level, if any.
    pub fn current_ability(&self) -> Option<&Ability> {
        self.template.ability_at_level(self.level())
    }
}

/// A concrete item copy on a shop slate.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemInstance {
    pub(crate) id: InstanceId,
    pub(crate) template: Arc<ItemTemplate>,
}

impl ItemInstance {
    pub fn new(id: InstanceId, template: Arc<ItemTemplate>) -> Self {
        Self { id, template }
    }

    pub fn materialize<R: Rng + ?Sized>(template: Arc<ItemTemplate>, rng: &mut R) -> Self {
        Self::new(InstanceId::from_rng(rng), template)
    }

    pub fn id(&self) -> InstanceId {
        self.id
    }

    pub fn template_id(&self) -> &str {
        &self.template.id
    }

    pub fn tier(&self) -> Tier {
        self.template.tier
    }

    pub fn cost(&self) -> u32 {
        self.template.cost
    }

    pub fn ability(&self) -> Option<&Ability> {
        self.template.ability.as_ref()
    }
}

/// Per-match player state: health, coins, roster and frozen carry-over.
#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    pub health: i32,
    seat: usize,
    coins: u32,
    capacity: usize,
    roster: Vec<CreatureInstance>,
    frozen_creatures: Vec<CreatureInstance>,
    frozen_items: Vec<ItemInstance>,
}

impl Player {
    pub fn new(seat: usize, capacity: usize, health: i32) -> Self {
        Self {
            health,
            seat,
            coins: 0,
            capacity,
            roster: Vec::with_capacity(capacity),
            frozen_creatures: Vec::new(),
            frozen_items: Vec::new(),
        }
    }

    pub fn seat(&self) -> usize {
        self.seat
    }

    pub fn coins(&self) -> u32 {
        self.coins
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0
    }

    pub fn roster(&self) -> &[CreatureInstance] {
        &self.roster
    }

    /// Mutable access to roster entries. The roster length cannot change
    /// through this view.
    pub fn roster_mut(&mut self) -> &mut [CreatureInstance] {
        &mut self.roster
    }

    pub fn has_headroom(&self) -> bool {
        self.roster.len() < self.capacity
    }

    pub fn frozen_creatures(&self) -> &[CreatureInstance] {
        &self.frozen_creatures
    }

    pub fn frozen_items(&self) -> &[ItemInstance] {
        &self.frozen_items
    }

    /// Append a creature to the roster. Returns its index, or `None` when
    /// the roster is full.
    pub fn recruit(&mut self, creature: CreatureInstance) -> Option<usize> {
        if !self.has_headroom() {
            return None;
        }
        self.insert_creature(self.roster.len(), creature);
        Some(self.roster.len() - 1)
    }

    pub(crate) fn insert_creature(&mut self, index: usize, mut creature: CreatureInstance) {
        creature.owner = Some(self.seat);
        self.roster.insert(index, creature);
    }

    pub(crate) fn remove_creature(&mut self, index: usize) -> CreatureInstance {
        let mut creature = self.roster.remove(index);
        creature.owner = None;
        creature
    }

    pub(crate) fn reset_coins(&mut self, stipend: u32) {
        self.coins = stipend;
    }

    /// Deduct `amount` if affordable.
    pub(crate) fn spend(&mut self, amount: u32) -> bool {
        match self.coins.checked_sub(amount) {
            Some(left) => {
                self.coins = left;
                true
            }
            None => false,
        }
    }

    pub(crate) fn earn(&mut self, amount: u32) {
        self.coins = self.coins.saturating_add(amount);
    }

    pub(crate) fn set_frozen(&mut self, creatures: Vec<CreatureInstance>, items: Vec<ItemInstance>) {
        self.frozen_creatures = creatures;
        self.frozen_items = items;
    }
}
