//! Shop phase engine: catalog data, weighted rolls, fusion, trigger dispatch
//! and the per-turn shop session that ties them together.

pub mod agent;
pub mod catalog;
pub mod errors;
pub mod progression;
pub mod roll;
pub mod session;
pub mod trigger;
pub mod types;
pub mod versus;

pub use agent::{Agent, CreatureSummary, GreedyAgent, OfferSummary, PlayerView};
pub use catalog::{parse_turn_key, Catalog, CatalogSeed};
pub use errors::{CatalogError, ShopError};
pub use progression::{fuse, level_for_experience, FusionOutcome};
pub use roll::{RollEngine, Slate};
pub use session::{Action, ActionOutcome, DeclineReason, Offer, SessionState, ShopSession, SlotRef};
pub use trigger::{
    resolve_targets, EffectResolver, LoggingResolver, TargetRef, TriggerDispatcher, TriggerTarget,
};
pub use types::{
    weight_at, Ability, CreatureInstance, CreatureTemplate, InstanceId, ItemInstance,
    ItemTemplate, Player, ShopTemplate, SlotWeights, StatusEffect, Tier, TriggeredBy, TurnConfig,
    DEFAULT_COST, END_OF_TURN, MAX_ABILITY_SLOTS, STARTING_EXPERIENCE, START_OF_TURN,
};
pub use versus::{SeatReport, TurnReport, Versus};
