//! One player's shop turn.
//!
//! ```text
//! begin ──► AwaitingAction ──(action)──► AwaitingAction
//!                 │
//!              EndTurn ──► Resolving ──► Done
//! ```
//!
//! Opening a session resets coins to the stipend, fires `StartOfTurn`, then
//! rolls the slate on top of the player's frozen carry-over. Each action is
//! validated in full before anything changes: it either applies completely
//! or is declined (expected, reported as [`DeclineReason`]) or rejected as a
//! contract violation ([`ShopError`]). Neither leaves partial state behind.

use log::{debug, info};
use rand::Rng;
use std::fmt;

use crate::config::ShopConfig;
use crate::shop::agent::{CreatureSummary, OfferSummary, PlayerView};
use crate::shop::catalog::Catalog;
use crate::shop::errors::ShopError;
use crate::shop::progression::fuse;
use crate::shop::roll::{RollEngine, Slate};
use crate::shop::trigger::{resolve_targets, EffectResolver, TriggerDispatcher};
use crate::shop::types::{CreatureInstance, ItemInstance, Player, END_OF_TURN, START_OF_TURN};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    AwaitingAction,
    Resolving,
    Done,
}

/// A slate position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotRef {
    Creature(usize),
    Item(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Buy the creature at `slot`, fusing into `roster_slot` when it holds the
    /// same template, otherwise inserting there.
    BuyCreature { slot: usize, roster_slot: usize },
    BuyItem { slot: usize },
    Freeze(SlotRef),
    Unfreeze(SlotRef),
    Reroll,
    Sell { roster_index: usize },
    EndTurn,
}

/// Why an otherwise valid action was refused. State is unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclineReason {
    InsufficientFunds { needed: u32, available: u32 },
    RosterFull,
    NothingToReroll,
    AlreadyFrozen,
    NotFrozen,
}

impl fmt::Display for DeclineReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeclineReason::InsufficientFunds { .. } => write!(f, "insufficient funds"),
            DeclineReason::RosterFull => write!(f, "roster full"),
            DeclineReason::NothingToReroll => write!(f, "nothing to reroll"),
            DeclineReason::AlreadyFrozen => write!(f, "already frozen"),
            DeclineReason::NotFrozen => write!(f, "not frozen"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ActionOutcome {
    Bought {
        roster_index: usize,
        fused: bool,
        leveled_up: bool,
    },
    ItemBought {
        item: ItemInstance,
    },
    Frozen,
    Unfrozen,
    Rerolled,
    Sold {
        refund: u32,
        creature: CreatureInstance,
    },
    TurnEnded,
    Declined(DeclineReason),
}

impl ActionOutcome {
    pub fn is_declined(&self) -> bool {
        matches!(self, ActionOutcome::Declined(_))
    }
}

/// A slate entry and whether the player has frozen it.
#[derive(Debug, Clone, PartialEq)]
pub struct Offer<T> {
    pub instance: T,
    pub frozen: bool,
}

fn offers<T>(frozen: usize, instances: Vec<T>) -> Vec<Offer<T>> {
    instances
        .into_iter()
        .enumerate()
        .map(|(i, instance)| Offer {
            instance,
            frozen: i < frozen,
        })
        .collect()
}

fn frozen_of<T: Clone>(offers: &[Offer<T>]) -> Vec<T> {
    offers
        .iter()
        .filter(|o| o.frozen)
        .map(|o| o.instance.clone())
        .collect()
}

pub struct ShopSession<'a, R: Rng + ?Sized> {
    catalog: &'a Catalog,
    rules: &'a ShopConfig,
    player: &'a mut Player,
    rng: &'a mut R,
    turn: u32,
    state: SessionState,
    creatures: Vec<Offer<CreatureInstance>>,
    items: Vec<Offer<ItemInstance>>,
}

impl<'a, R: Rng + ?Sized> ShopSession<'a, R> {
    /// Open `player`'s shop for `turn`.
    pub fn begin(
        catalog: &'a Catalog,
        rules: &'a ShopConfig,
        player: &'a mut Player,
        turn: u32,
        rng: &'a mut R,
        resolver: &mut dyn EffectResolver,
    ) -> Result<Self, ShopError> {
        // Checked up front so a bad turn leaves the player untouched.
        RollEngine::new(catalog, &rules.pack).turn_config(turn)?;

        let mut session = Self {
            catalog,
            rules,
            player,
            rng,
            turn,
            state: SessionState::Resolving,
            creatures: Vec::new(),
            items: Vec::new(),
        };

        session.player.reset_coins(rules.stipend);
        session.fire(START_OF_TURN, resolver);

        let frozen_creatures = session.player.frozen_creatures().to_vec();
        let frozen_items = session.player.frozen_items().to_vec();
        let slate = session.roll(&frozen_creatures, &frozen_items)?;
        session.install(slate, frozen_creatures.len(), frozen_items.len());
        session.state = SessionState::AwaitingAction;

        info!(
            "turn {} opened for seat {}: {} coins, {} creatures / {} items on offer",
            turn,
            session.player.seat(),
            session.player.coins(),
            session.creatures.len(),
            session.items.len()
        );
        Ok(session)
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn turn(&self) -> u32 {
        self.turn
    }

    pub fn player(&self) -> &Player {
        &*self.player
    }

    pub fn creature_slate(&self) -> &[Offer<CreatureInstance>] {
        &self.creatures
    }

    pub fn item_slate(&self) -> &[Offer<ItemInstance>] {
        &self.items
    }

    /// Snapshot for agents.
    pub fn view(&self) -> PlayerView {
        PlayerView {
            seat: self.player.seat(),
            turn: self.turn,
            health: self.player.health,
            coins: self.player.coins(),
            capacity: self.player.capacity(),
            reroll_cost: self.rules.reroll_cost,
            sell_refund: self.rules.sell_refund,
            roster: self
                .player
                .roster()
                .iter()
                .map(|c| CreatureSummary {
                    template_id: c.template_id().to_string(),
                    tier: c.template().tier.value(),
                    level: c.level(),
                    experience: c.experience(),
                    attack: c.base_attack(),
                    health: c.base_health(),
                })
                .collect(),
            creature_slate: self
                .creatures
                .iter()
                .map(|o| OfferSummary {
                    template_id: o.instance.template_id().to_string(),
                    tier: o.instance.template().tier.value(),
                    cost: o.instance.cost(),
                    frozen: o.frozen,
                })
                .collect(),
            item_slate: self
                .items
                .iter()
                .map(|o| OfferSummary {
                    template_id: o.instance.template_id().to_string(),
                    tier: o.instance.tier().value(),
                    cost: o.instance.cost(),
                    frozen: o.frozen,
                })
                .collect(),
        }
    }

    /// Apply one action.
    pub fn apply(
        &mut self,
        action: Action,
        resolver: &mut dyn EffectResolver,
    ) -> Result<ActionOutcome, ShopError> {
        if self.state == SessionState::Done {
            return Err(ShopError::SessionClosed);
        }

        let outcome = match action {
            Action::BuyCreature { slot, roster_slot } => self.buy_creature(slot, roster_slot)?,
            Action::BuyItem { slot } => self.buy_item(slot, resolver)?,
            Action::Freeze(slot) => self.set_frozen(slot, true)?,
            Action::Unfreeze(slot) => self.set_frozen(slot, false)?,
            Action::Reroll => self.reroll()?,
            Action::Sell { roster_index } => self.sell(roster_index)?,
            Action::EndTurn => self.end_turn(resolver),
        };

        match &outcome {
            ActionOutcome::Declined(reason) => debug!(
                "seat {} turn {}: {:?} declined ({})",
                self.player.seat(),
                self.turn,
                action,
                reason
            ),
            _ => debug!(
                "seat {} turn {}: {:?} applied, {} coins left",
                self.player.seat(),
                self.turn,
                action,
                self.player.coins()
            ),
        }
        Ok(outcome)
    }

    fn buy_creature(&mut self, slot: usize, roster_slot: usize) -> Result<ActionOutcome, ShopError> {
        let offer = self.creatures.get(slot).ok_or(ShopError::SlotOutOfRange {
            slot,
            len: self.creatures.len(),
        })?;
        let limit = self.player.capacity().min(self.player.roster().len() + 1);
        if roster_slot >= limit {
            return Err(ShopError::RosterIndexOutOfRange {
                index: roster_slot,
                len: limit,
            });
        }

        let cost = offer.instance.cost();
        if cost > self.player.coins() {
            return Ok(ActionOutcome::Declined(DeclineReason::InsufficientFunds {
                needed: cost,
                available: self.player.coins(),
            }));
        }

        let fuses = self
            .player
            .roster()
            .get(roster_slot)
            .is_some_and(|c| c.template_id() == offer.instance.template_id());
        if !fuses && !self.player.has_headroom() {
            return Ok(ActionOutcome::Declined(DeclineReason::RosterFull));
        }

        let leveled_up = if fuses {
            fuse(&mut self.player.roster_mut()[roster_slot], &offer.instance)?.leveled_up()
        } else {
            false
        };

        let offer = self.creatures.remove(slot);
        self.player.spend(cost);
        if !fuses {
            self.player.insert_creature(roster_slot, offer.instance);
        }
        if offer.frozen {
            self.sync_frozen();
        }

        Ok(ActionOutcome::Bought {
            roster_index: roster_slot,
            fused: fuses,
            leveled_up,
        })
    }

    fn buy_item(
        &mut self,
        slot: usize,
        resolver: &mut dyn EffectResolver,
    ) -> Result<ActionOutcome, ShopError> {
        let offer = self.items.get(slot).ok_or(ShopError::SlotOutOfRange {
            slot,
            len: self.items.len(),
        })?;
        let cost = offer.instance.cost();
        if !self.player.spend(cost) {
            return Ok(ActionOutcome::Declined(DeclineReason::InsufficientFunds {
                needed: cost,
                available: self.player.coins(),
            }));
        }

        let offer = self.items.remove(slot);
        if offer.frozen {
            self.sync_frozen();
        }
        resolver.consume_item(&mut *self.player, &offer.instance);
        Ok(ActionOutcome::ItemBought {
            item: offer.instance,
        })
    }

    fn set_frozen(&mut self, slot: SlotRef, frozen: bool) -> Result<ActionOutcome, ShopError> {
        let flag = match slot {
            SlotRef::Creature(i) => {
                let len = self.creatures.len();
                &mut self
                    .creatures
                    .get_mut(i)
                    .ok_or(ShopError::SlotOutOfRange { slot: i, len })?
                    .frozen
            }
            SlotRef::Item(i) => {
                let len = self.items.len();
                &mut self
                    .items
                    .get_mut(i)
                    .ok_or(ShopError::SlotOutOfRange { slot: i, len })?
                    .frozen
            }
        };

        if *flag == frozen {
            let reason = if frozen {
                DeclineReason::AlreadyFrozen
            } else {
                DeclineReason::NotFrozen
            };
            return Ok(ActionOutcome::Declined(reason));
        }
        *flag = frozen;
        self.sync_frozen();

        Ok(if frozen {
            ActionOutcome::Frozen
        } else {
            ActionOutcome::Unfrozen
        })
    }

    fn reroll(&mut self) -> Result<ActionOutcome, ShopError> {
        let config = RollEngine::new(self.catalog, &self.rules.pack).turn_config(self.turn)?;
        let frozen_creatures = frozen_of(&self.creatures);
        let frozen_items = frozen_of(&self.items);

        let open_slots = config.creature_slots.saturating_sub(frozen_creatures.len())
            + config.item_slots.saturating_sub(frozen_items.len());
        if open_slots == 0 {
            return Ok(ActionOutcome::Declined(DeclineReason::NothingToReroll));
        }

        let cost = self.rules.reroll_cost;
        if cost > self.player.coins() {
            return Ok(ActionOutcome::Declined(DeclineReason::InsufficientFunds {
                needed: cost,
                available: self.player.coins(),
            }));
        }

        let slate = self.roll(&frozen_creatures, &frozen_items)?;
        self.player.spend(cost);
        self.install(slate, frozen_creatures.len(), frozen_items.len());
        Ok(ActionOutcome::Rerolled)
    }

    fn sell(&mut self, roster_index: usize) -> Result<ActionOutcome, ShopError> {
        let len = self.player.roster().len();
        if roster_index >= len {
            return Err(ShopError::RosterIndexOutOfRange {
                index: roster_index,
                len,
            });
        }
        let creature = self.player.remove_creature(roster_index);
        let refund = self.rules.sell_refund;
        self.player.earn(refund);
        Ok(ActionOutcome::Sold { refund, creature })
    }

    fn end_turn(&mut self, resolver: &mut dyn EffectResolver) -> ActionOutcome {
        self.state = SessionState::Resolving;
        self.fire(END_OF_TURN, resolver);
        self.sync_frozen();
        self.state = SessionState::Done;
        info!(
            "turn {} closed for seat {}: {} in roster, {} coins unspent",
            self.turn,
            self.player.seat(),
            self.player.roster().len(),
            self.player.coins()
        );
        ActionOutcome::TurnEnded
    }

    fn fire(&mut self, event: &str, resolver: &mut dyn EffectResolver) {
        let targets = TriggerDispatcher::dispatch(event, std::slice::from_ref(&*self.player));
        resolve_targets(&targets, std::slice::from_mut(&mut *self.player), resolver);
    }

    fn roll(
        &mut self,
        frozen_creatures: &[CreatureInstance],
        frozen_items: &[ItemInstance],
    ) -> Result<Slate, ShopError> {
        RollEngine::new(self.catalog, &self.rules.pack).roll(
            self.turn,
            frozen_creatures,
            frozen_items,
            &mut *self.rng,
        )
    }

    fn install(&mut self, slate: Slate, frozen_creatures: usize, frozen_items: usize) {
        self.creatures = offers(frozen_creatures, slate.creatures);
        self.items = offers(frozen_items, slate.items);
        self.sync_frozen();
    }

    fn sync_frozen(&mut self) {
        self.player
            .set_frozen(frozen_of(&self.creatures), frozen_of(&self.items));
    }
}
