//! Decision makers for shop turns and the read-only view they act on.

use crate::shop::session::{Action, SlotRef};

/// A roster entry as seen by an agent.
#[derive(Debug, Clone, PartialEq)]
pub struct CreatureSummary {
    pub template_id: String,
    pub tier: Option<u8>,
    pub level: u8,
    pub experience: u32,
    pub attack: i32,
    pub health: i32,
}

/// A slate entry as seen by an agent.
#[derive(Debug, Clone, PartialEq)]
pub struct OfferSummary {
    pub template_id: String,
    pub tier: Option<u8>,
    pub cost: u32,
    pub frozen: bool,
}

/// Snapshot of everything a player may consult when choosing an action.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerView {
    pub seat: usize,
    pub turn: u32,
    pub health: i32,
    pub coins: u32,
    pub capacity: usize,
    pub reroll_cost: u32,
    pub sell_refund: u32,
    pub roster: Vec<CreatureSummary>,
    pub creature_slate: Vec<OfferSummary>,
    pub item_slate: Vec<OfferSummary>,
}

impl PlayerView {
    /// Roster slot holding a copy of `template_id`, if any.
    pub fn fuse_target(&self, template_id: &str) -> Option<usize> {
        self.roster.iter().position(|c| c.template_id == template_id)
    }
}

/// Chooses the next action for a player. Human prompts and bots both sit
/// behind this.
pub trait Agent {
    fn decide_action(&mut self, view: &PlayerView) -> Action;
}

/// Spends coins on the best affordable creature, then on items, then ends
/// the turn.
#[derive(Debug, Default, Clone)]
pub struct GreedyAgent {
    rerolls: u32,
    turn: Option<u32>,
    /// Rerolls allowed per turn before giving up on the slate.
    pub max_rerolls: u32,
}

impl GreedyAgent {
    pub fn new(max_rerolls: u32) -> Self {
        Self {
            rerolls: 0,
            turn: None,
            max_rerolls,
        }
    }

    fn pick_creature(&self, view: &PlayerView) -> Option<Action> {
        let affordable = view
            .creature_slate
            .iter()
            .enumerate()
            .filter(|(_, o)| o.cost <= view.coins);

        // Fusions first, then the highest tier that fits in the roster.
        let mut best: Option<(bool, u8, usize, usize)> = None;
        for (slot, offer) in affordable {
            let candidate = match view.fuse_target(&offer.template_id) {
                Some(index) => (true, offer.tier.unwrap_or(0), slot, index),
                None if view.roster.len() < view.capacity => {
                    (false, offer.tier.unwrap_or(0), slot, view.roster.len())
                }
                None => continue,
            };
            let better = match best {
                None => true,
                Some((fused, tier, _, _)) => (candidate.0, candidate.1) > (fused, tier),
            };
            if better {
                best = Some(candidate);
            }
        }
        best.map(|(_, _, slot, roster_slot)| Action::BuyCreature { slot, roster_slot })
    }
}

impl Agent for GreedyAgent {
    fn decide_action(&mut self, view: &PlayerView) -> Action {
        // The budget is per turn, including turns ended by the action limit.
        if self.turn != Some(view.turn) {
            self.turn = Some(view.turn);
            self.rerolls = 0;
        }
        if let Some(action) = self.pick_creature(view) {
            return action;
        }
        if let Some(slot) = view.item_slate.iter().position(|o| o.cost <= view.coins) {
            return Action::BuyItem { slot };
        }
        let full = view.roster.len() >= view.capacity;
        if !full && self.rerolls < self.max_rerolls && view.coins >= view.reroll_cost.max(1) {
            self.rerolls += 1;
            return Action::Reroll;
        }
        // Keep one good offer for next turn when there is nothing else to do.
        if let Some(slot) = view
            .creature_slate
            .iter()
            .position(|o| !o.frozen && o.tier.unwrap_or(0) > 1)
        {
            if !view.creature_slate.iter().any(|o| o.frozen) {
                return Action::Freeze(SlotRef::Creature(slot));
            }
        }
        Action::EndTurn
    }
}
