//! Versus match: several players taking shop turns in seat order.
//!
//! Only the shop phase is driven here. Battles between turns are not
//! simulated, so health only changes if an effect resolver changes it.

use log::{info, warn};
use rand::Rng;

use crate::config::{ShopConfig, VersusConfig};
use crate::shop::agent::Agent;
use crate::shop::catalog::Catalog;
use crate::shop::errors::ShopError;
use crate::shop::session::{Action, ActionOutcome, ShopSession};
use crate::shop::trigger::EffectResolver;
use crate::shop::types::Player;

/// What happened to one seat during one turn.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeatReport {
    pub seat: usize,
    pub applied: usize,
    pub declined: usize,
    /// The turn was ended by the action limit, not the agent.
    pub forced_end: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TurnReport {
    pub turn: u32,
    pub seats: Vec<SeatReport>,
}

pub struct Versus<R: Rng> {
    catalog: Catalog,
    shop: ShopConfig,
    versus: VersusConfig,
    players: Vec<Player>,
    turn: u32,
    rng: R,
}

impl<R: Rng> Versus<R> {
    pub fn new(catalog: Catalog, shop: ShopConfig, versus: VersusConfig, rng: R) -> Self {
        let players = (0..versus.players)
            .map(|seat| Player::new(seat, shop.roster_capacity, shop.starting_health))
            .collect();
        Self {
            catalog,
            shop,
            versus,
            players,
            turn: 1,
            rng,
        }
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn players_mut(&mut self) -> &mut [Player] {
        &mut self.players
    }

    /// The turn that `play_turn` will run next.
    pub fn turn(&self) -> u32 {
        self.turn
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Run one shop turn for every living player. `agents[i]` acts for seat `i`.
    pub fn play_turn(
        &mut self,
        agents: &mut [Box<dyn Agent>],
        resolver: &mut dyn EffectResolver,
    ) -> Result<TurnReport, ShopError> {
        if agents.len() < self.players.len() {
            return Err(ShopError::UnknownSeat(agents.len()));
        }

        let turn = self.turn;
        let mut report = TurnReport {
            turn,
            seats: Vec::with_capacity(self.players.len()),
        };

        for (player, agent) in self.players.iter_mut().zip(agents.iter_mut()) {
            if !player.is_alive() {
                continue;
            }
            let mut seat = SeatReport {
                seat: player.seat(),
                ..SeatReport::default()
            };
            let mut session = ShopSession::begin(
                &self.catalog,
                &self.shop,
                player,
                turn,
                &mut self.rng,
                resolver,
            )?;

            let mut ended = false;
            for _ in 0..self.versus.max_actions_per_turn {
                let action = agent.decide_action(&session.view());
                let outcome = session.apply(action, resolver)?;
                if outcome.is_declined() {
                    seat.declined += 1;
                } else {
                    seat.applied += 1;
                }
                if outcome == ActionOutcome::TurnEnded {
                    ended = true;
                    break;
                }
            }
            if !ended {
                warn!(
                    "seat {} hit the {}-action limit on turn {}; ending turn",
                    seat.seat, self.versus.max_actions_per_turn, turn
                );
                session.apply(Action::EndTurn, resolver)?;
                seat.forced_end = true;
            }
            report.seats.push(seat);
        }

        info!("turn {} complete ({} seats played)", turn, report.seats.len());
        self.turn += 1;
        Ok(report)
    }

    /// Play the configured number of turns.
    pub fn play(
        &mut self,
        agents: &mut [Box<dyn Agent>],
        resolver: &mut dyn EffectResolver,
    ) -> Result<Vec<TurnReport>, ShopError> {
        let mut reports = Vec::with_capacity(self.versus.turns as usize);
        for _ in 0..self.versus.turns {
            reports.push(self.play_turn(agents, resolver)?);
        }
        Ok(reports)
    }
}
