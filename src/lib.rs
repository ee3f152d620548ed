//! # Autobattler - shop phase engine for a creature-collection auto battler
//!
//! Players receive a coin stipend each turn and spend it in a shop that offers
//! creatures and items drawn from a weighted, tier-gated catalog. Buying a
//! second copy of a creature fuses the two into a stronger instance, and
//! creature abilities react to named game events.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use autobattler::config::Config;
//! use autobattler::shop::{Catalog, LoggingResolver, Player, ShopSession, Action};
//! use rand::SeedableRng;
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = Config::default();
//!     let catalog = Catalog::load_from_json(&config.catalog.path)?;
//!     let mut player = Player::new(0, config.shop.roster_capacity, config.shop.starting_health);
//!     let mut rng = rand::rngs::StdRng::seed_from_u64(42);
//!     let mut resolver = LoggingResolver::default();
//!
//!     let mut session =
//!         ShopSession::begin(&catalog, &config.shop, &mut player, 1, &mut rng, &mut resolver)?;
//!     session.apply(Action::BuyCreature { slot: 0, roster_slot: 0 }, &mut resolver)?;
//!     session.apply(Action::EndTurn, &mut resolver)?;
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! - [`shop`] - catalog, roll engine, fusion, trigger dispatch, shop sessions, versus matches
//! - [`config`] - TOML configuration for rules, match settings and logging
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │  Versus / CLI   │ ← Agents choose actions
//! └─────────────────┘
//!          │
//! ┌─────────────────┐
//! │  ShopSession    │ ← One player-turn state machine
//! └─────────────────┘
//!     │     │     │
//!  Roll  Fusion  Triggers
//!     │     │     │
//! ┌─────────────────┐
//! │    Catalog      │ ← Immutable template data
//! └─────────────────┘
//! ```

pub mod config;
pub mod shop;
