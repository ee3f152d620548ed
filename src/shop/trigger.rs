//! Trigger dispatch: which owned creatures react to a named event.
//!
//! Selection and execution are split. [`TriggerDispatcher::dispatch`] takes a
//! snapshot of every matching creature (ability included) before anything
//! runs, so effects applied while resolving one target cannot change which
//! other targets were picked for the same event. Execution is delegated to an
//! [`EffectResolver`] supplied by the caller.

use log::{debug, info};

use crate::shop::types::{Ability, InstanceId, ItemInstance, Player};

/// Location of a selected creature at selection time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TargetRef {
    /// Index into the player slice passed to `dispatch`.
    pub player: usize,
    pub seat: usize,
    pub roster_index: usize,
    pub instance_id: InstanceId,
}

/// One selected creature with the ability that matched.
#[derive(Debug, Clone, PartialEq)]
pub struct TriggerTarget {
    pub event: String,
    pub target: TargetRef,
    pub template_id: String,
    pub level: u8,
    pub ability: Ability,
}

pub struct TriggerDispatcher;

impl TriggerDispatcher {
    /// Select every creature whose current-level ability triggers on `event`.
    ///
    /// Players are scanned in slice order, rosters in stored order. Creatures
    /// without an ability at their level are skipped.
    pub fn dispatch(event: &str, players: &[Player]) -> Vec<TriggerTarget> {
        let mut targets = Vec::new();
        for (player_index, player) in players.iter().enumerate() {
            for (roster_index, creature) in player.roster().iter().enumerate() {
                let Some(ability) = creature.current_ability() else {
                    continue;
                };
                if !ability.reacts_to(event) {
                    continue;
                }
                targets.push(TriggerTarget {
                    event: event.to_string(),
                    target: TargetRef {
                        player: player_index,
                        seat: player.seat(),
                        roster_index,
                        instance_id: creature.id(),
                    },
                    template_id: creature.template_id().to_string(),
                    level: creature.level(),
                    ability: ability.clone(),
                });
            }
        }
        debug!("dispatch {}: {} target(s)", event, targets.len());
        targets
    }
}

/// Executes ability effects. Game-content specific, so it lives outside the
/// engine.
pub trait EffectResolver {
    /// Apply one selected target's effect. `players` is the same slice the
    /// targets were selected from.
    fn resolve(&mut self, players: &mut [Player], target: &TriggerTarget);

    /// Apply a purchased item. The default does nothing.
    fn consume_item(&mut self, _player: &mut Player, _item: &ItemInstance) {}
}

/// Resolve a previously selected snapshot in order.
pub fn resolve_targets(
    targets: &[TriggerTarget],
    players: &mut [Player],
    resolver: &mut dyn EffectResolver,
) {
    for target in targets {
        resolver.resolve(players, target);
    }
}

/// Resolver that only reports what would fire.
#[derive(Debug, Default)]
pub struct LoggingResolver {
    pub resolved: Vec<TargetRef>,
    pub consumed: Vec<InstanceId>,
}

impl EffectResolver for LoggingResolver {
    fn resolve(&mut self, _players: &mut [Player], target: &TriggerTarget) {
        info!(
            "{}: seat {} slot {} {} (L{}) -> {}",
            target.event,
            target.target.seat,
            target.target.roster_index,
            target.template_id,
            target.level,
            target.ability.description.replace('\n', " ")
        );
        self.resolved.push(target.target);
    }

    fn consume_item(&mut self, player: &mut Player, item: &ItemInstance) {
        info!("seat {} bought {}", player.seat(), item.template_id());
        self.consumed.push(item.id());
    }
}
