//! Fusion of duplicate creatures and the experience-to-level curve.
//!
//! Fusing two copies of the same template keeps the better of each stat, adds
//! one to both, and pools experience. Level is never stored: it is always
//! derived from accumulated experience.

use crate::shop::errors::ShopError;
use crate::shop::types::CreatureInstance;

/// Experience needed for level 2.
pub const LEVEL_TWO_EXPERIENCE: u32 = 2;

/// Experience needed for level 3.
pub const LEVEL_THREE_EXPERIENCE: u32 = 5;

pub const MAX_LEVEL: u8 = 3;

/// Level for an experience total: `<2` is 1, `<5` is 2, otherwise 3.
pub fn level_for_experience(experience: u32) -> u8 {
    if experience < LEVEL_TWO_EXPERIENCE {
        1
    } else if experience < LEVEL_THREE_EXPERIENCE {
        2
    } else {
        MAX_LEVEL
    }
}

/// Result of a successful fusion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FusionOutcome {
    pub previous_level: u8,
    pub level: u8,
}

impl FusionOutcome {
    pub fn leveled_up(&self) -> bool {
        self.level > self.previous_level
    }
}

/// Merge `incoming` into `target`.
///
/// The caller discards `incoming` afterwards. On a template mismatch neither
/// instance is touched.
pub fn fuse(
    target: &mut CreatureInstance,
    incoming: &CreatureInstance,
) -> Result<FusionOutcome, ShopError> {
    if target.template_id() != incoming.template_id() {
        return Err(ShopError::TemplateMismatch {
            target: target.template_id().to_string(),
            incoming: incoming.template_id().to_string(),
        });
    }

    let previous_level = target.level();

    // Flat +1 on every fuse, regardless of which side had the higher stat.
    target.base_health = target.base_health.max(incoming.base_health).saturating_add(1);
    target.base_attack = target.base_attack.max(incoming.base_attack).saturating_add(1);
    target.experience = target.experience.saturating_add(incoming.experience);

    let outcome = FusionOutcome {
        previous_level,
        level: target.level(),
    };
    log::debug!(
        "fused {} into {} ({}): {}/{} xp={} level {} -> {}",
        incoming.id(),
        target.id(),
        target.template_id(),
        target.base_attack,
        target.base_health,
        target.experience,
        outcome.previous_level,
        outcome.level
    );
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shop::types::{CreatureTemplate, InstanceId, Tier, DEFAULT_COST};
    use std::sync::Arc;
    use uuid::Uuid;

    fn template(id: &str, attack: i32, health: i32) -> Arc<CreatureTemplate> {
        Arc::new(CreatureTemplate {
            id: id.to_string(),
            name: id.to_string(),
            tier: Tier::Numeric(1),
            packs: Default::default(),
            probabilities: Vec::new(),
            base_attack: attack,
            base_health: health,
            cost: DEFAULT_COST,
            abilities: Vec::new(),
        })
    }

    fn instance(n: u128, template: &Arc<CreatureTemplate>, experience: u32) -> CreatureInstance {
        CreatureInstance::new(InstanceId(Uuid::from_u128(n)), Arc::clone(template))
            .with_experience(experience)
    }

    #[test]
    fn test_level_thresholds() {
        assert_eq!(level_for_experience(0), 1);
        assert_eq!(level_for_experience(1), 1);
        assert_eq!(level_for_experience(2), 2);
        assert_eq!(level_for_experience(4), 2);
        assert_eq!(level_for_experience(5), 3);
        assert_eq!(level_for_experience(u32::MAX), 3);
    }

    #[test]
    fn test_level_is_monotonic() {
        let mut last = 0;
        for xp in 0..20 {
            let level = level_for_experience(xp);
            assert!(level >= last);
            last = level;
        }
    }

    #[test]
    fn test_fuse_takes_max_plus_one() {
        let t = template("pet-fish", 2, 3);
        let mut a = instance(1, &t, 1);
        let mut b = instance(2, &t, 1);
        a.base_attack = 5;
        b.base_health = 9;

        let outcome = fuse(&mut a, &b).unwrap();
        assert_eq!(a.base_attack(), 6);
        assert_eq!(a.base_health(), 10);
        assert_eq!(a.experience(), 2);
        assert_eq!(outcome.previous_level, 1);
        assert_eq!(outcome.level, 2);
        assert!(outcome.leveled_up());
        assert_eq!(a.id(), InstanceId(Uuid::from_u128(1)));
    }

    #[test]
    fn test_repeated_fusion_grows_linearly() {
        let t = template("pet-fish", 2, 3);
        let mut a = instance(1, &t, 1);
        for n in 0..4 {
            let b = instance(10 + n, &t, 1);
            fuse(&mut a, &b).unwrap();
        }
        assert_eq!(a.base_attack(), 6);
        assert_eq!(a.base_health(), 7);
        assert_eq!(a.experience(), 5);
        assert_eq!(a.level(), 3);
    }

    #[test]
    fn test_fuse_mismatch_leaves_both_untouched() {
        let mut a = instance(1, &template("pet-ant", 2, 1), 1);
        let b = instance(2, &template("pet-beaver", 3, 2), 3);
        let before_a = a.clone();
        let before_b = b.clone();

        let err = fuse(&mut a, &b).unwrap_err();
        assert!(matches!(err, ShopError::TemplateMismatch { .. }));
        assert_eq!(a, before_a);
        assert_eq!(b, before_b);
    }
}
