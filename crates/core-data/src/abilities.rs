//! The ability catalog.
//!
//! The runtime ships with a fixed, small set of abilities rather than a
//! scripting system; `core_engine::abilities` executes each by matching on
//! `AbilityId`. Adding an ability means adding it here and adding its arm in
//! the engine — there is no data-driven effect language.

use std::collections::HashMap;

use core_types::AbilityId;

/// What an ability can be aimed at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetKind {
    /// A single enemy unit within range.
    Enemy,
    /// A single allied (or self) unit within range.
    Ally,
    /// No target required; always affects the caster.
    SelfOnly,
}

/// What an ability does. Kept deliberately small: damage or healing, no
/// persistent buffs/debuffs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbilityEffect {
    Damage(u32),
    Heal(u32),
}

#[derive(Debug, Clone)]
pub struct Ability {
    pub id: AbilityId,
    pub name: &'static str,
    pub range: u32,
    pub target: TargetKind,
    pub effect: AbilityEffect,
}

/// The full set of abilities units may use, keyed by `AbilityId`.
#[derive(Debug, Clone)]
pub struct AbilityRegistry {
    abilities: HashMap<AbilityId, Ability>,
}

impl AbilityRegistry {
    /// The catalog shipped with the runtime. Cheap to construct; callers
    /// typically build one at startup and share it behind an `Arc`.
    pub fn seed() -> Self {
        let entries = [
            Ability {
                id: AbilityId::from("power_strike"),
                name: "Power Strike",
                range: 1,
                target: TargetKind::Enemy,
                effect: AbilityEffect::Damage(6),
            },
            Ability {
                id: AbilityId::from("fireball"),
                name: "Fireball",
                range: 4,
                target: TargetKind::Enemy,
                effect: AbilityEffect::Damage(8),
            },
            Ability {
                id: AbilityId::from("heal"),
                name: "Heal",
                range: 3,
                target: TargetKind::Ally,
                effect: AbilityEffect::Heal(10),
            },
            Ability {
                id: AbilityId::from("rally"),
                name: "Rally",
                range: 0,
                target: TargetKind::SelfOnly,
                effect: AbilityEffect::Heal(4),
            },
        ];
        Self {
            abilities: entries.into_iter().map(|a| (a.id.clone(), a)).collect(),
        }
    }

    pub fn get(&self, id: &AbilityId) -> Option<&Ability> {
        self.abilities.get(id)
    }
}

impl Default for AbilityRegistry {
    fn default() -> Self {
        Self::seed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_contains_all_four_catalog_abilities() {
        let registry = AbilityRegistry::seed();
        for name in ["power_strike", "fireball", "heal", "rally"] {
            assert!(
                registry.get(&AbilityId::from(name)).is_some(),
                "missing ability {name}"
            );
        }
    }

    #[test]
    fn unknown_ability_id_returns_none() {
        let registry = AbilityRegistry::seed();
        assert!(registry.get(&AbilityId::from("does_not_exist")).is_none());
    }

    #[test]
    fn self_targeted_ability_has_zero_range() {
        let registry = AbilityRegistry::seed();
        let rally = registry.get(&AbilityId::from("rally")).unwrap();
        assert_eq!(rally.target, TargetKind::SelfOnly);
        assert_eq!(rally.range, 0);
    }
}
