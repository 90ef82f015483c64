//! Damage modifiers
//!
//! A [`DamageModifier`] says why a reduction exists; a [`ModifierFunction`]
//! pairs it with the transform that performs it.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::entity::{EffectType, EnchantmentKind, EquipmentSlot};

/// Kinds of modifiers, in pipeline order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DamageModifierKind {
    /// Host-supplied adjustment of the base damage
    Base,
    /// Helmet against falling objects
    HardHat,
    /// One entry per armor piece
    Armor,
    /// Resistance status effect
    Resistance,
    /// One entry per protection enchantment
    Enchantment,
    /// Absorption pool consumption
    Absorption,
}

impl fmt::Display for DamageModifierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DamageModifierKind::Base => "base",
            DamageModifierKind::HardHat => "hard_hat",
            DamageModifierKind::Armor => "armor",
            DamageModifierKind::Resistance => "resistance",
            DamageModifierKind::Enchantment => "enchantment",
            DamageModifierKind::Absorption => "absorption",
        };
        write!(f, "{}", s)
    }
}

/// What a modifier is traced back to
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum ModifierCause {
    /// A worn item
    Item { slot: EquipmentSlot, name: String },
    /// An enchantment on a worn item
    Enchantment {
        slot: EquipmentSlot,
        kind: EnchantmentKind,
        level: u8,
    },
    /// An active status effect
    Effect { effect: EffectType, amplifier: u8 },
    /// A named host contribution
    Named { name: String },
    /// The target's absorption pool
    AbsorptionPool,
}

/// Why a transform exists
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DamageModifier {
    pub kind: DamageModifierKind,
    pub cause: ModifierCause,
}

impl DamageModifier {
    pub fn new(kind: DamageModifierKind, cause: ModifierCause) -> Self {
        Self { kind, cause }
    }

    /// Equipment slot the modifier was derived from, if any
    pub fn slot(&self) -> Option<EquipmentSlot> {
        match &self.cause {
            ModifierCause::Item { slot, .. } | ModifierCause::Enchantment { slot, .. } => {
                Some(*slot)
            }
            _ => None,
        }
    }
}

type Transform = Arc<dyn Fn(f64) -> f64 + Send + Sync>;

/// A modifier together with its numeric transform `current -> new`
#[derive(Clone)]
pub struct ModifierFunction {
    modifier: DamageModifier,
    transform: Transform,
}

impl ModifierFunction {
    pub fn new<F>(modifier: DamageModifier, transform: F) -> Self
    where
        F: Fn(f64) -> f64 + Send + Sync + 'static,
    {
        Self {
            modifier,
            transform: Arc::new(transform),
        }
    }

    pub fn modifier(&self) -> &DamageModifier {
        &self.modifier
    }

    pub fn kind(&self) -> DamageModifierKind {
        self.modifier.kind
    }

    /// Run the transform on the damage flowing into this step
    pub fn apply(&self, damage: f64) -> f64 {
        (self.transform)(damage)
    }
}

impl fmt::Debug for ModifierFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModifierFunction")
            .field("modifier", &self.modifier)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_order() {
        use DamageModifierKind::*;
        let mut kinds = vec![Absorption, Enchantment, Armor, Resistance, HardHat, Base];
        kinds.sort();
        assert_eq!(
            kinds,
            vec![Base, HardHat, Armor, Resistance, Enchantment, Absorption]
        );
    }

    #[test]
    fn test_modifier_function_apply() {
        let halve = ModifierFunction::new(
            DamageModifier::new(
                DamageModifierKind::Base,
                ModifierCause::Named {
                    name: "halve".into(),
                },
            ),
            |d| d / 2.0,
        );
        assert_eq!(halve.apply(9.0), 4.5);
        assert_eq!(halve.kind(), DamageModifierKind::Base);
        assert!(halve.modifier().slot().is_none());
    }

    #[test]
    fn test_modifier_slot() {
        let armor = DamageModifier::new(
            DamageModifierKind::Armor,
            ModifierCause::Item {
                slot: EquipmentSlot::Legs,
                name: "iron_leggings".into(),
            },
        );
        assert_eq!(armor.slot(), Some(EquipmentSlot::Legs));
    }
}
