//! Modifier chain construction
//!
//! Builds the ordered list of reductions that apply to one hit:
//! hard hat, armor (per piece), resistance, enchantments (per enchantment),
//! absorption. Contributors whose precondition fails are left out.

use tracing::trace;

use super::hooks::DamageHooks;
use super::modifier::{DamageModifier, DamageModifierKind, ModifierCause, ModifierFunction};
use super::source::{DamageKind, DamageSource};
use crate::entity::{
    EffectType, Enchantment, EnchantmentKind, Equipment, EquipmentSlot, LivingEntity, ARMOR_SLOTS,
};

/// Armor and enchantment points are scaled against this
const REDUCTION_SCALE: f64 = 25.0;

/// Most armor points that count
const MAX_ARMOR: f64 = 20.0;

/// Most enchantment protection points that count
const MAX_PROTECTION: f64 = 20.0;

/// Base damage plus the modifiers that will act on it
#[derive(Debug, Clone)]
pub struct ModifierChain {
    pub base_damage: f64,
    pub functions: Vec<ModifierFunction>,
}

impl ModifierChain {
    /// Fold the base damage through every function, ignoring overrides
    pub fn fold(&self) -> f64 {
        self.functions
            .iter()
            .fold(self.base_damage, |damage, f| f.apply(damage))
    }
}

/// Builds modifier chains
#[derive(Debug, Clone)]
pub struct ModifierChainBuilder {
    hard_hat_factor: f64,
}

impl Default for ModifierChainBuilder {
    fn default() -> Self {
        Self::new(0.75)
    }
}

impl ModifierChainBuilder {
    pub fn new(hard_hat_factor: f64) -> Self {
        Self { hard_hat_factor }
    }

    /// Build the chain for `raw_damage` from `source` landing on `target`
    pub fn build<E: Equipment>(
        &self,
        target: &LivingEntity<E>,
        source: &DamageSource,
        raw_damage: f64,
        hooks: &dyn DamageHooks,
    ) -> ModifierChain {
        let base_damage = hooks.modify_damage(&target.profile, source, raw_damage).max(0.0);

        let mut functions = hooks.extra_modifiers(&target.profile, source);
        functions.retain(|f| f.kind() == DamageModifierKind::Base);

        let hard_hat = self.hard_hat(target, source);
        // Armor reduction depends on what reaches it
        let armor_input = if hard_hat.is_some() {
            base_damage * self.hard_hat_factor
        } else {
            base_damage
        };
        functions.extend(hard_hat);
        functions.extend(armor_modifiers(target, source, armor_input));
        functions.extend(resistance_modifier(target, source));
        functions.extend(enchantment_modifiers(target, source));
        functions.extend(absorption_modifier(target));

        debug_assert!(functions.windows(2).all(|w| w[0].kind() <= w[1].kind()));
        trace!(
            entity = %target.id(),
            base_damage,
            steps = functions.len(),
            "built modifier chain"
        );

        ModifierChain {
            base_damage,
            functions,
        }
    }

    fn hard_hat<E: Equipment>(
        &self,
        target: &LivingEntity<E>,
        source: &DamageSource,
    ) -> Option<ModifierFunction> {
        if !source.kind().is_falling_object() {
            return None;
        }
        let helmet = target.equipment.equipped(EquipmentSlot::Head)?;
        let factor = self.hard_hat_factor;
        Some(ModifierFunction::new(
            DamageModifier::new(
                DamageModifierKind::HardHat,
                ModifierCause::Item {
                    slot: EquipmentSlot::Head,
                    name: helmet.name.clone(),
                },
            ),
            move |damage| damage * factor,
        ))
    }
}

/// Total armor reduction as a fraction of incoming damage
pub fn armor_reduction(armor: f64, toughness: f64, damage: f64) -> f64 {
    let effective = armor - damage / (2.0 + toughness / 4.0);
    effective.max(armor * 0.2).min(MAX_ARMOR) / REDUCTION_SCALE
}

/// One modifier per armor piece
///
/// Each piece scales damage by `(1 - R)^(share)`, where `share` is its part of
/// the total armor, so the pieces together scale by exactly `1 - R`.
fn armor_modifiers<E: Equipment>(
    target: &LivingEntity<E>,
    source: &DamageSource,
    damage: f64,
) -> Vec<ModifierFunction> {
    if source.is_absolute() {
        return Vec::new();
    }
    let pieces: Vec<_> = ARMOR_SLOTS
        .iter()
        .filter_map(|slot| target.equipment.equipped(*slot))
        .filter(|item| item.armor > 0.0)
        .collect();

    let total_armor: f64 = pieces.iter().map(|p| p.armor).sum();
    if total_armor <= 0.0 {
        return Vec::new();
    }
    let toughness: f64 = pieces.iter().map(|p| p.toughness).sum();
    let remaining = 1.0 - armor_reduction(total_armor, toughness, damage);

    pieces
        .into_iter()
        .map(|piece| {
            let factor = remaining.powf(piece.armor / total_armor);
            ModifierFunction::new(
                DamageModifier::new(
                    DamageModifierKind::Armor,
                    ModifierCause::Item {
                        slot: piece.slot,
                        name: piece.name.clone(),
                    },
                ),
                move |damage| damage * factor,
            )
        })
        .collect()
}

fn resistance_modifier<E: Equipment>(
    target: &LivingEntity<E>,
    source: &DamageSource,
) -> Option<ModifierFunction> {
    if source.is_absolute() || source.kind() == DamageKind::OutOfWorld {
        return None;
    }
    let amplifier = target.effects.amplifier(EffectType::Resistance)?;
    let factor = (REDUCTION_SCALE - (f64::from(amplifier) + 1.0) * 5.0).max(0.0) / REDUCTION_SCALE;
    Some(ModifierFunction::new(
        DamageModifier::new(
            DamageModifierKind::Resistance,
            ModifierCause::Effect {
                effect: EffectType::Resistance,
                amplifier,
            },
        ),
        move |damage| damage * factor,
    ))
}

/// Protection points an enchantment grants against a source
pub fn protection_points(enchantment: &Enchantment, source: &DamageSource) -> f64 {
    let level = f64::from(enchantment.level);
    match enchantment.kind {
        EnchantmentKind::Protection => level,
        EnchantmentKind::FireProtection if source.is_fire() => level * 2.0,
        EnchantmentKind::FeatherFalling if source.kind() == DamageKind::Fall => level * 3.0,
        EnchantmentKind::BlastProtection if source.is_explosion() => level * 2.0,
        EnchantmentKind::ProjectileProtection if source.is_projectile() => level * 2.0,
        _ => 0.0,
    }
}

/// One modifier per qualifying enchantment, shares split like armor
fn enchantment_modifiers<E: Equipment>(
    target: &LivingEntity<E>,
    source: &DamageSource,
) -> Vec<ModifierFunction> {
    if source.is_absolute() || source.kind() == DamageKind::OutOfWorld {
        return Vec::new();
    }
    let qualifying: Vec<(EquipmentSlot, Enchantment, f64)> = ARMOR_SLOTS
        .iter()
        .filter_map(|slot| target.equipment.equipped(*slot))
        .flat_map(|item| {
            item.enchantments
                .iter()
                .map(move |e| (item.slot, *e, protection_points(e, source)))
        })
        .filter(|(_, _, points)| *points > 0.0)
        .collect();

    let total: f64 = qualifying.iter().map(|(_, _, p)| p).sum();
    if total <= 0.0 {
        return Vec::new();
    }
    let remaining = 1.0 - total.min(MAX_PROTECTION) / REDUCTION_SCALE;

    qualifying
        .into_iter()
        .map(|(slot, enchantment, points)| {
            let factor = remaining.powf(points / total);
            ModifierFunction::new(
                DamageModifier::new(
                    DamageModifierKind::Enchantment,
                    ModifierCause::Enchantment {
                        slot,
                        kind: enchantment.kind,
                        level: enchantment.level,
                    },
                ),
                move |damage| damage * factor,
            )
        })
        .collect()
}

fn absorption_modifier<E: Equipment>(target: &LivingEntity<E>) -> Option<ModifierFunction> {
    let absorption = target.vitals.absorption_amount();
    if absorption <= 0.0 {
        return None;
    }
    Some(ModifierFunction::new(
        DamageModifier::new(DamageModifierKind::Absorption, ModifierCause::AbsorptionPool),
        move |damage| (damage - absorption).max(0.0),
    ))
}
