//! The damage event seen by listeners
//!
//! The event carries the base damage and the ordered modifier list. Listeners
//! may cancel it, replace the base damage, or override the output of any
//! single step. The step order is fixed at construction.

use std::collections::BTreeMap;

use serde::Serialize;

use super::error::DamageError;
use super::modifier::{DamageModifier, DamageModifierKind, ModifierFunction};
use super::source::{DamageKind, DamageSource};
use crate::entity::{EntityId, EntityRef};

/// One contributor to a hit
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum CauseEntry {
    /// The kind of source
    Source { kind: DamageKind },
    /// The entity ultimately responsible
    Attacker { entity: EntityRef },
    /// The entity that made contact, when different from the attacker
    Direct { entity: EntityRef },
}

/// Ordered list of contributors, most relevant first
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Cause {
    entries: Vec<CauseEntry>,
}

impl Cause {
    /// Build the cause chain for a source
    pub fn for_source(source: &DamageSource) -> Self {
        let mut entries = vec![CauseEntry::Source {
            kind: source.kind(),
        }];
        if let Some(attacker) = source.attacker() {
            entries.push(CauseEntry::Attacker { entity: *attacker });
        }
        if let Some(direct) = source.direct() {
            if source.attacker() != Some(direct) {
                entries.push(CauseEntry::Direct { entity: *direct });
            }
        }
        Self { entries }
    }

    pub fn entries(&self) -> &[CauseEntry] {
        &self.entries
    }

    /// First entry, always the source kind for built causes
    pub fn root(&self) -> Option<&CauseEntry> {
        self.entries.first()
    }

    pub fn attacker(&self) -> Option<&EntityRef> {
        self.entries.iter().find_map(|e| match e {
            CauseEntry::Attacker { entity } => Some(entity),
            _ => None,
        })
    }
}

/// Input and output of a single step of the fold
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FoldStep {
    pub kind: DamageModifierKind,
    pub input: f64,
    pub output: f64,
    pub overridden: bool,
}

impl FoldStep {
    /// Change in damage contributed by this step (negative for reductions)
    pub fn delta(&self) -> f64 {
        self.output - self.input
    }
}

/// A hit about to be applied
#[derive(Debug, Clone)]
pub struct DamageEvent {
    target: EntityId,
    cause: Cause,
    base_damage: f64,
    original_base_damage: f64,
    functions: Vec<ModifierFunction>,
    overrides: BTreeMap<usize, f64>,
    cancelled: bool,
}

impl DamageEvent {
    pub fn new(
        target: EntityId,
        cause: Cause,
        base_damage: f64,
        functions: Vec<ModifierFunction>,
    ) -> Self {
        Self {
            target,
            cause,
            base_damage,
            original_base_damage: base_damage,
            functions,
            overrides: BTreeMap::new(),
            cancelled: false,
        }
    }

    pub fn target(&self) -> EntityId {
        self.target
    }

    pub fn cause(&self) -> &Cause {
        &self.cause
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    pub fn set_cancelled(&mut self, cancelled: bool) {
        self.cancelled = cancelled;
    }

    pub fn base_damage(&self) -> f64 {
        self.base_damage
    }

    /// Base damage as built, before any listener replaced it
    pub fn original_base_damage(&self) -> f64 {
        self.original_base_damage
    }

    /// Replace the base damage the steps fold over
    pub fn set_base_damage(&mut self, base_damage: f64) -> Result<(), DamageError> {
        if !base_damage.is_finite() {
            return Err(DamageError::InvalidAmount(base_damage));
        }
        self.base_damage = base_damage;
        Ok(())
    }

    /// The ordered modifier list
    pub fn modifiers(&self) -> &[ModifierFunction] {
        &self.functions
    }

    /// Position of a modifier in the list
    pub fn position(&self, modifier: &DamageModifier) -> Option<usize> {
        self.functions.iter().position(|f| f.modifier() == modifier)
    }

    /// Whether any step of the given kind is present
    pub fn has_kind(&self, kind: DamageModifierKind) -> bool {
        self.functions.iter().any(|f| f.kind() == kind)
    }

    /// Replace the output of step `index`
    pub fn set_output(&mut self, index: usize, output: f64) -> Result<(), DamageError> {
        if index >= self.functions.len() {
            return Err(DamageError::UnknownModifier(index));
        }
        if !output.is_finite() {
            return Err(DamageError::InvalidAmount(output));
        }
        self.overrides.insert(index, output);
        Ok(())
    }

    /// Replace the output of the step for `modifier`
    pub fn set_modifier_output(
        &mut self,
        modifier: &DamageModifier,
        output: f64,
    ) -> Result<(), DamageError> {
        let index = self
            .position(modifier)
            .ok_or(DamageError::UnknownModifier(self.functions.len()))?;
        self.set_output(index, output)
    }

    /// Drop a listener override, restoring the step's own transform
    pub fn clear_output(&mut self, index: usize) {
        self.overrides.remove(&index);
    }

    pub fn output_override(&self, index: usize) -> Option<f64> {
        self.overrides.get(&index).copied()
    }

    /// Fold the base damage through every step, honoring overrides
    pub fn steps(&self) -> Vec<FoldStep> {
        let mut current = self.base_damage;
        let mut steps = Vec::with_capacity(self.functions.len());
        for (index, function) in self.functions.iter().enumerate() {
            let overridden = self.overrides.get(&index).copied();
            let output = overridden.unwrap_or_else(|| function.apply(current));
            steps.push(FoldStep {
                kind: function.kind(),
                input: current,
                output,
                overridden: overridden.is_some(),
            });
            current = output;
        }
        steps
    }

    /// Damage after every step
    pub fn final_damage(&self) -> f64 {
        self.steps()
            .last()
            .map_or(self.base_damage, |step| step.output)
    }

    /// Damage after every step with no overrides and the original base
    pub fn original_final_damage(&self) -> f64 {
        self.functions
            .iter()
            .fold(self.original_base_damage, |damage, f| f.apply(damage))
    }

    /// Change contributed by step `index`
    pub fn damage_at(&self, index: usize) -> Option<f64> {
        self.steps().get(index).map(FoldStep::delta)
    }

    /// Change contributed by `modifier`
    pub fn damage(&self, modifier: &DamageModifier) -> Option<f64> {
        self.damage_at(self.position(modifier)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::modifier::ModifierCause;
    use crate::entity::ActorKind;

    fn named(kind: DamageModifierKind, name: &str) -> DamageModifier {
        DamageModifier::new(kind, ModifierCause::Named { name: name.into() })
    }

    fn sample_event() -> DamageEvent {
        let functions = vec![
            ModifierFunction::new(named(DamageModifierKind::Armor, "armor"), |d| d * 0.5),
            ModifierFunction::new(named(DamageModifierKind::Resistance, "res"), |d| d * 0.8),
            ModifierFunction::new(named(DamageModifierKind::Absorption, "abs"), |d| {
                (d - 2.0_f64).max(0.0)
            }),
        ];
        DamageEvent::new(
            EntityId::new(),
            Cause::for_source(&DamageSource::new(DamageKind::Generic)),
            10.0,
            functions,
        )
    }

    #[test]
    fn test_final_damage_folds_in_order() {
        let event = sample_event();
        // 10 * 0.5 = 5, * 0.8 = 4, - 2 = 2
        assert!((event.final_damage() - 2.0).abs() < 1e-9);
        assert!((event.original_final_damage() - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_damage_delta_per_modifier() {
        let event = sample_event();
        let armor = named(DamageModifierKind::Armor, "armor");
        assert!((event.damage(&armor).unwrap() + 5.0).abs() < 1e-9);
        assert!((event.damage_at(1).unwrap() + 1.0).abs() < 1e-9);
        assert!((event.damage_at(2).unwrap() + 2.0).abs() < 1e-9);
        assert!(event.damage_at(3).is_none());
    }

    #[test]
    fn test_override_replaces_single_step() {
        let mut event = sample_event();
        event.set_output(0, 9.0).unwrap();

        // Override substitutes the armor output; later steps run on it
        let steps = event.steps();
        assert!(steps[0].overridden);
        assert_eq!(steps[0].output, 9.0);
        assert!((steps[1].output - 7.2).abs() < 1e-9);
        assert!((event.final_damage() - 5.2).abs() < 1e-9);

        // Original final damage ignores overrides
        assert!((event.original_final_damage() - 2.0).abs() < 1e-9);

        event.clear_output(0);
        assert!((event.final_damage() - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_override_unknown_step() {
        let mut event = sample_event();
        assert!(matches!(
            event.set_output(7, 1.0),
            Err(DamageError::UnknownModifier(7))
        ));
        let missing = named(DamageModifierKind::HardHat, "helmet");
        assert!(event.set_modifier_output(&missing, 1.0).is_err());
    }

    #[test]
    fn test_base_damage_replacement() {
        let mut event = sample_event();
        event.set_base_damage(20.0).unwrap();
        assert_eq!(event.original_base_damage(), 10.0);
        // 20 * 0.5 * 0.8 - 2 = 6
        assert!((event.final_damage() - 6.0).abs() < 1e-9);
    }

    #[test]
    fn test_non_finite_values_rejected() {
        let mut event = sample_event();
        assert!(matches!(
            event.set_base_damage(f64::NAN),
            Err(DamageError::InvalidAmount(_))
        ));
        assert!(event.set_output(1, f64::INFINITY).is_err());
        assert!(event.output_override(1).is_none());
        assert_eq!(event.base_damage(), 10.0);
        assert!((event.final_damage() - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_chain_final_is_base() {
        let event = DamageEvent::new(EntityId::new(), Cause::default(), 3.5, Vec::new());
        assert_eq!(event.final_damage(), 3.5);
        assert!(!event.has_kind(DamageModifierKind::Armor));
    }

    #[test]
    fn test_cause_for_projectile() {
        let arrow = EntityRef::new(EntityId::new(), ActorKind::NonLiving);
        let skeleton = EntityRef::living(EntityId::new());
        let cause = Cause::for_source(&DamageSource::projectile(arrow, Some(skeleton)));

        assert_eq!(
            cause.root(),
            Some(&CauseEntry::Source {
                kind: DamageKind::Projectile
            })
        );
        assert_eq!(cause.attacker(), Some(&skeleton));
        assert_eq!(cause.entries().len(), 3);

        // Melee attacker is both attacker and direct, listed once
        let melee = Cause::for_source(&DamageSource::attack(skeleton));
        assert_eq!(melee.entries().len(), 2);
    }
}
