//! Host hooks into the pipeline
//!
//! Hooks run before the event is built: one may veto the hit outright, one
//! may rewrite the raw amount, and one may contribute base-kind modifiers.

use super::modifier::ModifierFunction;
use super::source::DamageSource;
use crate::entity::TargetProfile;

pub trait DamageHooks {
    /// Return false to drop the hit before anything is touched
    fn allow_attack(&self, _target: &TargetProfile, _source: &DamageSource, _amount: f64) -> bool {
        true
    }

    /// Rewrite the amount before modifiers are built
    fn modify_damage(&self, _target: &TargetProfile, _source: &DamageSource, amount: f64) -> f64 {
        amount
    }

    /// Extra modifiers of kind `Base`; other kinds are discarded
    fn extra_modifiers(
        &self,
        _target: &TargetProfile,
        _source: &DamageSource,
    ) -> Vec<ModifierFunction> {
        Vec::new()
    }
}

/// Hooks that change nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHooks;

impl DamageHooks for NoHooks {}
