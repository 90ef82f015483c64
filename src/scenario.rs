//! Scripted hit scenarios
//!
//! A scenario is a TOML file describing one target, a set of listener rules
//! and a list of hits. [`run`] resolves the hits in order against a
//! [`SimWorld`] and reports each outcome.
//!
//! ```toml
//! [target]
//! kind = "player"
//! absorption = 4.0
//!
//! [[target.items]]
//! slot = "chest"
//! name = "iron_chestplate"
//! armor = 6.0
//!
//! [[listeners]]
//! action = "cancel"
//! kind = "fall"
//!
//! [[hits]]
//! kind = "mob_attack"
//! amount = 6.0
//! attacker = "living"
//! ```

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use figment::providers::{Format, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::combat::{
    CauseEntry, DamageEvent, DamageKind, DamageModifierKind, DamageResolver, DamageSource, Order,
    Outcome,
};
use crate::config::ResolverConfig;
use crate::entity::{
    ActorKind, EntityId, EntityRef, EntityVitalState, ItemHandle, LivingEntity, Loadout,
    StatusEffect, DEFAULT_MAX_HURT_RESIST_TIME,
};
use crate::world::{SimWorld, WorldEffect};

/// A full scenario file
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Scenario {
    pub target: TargetSpec,
    pub listeners: Vec<ListenerSpec>,
    pub hits: Vec<HitSpec>,
}

/// The entity being hit
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TargetSpec {
    pub kind: ActorKind,
    pub max_health: f64,
    /// Starting health, full when absent
    pub health: Option<f64>,
    pub absorption: f64,
    pub max_hurt_resist_time: i32,
    pub invulnerable: bool,
    pub fire_immune: bool,
    pub vanished: bool,
    pub blocking: bool,
    pub items: Vec<ItemHandle>,
    pub effects: Vec<StatusEffect>,
    /// Persisted integer attributes (e.g. "maxAir")
    pub attributes: HashMap<String, i32>,
}

impl Default for TargetSpec {
    fn default() -> Self {
        Self {
            kind: ActorKind::Living,
            max_health: 20.0,
            health: None,
            absorption: 0.0,
            max_hurt_resist_time: DEFAULT_MAX_HURT_RESIST_TIME,
            invulnerable: false,
            fire_immune: false,
            vanished: false,
            blocking: false,
            items: Vec::new(),
            effects: Vec::new(),
            attributes: HashMap::new(),
        }
    }
}

impl TargetSpec {
    pub fn build(&self) -> LivingEntity {
        let loadout = self
            .items
            .iter()
            .cloned()
            .fold(Loadout::new(), Loadout::with);
        let mut vitals = EntityVitalState::new(self.max_health)
            .with_absorption(self.absorption)
            .with_max_hurt_resist_time(self.max_hurt_resist_time);
        if let Some(health) = self.health {
            vitals = vitals.with_health(health);
        }
        let mut target = LivingEntity::with_equipment(self.kind, self.max_health, loadout)
            .with_vitals(vitals);

        target.profile.invulnerable = self.invulnerable;
        target.profile.fire_immune = self.fire_immune;
        target.profile.vanished = self.vanished;
        target.profile.blocking = self.blocking;

        for effect in &self.effects {
            target.effects.add(effect.clone());
        }
        target.air.read_from(&self.attributes);
        target
    }
}

/// A listener rule and when it runs
#[derive(Debug, Clone, Deserialize)]
pub struct ListenerSpec {
    #[serde(default)]
    pub order: Order,
    #[serde(flatten)]
    pub rule: ListenerRule,
}

/// What a scripted listener does to each event
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ListenerRule {
    /// Cancel hits of a kind, or every hit
    Cancel { kind: Option<DamageKind> },
    /// Multiply the base damage
    ScaleBase { factor: f64 },
    /// Replace the output of every step of a modifier kind
    Override {
        modifier: DamageModifierKind,
        output: f64,
    },
}

impl ListenerRule {
    fn into_listener(self) -> impl FnMut(&mut DamageEvent) + 'static {
        move |event: &mut DamageEvent| match &self {
            ListenerRule::Cancel { kind } => {
                let matches = match kind {
                    Some(kind) => {
                        event.cause().root() == Some(&CauseEntry::Source { kind: *kind })
                    }
                    None => true,
                };
                if matches {
                    event.set_cancelled(true);
                }
            }
            ListenerRule::ScaleBase { factor } => {
                if let Err(e) = event.set_base_damage(event.base_damage() * factor) {
                    warn!("scale failed: {}", e);
                }
            }
            ListenerRule::Override { modifier, output } => {
                let indices: Vec<usize> = event
                    .modifiers()
                    .iter()
                    .enumerate()
                    .filter(|(_, f)| f.kind() == *modifier)
                    .map(|(i, _)| i)
                    .collect();
                for index in indices {
                    if let Err(e) = event.set_output(index, *output) {
                        warn!("override failed: {}", e);
                    }
                }
            }
        }
    }
}

/// One scripted hit
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HitSpec {
    pub kind: DamageKind,
    pub amount: f64,
    /// Who dealt the hit, if anyone
    pub attacker: Option<ActorKind>,
    /// Attacker position relative to the target
    pub attacker_x: f64,
    pub attacker_z: f64,
    pub fire: bool,
    pub unblockable: bool,
    pub absolute: bool,
    pub creative: bool,
    /// Target ticks to run before the hit lands
    pub ticks_before: u32,
}

impl Default for HitSpec {
    fn default() -> Self {
        Self {
            kind: DamageKind::Generic,
            amount: 0.0,
            attacker: None,
            attacker_x: 1.0,
            attacker_z: 0.0,
            fire: false,
            unblockable: false,
            absolute: false,
            creative: false,
            ticks_before: 0,
        }
    }
}

impl HitSpec {
    /// Build the damage source, returning the attacker it introduces
    pub fn source(&self) -> (DamageSource, Option<EntityRef>) {
        let attacker = self.attacker.map(|kind| EntityRef::new(EntityId::new(), kind));

        let mut source = match (self.kind, attacker) {
            (DamageKind::Projectile, shooter) => {
                let arrow = EntityRef::new(EntityId::new(), ActorKind::NonLiving);
                DamageSource::projectile(arrow, shooter)
            }
            (kind, Some(attacker)) => DamageSource::new(kind)
                .with_attacker(attacker)
                .with_direct(attacker),
            (kind, None) => DamageSource::new(kind),
        };
        if self.fire {
            source = source.fire();
        }
        if self.unblockable {
            source = source.unblockable();
        }
        if self.absolute {
            source = source.absolute();
        }
        if self.creative {
            source = source.by_creative_player();
        }
        (source, attacker)
    }
}

/// What happened to one hit
#[derive(Debug, Clone, Serialize)]
pub struct HitReport {
    pub index: usize,
    pub kind: DamageKind,
    pub amount: f64,
    pub outcome: Outcome,
    pub health: f64,
    pub absorption: f64,
    pub world: Vec<WorldEffect>,
}

impl Scenario {
    /// Parse a scenario file
    pub fn load(path: &Path) -> Result<Self> {
        Figment::new()
            .merge(Toml::file(path))
            .extract()
            .with_context(|| format!("failed to load scenario {}", path.display()))
    }

    /// Parse a scenario from a TOML string
    pub fn from_toml(source: &str) -> Result<Self> {
        Figment::new()
            .merge(Toml::string(source))
            .extract()
            .context("failed to parse scenario")
    }
}

/// Resolve every hit in the scenario, in order
pub fn run(scenario: &Scenario, config: ResolverConfig) -> Result<Vec<HitReport>> {
    let mut resolver = DamageResolver::new(config, SimWorld::new());
    for spec in &scenario.listeners {
        resolver
            .dispatcher_mut()
            .register(spec.order, spec.rule.clone().into_listener());
    }

    let mut target = scenario.target.build();
    resolver.world_mut().place(target.id(), 0.0, 0.0);

    let mut reports = Vec::with_capacity(scenario.hits.len());
    for (index, hit) in scenario.hits.iter().enumerate() {
        for _ in 0..hit.ticks_before {
            target.tick();
        }

        let (source, attacker) = hit.source();
        if let Some(attacker) = attacker {
            resolver
                .world_mut()
                .place(attacker.id, hit.attacker_x, hit.attacker_z);
        }

        let outcome = resolver
            .resolve(&mut target, &source, hit.amount)
            .with_context(|| format!("hit {} ({})", index, hit.kind))?;

        reports.push(HitReport {
            index,
            kind: hit.kind,
            amount: hit.amount,
            outcome,
            health: target.vitals.health(),
            absorption: target.vitals.absorption_amount(),
            world: resolver.world_mut().drain(),
        });
    }

    info!(
        hits = reports.len(),
        health = target.vitals.health(),
        "scenario finished"
    );
    Ok(reports)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::VetoReason;
    use crate::entity::{Equipment, EquipmentSlot};

    fn seeded() -> ResolverConfig {
        ResolverConfig {
            seed: Some(1),
            ..ResolverConfig::default()
        }
    }

    #[test]
    fn test_parse_target() {
        let scenario = Scenario::from_toml(
            r#"
            [target]
            kind = "player"
            health = 15.0
            absorption = 2.0

            [target.attributes]
            maxAir = 450

            [[target.items]]
            slot = "chest"
            name = "iron_chestplate"
            armor = 6.0
            enchantments = [{ kind = "protection", level = 2 }]

            [[target.effects]]
            effect_type = "resistance"
            remaining_ticks = 200
            amplifier = 1
            "#,
        )
        .unwrap();

        let target = scenario.target.build();
        assert!(target.is_player());
        assert_eq!(target.vitals.health(), 15.0);
        assert_eq!(target.vitals.absorption_amount(), 2.0);
        assert_eq!(target.air.max_air, 450);
        let chest = target.equipment.equipped(EquipmentSlot::Chest).unwrap();
        assert_eq!(chest.enchantments.len(), 1);
        assert_eq!(
            target.effects.amplifier(crate::entity::EffectType::Resistance),
            Some(1)
        );
    }

    #[test]
    fn test_run_with_listener_rules() {
        let scenario = Scenario::from_toml(
            r#"
            [[listeners]]
            action = "cancel"
            kind = "fall"

            [[listeners]]
            action = "scale_base"
            factor = 2.0
            order = "late"

            [[hits]]
            kind = "fall"
            amount = 5.0

            [[hits]]
            kind = "cactus"
            amount = 1.5
            "#,
        )
        .unwrap();

        let reports = run(&scenario, seeded()).unwrap();
        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].outcome.veto_reason(), Some(VetoReason::Cancelled));
        assert_eq!(reports[0].health, 20.0);
        assert!(reports[0].world.is_empty());
        assert_eq!(reports[1].outcome.final_damage(), Some(3.0));
        assert_eq!(reports[1].health, 17.0);
    }

    #[test]
    fn test_ticks_before_leave_window() {
        let scenario = Scenario::from_toml(
            r#"
            [[hits]]
            kind = "cactus"
            amount = 4.0

            [[hits]]
            kind = "cactus"
            amount = 4.0

            [[hits]]
            kind = "cactus"
            amount = 4.0
            ticks_before = 10
            "#,
        )
        .unwrap();

        let reports = run(&scenario, seeded()).unwrap();
        assert_eq!(reports[1].outcome.veto_reason(), Some(VetoReason::ResistWindow));
        // 20 - 10 = 10, no longer more than half the window
        assert!(reports[2].outcome.is_applied());
        assert_eq!(reports[2].health, 12.0);
    }

    #[test]
    fn test_attacker_required() {
        let scenario = Scenario::from_toml(
            r#"
            [[hits]]
            kind = "mob_attack"
            amount = 2.0
            "#,
        )
        .unwrap();
        assert!(run(&scenario, seeded()).is_err());
    }
}
