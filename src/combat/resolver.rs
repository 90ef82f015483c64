//! Damage resolution
//!
//! [`DamageResolver::resolve`] takes one hit from the raw amount to the
//! mutated target:
//! 1. Validate the input
//! 2. Veto checks (invulnerable, dead, fire immune, host hook)
//! 3. Shield block
//! 4. Resist-window merge
//! 5. Build the modifier chain and dispatch the event
//! 6. Apply: durability, absorption, health, timers, world side effects
//!
//! Nothing on the target changes until step 6, so a vetoed or cancelled
//! hit leaves it exactly as it was.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing::{debug, error, info};

use super::chain::ModifierChainBuilder;
use super::dispatch::{EventDispatcher, ListenerChain};
use super::error::DamageError;
use super::event::{Cause, DamageEvent, FoldStep};
use super::hooks::{DamageHooks, NoHooks};
use super::modifier::DamageModifierKind;
use super::source::DamageSource;
use crate::config::ResolverConfig;
use crate::entity::{ActorKind, Equipment, EquipmentSlot, LivingEntity};
use crate::world::{SoundEvent, World, STATUS_HURT, STATUS_SHIELD_BLOCK, STATUS_THORNS};

/// Where a hit is in the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolveStage {
    Received,
    InvulnerableCheck,
    ResistMerge,
    ModifiersBuilt,
    EventDispatched,
    Applied,
    Rejected,
}

/// Why a hit did nothing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VetoReason {
    Invulnerable,
    AlreadyDead,
    FireImmune,
    /// The host attack hook refused the hit
    HookVetoed,
    /// Inside the resist window and no stronger than the last hit
    ResistWindow,
    /// A listener cancelled the event
    Cancelled,
}

impl VetoReason {
    /// Stage the hit reached before it was dropped
    pub fn stage(&self) -> ResolveStage {
        match self {
            VetoReason::Invulnerable
            | VetoReason::AlreadyDead
            | VetoReason::FireImmune
            | VetoReason::HookVetoed => ResolveStage::InvulnerableCheck,
            VetoReason::ResistWindow => ResolveStage::ResistMerge,
            VetoReason::Cancelled => ResolveStage::EventDispatched,
        }
    }
}

/// Summary of an applied hit
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AppliedDamage {
    /// Amount after the shield, recorded as the last damage
    pub amount: f64,
    /// Base damage the modifiers ran on
    pub base_damage: f64,
    /// Damage taken off health
    pub final_damage: f64,
    /// Damage soaked by the absorption pool
    pub absorbed: f64,
    /// Landed inside the resist window of an earlier hit
    pub merged: bool,
    /// Stopped or weakened by a shield
    pub blocked: bool,
    /// Health reached zero
    pub killed: bool,
}

/// Result of resolving one hit
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "outcome")]
pub enum Outcome {
    Applied(AppliedDamage),
    Vetoed { reason: VetoReason },
}

impl Outcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, Outcome::Applied(_))
    }

    pub fn is_vetoed(&self) -> bool {
        matches!(self, Outcome::Vetoed { .. })
    }

    pub fn applied(&self) -> Option<&AppliedDamage> {
        match self {
            Outcome::Applied(applied) => Some(applied),
            Outcome::Vetoed { .. } => None,
        }
    }

    pub fn final_damage(&self) -> Option<f64> {
        self.applied().map(|a| a.final_damage)
    }

    pub fn veto_reason(&self) -> Option<VetoReason> {
        match self {
            Outcome::Vetoed { reason } => Some(*reason),
            Outcome::Applied(_) => None,
        }
    }
}

/// Shield state for a blocked hit
struct Block {
    slot: EquipmentSlot,
    /// Amount before the shield reduced it
    raw_amount: f64,
}

/// Everything decided before the event was dispatched
struct PendingHit {
    amount: f64,
    merged: bool,
    block: Option<Block>,
}

/// Resolves hits against living entities
pub struct DamageResolver<W: World, D: EventDispatcher = ListenerChain> {
    config: ResolverConfig,
    builder: ModifierChainBuilder,
    hooks: Box<dyn DamageHooks>,
    world: W,
    dispatcher: D,
    rng: StdRng,
}

impl<W: World> DamageResolver<W, ListenerChain> {
    /// Resolver with an empty listener chain and no hooks
    pub fn new(config: ResolverConfig, world: W) -> Self {
        Self::with_dispatcher(config, world, ListenerChain::new())
    }
}

impl<W: World, D: EventDispatcher> DamageResolver<W, D> {
    pub fn with_dispatcher(config: ResolverConfig, world: W, dispatcher: D) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self {
            builder: ModifierChainBuilder::new(config.hard_hat_factor),
            config,
            hooks: Box::new(NoHooks),
            world,
            dispatcher,
            rng,
        }
    }

    /// Install host hooks
    pub fn with_hooks<H>(mut self, hooks: H) -> Self
    where
        H: DamageHooks + 'static,
    {
        self.hooks = Box::new(hooks);
        self
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    pub fn world(&self) -> &W {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut W {
        &mut self.world
    }

    pub fn dispatcher(&self) -> &D {
        &self.dispatcher
    }

    pub fn dispatcher_mut(&mut self) -> &mut D {
        &mut self.dispatcher
    }

    /// Resolve one hit of `amount` from `source` against `target`
    pub fn resolve<E: Equipment>(
        &mut self,
        target: &mut LivingEntity<E>,
        source: &DamageSource,
        amount: f64,
    ) -> Result<Outcome, DamageError> {
        let entity = target.id();
        validate(source, amount).inspect_err(|e| {
            error!(%entity, kind = %source.kind(), "rejected hit: {}", e);
        })?;
        debug!(%entity, kind = %source.kind(), amount, stage = ?ResolveStage::Received, "hit received");

        if let Some(reason) = self.check_vetoes(target, source, amount) {
            return Ok(veto(target, reason));
        }

        let pending = match self.prepare(target, source, amount) {
            Ok(pending) => pending,
            Err(reason) => return Ok(veto(target, reason)),
        };

        let incoming = if pending.merged {
            pending.amount - target.vitals.last_damage()
        } else {
            pending.amount
        };
        let chain = self
            .builder
            .build(target, source, incoming, &*self.hooks);
        debug!(
            %entity,
            base_damage = chain.base_damage,
            steps = chain.functions.len(),
            stage = ?ResolveStage::ModifiersBuilt,
            "modifiers built"
        );

        let mut event = DamageEvent::new(
            entity,
            Cause::for_source(source),
            chain.base_damage,
            chain.functions,
        );
        self.dispatcher.dispatch(&mut event);
        if event.is_cancelled() {
            return Ok(veto(target, VetoReason::Cancelled));
        }
        debug!(%entity, stage = ?ResolveStage::EventDispatched, "event dispatched");

        let applied = self.apply(target, source, &event, pending);
        info!(
            %entity,
            kind = %source.kind(),
            final_damage = applied.final_damage,
            health = target.vitals.health(),
            merged = applied.merged,
            killed = applied.killed,
            "damage applied"
        );
        Ok(Outcome::Applied(applied))
    }

    fn check_vetoes<E: Equipment>(
        &self,
        target: &LivingEntity<E>,
        source: &DamageSource,
        amount: f64,
    ) -> Option<VetoReason> {
        if target.profile.invulnerable && !source.bypasses_invulnerability() {
            Some(VetoReason::Invulnerable)
        } else if target.is_dead() {
            Some(VetoReason::AlreadyDead)
        } else if source.is_fire() && target.is_fire_immune() {
            Some(VetoReason::FireImmune)
        } else if !self.hooks.allow_attack(&target.profile, source, amount) {
            Some(VetoReason::HookVetoed)
        } else {
            None
        }
    }

    /// Shield block, then the resist-window merge rule
    fn prepare<E: Equipment>(
        &self,
        target: &LivingEntity<E>,
        source: &DamageSource,
        amount: f64,
    ) -> Result<PendingHit, VetoReason> {
        let block = blocking_slot(target, source, amount).map(|slot| Block {
            slot,
            raw_amount: amount,
        });
        let amount = match &block {
            Some(_) if source.is_projectile() => 0.0,
            Some(_) => amount * self.config.shield_reduction,
            None => amount,
        };

        let merged = target.vitals.in_resist_window();
        if merged && amount <= target.vitals.last_damage() {
            return Err(VetoReason::ResistWindow);
        }
        debug!(
            entity = %target.id(),
            amount,
            merged,
            blocked = block.is_some(),
            stage = ?ResolveStage::ResistMerge,
            "resist window checked"
        );
        Ok(PendingHit {
            amount,
            merged,
            block,
        })
    }

    fn apply<E: Equipment>(
        &mut self,
        target: &mut LivingEntity<E>,
        source: &DamageSource,
        event: &DamageEvent,
        pending: PendingHit,
    ) -> AppliedDamage {
        let steps = event.steps();
        let final_damage = steps.last().map_or(event.base_damage(), |s| s.output);

        self.wear_equipment(target, source, event, &steps, pending.block.as_ref());

        let absorbed = steps
            .iter()
            .filter(|s| s.kind == DamageModifierKind::Absorption)
            .map(|s| s.delta().min(0.0))
            .sum::<f64>();
        let vitals = &mut target.vitals;
        vitals.set_absorption_amount(vitals.absorption_amount() + absorbed);

        let is_player = target.profile.kind == ActorKind::Player;
        if final_damage != 0.0 {
            if is_player {
                vitals.add_exhaustion(source.hunger_damage());
            }
            let health_before = vitals.health();
            vitals.set_health(health_before - final_damage);
            target
                .tracker
                .track_damage(source, health_before, final_damage);
            if !is_player {
                vitals.set_absorption_amount(vitals.absorption_amount() - final_damage);
            }
        }

        vitals.record_damage(pending.amount, source.clone());
        if !pending.merged {
            vitals.open_resist_window(self.config.max_hurt_time);
        }

        if let Some(attacker) = source.attacker() {
            vitals.set_last_attacker(attacker.id);
            match attacker.kind {
                ActorKind::Player => {
                    vitals.mark_recently_hit(self.config.recently_hit_ticks, Some(attacker.id))
                }
                ActorKind::TamedPet => vitals.mark_recently_hit(self.config.recently_hit_ticks, None),
                ActorKind::Living | ActorKind::NonLiving => {}
            }
        }

        let killed = vitals.is_dead();
        if !target.profile.vanished {
            if pending.block.is_some() {
                self.push_back_attacker(target, source);
            }
            if !pending.merged {
                self.hurt_effects(target, source, pending.block.is_some(), killed);
            }
        }

        debug!(entity = %target.id(), stage = ?ResolveStage::Applied, "state updated");
        AppliedDamage {
            amount: pending.amount,
            base_damage: event.base_damage(),
            final_damage,
            absorbed: -absorbed,
            merged: pending.merged,
            blocked: pending.block.is_some(),
            killed,
        }
    }

    fn wear_equipment<E: Equipment>(
        &mut self,
        target: &mut LivingEntity<E>,
        source: &DamageSource,
        event: &DamageEvent,
        steps: &[FoldStep],
        block: Option<&Block>,
    ) {
        if event.has_kind(DamageModifierKind::HardHat) {
            let base = event.base_damage();
            let wear = base * 4.0 + self.rng.random::<f64>() * base * 2.0;
            target
                .equipment
                .damage_item(EquipmentSlot::Head, wear.floor() as i32);
        }

        if !source.is_unblockable() {
            for (function, step) in event.modifiers().iter().zip(steps) {
                if function.kind() != DamageModifierKind::Armor {
                    continue;
                }
                if let Some(slot) = function.modifier().slot() {
                    let wear = step.delta().abs().max(1.0);
                    target.equipment.damage_item(slot, wear as i32);
                }
            }
        }

        if let Some(block) = block {
            if block.raw_amount >= 3.0 {
                let wear = (block.raw_amount.floor() + 1.0) as i32;
                target.equipment.damage_item(block.slot, wear);
            }
        }
    }

    /// A blocked melee attacker is pushed back from the target
    fn push_back_attacker<E: Equipment>(&mut self, target: &LivingEntity<E>, source: &DamageSource) {
        if source.is_projectile() {
            return;
        }
        let Some(direct) = source.direct().filter(|d| d.kind.is_living()) else {
            return;
        };
        if let Some((dx, dz)) = self.world.horizontal_offset(target.id(), direct.id) {
            self.world.apply_knockback(
                direct.id,
                self.config.shield_knockback_strength,
                dx,
                dz,
            );
        }
    }

    fn hurt_effects<E: Equipment>(
        &mut self,
        target: &LivingEntity<E>,
        source: &DamageSource,
        blocked: bool,
        killed: bool,
    ) {
        let entity = target.id();
        let status = if blocked {
            STATUS_SHIELD_BLOCK
        } else if source.is_thorns() {
            STATUS_THORNS
        } else {
            STATUS_HURT
        };
        self.world.spawn_hit_particles(entity, status);

        if let Some(attacker) = source.attacker() {
            if let Some((mut dx, mut dz)) = self.world.horizontal_offset(attacker.id, entity) {
                // Attacker on top of the target: pick a random direction
                while dx * dx + dz * dz < 1.0e-4 {
                    dx = (self.rng.random::<f64>() - self.rng.random::<f64>()) * 0.01;
                    dz = (self.rng.random::<f64>() - self.rng.random::<f64>()) * 0.01;
                }
                self.world
                    .apply_knockback(entity, self.config.knockback_strength, dx, dz);
            }
        }

        let sound = if killed {
            SoundEvent::Death
        } else {
            SoundEvent::Hurt
        };
        let pitch = (self.rng.random::<f32>() - self.rng.random::<f32>()) * 0.2 + 1.0;
        self.world
            .play_sound(entity, sound, target.profile.sound_volume, pitch);
    }
}

impl<W: World + std::fmt::Debug, D: EventDispatcher + std::fmt::Debug> std::fmt::Debug
    for DamageResolver<W, D>
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DamageResolver")
            .field("config", &self.config)
            .field("world", &self.world)
            .field("dispatcher", &self.dispatcher)
            .finish()
    }
}

fn validate(source: &DamageSource, amount: f64) -> Result<(), DamageError> {
    if !amount.is_finite() {
        return Err(DamageError::InvalidAmount(amount));
    }
    if source.kind().requires_attacker() && source.attacker().is_none() {
        return Err(DamageError::MissingAttacker(source.kind()));
    }
    Ok(())
}

fn veto<E: Equipment>(target: &LivingEntity<E>, reason: VetoReason) -> Outcome {
    debug!(
        entity = %target.id(),
        ?reason,
        reached = ?reason.stage(),
        stage = ?ResolveStage::Rejected,
        "hit vetoed"
    );
    Outcome::Vetoed { reason }
}

/// The shield hand, if this hit can be blocked
fn blocking_slot<E: Equipment>(
    target: &LivingEntity<E>,
    source: &DamageSource,
    amount: f64,
) -> Option<EquipmentSlot> {
    if !target.profile.blocking || amount <= 0.0 || source.is_unblockable() {
        return None;
    }
    target.equipment.shield_slot()
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;
    use crate::combat::dispatch::Order;
    use crate::combat::source::DamageKind;
    use crate::entity::{EntityId, EntityRef, EntityVitalState, ItemHandle, Loadout, TargetProfile};
    use crate::world::{SimWorld, WorldEffect};

    fn resolver() -> DamageResolver<SimWorld> {
        let config = ResolverConfig {
            seed: Some(7),
            ..ResolverConfig::default()
        };
        DamageResolver::new(config, SimWorld::new())
    }

    fn generic() -> DamageSource {
        DamageSource::new(DamageKind::Generic)
    }

    #[test]
    fn test_plain_hit() {
        let mut resolver = resolver();
        let mut target = LivingEntity::new(ActorKind::Living, 20.0);

        let outcome = resolver.resolve(&mut target, &generic(), 6.0).unwrap();
        assert_eq!(outcome.final_damage(), Some(6.0));
        assert_eq!(target.vitals.health(), 14.0);
        assert_eq!(target.vitals.last_damage(), 6.0);
        assert_eq!(target.vitals.hurt_resist_time(), 20);
        assert_eq!(target.vitals.hurt_time(), 10);
        assert_eq!(resolver.world().statuses(), vec![STATUS_HURT]);
        assert_eq!(resolver.world().sounds(), vec![SoundEvent::Hurt]);
    }

    #[test]
    fn test_rejects_malformed_input() {
        let mut resolver = resolver();
        let mut target = LivingEntity::new(ActorKind::Living, 20.0);

        let err = resolver.resolve(&mut target, &generic(), f64::NAN).unwrap_err();
        assert!(matches!(err, DamageError::InvalidAmount(_)));

        let err = resolver
            .resolve(&mut target, &DamageSource::new(DamageKind::MobAttack), 1.0)
            .unwrap_err();
        assert!(matches!(err, DamageError::MissingAttacker(DamageKind::MobAttack)));
        assert!(err.is_invalid_input());
        assert_eq!(target.vitals.health(), 20.0);
    }

    #[test]
    fn test_veto_order() {
        let mut resolver = resolver();
        let mut target = LivingEntity::new(ActorKind::Living, 20.0);
        target.profile.invulnerable = true;
        target.profile.fire_immune = true;

        let lava = DamageSource::new(DamageKind::Lava);
        let outcome = resolver.resolve(&mut target, &lava, 4.0).unwrap();
        assert_eq!(outcome.veto_reason(), Some(VetoReason::Invulnerable));

        target.profile.invulnerable = false;
        let outcome = resolver.resolve(&mut target, &lava, 4.0).unwrap();
        assert_eq!(outcome.veto_reason(), Some(VetoReason::FireImmune));
        assert_eq!(VetoReason::FireImmune.stage(), ResolveStage::InvulnerableCheck);

        // Out of world reaches invulnerable targets
        target.profile.invulnerable = true;
        let void = DamageSource::new(DamageKind::OutOfWorld);
        assert!(resolver.resolve(&mut target, &void, 4.0).unwrap().is_applied());
    }

    #[test]
    fn test_dead_target_vetoed() {
        let mut resolver = resolver();
        let mut target = LivingEntity::new(ActorKind::Living, 20.0)
            .with_vitals(EntityVitalState::new(20.0).with_health(0.0));

        let outcome = resolver.resolve(&mut target, &generic(), 1.0).unwrap();
        assert_eq!(outcome.veto_reason(), Some(VetoReason::AlreadyDead));
        assert!(resolver.world().effects().is_empty());
    }

    #[test]
    fn test_cancelled_event_is_vetoed() {
        let mut resolver = resolver();
        resolver
            .dispatcher_mut()
            .register(Order::Default, |e: &mut DamageEvent| e.set_cancelled(true));
        let mut target = LivingEntity::new(ActorKind::Living, 20.0);
        let before = target.vitals.clone();

        let outcome = resolver.resolve(&mut target, &generic(), 5.0).unwrap();
        assert_eq!(outcome.veto_reason(), Some(VetoReason::Cancelled));
        assert_eq!(target.vitals, before);
        assert!(resolver.world().effects().is_empty());
    }

    #[test]
    fn test_merge_applies_difference_silently() {
        let mut resolver = resolver();
        let mut target = LivingEntity::new(ActorKind::Living, 20.0);

        resolver.resolve(&mut target, &generic(), 4.0).unwrap();
        resolver.world_mut().drain();

        let outcome = resolver.resolve(&mut target, &generic(), 7.0).unwrap();
        let applied = outcome.applied().unwrap();
        assert!(applied.merged);
        assert_eq!(applied.final_damage, 3.0);
        assert_eq!(target.vitals.health(), 13.0);
        assert_eq!(target.vitals.last_damage(), 7.0);
        // Merged hits keep the window and make no noise
        assert_eq!(target.vitals.hurt_resist_time(), 20);
        assert!(resolver.world().effects().is_empty());
    }

    #[test]
    fn test_shield_blocks_projectile() {
        let mut resolver = resolver();
        let loadout = Loadout::new().with(ItemHandle::shield(EquipmentSlot::OffHand));
        let mut target = LivingEntity::with_equipment(ActorKind::Player, 20.0, loadout);
        target.profile.blocking = true;

        let arrow = EntityRef::new(EntityId::new(), ActorKind::NonLiving);
        let source = DamageSource::projectile(arrow, None);
        let outcome = resolver.resolve(&mut target, &source, 5.0).unwrap();

        let applied = outcome.applied().unwrap();
        assert!(applied.blocked);
        assert_eq!(applied.final_damage, 0.0);
        assert_eq!(target.vitals.health(), 20.0);
        // 1 + floor(5)
        assert_eq!(target.equipment.equipped(EquipmentSlot::OffHand).unwrap().damage, 6);
        assert_eq!(resolver.world().statuses(), vec![STATUS_SHIELD_BLOCK]);
    }

    #[test]
    fn test_shield_wear_saturates_on_huge_hit() {
        let mut resolver = resolver();
        let loadout = Loadout::new().with(ItemHandle::shield(EquipmentSlot::OffHand));
        let mut target = LivingEntity::with_equipment(ActorKind::Living, 20.0, loadout);
        target.profile.blocking = true;

        let cactus = DamageSource::new(DamageKind::Cactus);
        let outcome = resolver.resolve(&mut target, &cactus, 1.0e10).unwrap();

        let applied = outcome.applied().unwrap();
        assert!(applied.blocked);
        assert!(applied.killed);
        assert_eq!(
            target.equipment.equipped(EquipmentSlot::OffHand).unwrap().damage,
            i32::MAX
        );
    }

    #[test]
    fn test_non_finite_base_from_listener_ignored() {
        let mut resolver = resolver();
        resolver
            .dispatcher_mut()
            .register(Order::Default, |e: &mut DamageEvent| {
                assert!(e.set_base_damage(f64::NAN).is_err());
                let last = e.modifiers().len();
                assert!(e.set_output(last.saturating_sub(1), f64::NAN).is_err());
            });
        let mut target = LivingEntity::new(ActorKind::Living, 20.0)
            .with_vitals(EntityVitalState::new(20.0).with_health(5.0));

        let outcome = resolver.resolve(&mut target, &generic(), 3.0).unwrap();
        assert_eq!(outcome.final_damage(), Some(3.0));
        assert_eq!(target.vitals().health(), 2.0);
    }

    #[test]
    fn test_shield_pushes_back_melee_attacker() {
        let mut resolver = resolver();
        let loadout = Loadout::new().with(ItemHandle::shield(EquipmentSlot::OffHand));
        let mut target = LivingEntity::with_equipment(ActorKind::Living, 20.0, loadout);
        target.profile.blocking = true;

        let zombie = EntityRef::living(EntityId::new());
        resolver.world_mut().place(target.id(), 0.0, 0.0);
        resolver.world_mut().place(zombie.id, 2.0, 0.0);

        let outcome = resolver
            .resolve(&mut target, &DamageSource::attack(zombie), 6.0)
            .unwrap();
        assert!((outcome.final_damage().unwrap() - 1.98).abs() < 1e-9);

        let knockbacks: Vec<_> = resolver
            .world()
            .effects()
            .iter()
            .filter_map(|e| match e {
                WorldEffect::Knockback {
                    target, strength, ..
                } => Some((*target, *strength)),
                _ => None,
            })
            .collect();
        assert_eq!(knockbacks, vec![(zombie.id, 0.5), (target.id(), 0.4)]);
    }

    #[test]
    fn test_hook_veto_and_rewrite() {
        struct Halve;
        impl DamageHooks for Halve {
            fn allow_attack(&self, target: &TargetProfile, _: &DamageSource, _: f64) -> bool {
                target.kind != ActorKind::TamedPet
            }

            fn modify_damage(&self, _: &TargetProfile, _: &DamageSource, amount: f64) -> f64 {
                amount / 2.0
            }
        }

        let mut resolver = resolver().with_hooks(Halve);
        let mut pet = LivingEntity::new(ActorKind::TamedPet, 20.0);
        let outcome = resolver.resolve(&mut pet, &generic(), 8.0).unwrap();
        assert_eq!(outcome.veto_reason(), Some(VetoReason::HookVetoed));

        let mut mob = LivingEntity::new(ActorKind::Living, 20.0);
        let outcome = resolver.resolve(&mut mob, &generic(), 8.0).unwrap();
        assert_eq!(outcome.final_damage(), Some(4.0));
        // The raw amount is what the resist window remembers
        assert_eq!(mob.vitals.last_damage(), 8.0);
    }

    #[test]
    fn test_listener_sees_every_applied_hit() {
        let calls = Rc::new(Cell::new(0));
        let mut resolver = resolver();
        let seen = calls.clone();
        resolver
            .dispatcher_mut()
            .register(Order::Default, move |_: &mut DamageEvent| seen.set(seen.get() + 1));

        let mut target = LivingEntity::new(ActorKind::Living, 20.0);
        resolver.resolve(&mut target, &generic(), 2.0).unwrap();
        // Vetoed by the window before dispatch
        resolver.resolve(&mut target, &generic(), 1.0).unwrap();
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_player_attacker_marks_recently_hit() {
        let mut resolver = resolver();
        let mut target = LivingEntity::new(ActorKind::Living, 20.0);
        let player = EntityRef::player(EntityId::new());

        resolver
            .resolve(&mut target, &DamageSource::attack(player), 3.0)
            .unwrap();
        assert_eq!(target.vitals.last_attacker(), Some(player.id));
        assert_eq!(target.vitals.attacking_player(), Some(player.id));
        assert_eq!(target.vitals.recently_hit(), 100);
        assert_eq!(target.tracker.best_attacker(), Some(player.id));
    }

    #[test]
    fn test_killing_blow_plays_death_sound() {
        let mut resolver = resolver();
        let mut target = LivingEntity::new(ActorKind::Living, 4.0);

        let outcome = resolver.resolve(&mut target, &generic(), 9.0).unwrap();
        assert!(outcome.applied().unwrap().killed);
        assert!(target.is_dead());
        assert_eq!(resolver.world().sounds(), vec![SoundEvent::Death]);
    }
}
