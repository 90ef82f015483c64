//! Common test utilities - MortalTest harness for resolver tests

#![allow(dead_code)]

use std::cell::Cell;
use std::rc::Rc;

use mortal::combat::{DamageEvent, DamageResolver, DamageSource, Order, Outcome};
use mortal::entity::{ActorKind, EntityId, EntityRef, EquipmentSlot, ItemHandle, LivingEntity, Loadout};
use mortal::{ResolverConfig, SimWorld};

/// Resolver over a recording world, with a listener that counts dispatches
pub struct MortalTest {
    pub resolver: DamageResolver<SimWorld>,
    calls: Rc<Cell<usize>>,
}

impl MortalTest {
    pub fn new() -> Self {
        Self::with_config(ResolverConfig {
            seed: Some(42),
            ..ResolverConfig::default()
        })
    }

    pub fn with_config(config: ResolverConfig) -> Self {
        let mut resolver = DamageResolver::new(config, SimWorld::new());
        let calls = Rc::new(Cell::new(0));
        let counter = calls.clone();
        resolver
            .dispatcher_mut()
            .register_always(Order::First, move |_: &mut DamageEvent| {
                counter.set(counter.get() + 1)
            });
        Self { resolver, calls }
    }

    /// Number of events listeners have seen
    pub fn listener_calls(&self) -> usize {
        self.calls.get()
    }

    /// Add a listener
    pub fn listen<F>(&mut self, order: Order, listener: F)
    where
        F: FnMut(&mut DamageEvent) + 'static,
    {
        self.resolver.dispatcher_mut().register(order, listener);
    }

    /// Put an entity in the world at `(x, z)`
    pub fn place(&mut self, entity: EntityId, x: f64, z: f64) {
        self.resolver.world_mut().place(entity, x, z);
    }

    /// Resolve a hit, panicking on malformed input
    pub fn hit(&mut self, target: &mut LivingEntity, source: &DamageSource, amount: f64) -> Outcome {
        self.resolver
            .resolve(target, source, amount)
            .expect("hit should be well formed")
    }

    pub fn world(&self) -> &SimWorld {
        self.resolver.world()
    }
}

/// Four pieces totalling 11.25 armor points
pub fn iron_set() -> Loadout {
    Loadout::new()
        .with(ItemHandle::armor(EquipmentSlot::Head, "iron_helmet", 2.0, 0.0).with_max_damage(165))
        .with(ItemHandle::armor(EquipmentSlot::Chest, "iron_chestplate", 6.0, 0.0).with_max_damage(240))
        .with(ItemHandle::armor(EquipmentSlot::Legs, "chain_leggings", 2.25, 0.0).with_max_damage(225))
        .with(ItemHandle::armor(EquipmentSlot::Feet, "leather_boots", 1.0, 0.0).with_max_damage(65))
}

/// A plain mob at 20 health
pub fn mob() -> LivingEntity {
    LivingEntity::new(ActorKind::Living, 20.0)
}

/// A player at 20 health
pub fn player() -> LivingEntity {
    LivingEntity::new(ActorKind::Player, 20.0)
}

/// A mob wearing the iron set
pub fn armored_mob() -> LivingEntity {
    LivingEntity::with_equipment(ActorKind::Living, 20.0, iron_set())
}

pub fn zombie() -> EntityRef {
    EntityRef::living(EntityId::new())
}

pub fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}
