//! Living entities as seen by the damage pipeline
//!
//! A [`LivingEntity`] bundles everything the resolver reads or writes:
//! - Vital state (health, absorption, resist timers)
//! - Active status effects
//! - Equipment (armor, helmet, shield)
//! - Combat history

mod air;
mod effects;
mod equipment;
mod tracker;
mod vitals;

pub use air::{AirSupply, AttributeStore, MAX_AIR_KEY};
pub use effects::{EffectType, EntityEffects, StatusEffect};
pub use equipment::{
    Enchantment, EnchantmentKind, Equipment, EquipmentSlot, ItemHandle, Loadout, ARMOR_SLOTS,
};
pub use tracker::{CombatEntry, CombatTracker, COMBAT_TIMEOUT_TICKS, DAMAGE_TIMEOUT_TICKS};
pub use vitals::{EntityVitalState, DEFAULT_MAX_HURT_RESIST_TIME};

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique entity identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(pub Uuid);

impl EntityId {
    /// Generate a fresh random id
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What sort of actor an entity is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActorKind {
    /// A human player
    Player,
    /// Any other living creature
    #[default]
    Living,
    /// A living creature owned by a player
    TamedPet,
    /// Not alive (arrows, falling blocks, primed explosives)
    NonLiving,
}

impl ActorKind {
    pub fn is_living(&self) -> bool {
        !matches!(self, ActorKind::NonLiving)
    }
}

/// Non-owning reference to another entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityRef {
    pub id: EntityId,
    pub kind: ActorKind,
}

impl EntityRef {
    pub fn new(id: EntityId, kind: ActorKind) -> Self {
        Self { id, kind }
    }

    pub fn player(id: EntityId) -> Self {
        Self::new(id, ActorKind::Player)
    }

    pub fn living(id: EntityId) -> Self {
        Self::new(id, ActorKind::Living)
    }
}

/// Static facts about a target that do not change during a hit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetProfile {
    pub id: EntityId,
    pub kind: ActorKind,
    /// Ignores every source except out-of-world and creative players
    pub invulnerable: bool,
    /// Innately immune to fire (independent of the fire resistance effect)
    pub fire_immune: bool,
    /// Vanished targets take damage silently
    pub vanished: bool,
    /// Currently raising a shield
    pub blocking: bool,
    pub sound_volume: f32,
}

impl Default for TargetProfile {
    fn default() -> Self {
        Self {
            id: EntityId::new(),
            kind: ActorKind::Living,
            invulnerable: false,
            fire_immune: false,
            vanished: false,
            blocking: false,
            sound_volume: 1.0,
        }
    }
}

impl TargetProfile {
    pub fn entity_ref(&self) -> EntityRef {
        EntityRef::new(self.id, self.kind)
    }
}

/// A living entity that can be hit
#[derive(Debug, Clone)]
pub struct LivingEntity<E = Loadout> {
    pub profile: TargetProfile,
    pub(crate) vitals: EntityVitalState,
    pub effects: EntityEffects,
    pub equipment: E,
    pub tracker: CombatTracker,
    pub air: AirSupply,
}

impl LivingEntity<Loadout> {
    /// Create an unequipped living entity at full health
    pub fn new(kind: ActorKind, max_health: f64) -> Self {
        Self::with_equipment(kind, max_health, Loadout::new())
    }
}

impl<E: Equipment> LivingEntity<E> {
    /// Create a living entity wearing the given equipment
    pub fn with_equipment(kind: ActorKind, max_health: f64, equipment: E) -> Self {
        Self {
            profile: TargetProfile {
                kind,
                ..TargetProfile::default()
            },
            vitals: EntityVitalState::new(max_health),
            effects: EntityEffects::new(),
            equipment,
            tracker: CombatTracker::new(),
            air: AirSupply::default(),
        }
    }

    /// Start from the given vital state instead of full health
    pub fn with_vitals(mut self, vitals: EntityVitalState) -> Self {
        self.vitals = vitals;
        self
    }

    pub fn id(&self) -> EntityId {
        self.profile.id
    }

    /// Health, absorption and timers; written only by the resolver
    pub fn vitals(&self) -> &EntityVitalState {
        &self.vitals
    }

    pub fn is_player(&self) -> bool {
        self.profile.kind == ActorKind::Player
    }

    pub fn is_dead(&self) -> bool {
        self.vitals.is_dead()
    }

    /// Whether fire damage is ignored entirely
    pub fn is_fire_immune(&self) -> bool {
        self.profile.fire_immune || self.effects.has(EffectType::FireResistance)
    }

    /// Advance all timers by one tick
    pub fn tick(&mut self) {
        self.vitals.tick();
        self.effects.tick_all();
        self.tracker.tick();
    }
}
