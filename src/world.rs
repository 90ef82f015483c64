//! World collaborator
//!
//! Knockback, hit particles and sounds are host concerns. The resolver calls
//! them through [`World`]; [`SimWorld`] records the calls instead of
//! performing them.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::entity::EntityId;

/// Entity status byte for an ordinary hurt flash
pub const STATUS_HURT: u8 = 2;

/// Entity status byte for a hit absorbed by a shield
pub const STATUS_SHIELD_BLOCK: u8 = 29;

/// Entity status byte for thorns damage
pub const STATUS_THORNS: u8 = 33;

/// Sounds the pipeline plays
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SoundEvent {
    Hurt,
    Death,
}

pub trait World {
    /// Push `target` away from the offset `(dx, dz)`
    fn apply_knockback(&mut self, target: EntityId, strength: f64, dx: f64, dz: f64);

    /// Broadcast an entity status byte for `target`
    fn spawn_hit_particles(&mut self, target: EntityId, status: u8);

    fn play_sound(&mut self, target: EntityId, sound: SoundEvent, volume: f32, pitch: f32);

    /// Horizontal offset `(dx, dz)` from `to` to `from`, if both are placed
    fn horizontal_offset(&self, from: EntityId, to: EntityId) -> Option<(f64, f64)>;
}

/// A recorded world side effect
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "effect")]
pub enum WorldEffect {
    Knockback {
        target: EntityId,
        strength: f64,
        dx: f64,
        dz: f64,
    },
    Particles {
        target: EntityId,
        status: u8,
    },
    Sound {
        target: EntityId,
        sound: SoundEvent,
        volume: f32,
        pitch: f32,
    },
}

/// Recording world with flat positions
#[derive(Debug, Clone, Default)]
pub struct SimWorld {
    positions: HashMap<EntityId, (f64, f64)>,
    effects: Vec<WorldEffect>,
}

impl SimWorld {
    pub fn new() -> Self {
        Self::default()
    }

    /// Place an entity at `(x, z)`
    pub fn place(&mut self, entity: EntityId, x: f64, z: f64) {
        self.positions.insert(entity, (x, z));
    }

    pub fn effects(&self) -> &[WorldEffect] {
        &self.effects
    }

    /// Take the recorded effects, leaving the log empty
    pub fn drain(&mut self) -> Vec<WorldEffect> {
        std::mem::take(&mut self.effects)
    }

    pub fn sounds(&self) -> Vec<SoundEvent> {
        self.effects
            .iter()
            .filter_map(|e| match e {
                WorldEffect::Sound { sound, .. } => Some(*sound),
                _ => None,
            })
            .collect()
    }

    pub fn statuses(&self) -> Vec<u8> {
        self.effects
            .iter()
            .filter_map(|e| match e {
                WorldEffect::Particles { status, .. } => Some(*status),
                _ => None,
            })
            .collect()
    }
}

impl World for SimWorld {
    fn apply_knockback(&mut self, target: EntityId, strength: f64, dx: f64, dz: f64) {
        self.effects.push(WorldEffect::Knockback {
            target,
            strength,
            dx,
            dz,
        });
    }

    fn spawn_hit_particles(&mut self, target: EntityId, status: u8) {
        self.effects.push(WorldEffect::Particles { target, status });
    }

    fn play_sound(&mut self, target: EntityId, sound: SoundEvent, volume: f32, pitch: f32) {
        self.effects.push(WorldEffect::Sound {
            target,
            sound,
            volume,
            pitch,
        });
    }

    fn horizontal_offset(&self, from: EntityId, to: EntityId) -> Option<(f64, f64)> {
        let (fx, fz) = self.positions.get(&from)?;
        let (tx, tz) = self.positions.get(&to)?;
        Some((fx - tx, fz - tz))
    }
}
