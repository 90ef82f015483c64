//! Vital state of a living entity
//!
//! Health, absorption and the timers that drive resist-window merging.
//! Once constructed, only the damage resolver writes these fields.

use serde::{Deserialize, Serialize};

use super::EntityId;
use crate::combat::DamageSource;
use crate::value::{BoundedValue, BoundsError};

/// Default length of the post-hit resist window in ticks
pub const DEFAULT_MAX_HURT_RESIST_TIME: i32 = 20;

/// The subset of a living entity the damage pipeline reads and writes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityVitalState {
    health: f64,
    max_health: f64,
    absorption_amount: f64,
    last_damage: f64,
    last_damage_source: Option<DamageSource>,
    last_attacker: Option<EntityId>,
    attacking_player: Option<EntityId>,
    hurt_resist_time: i32,
    max_hurt_resist_time: i32,
    hurt_time: i32,
    max_hurt_time: i32,
    recently_hit: i32,
    exhaustion: f64,
}

impl EntityVitalState {
    /// Full health, no absorption, outside any resist window
    pub fn new(max_health: f64) -> Self {
        let max_health = max_health.max(1.0);
        Self {
            health: max_health,
            max_health,
            absorption_amount: 0.0,
            last_damage: 0.0,
            last_damage_source: None,
            last_attacker: None,
            attacking_player: None,
            hurt_resist_time: 0,
            max_hurt_resist_time: DEFAULT_MAX_HURT_RESIST_TIME,
            hurt_time: 0,
            max_hurt_time: 0,
            recently_hit: 0,
            exhaustion: 0.0,
        }
    }

    /// Start at a given health, clamped to `[0, max_health]`
    pub fn with_health(mut self, health: f64) -> Self {
        self.health = health.clamp(0.0, self.max_health);
        self
    }

    /// Start with an absorption pool
    pub fn with_absorption(mut self, amount: f64) -> Self {
        self.absorption_amount = amount.max(0.0);
        self
    }

    /// Override the resist window length
    pub fn with_max_hurt_resist_time(mut self, ticks: i32) -> Self {
        self.max_hurt_resist_time = ticks.max(0);
        self
    }

    /// Start inside a resist window opened by an earlier hit of `last_damage`
    pub fn with_resist_window(mut self, hurt_resist_time: i32, last_damage: f64) -> Self {
        self.hurt_resist_time = hurt_resist_time;
        self.last_damage = last_damage;
        self
    }

    pub fn health(&self) -> f64 {
        self.health
    }

    pub fn max_health(&self) -> f64 {
        self.max_health
    }

    pub fn absorption_amount(&self) -> f64 {
        self.absorption_amount
    }

    pub fn last_damage(&self) -> f64 {
        self.last_damage
    }

    pub fn last_damage_source(&self) -> Option<&DamageSource> {
        self.last_damage_source.as_ref()
    }

    pub fn last_attacker(&self) -> Option<EntityId> {
        self.last_attacker
    }

    pub fn attacking_player(&self) -> Option<EntityId> {
        self.attacking_player
    }

    pub fn hurt_resist_time(&self) -> i32 {
        self.hurt_resist_time
    }

    pub fn max_hurt_resist_time(&self) -> i32 {
        self.max_hurt_resist_time
    }

    pub fn hurt_time(&self) -> i32 {
        self.hurt_time
    }

    pub fn max_hurt_time(&self) -> i32 {
        self.max_hurt_time
    }

    pub fn recently_hit(&self) -> i32 {
        self.recently_hit
    }

    pub fn exhaustion(&self) -> f64 {
        self.exhaustion
    }

    /// Dead once health reaches zero
    pub fn is_dead(&self) -> bool {
        self.health <= 0.0
    }

    /// Whether a hit now would land inside the resist window of the last one
    pub fn in_resist_window(&self) -> bool {
        f64::from(self.hurt_resist_time) > f64::from(self.max_hurt_resist_time) / 2.0
    }

    /// Health as a bounded value in `[0, max_health]`
    pub fn health_value(&self) -> Result<BoundedValue, BoundsError> {
        BoundedValue::clamped(self.health, 0.0, self.max_health)
    }

    /// Max health as a bounded value in `[1, f64::MAX]`
    pub fn max_health_value(&self) -> Result<BoundedValue, BoundsError> {
        BoundedValue::new(self.max_health, 1.0, f64::MAX)
    }

    /// Count down the resist, hurt and recently-hit timers
    pub fn tick(&mut self) {
        self.hurt_resist_time = (self.hurt_resist_time - 1).max(0);
        self.hurt_time = (self.hurt_time - 1).max(0);
        self.recently_hit = (self.recently_hit - 1).max(0);
        if self.recently_hit == 0 {
            self.attacking_player = None;
        }
    }

    pub(crate) fn set_health(&mut self, health: f64) {
        self.health = health.min(self.max_health);
    }

    pub(crate) fn set_absorption_amount(&mut self, amount: f64) {
        self.absorption_amount = amount.max(0.0);
    }

    pub(crate) fn record_damage(&mut self, amount: f64, source: DamageSource) {
        self.last_damage = amount;
        self.last_damage_source = Some(source);
    }

    pub(crate) fn open_resist_window(&mut self, max_hurt_time: i32) {
        self.hurt_resist_time = self.max_hurt_resist_time;
        self.hurt_time = max_hurt_time;
        self.max_hurt_time = max_hurt_time;
    }

    pub(crate) fn set_last_attacker(&mut self, attacker: EntityId) {
        self.last_attacker = Some(attacker);
    }

    pub(crate) fn mark_recently_hit(&mut self, ticks: i32, player: Option<EntityId>) {
        self.recently_hit = ticks;
        self.attacking_player = player;
    }

    pub(crate) fn add_exhaustion(&mut self, amount: f64) {
        self.exhaustion += amount;
    }
}
