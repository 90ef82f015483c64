//! Status effects
//!
//! Timed effects on a living entity that the damage pipeline consults:
//! - Resistance (flat percentage reduction per amplifier level)
//! - Fire resistance (immunity to fire damage)
//! - Invisibility, wither, regeneration and absorption for completeness

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Types of status effects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectType {
    /// Resistance - 20% less damage per amplifier level
    Resistance,
    /// Fire resistance - fire damage is ignored
    FireResistance,
    /// Absorption - granted an absorption pool when applied
    Absorption,
    /// Invisibility - no gameplay effect on damage
    Invisibility,
    /// Wither - damage over time
    Wither,
    /// Regeneration - healing over time
    Regeneration,
}

impl FromStr for EffectType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "resistance" | "damage_resistance" => Ok(EffectType::Resistance),
            "fire_resistance" | "fireresistance" => Ok(EffectType::FireResistance),
            "absorption" => Ok(EffectType::Absorption),
            "invisibility" | "invis" => Ok(EffectType::Invisibility),
            "wither" => Ok(EffectType::Wither),
            "regeneration" | "regen" => Ok(EffectType::Regeneration),
            _ => Err(()),
        }
    }
}

impl std::fmt::Display for EffectType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            EffectType::Resistance => "resistance",
            EffectType::FireResistance => "fire_resistance",
            EffectType::Absorption => "absorption",
            EffectType::Invisibility => "invisibility",
            EffectType::Wither => "wither",
            EffectType::Regeneration => "regeneration",
        };
        write!(f, "{}", s)
    }
}

/// A status effect instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusEffect {
    /// Type of effect
    pub effect_type: EffectType,
    /// Remaining duration in ticks
    pub remaining_ticks: u32,
    /// Amplifier (level - 1)
    pub amplifier: u8,
}

impl StatusEffect {
    /// Create a new status effect
    pub fn new(effect_type: EffectType, duration_ticks: u32, amplifier: u8) -> Self {
        Self {
            effect_type,
            remaining_ticks: duration_ticks,
            amplifier,
        }
    }

    /// Count down one tick
    pub fn tick(&mut self) {
        self.remaining_ticks = self.remaining_ticks.saturating_sub(1);
    }

    /// Check if effect has expired
    pub fn is_expired(&self) -> bool {
        self.remaining_ticks == 0
    }
}

/// Effects on a single entity
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityEffects {
    effects: Vec<StatusEffect>,
}

impl EntityEffects {
    /// Create new empty effects
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an effect, refreshing duration and amplifier if already present
    pub fn add(&mut self, effect: StatusEffect) {
        if let Some(existing) = self
            .effects
            .iter_mut()
            .find(|e| e.effect_type == effect.effect_type)
        {
            existing.remaining_ticks = existing.remaining_ticks.max(effect.remaining_ticks);
            existing.amplifier = existing.amplifier.max(effect.amplifier);
        } else {
            self.effects.push(effect);
        }
    }

    /// Remove an effect by type
    pub fn remove(&mut self, effect_type: EffectType) {
        self.effects.retain(|e| e.effect_type != effect_type);
    }

    /// Check if entity has a specific effect
    pub fn has(&self, effect_type: EffectType) -> bool {
        self.get(effect_type).is_some()
    }

    /// Get an effect if present
    pub fn get(&self, effect_type: EffectType) -> Option<&StatusEffect> {
        self.effects
            .iter()
            .find(|e| e.effect_type == effect_type && !e.is_expired())
    }

    /// Amplifier of an active effect
    pub fn amplifier(&self, effect_type: EffectType) -> Option<u8> {
        self.get(effect_type).map(|e| e.amplifier)
    }

    /// Tick all effects and drop the expired ones
    pub fn tick_all(&mut self) {
        for effect in &mut self.effects {
            effect.tick();
        }
        self.effects.retain(|e| !e.is_expired());
    }

    /// Get all active effects
    pub fn active_effects(&self) -> Vec<&StatusEffect> {
        self.effects.iter().filter(|e| !e.is_expired()).collect()
    }

    /// Clear all effects
    pub fn clear(&mut self) {
        self.effects.clear();
    }
}
