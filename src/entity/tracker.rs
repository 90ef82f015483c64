//! Combat tracking
//!
//! Records the hits a living entity has taken:
//! - Who has been attacking it
//! - How much each hit took off
//! - Whether it is currently in combat
//!
//! The history is dropped after a quiet spell with no tracked hits:
//! [`COMBAT_TIMEOUT_TICKS`] while in combat, [`DAMAGE_TIMEOUT_TICKS`] otherwise.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::EntityId;
use crate::combat::{DamageKind, DamageSource};

/// Quiet ticks before an entity that was attacked leaves combat
pub const COMBAT_TIMEOUT_TICKS: u32 = 300;

/// Quiet ticks before environmental damage history is dropped
pub const DAMAGE_TIMEOUT_TICKS: u32 = 100;

/// One tracked hit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombatEntry {
    pub kind: DamageKind,
    pub attacker: Option<EntityId>,
    pub health_before: f64,
    pub damage: f64,
}

/// Combat history for a single entity
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CombatTracker {
    /// Whether entity is in combat
    pub in_combat: bool,
    /// Set of entities that have hit this entity
    pub attackers: HashSet<EntityId>,
    entries: Vec<CombatEntry>,
    /// Ticks left before the history is dropped
    quiet_ticks: u32,
}

impl CombatTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a hit that changed health
    pub fn track_damage(&mut self, source: &DamageSource, health_before: f64, damage: f64) {
        let attacker = source.attacker().map(|a| a.id);
        if let Some(id) = attacker {
            self.in_combat = true;
            self.attackers.insert(id);
        }
        self.entries.push(CombatEntry {
            kind: source.kind(),
            attacker,
            health_before,
            damage,
        });
        self.quiet_ticks = if self.in_combat {
            COMBAT_TIMEOUT_TICKS
        } else {
            DAMAGE_TIMEOUT_TICKS
        };
    }

    /// Count down the quiet timer, resetting when it runs out
    pub fn tick(&mut self) {
        if self.entries.is_empty() {
            return;
        }
        self.quiet_ticks = self.quiet_ticks.saturating_sub(1);
        if self.quiet_ticks == 0 {
            self.reset();
        }
    }

    /// Ticks left before the history is dropped
    pub fn quiet_ticks(&self) -> u32 {
        self.quiet_ticks
    }

    /// All tracked hits, oldest first
    pub fn entries(&self) -> &[CombatEntry] {
        &self.entries
    }

    pub fn last_entry(&self) -> Option<&CombatEntry> {
        self.entries.last()
    }

    /// Total damage taken across all tracked hits
    pub fn total_damage(&self) -> f64 {
        self.entries.iter().map(|e| e.damage).sum()
    }

    /// The attacker responsible for the most damage
    ///
    /// Ties go to whoever landed the first hit.
    pub fn best_attacker(&self) -> Option<EntityId> {
        let mut dealt: Vec<(EntityId, f64)> = Vec::new();
        for entry in &self.entries {
            let Some(id) = entry.attacker else { continue };
            match dealt.iter_mut().find(|(a, _)| *a == id) {
                Some((_, total)) => *total += entry.damage,
                None => dealt.push((id, entry.damage)),
            }
        }
        dealt
            .into_iter()
            .fold(None, |best: Option<(EntityId, f64)>, (id, total)| match best {
                Some((_, b)) if total <= b => best,
                _ => Some((id, total)),
            })
            .map(|(id, _)| id)
    }

    /// Leave combat entirely
    pub fn reset(&mut self) {
        self.in_combat = false;
        self.attackers.clear();
        self.entries.clear();
        self.quiet_ticks = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::EntityRef;

    #[test]
    fn test_track_environmental_damage() {
        let mut tracker = CombatTracker::new();
        tracker.track_damage(&DamageSource::new(DamageKind::Fall), 20.0, 3.0);

        assert!(!tracker.in_combat);
        assert!(tracker.attackers.is_empty());
        assert_eq!(tracker.entries().len(), 1);
        assert_eq!(tracker.last_entry().unwrap().kind, DamageKind::Fall);
    }

    #[test]
    fn test_best_attacker() {
        let zombie = EntityId::new();
        let player = EntityId::new();
        let mut tracker = CombatTracker::new();

        let by_zombie = DamageSource::attack(EntityRef::living(zombie));
        let by_player = DamageSource::attack(EntityRef::player(player));

        tracker.track_damage(&by_zombie, 20.0, 3.0);
        tracker.track_damage(&by_player, 17.0, 4.0);
        tracker.track_damage(&by_zombie, 13.0, 2.0);

        assert!(tracker.in_combat);
        assert_eq!(tracker.attackers.len(), 2);
        assert_eq!(tracker.best_attacker(), Some(zombie));
        assert_eq!(tracker.total_damage(), 9.0);

        tracker.reset();
        assert!(!tracker.in_combat);
        assert!(tracker.best_attacker().is_none());
    }

    #[test]
    fn test_best_attacker_tie_goes_to_first() {
        let skeleton = EntityId::new();
        let spider = EntityId::new();
        let mut tracker = CombatTracker::new();

        tracker.track_damage(&DamageSource::attack(EntityRef::living(skeleton)), 20.0, 4.0);
        tracker.track_damage(&DamageSource::attack(EntityRef::living(spider)), 16.0, 3.0);
        tracker.track_damage(&DamageSource::attack(EntityRef::living(spider)), 13.0, 1.0);

        assert_eq!(tracker.best_attacker(), Some(skeleton));
    }

    #[test]
    fn test_leaves_combat_after_quiet_spell() {
        let mut tracker = CombatTracker::new();
        tracker.track_damage(&DamageSource::attack(EntityRef::living(EntityId::new())), 20.0, 2.0);
        assert_eq!(tracker.quiet_ticks(), COMBAT_TIMEOUT_TICKS);

        for _ in 0..COMBAT_TIMEOUT_TICKS - 1 {
            tracker.tick();
        }
        assert!(tracker.in_combat);
        assert_eq!(tracker.entries().len(), 1);

        tracker.tick();
        assert!(!tracker.in_combat);
        assert!(tracker.attackers.is_empty());
        assert!(tracker.entries().is_empty());
    }

    #[test]
    fn test_new_hit_restarts_quiet_timer() {
        let mut tracker = CombatTracker::new();
        let fall = DamageSource::new(DamageKind::Fall);
        tracker.track_damage(&fall, 20.0, 1.0);
        assert_eq!(tracker.quiet_ticks(), DAMAGE_TIMEOUT_TICKS);

        for _ in 0..DAMAGE_TIMEOUT_TICKS - 1 {
            tracker.tick();
        }
        tracker.track_damage(&fall, 19.0, 1.0);
        tracker.tick();
        assert_eq!(tracker.entries().len(), 2);
        assert_eq!(tracker.quiet_ticks(), DAMAGE_TIMEOUT_TICKS - 1);
    }
}
