//! Resolver configuration
//!
//! Layered with figment: built-in defaults, then an optional TOML file,
//! then `MORTAL_*` environment variables.

use std::path::Path;

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::combat::DamageError;

/// Environment variable prefix
pub const ENV_PREFIX: &str = "MORTAL_";

/// Tunables for the damage resolver
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Hurt animation length set on a fresh hit
    pub max_hurt_time: i32,
    /// Knockback applied to the target of a fresh hit
    pub knockback_strength: f64,
    /// Knockback applied to a melee attacker whose hit was blocked
    pub shield_knockback_strength: f64,
    /// Fraction of a non-projectile hit that gets past a shield
    pub shield_reduction: f64,
    /// Ticks a target counts as recently hit by a player
    pub recently_hit_ticks: i32,
    /// Damage multiplier from a helmet against falling objects
    pub hard_hat_factor: f64,
    /// Seed for durability and knockback jitter rolls
    pub seed: Option<u64>,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            max_hurt_time: 10,
            knockback_strength: 0.4,
            shield_knockback_strength: 0.5,
            shield_reduction: 0.33,
            recently_hit_ticks: 100,
            hard_hat_factor: 0.75,
            seed: None,
        }
    }
}

impl ResolverConfig {
    /// Defaults overlaid with `MORTAL_*` environment variables
    pub fn from_env() -> Result<Self, DamageError> {
        Self::figment(None).extract().map_err(|e| Box::new(e).into())
    }

    /// Defaults overlaid with a TOML file, then the environment
    pub fn load(path: &Path) -> Result<Self, DamageError> {
        Self::figment(Some(path))
            .extract()
            .map_err(|e| Box::new(e).into())
    }

    /// The layered provider stack
    pub fn figment(path: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(ResolverConfig::default()));
        if let Some(path) = path {
            figment = figment.merge(Toml::file(path));
        }
        figment.merge(Env::prefixed(ENV_PREFIX))
    }
}
