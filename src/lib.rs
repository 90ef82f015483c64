//! mortal - entity damage resolution
//!
//! Resolves hits against living entities: modifier chains for armor,
//! resistance, enchantments and absorption, a cancellable damage event, and
//! the resist window that merges rapid repeat hits.

pub mod combat;
pub mod config;
pub mod entity;
pub mod scenario;
pub mod value;
pub mod world;

pub use combat::{DamageError, DamageEvent, DamageKind, DamageResolver, DamageSource, Outcome};
pub use config::ResolverConfig;
pub use entity::{EntityId, LivingEntity};
pub use world::{SimWorld, World};
