//! Damage pipeline
//!
//! Turns a raw hit into a health change:
//! - Damage sources and their flags
//! - Ordered modifier chain (hard hat, armor, resistance, enchantments, absorption)
//! - Cancellable damage event with per-step output overrides
//! - Listener dispatch by priority
//! - Resolver with resist-window merging and side effects

mod chain;
mod dispatch;
mod error;
mod event;
mod hooks;
mod modifier;
mod resolver;
mod source;

pub use chain::{armor_reduction, protection_points, ModifierChain, ModifierChainBuilder};
pub use dispatch::{DamageListener, EventDispatcher, ListenerChain, Order};
pub use error::DamageError;
pub use event::{Cause, CauseEntry, DamageEvent, FoldStep};
pub use hooks::{DamageHooks, NoHooks};
pub use modifier::{DamageModifier, DamageModifierKind, ModifierCause, ModifierFunction};
pub use resolver::{AppliedDamage, DamageResolver, Outcome, ResolveStage, VetoReason};
pub use source::{DamageKind, DamageSource, SourceFlags, DEFAULT_HUNGER_DAMAGE};
