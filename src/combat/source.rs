//! Damage sources
//!
//! A [`DamageSource`] describes where a single hit came from. Each
//! [`DamageKind`] carries default flags:
//! - Fire: blocked by fire immunity, boosted fire protection
//! - Projectile: stopped outright by a shield
//! - Unblockable: skips shields and armor durability loss
//! - Absolute: skips armor, resistance and enchantment reduction

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::entity::{ActorKind, EntityRef};

/// Exhaustion added to a player for a non-zero hit
pub const DEFAULT_HUNGER_DAMAGE: f64 = 0.1;

/// Kinds of damage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DamageKind {
    Generic,
    PlayerAttack,
    MobAttack,
    Projectile,
    Thorns,
    InFire,
    OnFire,
    Lava,
    HotFloor,
    Fall,
    FallingBlock,
    Anvil,
    Drown,
    Starve,
    Cactus,
    Magic,
    Wither,
    Explosion,
    Lightning,
    InWall,
    OutOfWorld,
}

impl DamageKind {
    /// Get all damage kinds
    pub fn all() -> &'static [DamageKind] {
        &[
            DamageKind::Generic,
            DamageKind::PlayerAttack,
            DamageKind::MobAttack,
            DamageKind::Projectile,
            DamageKind::Thorns,
            DamageKind::InFire,
            DamageKind::OnFire,
            DamageKind::Lava,
            DamageKind::HotFloor,
            DamageKind::Fall,
            DamageKind::FallingBlock,
            DamageKind::Anvil,
            DamageKind::Drown,
            DamageKind::Starve,
            DamageKind::Cactus,
            DamageKind::Magic,
            DamageKind::Wither,
            DamageKind::Explosion,
            DamageKind::Lightning,
            DamageKind::InWall,
            DamageKind::OutOfWorld,
        ]
    }

    /// Kinds that are always dealt by an entity
    pub fn requires_attacker(&self) -> bool {
        matches!(
            self,
            DamageKind::PlayerAttack | DamageKind::MobAttack | DamageKind::Thorns
        )
    }

    /// Whether a falling object hitting the head (helmet applies)
    pub fn is_falling_object(&self) -> bool {
        matches!(self, DamageKind::FallingBlock | DamageKind::Anvil)
    }

    fn default_flags(&self) -> SourceFlags {
        let mut flags = SourceFlags::default();
        match self {
            DamageKind::InFire | DamageKind::Lava | DamageKind::HotFloor => flags.fire = true,
            DamageKind::OnFire => {
                flags.fire = true;
                flags.unblockable = true;
            }
            DamageKind::Projectile => flags.projectile = true,
            DamageKind::Thorns => {
                flags.thorns = true;
                flags.magic = true;
            }
            DamageKind::Magic => {
                flags.magic = true;
                flags.unblockable = true;
            }
            DamageKind::Starve => {
                flags.unblockable = true;
                flags.absolute = true;
            }
            DamageKind::Explosion => flags.explosion = true,
            DamageKind::Generic
            | DamageKind::Fall
            | DamageKind::Drown
            | DamageKind::Wither
            | DamageKind::InWall
            | DamageKind::OutOfWorld => flags.unblockable = true,
            DamageKind::PlayerAttack
            | DamageKind::MobAttack
            | DamageKind::FallingBlock
            | DamageKind::Anvil
            | DamageKind::Cactus
            | DamageKind::Lightning => {}
        }
        flags
    }
}

impl FromStr for DamageKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "generic" => Ok(DamageKind::Generic),
            "player_attack" | "player" => Ok(DamageKind::PlayerAttack),
            "mob_attack" | "mob" => Ok(DamageKind::MobAttack),
            "projectile" | "arrow" => Ok(DamageKind::Projectile),
            "thorns" => Ok(DamageKind::Thorns),
            "in_fire" => Ok(DamageKind::InFire),
            "on_fire" => Ok(DamageKind::OnFire),
            "lava" => Ok(DamageKind::Lava),
            "hot_floor" | "magma" => Ok(DamageKind::HotFloor),
            "fall" => Ok(DamageKind::Fall),
            "falling_block" => Ok(DamageKind::FallingBlock),
            "anvil" => Ok(DamageKind::Anvil),
            "drown" => Ok(DamageKind::Drown),
            "starve" => Ok(DamageKind::Starve),
            "cactus" => Ok(DamageKind::Cactus),
            "magic" => Ok(DamageKind::Magic),
            "wither" => Ok(DamageKind::Wither),
            "explosion" => Ok(DamageKind::Explosion),
            "lightning" | "lightning_bolt" => Ok(DamageKind::Lightning),
            "in_wall" => Ok(DamageKind::InWall),
            "out_of_world" | "void" => Ok(DamageKind::OutOfWorld),
            _ => Err(()),
        }
    }
}

impl std::fmt::Display for DamageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            DamageKind::Generic => "generic",
            DamageKind::PlayerAttack => "player_attack",
            DamageKind::MobAttack => "mob_attack",
            DamageKind::Projectile => "projectile",
            DamageKind::Thorns => "thorns",
            DamageKind::InFire => "in_fire",
            DamageKind::OnFire => "on_fire",
            DamageKind::Lava => "lava",
            DamageKind::HotFloor => "hot_floor",
            DamageKind::Fall => "fall",
            DamageKind::FallingBlock => "falling_block",
            DamageKind::Anvil => "anvil",
            DamageKind::Drown => "drown",
            DamageKind::Starve => "starve",
            DamageKind::Cactus => "cactus",
            DamageKind::Magic => "magic",
            DamageKind::Wither => "wither",
            DamageKind::Explosion => "explosion",
            DamageKind::Lightning => "lightning",
            DamageKind::InWall => "in_wall",
            DamageKind::OutOfWorld => "out_of_world",
        };
        write!(f, "{}", s)
    }
}

/// Behavior flags of a source
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceFlags {
    pub fire: bool,
    pub projectile: bool,
    pub unblockable: bool,
    pub absolute: bool,
    pub explosion: bool,
    pub magic: bool,
    pub thorns: bool,
    /// Dealt by a player in creative mode
    pub creative_player: bool,
}

/// Immutable description of one incoming hit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DamageSource {
    kind: DamageKind,
    /// Entity ultimately responsible (the shooter for projectiles)
    attacker: Option<EntityRef>,
    /// Entity that made contact (the arrow itself)
    direct: Option<EntityRef>,
    flags: SourceFlags,
    hunger_damage: f64,
}

impl DamageSource {
    /// An environmental source with the kind's default flags
    pub fn new(kind: DamageKind) -> Self {
        let flags = kind.default_flags();
        Self {
            kind,
            attacker: None,
            direct: None,
            flags,
            hunger_damage: if flags.unblockable {
                0.0
            } else {
                DEFAULT_HUNGER_DAMAGE
            },
        }
    }

    /// A melee hit by an entity
    pub fn attack(attacker: EntityRef) -> Self {
        let kind = if attacker.kind == ActorKind::Player {
            DamageKind::PlayerAttack
        } else {
            DamageKind::MobAttack
        };
        Self::new(kind).with_attacker(attacker).with_direct(attacker)
    }

    /// A projectile fired by `shooter`
    pub fn projectile(projectile: EntityRef, shooter: Option<EntityRef>) -> Self {
        let source = Self::new(DamageKind::Projectile).with_direct(projectile);
        match shooter {
            Some(shooter) => source.with_attacker(shooter),
            None => source,
        }
    }

    /// Thorns damage reflected back by `wearer`
    pub fn thorns(wearer: EntityRef) -> Self {
        Self::new(DamageKind::Thorns)
            .with_attacker(wearer)
            .with_direct(wearer)
    }

    pub fn with_attacker(mut self, attacker: EntityRef) -> Self {
        self.attacker = Some(attacker);
        self
    }

    pub fn with_direct(mut self, direct: EntityRef) -> Self {
        self.direct = Some(direct);
        self
    }

    pub fn with_flags(mut self, flags: SourceFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn fire(mut self) -> Self {
        self.flags.fire = true;
        self
    }

    /// Skip shields and armor durability loss; also clears hunger damage
    pub fn unblockable(mut self) -> Self {
        self.flags.unblockable = true;
        self.hunger_damage = 0.0;
        self
    }

    pub fn absolute(mut self) -> Self {
        self.flags.absolute = true;
        self
    }

    pub fn by_creative_player(mut self) -> Self {
        self.flags.creative_player = true;
        self
    }

    pub fn with_hunger_damage(mut self, hunger_damage: f64) -> Self {
        self.hunger_damage = hunger_damage;
        self
    }

    pub fn kind(&self) -> DamageKind {
        self.kind
    }

    pub fn attacker(&self) -> Option<&EntityRef> {
        self.attacker.as_ref()
    }

    pub fn direct(&self) -> Option<&EntityRef> {
        self.direct.as_ref()
    }

    pub fn flags(&self) -> SourceFlags {
        self.flags
    }

    pub fn is_fire(&self) -> bool {
        self.flags.fire
    }

    pub fn is_projectile(&self) -> bool {
        self.flags.projectile
    }

    pub fn is_unblockable(&self) -> bool {
        self.flags.unblockable
    }

    pub fn is_absolute(&self) -> bool {
        self.flags.absolute
    }

    pub fn is_explosion(&self) -> bool {
        self.flags.explosion
    }

    pub fn is_magic(&self) -> bool {
        self.flags.magic
    }

    pub fn is_thorns(&self) -> bool {
        self.flags.thorns
    }

    pub fn hunger_damage(&self) -> f64 {
        self.hunger_damage
    }

    /// Whether this source hurts an entity flagged invulnerable
    pub fn bypasses_invulnerability(&self) -> bool {
        self.kind == DamageKind::OutOfWorld || self.flags.creative_player
    }
}
