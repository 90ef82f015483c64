//! Equipment collaborator
//!
//! The resolver only needs to see what is worn in each slot and to wear
//! items down. Hosts plug their own inventory in through [`Equipment`];
//! [`Loadout`] is the in-memory implementation used by the simulator.

use std::collections::HashMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Equipment slots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EquipmentSlot {
    MainHand,
    OffHand,
    Head,
    Chest,
    Legs,
    Feet,
}

/// Slots that hold armor, in evaluation order
pub const ARMOR_SLOTS: [EquipmentSlot; 4] = [
    EquipmentSlot::Head,
    EquipmentSlot::Chest,
    EquipmentSlot::Legs,
    EquipmentSlot::Feet,
];

impl EquipmentSlot {
    pub fn is_armor(&self) -> bool {
        ARMOR_SLOTS.contains(self)
    }
}

/// Protection enchantments
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnchantmentKind {
    Protection,
    FireProtection,
    FeatherFalling,
    BlastProtection,
    ProjectileProtection,
}

impl FromStr for EnchantmentKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "protection" => Ok(EnchantmentKind::Protection),
            "fire_protection" => Ok(EnchantmentKind::FireProtection),
            "feather_falling" => Ok(EnchantmentKind::FeatherFalling),
            "blast_protection" => Ok(EnchantmentKind::BlastProtection),
            "projectile_protection" => Ok(EnchantmentKind::ProjectileProtection),
            _ => Err(()),
        }
    }
}

/// An enchantment on an item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Enchantment {
    pub kind: EnchantmentKind,
    pub level: u8,
}

impl Enchantment {
    pub fn new(kind: EnchantmentKind, level: u8) -> Self {
        Self { kind, level }
    }
}

/// A worn or held item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ItemHandle {
    /// Slot the item sits in
    pub slot: EquipmentSlot,
    /// Item name (e.g. "iron_chestplate")
    pub name: String,
    /// Armor points
    pub armor: f64,
    /// Armor toughness
    pub toughness: f64,
    pub enchantments: Vec<Enchantment>,
    /// Accumulated durability damage
    pub damage: i32,
    /// Durability damage at which the item breaks (0 = unbreakable)
    pub max_damage: i32,
    /// Can be raised to block hits
    pub shield: bool,
}

impl Default for ItemHandle {
    fn default() -> Self {
        Self {
            slot: EquipmentSlot::MainHand,
            name: String::new(),
            armor: 0.0,
            toughness: 0.0,
            enchantments: Vec::new(),
            damage: 0,
            max_damage: 0,
            shield: false,
        }
    }
}

impl ItemHandle {
    /// Create a plain item in a slot
    pub fn new(slot: EquipmentSlot, name: &str) -> Self {
        Self {
            slot,
            name: name.to_string(),
            ..Self::default()
        }
    }

    /// Create an armor piece
    pub fn armor(slot: EquipmentSlot, name: &str, armor: f64, toughness: f64) -> Self {
        Self {
            armor,
            toughness,
            ..Self::new(slot, name)
        }
    }

    /// Create a shield
    pub fn shield(slot: EquipmentSlot) -> Self {
        Self {
            shield: true,
            ..Self::new(slot, "shield")
        }
    }

    /// Set the durability budget
    pub fn with_max_damage(mut self, max_damage: i32) -> Self {
        self.max_damage = max_damage;
        self
    }

    /// Add an enchantment
    pub fn with_enchantment(mut self, kind: EnchantmentKind, level: u8) -> Self {
        self.enchantments.push(Enchantment::new(kind, level));
        self
    }

    /// Whether accumulated damage has used up the durability budget
    pub fn is_broken(&self) -> bool {
        self.max_damage > 0 && self.damage >= self.max_damage
    }
}

/// Equipment collaborator consumed by the damage pipeline
pub trait Equipment {
    /// The item in a slot, if any
    fn equipped(&self, slot: EquipmentSlot) -> Option<&ItemHandle>;

    /// Wear an item down
    fn damage_item(&mut self, slot: EquipmentSlot, amount: i32);

    /// Hand holding a shield, off hand first
    fn shield_slot(&self) -> Option<EquipmentSlot> {
        [EquipmentSlot::OffHand, EquipmentSlot::MainHand]
            .into_iter()
            .find(|slot| self.equipped(*slot).is_some_and(|item| item.shield))
    }
}

/// In-memory equipment
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Loadout {
    items: HashMap<EquipmentSlot, ItemHandle>,
}

impl Loadout {
    pub fn new() -> Self {
        Self::default()
    }

    /// Put an item in its slot, returning whatever was there
    pub fn equip(&mut self, item: ItemHandle) -> Option<ItemHandle> {
        self.items.insert(item.slot, item)
    }

    /// Builder-style equip
    pub fn with(mut self, item: ItemHandle) -> Self {
        self.equip(item);
        self
    }

    pub fn unequip(&mut self, slot: EquipmentSlot) -> Option<ItemHandle> {
        self.items.remove(&slot)
    }
}

impl Equipment for Loadout {
    fn equipped(&self, slot: EquipmentSlot) -> Option<&ItemHandle> {
        self.items.get(&slot)
    }

    fn damage_item(&mut self, slot: EquipmentSlot, amount: i32) {
        let broken = match self.items.get_mut(&slot) {
            Some(item) => {
                item.damage = item.damage.saturating_add(amount.max(0));
                item.is_broken()
            }
            None => return,
        };
        if broken {
            self.items.remove(&slot);
        }
    }
}
