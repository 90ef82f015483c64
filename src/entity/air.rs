//! Air supply persistence
//!
//! The maximum air supply is the only auxiliary attribute persisted
//! alongside the vital state.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Persistence key for the maximum air supply
pub const MAX_AIR_KEY: &str = "maxAir";

/// Default maximum air supply in ticks
pub const DEFAULT_MAX_AIR: i32 = 300;

/// Integer attribute storage collaborator
pub trait AttributeStore {
    fn read_int(&self, key: &str) -> Option<i32>;
    fn write_int(&mut self, key: &str, value: i32);
}

impl AttributeStore for HashMap<String, i32> {
    fn read_int(&self, key: &str) -> Option<i32> {
        self.get(key).copied()
    }

    fn write_int(&mut self, key: &str, value: i32) {
        self.insert(key.to_string(), value);
    }
}

/// Maximum air supply of a living entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AirSupply {
    pub max_air: i32,
}

impl Default for AirSupply {
    fn default() -> Self {
        Self {
            max_air: DEFAULT_MAX_AIR,
        }
    }
}

impl AirSupply {
    pub fn new(max_air: i32) -> Self {
        Self { max_air }
    }

    /// Load from storage, keeping the current value when the key is absent
    pub fn read_from(&mut self, store: &impl AttributeStore) {
        if let Some(max_air) = store.read_int(MAX_AIR_KEY) {
            self.max_air = max_air;
        }
    }

    pub fn write_to(&self, store: &mut impl AttributeStore) {
        store.write_int(MAX_AIR_KEY, self.max_air);
    }
}
