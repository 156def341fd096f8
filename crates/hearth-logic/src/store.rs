//! Replicated key/value state for a networked object.
//!
//! Mirrors the per-object record a replication layer keeps in sync: a
//! flat map of typed values plus a revision counter. The owner writes,
//! everyone else reads whatever copy they were last sent.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A single stored value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum StoreValue {
    Float(f32),
    Long(i64),
    Int(i32),
}

/// Key/value record for one object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ObjectStore {
    values: BTreeMap<String, StoreValue>,
    revision: u64,
}

impl ObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bumped on every write.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Float at `key`, or `default` if absent or of another type.
    pub fn get_float(&self, key: &str, default: f32) -> f32 {
        match self.values.get(key) {
            Some(StoreValue::Float(v)) => *v,
            _ => default,
        }
    }

    pub fn get_long(&self, key: &str, default: i64) -> i64 {
        match self.values.get(key) {
            Some(StoreValue::Long(v)) => *v,
            _ => default,
        }
    }

    pub fn get_int(&self, key: &str, default: i32) -> i32 {
        match self.values.get(key) {
            Some(StoreValue::Int(v)) => *v,
            _ => default,
        }
    }

    pub fn set_float(&mut self, key: &str, value: f32) {
        self.set(key, StoreValue::Float(value));
    }

    pub fn set_long(&mut self, key: &str, value: i64) {
        self.set(key, StoreValue::Long(value));
    }

    pub fn set_int(&mut self, key: &str, value: i32) {
        self.set(key, StoreValue::Int(value));
    }

    fn set(&mut self, key: &str, value: StoreValue) {
        self.values.insert(key.to_string(), value);
        self.revision += 1;
    }
}
