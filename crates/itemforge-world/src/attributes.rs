//! Plain keyed attribute storage

use std::collections::BTreeMap;

use itemforge_core::{AttributeKind, AttributePool, AttributeStore};

/// Base attribute values of a character. Unset attributes read as 0.
#[derive(Debug, Clone, Default)]
pub struct AttributeSet {
    values: BTreeMap<AttributeKind, f32>,
}

impl AttributeSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite a value
    pub fn set(&mut self, kind: AttributeKind, value: f32) {
        self.values.insert(kind, value);
    }

    /// Fill a pool to `maximum`
    pub fn set_pool(&mut self, pool: AttributePool, current: f32, maximum: f32) {
        self.set(pool.maximum(), maximum);
        self.set(pool.current(), current);
    }

    /// Current value as a 0.0-1.0 fraction of its maximum
    pub fn pool_fraction(&self, pool: AttributePool) -> f32 {
        let maximum = self.get(pool.maximum());
        if maximum <= 0.0 {
            return 0.0;
        }
        (self.get(pool.current()) / maximum).clamp(0.0, 1.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (AttributeKind, f32)> + '_ {
        self.values.iter().map(|(k, v)| (*k, *v))
    }
}

impl AttributeStore for AttributeSet {
    fn get(&self, kind: AttributeKind) -> f32 {
        self.values.get(&kind).copied().unwrap_or(0.0)
    }

    fn add(&mut self, kind: AttributeKind, delta: f32) {
        *self.values.entry(kind).or_insert(0.0) += delta;
    }
}
