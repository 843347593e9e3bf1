//! Magic effects
//!
//! Effect definitions granted by consumable items, live time-boxed effect
//! instances, and the per-character list that owns them.

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::attribute::AttributeKind;
use crate::types::EffectInstanceId;

/// How a boost combines with the boosted attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregateType {
    #[default]
    AddRaw,
    Multiplicate,
}

/// One configured (attribute, boost) pair
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PowerUpDefinition {
    pub attribute: AttributeKind,
    pub value: f32,
    #[serde(default)]
    pub aggregate: AggregateType,
}

/// Static definition of a timed boost
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MagicEffectDefinition {
    pub number: u16,
    pub name: String,
    /// Exclusivity key: one active effect per sub type and character
    pub sub_type: u8,
    /// Whether observers should be told the remaining duration
    #[serde(default)]
    pub send_duration: bool,
    #[serde(default)]
    pub duration_ms: Option<u64>,
    #[serde(default)]
    pub power_ups: Vec<PowerUpDefinition>,
}

impl MagicEffectDefinition {
    pub fn duration(&self) -> Option<Duration> {
        self.duration_ms
            .filter(|ms| *ms > 0)
            .map(Duration::from_millis)
    }
}

/// A boost element of a live effect
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoostElement {
    pub attribute: AttributeKind,
    pub value: f32,
    pub aggregate: AggregateType,
}

impl From<&PowerUpDefinition> for BoostElement {
    fn from(def: &PowerUpDefinition) -> Self {
        Self {
            attribute: def.attribute,
            value: def.value,
            aggregate: def.aggregate,
        }
    }
}

/// A live, time-bounded boost on a character
#[derive(Debug, Clone)]
pub struct MagicEffect {
    pub id: EffectInstanceId,
    pub definition: Arc<MagicEffectDefinition>,
    pub duration: Duration,
    pub started_at: Instant,
    pub elements: Vec<BoostElement>,
}

impl MagicEffect {
    pub fn sub_type(&self) -> u8 {
        self.definition.sub_type
    }

    pub fn expires_at(&self) -> Instant {
        self.started_at + self.duration
    }

    pub fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at()
    }

    pub fn remaining(&self, now: Instant) -> Duration {
        self.expires_at().saturating_duration_since(now)
    }

    /// Raw additive boost this effect grants to an attribute
    pub fn additive_boost(&self, attribute: AttributeKind) -> f32 {
        self.elements
            .iter()
            .filter(|e| e.attribute == attribute && e.aggregate == AggregateType::AddRaw)
            .map(|e| e.value)
            .sum()
    }

    /// Multiplier this effect applies to an attribute (1.0 when none)
    pub fn multiplier(&self, attribute: AttributeKind) -> f32 {
        self.elements
            .iter()
            .filter(|e| e.attribute == attribute && e.aggregate == AggregateType::Multiplicate)
            .map(|e| e.value)
            .product()
    }
}

/// Per-character list of active effects. Owns expiry.
pub trait EffectList {
    /// The active effect of the given exclusivity sub type, if any
    fn find_active(&self, sub_type: u8) -> Option<&MagicEffect>;

    fn add(&mut self, effect: MagicEffect);

    /// Removes an effect before it expires
    fn remove(&mut self, id: EffectInstanceId) -> Option<MagicEffect>;

    /// Number of active effects
    fn active_count(&self) -> usize;
}
