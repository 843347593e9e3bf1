//! Active magic effects of a character
//!
//! Owns expiry: callers tick [`ActiveEffects::expire`] with the current time
//! and get back whatever ran out.

use std::time::Instant;

use itemforge_core::{AttributeKind, EffectInstanceId, EffectList, MagicEffect};
use tracing::debug;

#[derive(Debug, Clone, Default)]
pub struct ActiveEffects {
    effects: Vec<MagicEffect>,
}

impl ActiveEffects {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove and return every effect that has expired by `now`
    pub fn expire(&mut self, now: Instant) -> Vec<MagicEffect> {
        let (expired, active): (Vec<_>, Vec<_>) =
            self.effects.drain(..).partition(|e| e.is_expired(now));
        self.effects = active;
        for effect in &expired {
            debug!("Effect '{}' expired", effect.definition.name);
        }
        expired
    }

    /// Sum of raw additive boosts on an attribute
    pub fn additive_boost(&self, attribute: AttributeKind) -> f32 {
        self.effects.iter().map(|e| e.additive_boost(attribute)).sum()
    }

    /// Product of multipliers on an attribute
    pub fn multiplier(&self, attribute: AttributeKind) -> f32 {
        self.effects.iter().map(|e| e.multiplier(attribute)).product()
    }

    /// Number of active effects with the given sub type
    pub fn count_sub_type(&self, sub_type: u8) -> usize {
        self.effects.iter().filter(|e| e.sub_type() == sub_type).count()
    }

    pub fn iter(&self) -> impl Iterator<Item = &MagicEffect> {
        self.effects.iter()
    }

    /// Remove all effects
    pub fn clear(&mut self) {
        self.effects.clear();
    }
}

impl EffectList for ActiveEffects {
    fn find_active(&self, sub_type: u8) -> Option<&MagicEffect> {
        self.effects.iter().find(|e| e.sub_type() == sub_type)
    }

    fn add(&mut self, effect: MagicEffect) {
        self.effects.push(effect);
    }

    fn remove(&mut self, id: EffectInstanceId) -> Option<MagicEffect> {
        let index = self.effects.iter().position(|e| e.id == id)?;
        Some(self.effects.remove(index))
    }

    fn active_count(&self) -> usize {
        self.effects.len()
    }
}
