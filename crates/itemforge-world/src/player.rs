//! In-memory player character

use std::collections::HashMap;
use std::time::Instant;

use itemforge_core::{
    AttributeKind, AttributePool, AttributeStore, Character, CharacterId, EffectList,
};
use serde::Serialize;

use crate::attributes::AttributeSet;
use crate::effects::ActiveEffects;

/// Where a player is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum PlayerState {
    /// Logged in but not yet placed in the world
    Loading,
    EnteredWorld,
    Dead,
    Disconnected,
}

#[derive(Debug, Clone)]
pub struct Player {
    id: CharacterId,
    name: String,
    level: u16,
    state: PlayerState,
    pub attributes: AttributeSet,
    pub effects: ActiveEffects,
    cooldowns: HashMap<AttributeKind, Instant>,
}

impl Player {
    /// A level 1 player in the world with 100 health/mana and 50 shield, all full
    pub fn new(name: impl Into<String>) -> Self {
        let mut attributes = AttributeSet::new();
        attributes.set_pool(AttributePool::Health, 100.0, 100.0);
        attributes.set_pool(AttributePool::Mana, 100.0, 100.0);
        attributes.set_pool(AttributePool::Shield, 50.0, 50.0);
        attributes.set_pool(AttributePool::Ability, 30.0, 30.0);
        Self {
            id: CharacterId::new(),
            name: name.into(),
            level: 1,
            state: PlayerState::EnteredWorld,
            attributes,
            effects: ActiveEffects::new(),
            cooldowns: HashMap::new(),
        }
    }

    pub fn with_level(mut self, level: u16) -> Self {
        self.level = level;
        self
    }

    pub fn with_pool(mut self, pool: AttributePool, current: f32, maximum: f32) -> Self {
        self.attributes.set_pool(pool, current, maximum);
        self
    }

    pub fn with_state(mut self, state: PlayerState) -> Self {
        self.state = state;
        self
    }

    pub fn state(&self) -> PlayerState {
        self.state
    }

    pub fn set_state(&mut self, state: PlayerState) {
        self.state = state;
    }

    /// Drop health to zero and mark dead
    pub fn die(&mut self) {
        let health = self.attributes.get(AttributeKind::CurrentHealth);
        self.attributes.subtract(AttributeKind::CurrentHealth, health);
        self.state = PlayerState::Dead;
    }

    /// Attribute value with active effect boosts applied
    pub fn effective_attribute(&self, kind: AttributeKind) -> f32 {
        (self.attributes.get(kind) + self.effects.additive_boost(kind))
            * self.effects.multiplier(kind)
    }

    pub fn snapshot(&self) -> PlayerSnapshot {
        let pool = |pool: AttributePool| PoolSnapshot {
            current: self.attributes.get(pool.current()),
            maximum: self.attributes.get(pool.maximum()),
        };
        PlayerSnapshot {
            name: self.name.clone(),
            level: self.level,
            state: self.state,
            health: pool(AttributePool::Health),
            mana: pool(AttributePool::Mana),
            shield: pool(AttributePool::Shield),
            effects: self
                .effects
                .iter()
                .map(|e| e.definition.name.clone())
                .collect(),
        }
    }
}

impl Character for Player {
    fn id(&self) -> CharacterId {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn is_alive_and_active(&self) -> bool {
        self.state == PlayerState::EnteredWorld
            && self.attributes.get(AttributeKind::CurrentHealth) > 0.0
    }

    fn level(&self) -> u16 {
        self.level
    }

    fn attributes(&self) -> &dyn AttributeStore {
        &self.attributes
    }

    fn attributes_mut(&mut self) -> &mut dyn AttributeStore {
        &mut self.attributes
    }

    fn effects(&self) -> &dyn EffectList {
        &self.effects
    }

    fn effects_mut(&mut self) -> &mut dyn EffectList {
        &mut self.effects
    }

    fn cooldown_until(&self, family: AttributeKind) -> Option<Instant> {
        self.cooldowns.get(&family).copied()
    }

    fn set_cooldown_until(&mut self, family: AttributeKind, until: Instant) {
        self.cooldowns.insert(family, until);
    }
}

/// Serializable view of a pool
#[derive(Debug, Clone, Copy, Serialize)]
pub struct PoolSnapshot {
    pub current: f32,
    pub maximum: f32,
}

/// Serializable view of a player for logs and reports
#[derive(Debug, Clone, Serialize)]
pub struct PlayerSnapshot {
    pub name: String,
    pub level: u16,
    pub state: PlayerState,
    pub health: PoolSnapshot,
    pub mana: PoolSnapshot,
    pub shield: PoolSnapshot,
    pub effects: Vec<String>,
}
