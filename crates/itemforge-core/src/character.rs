//! Character collaborator interface
//!
//! The engine reads and mutates a character only through this trait. Every
//! mutation of one character goes through its [`CharacterHandle`], which
//! serializes concurrent consumption requests for the same character.

use std::sync::Arc;
use std::time::Instant;

use parking_lot::Mutex;

use crate::attribute::{AttributeKind, AttributeStore};
use crate::effect::EffectList;
use crate::types::CharacterId;

/// Shared, lock-serialized access to a character
pub type CharacterHandle = Arc<Mutex<dyn Character>>;

pub trait Character: Send {
    fn id(&self) -> CharacterId;

    fn name(&self) -> &str;

    /// Alive and currently present in the world
    fn is_alive_and_active(&self) -> bool;

    fn level(&self) -> u16;

    fn attributes(&self) -> &dyn AttributeStore;

    fn attributes_mut(&mut self) -> &mut dyn AttributeStore;

    fn effects(&self) -> &dyn EffectList;

    fn effects_mut(&mut self) -> &mut dyn EffectList;

    /// When recovery of the pool whose current value is `family` may start again
    fn cooldown_until(&self, family: AttributeKind) -> Option<Instant>;

    fn set_cooldown_until(&mut self, family: AttributeKind, until: Instant);
}
