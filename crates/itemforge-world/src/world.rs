//! World of players handing out character handles

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use itemforge_core::{Character, CharacterHandle, CharacterId};
use parking_lot::Mutex;
use tracing::info;

use crate::player::{Player, PlayerState};

/// Shared handle to a concrete player
pub type PlayerHandle = Arc<Mutex<Player>>;

/// All characters currently known to this world
#[derive(Default)]
pub struct World {
    players: HashMap<CharacterId, PlayerHandle>,
}

impl World {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a player and return its typed handle
    pub fn add_player(&mut self, player: Player) -> PlayerHandle {
        let id = player.id();
        info!("Player '{}' entered the world", player.name());
        let handle = Arc::new(Mutex::new(player));
        self.players.insert(id, Arc::clone(&handle));
        handle
    }

    pub fn player(&self, id: CharacterId) -> Option<&PlayerHandle> {
        self.players.get(&id)
    }

    /// Engine-facing handle for a player
    pub fn character(&self, id: CharacterId) -> Option<CharacterHandle> {
        self.players
            .get(&id)
            .map(|p| Arc::clone(p) as CharacterHandle)
    }

    /// Remove a player. It is marked disconnected so in-flight work sees it
    /// as invalid even while other handles are still alive.
    pub fn remove_player(&mut self, id: CharacterId) -> Option<PlayerHandle> {
        let handle = self.players.remove(&id)?;
        {
            let mut player = handle.lock();
            player.set_state(PlayerState::Disconnected);
            info!("Player '{}' left the world", player.name());
        }
        Some(handle)
    }

    /// Expire effects on every player, returning how many ran out
    pub fn expire_effects(&self, now: Instant) -> usize {
        self.players
            .values()
            .map(|p| p.lock().effects.expire(now).len())
            .sum()
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_and_lookup() {
        let mut world = World::new();
        let handle = world.add_player(Player::new("Elf"));
        let id = handle.lock().id();

        assert_eq!(world.len(), 1);
        let character = world.character(id).unwrap();
        assert_eq!(character.lock().name(), "Elf");
        assert!(world.character(CharacterId::new()).is_none());
    }

    #[test]
    fn test_removed_player_becomes_inactive() {
        let mut world = World::new();
        let handle = world.add_player(Player::new("Elf"));
        let id = handle.lock().id();
        let character = world.character(id).unwrap();

        world.remove_player(id).unwrap();
        assert!(world.is_empty());
        assert!(!character.lock().is_alive_and_active());
        assert!(world.remove_player(id).is_none());
    }
}
