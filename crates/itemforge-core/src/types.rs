//! Identifier types used throughout itemforge

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier of a character in the world
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CharacterId(pub Uuid);

impl CharacterId {
    /// Create a new random character ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a character ID from a UUID
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Default for CharacterId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CharacterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Names an item *definition* by its (group, number) pair.
///
/// Used as the dispatch key of the consume registry. Equality is structural.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ItemIdentifier {
    pub group: u8,
    pub number: u16,
}

impl ItemIdentifier {
    pub const fn new(group: u8, number: u16) -> Self {
        Self { group, number }
    }
}

impl fmt::Display for ItemIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.group, self.number)
    }
}

/// Unique identifier of an item instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemInstanceId(pub u64);

impl fmt::Display for ItemInstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Unique identifier of a live magic effect instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EffectInstanceId(pub Uuid);

impl EffectInstanceId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EffectInstanceId {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn item_identifier_equality_is_structural() {
        let a = ItemIdentifier::new(14, 13);
        let b = ItemIdentifier { group: 14, number: 13 };
        assert_eq!(a, b);

        let mut set = HashSet::new();
        set.insert(a);
        assert!(set.contains(&b));
        assert!(!set.contains(&ItemIdentifier::new(13, 14)));
    }

    #[test]
    fn item_identifier_display() {
        assert_eq!(ItemIdentifier::new(14, 3).to_string(), "14:3");
    }

    #[test]
    fn character_ids_are_unique() {
        assert_ne!(CharacterId::new(), CharacterId::new());
    }
}
