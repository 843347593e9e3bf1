//! Item data model
//!
//! Item definitions, item instances, and the options they can carry.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::attribute::{AttributeKind, AttributePool};
use crate::config::{LevelUpgradeConfiguration, RecoverConfiguration, UpgradeConfiguration};
use crate::effect::MagicEffectDefinition;
use crate::types::{ItemIdentifier, ItemInstanceId};

/// Highest level any item can reach
pub const MAX_ITEM_LEVEL: u8 = 15;

/// Option "kinds" an item can carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptionType {
    /// Generic additional option (the one a jewel of life raises)
    Option,
    Luck,
    Excellent,
    Harmony,
    Guardian,
}

impl OptionType {
    /// Whether more than one link of this type may exist on the same item.
    /// Each distinct option still appears at most once.
    pub fn allows_stacking(self) -> bool {
        matches!(self, Self::Excellent)
    }

    /// Display name
    pub fn name(self) -> &'static str {
        match self {
            Self::Option => "Option",
            Self::Luck => "Luck",
            Self::Excellent => "Excellent",
            Self::Harmony => "Harmony",
            Self::Guardian => "Guardian",
        }
    }
}

/// One level of an increasable option
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LevelDependentOption {
    pub level: u8,
    /// Item level needed before an option can be at this level
    #[serde(default)]
    pub required_item_level: u8,
    /// Boost granted at this level
    pub value: f32,
}

/// Definition of one option an item may carry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncreasableItemOption {
    pub number: u16,
    pub name: String,
    pub option_type: OptionType,
    /// Attribute this option boosts
    pub target_attribute: AttributeKind,
    /// Boost for options without level-dependent entries
    #[serde(default)]
    pub base_value: f32,
    /// Ordered by strictly increasing `level`
    #[serde(default)]
    pub levels: Vec<LevelDependentOption>,
}

impl IncreasableItemOption {
    /// Whether the option has level-dependent sub-definitions
    pub fn is_level_dependent(&self) -> bool {
        !self.levels.is_empty()
    }

    /// Level a freshly added link starts at
    pub fn minimum_level(&self) -> u8 {
        self.levels.iter().map(|l| l.level).min().unwrap_or(1)
    }

    /// Highest level defined for this option
    pub fn maximum_level(&self) -> u8 {
        self.levels.iter().map(|l| l.level).max().unwrap_or(1)
    }

    /// The level-dependent entry for exactly `level`
    pub fn level_entry(&self, level: u8) -> Option<&LevelDependentOption> {
        self.levels.iter().find(|l| l.level == level)
    }

    /// The first entry above `current`, if any
    pub fn next_level(&self, current: u8) -> Option<&LevelDependentOption> {
        self.levels.iter().find(|l| l.level > current)
    }

    /// Whether an item at `item_level` may receive this option
    pub fn is_available_for(&self, item_level: u8) -> bool {
        match self.levels.iter().min_by_key(|l| l.level) {
            Some(lowest) => lowest.required_item_level <= item_level,
            None => true,
        }
    }

    /// Boost granted by a link at `level`
    pub fn value_at(&self, level: u8) -> f32 {
        if self.levels.is_empty() {
            return self.base_value;
        }
        self.level_entry(level).map(|l| l.value).unwrap_or(0.0)
    }

    /// Whether `levels` is strictly increasing and starts above zero
    pub fn has_monotonic_levels(&self) -> bool {
        self.levels.first().map_or(true, |first| first.level > 0)
            && self.levels.windows(2).all(|w| w[0].level < w[1].level)
    }

    /// Whether every level between the lowest and highest entry is defined
    pub fn has_contiguous_levels(&self) -> bool {
        self.levels
            .windows(2)
            .all(|w| w[1].level.checked_sub(w[0].level) == Some(1))
    }
}

/// Base attribute an item grants, scaling with item level
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BasePowerUp {
    pub attribute: AttributeKind,
    pub base_value: f32,
    #[serde(default)]
    pub bonus_per_level: f32,
}

impl BasePowerUp {
    pub fn value_at(&self, level: u8) -> f32 {
        self.base_value + self.bonus_per_level * level as f32
    }
}

/// How an item is consumed, as declared by its definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConsumeSpec {
    /// A named built-in handler
    Handler { name: String },
    /// Restores one or more attribute pools
    Recover {
        pools: Vec<AttributePool>,
        config: RecoverConfiguration,
    },
    /// Adds or raises an option on the target item
    Upgrade(UpgradeConfiguration),
    /// Raises the target item's level
    LevelUpgrade(LevelUpgradeConfiguration),
}

/// Static template shared by all instances of an item
#[derive(Debug, Clone, PartialEq)]
pub struct ItemDefinition {
    pub id: ItemIdentifier,
    pub name: String,
    /// Durability at level 0
    pub durability: u8,
    pub maximum_level: u8,
    /// Wearable equipment that upgrade jewels may target
    pub upgradable: bool,
    pub possible_options: Vec<Arc<IncreasableItemOption>>,
    pub base_power_ups: Vec<BasePowerUp>,
    pub consume: Option<ConsumeSpec>,
    pub consume_effect: Option<Arc<MagicEffectDefinition>>,
}

impl ItemDefinition {
    /// Durability of a fresh item at `level`.
    ///
    /// One point per level up to 9, two per level above.
    pub fn maximum_durability(&self, level: u8) -> u8 {
        let level = u32::from(level);
        let bonus = if level <= 9 { level } else { 9 + (level - 9) * 2 };
        (u32::from(self.durability) + bonus).min(u32::from(u8::MAX)) as u8
    }

    /// Whether any possible option has the given type
    pub fn can_have_option(&self, option_type: OptionType) -> bool {
        self.possible_options
            .iter()
            .any(|o| o.option_type == option_type)
    }

    /// Possible options of the given type
    pub fn options_of_type(
        &self,
        option_type: OptionType,
    ) -> impl Iterator<Item = &Arc<IncreasableItemOption>> {
        self.possible_options
            .iter()
            .filter(move |o| o.option_type == option_type)
    }

    /// Whether this definition declares any way of being consumed
    pub fn is_consumable(&self) -> bool {
        self.consume.is_some() || self.consume_effect.is_some()
    }
}

/// Instance-level join between an item and an option it carries
#[derive(Debug, Clone, PartialEq)]
pub struct ItemOptionLink {
    pub option: Arc<IncreasableItemOption>,
    pub level: u8,
}

impl ItemOptionLink {
    pub fn new(option: Arc<IncreasableItemOption>, level: u8) -> Self {
        Self { option, level }
    }

    pub fn option_type(&self) -> OptionType {
        self.option.option_type
    }

    /// Boost this link currently grants
    pub fn value(&self) -> f32 {
        self.option.value_at(self.level)
    }
}

/// A mutable item instance
#[derive(Debug, Clone)]
pub struct Item {
    pub id: ItemInstanceId,
    pub definition: Arc<ItemDefinition>,
    pub level: u8,
    /// 0 means destroyed
    pub durability: u8,
    pub options: Vec<ItemOptionLink>,
}

impl Item {
    /// Create a level 0 item with full durability and no options
    pub fn new(id: ItemInstanceId, definition: Arc<ItemDefinition>) -> Self {
        let durability = definition.maximum_durability(0);
        Self {
            id,
            definition,
            level: 0,
            durability,
            options: Vec::new(),
        }
    }

    /// Builder-style level setter that also refreshes durability
    pub fn with_level(mut self, level: u8) -> Self {
        self.level = level;
        self.durability = self.definition.maximum_durability(level);
        self
    }

    /// Builder-style option link
    pub fn with_option(mut self, option: Arc<IncreasableItemOption>, level: u8) -> Self {
        self.options.push(ItemOptionLink::new(option, level));
        self
    }

    pub fn name(&self) -> &str {
        &self.definition.name
    }

    /// Whether durability has run out
    pub fn is_depleted(&self) -> bool {
        self.durability == 0
    }

    /// Durability of this item at its current level when fully repaired
    pub fn maximum_durability(&self) -> u8 {
        self.definition.maximum_durability(self.level)
    }

    /// Whether the item carries at least one link of the given type
    pub fn has_option_type(&self, option_type: OptionType) -> bool {
        self.options.iter().any(|l| l.option_type() == option_type)
    }

    /// Indices of links of the given type
    pub fn option_indices(&self, option_type: OptionType) -> Vec<usize> {
        self.options
            .iter()
            .enumerate()
            .filter(|(_, l)| l.option_type() == option_type)
            .map(|(i, _)| i)
            .collect()
    }

    /// Whether a link to this exact option exists
    pub fn has_option(&self, option: &IncreasableItemOption) -> bool {
        self.options.iter().any(|l| l.option.number == option.number)
    }

    /// Total value of an attribute granted by the item: base power-ups at the
    /// current level plus every option link targeting it.
    pub fn attribute_value(&self, attribute: AttributeKind) -> f32 {
        let base: f32 = self
            .definition
            .base_power_ups
            .iter()
            .filter(|p| p.attribute == attribute)
            .map(|p| p.value_at(self.level))
            .sum();
        let options: f32 = self
            .options
            .iter()
            .filter(|l| l.option.target_attribute == attribute)
            .map(ItemOptionLink::value)
            .sum();
        base + options
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn harmony_option() -> IncreasableItemOption {
        IncreasableItemOption {
            number: 10,
            name: "Minimum Attack Power".to_string(),
            option_type: OptionType::Harmony,
            target_attribute: AttributeKind::MinimumPhysicalDamage,
            base_value: 0.0,
            levels: vec![
                LevelDependentOption { level: 1, required_item_level: 0, value: 2.0 },
                LevelDependentOption { level: 2, required_item_level: 0, value: 3.0 },
                LevelDependentOption { level: 3, required_item_level: 4, value: 4.0 },
            ],
        }
    }

    pub(crate) fn sword_definition() -> ItemDefinition {
        ItemDefinition {
            id: ItemIdentifier::new(0, 1),
            name: "Short Sword".to_string(),
            durability: 20,
            maximum_level: MAX_ITEM_LEVEL,
            upgradable: true,
            possible_options: vec![Arc::new(harmony_option())],
            base_power_ups: vec![
                BasePowerUp {
                    attribute: AttributeKind::MinimumPhysicalDamage,
                    base_value: 3.0,
                    bonus_per_level: 1.0,
                },
                BasePowerUp {
                    attribute: AttributeKind::MaximumPhysicalDamage,
                    base_value: 7.0,
                    bonus_per_level: 1.0,
                },
            ],
            consume: None,
            consume_effect: None,
        }
    }

    #[test]
    fn test_maximum_durability_scales_with_level() {
        let def = sword_definition();
        assert_eq!(def.maximum_durability(0), 20);
        assert_eq!(def.maximum_durability(5), 25);
        assert_eq!(def.maximum_durability(9), 29);
        assert_eq!(def.maximum_durability(11), 33);
    }

    #[test]
    fn test_maximum_durability_saturates() {
        let mut def = sword_definition();
        def.durability = 250;
        assert_eq!(def.maximum_durability(15), u8::MAX);
    }

    #[test]
    fn test_new_item_has_full_durability() {
        let item = Item::new(ItemInstanceId(1), Arc::new(sword_definition()));
        assert_eq!(item.level, 0);
        assert_eq!(item.durability, 20);
        assert!(item.options.is_empty());
        assert!(!item.is_depleted());
    }

    #[test]
    fn test_option_levels() {
        let option = harmony_option();
        assert!(option.has_monotonic_levels());
        assert_eq!(option.minimum_level(), 1);
        assert_eq!(option.maximum_level(), 3);
        assert_eq!(option.next_level(1).map(|l| l.level), Some(2));
        assert!(option.next_level(3).is_none());
        assert_eq!(option.value_at(2), 3.0);
    }

    #[test]
    fn test_non_monotonic_levels_detected() {
        let mut option = harmony_option();
        option.levels.swap(0, 1);
        assert!(!option.has_monotonic_levels());

        let mut zero = harmony_option();
        zero.levels[0].level = 0;
        assert!(!zero.has_monotonic_levels());
    }

    #[test]
    fn test_level_gap_detected() {
        let option = harmony_option();
        assert!(option.has_contiguous_levels());

        let mut gapped = harmony_option();
        gapped.levels.remove(1);
        assert!(gapped.has_monotonic_levels());
        assert!(!gapped.has_contiguous_levels());
    }

    #[test]
    fn test_option_without_levels_is_always_available() {
        let option = IncreasableItemOption {
            number: 1,
            name: "Luck".to_string(),
            option_type: OptionType::Luck,
            target_attribute: AttributeKind::AttackRate,
            base_value: 5.0,
            levels: vec![],
        };
        assert!(option.is_available_for(0));
        assert_eq!(option.minimum_level(), 1);
        assert_eq!(option.value_at(1), 5.0);
    }

    #[test]
    fn test_attribute_value_includes_options() {
        let def = Arc::new(sword_definition());
        let option = Arc::clone(&def.possible_options[0]);
        let item = Item::new(ItemInstanceId(1), def)
            .with_level(2)
            .with_option(option, 2);
        // base 3 + 2 levels + harmony level 2 (3.0)
        assert_eq!(item.attribute_value(AttributeKind::MinimumPhysicalDamage), 8.0);
        assert_eq!(item.attribute_value(AttributeKind::MaximumPhysicalDamage), 9.0);
        assert!(item.has_option_type(OptionType::Harmony));
        assert_eq!(item.option_indices(OptionType::Harmony), vec![0]);
    }
}
