//! Item catalog
//!
//! Loads option and item definitions from TOML or JSON and resolves them
//! into immutable, `Arc`-shared definitions. The catalog is built once at
//! startup and never mutated afterwards.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;
use tracing::{debug, info};

use crate::effect::MagicEffectDefinition;
use crate::error::CatalogError;
use crate::item::{
    BasePowerUp, ConsumeSpec, IncreasableItemOption, Item, ItemDefinition, MAX_ITEM_LEVEL,
};
use crate::types::{ItemIdentifier, ItemInstanceId};

#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    options: Vec<IncreasableItemOption>,
    #[serde(default)]
    items: Vec<ItemEntry>,
}

#[derive(Debug, Deserialize)]
struct ItemEntry {
    group: u8,
    number: u16,
    name: String,
    #[serde(default = "default_durability")]
    durability: u8,
    #[serde(default = "default_maximum_level")]
    maximum_level: u8,
    #[serde(default)]
    upgradable: bool,
    #[serde(default)]
    possible_options: Vec<u16>,
    #[serde(default)]
    base_power_ups: Vec<BasePowerUp>,
    #[serde(default)]
    consume: Option<ConsumeSpec>,
    #[serde(default)]
    consume_effect: Option<MagicEffectDefinition>,
}

fn default_durability() -> u8 {
    1
}

fn default_maximum_level() -> u8 {
    MAX_ITEM_LEVEL
}

/// Immutable lookup table of every known item and option definition
#[derive(Debug, Clone, Default)]
pub struct ItemCatalog {
    items: BTreeMap<ItemIdentifier, Arc<ItemDefinition>>,
    options: BTreeMap<u16, Arc<IncreasableItemOption>>,
}

impl ItemCatalog {
    /// Load a catalog file; `.json` files are parsed as JSON, everything else as TOML
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let content =
            fs::read_to_string(path).map_err(|e| CatalogError::Io(path.to_path_buf(), e))?;
        let catalog = if path.extension().is_some_and(|ext| ext == "json") {
            Self::from_json_str(&content)?
        } else {
            Self::from_toml_str(&content)?
        };
        info!(
            "Loaded {} items and {} options from {:?}",
            catalog.items.len(),
            catalog.options.len(),
            path
        );
        Ok(catalog)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = toml::from_str(content)?;
        Self::resolve(file)
    }

    pub fn from_json_str(content: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = serde_json::from_str(content)?;
        Self::resolve(file)
    }

    /// Build a catalog from already resolved definitions
    pub fn from_definitions(
        definitions: impl IntoIterator<Item = ItemDefinition>,
    ) -> Result<Self, CatalogError> {
        let mut catalog = Self::default();
        for definition in definitions {
            for option in &definition.possible_options {
                catalog.options.entry(option.number).or_insert_with(|| Arc::clone(option));
            }
            catalog.insert(definition)?;
        }
        Ok(catalog)
    }

    fn resolve(file: CatalogFile) -> Result<Self, CatalogError> {
        let mut catalog = Self::default();

        for option in file.options {
            validate_levels(&option)?;
            if catalog.options.contains_key(&option.number) {
                return Err(CatalogError::DuplicateOption(option.number));
            }
            catalog.options.insert(option.number, Arc::new(option));
        }

        for entry in file.items {
            let id = ItemIdentifier::new(entry.group, entry.number);
            let possible_options = entry
                .possible_options
                .iter()
                .map(|number| {
                    catalog
                        .options
                        .get(number)
                        .cloned()
                        .ok_or(CatalogError::UnknownOption { item: id, option: *number })
                })
                .collect::<Result<Vec<_>, _>>()?;

            catalog.insert(ItemDefinition {
                id,
                name: entry.name,
                durability: entry.durability,
                maximum_level: entry.maximum_level.min(MAX_ITEM_LEVEL),
                upgradable: entry.upgradable,
                possible_options,
                base_power_ups: entry.base_power_ups,
                consume: entry.consume,
                consume_effect: entry.consume_effect.map(Arc::new),
            })?;
        }

        Ok(catalog)
    }

    fn insert(&mut self, definition: ItemDefinition) -> Result<(), CatalogError> {
        let id = definition.id;
        if self.items.contains_key(&id) {
            return Err(CatalogError::DuplicateItem(id));
        }
        for option in &definition.possible_options {
            validate_levels(option)?;
        }
        validate_consume(id, definition.consume.as_ref())?;
        debug!("Catalog item {} '{}'", id, definition.name);
        self.items.insert(id, Arc::new(definition));
        Ok(())
    }

    pub fn get(&self, id: ItemIdentifier) -> Option<&Arc<ItemDefinition>> {
        self.items.get(&id)
    }

    pub fn option(&self, number: u16) -> Option<&Arc<IncreasableItemOption>> {
        self.options.get(&number)
    }

    /// Every item definition, ordered by identifier
    pub fn items(&self) -> impl Iterator<Item = &Arc<ItemDefinition>> {
        self.items.values()
    }

    /// Definitions that declare a way of being consumed
    pub fn consumables(&self) -> impl Iterator<Item = &Arc<ItemDefinition>> {
        self.items.values().filter(|d| d.is_consumable())
    }

    /// Create a fresh instance of a known item
    pub fn instantiate(&self, id: ItemIdentifier, instance: ItemInstanceId) -> Option<Item> {
        self.get(id).map(|def| Item::new(instance, Arc::clone(def)))
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

fn validate_levels(option: &IncreasableItemOption) -> Result<(), CatalogError> {
    if !option.has_monotonic_levels() {
        return Err(CatalogError::NonMonotonicLevels(option.number));
    }
    if !option.has_contiguous_levels() {
        return Err(CatalogError::LevelGap(option.number));
    }
    Ok(())
}

fn validate_consume(item: ItemIdentifier, spec: Option<&ConsumeSpec>) -> Result<(), CatalogError> {
    let result = match spec {
        Some(ConsumeSpec::Upgrade(config)) => config.validate(),
        Some(ConsumeSpec::LevelUpgrade(config)) => config.validate(),
        Some(ConsumeSpec::Recover { config, .. }) => config.validate(),
        Some(ConsumeSpec::Handler { .. }) | None => Ok(()),
    };
    result.map_err(|source| CatalogError::InvalidConfiguration { item, source })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attribute::AttributePool;
    use crate::config::FailResult;
    use crate::item::OptionType;

    const CATALOG: &str = r#"
[[options]]
number = 1
name = "Additional Damage"
option_type = "option"
target_attribute = "minimum_physical_damage"
levels = [
    { level = 1, value = 4.0 },
    { level = 2, value = 8.0 },
    { level = 3, required_item_level = 3, value = 12.0 },
]

[[items]]
group = 0
number = 0
name = "Kris"
durability = 20
upgradable = true
possible_options = [1]
base_power_ups = [{ attribute = "minimum_physical_damage", base_value = 6.0, bonus_per_level = 3.0 }]

[[items]]
group = 14
number = 16
name = "Jewel of Life"
[items.consume]
kind = "upgrade"
option_type = "option"
adds_option = true
increases_option = true
success_chance = 0.5
fail_result = "decrease_option_by_one_or_remove"

[[items]]
group = 14
number = 3
name = "Large Healing Potion"
durability = 3
[items.consume]
kind = "recover"
pools = ["health"]
[items.consume.config]
total_recover_percentage = 40.0
steps = [{ delay_ms = 200, recover_percentage = 100.0 }]

[[items]]
group = 14
number = 9
name = "Ale"
[items.consume_effect]
number = 9
name = "Alcohol"
sub_type = 2
duration_ms = 80000
power_ups = [{ attribute = "attack_speed", value = 20.0 }]
"#;

    #[test]
    fn test_load_toml_catalog() {
        let catalog = ItemCatalog::from_toml_str(CATALOG).unwrap();
        assert_eq!(catalog.len(), 4);
        assert_eq!(catalog.consumables().count(), 3);

        let kris = catalog.get(ItemIdentifier::new(0, 0)).unwrap();
        assert!(kris.upgradable);
        assert_eq!(kris.possible_options.len(), 1);
        assert!(Arc::ptr_eq(&kris.possible_options[0], catalog.option(1).unwrap()));

        let life = catalog.get(ItemIdentifier::new(14, 16)).unwrap();
        match life.consume.as_ref().unwrap() {
            ConsumeSpec::Upgrade(config) => {
                assert_eq!(config.option_type, OptionType::Option);
                assert_eq!(config.fail_result, FailResult::DecreaseOptionByOneOrRemove);
            }
            other => panic!("unexpected spec {other:?}"),
        }

        let potion = catalog.get(ItemIdentifier::new(14, 3)).unwrap();
        match potion.consume.as_ref().unwrap() {
            ConsumeSpec::Recover { pools, config } => {
                assert_eq!(pools, &vec![AttributePool::Health]);
                assert_eq!(config.steps.len(), 1);
            }
            other => panic!("unexpected spec {other:?}"),
        }

        let ale = catalog.get(ItemIdentifier::new(14, 9)).unwrap();
        assert_eq!(ale.consume_effect.as_ref().unwrap().sub_type, 2);
    }

    #[test]
    fn test_unknown_option_rejected() {
        let content = r#"
[[items]]
group = 0
number = 0
name = "Kris"
possible_options = [42]
"#;
        let err = ItemCatalog::from_toml_str(content).unwrap_err();
        assert!(matches!(err, CatalogError::UnknownOption { option: 42, .. }));
    }

    #[test]
    fn test_non_monotonic_levels_rejected() {
        let content = r#"
[[options]]
number = 1
name = "Broken"
option_type = "harmony"
target_attribute = "defense_base"
levels = [{ level = 2, value = 1.0 }, { level = 1, value = 2.0 }]
"#;
        let err = ItemCatalog::from_toml_str(content).unwrap_err();
        assert!(matches!(err, CatalogError::NonMonotonicLevels(1)));
    }

    #[test]
    fn test_level_gap_rejected() {
        let content = r#"
[[options]]
number = 77
name = "Gapped"
option_type = "harmony"
target_attribute = "minimum_physical_damage"
levels = [{ level = 1, value = 2.0 }, { level = 3, value = 9.0 }]
"#;
        let err = ItemCatalog::from_toml_str(content).unwrap_err();
        assert!(matches!(err, CatalogError::LevelGap(77)));
    }

    #[test]
    fn test_duplicate_item_rejected() {
        let content = r#"
[[items]]
group = 1
number = 1
name = "A"

[[items]]
group = 1
number = 1
name = "B"
"#;
        let err = ItemCatalog::from_toml_str(content).unwrap_err();
        assert!(matches!(err, CatalogError::DuplicateItem(id) if id == ItemIdentifier::new(1, 1)));
    }

    #[test]
    fn test_invalid_upgrade_configuration_rejected() {
        let content = r#"
[[items]]
group = 14
number = 16
name = "Broken Jewel"
[items.consume]
kind = "upgrade"
option_type = "option"
adds_option = true
success_chance = 2.0
"#;
        let err = ItemCatalog::from_toml_str(content).unwrap_err();
        assert!(matches!(err, CatalogError::InvalidConfiguration { .. }));
    }

    #[test]
    fn test_json_catalog() {
        let content = r#"{
            "items": [
                { "group": 14, "number": 1, "name": "Small Healing Potion",
                  "consume": { "kind": "handler", "name": "small_healing_potion" } }
            ]
        }"#;
        let catalog = ItemCatalog::from_json_str(content).unwrap();
        let potion = catalog.get(ItemIdentifier::new(14, 1)).unwrap();
        assert_eq!(
            potion.consume,
            Some(ConsumeSpec::Handler { name: "small_healing_potion".to_string() })
        );
        assert_eq!(potion.durability, 1);
    }

    #[test]
    fn test_instantiate() {
        let catalog = ItemCatalog::from_toml_str(CATALOG).unwrap();
        let item = catalog
            .instantiate(ItemIdentifier::new(14, 3), ItemInstanceId(9))
            .unwrap();
        assert_eq!(item.durability, 3);
        assert!(catalog.instantiate(ItemIdentifier::new(9, 9), ItemInstanceId(1)).is_none());
    }
}
