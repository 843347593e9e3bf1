//! Shared test data

use std::sync::{Arc, OnceLock};

use itemforge_core::{
    AggregateType, AttributeKind, BasePowerUp, ConsumeSpec, FailResult, IncreasableItemOption,
    Item, ItemCatalog, ItemDefinition, ItemIdentifier, ItemInstanceId, LevelDependentOption,
    MagicEffectDefinition, OptionType, PowerUpDefinition, UpgradeConfiguration, MAX_ITEM_LEVEL,
};
use tokio::runtime::{Handle, Runtime};

use crate::handlers::HandlerServices;
use crate::observer::TracingObserver;
use crate::recovery::RecoveryScheduler;
use crate::registry::ConsumeRegistry;

pub const JEWEL_OF_BLESS: ItemIdentifier = ItemIdentifier::new(14, 13);
pub const JEWEL_OF_SOUL: ItemIdentifier = ItemIdentifier::new(14, 14);
pub const JEWEL_OF_LIFE: ItemIdentifier = ItemIdentifier::new(14, 16);
pub const JEWEL_OF_HARMONY: ItemIdentifier = ItemIdentifier::new(14, 42);
pub const LOWER_REFINE_STONE: ItemIdentifier = ItemIdentifier::new(14, 43);
pub const LARGE_HEALING_POTION: ItemIdentifier = ItemIdentifier::new(14, 3);
pub const SMALL_SHIELD_POTION: ItemIdentifier = ItemIdentifier::new(14, 35);
pub const LARGE_COMPLEX_POTION: ItemIdentifier = ItemIdentifier::new(14, 40);
pub const ALE: ItemIdentifier = ItemIdentifier::new(14, 9);

fn levels(values: &[(u8, u8, f32)]) -> Vec<LevelDependentOption> {
    values
        .iter()
        .map(|&(level, required_item_level, value)| LevelDependentOption {
            level,
            required_item_level,
            value,
        })
        .collect()
}

/// Harmony option on minimum damage with three levels; level 3 needs item level 4
pub fn harmony() -> Arc<IncreasableItemOption> {
    Arc::new(IncreasableItemOption {
        number: 10,
        name: "Minimum Attack Power".to_string(),
        option_type: OptionType::Harmony,
        target_attribute: AttributeKind::MinimumPhysicalDamage,
        base_value: 0.0,
        levels: levels(&[(1, 0, 2.0), (2, 0, 3.0), (3, 4, 4.0)]),
    })
}

/// Same option as [`harmony`] with five unrestricted levels
pub fn harmony_deep() -> Arc<IncreasableItemOption> {
    Arc::new(IncreasableItemOption {
        levels: levels(&[(1, 0, 2.0), (2, 0, 3.0), (3, 0, 4.0), (4, 0, 5.0), (5, 0, 6.0)]),
        ..(*harmony()).clone()
    })
}

pub fn excellent() -> Arc<IncreasableItemOption> {
    Arc::new(IncreasableItemOption {
        number: 20,
        name: "Excellent Attack Speed".to_string(),
        option_type: OptionType::Excellent,
        target_attribute: AttributeKind::AttackSpeed,
        base_value: 7.0,
        levels: Vec::new(),
    })
}

pub fn luck() -> Arc<IncreasableItemOption> {
    Arc::new(IncreasableItemOption {
        number: 30,
        name: "Luck".to_string(),
        option_type: OptionType::Luck,
        target_attribute: AttributeKind::DefenseRate,
        base_value: 5.0,
        levels: Vec::new(),
    })
}

pub fn sword_definition() -> ItemDefinition {
    ItemDefinition {
        id: ItemIdentifier::new(0, 1),
        name: "Short Sword".to_string(),
        durability: 20,
        maximum_level: MAX_ITEM_LEVEL,
        upgradable: true,
        possible_options: vec![harmony(), excellent()],
        base_power_ups: vec![
            BasePowerUp {
                attribute: AttributeKind::MinimumPhysicalDamage,
                base_value: 3.0,
                bonus_per_level: 1.0,
            },
            BasePowerUp {
                attribute: AttributeKind::MaximumPhysicalDamage,
                base_value: 7.0,
                bonus_per_level: 2.0,
            },
        ],
        consume: None,
        consume_effect: None,
    }
}

/// Level 0 short sword, full durability, no options
pub fn sword() -> Item {
    Item::new(ItemInstanceId(10), Arc::new(sword_definition()))
}

pub fn potion_definition(durability: u8) -> ItemDefinition {
    ItemDefinition {
        id: ItemIdentifier::new(14, 0),
        name: "Test Potion".to_string(),
        durability,
        maximum_level: 0,
        upgradable: false,
        possible_options: Vec::new(),
        base_power_ups: Vec::new(),
        consume: Some(ConsumeSpec::Handler {
            name: "small_healing_potion".to_string(),
        }),
        consume_effect: None,
    }
}

pub fn potion_item(durability: u8) -> Item {
    Item::new(ItemInstanceId(20), Arc::new(potion_definition(durability)))
}

/// Attack speed +20 for a minute, sub type 2
pub fn ale_effect() -> Arc<MagicEffectDefinition> {
    Arc::new(MagicEffectDefinition {
        number: 1,
        name: "Ale".to_string(),
        sub_type: 2,
        send_duration: true,
        duration_ms: Some(60_000),
        power_ups: vec![PowerUpDefinition {
            attribute: AttributeKind::AttackSpeed,
            value: 20.0,
            aggregate: AggregateType::AddRaw,
        }],
    })
}

fn consumable(id: ItemIdentifier, name: &str, durability: u8, consume: Option<ConsumeSpec>) -> ItemDefinition {
    ItemDefinition {
        id,
        name: name.to_string(),
        durability,
        maximum_level: 0,
        upgradable: false,
        possible_options: Vec::new(),
        base_power_ups: Vec::new(),
        consume,
        consume_effect: None,
    }
}

fn handler(name: &str) -> Option<ConsumeSpec> {
    Some(ConsumeSpec::Handler {
        name: name.to_string(),
    })
}

pub fn catalog() -> ItemCatalog {
    let life = UpgradeConfiguration {
        adds_option: true,
        ..UpgradeConfiguration::increasing(
            OptionType::Option,
            0.5,
            FailResult::DecreaseOptionByOneOrRemove,
        )
    };
    let ale = ItemDefinition {
        consume_effect: Some(ale_effect()),
        ..consumable(ALE, "Ale", 3, None)
    };

    ItemCatalog::from_definitions([
        sword_definition(),
        consumable(JEWEL_OF_BLESS, "Jewel of Bless", 1, handler("jewel_of_bless")),
        consumable(JEWEL_OF_SOUL, "Jewel of Soul", 1, handler("jewel_of_soul")),
        consumable(JEWEL_OF_LIFE, "Jewel of Life", 1, Some(ConsumeSpec::Upgrade(life))),
        consumable(JEWEL_OF_HARMONY, "Jewel of Harmony", 1, handler("jewel_of_harmony")),
        consumable(LOWER_REFINE_STONE, "Lower Refine Stone", 1, handler("lower_refine_stone")),
        consumable(LARGE_HEALING_POTION, "Large Healing Potion", 3, handler("large_healing_potion")),
        consumable(SMALL_SHIELD_POTION, "Small Shield Potion", 3, handler("small_shield_potion")),
        consumable(LARGE_COMPLEX_POTION, "Large Complex Potion", 3, handler("large_complex_potion")),
        ale,
    ])
    .expect("fixture catalog is valid")
}

/// A runtime that is never driven; good for code that only needs a handle
fn idle_runtime() -> Handle {
    static RUNTIME: OnceLock<Runtime> = OnceLock::new();
    RUNTIME
        .get_or_init(|| {
            tokio::runtime::Builder::new_current_thread()
                .enable_time()
                .build()
                .expect("test runtime")
        })
        .handle()
        .clone()
}

pub fn services() -> HandlerServices {
    let scheduler = RecoveryScheduler::new(idle_runtime(), Arc::new(TracingObserver));
    HandlerServices::new(Arc::new(scheduler))
}

pub fn registry() -> ConsumeRegistry {
    ConsumeRegistry::new(Arc::new(catalog()), services())
}
