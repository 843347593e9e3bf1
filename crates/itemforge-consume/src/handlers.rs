//! Built-in consume handlers, looked up by name from item definitions

use std::sync::Arc;
use std::time::Duration;

use itemforge_core::{
    AttributeKind, AttributePool, FailResult, ItemDefinition, LevelUpgradeConfiguration,
    OptionType, RecoverConfiguration, RecoverStep, UpgradeConfiguration, UpgradeGuard,
};

use crate::contract::{ConsumeEffect, ConsumeHandler};
use crate::magic::MagicEffectBehavior;
use crate::observer::ConsumeObserver;
use crate::recovery::{RecoverBehavior, RecoveryScheduler};
use crate::registry::ConfigError;
use crate::upgrade::level::LevelUpgradeEffect;
use crate::upgrade::UpgradeEffect;

/// Shared services every handler factory may draw on
#[derive(Clone)]
pub struct HandlerServices {
    pub scheduler: Arc<RecoveryScheduler>,
}

impl HandlerServices {
    pub fn new(scheduler: Arc<RecoveryScheduler>) -> Self {
        Self { scheduler }
    }

    pub fn observer(&self) -> Arc<dyn ConsumeObserver> {
        Arc::clone(self.scheduler.observer())
    }
}

type HandlerFactory = fn(&ItemDefinition, &HandlerServices) -> Result<ConsumeHandler, ConfigError>;

const BUILT_IN: &[(&str, HandlerFactory)] = &[
    ("jewel_of_bless", jewel_of_bless),
    ("jewel_of_soul", jewel_of_soul),
    ("jewel_of_life", jewel_of_life),
    ("jewel_of_harmony", jewel_of_harmony),
    ("lower_refine_stone", lower_refine_stone),
    ("higher_refine_stone", higher_refine_stone),
    ("apple", apple),
    ("small_healing_potion", small_healing_potion),
    ("healing_potion", healing_potion),
    ("large_healing_potion", large_healing_potion),
    ("small_mana_potion", small_mana_potion),
    ("mana_potion", mana_potion),
    ("large_mana_potion", large_mana_potion),
    ("small_shield_potion", small_shield_potion),
    ("medium_shield_potion", medium_shield_potion),
    ("large_shield_potion", large_shield_potion),
    ("small_complex_potion", small_complex_potion),
    ("medium_complex_potion", medium_complex_potion),
    ("large_complex_potion", large_complex_potion),
    ("alcohol", alcohol),
];

/// Names of every built-in handler
pub fn names() -> impl Iterator<Item = &'static str> {
    BUILT_IN.iter().map(|(name, _)| *name)
}

/// Build the named handler for `definition`
pub fn create(
    name: &str,
    definition: &ItemDefinition,
    services: &HandlerServices,
) -> Result<ConsumeHandler, ConfigError> {
    let (_, factory) = BUILT_IN
        .iter()
        .find(|(candidate, _)| *candidate == name)
        .ok_or_else(|| ConfigError::UnknownHandler {
            item: definition.id,
            name: name.to_string(),
        })?;
    factory(definition, services)
}

fn jewel_of_bless(_: &ItemDefinition, _: &HandlerServices) -> Result<ConsumeHandler, ConfigError> {
    let config = LevelUpgradeConfiguration {
        minimum_level: 0,
        maximum_level: 5,
        level_increase: 1,
        success_chance: 1.0,
        success_chance_boost: 0.0,
        boost_option_type: None,
        reset_threshold: None,
    };
    Ok(ConsumeHandler::single("jewel_of_bless", LevelUpgradeEffect::new(config)))
}

fn jewel_of_soul(_: &ItemDefinition, _: &HandlerServices) -> Result<ConsumeHandler, ConfigError> {
    let config = LevelUpgradeConfiguration {
        minimum_level: 6,
        maximum_level: 8,
        level_increase: 1,
        success_chance: 0.5,
        success_chance_boost: 0.25,
        boost_option_type: Some(OptionType::Luck),
        reset_threshold: Some(7),
    };
    Ok(ConsumeHandler::single("jewel_of_soul", LevelUpgradeEffect::new(config)))
}

fn jewel_of_life(_: &ItemDefinition, _: &HandlerServices) -> Result<ConsumeHandler, ConfigError> {
    let mut config = UpgradeConfiguration::increasing(
        OptionType::Option,
        0.5,
        FailResult::DecreaseOptionByOneOrRemove,
    )
    .with_boost(OptionType::Luck, 0.25);
    config.adds_option = true;
    Ok(ConsumeHandler::single("jewel_of_life", UpgradeEffect::new(config)))
}

fn jewel_of_harmony(_: &ItemDefinition, _: &HandlerServices) -> Result<ConsumeHandler, ConfigError> {
    let config = UpgradeConfiguration::adding(OptionType::Harmony, 0.8);
    Ok(ConsumeHandler::single("jewel_of_harmony", UpgradeEffect::new(config)))
}

fn damage_spread() -> UpgradeGuard {
    UpgradeGuard::PreserveDamageSpread {
        minimum: AttributeKind::MinimumPhysicalDamage,
        maximum: AttributeKind::MaximumPhysicalDamage,
    }
}

fn lower_refine_stone(_: &ItemDefinition, _: &HandlerServices) -> Result<ConsumeHandler, ConfigError> {
    let config =
        UpgradeConfiguration::increasing(OptionType::Harmony, 0.2, FailResult::DecreaseOptionByOne)
            .with_guard(damage_spread());
    Ok(ConsumeHandler::single("lower_refine_stone", UpgradeEffect::new(config)))
}

fn higher_refine_stone(_: &ItemDefinition, _: &HandlerServices) -> Result<ConsumeHandler, ConfigError> {
    let config =
        UpgradeConfiguration::increasing(OptionType::Harmony, 0.5, FailResult::SetOptionToBaseLevel)
            .with_guard(damage_spread());
    Ok(ConsumeHandler::single("higher_refine_stone", UpgradeEffect::new(config)))
}

/// Health or mana potion: three steps with a shared cooldown
fn stepped(percentage: f32) -> RecoverConfiguration {
    let mut config = RecoverConfiguration::instant(percentage)
        .with_steps(vec![
            RecoverStep::new(Duration::from_millis(200), 20.0),
            RecoverStep::new(Duration::from_millis(600), 60.0),
            RecoverStep::new(Duration::from_millis(200), 20.0),
        ])
        .with_cooldown(Duration::from_millis(500));
    config.recover_delay_reduction_by_potion_level = 0.1;
    config
}

fn recover(
    name: &str,
    pools: &[(AttributePool, RecoverConfiguration)],
    services: &HandlerServices,
) -> ConsumeHandler {
    let effects = pools
        .iter()
        .map(|(pool, config)| {
            Box::new(RecoverBehavior::for_pool(
                *pool,
                config.clone(),
                Arc::clone(&services.scheduler),
            )) as Box<dyn ConsumeEffect>
        })
        .collect();
    ConsumeHandler::new(name, effects)
}

fn apple(_: &ItemDefinition, services: &HandlerServices) -> Result<ConsumeHandler, ConfigError> {
    let mut config = RecoverConfiguration::instant(10.0);
    config.additional_recover_minus_character_level = 50.0;
    Ok(recover("apple", &[(AttributePool::Health, config)], services))
}

fn small_healing_potion(_: &ItemDefinition, services: &HandlerServices) -> Result<ConsumeHandler, ConfigError> {
    Ok(recover("small_healing_potion", &[(AttributePool::Health, stepped(20.0))], services))
}

fn healing_potion(_: &ItemDefinition, services: &HandlerServices) -> Result<ConsumeHandler, ConfigError> {
    Ok(recover("healing_potion", &[(AttributePool::Health, stepped(30.0))], services))
}

fn large_healing_potion(_: &ItemDefinition, services: &HandlerServices) -> Result<ConsumeHandler, ConfigError> {
    Ok(recover("large_healing_potion", &[(AttributePool::Health, stepped(40.0))], services))
}

fn small_mana_potion(_: &ItemDefinition, services: &HandlerServices) -> Result<ConsumeHandler, ConfigError> {
    Ok(recover("small_mana_potion", &[(AttributePool::Mana, stepped(20.0))], services))
}

fn mana_potion(_: &ItemDefinition, services: &HandlerServices) -> Result<ConsumeHandler, ConfigError> {
    Ok(recover("mana_potion", &[(AttributePool::Mana, stepped(30.0))], services))
}

fn large_mana_potion(_: &ItemDefinition, services: &HandlerServices) -> Result<ConsumeHandler, ConfigError> {
    Ok(recover("large_mana_potion", &[(AttributePool::Mana, stepped(40.0))], services))
}

fn small_shield_potion(_: &ItemDefinition, services: &HandlerServices) -> Result<ConsumeHandler, ConfigError> {
    let config = RecoverConfiguration::instant(10.0);
    Ok(recover("small_shield_potion", &[(AttributePool::Shield, config)], services))
}

fn medium_shield_potion(_: &ItemDefinition, services: &HandlerServices) -> Result<ConsumeHandler, ConfigError> {
    let config = RecoverConfiguration::instant(20.0);
    Ok(recover("medium_shield_potion", &[(AttributePool::Shield, config)], services))
}

fn large_shield_potion(_: &ItemDefinition, services: &HandlerServices) -> Result<ConsumeHandler, ConfigError> {
    let config = RecoverConfiguration::instant(30.0);
    Ok(recover("large_shield_potion", &[(AttributePool::Shield, config)], services))
}

fn complex(name: &str, health: f32, shield: f32, services: &HandlerServices) -> ConsumeHandler {
    recover(
        name,
        &[
            (AttributePool::Health, RecoverConfiguration::instant(health)),
            (AttributePool::Shield, RecoverConfiguration::instant(shield)),
        ],
        services,
    )
}

fn small_complex_potion(_: &ItemDefinition, services: &HandlerServices) -> Result<ConsumeHandler, ConfigError> {
    Ok(complex("small_complex_potion", 10.0, 5.0, services))
}

fn medium_complex_potion(_: &ItemDefinition, services: &HandlerServices) -> Result<ConsumeHandler, ConfigError> {
    Ok(complex("medium_complex_potion", 25.0, 10.0, services))
}

fn large_complex_potion(_: &ItemDefinition, services: &HandlerServices) -> Result<ConsumeHandler, ConfigError> {
    Ok(complex("large_complex_potion", 45.0, 20.0, services))
}

fn alcohol(definition: &ItemDefinition, services: &HandlerServices) -> Result<ConsumeHandler, ConfigError> {
    let effect = definition
        .consume_effect
        .as_ref()
        .ok_or_else(|| ConfigError::MissingEffectDefinition {
            item: definition.id,
            handler: "alcohol".to_string(),
        })?;
    Ok(ConsumeHandler::single(
        "alcohol",
        MagicEffectBehavior::new(Arc::clone(effect), services.observer()),
    ))
}
