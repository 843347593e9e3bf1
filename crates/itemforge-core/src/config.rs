//! Configuration value objects for consume behaviors
//!
//! Immutable after catalog load; behaviors hold them by value.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::attribute::AttributeKind;
use crate::item::OptionType;

/// Problems found while validating a configuration value object
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InvalidConfiguration {
    #[error("chance {0} is outside 0.0..=1.0")]
    ChanceOutOfRange(f64),

    #[error("upgrade neither adds nor increases an option")]
    UpgradeDoesNothing,

    #[error("level window {minimum}..={maximum} is empty")]
    EmptyLevelWindow { minimum: u8, maximum: u8 },

    #[error("level increase must be at least 1")]
    ZeroLevelIncrease,

    #[error("negative value for {0}")]
    Negative(&'static str),

    #[error("delay reduction per level {0} is outside 0.0..=1.0")]
    DelayReductionOutOfRange(f32),
}

/// State transition applied to an option link when an upgrade roll fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailResult {
    #[default]
    None,
    SetOptionToLevelOne,
    SetOptionToBaseLevel,
    DecreaseOptionByOne,
    DecreaseOptionByOneOrRemove,
    RemoveOption,
}

/// Domain guard evaluated before an option increase is rolled
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum UpgradeGuard {
    /// Raising an option on `minimum` must keep `maximum - minimum >= 1`
    PreserveDamageSpread {
        minimum: AttributeKind,
        maximum: AttributeKind,
    },
}

/// Parameters of an option add/increase
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpgradeConfiguration {
    pub option_type: OptionType,
    #[serde(default)]
    pub adds_option: bool,
    #[serde(default)]
    pub increases_option: bool,
    /// 0.0 - 1.0
    pub success_chance: f64,
    /// Added to `success_chance` when the item carries `boost_option_type`
    #[serde(default)]
    pub success_chance_boost: f64,
    #[serde(default)]
    pub boost_option_type: Option<OptionType>,
    #[serde(default)]
    pub fail_result: FailResult,
    #[serde(default)]
    pub guard: Option<UpgradeGuard>,
}

impl UpgradeConfiguration {
    /// A configuration that only adds options of the given type
    pub fn adding(option_type: OptionType, success_chance: f64) -> Self {
        Self {
            option_type,
            adds_option: true,
            increases_option: false,
            success_chance,
            success_chance_boost: 0.0,
            boost_option_type: None,
            fail_result: FailResult::None,
            guard: None,
        }
    }

    /// A configuration that only increases existing options of the given type
    pub fn increasing(option_type: OptionType, success_chance: f64, fail_result: FailResult) -> Self {
        Self {
            option_type,
            adds_option: false,
            increases_option: true,
            success_chance,
            success_chance_boost: 0.0,
            boost_option_type: None,
            fail_result,
            guard: None,
        }
    }

    /// Adds a luck-style bonus when the item carries `boost_option_type`
    pub fn with_boost(mut self, boost_option_type: OptionType, success_chance_boost: f64) -> Self {
        self.boost_option_type = Some(boost_option_type);
        self.success_chance_boost = success_chance_boost;
        self
    }

    pub fn with_guard(mut self, guard: UpgradeGuard) -> Self {
        self.guard = Some(guard);
        self
    }

    pub fn validate(&self) -> Result<(), InvalidConfiguration> {
        check_chance(self.success_chance)?;
        check_chance(self.success_chance_boost)?;
        if !self.adds_option && !self.increases_option {
            return Err(InvalidConfiguration::UpgradeDoesNothing);
        }
        Ok(())
    }
}

/// Parameters of a jewel raising an item's own level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelUpgradeConfiguration {
    /// Lowest target level accepted
    #[serde(default)]
    pub minimum_level: u8,
    /// Highest target level accepted
    pub maximum_level: u8,
    #[serde(default = "default_level_increase")]
    pub level_increase: u8,
    pub success_chance: f64,
    #[serde(default)]
    pub success_chance_boost: f64,
    #[serde(default)]
    pub boost_option_type: Option<OptionType>,
    /// Failing at or above this level resets to 0 instead of decrementing
    #[serde(default)]
    pub reset_threshold: Option<u8>,
}

fn default_level_increase() -> u8 {
    1
}

impl LevelUpgradeConfiguration {
    pub fn validate(&self) -> Result<(), InvalidConfiguration> {
        check_chance(self.success_chance)?;
        check_chance(self.success_chance_boost)?;
        if self.minimum_level > self.maximum_level {
            return Err(InvalidConfiguration::EmptyLevelWindow {
                minimum: self.minimum_level,
                maximum: self.maximum_level,
            });
        }
        if self.level_increase == 0 {
            return Err(InvalidConfiguration::ZeroLevelIncrease);
        }
        Ok(())
    }

    /// Whether a target at `level` is inside the accepted window
    pub fn accepts_level(&self, level: u8) -> bool {
        (self.minimum_level..=self.maximum_level).contains(&level)
    }
}

/// One delayed partial step of a recovery
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RecoverStep {
    pub delay_ms: u64,
    /// Percentage of the total amount applied by this step
    pub recover_percentage: f32,
}

impl RecoverStep {
    pub fn new(delay: Duration, recover_percentage: f32) -> Self {
        Self {
            delay_ms: delay.as_millis() as u64,
            recover_percentage,
        }
    }

    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

/// Parameters of a potion-style recovery
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecoverConfiguration {
    /// Percentage of the maximum attribute restored
    pub total_recover_percentage: f32,
    #[serde(default)]
    pub recover_percentage_increase_by_potion_level: f32,
    /// Flat bonus `max(0, value - character level)`
    #[serde(default)]
    pub additional_recover_minus_character_level: f32,
    #[serde(default)]
    pub cooldown_ms: u64,
    #[serde(default)]
    pub steps: Vec<RecoverStep>,
    /// 0.0 - 1.0 per potion level; 1.0 or more total means instant
    #[serde(default)]
    pub recover_delay_reduction_by_potion_level: f32,
}

impl RecoverConfiguration {
    /// Instant recovery of a percentage of the maximum
    pub fn instant(total_recover_percentage: f32) -> Self {
        Self {
            total_recover_percentage,
            recover_percentage_increase_by_potion_level: 0.0,
            additional_recover_minus_character_level: 0.0,
            cooldown_ms: 0,
            steps: Vec::new(),
            recover_delay_reduction_by_potion_level: 0.0,
        }
    }

    pub fn with_steps(mut self, steps: Vec<RecoverStep>) -> Self {
        self.steps = steps;
        self
    }

    pub fn with_cooldown(mut self, cooldown: Duration) -> Self {
        self.cooldown_ms = cooldown.as_millis() as u64;
        self
    }

    pub fn cooldown(&self) -> Duration {
        Duration::from_millis(self.cooldown_ms)
    }

    pub fn validate(&self) -> Result<(), InvalidConfiguration> {
        if self.total_recover_percentage < 0.0 {
            return Err(InvalidConfiguration::Negative("total_recover_percentage"));
        }
        if self.recover_percentage_increase_by_potion_level < 0.0 {
            return Err(InvalidConfiguration::Negative(
                "recover_percentage_increase_by_potion_level",
            ));
        }
        if self.steps.iter().any(|s| s.recover_percentage < 0.0) {
            return Err(InvalidConfiguration::Negative("recover_percentage"));
        }
        if !(0.0..=1.0).contains(&self.recover_delay_reduction_by_potion_level) {
            return Err(InvalidConfiguration::DelayReductionOutOfRange(
                self.recover_delay_reduction_by_potion_level,
            ));
        }
        Ok(())
    }
}

fn check_chance(chance: f64) -> Result<(), InvalidConfiguration> {
    if (0.0..=1.0).contains(&chance) {
        Ok(())
    } else {
        Err(InvalidConfiguration::ChanceOutOfRange(chance))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upgrade_needs_a_direction() {
        let mut config = UpgradeConfiguration::adding(OptionType::Harmony, 0.5);
        assert!(config.validate().is_ok());

        config.adds_option = false;
        assert_eq!(config.validate(), Err(InvalidConfiguration::UpgradeDoesNothing));
    }

    #[test]
    fn upgrade_chance_range_checked() {
        let config = UpgradeConfiguration::adding(OptionType::Option, 1.5);
        assert_eq!(config.validate(), Err(InvalidConfiguration::ChanceOutOfRange(1.5)));
    }

    #[test]
    fn level_window_checked() {
        let config = LevelUpgradeConfiguration {
            minimum_level: 6,
            maximum_level: 5,
            level_increase: 1,
            success_chance: 1.0,
            success_chance_boost: 0.0,
            boost_option_type: None,
            reset_threshold: None,
        };
        assert!(matches!(
            config.validate(),
            Err(InvalidConfiguration::EmptyLevelWindow { .. })
        ));
        assert!(!config.accepts_level(5));
    }

    #[test]
    fn recover_step_delay_round_trips_millis() {
        let step = RecoverStep::new(Duration::from_millis(600), 60.0);
        assert_eq!(step.delay_ms, 600);
        assert_eq!(step.delay(), Duration::from_millis(600));
    }

    #[test]
    fn recover_delay_reduction_range_checked() {
        let mut config = RecoverConfiguration::instant(40.0);
        config.recover_delay_reduction_by_potion_level = 1.5;
        assert!(matches!(
            config.validate(),
            Err(InvalidConfiguration::DelayReductionOutOfRange(_))
        ));
    }

    #[test]
    fn recover_defaults_from_toml() {
        let config: RecoverConfiguration = toml::from_str("total_recover_percentage = 20.0").unwrap();
        assert_eq!(config, RecoverConfiguration::instant(20.0));
    }
}
