//! Option upgrades: jewels and refine stones that add or raise item options
//!
//! [`UpgradeBehavior::plan`] decides what an upgrade would do without touching
//! the item. [`UpgradeBehavior::modify_item`] rolls and mutates.

pub mod chance;
pub mod level;

use std::sync::Arc;

use itemforge_core::{
    select_random, FailResult, IncreasableItemOption, Item, ItemOptionLink, RandomSource,
    UpgradeConfiguration, UpgradeGuard,
};
use tracing::debug;

use crate::contract::{ConsumeEffect, EffectContext};
use crate::outcome::{EffectReport, NotApplicable, Refusal};

/// What happened to the option when a roll failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailAction {
    /// An add roll failed; the item has no new option
    NothingAdded,
    /// The fail policy left the option as it was
    Unchanged,
    SetLevel { option: u16, from: u8, to: u8 },
    Removed { option: u16, from: u8 },
}

/// Result of one option upgrade
#[derive(Debug, Clone, PartialEq)]
pub enum UpgradeOutcome {
    Added { option: u16, level: u8 },
    Increased { option: u16, from: u8, to: u8 },
    RollFailed { fail_action: FailAction },
    NotApplicable(NotApplicable),
}

impl UpgradeOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Added { .. } | Self::Increased { .. })
    }

    /// Whether the source item should be spent for this outcome
    pub fn consumes_item(&self) -> bool {
        !matches!(self, Self::NotApplicable(_))
    }
}

/// What an upgrade would do if rolled
#[derive(Debug, Clone, PartialEq)]
pub enum UpgradePlan {
    /// Add one of these options, chosen at random
    Add {
        candidates: Vec<Arc<IncreasableItemOption>>,
    },
    /// Raise the link at `index` to the next defined level
    Increase { index: usize, from: u8, to: u8 },
}

/// Adds or increases an option of one type on a target item
#[derive(Debug, Clone)]
pub struct UpgradeBehavior {
    config: UpgradeConfiguration,
}

impl UpgradeBehavior {
    pub fn new(config: UpgradeConfiguration) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &UpgradeConfiguration {
        &self.config
    }

    /// Whether the item's definition allows the configured option type at all
    pub fn item_can_have_option(&self, item: &Item) -> bool {
        item.definition.can_have_option(self.config.option_type)
    }

    /// Decide what a roll on `item` would do
    pub fn plan(&self, item: &Item) -> Result<UpgradePlan, NotApplicable> {
        if !self.item_can_have_option(item) {
            return Err(NotApplicable::OptionNotPossible);
        }

        let option_type = self.config.option_type;
        let existing = item.option_indices(option_type);
        if existing.is_empty() || option_type.allows_stacking() {
            if !self.config.adds_option {
                return Err(if existing.is_empty() {
                    NotApplicable::AddingDisabled
                } else {
                    NotApplicable::AmbiguousOption
                });
            }
            let candidates: Vec<_> = item
                .definition
                .options_of_type(option_type)
                .filter(|o| !item.has_option(o) && o.is_available_for(item.level))
                .cloned()
                .collect();
            if candidates.is_empty() {
                return Err(NotApplicable::NoEligibleOption);
            }
            return Ok(UpgradePlan::Add { candidates });
        }

        if existing.len() > 1 {
            return Err(NotApplicable::AmbiguousOption);
        }
        if !self.config.increases_option {
            return Err(NotApplicable::IncreasingDisabled);
        }

        let index = existing[0];
        let link = &item.options[index];
        let next = link
            .option
            .next_level(link.level)
            .ok_or(NotApplicable::OptionMaxed)?;
        if next.required_item_level > item.level {
            return Err(NotApplicable::ItemLevelTooLow);
        }
        if let Some(guard) = self.config.guard {
            check_guard(guard, item, link, next.value)?;
        }
        Ok(UpgradePlan::Increase {
            index,
            from: link.level,
            to: next.level,
        })
    }

    /// Roll and apply the upgrade to `item`
    pub fn modify_item(&self, item: &mut Item, rng: &mut dyn RandomSource) -> UpgradeOutcome {
        let plan = match self.plan(item) {
            Ok(plan) => plan,
            Err(reason) => return UpgradeOutcome::NotApplicable(reason),
        };

        match plan {
            UpgradePlan::Add { candidates } => {
                let Some(option) = select_random(rng, &candidates).cloned() else {
                    return UpgradeOutcome::NotApplicable(NotApplicable::NoEligibleOption);
                };
                if !self.roll(rng, item) {
                    debug!("Adding '{}' to '{}' failed", option.name, item.name());
                    return UpgradeOutcome::RollFailed {
                        fail_action: FailAction::NothingAdded,
                    };
                }
                let level = option.minimum_level();
                let number = option.number;
                debug!("Added '{}' level {} to '{}'", option.name, level, item.name());
                item.options.push(ItemOptionLink::new(option, level));
                UpgradeOutcome::Added {
                    option: number,
                    level,
                }
            }
            UpgradePlan::Increase { index, from, to } => {
                if self.roll(rng, item) {
                    let link = &mut item.options[index];
                    link.level = to;
                    debug!("Raised '{}' to level {}", link.option.name, link.level);
                    UpgradeOutcome::Increased {
                        option: link.option.number,
                        from,
                        to: link.level,
                    }
                } else {
                    let fail_action = apply_fail_result(item, index, self.config.fail_result);
                    debug!("Raising option on '{}' failed: {:?}", item.name(), fail_action);
                    UpgradeOutcome::RollFailed { fail_action }
                }
            }
        }
    }

    fn roll(&self, rng: &mut dyn RandomSource, item: &Item) -> bool {
        chance::roll(
            rng,
            item,
            self.config.success_chance,
            self.config.success_chance_boost,
            self.config.boost_option_type,
        )
    }
}

/// Refuse an increase that would break the guarded invariant
fn check_guard(
    guard: UpgradeGuard,
    item: &Item,
    link: &ItemOptionLink,
    raised_value: f32,
) -> Result<(), NotApplicable> {
    match guard {
        UpgradeGuard::PreserveDamageSpread { minimum, maximum } => {
            if link.option.target_attribute != minimum {
                return Ok(());
            }
            let raised_minimum = item.attribute_value(minimum) - link.value() + raised_value;
            if item.attribute_value(maximum) - raised_minimum < 1.0 {
                return Err(NotApplicable::SpreadTooNarrow);
            }
            Ok(())
        }
    }
}

/// Apply a fail policy to the link at `index`
fn apply_fail_result(item: &mut Item, index: usize, fail_result: FailResult) -> FailAction {
    let link = &item.options[index];
    let option = link.option.number;
    let from = link.level;
    let to = match fail_result {
        FailResult::None => return FailAction::Unchanged,
        FailResult::SetOptionToLevelOne => 1,
        FailResult::SetOptionToBaseLevel => link.option.minimum_level(),
        FailResult::DecreaseOptionByOne => from.saturating_sub(1).max(1),
        FailResult::DecreaseOptionByOneOrRemove => from.saturating_sub(1),
        FailResult::RemoveOption => 0,
    };

    if to == 0 {
        item.options.remove(index);
        return FailAction::Removed { option, from };
    }
    if to == from {
        return FailAction::Unchanged;
    }
    item.options[index].level = to;
    FailAction::SetLevel { option, from, to }
}

/// Consume effect wrapping an option upgrade of the target item
pub struct UpgradeEffect {
    behavior: UpgradeBehavior,
}

impl UpgradeEffect {
    pub fn new(config: UpgradeConfiguration) -> Self {
        Self {
            behavior: UpgradeBehavior::new(config),
        }
    }

    pub fn behavior(&self) -> &UpgradeBehavior {
        &self.behavior
    }
}

impl ConsumeEffect for UpgradeEffect {
    fn name(&self) -> &str {
        "option upgrade"
    }

    fn check(&self, ctx: &EffectContext<'_>) -> Result<(), Refusal> {
        let target = ctx.require_target()?;
        self.behavior.plan(target)?;
        Ok(())
    }

    fn apply(&self, ctx: &mut EffectContext<'_>) -> EffectReport {
        let outcome = match ctx.target.as_deref_mut() {
            Some(target) => self.behavior.modify_item(target, &mut *ctx.rng),
            None => UpgradeOutcome::NotApplicable(NotApplicable::NoEligibleOption),
        };
        EffectReport::Upgrade(outcome)
    }
}
