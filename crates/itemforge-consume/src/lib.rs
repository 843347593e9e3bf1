//! itemforge consume - deciding whether and how a consumable takes effect
//!
//! A registry maps each consumable to a handler built from catalog data. A
//! handler runs the shared consume contract and then its effects: option and
//! level upgrades, timed magic effects, and potion recoveries that may run as
//! delayed steps on a tokio runtime.

pub mod contract;
pub mod engine;
pub mod handlers;
pub mod magic;
pub mod observer;
pub mod outcome;
pub mod recovery;
pub mod registry;
pub mod upgrade;

#[cfg(test)]
pub(crate) mod fixtures;

pub use contract::{consume_source, ConsumeEffect, ConsumeHandler, ConsumeRequest, EffectContext, UsageHint};
pub use engine::ConsumeEngine;
pub use handlers::HandlerServices;
pub use magic::MagicEffectBehavior;
pub use observer::{ConsumeObserver, TracingObserver};
pub use outcome::{ConsumeOutcome, EffectReport, NotApplicable, Precondition, Refusal};
pub use recovery::{RecoverBehavior, RecoveryPlan, RecoveryScheduler, RecoveryStart};
pub use registry::{ConfigError, ConsumeRegistry, ResolveError};
pub use upgrade::level::{LevelUpgradeBehavior, LevelUpgradeEffect, LevelUpgradeOutcome};
pub use upgrade::{FailAction, UpgradeBehavior, UpgradeEffect, UpgradeOutcome, UpgradePlan};
