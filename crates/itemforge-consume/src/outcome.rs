//! Results of consumption requests
//!
//! A request either consumes the source item (`Consumed`, even when a roll
//! failed) or is refused without touching any state.

use std::fmt;
use std::time::Duration;

use itemforge_core::AttributeKind;

use crate::upgrade::level::LevelUpgradeOutcome;
use crate::upgrade::UpgradeOutcome;

/// Why a request was refused before anything was mutated
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Precondition {
    #[error("character is not alive and active in the world")]
    CharacterInactive,

    #[error("item is already used up")]
    ItemDepleted,

    #[error("recovery is on cooldown for another {remaining:?}")]
    CooldownActive { remaining: Duration },

    #[error("a target item is required")]
    MissingTarget,

    #[error("target item cannot be upgraded")]
    TargetNotUpgradable,

    #[error("target item level {level} is outside the accepted range")]
    TargetLevelOutOfRange { level: u8 },
}

/// Why a well-formed request had nothing to do
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum NotApplicable {
    #[error("item can never carry this option type")]
    OptionNotPossible,

    #[error("no eligible option to add")]
    NoEligibleOption,

    #[error("adding options is not configured")]
    AddingDisabled,

    #[error("increasing options is not configured")]
    IncreasingDisabled,

    #[error("option is already at its highest level")]
    OptionMaxed,

    #[error("item level too low for the next option level")]
    ItemLevelTooLow,

    #[error("item carries more than one option of this type")]
    AmbiguousOption,

    #[error("upgrade would shrink the damage spread below 1")]
    SpreadTooNarrow,

    #[error("item is already at its maximum level")]
    ItemLevelMaxed,

    #[error("effect has no boost elements")]
    NoBoostElements,

    #[error("effect has no duration")]
    NoDuration,
}

/// Refusal raised by an effect's check phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Refusal {
    Precondition(Precondition),
    NotApplicable(NotApplicable),
}

impl From<Precondition> for Refusal {
    fn from(p: Precondition) -> Self {
        Refusal::Precondition(p)
    }
}

impl From<NotApplicable> for Refusal {
    fn from(n: NotApplicable) -> Self {
        Refusal::NotApplicable(n)
    }
}

/// What one effect did after the source was consumed
#[derive(Debug, Clone, PartialEq)]
pub enum EffectReport {
    Upgrade(UpgradeOutcome),
    LevelUpgrade(LevelUpgradeOutcome),
    EffectApplied { name: String, replaced: bool },
    Recovered { attribute: AttributeKind, amount: f32 },
    RecoveryScheduled { attribute: AttributeKind, total: f32, steps: usize },
    /// The check phase passed but the effect found nothing to do when applied
    Skipped(NotApplicable),
}

impl EffectReport {
    /// Whether the effect changed game state in the player's favor
    pub fn is_effective(&self) -> bool {
        match self {
            Self::Upgrade(outcome) => outcome.is_success(),
            Self::LevelUpgrade(outcome) => outcome.is_success(),
            Self::EffectApplied { .. } => true,
            Self::Recovered { amount, .. } => *amount > 0.0,
            Self::RecoveryScheduled { .. } => true,
            Self::Skipped(_) => false,
        }
    }
}

/// Result of a consumption request
#[derive(Debug, Clone, PartialEq)]
pub enum ConsumeOutcome {
    /// Source durability was spent; one report per effect, in order
    Consumed(Vec<EffectReport>),
    PreconditionFailed(Precondition),
    NotApplicable(NotApplicable),
}

impl ConsumeOutcome {
    /// Whether the source item was consumed
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Consumed(_))
    }

    pub fn reports(&self) -> &[EffectReport] {
        match self {
            Self::Consumed(reports) => reports,
            _ => &[],
        }
    }
}

impl From<Refusal> for ConsumeOutcome {
    fn from(refusal: Refusal) -> Self {
        match refusal {
            Refusal::Precondition(p) => Self::PreconditionFailed(p),
            Refusal::NotApplicable(n) => Self::NotApplicable(n),
        }
    }
}

impl fmt::Display for ConsumeOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Consumed(reports) => {
                let effective = reports.iter().filter(|r| r.is_effective()).count();
                write!(f, "consumed ({effective}/{} effects took hold)", reports.len())
            }
            Self::PreconditionFailed(p) => write!(f, "refused: {p}"),
            Self::NotApplicable(n) => write!(f, "not applicable: {n}"),
        }
    }
}
