//! Character attributes
//!
//! Attribute kinds and the keyed numeric store the engine mutates through.

use serde::{Deserialize, Serialize};

/// Kinds of numeric attributes a character carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeKind {
    CurrentHealth,
    MaximumHealth,
    CurrentMana,
    MaximumMana,
    CurrentShield,
    MaximumShield,
    CurrentAbility,
    MaximumAbility,

    MinimumPhysicalDamage,
    MaximumPhysicalDamage,
    MinimumWizardryDamage,
    MaximumWizardryDamage,
    DefenseBase,
    AttackSpeed,
    AttackRate,
    DefenseRate,
    DamageReceiveDecrement,
    ExperienceRate,
    MoneyAmountRate,
    ItemDurationIncrease,
}

impl AttributeKind {
    /// The maximum attribute bounding this one, for current/maximum pairs
    pub fn maximum(self) -> Option<AttributeKind> {
        match self {
            Self::CurrentHealth => Some(Self::MaximumHealth),
            Self::CurrentMana => Some(Self::MaximumMana),
            Self::CurrentShield => Some(Self::MaximumShield),
            Self::CurrentAbility => Some(Self::MaximumAbility),
            _ => None,
        }
    }

    /// Display name
    pub fn name(self) -> &'static str {
        match self {
            Self::CurrentHealth => "Health",
            Self::MaximumHealth => "Maximum Health",
            Self::CurrentMana => "Mana",
            Self::MaximumMana => "Maximum Mana",
            Self::CurrentShield => "Shield",
            Self::MaximumShield => "Maximum Shield",
            Self::CurrentAbility => "Ability",
            Self::MaximumAbility => "Maximum Ability",
            Self::MinimumPhysicalDamage => "Minimum Physical Damage",
            Self::MaximumPhysicalDamage => "Maximum Physical Damage",
            Self::MinimumWizardryDamage => "Minimum Wizardry Damage",
            Self::MaximumWizardryDamage => "Maximum Wizardry Damage",
            Self::DefenseBase => "Defense",
            Self::AttackSpeed => "Attack Speed",
            Self::AttackRate => "Attack Rate",
            Self::DefenseRate => "Defense Rate",
            Self::DamageReceiveDecrement => "Damage Receive Decrement",
            Self::ExperienceRate => "Experience Rate",
            Self::MoneyAmountRate => "Money Amount Rate",
            Self::ItemDurationIncrease => "Item Duration Increase",
        }
    }
}

/// A current/maximum attribute pair that potions restore
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributePool {
    Health,
    Mana,
    Shield,
    Ability,
}

impl AttributePool {
    /// The attribute holding the current value
    pub fn current(self) -> AttributeKind {
        match self {
            Self::Health => AttributeKind::CurrentHealth,
            Self::Mana => AttributeKind::CurrentMana,
            Self::Shield => AttributeKind::CurrentShield,
            Self::Ability => AttributeKind::CurrentAbility,
        }
    }

    /// The attribute bounding the current value
    pub fn maximum(self) -> AttributeKind {
        match self {
            Self::Health => AttributeKind::MaximumHealth,
            Self::Mana => AttributeKind::MaximumMana,
            Self::Shield => AttributeKind::MaximumShield,
            Self::Ability => AttributeKind::MaximumAbility,
        }
    }
}

/// Keyed numeric store of a character's attributes.
///
/// The engine never caches values read from here across suspension points.
pub trait AttributeStore {
    /// Current value of an attribute; unknown attributes read as 0
    fn get(&self, kind: AttributeKind) -> f32;

    /// Additive update; negative deltas subtract
    fn add(&mut self, kind: AttributeKind, delta: f32);

    fn subtract(&mut self, kind: AttributeKind, delta: f32) {
        self.add(kind, -delta);
    }

    /// Adds up to `amount` to `current` without exceeding the live value of
    /// `maximum`. Returns what was actually added. Never lowers `current`.
    fn add_bounded(&mut self, current: AttributeKind, maximum: AttributeKind, amount: f32) -> f32 {
        let room = (self.get(maximum) - self.get(current)).max(0.0);
        let applied = amount.min(room).max(0.0);
        if applied > 0.0 {
            self.add(current, applied);
        }
        applied
    }
}
