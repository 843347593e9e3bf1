//! Success chance shared by option and level upgrades

use itemforge_core::{Item, OptionType, RandomSource};

/// Whether `item` carries the option type that boosts the chance
pub fn is_boosted(item: &Item, boost_option_type: Option<OptionType>) -> bool {
    boost_option_type.is_some_and(|t| item.has_option_type(t))
}

/// Chance as a whole percentage in 0..=100
pub fn success_percent(chance: f64, boost: f64, boosted: bool) -> u32 {
    let total = if boosted { chance + boost } else { chance };
    (total.clamp(0.0, 1.0) * 100.0).round() as u32
}

/// Roll once against the configured chance
pub fn roll(
    rng: &mut dyn RandomSource,
    item: &Item,
    chance: f64,
    boost: f64,
    boost_option_type: Option<OptionType>,
) -> bool {
    let percent = success_percent(chance, boost, is_boosted(item, boost_option_type));
    rng.next_bool(percent)
}
