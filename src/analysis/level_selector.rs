use std::cmp::Ordering;

use itertools::Itertools;
use strum::IntoEnumIterator;

use crate::models::{GlobalLevels, Level, LevelSide};

/// Every level, strongest first. Equal strengths are ordered by ascending price.
pub fn select_all(levels: &[Level]) -> Vec<Level> {
    levels
        .iter()
        .cloned()
        .sorted_by(|a, b| {
            b.strength
                .cmp(&a.strength)
                .then_with(|| a.price.total_cmp(&b.price))
        })
        .collect()
}

/// The strongest level on each side.
///
/// Equal strengths go to the level nearest `last_close`, since that is the one
/// price is currently interacting with. If two are also equally near, the
/// lower price wins so the result stays deterministic.
pub fn select_global(levels: &[Level], last_close: f64) -> GlobalLevels {
    let strongest = |side: LevelSide| -> Option<Level> {
        levels
            .iter()
            .filter(|l| l.side == side)
            .min_by(|a, b| {
                b.strength
                    .cmp(&a.strength)
                    .then_with(|| {
                        a.distance_to(last_close)
                            .total_cmp(&b.distance_to(last_close))
                    })
                    .then_with(|| a.price.total_cmp(&b.price))
            })
            .cloned()
    };

    let mut global = GlobalLevels::default();
    for side in LevelSide::iter() {
        match side {
            LevelSide::Support => global.strongest_support = strongest(side),
            LevelSide::Resistance => global.strongest_resistance = strongest(side),
        }
    }
    global
}

/// The outermost level on each side: lowest support, highest resistance.
/// Strength plays no part.
pub fn select_extreme(levels: &[Level]) -> GlobalLevels {
    let by_price = |a: &&Level, b: &&Level| -> Ordering { a.price.total_cmp(&b.price) };

    GlobalLevels {
        strongest_support: levels
            .iter()
            .filter(|l| l.side == LevelSide::Support)
            .min_by(by_price)
            .cloned(),
        strongest_resistance: levels
            .iter()
            .filter(|l| l.side == LevelSide::Resistance)
            .max_by(by_price)
            .cloned(),
    }
}
