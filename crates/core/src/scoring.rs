//! Pack scoring heuristic.
//!
//! Formula (`pack_v1`):
//! - Weight component: 100 at ≤ 9 kg base weight, linearly down to 0 at 23 kg
//! - Essentials component: 100 × (distinct categories present / 3)
//! - Redundancy: -10 per duplicated item name beyond the first (cap -40)
//! - Total: mean of the two components plus the redundancy penalty,
//!   clamped to 0..100

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::item::GearItem;
use crate::pack::total_weight_grams;

/// Base weight below which the weight component stays at 100 (grams).
const WEIGHT_FLOOR_G: f64 = 9_000.0;
/// Base weight at and above which the weight component bottoms out (grams).
const WEIGHT_CEIL_G: f64 = 23_000.0;

const REDUNDANCY_PENALTY: f64 = 10.0;
const REDUNDANCY_CAP: f64 = 40.0;

/// Component breakdown of a pack score.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PackScore {
    pub weight_score: f64,
    pub essentials_score: f64,
    pub redundancy_penalty: f64,
    pub total: f64,
}

/// Score a pack from its items. Deterministic; empty packs score 0.
pub fn score_pack(items: &[GearItem]) -> PackScore {
    if items.is_empty() {
        return PackScore {
            weight_score: 0.0,
            essentials_score: 0.0,
            redundancy_penalty: 0.0,
            total: 0.0,
        };
    }

    let grams = total_weight_grams(items);
    let weight_score = if grams <= WEIGHT_FLOOR_G {
        100.0
    } else if grams >= WEIGHT_CEIL_G {
        0.0
    } else {
        100.0 * (WEIGHT_CEIL_G - grams) / (WEIGHT_CEIL_G - WEIGHT_FLOOR_G)
    };

    let categories: HashSet<_> = items.iter().filter_map(|i| i.category).collect();
    let essentials_score = 100.0 * categories.len() as f64 / 3.0;

    let mut name_counts: HashMap<String, u32> = HashMap::new();
    for item in items {
        *name_counts.entry(item.name.trim().to_lowercase()).or_default() += 1;
    }
    let duplicates: u32 = name_counts.values().map(|c| c.saturating_sub(1)).sum();
    let redundancy_penalty = (f64::from(duplicates) * REDUNDANCY_PENALTY).min(REDUNDANCY_CAP);

    let total = ((weight_score + essentials_score) / 2.0 - redundancy_penalty).clamp(0.0, 100.0);

    PackScore {
        weight_score,
        essentials_score,
        redundancy_penalty,
        total,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::ItemCategory;
    use crate::weight::WeightUnit;

    fn item(name: &str, kg: f64, category: ItemCategory) -> GearItem {
        GearItem {
            name: name.into(),
            weight: kg,
            unit: WeightUnit::Kg,
            quantity: 1,
            category: Some(category),
        }
    }

    #[test]
    fn empty_pack_scores_zero() {
        assert_eq!(score_pack(&[]).total, 0.0);
    }

    #[test]
    fn light_pack_with_all_categories_scores_100() {
        let items = vec![
            item("tent", 2.0, ItemCategory::Essentials),
            item("water bladder", 1.0, ItemCategory::Water),
            item("dehydrated meals", 1.5, ItemCategory::Food),
        ];
        let score = score_pack(&items);
        assert_eq!(score.weight_score, 100.0);
        assert_eq!(score.essentials_score, 100.0);
        assert_eq!(score.total, 100.0);
    }

    #[test]
    fn heavy_pack_loses_weight_component() {
        let items = vec![item("cast iron skillet", 25.0, ItemCategory::Food)];
        let score = score_pack(&items);
        assert_eq!(score.weight_score, 0.0);
        assert!(score.total < 50.0);
    }

    #[test]
    fn duplicate_names_are_penalized_and_capped() {
        let items: Vec<_> = (0..6)
            .map(|_| item("headlamp", 0.1, ItemCategory::Essentials))
            .collect();
        let score = score_pack(&items);
        assert_eq!(score.redundancy_penalty, 40.0);
    }

    #[test]
    fn scoring_is_deterministic() {
        let items = vec![
            item("stove", 0.4, ItemCategory::Food),
            item("filter", 0.2, ItemCategory::Water),
        ];
        assert_eq!(score_pack(&items), score_pack(&items));
    }
}
