use serde::{Deserialize, Serialize};

use crate::item::GearItem;

/// Visibility of a pack or trip.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    #[default]
    Private,
    Public,
}

impl Visibility {
    pub fn from_flag(is_public: bool) -> Self {
        if is_public { Self::Public } else { Self::Private }
    }

    pub fn is_public(&self) -> bool {
        matches!(self, Self::Public)
    }
}

/// Sum of `weight × quantity` over the pack's items, in grams.
///
/// Always recomputed from the item rows; the denormalized
/// `packs.total_weight` column is a cache of this value.
pub fn total_weight_grams(items: &[GearItem]) -> f64 {
    items.iter().map(GearItem::total_grams).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::ItemCategory;
    use crate::weight::WeightUnit;

    fn item(name: &str, weight: f64, unit: WeightUnit, quantity: u32) -> GearItem {
        GearItem {
            name: name.into(),
            weight,
            unit,
            quantity,
            category: Some(ItemCategory::Essentials),
        }
    }

    #[test]
    fn total_weight_sums_across_units() {
        let items = vec![
            item("tent", 2.0, WeightUnit::Kg, 1),
            item("stakes", 10.0, WeightUnit::G, 8),
        ];
        assert_eq!(total_weight_grams(&items), 2080.0);
    }

    #[test]
    fn empty_pack_weighs_nothing() {
        assert_eq!(total_weight_grams(&[]), 0.0);
    }
}
