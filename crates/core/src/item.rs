use serde::{Deserialize, Serialize};

use crate::weight::{to_grams, WeightUnit};

/// Gear category. The catalogue ships with exactly these three;
/// `item_categories` rows carry the display names.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ItemCategory {
    Food,
    Water,
    Essentials,
}

impl ItemCategory {
    pub const ALL: [ItemCategory; 3] = [Self::Food, Self::Water, Self::Essentials];

    pub fn as_str(&self) -> &str {
        match self {
            Self::Food => "Food",
            Self::Water => "Water",
            Self::Essentials => "Essentials",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "food" => Some(Self::Food),
            "water" => Some(Self::Water),
            "essentials" => Some(Self::Essentials),
            _ => None,
        }
    }
}

impl std::fmt::Display for ItemCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A gear entry as it participates in pack computations.
///
/// This is the computation-facing shape, not the DB row: the server maps
/// `items` rows joined through `pack_items` into this before recomputing
/// a pack's totals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GearItem {
    pub name: String,
    pub weight: f64,
    pub unit: WeightUnit,
    pub quantity: u32,
    pub category: Option<ItemCategory>,
}

impl GearItem {
    /// Total weight of this entry in grams (`weight × quantity`, normalized).
    pub fn total_grams(&self) -> f64 {
        to_grams(self.weight, self.unit) * f64::from(self.quantity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_parse_is_case_insensitive() {
        assert_eq!(ItemCategory::parse("food"), Some(ItemCategory::Food));
        assert_eq!(ItemCategory::parse(" Water "), Some(ItemCategory::Water));
        assert_eq!(ItemCategory::parse("fuel"), None);
    }

    #[test]
    fn item_total_multiplies_quantity_and_normalizes_unit() {
        let item = GearItem {
            name: "trail mix".into(),
            weight: 0.5,
            unit: WeightUnit::Kg,
            quantity: 3,
            category: Some(ItemCategory::Food),
        };
        assert_eq!(item.total_grams(), 1500.0);
    }
}
