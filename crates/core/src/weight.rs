use serde::{Deserialize, Serialize};

/// Unit a gear item's weight is recorded in.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum WeightUnit {
    #[default]
    G,
    Kg,
    Oz,
    Lb,
}

impl WeightUnit {
    pub fn as_str(&self) -> &str {
        match self {
            Self::G => "g",
            Self::Kg => "kg",
            Self::Oz => "oz",
            Self::Lb => "lb",
        }
    }

    /// Parse a stored unit string. Unknown units fall back to grams —
    /// legacy rows carried free-text units.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "kg" => Self::Kg,
            "oz" => Self::Oz,
            "lb" | "lbs" => Self::Lb,
            _ => Self::G,
        }
    }

    /// Grams per one of this unit.
    pub fn grams(&self) -> f64 {
        match self {
            Self::G => 1.0,
            Self::Kg => 1000.0,
            Self::Oz => 28.349_523_125,
            Self::Lb => 453.592_37,
        }
    }
}

impl std::fmt::Display for WeightUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalize a weight to grams.
pub fn to_grams(value: f64, unit: WeightUnit) -> f64 {
    value * unit.grams()
}

/// Human-friendly weight label: grams below 1 kg, kilograms above.
pub fn format_grams(grams: f64) -> String {
    if grams < 1000.0 {
        format!("{:.0} g", grams)
    } else {
        format!("{:.2} kg", grams / 1000.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_known_units_and_defaults_to_grams() {
        assert_eq!(WeightUnit::parse("kg"), WeightUnit::Kg);
        assert_eq!(WeightUnit::parse("LB"), WeightUnit::Lb);
        assert_eq!(WeightUnit::parse("lbs"), WeightUnit::Lb);
        assert_eq!(WeightUnit::parse("stone"), WeightUnit::G);
    }

    #[test]
    fn to_grams_normalizes_each_unit() {
        assert_eq!(to_grams(500.0, WeightUnit::G), 500.0);
        assert_eq!(to_grams(2.0, WeightUnit::Kg), 2000.0);
        assert!((to_grams(1.0, WeightUnit::Oz) - 28.349523125).abs() < 1e-9);
        assert!((to_grams(1.0, WeightUnit::Lb) - 453.59237).abs() < 1e-9);
    }

    #[test]
    fn format_grams_switches_to_kilograms_at_1kg() {
        assert_eq!(format_grams(850.0), "850 g");
        assert_eq!(format_grams(1500.0), "1.50 kg");
    }
}
