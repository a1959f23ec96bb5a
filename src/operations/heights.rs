use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::footprint::{BuildingCategory, Tags, LEVELS_TAG};
use crate::math::round_vertical;

/// Constants of the level-to-height conversion.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeightRules {
    /// Height of one storey.
    pub storey_height: f64,
    /// Extra height added on top of the storeys for roof structure, and the
    /// thickness of a canopy band.
    pub roof_allowance: f64,
}

impl Default for HeightRules {
    fn default() -> Self {
        Self {
            storey_height: 2.8,
            roof_allowance: 1.3,
        }
    }
}

/// Resolved vertical extent of one footprint, per building category.
///
/// `building_height` is relative to the ground; every other field is an
/// absolute elevation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Heights {
    Default {
        ground: f64,
        building_height: f64,
        roof: f64,
    },
    Cabin {
        ground: f64,
        building_height: f64,
        roof: f64,
    },
    Bridge {
        ground: f64,
        /// Underside of the deck.
        soffit: f64,
        building_height: f64,
        roof: f64,
    },
    /// `building=roof`: a band from `lower` to `roof`, nothing below.
    Canopy { ground: f64, lower: f64, roof: f64 },
}

impl Heights {
    /// Ground elevation under the footprint.
    #[must_use]
    pub fn ground(&self) -> f64 {
        match *self {
            Self::Default { ground, .. }
            | Self::Cabin { ground, .. }
            | Self::Bridge { ground, .. }
            | Self::Canopy { ground, .. } => ground,
        }
    }

    /// Top of the solid.
    #[must_use]
    pub fn roof(&self) -> f64 {
        match *self {
            Self::Default { roof, .. }
            | Self::Cabin { roof, .. }
            | Self::Bridge { roof, .. }
            | Self::Canopy { roof, .. } => roof,
        }
    }

    /// Bottom of the solid: the ground, a bridge soffit or a canopy's lower bound.
    #[must_use]
    pub fn bottom(&self) -> f64 {
        match *self {
            Self::Default { ground, .. } | Self::Cabin { ground, .. } => ground,
            Self::Bridge { soffit, .. } => soffit,
            Self::Canopy { lower, .. } => lower,
        }
    }

    /// Break elevations this footprint imposes on walls it shares.
    #[must_use]
    pub fn breaks(&self) -> [f64; 2] {
        [self.bottom(), self.roof()]
    }

    /// Height attributes written to the city object.
    #[must_use]
    pub fn attributes(&self) -> Vec<(&'static str, f64)> {
        match *self {
            Self::Default {
                ground,
                building_height,
                roof,
            }
            | Self::Cabin {
                ground,
                building_height,
                roof,
            } => vec![
                ("ground_height", ground),
                ("building_height", building_height),
                ("roof_height", roof),
            ],
            Self::Bridge {
                ground,
                soffit,
                building_height,
                roof,
            } => vec![
                ("ground_height", ground),
                ("bottom_bridge_height", soffit),
                ("building_height", building_height),
                ("roof_height", roof),
            ],
            Self::Canopy { ground, lower, roof } => vec![
                ("ground_height", ground),
                ("bottom_roof_height", lower),
                ("roof_height", roof),
            ],
        }
    }
}

/// Maps a footprint's category and level tags to its [`Heights`].
///
/// Never fails: a missing or non-numeric `building:levels` counts as one level.
pub struct ResolveHeights<'a> {
    category: BuildingCategory,
    tags: &'a Tags,
    ground: f64,
    rules: HeightRules,
}

impl<'a> ResolveHeights<'a> {
    /// Creates a new `ResolveHeights` operation with default rules.
    #[must_use]
    pub fn new(category: BuildingCategory, tags: &'a Tags, ground: f64) -> Self {
        Self {
            category,
            tags,
            ground,
            rules: HeightRules::default(),
        }
    }

    /// Sets custom height rules.
    #[must_use]
    pub fn with_rules(mut self, rules: HeightRules) -> Self {
        self.rules = rules;
        self
    }

    /// Executes the resolution.
    #[must_use]
    pub fn execute(&self) -> Heights {
        let storey = self.rules.storey_height;
        let allowance = self.rules.roof_allowance;
        let ground = round_vertical(self.ground);
        let levels = parse_number(self.tags.get(LEVELS_TAG)).unwrap_or(1.0);
        let storeys = levels * storey;

        match self.category {
            BuildingCategory::Default => Heights::Default {
                ground,
                building_height: round_vertical(storeys + allowance),
                roof: round_vertical(storeys + allowance + ground),
            },
            BuildingCategory::Cabin => Heights::Cabin {
                ground,
                building_height: round_vertical(storeys),
                roof: round_vertical(storeys + ground),
            },
            BuildingCategory::Bridge => {
                let clearance = parse_number(self.tags.get("min_height")).unwrap_or_else(|| {
                    parse_number(self.tags.get("building:min_level")).unwrap_or(0.0) * storey
                });
                Heights::Bridge {
                    ground,
                    soffit: round_vertical(clearance + ground),
                    building_height: round_vertical(storeys),
                    roof: round_vertical(storeys + ground),
                }
            }
            BuildingCategory::Roof => Heights::Canopy {
                ground,
                lower: round_vertical(storeys + ground),
                roof: round_vertical(storeys + ground + allowance),
            },
        }
    }
}

/// Reads an unsigned decimal from a tag: a non-negative JSON number, or a
/// string of digits with at most one decimal point.
fn parse_number(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Number(n) => n.as_f64().filter(|v| v.is_finite() && *v >= 0.0),
        Value::String(s) => {
            let s = s.trim();
            let digits = s.chars().filter(char::is_ascii_digit).count();
            let dots = s.chars().filter(|&c| c == '.').count();
            if digits == 0 || dots > 1 || digits + dots != s.len() {
                return None;
            }
            s.parse().ok()
        }
        _ => None,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use serde_json::json;

    fn tags(value: Value) -> Tags {
        serde_json::from_value(value).unwrap()
    }

    // ── Categories ─────────────────────────────────────────────

    #[test]
    fn default_adds_roof_allowance_and_ground() {
        let t = tags(json!({"building:levels": "2"}));
        let h = ResolveHeights::new(BuildingCategory::Default, &t, 10.0).execute();
        assert_relative_eq!(h.ground(), 10.0);
        assert_relative_eq!(h.roof(), 16.9);
        assert_relative_eq!(h.bottom(), 10.0);
    }

    #[test]
    fn single_level_default_on_flat_ground() {
        let t = tags(json!({"building:levels": 1}));
        let h = ResolveHeights::new(BuildingCategory::Default, &t, 0.0).execute();
        assert_relative_eq!(h.roof(), 4.1);
    }

    #[test]
    fn cabin_has_no_allowance() {
        let t = tags(json!({"building:levels": "1"}));
        let h = ResolveHeights::new(BuildingCategory::Cabin, &t, 0.0).execute();
        assert_relative_eq!(h.roof(), 2.8);
        assert!(matches!(h, Heights::Cabin { .. }));
    }

    #[test]
    fn bridge_soffit_from_min_height() {
        let t = tags(json!({"building:levels": "3", "min_height": "4.5"}));
        let h = ResolveHeights::new(BuildingCategory::Bridge, &t, 2.0).execute();
        assert_relative_eq!(h.bottom(), 6.5);
        assert_relative_eq!(h.roof(), 10.4);
    }

    #[test]
    fn bridge_soffit_from_min_level() {
        let t = tags(json!({"building:levels": "3", "building:min_level": "2"}));
        let h = ResolveHeights::new(BuildingCategory::Bridge, &t, 0.0).execute();
        assert_relative_eq!(h.bottom(), 5.6);
        assert_relative_eq!(h.roof(), 8.4);
    }

    #[test]
    fn bridge_without_clearance_tags_sits_on_ground() {
        let t = tags(json!({"building:levels": "1"}));
        let h = ResolveHeights::new(BuildingCategory::Bridge, &t, 3.0).execute();
        assert_relative_eq!(h.bottom(), 3.0);
    }

    #[test]
    fn canopy_band_above_storeys() {
        let t = tags(json!({"building:levels": "1"}));
        let h = ResolveHeights::new(BuildingCategory::Roof, &t, 1.0).execute();
        assert_relative_eq!(h.bottom(), 3.8);
        assert_relative_eq!(h.roof(), 5.1);
        assert_eq!(h.attributes()[1].0, "bottom_roof_height");
    }

    // ── Level parsing ──────────────────────────────────────────

    #[test]
    fn unusable_levels_default_to_one() {
        for levels in [json!("two"), json!("-2"), json!("1.2.3"), json!(null), json!(-3)] {
            let t = tags(json!({ "building:levels": levels }));
            let h = ResolveHeights::new(BuildingCategory::Cabin, &t, 0.0).execute();
            assert_relative_eq!(h.roof(), 2.8);
        }
    }

    #[test]
    fn fractional_levels_are_accepted() {
        let t = tags(json!({"building:levels": "1.5"}));
        let h = ResolveHeights::new(BuildingCategory::Cabin, &t, 0.0).execute();
        assert_relative_eq!(h.roof(), 4.2);
    }

    #[test]
    fn custom_rules() {
        let t = tags(json!({"building:levels": "2"}));
        let rules = HeightRules {
            storey_height: 3.0,
            roof_allowance: 0.0,
        };
        let h = ResolveHeights::new(BuildingCategory::Default, &t, 0.0)
            .with_rules(rules)
            .execute();
        assert_relative_eq!(h.roof(), 6.0);
    }
}
