// Copyright 2023 Xayn AG
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as
// published by the Free Software Foundation, version 3.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

use serde::{Deserialize, Serialize};

/// How a candidate's attribute value is matched against a canonical value.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchRule {
    /// Case-insensitive containment in either direction, e.g. `a-line midi` matches `midi`.
    ///
    /// This is fuzzy: `maxi` also matches inside `maximalist`.
    #[default]
    Substring,
    /// Case-insensitive equality.
    Exact,
}

impl MatchRule {
    /// Checks a normalized (trimmed, lowercase) value against a normalized canonical value.
    pub(crate) fn matches(self, value: &str, canonical: &str) -> bool {
        match self {
            Self::Substring => value.contains(canonical) || canonical.contains(value),
            Self::Exact => value == canonical,
        }
    }
}

/// An attribute family with its canonical vocabulary.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct AttributeFamily {
    pub name: String,
    pub values: Vec<String>,
    pub weight: f32,
}

impl AttributeFamily {
    pub fn new(name: impl Into<String>, values: &[&str], weight: f32) -> Self {
        Self {
            name: name.into(),
            values: values.iter().map(|value| value.to_lowercase()).collect(),
            weight,
        }
    }

    /// Index of the first canonical value matching the normalized attribute value.
    pub fn slot(&self, value: &str, rule: MatchRule) -> Option<usize> {
        self.values
            .iter()
            .position(|canonical| rule.matches(value, &canonical.to_lowercase()))
    }
}

/// The fixed layout of feature vectors within a selection batch.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(default)]
pub struct Schema {
    pub families: Vec<AttributeFamily>,
    pub quality_weight: f32,
    pub match_rule: MatchRule,
}

impl Default for Schema {
    fn default() -> Self {
        Self::fashion()
    }
}

impl Schema {
    /// Garment attributes as extracted by the image validation stage.
    pub fn fashion() -> Self {
        Self {
            families: vec![
                AttributeFamily::new(
                    "garmentType",
                    &["dress", "top", "pants", "skirt", "jacket", "coat"],
                    1.0,
                ),
                AttributeFamily::new(
                    "silhouette",
                    &[
                        "a-line",
                        "fitted",
                        "oversized",
                        "straight",
                        "wrap",
                        "bodycon",
                        "relaxed",
                    ],
                    0.9,
                ),
                AttributeFamily::new(
                    "fabrication",
                    &["cotton", "silk", "wool", "denim", "linen", "leather", "knit"],
                    0.8,
                ),
                AttributeFamily::new(
                    "neckline",
                    &["v-neck", "crew", "scoop", "halter", "turtleneck", "off-shoulder"],
                    0.6,
                ),
                AttributeFamily::new(
                    "sleeves",
                    &["sleeveless", "short", "long", "cap", "puff"],
                    0.5,
                ),
                AttributeFamily::new("length", &["mini", "midi", "maxi", "cropped", "ankle"], 0.7),
            ],
            quality_weight: 0.5,
            match_rule: MatchRule::Substring,
        }
    }

    /// The feature vector length: one slot per canonical value plus the quality scalar.
    pub fn dimension(&self) -> usize {
        self.families
            .iter()
            .map(|family| family.values.len())
            .sum::<usize>()
            + 1
    }

    pub fn family(&self, name: &str) -> Option<&AttributeFamily> {
        self.families.iter().find(|family| family.name == name)
    }
}
