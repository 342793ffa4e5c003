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

use std::collections::BTreeMap;

use derive_more::{AsRef, Display, From, Into};
use serde::{Deserialize, Serialize};

/// Quality assumed for candidates without an upstream quality assessment.
pub const DEFAULT_QUALITY_SCORE: f32 = 70.;

/// A unique identifier of a candidate within one selection batch.
#[derive(
    AsRef, Clone, Debug, Display, Deserialize, Eq, From, Hash, Into, Ord, PartialEq, PartialOrd, Serialize,
)]
#[as_ref(forward)]
#[serde(transparent)]
pub struct CandidateId(String);

impl From<&str> for CandidateId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// A generated image eligible for selection.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub id: CandidateId,
    /// Attribute family name to value, e.g. `garmentType` to `dress`.
    #[serde(default)]
    pub attributes: BTreeMap<String, Option<String>>,
    #[serde(default)]
    quality_score: Option<f32>,
}

impl Candidate {
    pub fn new(id: impl Into<CandidateId>, quality_score: f32) -> Self {
        Self {
            quality_score: Some(quality_score),
            ..Self::unscored(id)
        }
    }

    /// Creates a candidate without quality assessment.
    pub fn unscored(id: impl Into<CandidateId>) -> Self {
        Self {
            id: id.into(),
            attributes: BTreeMap::new(),
            quality_score: None,
        }
    }

    /// Sets an attribute value.
    #[must_use]
    pub fn with_attribute(mut self, family: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(family.into(), Some(value.into()));
        self
    }

    /// The quality score within `[0, 100]`.
    ///
    /// Missing or non-finite scores fall back to [`DEFAULT_QUALITY_SCORE`].
    pub fn quality_score(&self) -> f32 {
        match self.quality_score {
            Some(score) if score.is_finite() => score.clamp(0., 100.),
            _ => DEFAULT_QUALITY_SCORE,
        }
    }

    /// The normalized value of an attribute family, if present and not blank.
    pub fn attribute(&self, family: &str) -> Option<String> {
        self.attributes
            .get(family)
            .and_then(Option::as_deref)
            .map(|value| value.trim().to_lowercase())
            .filter(|value| !value.is_empty())
    }
}
