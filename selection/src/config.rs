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

use std::collections::HashSet;

use displaydoc::Display;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    schema::{AttributeFamily, MatchRule, Schema},
    system::Selector,
};

/// Configurations of the selection system.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(default)]
#[must_use]
pub struct Config {
    schema: Schema,
}

/// Errors of the selection system configuration.
#[derive(Clone, Debug, Display, Error, PartialEq)]
pub enum Error {
    /// Attribute family {0:?} is declared more than once
    DuplicateFamily(String),
    /// Attribute family {0:?} has no canonical values
    EmptyVocabulary(String),
    /// Attribute family {0:?} has a blank canonical value
    BlankValue(String),
    /// Invalid weight of attribute family {0:?}, expected finite non-negative value
    FamilyWeight(String),
    /// Invalid quality weight, expected finite non-negative value
    QualityWeight,
}

fn is_valid_weight(weight: f32) -> bool {
    weight.is_finite() && weight >= 0.
}

impl Config {
    pub fn validate(&self) -> Result<(), Error> {
        let mut names = HashSet::new();
        for family in &self.schema.families {
            if !names.insert(family.name.as_str()) {
                return Err(Error::DuplicateFamily(family.name.clone()));
            }
            if family.values.is_empty() {
                return Err(Error::EmptyVocabulary(family.name.clone()));
            }
            if family.values.iter().any(|value| value.trim().is_empty()) {
                return Err(Error::BlankValue(family.name.clone()));
            }
            if !is_valid_weight(family.weight) {
                return Err(Error::FamilyWeight(family.name.clone()));
            }
        }
        if !is_valid_weight(self.schema.quality_weight) {
            return Err(Error::QualityWeight);
        }

        Ok(())
    }

    /// The schema of attribute families.
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Sets the attribute families.
    ///
    /// # Errors
    /// Fails if a family is duplicated, has no or blank values or has an invalid weight.
    pub fn with_families(mut self, families: Vec<AttributeFamily>) -> Result<Self, Error> {
        self.schema.families = families;
        self.validate()?;

        Ok(self)
    }

    /// Sets the weight of the quality scalar.
    ///
    /// # Errors
    /// Fails if the weight is negative or not finite.
    pub fn with_quality_weight(mut self, quality_weight: f32) -> Result<Self, Error> {
        self.schema.quality_weight = quality_weight;
        self.validate()?;

        Ok(self)
    }

    /// Sets the rule to match attribute values against canonical values.
    pub fn with_match_rule(mut self, match_rule: MatchRule) -> Self {
        self.schema.match_rule = match_rule;
        self
    }

    /// Creates a selector.
    pub fn build(self) -> Selector {
        Selector { config: self }
    }
}
