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

use ndarray::{Array1, ArrayView1};

use crate::{
    candidate::{Candidate, CandidateId},
    schema::Schema,
};

/// The numeric representation of a candidate.
///
/// The layout is determined by the [`Schema`]: a weighted one-hot block per attribute family in
/// declaration order, followed by the weighted normalized quality.
#[derive(Clone, Debug, PartialEq)]
pub struct FeatureVector {
    pub candidate_id: CandidateId,
    pub components: Array1<f32>,
}

impl FeatureVector {
    pub fn view(&self) -> ArrayView1<'_, f32> {
        self.components.view()
    }
}

/// Vectorizes a candidate wrt the schema.
///
/// Absent attributes and values without a matching canonical value yield an all-zero block.
/// Attribute families unknown to the schema are ignored.
pub fn vectorize(candidate: &Candidate, schema: &Schema) -> FeatureVector {
    let mut components = Array1::zeros(schema.dimension());

    let mut offset = 0;
    for family in &schema.families {
        if let Some(slot) = candidate
            .attribute(&family.name)
            .and_then(|value| family.slot(&value, schema.match_rule))
        {
            components[offset + slot] = family.weight;
        }
        offset += family.values.len();
    }
    components[offset] = candidate.quality_score() / 100. * schema.quality_weight;

    FeatureVector {
        candidate_id: candidate.id.clone(),
        components,
    }
}

pub(crate) fn squared_distance(a: ArrayView1<'_, f32>, b: ArrayView1<'_, f32>) -> f32 {
    a.iter().zip(b).map(|(a, b)| (a - b).powi(2)).sum()
}

pub(crate) fn distance(a: ArrayView1<'_, f32>, b: ArrayView1<'_, f32>) -> f32 {
    squared_distance(a, b).sqrt()
}
