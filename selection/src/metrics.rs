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

use std::collections::{BTreeMap, BTreeSet};

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::{
    candidate::Candidate,
    schema::Schema,
    vectorize::{distance, FeatureVector},
};

/// How many distinct values of an attribute family the selection covers.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributeCoverage {
    /// Distinct values in the whole pool.
    pub total_values: usize,
    /// Distinct values in the selection.
    pub covered_values: usize,
    pub coverage_ratio: f32,
}

/// Quality statistics of the selection.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct QualityStats {
    pub min: f32,
    pub max: f32,
    pub mean: f32,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiversityMetrics {
    /// Mean coverage ratio over all attribute families, within `[0, 1]`.
    pub diversity_score: f32,
    pub attribute_coverage: BTreeMap<String, AttributeCoverage>,
    pub avg_pairwise_distance: f32,
    pub quality: QualityStats,
}

fn distinct_values<'a>(
    candidates: impl IntoIterator<Item = &'a Candidate>,
    family: &str,
) -> BTreeSet<String> {
    candidates
        .into_iter()
        .filter_map(|candidate| candidate.attribute(family))
        .collect()
}

#[allow(clippy::cast_precision_loss)]
fn mean(values: impl IntoIterator<Item = f32>) -> f32 {
    let (sum, count) = values
        .into_iter()
        .fold((0., 0_usize), |(sum, count), value| (sum + value, count + 1));
    if count == 0 {
        0.
    } else {
        sum / count as f32
    }
}

/// Computes the diversity metrics of the selected indices wrt the whole pool.
///
/// Degenerate inputs, like an empty pool or selection, yield zeroed metrics.
#[allow(clippy::cast_precision_loss)]
pub fn report(
    selected: &[usize],
    candidates: &[Candidate],
    vectors: &[FeatureVector],
    schema: &Schema,
) -> DiversityMetrics {
    let selected_candidates = selected
        .iter()
        .filter_map(|&index| candidates.get(index))
        .collect_vec();

    let attribute_coverage = schema
        .families
        .iter()
        .map(|family| {
            let total_values = distinct_values(candidates, &family.name).len();
            let covered_values =
                distinct_values(selected_candidates.iter().copied(), &family.name).len();
            let coverage_ratio = if total_values == 0 {
                0.
            } else {
                covered_values as f32 / total_values as f32
            };
            let coverage = AttributeCoverage {
                total_values,
                covered_values,
                coverage_ratio,
            };
            (family.name.clone(), coverage)
        })
        .collect::<BTreeMap<_, _>>();

    let diversity_score = mean(
        attribute_coverage
            .values()
            .map(|coverage| coverage.coverage_ratio),
    )
    .clamp(0., 1.);

    let avg_pairwise_distance = mean(
        selected
            .iter()
            .filter_map(|&index| vectors.get(index))
            .tuple_combinations()
            .map(|(a, b)| distance(a.view(), b.view())),
    );

    let quality = if selected_candidates.is_empty() {
        QualityStats::default()
    } else {
        let scores = selected_candidates
            .iter()
            .map(|candidate| candidate.quality_score())
            .collect_vec();
        QualityStats {
            min: scores.iter().copied().fold(f32::INFINITY, f32::min),
            max: scores.iter().copied().fold(f32::NEG_INFINITY, f32::max),
            mean: mean(scores),
        }
    };

    DiversityMetrics {
        diversity_score,
        attribute_coverage,
        avg_pairwise_distance,
        quality,
    }
}
