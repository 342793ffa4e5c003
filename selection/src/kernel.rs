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

use ndarray::{Array2, ArrayView2};

use crate::{
    candidate::Candidate,
    vectorize::{squared_distance, FeatureVector},
};

/// Bandwidth of the gaussian similarity.
pub const SIGMA: f32 = 1.;

/// A symmetric similarity matrix over a batch of candidates.
///
/// The diagonal holds the normalized quality of each candidate, the off-diagonal entries hold the
/// pairwise rbf similarity of their feature vectors. All entries are within `[0, 1]`.
#[derive(Clone, Debug, PartialEq)]
pub struct KernelMatrix(Array2<f32>);

impl KernelMatrix {
    /// The number of candidates.
    pub fn size(&self) -> usize {
        self.0.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// The normalized quality of a candidate.
    pub fn quality(&self, index: usize) -> f32 {
        self.0[[index, index]]
    }

    pub fn similarity(&self, a: usize, b: usize) -> f32 {
        self.0[[a, b]]
    }

    pub fn view(&self) -> ArrayView2<'_, f32> {
        self.0.view()
    }
}

impl From<Array2<f32>> for KernelMatrix {
    fn from(entries: Array2<f32>) -> Self {
        debug_assert!(entries.is_square());
        Self(entries)
    }
}

/// Builds the kernel matrix of the candidates and their feature vectors.
///
/// The vectors must be given in the same order as the candidates.
pub fn build_kernel(candidates: &[Candidate], vectors: &[FeatureVector]) -> KernelMatrix {
    debug_assert_eq!(candidates.len(), vectors.len());
    let size = candidates.len().min(vectors.len());
    let mut entries = Array2::zeros((size, size));

    for i in 0..size {
        entries[[i, i]] = candidates[i].quality_score() / 100.;
        for j in i + 1..size {
            let similarity = (-squared_distance(vectors[i].view(), vectors[j].view())
                / (2. * SIGMA * SIGMA))
                .exp();
            entries[[i, j]] = similarity;
            entries[[j, i]] = similarity;
        }
    }

    KernelMatrix(entries)
}
