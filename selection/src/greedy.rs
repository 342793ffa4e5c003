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

use crate::kernel::KernelMatrix;

/// Weight of the standalone quality in the marginal gain.
pub const QUALITY_TRADE_OFF: f32 = 0.6;

/// Weight of the mean similarity to the already selected candidates in the marginal gain.
pub const DIVERSITY_TRADE_OFF: f32 = 0.4;

/// Greedily selects up to `k` candidate indices from the kernel.
///
/// The first pick is the candidate of highest quality, every further pick maximizes
/// `0.6 * quality - 0.4 * mean similarity to the selection`. Ties are broken by the lowest index,
/// hence the selection is deterministic. The indices are returned in selection order.
pub fn select(kernel: &KernelMatrix, k: usize) -> Vec<usize> {
    let k = k.min(kernel.size());
    let mut selected = Vec::with_capacity(k);
    let mut remaining = (0..kernel.size()).collect::<Vec<_>>();
    // sum of similarities of each candidate to the selected ones
    let mut similarity_sums = vec![0_f32; kernel.size()];

    while selected.len() < k && !remaining.is_empty() {
        let mut best: Option<(usize, f32)> = None;
        for (position, &candidate) in remaining.iter().enumerate() {
            let score = marginal_gain(kernel, candidate, similarity_sums[candidate], selected.len());
            if best.map_or(true, |(_, best_score)| score > best_score) {
                best = Some((position, score));
            }
        }

        let Some((position, _)) = best else {
            break;
        };
        let chosen = remaining.remove(position);
        for &candidate in &remaining {
            similarity_sums[candidate] += kernel.similarity(candidate, chosen);
        }
        selected.push(chosen);
    }

    selected
}

#[allow(clippy::cast_precision_loss)]
fn marginal_gain(kernel: &KernelMatrix, candidate: usize, similarity_sum: f32, selected: usize) -> f32 {
    let quality = kernel.quality(candidate);
    if selected == 0 {
        quality
    } else {
        QUALITY_TRADE_OFF * quality - DIVERSITY_TRADE_OFF * similarity_sum / selected as f32
    }
}
