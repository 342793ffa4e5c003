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

use rand::Rng;
use rand_distr::{Beta, Distribution, Normal};

use crate::counter::RewardCounter;

/// Above this amount of evidence a Beta sample is approximated by a normal sample.
pub const NORMAL_APPROXIMATION_THRESHOLD: f32 = 100.;

// Beta parameters must be strictly positive
const MIN_PARAMETER: f32 = 1e-3;

/// Draws a sample from `Beta(alpha, beta)` within the unit interval.
pub fn sample_beta<R>(alpha: f32, beta: f32, rng: &mut R) -> f32
where
    R: Rng + ?Sized,
{
    let alpha = alpha.max(MIN_PARAMETER);
    let beta = beta.max(MIN_PARAMETER);
    let total = alpha + beta;
    let mean = alpha / total;

    let sample = if total > NORMAL_APPROXIMATION_THRESHOLD {
        let variance = alpha * beta / (total.powi(2) * (total + 1.));
        Normal::new(mean, variance.sqrt())
            .ok()
            .map(|normal| normal.sample(rng))
    } else {
        Beta::new(alpha, beta).ok().map(|beta| beta.sample(rng))
    };

    sample
        .filter(|sample| sample.is_finite())
        .unwrap_or(mean)
        .clamp(0., 1.)
}

/// Chooses an attribute value by Thompson sampling over its reward counters.
///
/// With probability `exploration_rate` a uniformly random value is chosen, otherwise the value
/// with the highest Beta sample. Ties go to the first value in key order.
pub fn select_attribute<'a, R>(
    counters: &'a BTreeMap<String, RewardCounter>,
    exploration_rate: f32,
    rng: &mut R,
) -> Option<&'a str>
where
    R: Rng + ?Sized,
{
    if counters.is_empty() {
        return None;
    }

    if rng.gen::<f32>() < exploration_rate {
        let index = rng.gen_range(0..counters.len());
        return counters.keys().nth(index).map(String::as_str);
    }

    let mut best: Option<(&str, f32)> = None;
    for (value, counter) in counters {
        let sample = sample_beta(counter.alpha, counter.beta, rng);
        if best.map_or(true, |(_, best_sample)| sample > best_sample) {
            best = Some((value.as_str(), sample));
        }
    }

    best.map(|(value, _)| value)
}
