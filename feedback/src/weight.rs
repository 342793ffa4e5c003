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

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// How far a token weight moves towards the reward on each feedback.
pub const LEARNING_RATE: f32 = 0.1;

pub const MIN_WEIGHT: f32 = 0.;

pub const MAX_WEIGHT: f32 = 2.;

/// The weight of a token without any feedback.
pub const NEUTRAL_WEIGHT: f32 = 1.;

/// Moves the weight towards the reward by an exponential moving average.
///
/// The result is clamped to `[MIN_WEIGHT, MAX_WEIGHT]`.
pub fn update_weight(weight: f32, reward: f32) -> f32 {
    (weight + LEARNING_RATE * (reward - weight)).clamp(MIN_WEIGHT, MAX_WEIGHT)
}

/// The learned weight of a prompt token of a user.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenWeight {
    pub weight: f32,
    pub usage_count: u64,
    pub positive_feedback: u64,
    pub negative_feedback: u64,
    /// Time of the last feedback.
    pub updated_at: DateTime<Utc>,
    /// Time up to which the weight has been decayed.
    pub decayed_at: DateTime<Utc>,
}

impl TokenWeight {
    /// Creates a neutral weight.
    pub fn new(time: DateTime<Utc>) -> Self {
        Self {
            weight: NEUTRAL_WEIGHT,
            usage_count: 0,
            positive_feedback: 0,
            negative_feedback: 0,
            updated_at: time,
            decayed_at: time,
        }
    }

    pub fn apply_reward(&mut self, reward: f32, time: DateTime<Utc>) {
        self.weight = update_weight(self.weight, reward);
        self.usage_count += 1;
        if reward > 0. {
            self.positive_feedback += 1;
        } else if reward < 0. {
            self.negative_feedback += 1;
        }
        self.updated_at = time;
    }
}

/// Chooses a token by an epsilon-greedy policy over the weights.
///
/// With probability `epsilon` a uniformly random token is chosen, otherwise the token of highest
/// weight. Ties go to the first token in key order.
pub fn select_token<'a, R>(
    weights: &'a BTreeMap<String, TokenWeight>,
    epsilon: f32,
    rng: &mut R,
) -> Option<&'a str>
where
    R: Rng + ?Sized,
{
    if weights.is_empty() {
        return None;
    }

    if rng.gen::<f32>() < epsilon {
        let index = rng.gen_range(0..weights.len());
        return weights.keys().nth(index).map(String::as_str);
    }

    weights
        .iter()
        .fold(None, |best: Option<(&str, f32)>, (token, weight)| match best {
            Some((_, best_weight)) if best_weight >= weight.weight => best,
            _ => Some((token.as_str(), weight.weight)),
        })
        .map(|(token, _)| token)
}

#[cfg(test)]
mod tests {
    use designer_bff_test_utils::assert_approx_eq;
    use rand::{rngs::StdRng, SeedableRng};

    use super::*;

    #[test]
    fn test_update_is_exponential_moving_average() {
        assert_approx_eq!(f32, update_weight(1., 1.5), 1.05, epsilon = 1e-6);
        assert_approx_eq!(f32, update_weight(1., -1.), 0.8, epsilon = 1e-6);
        assert_approx_eq!(f32, update_weight(0.5, 0.5), 0.5);
    }

    #[test]
    fn test_repeated_reward_converges_within_bounds() {
        let mut weight = NEUTRAL_WEIGHT;
        for _ in 0..50 {
            let updated = update_weight(weight, 1.5);
            assert!(updated >= weight);
            assert!((MIN_WEIGHT..=MAX_WEIGHT).contains(&updated));
            weight = updated;
        }
        // 1.5 - 0.5 * 0.9^50
        assert_approx_eq!(f32, weight, 1.497_424, epsilon = 1e-4);
    }

    #[test]
    fn test_weight_is_clamped() {
        let mut high = NEUTRAL_WEIGHT;
        let mut low = NEUTRAL_WEIGHT;
        for _ in 0..50 {
            high = update_weight(high, 3.);
            low = update_weight(low, -2.);
        }
        assert_eq!(high, MAX_WEIGHT);
        assert_eq!(low, MIN_WEIGHT);
    }

    #[test]
    fn test_apply_reward_counts_feedback() {
        let time = Utc::now();
        let mut weight = TokenWeight::new(time);
        weight.apply_reward(1., time);
        weight.apply_reward(-0.5, time);
        weight.apply_reward(0., time);

        assert_eq!(weight.usage_count, 3);
        assert_eq!(weight.positive_feedback, 1);
        assert_eq!(weight.negative_feedback, 1);
    }

    fn weights(entries: &[(&str, f32)]) -> BTreeMap<String, TokenWeight> {
        let time = Utc::now();
        entries
            .iter()
            .map(|&(token, weight)| {
                let weight = TokenWeight {
                    weight,
                    ..TokenWeight::new(time)
                };
                (token.to_string(), weight)
            })
            .collect()
    }

    #[test]
    fn test_greedy_token_selection() {
        let weights = weights(&[("floral", 0.7), ("linen", 1.4), ("pastel", 1.4)]);
        let mut rng = StdRng::seed_from_u64(0);
        for _ in 0..20 {
            assert_eq!(select_token(&weights, 0., &mut rng), Some("linen"));
        }
    }

    #[test]
    fn test_exploring_token_selection() {
        let weights = weights(&[("floral", 0.1), ("linen", 1.9)]);
        let mut rng = StdRng::seed_from_u64(1);
        let explored = (0..1000)
            .filter(|_| select_token(&weights, 1., &mut rng) == Some("floral"))
            .count();
        assert!((400..600).contains(&explored), "{explored}");
        assert_eq!(select_token(&BTreeMap::new(), 0.1, &mut rng), None);
    }
}
