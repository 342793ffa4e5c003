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

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    counter::RewardCounter,
    utils::{serde_duration_as_days, SECONDS_PER_DAY},
    weight::{TokenWeight, NEUTRAL_WEIGHT},
};

/// Half-life decay of learned preferences.
///
/// Decay is only applied on explicit request. It pulls the counter evidence back towards the prior
/// and the token weights back towards neutral, the feedback counts of token weights are kept.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct DecayPolicy {
    #[serde(rename = "half_life_days", with = "serde_duration_as_days")]
    pub half_life: Duration,
}

impl Default for DecayPolicy {
    fn default() -> Self {
        Self {
            half_life: Duration::from_secs(30 * SECONDS_PER_DAY),
        }
    }
}

impl DecayPolicy {
    /// Computes the fraction of learned evidence which is retained since the last decay.
    ///
    /// The fraction is `0.5^(elapsed / half_life)`, a zero half-life forgets everything and a
    /// last decay in the future retains everything.
    pub fn retained(&self, last_decay: DateTime<Utc>, time: DateTime<Utc>) -> f32 {
        let Ok(elapsed) = time.signed_duration_since(last_decay).to_std() else {
            return 1.;
        };
        if self.half_life == Duration::ZERO {
            return 0.;
        }

        0.5_f32.powf(elapsed.as_secs_f32() / self.half_life.as_secs_f32())
    }

    pub fn decay_counter(
        &self,
        counter: &mut RewardCounter,
        prior_alpha: f32,
        prior_beta: f32,
        time: DateTime<Utc>,
    ) {
        let retained = self.retained(counter.decayed_at, time);
        counter.alpha = prior_alpha + (counter.alpha - prior_alpha).max(0.) * retained;
        counter.beta = prior_beta + (counter.beta - prior_beta).max(0.) * retained;
        counter.decayed_at = counter.decayed_at.max(time);
    }

    pub fn decay_weight(&self, weight: &mut TokenWeight, time: DateTime<Utc>) {
        let retained = self.retained(weight.decayed_at, time);
        weight.weight = NEUTRAL_WEIGHT + (weight.weight - NEUTRAL_WEIGHT) * retained;
        weight.decayed_at = weight.decayed_at.max(time);
    }
}
