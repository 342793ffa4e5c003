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

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The Beta evidence of one attribute value of a user.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RewardCounter {
    /// Accumulated positive reward.
    pub alpha: f32,
    /// Accumulated negative reward.
    pub beta: f32,
    /// Time of the last feedback.
    pub updated_at: DateTime<Utc>,
    /// Time up to which the evidence has been decayed.
    pub decayed_at: DateTime<Utc>,
}

impl RewardCounter {
    /// Creates a counter at the prior.
    pub fn new(prior_alpha: f32, prior_beta: f32, time: DateTime<Utc>) -> Self {
        Self {
            alpha: prior_alpha,
            beta: prior_beta,
            updated_at: time,
            decayed_at: time,
        }
    }

    /// Adds the reward as evidence, positive rewards to alpha and negative rewards to beta.
    ///
    /// Neither parameter ever decreases.
    pub fn record(&mut self, reward: f32, time: DateTime<Utc>) {
        if reward > 0. {
            self.alpha += reward;
        } else if reward < 0. {
            self.beta -= reward;
        }
        self.updated_at = time;
    }
}

#[cfg(test)]
mod tests {
    use designer_bff_test_utils::assert_approx_eq;

    use super::*;

    #[test]
    fn test_record() {
        let created = Utc::now();
        let mut counter = RewardCounter::new(2., 2., created);

        counter.record(1.5, created);
        assert_approx_eq!(f32, counter.alpha, 3.5);
        assert_approx_eq!(f32, counter.beta, 2.);

        let later = created + chrono::Duration::hours(1);
        counter.record(-0.8, later);
        assert_approx_eq!(f32, counter.alpha, 3.5);
        assert_approx_eq!(f32, counter.beta, 2.8);
        assert_eq!(counter.updated_at, later);
        assert_eq!(counter.decayed_at, created);

        counter.record(0., later);
        assert_approx_eq!(f32, counter.alpha, 3.5);
        assert_approx_eq!(f32, counter.beta, 2.8);
    }
}
