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

use std::sync::Arc;

use displaydoc::Display;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    cache::MemoryWeightCache,
    decay::DecayPolicy,
    reward::RewardTable,
    store::FeedbackStore,
    system::Learner,
};

/// Configurations of the feedback learning system.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(default)]
#[must_use]
pub struct Config {
    prior_alpha: f32,
    prior_beta: f32,
    exploration_rate: f32,
    token_epsilon: f32,
    rewards: RewardTable,
    decay: DecayPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            prior_alpha: 2.,
            prior_beta: 2.,
            exploration_rate: 0.2,
            token_epsilon: 0.1,
            rewards: RewardTable::default(),
            decay: DecayPolicy::default(),
        }
    }
}

/// Errors of the feedback learning system configuration.
#[derive(Copy, Clone, Debug, Display, Error, PartialEq)]
pub enum Error {
    /// Invalid prior, expected positive finite alpha and beta
    Prior,
    /// Invalid exploration rate, expected value from the unit interval
    ExplorationRate,
    /// Invalid token epsilon, expected value from the unit interval
    TokenEpsilon,
    /// Invalid reward table, expected finite rewards
    Rewards,
}

fn is_valid_prior(prior: f32) -> bool {
    prior.is_finite() && prior > 0.
}

impl Config {
    pub fn validate(&self) -> Result<(), Error> {
        if !is_valid_prior(self.prior_alpha) || !is_valid_prior(self.prior_beta) {
            return Err(Error::Prior);
        }
        if !(0. ..=1.).contains(&self.exploration_rate) {
            return Err(Error::ExplorationRate);
        }
        if !(0. ..=1.).contains(&self.token_epsilon) {
            return Err(Error::TokenEpsilon);
        }
        if !self.rewards.is_finite() {
            return Err(Error::Rewards);
        }

        Ok(())
    }

    /// The Beta prior `(alpha, beta)` of unseen attribute values.
    pub fn prior(&self) -> (f32, f32) {
        (self.prior_alpha, self.prior_beta)
    }

    /// Sets the prior.
    ///
    /// # Errors
    /// Fails if alpha or beta isn't positive and finite.
    pub fn with_prior(mut self, alpha: f32, beta: f32) -> Result<Self, Error> {
        self.prior_alpha = alpha;
        self.prior_beta = beta;
        self.validate()?;

        Ok(self)
    }

    /// The probability to choose a random attribute value instead of sampling.
    pub fn exploration_rate(&self) -> f32 {
        self.exploration_rate
    }

    /// Sets the exploration rate.
    ///
    /// # Errors
    /// Fails if the exploration rate is outside of the unit interval.
    pub fn with_exploration_rate(mut self, exploration_rate: f32) -> Result<Self, Error> {
        self.exploration_rate = exploration_rate;
        self.validate()?;

        Ok(self)
    }

    /// The probability to choose a random token instead of the best one.
    pub fn token_epsilon(&self) -> f32 {
        self.token_epsilon
    }

    /// Sets the token epsilon.
    ///
    /// # Errors
    /// Fails if the epsilon is outside of the unit interval.
    pub fn with_token_epsilon(mut self, token_epsilon: f32) -> Result<Self, Error> {
        self.token_epsilon = token_epsilon;
        self.validate()?;

        Ok(self)
    }

    pub fn rewards(&self) -> &RewardTable {
        &self.rewards
    }

    /// Sets the reward table.
    ///
    /// # Errors
    /// Fails if a reward isn't finite.
    pub fn with_rewards(mut self, rewards: RewardTable) -> Result<Self, Error> {
        self.rewards = rewards;
        self.validate()?;

        Ok(self)
    }

    pub fn decay(&self) -> &DecayPolicy {
        &self.decay
    }

    pub fn with_decay(mut self, decay: DecayPolicy) -> Self {
        self.decay = decay;
        self
    }

    /// Creates a learner on top of the store with an in-memory weight cache.
    pub fn build(self, store: Arc<dyn FeedbackStore>) -> Learner {
        Learner {
            config: self,
            store,
            cache: Arc::new(MemoryWeightCache::default()),
        }
    }
}
