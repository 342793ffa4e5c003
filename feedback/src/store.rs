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

use std::{collections::BTreeMap, error::Error as StdError};

use async_trait::async_trait;
use displaydoc::Display;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::RwLock;

use crate::{counter::RewardCounter, weight::TokenWeight};

/// Identifies a reward counter or token weight.
#[derive(Clone, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct Key {
    pub user_id: String,
    pub category: String,
    /// The attribute value or prompt token.
    pub item: String,
}

impl Key {
    pub fn new(
        user_id: impl Into<String>,
        category: impl Into<String>,
        item: impl Into<String>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            category: category.into(),
            item: item.into(),
        }
    }

    fn is_in(&self, user_id: &str, category: &str) -> bool {
        self.user_id == user_id && self.category == category
    }
}

/// Errors of a feedback store.
#[derive(Debug, Display, Error)]
pub enum StoreError {
    /// Counter store unavailable: {0}
    Unavailable(Box<dyn StdError + Send + Sync + 'static>),
}

/// A durable store of reward counters and token weights.
///
/// Updates of a single key must be atomic, updates of distinct keys are independent.
#[async_trait]
pub trait FeedbackStore: Send + Sync {
    /// Gets the reward counters of the attribute values of a user's category.
    async fn counters(
        &self,
        user_id: &str,
        category: &str,
    ) -> Result<BTreeMap<String, RewardCounter>, StoreError>;

    /// Applies the update to the counter, which is initialized first if it doesn't exist yet.
    async fn update_counter(
        &self,
        key: &Key,
        init: RewardCounter,
        update: &(dyn for<'a> Fn(&'a mut RewardCounter) + Send + Sync),
    ) -> Result<RewardCounter, StoreError>;

    /// Gets the token weights of a user's category.
    async fn token_weights(
        &self,
        user_id: &str,
        category: &str,
    ) -> Result<BTreeMap<String, TokenWeight>, StoreError>;

    /// Applies the update to the token weight, which is initialized first if it doesn't exist yet.
    async fn update_token_weight(
        &self,
        key: &Key,
        init: TokenWeight,
        update: &(dyn for<'a> Fn(&'a mut TokenWeight) + Send + Sync),
    ) -> Result<TokenWeight, StoreError>;
}

/// An in-memory feedback store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    counters: RwLock<BTreeMap<Key, RewardCounter>>,
    token_weights: RwLock<BTreeMap<Key, TokenWeight>>,
}

fn collect_items<T>(map: &BTreeMap<Key, T>, user_id: &str, category: &str) -> BTreeMap<String, T>
where
    T: Copy,
{
    map.iter()
        .filter(|(key, _)| key.is_in(user_id, category))
        .map(|(key, value)| (key.item.clone(), *value))
        .collect()
}

#[async_trait]
impl FeedbackStore for MemoryStore {
    async fn counters(
        &self,
        user_id: &str,
        category: &str,
    ) -> Result<BTreeMap<String, RewardCounter>, StoreError> {
        Ok(collect_items(&*self.counters.read().await, user_id, category))
    }

    async fn update_counter(
        &self,
        key: &Key,
        init: RewardCounter,
        update: &(dyn for<'a> Fn(&'a mut RewardCounter) + Send + Sync),
    ) -> Result<RewardCounter, StoreError> {
        let mut counters = self.counters.write().await;
        let counter = counters.entry(key.clone()).or_insert(init);
        update(counter);

        Ok(*counter)
    }

    async fn token_weights(
        &self,
        user_id: &str,
        category: &str,
    ) -> Result<BTreeMap<String, TokenWeight>, StoreError> {
        Ok(collect_items(&*self.token_weights.read().await, user_id, category))
    }

    async fn update_token_weight(
        &self,
        key: &Key,
        init: TokenWeight,
        update: &(dyn for<'a> Fn(&'a mut TokenWeight) + Send + Sync),
    ) -> Result<TokenWeight, StoreError> {
        let mut weights = self.token_weights.write().await;
        let weight = weights.entry(key.clone()).or_insert(init);
        update(weight);

        Ok(*weight)
    }
}
