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

use std::{collections::BTreeMap, sync::Arc};

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::{
    cache::{CacheEntry, WeightCache},
    config::Config,
    counter::RewardCounter,
    reward::FeedbackKind,
    store::{FeedbackStore, Key, StoreError},
    thompson::select_attribute,
    utils::normalize,
    weight::{select_token, TokenWeight},
};

/// A feedback event of a user on a generated image.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Feedback {
    pub kind: FeedbackKind,
    /// The prompt tokens of the image per category.
    #[serde(default)]
    pub tokens: BTreeMap<String, Vec<String>>,
    /// The attribute values of the image per attribute family.
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
}

/// The state after processing a feedback event.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackSummary {
    pub reward: f32,
    pub token_weights: BTreeMap<String, BTreeMap<String, TokenWeight>>,
    pub counters: BTreeMap<String, BTreeMap<String, RewardCounter>>,
}

/// Learns attribute and token preferences of users from their feedback.
pub struct Learner {
    pub(super) config: Config,
    pub(super) store: Arc<dyn FeedbackStore>,
    pub(super) cache: Arc<dyn WeightCache>,
}

impl Learner {
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Replaces the weight cache.
    #[must_use]
    pub fn with_cache(mut self, cache: Arc<dyn WeightCache>) -> Self {
        self.cache = cache;
        self
    }

    /// The reward of a kind of feedback.
    pub fn reward(&self, kind: FeedbackKind) -> f32 {
        self.config.rewards().reward(kind)
    }

    fn prior_counter(&self, time: DateTime<Utc>) -> RewardCounter {
        let (alpha, beta) = self.config.prior();
        RewardCounter::new(alpha, beta, time)
    }

    /// Updates the token weights and reward counters referenced by the feedback.
    ///
    /// Every key is updated atomically on its own, the first failing update aborts the remaining
    /// ones.
    #[instrument(skip_all, fields(user_id = %user_id, kind = %feedback.kind))]
    pub async fn process_feedback(
        &self,
        user_id: &str,
        feedback: &Feedback,
        time: DateTime<Utc>,
    ) -> Result<FeedbackSummary, StoreError> {
        let reward = self.reward(feedback.kind);
        let mut summary = FeedbackSummary {
            reward,
            ..FeedbackSummary::default()
        };

        for (category, tokens) in &feedback.tokens {
            let Some(category) = normalize(category) else {
                continue;
            };
            for token in tokens.iter().filter_map(|token| normalize(token)) {
                let key = Key::new(user_id, category.as_str(), token.as_str());
                let weight = self
                    .store
                    .update_token_weight(&key, TokenWeight::new(time), &|weight| {
                        weight.apply_reward(reward, time);
                    })
                    .await?;
                summary
                    .token_weights
                    .entry(category.clone())
                    .or_default()
                    .insert(token, weight);
            }
            self.cache.invalidate(user_id, &category).await;
        }

        for (family, value) in &feedback.attributes {
            let (Some(family), Some(value)) = (normalize(family), normalize(value)) else {
                continue;
            };
            let key = Key::new(user_id, family.as_str(), value.as_str());
            let counter = self
                .store
                .update_counter(&key, self.prior_counter(time), &|counter| {
                    counter.record(reward, time);
                })
                .await?;
            summary
                .counters
                .entry(family)
                .or_default()
                .insert(value, counter);
        }

        debug!(
            reward,
            tokens = summary.token_weights.values().map(BTreeMap::len).sum::<usize>(),
            attributes = summary.counters.len(),
            "processed feedback",
        );

        Ok(summary)
    }

    /// Chooses one of the values of an attribute family for a user by Thompson sampling.
    ///
    /// Values without feedback yet are sampled at the prior. Without candidate values all values
    /// with feedback are considered.
    #[instrument(skip_all, fields(user_id = %user_id, category = %category))]
    pub async fn select_attribute<R>(
        &self,
        user_id: &str,
        category: &str,
        values: &[String],
        time: DateTime<Utc>,
        rng: &mut R,
    ) -> Result<Option<String>, StoreError>
    where
        R: Rng + ?Sized,
    {
        let category = normalize(category).unwrap_or_default();
        let mut counters = self.store.counters(user_id, &category).await?;
        let values = values
            .iter()
            .filter_map(|value| normalize(value))
            .collect::<Vec<_>>();
        if !values.is_empty() {
            counters = values
                .into_iter()
                .map(|value| {
                    let counter = counters
                        .get(&value)
                        .copied()
                        .unwrap_or_else(|| self.prior_counter(time));
                    (value, counter)
                })
                .collect();
        }

        Ok(
            select_attribute(&counters, self.config.exploration_rate(), rng)
                .map(ToString::to_string),
        )
    }

    /// Gets the token weights of a user's category, served from the cache if possible.
    pub async fn token_weights(
        &self,
        user_id: &str,
        category: &str,
    ) -> Result<BTreeMap<String, TokenWeight>, StoreError> {
        let category = normalize(category).unwrap_or_default();
        let generation = match self.cache.get(user_id, &category).await {
            CacheEntry::Hit(weights) => return Ok(weights),
            CacheEntry::Miss { generation } => generation,
        };

        let weights = self.store.token_weights(user_id, &category).await?;
        if !self
            .cache
            .insert(user_id, &category, generation, weights.clone())
            .await
        {
            debug!(%category, "discarded outdated token weights");
        }

        Ok(weights)
    }

    /// Chooses one of the known tokens of a user's category by the epsilon-greedy policy.
    #[instrument(skip_all, fields(user_id = %user_id, category = %category))]
    pub async fn select_token<R>(
        &self,
        user_id: &str,
        category: &str,
        rng: &mut R,
    ) -> Result<Option<String>, StoreError>
    where
        R: Rng + ?Sized,
    {
        let weights = self.token_weights(user_id, category).await?;

        Ok(select_token(&weights, self.config.token_epsilon(), rng).map(ToString::to_string))
    }

    /// Decays the reward counters and token weights of a user's category.
    #[instrument(skip_all, fields(user_id = %user_id, category = %category))]
    pub async fn decay(
        &self,
        user_id: &str,
        category: &str,
        time: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let category = normalize(category).unwrap_or_default();
        let policy = *self.config.decay();
        let (prior_alpha, prior_beta) = self.config.prior();

        for (value, counter) in self.store.counters(user_id, &category).await? {
            let key = Key::new(user_id, category.as_str(), value);
            self.store
                .update_counter(&key, counter, &|counter| {
                    policy.decay_counter(counter, prior_alpha, prior_beta, time);
                })
                .await?;
        }
        for (token, weight) in self.store.token_weights(user_id, &category).await? {
            let key = Key::new(user_id, category.as_str(), token);
            self.store
                .update_token_weight(&key, weight, &|weight| policy.decay_weight(weight, time))
                .await?;
        }
        self.cache.invalidate(user_id, &category).await;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};

    use async_trait::async_trait;
    use chrono::Duration as TimeDelta;
    use designer_bff_test_utils::assert_approx_eq;
    use rand::{rngs::StdRng, SeedableRng};
    use tokio::sync::Notify;

    use super::*;
    use crate::{config::Config, store::MemoryStore};

    fn learner() -> Learner {
        Config::default().build(Arc::new(MemoryStore::default()))
    }

    fn feedback(kind: FeedbackKind) -> Feedback {
        Feedback {
            kind,
            tokens: [(
                "Fabric".to_string(),
                vec!["Linen".to_string(), " ".to_string(), "silk".to_string()],
            )]
            .into_iter()
            .collect(),
            attributes: [
                ("length".to_string(), "Midi".to_string()),
                ("neckline".to_string(), String::new()),
            ]
            .into_iter()
            .collect(),
        }
    }

    #[tokio::test]
    async fn test_positive_feedback() {
        let learner = learner();
        let time = Utc::now();
        let summary = learner
            .process_feedback("u1", &feedback(FeedbackKind::Share), time)
            .await
            .unwrap();

        assert_approx_eq!(f32, summary.reward, 1.5);
        let fabric = &summary.token_weights["fabric"];
        assert_eq!(fabric.keys().collect::<Vec<_>>(), ["linen", "silk"]);
        assert_approx_eq!(f32, fabric["linen"].weight, 1.05, epsilon = 1e-6);
        assert_eq!(fabric["linen"].usage_count, 1);
        assert_eq!(fabric["linen"].positive_feedback, 1);

        let counter = summary.counters["length"]["midi"];
        assert_approx_eq!(f32, counter.alpha, 3.5);
        assert_approx_eq!(f32, counter.beta, 2.);
        assert!(!summary.counters.contains_key("neckline"));
    }

    #[tokio::test]
    async fn test_negative_feedback_accumulates() {
        let learner = learner();
        let time = Utc::now();
        for _ in 0..2 {
            learner
                .process_feedback("u1", &feedback(FeedbackKind::Outlier), time)
                .await
                .unwrap();
        }

        let weights = learner.token_weights("u1", "fabric").await.unwrap();
        assert_approx_eq!(f32, weights["silk"].weight, 0.62, epsilon = 1e-6);
        assert_eq!(weights["silk"].negative_feedback, 2);

        let counters = learner.store.counters("u1", "length").await.unwrap();
        assert_approx_eq!(f32, counters["midi"].alpha, 2.);
        assert_approx_eq!(f32, counters["midi"].beta, 4.);
    }

    #[tokio::test]
    async fn test_cache_is_invalidated_by_feedback() {
        let learner = learner();
        let time = Utc::now();
        assert!(learner.token_weights("u1", "fabric").await.unwrap().is_empty());

        learner
            .process_feedback("u1", &feedback(FeedbackKind::Like), time)
            .await
            .unwrap();
        assert_eq!(learner.token_weights("u1", "fabric").await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_select_attribute_prefers_liked_value() {
        let learner = Config::default()
            .with_exploration_rate(0.)
            .unwrap()
            .build(Arc::new(MemoryStore::default()));
        let time = Utc::now();
        let liked = Feedback {
            kind: FeedbackKind::Share,
            tokens: BTreeMap::new(),
            attributes: [("length".to_string(), "maxi".to_string())]
                .into_iter()
                .collect(),
        };
        for _ in 0..60 {
            learner.process_feedback("u1", &liked, time).await.unwrap();
        }

        let values = ["mini", "midi", "maxi"].map(String::from);
        let mut rng = StdRng::seed_from_u64(7);
        let mut wins = 0;
        for _ in 0..200 {
            let chosen = learner
                .select_attribute("u1", "length", &values, time, &mut rng)
                .await
                .unwrap();
            if chosen.as_deref() == Some("maxi") {
                wins += 1;
            }
        }
        assert!(wins > 180, "{wins}");
    }

    #[tokio::test]
    async fn test_select_attribute_without_values() {
        let learner = learner();
        let mut rng = StdRng::seed_from_u64(8);
        let time = Utc::now();

        let chosen = learner
            .select_attribute("u1", "length", &[], time, &mut rng)
            .await
            .unwrap();
        assert_eq!(chosen, None);

        learner
            .process_feedback("u1", &feedback(FeedbackKind::Like), time)
            .await
            .unwrap();
        let chosen = learner
            .select_attribute("u1", "length", &[], time, &mut rng)
            .await
            .unwrap();
        assert_eq!(chosen.as_deref(), Some("midi"));
    }

    #[tokio::test]
    async fn test_select_token() {
        let learner = Config::default()
            .with_token_epsilon(0.)
            .unwrap()
            .build(Arc::new(MemoryStore::default()));
        let time = Utc::now();
        let mut rng = StdRng::seed_from_u64(9);
        assert_eq!(learner.select_token("u1", "fabric", &mut rng).await.unwrap(), None);

        let feedback = |token: &str, kind| Feedback {
            kind,
            tokens: [("fabric".to_string(), vec![token.to_string()])]
                .into_iter()
                .collect(),
            attributes: BTreeMap::new(),
        };
        learner
            .process_feedback("u1", &feedback("linen", FeedbackKind::Dislike), time)
            .await
            .unwrap();
        learner
            .process_feedback("u1", &feedback("silk", FeedbackKind::Save), time)
            .await
            .unwrap();

        let chosen = learner.select_token("u1", "fabric", &mut rng).await.unwrap();
        assert_eq!(chosen.as_deref(), Some("silk"));
    }

    #[tokio::test]
    async fn test_decay() {
        let learner = learner();
        let past = Utc::now() - TimeDelta::days(30);
        for _ in 0..4 {
            learner
                .process_feedback("u1", &feedback(FeedbackKind::Share), past)
                .await
                .unwrap();
        }
        let before = learner.token_weights("u1", "fabric").await.unwrap()["linen"].weight;

        // one half-life
        learner.decay("u1", "length", past + TimeDelta::days(30)).await.unwrap();
        learner.decay("u1", "fabric", past + TimeDelta::days(30)).await.unwrap();

        let counter = learner.store.counters("u1", "length").await.unwrap()["midi"];
        assert_approx_eq!(f32, counter.alpha, 5.);
        assert_approx_eq!(f32, counter.beta, 2.);
        let after = learner.token_weights("u1", "fabric").await.unwrap()["linen"].weight;
        assert_approx_eq!(f32, after, 1. + (before - 1.) / 2., epsilon = 1e-6);
    }

    #[tokio::test]
    async fn test_decay_of_active_user() {
        let learner = learner();
        let start = Utc::now() - TimeDelta::days(60);
        for _ in 0..20 {
            learner
                .process_feedback("u1", &feedback(FeedbackKind::Share), start)
                .await
                .unwrap();
        }
        learner
            .process_feedback("u1", &feedback(FeedbackKind::Like), start + TimeDelta::days(59))
            .await
            .unwrap();

        // two half-lives since the evidence started to accumulate
        learner.decay("u1", "length", start + TimeDelta::days(60)).await.unwrap();

        let counter = learner.store.counters("u1", "length").await.unwrap()["midi"];
        assert_approx_eq!(f32, counter.alpha, 9.75, epsilon = 1e-4);
        assert_eq!(counter.updated_at, start + TimeDelta::days(59));
        assert_eq!(counter.decayed_at, start + TimeDelta::days(60));
    }

    /// Pauses the first read of token weights after taking the snapshot.
    #[derive(Default)]
    struct PausingStore {
        inner: MemoryStore,
        paused: AtomicBool,
        entered: Notify,
        resume: Notify,
    }

    #[async_trait]
    impl FeedbackStore for PausingStore {
        async fn counters(
            &self,
            user_id: &str,
            category: &str,
        ) -> Result<BTreeMap<String, RewardCounter>, StoreError> {
            self.inner.counters(user_id, category).await
        }

        async fn update_counter(
            &self,
            key: &Key,
            init: RewardCounter,
            update: &(dyn for<'a> Fn(&'a mut RewardCounter) + Send + Sync),
        ) -> Result<RewardCounter, StoreError> {
            self.inner.update_counter(key, init, update).await
        }

        async fn token_weights(
            &self,
            user_id: &str,
            category: &str,
        ) -> Result<BTreeMap<String, TokenWeight>, StoreError> {
            let weights = self.inner.token_weights(user_id, category).await;
            if !self.paused.swap(true, Ordering::SeqCst) {
                self.entered.notify_one();
                self.resume.notified().await;
            }
            weights
        }

        async fn update_token_weight(
            &self,
            key: &Key,
            init: TokenWeight,
            update: &(dyn for<'a> Fn(&'a mut TokenWeight) + Send + Sync),
        ) -> Result<TokenWeight, StoreError> {
            self.inner.update_token_weight(key, init, update).await
        }
    }

    #[tokio::test]
    async fn test_concurrent_feedback_is_not_hidden_by_cache() {
        let store = Arc::new(PausingStore::default());
        let learner = Arc::new(Config::default().build(store.clone()));

        let reader = tokio::spawn({
            let learner = learner.clone();
            async move { learner.token_weights("u1", "fabric").await }
        });
        store.entered.notified().await;
        learner
            .process_feedback("u1", &feedback(FeedbackKind::Like), Utc::now())
            .await
            .unwrap();
        store.resume.notify_one();

        // the reader returns its snapshot but must not cache it
        assert!(reader.await.unwrap().unwrap().is_empty());
        assert!(matches!(
            learner.cache.get("u1", "fabric").await,
            CacheEntry::Miss { .. },
        ));
        let weights = learner.token_weights("u1", "fabric").await.unwrap();
        assert!(weights.contains_key("linen"));
    }

    struct UnavailableStore;

    fn unavailable() -> StoreError {
        StoreError::Unavailable("connection refused".into())
    }

    #[async_trait]
    impl FeedbackStore for UnavailableStore {
        async fn counters(
            &self,
            _user_id: &str,
            _category: &str,
        ) -> Result<BTreeMap<String, RewardCounter>, StoreError> {
            Err(unavailable())
        }

        async fn update_counter(
            &self,
            _key: &Key,
            _init: RewardCounter,
            _update: &(dyn for<'a> Fn(&'a mut RewardCounter) + Send + Sync),
        ) -> Result<RewardCounter, StoreError> {
            Err(unavailable())
        }

        async fn token_weights(
            &self,
            _user_id: &str,
            _category: &str,
        ) -> Result<BTreeMap<String, TokenWeight>, StoreError> {
            Err(unavailable())
        }

        async fn update_token_weight(
            &self,
            _key: &Key,
            _init: TokenWeight,
            _update: &(dyn for<'a> Fn(&'a mut TokenWeight) + Send + Sync),
        ) -> Result<TokenWeight, StoreError> {
            Err(unavailable())
        }
    }

    #[tokio::test]
    async fn test_store_errors_are_propagated() {
        let learner = Config::default().build(Arc::new(UnavailableStore));
        let mut rng = StdRng::seed_from_u64(10);

        let error = learner
            .process_feedback("u1", &feedback(FeedbackKind::Like), Utc::now())
            .await
            .unwrap_err();
        assert_eq!(error.to_string(), "Counter store unavailable: connection refused");
        assert!(learner
            .select_attribute("u1", "length", &[], Utc::now(), &mut rng)
            .await
            .is_err());
        assert!(learner.select_token("u1", "fabric", &mut rng).await.is_err());
    }
}
