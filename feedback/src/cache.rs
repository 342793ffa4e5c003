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

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::weight::TokenWeight;

/// The result of a cache lookup.
#[derive(Clone, Debug, PartialEq)]
pub enum CacheEntry {
    Hit(BTreeMap<String, TokenWeight>),
    /// The entry is missing, a fill must be tagged with the given generation.
    Miss { generation: u64 },
}

/// A cache of the token weights of a user's category.
///
/// Entries stay valid until they are invalidated explicitly. Every invalidation starts a new
/// generation of the entry, fills read before an invalidation are discarded.
#[async_trait]
pub trait WeightCache: Send + Sync {
    async fn get(&self, user_id: &str, category: &str) -> CacheEntry;

    /// Fills the entry if it wasn't invalidated since the lookup of the generation.
    ///
    /// Returns whether the weights were cached.
    async fn insert(
        &self,
        user_id: &str,
        category: &str,
        generation: u64,
        weights: BTreeMap<String, TokenWeight>,
    ) -> bool;

    async fn invalidate(&self, user_id: &str, category: &str);
}

#[derive(Debug, Default)]
struct Slot {
    generation: u64,
    weights: Option<BTreeMap<String, TokenWeight>>,
}

#[derive(Debug, Default)]
pub struct MemoryWeightCache {
    slots: RwLock<HashMap<(String, String), Slot>>,
}

fn cache_key(user_id: &str, category: &str) -> (String, String) {
    (user_id.to_string(), category.to_string())
}

#[async_trait]
impl WeightCache for MemoryWeightCache {
    async fn get(&self, user_id: &str, category: &str) -> CacheEntry {
        match self.slots.read().await.get(&cache_key(user_id, category)) {
            Some(Slot {
                weights: Some(weights),
                ..
            }) => CacheEntry::Hit(weights.clone()),
            Some(Slot { generation, .. }) => CacheEntry::Miss {
                generation: *generation,
            },
            None => CacheEntry::Miss { generation: 0 },
        }
    }

    async fn insert(
        &self,
        user_id: &str,
        category: &str,
        generation: u64,
        weights: BTreeMap<String, TokenWeight>,
    ) -> bool {
        let mut slots = self.slots.write().await;
        let slot = slots.entry(cache_key(user_id, category)).or_default();
        if slot.generation == generation {
            slot.weights = Some(weights);
            true
        } else {
            false
        }
    }

    async fn invalidate(&self, user_id: &str, category: &str) {
        let mut slots = self.slots.write().await;
        let slot = slots.entry(cache_key(user_id, category)).or_default();
        slot.generation += 1;
        slot.weights = None;
    }
}
