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

//! Learning of user preferences from feedback on generated images.
//!
//! Every feedback event is mapped to a scalar reward which moves the Beta reward counters of the
//! rated attribute values and the weights of the prompt tokens. Attribute values are chosen by
//! Thompson sampling over the counters, prompt tokens by an epsilon-greedy policy over the
//! weights. The counters and weights live in an injected [`FeedbackStore`].

#![forbid(unsafe_code)]
#![deny(
    clippy::pedantic,
    noop_method_call,
    rust_2018_idioms,
    unused_qualifications
)]
#![warn(unreachable_pub, rustdoc::missing_crate_level_docs)]
#![allow(
    clippy::missing_errors_doc,
    clippy::module_name_repetitions,
    clippy::must_use_candidate
)]

mod cache;
mod config;
mod counter;
mod decay;
mod reward;
mod store;
mod system;
mod thompson;
mod utils;
mod weight;

pub use crate::{
    cache::{CacheEntry, MemoryWeightCache, WeightCache},
    config::{Config as FeedbackConfig, Error as FeedbackConfigError},
    counter::RewardCounter,
    decay::DecayPolicy,
    reward::{FeedbackKind, RewardTable},
    store::{FeedbackStore, Key, MemoryStore, StoreError},
    system::{Feedback, FeedbackSummary, Learner},
    thompson::{sample_beta, select_attribute, NORMAL_APPROXIMATION_THRESHOLD},
    weight::{
        select_token,
        update_weight,
        TokenWeight,
        LEARNING_RATE,
        MAX_WEIGHT,
        MIN_WEIGHT,
        NEUTRAL_WEIGHT,
    },
};
