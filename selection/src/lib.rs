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

//! Selection of a diverse, high quality subset of generated fashion images.
//!
//! Candidates are vectorized wrt an attribute [`Schema`], a quality/similarity kernel is built
//! over the batch and a greedy approximation of determinantal point process inference picks the
//! subset. The [`Selector`] reports coverage and distance metrics for the result.

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

mod candidate;
mod config;
mod greedy;
mod kernel;
mod metrics;
mod schema;
mod system;
mod vectorize;

pub use crate::{
    candidate::{Candidate, CandidateId, DEFAULT_QUALITY_SCORE},
    config::{Config as SelectionConfig, Error as SelectionConfigError},
    greedy::{select, DIVERSITY_TRADE_OFF, QUALITY_TRADE_OFF},
    kernel::{build_kernel, KernelMatrix, SIGMA},
    metrics::{report, AttributeCoverage, DiversityMetrics, QualityStats},
    schema::{AttributeFamily, MatchRule, Schema},
    system::{SelectionResult, Selector},
    vectorize::{vectorize, FeatureVector},
};
