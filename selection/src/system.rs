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

use std::collections::BTreeSet;

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::{
    candidate::{Candidate, CandidateId},
    config::Config,
    greedy::select,
    kernel::build_kernel,
    metrics::{report, DiversityMetrics},
    vectorize::vectorize,
};

/// The outcome of one selection.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionResult {
    /// Selected ids in selection order.
    pub selected_ids: Vec<CandidateId>,
    /// The ids which weren't selected in pool order.
    pub rejected_ids: Vec<CandidateId>,
    #[serde(flatten)]
    pub metrics: DiversityMetrics,
}

pub struct Selector {
    pub(super) config: Config,
}

impl Selector {
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Selects up to `k` candidates balancing their quality against redundancy.
    #[instrument(skip_all, fields(candidates = candidates.len(), k))]
    pub fn select(&self, candidates: &[Candidate], k: usize) -> SelectionResult {
        let schema = self.config.schema();

        let unknown = candidates
            .iter()
            .flat_map(|candidate| candidate.attributes.keys())
            .filter(|family| schema.family(family).is_none())
            .collect::<BTreeSet<_>>();
        for family in unknown {
            warn!(%family, "ignoring attribute family which is not part of the schema");
        }

        let vectors = candidates
            .iter()
            .map(|candidate| vectorize(candidate, schema))
            .collect_vec();
        let kernel = build_kernel(candidates, &vectors);
        let selected = select(&kernel, k);
        let metrics = report(&selected, candidates, &vectors, schema);

        let is_selected = selected.iter().copied().collect::<BTreeSet<_>>();
        let rejected_ids = candidates
            .iter()
            .enumerate()
            .filter(|(index, _)| !is_selected.contains(index))
            .map(|(_, candidate)| candidate.id.clone())
            .collect_vec();
        let selected_ids = selected
            .into_iter()
            .map(|index| candidates[index].id.clone())
            .collect_vec();
        debug!(
            selected = selected_ids.len(),
            diversity_score = metrics.diversity_score,
            "selected diverse candidates",
        );

        SelectionResult {
            selected_ids,
            rejected_ids,
            metrics,
        }
    }
}
