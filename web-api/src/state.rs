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

use designer_bff_feedback::{Learner, MemoryStore};
use designer_bff_selection::Selector;

use crate::config::WebApiConfig;

/// Shared state of all request handlers.
pub(crate) struct AppState {
    pub(crate) config: WebApiConfig,
    pub(crate) selector: Selector,
    pub(crate) learner: Learner,
}

impl AppState {
    pub(crate) fn create(config: WebApiConfig) -> Self {
        let selector = config.selection.clone().build();
        let learner = config
            .feedback
            .clone()
            .build(Arc::new(MemoryStore::default()));

        Self {
            config,
            selector,
            learner,
        }
    }
}
