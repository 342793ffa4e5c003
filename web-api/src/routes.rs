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

mod feedback;
mod selection;

use actix_web::web::ServiceConfig;
use serde::{Deserialize, Serialize};

/// Limits of the public endpoints.
#[derive(Debug, Deserialize, Serialize)]
#[serde(default)]
pub(crate) struct Config {
    /// The number of images selected if a request doesn't specify it.
    pub(crate) default_k: usize,
    /// The max number of images a request may ask for.
    pub(crate) max_k: usize,
    /// The max number of candidates per selection request.
    pub(crate) max_candidates: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_k: 10,
            max_k: 100,
            max_candidates: 1_000,
        }
    }
}

pub(crate) fn configure_service(config: &mut ServiceConfig) {
    selection::configure_service(config);
    feedback::configure_service(config);
}
