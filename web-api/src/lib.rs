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

//! The web api of the designer backend for frontend.
//!
//! Exposes the diverse selection of generated images and the learning of user preferences from
//! feedback over http.

#![forbid(unsafe_code)]
#![deny(
    clippy::pedantic,
    noop_method_call,
    rust_2018_idioms,
    unused_qualifications
)]
#![warn(unreachable_pub, rustdoc::missing_crate_level_docs)]
#![allow(
    clippy::items_after_statements,
    clippy::missing_errors_doc,
    clippy::module_name_repetitions,
    clippy::must_use_candidate
)]

pub mod config;
mod error;
pub mod logging;
mod middleware;
mod models;
mod net;
mod routes;
mod state;

pub use crate::{
    config::WebApiConfig,
    error::application::{ApplicationError, Error},
    net::run,
};

/// The prefixes of the environment variables which configure the web api.
pub const APPLICATION_NAMES: [&str; 1] = ["DESIGNER_BFF"];
