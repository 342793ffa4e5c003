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

use std::borrow::Cow;

use derive_more::From;
use designer_bff_feedback::StoreError;
use displaydoc::Display;
use serde::Serialize;
use thiserror::Error;

use crate::{impl_application_error, Error};

/// Malformed user id.
#[derive(Debug, Error, Display, Serialize)]
pub(crate) struct InvalidUserId {
    pub(crate) id: String,
}

impl_application_error!(InvalidUserId => BAD_REQUEST);

/// Malformed category.
#[derive(Debug, Error, Display, Serialize)]
pub(crate) struct InvalidCategory {
    pub(crate) id: String,
}

impl_application_error!(InvalidCategory => BAD_REQUEST);

/// Custom error for 400 Bad Request status code.
#[derive(Debug, Error, Display, Serialize, From)]
pub(crate) struct BadRequest {
    pub(crate) message: Cow<'static, str>,
}

impl_application_error!(BadRequest => BAD_REQUEST);

impl From<&'static str> for BadRequest {
    fn from(message: &'static str) -> Self {
        Self {
            message: Cow::Borrowed(message),
        }
    }
}

impl From<String> for BadRequest {
    fn from(message: String) -> Self {
        Self {
            message: Cow::Owned(message),
        }
    }
}

/// The counter store is temporarily unavailable.
#[derive(Debug, Error, Display, Serialize)]
pub(crate) struct CounterStoreUnavailable;

impl_application_error!(CounterStoreUnavailable => SERVICE_UNAVAILABLE);

impl From<StoreError> for Error {
    fn from(error: StoreError) -> Self {
        tracing::error!(%error, "feedback store failed");
        match error {
            StoreError::Unavailable(_) => CounterStoreUnavailable.into(),
        }
    }
}
