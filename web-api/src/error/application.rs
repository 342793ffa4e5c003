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

use actix_web::{body::BoxBody, http::StatusCode, HttpResponse, ResponseError};
use derive_more::Display;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, error};

use super::json_error::error_response;

/// An error of an endpoint, rendered as `{"kind": .., "details": ..}`.
#[derive(Display, Debug, Error)]
#[display(fmt = "{}", _0)]
pub struct Error(Box<dyn ApplicationError>);

impl<T> From<T> for Error
where
    T: ApplicationError,
{
    fn from(error: T) -> Self {
        Self(Box::new(error))
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        self.0.status_code()
    }

    fn error_response(&self) -> HttpResponse<BoxBody> {
        let status = self.0.status_code();
        if status.is_server_error() {
            error!(error = %self.0, kind = self.0.kind(), "request failed");
        } else {
            debug!(error = %self.0, kind = self.0.kind(), "request rejected");
        }
        error_response(status, self.0.kind(), &self.0.encode_details())
    }
}

pub trait ApplicationError: std::error::Error + Send + Sync + 'static {
    fn status_code(&self) -> StatusCode;
    fn kind(&self) -> &str;
    fn encode_details(&self) -> Value;
}

/// Implements `ApplicationError` for the type with the status code, the type name is the kind and
/// its serialization the details.
#[macro_export]
macro_rules! impl_application_error {
    ($name:ident => $code:ident) => {
        impl $crate::error::application::ApplicationError for $name {
            fn status_code(&self) -> ::actix_web::http::StatusCode {
                ::actix_web::http::StatusCode::$code
            }

            fn kind(&self) -> &str {
                stringify!($name)
            }

            fn encode_details(&self) -> ::serde_json::Value {
                ::serde_json::to_value(self).unwrap_or_else(|error| {
                    ::tracing::error!(%error, kind = stringify!($name), "encoding error details failed");
                    ::serde_json::Value::Null
                })
            }
        }
    };
}
