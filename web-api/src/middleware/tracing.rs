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

use std::future::Future;

use actix_web::dev::{Service, ServiceRequest, ServiceResponse};
use tracing::{debug, error_span, trace, Instrument};

/// Wraps every request into a tracing span and logs the response status.
///
/// The request span must have the lowest level, otherwise it isn't added to the logs if a
/// subscriber with a lower level filter than the span level is used.
pub(crate) fn tracing_log_request<S, B>(
    request: ServiceRequest,
    service: &S,
) -> impl Future<Output = Result<ServiceResponse<B>, actix_web::Error>> + 'static
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error>,
    S::Future: 'static,
    B: 'static,
{
    let span = error_span!(
        "request",
        path = %request.path(),
        method = %request.method(),
    );
    trace!(parent: &span, "request received");
    let response = span.in_scope(|| service.call(request));

    async move {
        let response = response.await;
        match &response {
            Ok(response) => debug!(status = %response.status(), "request processed"),
            Err(error) => debug!(%error, "request failed"),
        }
        response
    }
    .instrument(span)
}
