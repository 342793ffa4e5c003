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

use std::{fmt::Debug, future::Future};

use actix_web::{
    body::{BoxBody, MessageBody},
    dev::{Service, ServiceRequest, ServiceResponse},
    http::header::CONTENT_TYPE,
    HttpResponse,
};
use serde_json::{json, Value};

use crate::error::json_error::with_json_body;

/// Renders plain text error responses of actix itself, like failed json extraction, as json.
pub(crate) fn wrap_non_json_errors<S, B>(
    request: ServiceRequest,
    service: &S,
) -> impl Future<Output = Result<ServiceResponse<BoxBody>, actix_web::Error>> + 'static
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error>,
    S::Future: 'static,
    B: MessageBody + Debug + 'static,
{
    let response = service.call(request);
    // endpoints turn their errors into responses, only middleware errors are left as errors
    async move { response.await.map(wrap_service_response) }
}

fn wrap_service_response<B>(response: ServiceResponse<B>) -> ServiceResponse<BoxBody>
where
    B: MessageBody + Debug + 'static,
{
    if is_wrappable_error(response.response()) {
        let (request, response) = response.into_parts();
        let (response, body) = response.into_parts();
        let details = extract_message_as_details(body);
        let kind = response.status().as_str().to_string();
        let response = with_json_body(response, &kind, &details);
        ServiceResponse::new(request, response)
    } else {
        response.map_into_boxed_body()
    }
}

fn is_wrappable_error<B>(response: &HttpResponse<B>) -> bool {
    let status = response.status();
    (status.is_client_error() || status.is_server_error())
        && response
            .headers()
            .get(CONTENT_TYPE)
            .map_or(true, |content_type| {
                let mime = b"text/plain".as_slice();
                let bytes = content_type.as_ref();
                bytes == mime || (bytes.starts_with(mime) && bytes.get(mime.len()) == Some(&b';'))
            })
}

fn extract_message_as_details(body: impl MessageBody + Debug) -> Value {
    let opt_bytes = body.try_into_bytes().ok();
    opt_bytes
        .as_deref()
        .and_then(|bytes| std::str::from_utf8(bytes).ok())
        .filter(|msg| !msg.is_empty())
        .map_or(Value::Null, |msg| json!({ "message": msg }))
}
