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

use actix_web::{
    http::{
        header::{ContentType, HeaderValue, CONTENT_TYPE},
        StatusCode,
    },
    HttpResponse,
};
use serde_json::{json, Value};

fn encode(kind: &str, details: &Value) -> Vec<u8> {
    json!({ "kind": kind, "details": details })
        .to_string()
        .into_bytes()
}

/// Creates a json error response.
pub(crate) fn error_response(status: StatusCode, kind: &str, details: &Value) -> HttpResponse {
    HttpResponse::build(status)
        .content_type(ContentType::json())
        .body(encode(kind, details))
}

/// Replaces the body of an error response by a json error body, the status is kept.
pub(crate) fn with_json_body<B>(response: HttpResponse<B>, kind: &str, details: &Value) -> HttpResponse {
    let mut response = response.set_body(encode(kind, details)).map_into_boxed_body();
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    response
}
