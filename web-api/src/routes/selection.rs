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
    web::{self, Data, Json, ServiceConfig},
    Responder,
};
use designer_bff_selection::{Candidate, CandidateId, DiversityMetrics};
use serde::{Deserialize, Serialize};

use crate::{error::common::BadRequest, state::AppState, Error};

pub(super) fn configure_service(config: &mut ServiceConfig) {
    config.service(web::resource("/select").route(web::post().to(select)));
}

#[derive(Debug, Deserialize)]
struct SelectRequest {
    candidates: Vec<Candidate>,
    #[serde(default)]
    k: Option<i64>,
}

#[derive(Debug, Serialize)]
struct SelectResponse {
    selected: Vec<CandidateId>,
    rejected: Vec<CandidateId>,
    metrics: DiversityMetrics,
}

async fn select(
    state: Data<AppState>,
    Json(request): Json<SelectRequest>,
) -> Result<impl Responder, Error> {
    let api = &state.config.api;
    if request.candidates.len() > api.max_candidates {
        return Err(BadRequest::from(format!(
            "too many candidates, at most {} are allowed",
            api.max_candidates,
        ))
        .into());
    }
    let k = match request.k {
        None => api.default_k,
        Some(k) => usize::try_from(k.max(0)).unwrap_or(usize::MAX),
    };
    if k > api.max_k {
        return Err(BadRequest::from(format!("k must be at most {}", api.max_k)).into());
    }

    let result = state.selector.select(&request.candidates, k);

    Ok(Json(SelectResponse {
        selected: result.selected_ids,
        rejected: result.rejected_ids,
        metrics: result.metrics,
    }))
}

#[cfg(test)]
mod tests {
    use actix_web::{http::StatusCode, test, App};
    use serde_json::{json, Value};

    use super::*;
    use crate::{config::WebApiConfig, middleware::json_error::wrap_non_json_errors};

    fn pool() -> Value {
        json!([
            { "id": "a", "qualityScore": 90, "attributes": { "garmentType": "dress" } },
            { "id": "b", "qualityScore": 85, "attributes": { "garmentType": "dress" } },
            { "id": "c", "qualityScore": 60, "attributes": { "garmentType": "pants" } },
        ])
    }

    #[actix_web::test]
    async fn test_select() {
        let app = test::init_service(
            App::new()
                .app_data(Data::new(AppState::create(WebApiConfig::default())))
                .configure(configure_service)
                .wrap_fn(wrap_non_json_errors),
        )
        .await;

        let request = test::TestRequest::post()
            .uri("/select")
            .set_json(json!({ "candidates": pool(), "k": 2 }))
            .to_request();
        let response: Value = test::call_and_read_body_json(&app, request).await;

        assert_eq!(response["selected"], json!(["a", "c"]));
        assert_eq!(response["rejected"], json!(["b"]));
        assert_eq!(response["metrics"]["attributeCoverage"]["garmentType"]["coveredValues"], 2);
    }

    #[actix_web::test]
    async fn test_select_defaults_and_clamps_k() {
        let app = test::init_service(
            App::new()
                .app_data(Data::new(AppState::create(WebApiConfig::default())))
                .configure(configure_service),
        )
        .await;

        let request = test::TestRequest::post()
            .uri("/select")
            .set_json(json!({ "candidates": pool() }))
            .to_request();
        let response: Value = test::call_and_read_body_json(&app, request).await;
        assert_eq!(response["selected"].as_array().map(Vec::len), Some(3));

        let request = test::TestRequest::post()
            .uri("/select")
            .set_json(json!({ "candidates": pool(), "k": -3 }))
            .to_request();
        let response: Value = test::call_and_read_body_json(&app, request).await;
        assert_eq!(response["selected"], json!([]));
        assert_eq!(response["rejected"], json!(["a", "b", "c"]));
    }

    #[actix_web::test]
    async fn test_select_rejects_large_k() {
        let app = test::init_service(
            App::new()
                .app_data(Data::new(AppState::create(WebApiConfig::default())))
                .configure(configure_service),
        )
        .await;

        let request = test::TestRequest::post()
            .uri("/select")
            .set_json(json!({ "candidates": pool(), "k": 1_000 }))
            .to_request();
        let response = test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(response).await;
        assert_eq!(body["kind"], "BadRequest");
    }

    #[actix_web::test]
    async fn test_malformed_body_is_json_error() {
        let app = test::init_service(
            App::new()
                .app_data(Data::new(AppState::create(WebApiConfig::default())))
                .configure(configure_service)
                .wrap_fn(wrap_non_json_errors),
        )
        .await;

        let request = test::TestRequest::post()
            .uri("/select")
            .insert_header(("content-type", "application/json"))
            .set_payload("{ not json")
            .to_request();
        let response = test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(response).await;
        assert_eq!(body["kind"], "400");
    }
}
