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
    web::{self, Data, Json, Path, ServiceConfig},
    HttpResponse,
    Responder,
};
use chrono::Utc;
use designer_bff_feedback::Feedback;
use serde::{Deserialize, Serialize};

use crate::{
    models::{Category, UserId},
    state::AppState,
    Error,
};

pub(super) fn configure_service(config: &mut ServiceConfig) {
    let users = web::scope("/users/{user_id}")
        .service(web::resource("feedback").route(web::post().to(feedback)))
        .service(
            web::resource("attributes/{category}/select").route(web::post().to(select_attribute)),
        )
        .service(web::resource("tokens/{category}/select").route(web::get().to(select_token)))
        .service(web::resource("categories/{category}/decay").route(web::post().to(decay)));

    config.service(users);
}

async fn feedback(
    state: Data<AppState>,
    user_id: Path<String>,
    Json(feedback): Json<Feedback>,
) -> Result<impl Responder, Error> {
    let user_id = UserId::new(user_id.into_inner())?;
    for category in feedback.tokens.keys().chain(feedback.attributes.keys()) {
        Category::new(category.as_str())?;
    }
    let summary = state
        .learner
        .process_feedback(user_id.as_str(), &feedback, Utc::now())
        .await?;

    Ok(Json(summary))
}

#[derive(Debug, Default, Deserialize)]
struct SelectAttributeRequest {
    #[serde(default)]
    values: Vec<String>,
}

#[derive(Debug, Serialize)]
struct SelectAttributeResponse {
    value: Option<String>,
}

async fn select_attribute(
    state: Data<AppState>,
    path: Path<(String, String)>,
    Json(request): Json<SelectAttributeRequest>,
) -> Result<impl Responder, Error> {
    let (user_id, category) = path.into_inner();
    let user_id = UserId::new(user_id)?;
    let category = Category::new(category)?;
    let value = state
        .learner
        .select_attribute(
            user_id.as_str(),
            category.as_str(),
            &request.values,
            Utc::now(),
            &mut rand::thread_rng(),
        )
        .await?;

    Ok(Json(SelectAttributeResponse { value }))
}

#[derive(Debug, Serialize)]
struct SelectTokenResponse {
    token: Option<String>,
}

async fn select_token(
    state: Data<AppState>,
    path: Path<(String, String)>,
) -> Result<impl Responder, Error> {
    let (user_id, category) = path.into_inner();
    let user_id = UserId::new(user_id)?;
    let category = Category::new(category)?;
    let token = state
        .learner
        .select_token(user_id.as_str(), category.as_str(), &mut rand::thread_rng())
        .await?;

    Ok(Json(SelectTokenResponse { token }))
}

/// Decays the learned preferences of a user's category up to now.
async fn decay(
    state: Data<AppState>,
    path: Path<(String, String)>,
) -> Result<impl Responder, Error> {
    let (user_id, category) = path.into_inner();
    let user_id = UserId::new(user_id)?;
    let category = Category::new(category)?;
    state
        .learner
        .decay(user_id.as_str(), category.as_str(), Utc::now())
        .await?;

    Ok(HttpResponse::NoContent())
}

#[cfg(test)]
mod tests {
    use actix_web::{dev::ServiceResponse, http::StatusCode, test, App};
    use designer_bff_feedback::FeedbackConfig;
    use designer_bff_test_utils::assert_approx_eq;
    use serde_json::{json, Value};

    use super::*;
    use crate::config::WebApiConfig;

    fn state() -> Data<AppState> {
        let mut config = WebApiConfig::default();
        // deterministic choices
        config.feedback = FeedbackConfig::default()
            .with_exploration_rate(0.)
            .and_then(|config| config.with_token_epsilon(0.))
            .unwrap();
        Data::new(AppState::create(config))
    }

    async fn json_body(response: ServiceResponse) -> Value {
        test::read_body_json(response).await
    }

    #[actix_web::test]
    async fn test_feedback_updates_weights() {
        let app = test::init_service(App::new().app_data(state()).configure(configure_service)).await;

        let request = test::TestRequest::post()
            .uri("/users/designer-1/feedback")
            .set_json(json!({
                "kind": "share",
                "tokens": { "fabric": ["linen"] },
                "attributes": { "fabrication": "linen" },
            }))
            .to_request();
        let response = test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::OK);
        let summary = json_body(response).await;
        assert_eq!(summary["reward"], json!(1.5));
        let weight = summary["tokenWeights"]["fabric"]["linen"]["weight"]
            .as_f64()
            .unwrap();
        assert_approx_eq!(f64, weight, 1.05, epsilon = 1e-6);

        let request = test::TestRequest::get()
            .uri("/users/designer-1/tokens/fabric/select")
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, request).await;
        assert_eq!(body, json!({ "token": "linen" }));
    }

    #[actix_web::test]
    async fn test_select_attribute() {
        let app = test::init_service(App::new().app_data(state()).configure(configure_service)).await;

        for _ in 0..10 {
            let request = test::TestRequest::post()
                .uri("/users/designer-1/feedback")
                .set_json(json!({ "kind": "like", "attributes": { "fabrication": "silk" } }))
                .to_request();
            assert_eq!(test::call_service(&app, request).await.status(), StatusCode::OK);
        }

        let request = test::TestRequest::post()
            .uri("/users/designer-1/attributes/fabrication/select")
            .set_json(json!({}))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, request).await;
        assert_eq!(body, json!({ "value": "silk" }));

        let request = test::TestRequest::post()
            .uri("/users/someone-else/attributes/fabrication/select")
            .set_json(json!({}))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, request).await;
        assert_eq!(body, json!({ "value": null }));
    }

    #[actix_web::test]
    async fn test_unknown_tokens_select_nothing() {
        let app = test::init_service(App::new().app_data(state()).configure(configure_service)).await;

        let request = test::TestRequest::get()
            .uri("/users/designer-1/tokens/color/select")
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, request).await;
        assert_eq!(body, json!({ "token": null }));
    }

    #[actix_web::test]
    async fn test_invalid_user_id() {
        let app = test::init_service(App::new().app_data(state()).configure(configure_service)).await;

        let request = test::TestRequest::get()
            .uri("/users/not!valid/tokens/color/select")
            .to_request();
        let response = test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["kind"], "InvalidUserId");
        assert_eq!(body["details"], json!({ "id": "not!valid" }));
    }

    #[actix_web::test]
    async fn test_invalid_category_in_feedback() {
        let app = test::init_service(App::new().app_data(state()).configure(configure_service)).await;

        let request = test::TestRequest::post()
            .uri("/users/designer-1/feedback")
            .set_json(json!({ "kind": "like", "tokens": { "garment type": ["dress"] } }))
            .to_request();
        let response = test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["kind"], "InvalidCategory");
        assert_eq!(body["details"], json!({ "id": "garment type" }));

        // nothing was learned from the rejected feedback
        let request = test::TestRequest::post()
            .uri("/users/designer-1/feedback")
            .set_json(json!({
                "kind": "like",
                "tokens": { "fabric": ["linen"] },
                "attributes": { "garment type": "dress" },
            }))
            .to_request();
        assert_eq!(test::call_service(&app, request).await.status(), StatusCode::BAD_REQUEST);
        let request = test::TestRequest::get()
            .uri("/users/designer-1/tokens/fabric/select")
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, request).await;
        assert_eq!(body, json!({ "token": null }));
    }

    #[actix_web::test]
    async fn test_decay() {
        let app = test::init_service(App::new().app_data(state()).configure(configure_service)).await;

        let request = test::TestRequest::post()
            .uri("/users/designer-1/feedback")
            .set_json(json!({ "kind": "save", "tokens": { "fabric": ["silk"] } }))
            .to_request();
        assert_eq!(test::call_service(&app, request).await.status(), StatusCode::OK);

        let request = test::TestRequest::post()
            .uri("/users/designer-1/categories/fabric/decay")
            .to_request();
        assert_eq!(test::call_service(&app, request).await.status(), StatusCode::NO_CONTENT);

        let request = test::TestRequest::post()
            .uri("/users/designer-1/categories/bad!category/decay")
            .to_request();
        assert_eq!(test::call_service(&app, request).await.status(), StatusCode::BAD_REQUEST);
    }
}
