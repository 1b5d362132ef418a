use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Value};
use tracing::error;

use crate::provider::link_token::LinkTokenError;
use crate::server::server::AppState;
use crate::server::validation::{body_rejection, validate_link_token_body};

pub const UNAVAILABLE_MSG: &str = "Service unavailable at the moment. Please try again later.";
pub const INTERNAL_ERROR_MSG: &str = "An internal exception occured. Please try again later.";

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Create a link token which the client side uses to start the Link flow.
pub async fn create_user_token(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Response {
    let body = match body {
        Ok(Json(body)) => body,
        Err(rejection) => {
            let errors = vec![body_rejection(&rejection)];
            return (StatusCode::BAD_REQUEST, Json(json!({ "errors": errors }))).into_response();
        }
    };
    let input = match validate_link_token_body(&body) {
        Ok(input) => input,
        Err(errors) => {
            return (StatusCode::BAD_REQUEST, Json(json!({ "errors": errors }))).into_response();
        }
    };

    let cancel = state.shutdown.child_token();
    match state
        .link_tokens
        .create_link_token(&input.country_codes, &input.products, &cancel)
        .await
    {
        Ok(response) => Json(response).into_response(),
        Err(LinkTokenError::Config(e)) => {
            error!("Internal Exception: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR_MSG).into_response()
        }
        // don't show internal error
        Err(LinkTokenError::Unavailable) | Err(LinkTokenError::Cancelled) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "error": UNAVAILABLE_MSG })),
        )
            .into_response(),
    }
}
