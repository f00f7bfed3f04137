use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde::Deserialize;

use picstream_core::ServiceError;

use crate::api::AppState;
use crate::model::LoginResponse;

/// Login request body.
#[derive(Debug, Deserialize)]
struct LoginRequest {
    username: String,
    password: String,
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/login", post(login))
}

/// POST /social/v1/login — verify credentials, return a Bearer token.
async fn login(
    State(svc): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ServiceError> {
    let token = svc
        .login(&body.username, &body.password)
        .map_err(ServiceError::from)?;
    Ok(Json(token))
}
