use axum::extract::{Extension, State};
use axum::routing::put;
use axum::{Json, Router};
use serde::Deserialize;

use picstream_core::ServiceError;

use crate::api::AppState;
use crate::model::Claims;

/// Request body for follow/unfollow.
#[derive(Debug, Deserialize)]
struct FollowRequest {
    username: String,
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/users/follow", put(follow_user).delete(unfollow_user))
}

/// PUT /social/v1/users/follow — follow a user by username.
async fn follow_user(
    State(svc): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(body): Json<FollowRequest>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    svc.follow(&claims.sub, &body.username)
        .map_err(ServiceError::from)?;
    Ok(Json(serde_json::json!({"ok": true})))
}

/// DELETE /social/v1/users/follow — stop following a user.
async fn unfollow_user(
    State(svc): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(body): Json<FollowRequest>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    svc.unfollow(&claims.sub, &body.username)
        .map_err(ServiceError::from)?;
    Ok(Json(serde_json::json!({"ok": true})))
}
