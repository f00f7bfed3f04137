use axum::extract::{Extension, State};
use axum::routing::put;
use axum::{Json, Router};
use serde::Deserialize;

use picstream_core::ServiceError;

use crate::api::AppState;
use crate::model::Claims;

/// Request body for like/unlike.
#[derive(Debug, Deserialize)]
struct LikeRequest {
    post_ref: String,
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/posts/like", put(like_post).delete(unlike_post))
}

/// PUT /social/v1/posts/like — like a post by reference token.
async fn like_post(
    State(svc): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(body): Json<LikeRequest>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    svc.like(&claims.sub, &body.post_ref)
        .map_err(ServiceError::from)?;
    Ok(Json(serde_json::json!({"ok": true})))
}

/// DELETE /social/v1/posts/like — remove a like.
async fn unlike_post(
    State(svc): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(body): Json<LikeRequest>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    svc.unlike(&claims.sub, &body.post_ref)
        .map_err(ServiceError::from)?;
    Ok(Json(serde_json::json!({"ok": true})))
}
