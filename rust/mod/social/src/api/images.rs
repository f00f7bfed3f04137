use axum::extract::{Extension, State};
use axum::routing::get;
use axum::{Json, Router};

use picstream_core::ServiceError;

use crate::api::AppState;
use crate::model::Claims;

pub fn routes() -> Router<AppState> {
    Router::new().route("/images", get(list_images))
}

/// GET /social/v1/images — images from users the caller follows,
/// oldest first.
async fn list_images(
    State(svc): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let items = svc.list_feed(&claims.sub).map_err(ServiceError::from)?;
    Ok(Json(serde_json::json!({"items": items})))
}
