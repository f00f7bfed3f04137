use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};

use picstream_core::{ListParams, ListResult, ServiceError};

use crate::api::AppState;
use crate::model::{CreateUser, UserSummary};

pub fn routes() -> Router<AppState> {
    Router::new().route("/users", get(list_users).post(create_user))
}

/// GET /social/v1/users — all users with follower/following counts.
async fn list_users(
    State(svc): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<ListResult<UserSummary>>, ServiceError> {
    let result = svc.list_users(&params).map_err(ServiceError::from)?;
    Ok(Json(result))
}

/// POST /social/v1/users — register a new user.
async fn create_user(
    State(svc): State<AppState>,
    Json(input): Json<CreateUser>,
) -> Result<(StatusCode, Json<UserSummary>), ServiceError> {
    let user = svc.create_user(input).map_err(ServiceError::from)?;
    let summary = svc.user_summary(&user).map_err(ServiceError::from)?;
    Ok((StatusCode::CREATED, Json(summary)))
}
