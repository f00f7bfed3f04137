use axum::extract::{Path, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;

use picstream_core::ServiceError;

use crate::api::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/media/{*key}", get(serve_image))
}

/// GET /media/{key} — raw image bytes with the stored MIME type.
async fn serve_image(
    State(svc): State<AppState>,
    Path(key): Path<String>,
) -> Result<Response, ServiceError> {
    let (bytes, content_type) = svc.get_image(&key).map_err(ServiceError::from)?;
    Ok(([(header::CONTENT_TYPE, content_type)], bytes).into_response())
}
