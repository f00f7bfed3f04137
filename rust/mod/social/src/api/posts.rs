use axum::extract::{Extension, Multipart, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};

use picstream_core::{ListParams, ListResult, ServiceError};

use crate::api::AppState;
use crate::model::{Claims, PostView};

pub fn routes() -> Router<AppState> {
    Router::new().route("/posts", get(list_posts).post(create_post))
}

/// GET /social/v1/posts — all posts, most-liked first.
async fn list_posts(
    State(svc): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<ListResult<PostView>>, ServiceError> {
    let result = svc.list_posts(&params).map_err(ServiceError::from)?;
    Ok(Json(result))
}

/// POST /social/v1/posts — create a post from a multipart form with a
/// `caption` text field and an `image` file field. The author is the
/// authenticated user; the reference token is generated server-side.
async fn create_post(
    State(svc): State<AppState>,
    Extension(claims): Extension<Claims>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<PostView>), ServiceError> {
    let mut caption: Option<String> = None;
    let mut content_type = "application/octet-stream".to_string();
    let mut image: Option<Vec<u8>> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ServiceError::Validation(format!("invalid multipart body: {}", e)))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("caption") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| ServiceError::Validation(format!("invalid caption field: {}", e)))?;
                caption = Some(text);
            }
            Some("image") => {
                if let Some(ct) = field.content_type() {
                    content_type = ct.to_string();
                }
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ServiceError::Validation(format!("invalid image field: {}", e)))?;
                image = Some(bytes.to_vec());
            }
            _ => {}
        }
    }

    let caption =
        caption.ok_or_else(|| ServiceError::Validation("missing 'caption' field".into()))?;
    let image = image.ok_or_else(|| ServiceError::Validation("missing 'image' field".into()))?;

    let post = svc
        .create_post(&claims.sub, &caption, &content_type, image)
        .map_err(ServiceError::from)?;

    let view = PostView::build(post, claims.username.clone(), 0);
    Ok((StatusCode::CREATED, Json(view)))
}
