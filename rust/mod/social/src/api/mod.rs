mod follow;
mod images;
mod like;
mod login;
mod media;
mod middleware;
mod posts;
mod users;

use std::sync::Arc;

use axum::Router;

use crate::service::SocialService;

/// Shared application state.
pub type AppState = Arc<SocialService>;

/// Build the complete social API router.
///
/// API routes live under `/social/v1`; uploaded images are served under
/// `/media`. Bearer-token auth applies to everything except the public
/// paths (login, user list/registration, media).
pub fn build_router(svc: Arc<SocialService>) -> Router {
    let api = Router::new()
        .merge(login::routes())
        .merge(users::routes())
        .merge(follow::routes())
        .merge(posts::routes())
        .merge(like::routes())
        .merge(images::routes());

    Router::new()
        .nest("/social/v1", api)
        .merge(media::routes())
        .layer(axum::middleware::from_fn_with_state(
            svc.clone(),
            middleware::auth_middleware,
        ))
        .with_state(svc)
}
