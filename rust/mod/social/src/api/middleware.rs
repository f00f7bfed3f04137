use axum::extract::State;
use axum::http::{Request, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::{middleware::Next, Json};
use serde_json::json;

use crate::api::AppState;

/// Paths that don't require authentication. `/social/v1/users` covers
/// the public user list and registration; it must stay an exact match so
/// `/social/v1/users/follow` still requires a token.
const PUBLIC_PATHS: &[&str] = &["/social/v1/login", "/social/v1/users"];

/// Prefixes that don't require authentication (served images).
const PUBLIC_PREFIXES: &[&str] = &["/media/"];

/// JWT authentication middleware.
///
/// Checks for a Bearer token in the Authorization header. If valid,
/// stores Claims as an Extension for handlers to access via
/// `Extension<Claims>`.
pub async fn auth_middleware(
    State(svc): State<AppState>,
    mut req: Request<axum::body::Body>,
    next: Next,
) -> Response {
    let path = req.uri().path().to_string();

    if is_public_path(&path) {
        return next.run(req).await;
    }

    let token = match extract_bearer(req.headers()) {
        Some(t) => t.to_string(),
        None => {
            return (
                StatusCode::UNAUTHORIZED,
                Json(json!({"error": "missing authorization header"})),
            )
                .into_response();
        }
    };

    match svc.verify_token(&token) {
        Ok(claims) => {
            req.extensions_mut().insert(claims);
            next.run(req).await
        }
        Err(e) => (
            StatusCode::UNAUTHORIZED,
            Json(json!({"error": e.to_string()})),
        )
            .into_response(),
    }
}

/// Extract the Bearer token from the Authorization header.
fn extract_bearer(headers: &axum::http::HeaderMap) -> Option<&str> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
}

/// Check if a path is public (no auth required).
fn is_public_path(path: &str) -> bool {
    if PUBLIC_PATHS.contains(&path) {
        return true;
    }
    PUBLIC_PREFIXES
        .iter()
        .any(|prefix| path.starts_with(prefix))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_paths() {
        assert!(is_public_path("/social/v1/login"));
        assert!(is_public_path("/social/v1/users"));
        assert!(is_public_path("/media/posts/abc"));
    }

    #[test]
    fn test_protected_paths() {
        assert!(!is_public_path("/social/v1/posts"));
        assert!(!is_public_path("/social/v1/images"));
        // Nested under /users, but still a mutation on the follow graph.
        assert!(!is_public_path("/social/v1/users/follow"));
    }
}
