use axum::extract::{Request, State};
use axum::http::{HeaderValue, Method, header};
use axum::middleware::Next;
use axum::response::Response;
use campuspay_core::{ActorIdentity, AppError};
use tower_sessions::Session;

use crate::auth::SESSION_ACTOR_KEY;
use crate::error::ApiResult;
use crate::state::AppState;

/// Rejects unauthenticated API requests with 401.
///
/// Dispatch routes do NOT use this layer: their contract is to redirect an
/// absent session to sign-in, not to answer with a status code.
pub async fn require_auth(
    session: Session,
    mut request: Request,
    next: Next,
) -> ApiResult<Response> {
    let identity = session
        .get::<ActorIdentity>(SESSION_ACTOR_KEY)
        .await
        .map_err(|error| AppError::Internal(format!("failed to read session identity: {error}")))?
        .ok_or_else(|| AppError::Unauthorized("authentication required".to_owned()))?;

    request.extensions_mut().insert(identity);
    Ok(next.run(request).await)
}

/// Blocks cross-origin mutations against the configured frontend origin.
pub async fn require_same_origin_for_mutations(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> ApiResult<Response> {
    if !is_state_changing_method(request.method()) {
        return Ok(next.run(request).await);
    }

    let headers = request.headers();

    if headers
        .get("sec-fetch-site")
        .is_some_and(|value| value == HeaderValue::from_static("cross-site"))
    {
        return Err(AppError::Unauthorized("cross-site request blocked".to_owned()).into());
    }

    let origin_matches = headers
        .get(header::ORIGIN)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|origin| origin == state.frontend_url);
    let referer_matches = headers
        .get(header::REFERER)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|referer| referer.starts_with(&state.frontend_url));

    if !origin_matches && !referer_matches {
        return Err(AppError::Unauthorized("origin validation failed".to_owned()).into());
    }

    Ok(next.run(request).await)
}

fn is_state_changing_method(method: &Method) -> bool {
    matches!(
        *method,
        Method::POST | Method::PUT | Method::PATCH | Method::DELETE
    )
}
