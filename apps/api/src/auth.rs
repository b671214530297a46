//! Session establishment and resolution.
//!
//! The session cookie is the only credential this layer understands; token
//! validation belongs to the identity provider behind `SessionService`.

use axum::Json;
use axum::extract::{Extension, State};
use axum::http::{HeaderMap, StatusCode};
use campuspay_application::{SessionOutcome, SignInOutcome};
use campuspay_core::{ActorIdentity, AppError};
use tower_sessions::Session;

use crate::dto::{ActorIdentityResponse, SignInRequest, SignInResponse};
use crate::error::ApiResult;
use crate::state::AppState;

pub const SESSION_ACTOR_KEY: &str = "actor_identity";
/// Absolute session creation timestamp for absolute timeout enforcement.
pub const SESSION_CREATED_AT_KEY: &str = "session_created_at";

/// Resolves the request's session credential into an actor identity.
///
/// A store read failure is collapsed into `Absent`: the actor is sent
/// through the ordinary sign-in redirect rather than shown an error. The
/// warning below is the only trace that distinguishes an outage from a
/// plain signed-out request.
pub async fn resolve_session(session: &Session) -> SessionOutcome {
    match session.get::<ActorIdentity>(SESSION_ACTOR_KEY).await {
        Ok(Some(identity)) => SessionOutcome::Authenticated(identity),
        Ok(None) => SessionOutcome::Absent,
        Err(error) => {
            tracing::warn!(%error, "session store read failed; treating request as unauthenticated");
            SessionOutcome::Absent
        }
    }
}

/// POST /auth/session - Exchange a provider access token for a session.
pub async fn sign_in_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    session: Session,
    Json(payload): Json<SignInRequest>,
) -> ApiResult<Json<SignInResponse>> {
    let (ip_address, user_agent) = extract_request_context(&headers);

    let outcome = state
        .session_service
        .sign_in(&payload.access_token, ip_address, user_agent)
        .await?;

    match outcome {
        SignInOutcome::Authenticated(identity) => {
            // Regenerate the session id on privilege change.
            session
                .cycle_id()
                .await
                .map_err(|error| AppError::Internal(format!("failed to cycle session id: {error}")))?;

            session
                .insert(SESSION_ACTOR_KEY, &identity)
                .await
                .map_err(|error| {
                    AppError::Internal(format!("failed to persist session identity: {error}"))
                })?;

            session
                .insert(SESSION_CREATED_AT_KEY, chrono::Utc::now().timestamp())
                .await
                .map_err(|error| {
                    AppError::Internal(format!("failed to persist session creation time: {error}"))
                })?;

            Ok(Json(SignInResponse {
                status: "authenticated",
            }))
        }
        SignInOutcome::Rejected => {
            // Generic message for every failure case.
            Err(AppError::Unauthorized("invalid access token".to_owned()).into())
        }
    }
}

/// POST /auth/signout - Destroy the session.
pub async fn sign_out_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    session: Session,
) -> ApiResult<StatusCode> {
    let subject = match resolve_session(&session).await {
        SessionOutcome::Authenticated(identity) => Some(identity.subject().to_owned()),
        SessionOutcome::Absent => None,
    };

    session
        .delete()
        .await
        .map_err(|error| AppError::Internal(format!("failed to delete session: {error}")))?;

    let (ip_address, user_agent) = extract_request_context(&headers);
    state
        .session_service
        .sign_out(subject, ip_address, user_agent)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// GET /auth/me - Return the authenticated actor (requires auth).
pub async fn me_handler(
    Extension(identity): Extension<ActorIdentity>,
) -> ApiResult<Json<ActorIdentityResponse>> {
    Ok(Json(ActorIdentityResponse::from(identity)))
}

pub fn extract_request_context(headers: &HeaderMap) -> (Option<String>, Option<String>) {
    let ip_address = headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(ToOwned::to_owned);

    let user_agent = headers
        .get("user-agent")
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty())
        .map(ToOwned::to_owned);

    (ip_address, user_agent)
}
