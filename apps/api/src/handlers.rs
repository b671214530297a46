//! Dashboard dispatch and sign-in-page handlers.

use axum::Json;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Redirect, Response};
use campuspay_application::{DispatchOutcome, ProfileErrorReason};
use campuspay_domain::{Namespace, RedirectTarget, RequestedTarget};
use serde::Deserialize;
use tower_sessions::Session;

use crate::auth::{extract_request_context, resolve_session};
use crate::dto::{
    AccessDeniedResponse, DashboardResponse, HealthResponse, ProfileErrorResponse,
    SignInPageResponse,
};
use crate::error::ApiResult;
use crate::state::AppState;

/// GET / - Route the actor to its landing page.
pub async fn root_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    session: Session,
) -> ApiResult<Response> {
    dispatch_to(state, headers, session, RequestedTarget::Root).await
}

/// GET /dashboard - Self-service dashboard dispatch.
pub async fn dashboard_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    session: Session,
) -> ApiResult<Response> {
    dispatch_to(
        state,
        headers,
        session,
        RequestedTarget::Namespace(Namespace::SelfService),
    )
    .await
}

/// GET /admin, /admin/employees - Administrative namespace dispatch.
pub async fn admin_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    session: Session,
) -> ApiResult<Response> {
    dispatch_to(
        state,
        headers,
        session,
        RequestedTarget::Namespace(Namespace::Administrative),
    )
    .await
}

async fn dispatch_to(
    state: AppState,
    headers: HeaderMap,
    session: Session,
    requested: RequestedTarget,
) -> ApiResult<Response> {
    let session_outcome = resolve_session(&session).await;
    let (ip_address, user_agent) = extract_request_context(&headers);

    let outcome = state
        .dispatch_service
        .dispatch(session_outcome, requested, ip_address, user_agent)
        .await?;

    Ok(respond(outcome))
}

/// Maps a dispatch decision to its HTTP rendering.
///
/// Routine denials (sign-in redirect, access denied) are logged below
/// error level; only the fail-closed profile terminals are errors.
fn respond(outcome: DispatchOutcome) -> Response {
    match outcome {
        DispatchOutcome::Redirect(target) => {
            tracing::debug!(path = target.as_path(), "dispatch redirect");
            Redirect::to(target.as_path()).into_response()
        }
        DispatchOutcome::RoleDenied {
            subject,
            role_claim,
        } => {
            tracing::warn!(%subject, %role_claim, "unrecognized role claim, denying dashboard access");
            Redirect::to(RedirectTarget::SignInUnauthorized.as_path()).into_response()
        }
        DispatchOutcome::Render {
            view,
            namespace,
            profile,
        } => Json(DashboardResponse::new(view, namespace, profile)).into_response(),
        DispatchOutcome::AccessDenied { requested } => {
            tracing::info!(namespace = requested.as_str(), "access denied render");
            (StatusCode::OK, Json(AccessDeniedResponse::new())).into_response()
        }
        DispatchOutcome::ProfileError {
            subject,
            email,
            reason,
        } => {
            let status = match &reason {
                ProfileErrorReason::ProvisioningFailed(detail) => {
                    tracing::error!(%subject, email = ?email, %detail, "profile provisioning failed");
                    StatusCode::INTERNAL_SERVER_ERROR
                }
                ProfileErrorReason::StoreUnavailable(detail) => {
                    tracing::error!(%subject, email = ?email, %detail, "profile store unavailable");
                    StatusCode::SERVICE_UNAVAILABLE
                }
            };

            (
                status,
                Json(ProfileErrorResponse {
                    error: "profile_unavailable",
                    subject,
                    email,
                }),
            )
                .into_response()
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SignInPageQuery {
    pub message: Option<String>,
}

/// GET /signin - Stable sign-in target for dispatch redirects.
pub async fn signin_page_handler(
    Query(query): Query<SignInPageQuery>,
) -> Json<SignInPageResponse> {
    Json(SignInPageResponse {
        message: query.message,
    })
}

/// GET /health - Liveness probe.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}
