//! API request and response payloads.

use campuspay_core::ActorIdentity;
use campuspay_domain::{DashboardView, Namespace, Profile};
use serde::{Deserialize, Serialize};

/// Health response payload.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Sign-in request body carrying the provider access token.
#[derive(Debug, Deserialize)]
pub struct SignInRequest {
    pub access_token: String,
}

/// Sign-in response body.
#[derive(Debug, Serialize)]
pub struct SignInResponse {
    pub status: &'static str,
}

/// API representation of the authenticated actor.
#[derive(Debug, Serialize)]
pub struct ActorIdentityResponse {
    pub subject: String,
    pub display_name: String,
    pub email: Option<String>,
}

impl From<ActorIdentity> for ActorIdentityResponse {
    fn from(identity: ActorIdentity) -> Self {
        Self {
            subject: identity.subject().to_owned(),
            display_name: identity.display_name().to_owned(),
            email: identity.email().map(ToOwned::to_owned),
        }
    }
}

/// Profile summary embedded in a dashboard render.
#[derive(Debug, Serialize)]
pub struct ProfileSummary {
    pub role: String,
    pub university_id: Option<String>,
    pub department_id: Option<String>,
    pub first_name: String,
    pub last_name: String,
}

impl From<Profile> for ProfileSummary {
    fn from(profile: Profile) -> Self {
        Self {
            role: profile.role,
            university_id: profile.university_id.map(|value| value.to_string()),
            department_id: profile.department_id.map(|value| value.to_string()),
            first_name: profile.first_name,
            last_name: profile.last_name,
        }
    }
}

/// Rendered dashboard payload consumed by the presentation layer.
#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub view: &'static str,
    pub namespace: &'static str,
    pub profile: ProfileSummary,
}

impl DashboardResponse {
    /// Builds the render payload for a dispatch decision.
    #[must_use]
    pub fn new(view: DashboardView, namespace: Namespace, profile: Profile) -> Self {
        Self {
            view: view.as_str(),
            namespace: namespace.as_str(),
            profile: profile.into(),
        }
    }
}

/// Access-denied render. Never names the roles that would be allowed.
#[derive(Debug, Serialize)]
pub struct AccessDeniedResponse {
    pub view: &'static str,
    pub message: &'static str,
}

impl AccessDeniedResponse {
    /// The single access-denied payload.
    #[must_use]
    pub fn new() -> Self {
        Self {
            view: "access_denied",
            message: "You do not have access to this area.",
        }
    }
}

impl Default for AccessDeniedResponse {
    fn default() -> Self {
        Self::new()
    }
}

/// Profile-error render carrying the correlation identifiers.
#[derive(Debug, Serialize)]
pub struct ProfileErrorResponse {
    pub error: &'static str,
    pub subject: String,
    pub email: Option<String>,
}

/// Sign-in page payload; rendering is the frontend's concern.
#[derive(Debug, Serialize)]
pub struct SignInPageResponse {
    pub message: Option<String>,
}
