//! Sign-in and sign-out flow.
//!
//! Credential validation belongs to the external identity provider; this
//! service only consumes the verified identity (or its absence) and keeps
//! the auth event trail. Rejections are generic so callers cannot probe
//! which part of a credential was wrong.

use std::sync::Arc;

use async_trait::async_trait;

use campuspay_core::{ActorIdentity, AppResult};

use crate::{AuthEvent, AuthEventService};

/// Port for the external auth collaborator.
#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    /// Validates an opaque access token.
    ///
    /// Returns `None` when the provider rejected the token. Returns
    /// `AppError::Unavailable` when the provider could not be reached, so
    /// an outage is never mistaken for a bad credential.
    async fn verify(&self, access_token: &str) -> AppResult<Option<ActorIdentity>>;
}

/// Result of a sign-in attempt.
#[derive(Debug)]
pub enum SignInOutcome {
    /// Token verified; a session can be established.
    Authenticated(ActorIdentity),
    /// Token rejected by the provider.
    Rejected,
}

/// Application service for establishing and tearing down sessions.
#[derive(Clone)]
pub struct SessionService {
    identity_verifier: Arc<dyn IdentityVerifier>,
    auth_event_service: AuthEventService,
}

impl SessionService {
    /// Creates a session service.
    #[must_use]
    pub fn new(
        identity_verifier: Arc<dyn IdentityVerifier>,
        auth_event_service: AuthEventService,
    ) -> Self {
        Self {
            identity_verifier,
            auth_event_service,
        }
    }

    /// Verifies a provider token and records the attempt.
    pub async fn sign_in(
        &self,
        access_token: &str,
        ip_address: Option<String>,
        user_agent: Option<String>,
    ) -> AppResult<SignInOutcome> {
        match self.identity_verifier.verify(access_token).await? {
            Some(identity) => {
                self.auth_event_service
                    .record_event(AuthEvent {
                        subject: Some(identity.subject().to_owned()),
                        event_type: "sign_in".to_owned(),
                        outcome: "success".to_owned(),
                        ip_address,
                        user_agent,
                        detail: None,
                    })
                    .await?;

                Ok(SignInOutcome::Authenticated(identity))
            }
            None => {
                self.auth_event_service
                    .record_event(AuthEvent {
                        subject: None,
                        event_type: "sign_in".to_owned(),
                        outcome: "rejected".to_owned(),
                        ip_address,
                        user_agent,
                        detail: None,
                    })
                    .await?;

                Ok(SignInOutcome::Rejected)
            }
        }
    }

    /// Records a sign-out for the (possibly already expired) session.
    pub async fn sign_out(
        &self,
        subject: Option<String>,
        ip_address: Option<String>,
        user_agent: Option<String>,
    ) -> AppResult<()> {
        self.auth_event_service
            .record_event(AuthEvent {
                subject,
                event_type: "sign_out".to_owned(),
                outcome: "success".to_owned(),
                ip_address,
                user_agent,
                detail: None,
            })
            .await
    }
}
