//! Dashboard dispatch: session outcome, then profile, then pure policy.
//!
//! The dispatcher is evaluated fresh on every request and never caches a
//! decision, so a role change takes effect on the actor's very next
//! request. It performs at most two causally dependent lookups (the session
//! was already resolved by the transport layer; the profile read happens
//! here) and fails closed on every unexpected path.

use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;

use campuspay_core::{ActorIdentity, AppError, AppResult, UniversityId};
use campuspay_domain::{
    ActorId, DashboardView, Namespace, Profile, RedirectTarget, RequestedTarget, Role,
    dashboard_view_for, landing_target, namespace_for,
};

use crate::{AuthEvent, AuthEventService};

// ---------------------------------------------------------------------------
// Ports
// ---------------------------------------------------------------------------

/// Outcome of resolving the request's session credential.
#[derive(Debug, Clone)]
pub enum SessionOutcome {
    /// A valid identity was read from the session.
    Authenticated(ActorIdentity),
    /// No credential was supplied, or the session store could not produce
    /// one. Both collapse to the same unauthenticated redirect.
    Absent,
}

/// Tagged outcome of the keyed profile lookup.
///
/// A missing row is a provisioning gap that gets repaired; an unreachable
/// store is an outage that fails the request closed. Neither is an
/// authorization denial.
#[derive(Debug, Clone)]
pub enum ProfileLookup {
    /// Exactly one profile row exists for the actor.
    Found(Profile),
    /// The actor has no profile row yet.
    NotFound,
    /// The profile store could not be reached.
    Unavailable(String),
}

/// Repository port for profile persistence.
#[async_trait]
pub trait ProfileRepository: Send + Sync {
    /// Performs the single keyed lookup for an actor's profile.
    async fn find_by_actor(&self, actor_id: ActorId) -> AppResult<ProfileLookup>;

    /// Inserts the profile unless a row for the actor already exists and
    /// returns the winning row. Must be race-safe: two concurrent calls for
    /// the same actor yield one row, not two and not a conflict error.
    async fn insert_if_absent(&self, profile: Profile) -> AppResult<Profile>;
}

// ---------------------------------------------------------------------------
// Outcome
// ---------------------------------------------------------------------------

/// Why a dispatch ended in the profile-error terminal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileErrorReason {
    /// Auto-provisioning the default profile failed.
    ProvisioningFailed(String),
    /// The profile store was unreachable.
    StoreUnavailable(String),
}

/// Terminal decision for one dispatch.
#[derive(Debug, Clone)]
pub enum DispatchOutcome {
    /// Follow the redirect contract.
    Redirect(RedirectTarget),
    /// Authenticated, but the stored role claim is outside the closed set.
    /// The transport layer redirects to sign-in with the unauthorized
    /// message; no dashboard view is ever rendered for such a claim.
    RoleDenied {
        /// Actor subject, for diagnostics.
        subject: String,
        /// The raw claim that failed to resolve.
        role_claim: String,
    },
    /// Render the selected dashboard view.
    Render {
        /// View selected by the access policy.
        view: DashboardView,
        /// Namespace the view belongs to.
        namespace: Namespace,
        /// The profile the decision was made from.
        profile: Profile,
    },
    /// Authenticated request into the other namespace: rendered as access
    /// denied, never a redirect, never naming the roles that would pass.
    AccessDenied {
        /// The namespace the actor asked for.
        requested: Namespace,
    },
    /// Provisioning failure or store outage: fail closed with a visible
    /// error state carrying the actor as correlation identifiers.
    ProfileError {
        /// Actor subject for correlation.
        subject: String,
        /// Actor email for correlation, if known.
        email: Option<String>,
        /// What went wrong.
        reason: ProfileErrorReason,
    },
}

// ---------------------------------------------------------------------------
// Service
// ---------------------------------------------------------------------------

/// Composes the session outcome, the profile loader, and the pure access
/// policy into one per-request decision.
#[derive(Clone)]
pub struct DispatchService {
    profile_repository: Arc<dyn ProfileRepository>,
    auth_event_service: AuthEventService,
    default_university_id: Option<UniversityId>,
}

impl DispatchService {
    /// Creates a dispatch service.
    #[must_use]
    pub fn new(
        profile_repository: Arc<dyn ProfileRepository>,
        auth_event_service: AuthEventService,
        default_university_id: Option<UniversityId>,
    ) -> Self {
        Self {
            profile_repository,
            auth_event_service,
            default_university_id,
        }
    }

    /// Decides what to render (or where to redirect) for one request.
    pub async fn dispatch(
        &self,
        session: SessionOutcome,
        requested: RequestedTarget,
        ip_address: Option<String>,
        user_agent: Option<String>,
    ) -> AppResult<DispatchOutcome> {
        let SessionOutcome::Authenticated(actor) = session else {
            return Ok(DispatchOutcome::Redirect(RedirectTarget::SignIn));
        };

        let actor_id = actor_id_from_subject(actor.subject())?;

        let profile = match self.profile_repository.find_by_actor(actor_id).await? {
            ProfileLookup::Found(profile) => profile,
            ProfileLookup::Unavailable(reason) => {
                return Ok(DispatchOutcome::ProfileError {
                    subject: actor.subject().to_owned(),
                    email: actor.email().map(ToOwned::to_owned),
                    reason: ProfileErrorReason::StoreUnavailable(reason),
                });
            }
            ProfileLookup::NotFound => {
                match self
                    .provision_default_profile(
                        &actor,
                        actor_id,
                        ip_address.clone(),
                        user_agent.clone(),
                    )
                    .await
                {
                    Ok(profile) => profile,
                    Err(error) => {
                        return Ok(DispatchOutcome::ProfileError {
                            subject: actor.subject().to_owned(),
                            email: actor.email().map(ToOwned::to_owned),
                            reason: ProfileErrorReason::ProvisioningFailed(error.to_string()),
                        });
                    }
                }
            }
        };

        let Ok(role) = Role::from_str(profile.role.as_str()) else {
            self.auth_event_service
                .record_event(AuthEvent {
                    subject: Some(actor.subject().to_owned()),
                    event_type: "dashboard_dispatch".to_owned(),
                    outcome: "unrecognized_role".to_owned(),
                    ip_address,
                    user_agent,
                    detail: Some(format!("stored role claim '{}'", profile.role)),
                })
                .await?;

            return Ok(DispatchOutcome::RoleDenied {
                subject: actor.subject().to_owned(),
                role_claim: profile.role,
            });
        };

        let namespace = namespace_for(role);

        let outcome = match requested {
            RequestedTarget::Root => DispatchOutcome::Redirect(landing_target(namespace)),
            RequestedTarget::Namespace(target) if target == namespace => DispatchOutcome::Render {
                view: dashboard_view_for(role),
                namespace,
                profile,
            },
            RequestedTarget::Namespace(target) => {
                DispatchOutcome::AccessDenied { requested: target }
            }
        };

        Ok(outcome)
    }

    async fn provision_default_profile(
        &self,
        actor: &ActorIdentity,
        actor_id: ActorId,
        ip_address: Option<String>,
        user_agent: Option<String>,
    ) -> AppResult<Profile> {
        let default_profile = Profile::provisioned(
            actor_id,
            actor.display_name(),
            actor.email(),
            self.default_university_id,
        );

        let profile = self
            .profile_repository
            .insert_if_absent(default_profile)
            .await?;

        self.auth_event_service
            .record_event(AuthEvent {
                subject: Some(actor.subject().to_owned()),
                event_type: "profile_provisioned".to_owned(),
                outcome: "success".to_owned(),
                ip_address,
                user_agent,
                detail: None,
            })
            .await?;

        Ok(profile)
    }
}

fn actor_id_from_subject(subject: &str) -> AppResult<ActorId> {
    uuid::Uuid::parse_str(subject)
        .map(ActorId::from_uuid)
        .map_err(|error| AppError::Internal(format!("invalid actor subject '{subject}': {error}")))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Arc;

    use async_trait::async_trait;
    use campuspay_core::{ActorIdentity, AppError, AppResult};
    use campuspay_domain::{
        ActorId, DashboardView, Namespace, Profile, RedirectTarget, RequestedTarget, Role,
    };
    use tokio::sync::Mutex;

    use crate::{AuthEvent, AuthEventRepository, AuthEventService};

    use super::{
        DispatchOutcome, DispatchService, ProfileErrorReason, ProfileLookup, ProfileRepository,
        SessionOutcome,
    };

    #[derive(Default)]
    struct FakeAuthEventRepository {
        events: Mutex<Vec<AuthEvent>>,
    }

    #[async_trait]
    impl AuthEventRepository for FakeAuthEventRepository {
        async fn append_event(&self, event: AuthEvent) -> AppResult<()> {
            self.events.lock().await.push(event);
            Ok(())
        }
    }

    #[derive(Default)]
    struct FakeProfileRepository {
        profiles: Mutex<HashMap<ActorId, Profile>>,
        insert_attempts: Mutex<u32>,
        lookup_unavailable: bool,
        insert_fails: bool,
    }

    #[async_trait]
    impl ProfileRepository for FakeProfileRepository {
        async fn find_by_actor(&self, actor_id: ActorId) -> AppResult<ProfileLookup> {
            if self.lookup_unavailable {
                return Ok(ProfileLookup::Unavailable("connection refused".to_owned()));
            }

            Ok(self
                .profiles
                .lock()
                .await
                .get(&actor_id)
                .cloned()
                .map_or(ProfileLookup::NotFound, ProfileLookup::Found))
        }

        async fn insert_if_absent(&self, profile: Profile) -> AppResult<Profile> {
            *self.insert_attempts.lock().await += 1;

            if self.insert_fails {
                return Err(AppError::Internal("insert rejected".to_owned()));
            }

            let mut profiles = self.profiles.lock().await;
            Ok(profiles
                .entry(profile.actor_id)
                .or_insert(profile)
                .clone())
        }
    }

    fn actor(actor_id: ActorId) -> ActorIdentity {
        ActorIdentity::new(
            actor_id.to_string(),
            "Dana",
            Some("dana@campus.edu".to_owned()),
        )
    }

    fn seeded_service(role: &str) -> (DispatchService, ActorId, Arc<FakeAuthEventRepository>) {
        let actor_id = ActorId::new();
        let profile = Profile {
            actor_id,
            role: role.to_owned(),
            university_id: None,
            department_id: None,
            first_name: "Dana".to_owned(),
            last_name: "Reyes".to_owned(),
            email: Some("dana@campus.edu".to_owned()),
        };

        let repository = FakeProfileRepository {
            profiles: Mutex::new(HashMap::from([(actor_id, profile)])),
            ..FakeProfileRepository::default()
        };
        let events = Arc::new(FakeAuthEventRepository::default());
        let service = DispatchService::new(
            Arc::new(repository),
            AuthEventService::new(events.clone()),
            None,
        );

        (service, actor_id, events)
    }

    #[tokio::test]
    async fn absent_session_always_redirects_to_sign_in() {
        let (service, _, _) = seeded_service("employee");

        for requested in [
            RequestedTarget::Root,
            RequestedTarget::Namespace(Namespace::Administrative),
            RequestedTarget::Namespace(Namespace::SelfService),
        ] {
            let outcome = service
                .dispatch(SessionOutcome::Absent, requested, None, None)
                .await;

            assert!(matches!(
                outcome,
                Ok(DispatchOutcome::Redirect(RedirectTarget::SignIn))
            ));
        }
    }

    #[tokio::test]
    async fn employee_renders_employee_dashboard() {
        let (service, actor_id, _) = seeded_service("employee");

        let outcome = service
            .dispatch(
                SessionOutcome::Authenticated(actor(actor_id)),
                RequestedTarget::Namespace(Namespace::SelfService),
                None,
                None,
            )
            .await;

        match outcome {
            Ok(DispatchOutcome::Render {
                view,
                namespace,
                profile,
            }) => {
                assert_eq!(view, DashboardView::EmployeeDashboard);
                assert_eq!(namespace, Namespace::SelfService);
                assert_eq!(profile.actor_id, actor_id);
            }
            other => panic!("expected render, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn employee_is_denied_in_administrative_namespace() {
        let (service, actor_id, _) = seeded_service("employee");

        let outcome = service
            .dispatch(
                SessionOutcome::Authenticated(actor(actor_id)),
                RequestedTarget::Namespace(Namespace::Administrative),
                None,
                None,
            )
            .await;

        assert!(matches!(
            outcome,
            Ok(DispatchOutcome::AccessDenied {
                requested: Namespace::Administrative
            })
        ));
    }

    #[tokio::test]
    async fn payroll_officer_is_denied_in_self_service_namespace() {
        let (service, actor_id, _) = seeded_service("payroll_officer");

        let outcome = service
            .dispatch(
                SessionOutcome::Authenticated(actor(actor_id)),
                RequestedTarget::Namespace(Namespace::SelfService),
                None,
                None,
            )
            .await;

        assert!(matches!(
            outcome,
            Ok(DispatchOutcome::AccessDenied {
                requested: Namespace::SelfService
            })
        ));
    }

    #[tokio::test]
    async fn payroll_officer_root_lands_on_admin_employees() {
        let (service, actor_id, _) = seeded_service("payroll_officer");

        let outcome = service
            .dispatch(
                SessionOutcome::Authenticated(actor(actor_id)),
                RequestedTarget::Root,
                None,
                None,
            )
            .await;

        assert!(matches!(
            outcome,
            Ok(DispatchOutcome::Redirect(RedirectTarget::AdminLanding))
        ));
    }

    #[tokio::test]
    async fn employee_root_lands_on_dashboard() {
        let (service, actor_id, _) = seeded_service("employee");

        let outcome = service
            .dispatch(
                SessionOutcome::Authenticated(actor(actor_id)),
                RequestedTarget::Root,
                None,
                None,
            )
            .await;

        assert!(matches!(
            outcome,
            Ok(DispatchOutcome::Redirect(
                RedirectTarget::SelfServiceLanding
            ))
        ));
    }

    #[tokio::test]
    async fn missing_profile_is_provisioned_as_employee() {
        let repository = Arc::new(FakeProfileRepository::default());
        let events = Arc::new(FakeAuthEventRepository::default());
        let service = DispatchService::new(
            repository.clone(),
            AuthEventService::new(events.clone()),
            None,
        );
        let actor_id = ActorId::new();

        let outcome = service
            .dispatch(
                SessionOutcome::Authenticated(actor(actor_id)),
                RequestedTarget::Root,
                None,
                None,
            )
            .await;

        assert!(matches!(
            outcome,
            Ok(DispatchOutcome::Redirect(
                RedirectTarget::SelfServiceLanding
            ))
        ));

        let profiles = repository.profiles.lock().await;
        assert_eq!(profiles.len(), 1);
        let stored = profiles.get(&actor_id);
        assert!(stored.is_some_and(|profile| profile.role == Role::Employee.as_str()));

        let recorded = events.events.lock().await;
        assert!(
            recorded
                .iter()
                .any(|event| event.event_type == "profile_provisioned")
        );
    }

    #[tokio::test]
    async fn provisioned_actor_renders_employee_dashboard() {
        let repository = Arc::new(FakeProfileRepository::default());
        let events = Arc::new(FakeAuthEventRepository::default());
        let service =
            DispatchService::new(repository.clone(), AuthEventService::new(events), None);
        let actor_id = ActorId::new();

        let outcome = service
            .dispatch(
                SessionOutcome::Authenticated(actor(actor_id)),
                RequestedTarget::Namespace(Namespace::SelfService),
                None,
                None,
            )
            .await;

        assert!(matches!(
            outcome,
            Ok(DispatchOutcome::Render {
                view: DashboardView::EmployeeDashboard,
                ..
            })
        ));
        assert_eq!(*repository.insert_attempts.lock().await, 1);
    }

    #[tokio::test]
    async fn concurrent_first_dispatches_create_one_profile() {
        let repository = Arc::new(FakeProfileRepository::default());
        let events = Arc::new(FakeAuthEventRepository::default());
        let service =
            DispatchService::new(repository.clone(), AuthEventService::new(events), None);
        let actor_id = ActorId::new();

        let (first, second) = tokio::join!(
            service.dispatch(
                SessionOutcome::Authenticated(actor(actor_id)),
                RequestedTarget::Root,
                None,
                None,
            ),
            service.dispatch(
                SessionOutcome::Authenticated(actor(actor_id)),
                RequestedTarget::Root,
                None,
                None,
            ),
        );

        assert!(first.is_ok());
        assert!(second.is_ok());
        assert_eq!(repository.profiles.lock().await.len(), 1);
    }

    #[tokio::test]
    async fn unrecognized_role_is_denied_not_downgraded() {
        let (service, actor_id, events) = seeded_service("temp_contractor");

        let outcome = service
            .dispatch(
                SessionOutcome::Authenticated(actor(actor_id)),
                RequestedTarget::Namespace(Namespace::SelfService),
                None,
                None,
            )
            .await;

        match outcome {
            Ok(DispatchOutcome::RoleDenied {
                subject,
                role_claim,
            }) => {
                assert_eq!(subject, actor_id.to_string());
                assert_eq!(role_claim, "temp_contractor");
            }
            other => panic!("expected role denial, got {other:?}"),
        }

        let recorded = events.events.lock().await;
        assert!(
            recorded
                .iter()
                .any(|event| event.outcome == "unrecognized_role")
        );
    }

    #[tokio::test]
    async fn store_outage_fails_closed_with_correlation() {
        let repository = FakeProfileRepository {
            lookup_unavailable: true,
            ..FakeProfileRepository::default()
        };
        let events = Arc::new(FakeAuthEventRepository::default());
        let service = DispatchService::new(
            Arc::new(repository),
            AuthEventService::new(events),
            None,
        );
        let actor_id = ActorId::new();

        let outcome = service
            .dispatch(
                SessionOutcome::Authenticated(actor(actor_id)),
                RequestedTarget::Root,
                None,
                None,
            )
            .await;

        match outcome {
            Ok(DispatchOutcome::ProfileError {
                subject,
                email,
                reason: ProfileErrorReason::StoreUnavailable(_),
            }) => {
                assert_eq!(subject, actor_id.to_string());
                assert_eq!(email.as_deref(), Some("dana@campus.edu"));
            }
            other => panic!("expected store-unavailable terminal, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn provisioning_failure_fails_closed() {
        let repository = FakeProfileRepository {
            insert_fails: true,
            ..FakeProfileRepository::default()
        };
        let events = Arc::new(FakeAuthEventRepository::default());
        let service = DispatchService::new(
            Arc::new(repository),
            AuthEventService::new(events),
            None,
        );
        let actor_id = ActorId::new();

        let outcome = service
            .dispatch(
                SessionOutcome::Authenticated(actor(actor_id)),
                RequestedTarget::Namespace(Namespace::SelfService),
                None,
                None,
            )
            .await;

        assert!(matches!(
            outcome,
            Ok(DispatchOutcome::ProfileError {
                reason: ProfileErrorReason::ProvisioningFailed(_),
                ..
            })
        ));
    }
}
