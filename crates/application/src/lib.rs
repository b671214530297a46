//! Application services and ports.

#![forbid(unsafe_code)]

mod auth_event_service;
mod dispatch_service;
mod session_service;

pub use auth_event_service::{AuthEvent, AuthEventRepository, AuthEventService};
pub use dispatch_service::{
    DispatchOutcome, DispatchService, ProfileErrorReason, ProfileLookup, ProfileRepository,
    SessionOutcome,
};
pub use session_service::{IdentityVerifier, SessionService, SignInOutcome};
