//! Domain entities and access-policy invariants.

#![forbid(unsafe_code)]

mod access;
mod profile;
mod role;

pub use access::{
    RedirectTarget, RequestedTarget, dashboard_view_for, landing_target, namespace_for,
};
pub use profile::{ActorId, DepartmentId, EmailAddress, Profile};
pub use role::{DashboardView, Namespace, Role};
