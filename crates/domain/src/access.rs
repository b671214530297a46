//! Pure access-policy lookups.
//!
//! Two independent decisions are kept as two separate exhaustive matches:
//! the fine-grained role-to-view selection and the coarse role-to-namespace
//! split. Adding an administrative role must not require touching the view
//! table, and vice versa. Both functions are total over [`Role`]; a missing
//! arm is a compile error.

use serde::{Deserialize, Serialize};

use crate::role::{DashboardView, Namespace, Role};

/// Selects the single dashboard view a role is entitled to.
#[must_use]
pub fn dashboard_view_for(role: Role) -> DashboardView {
    match role {
        Role::SystemAdmin => DashboardView::SystemAdminDashboard,
        Role::UniversityAdmin => DashboardView::UniversityAdminDashboard,
        Role::PayrollOfficer => DashboardView::PayrollOfficerDashboard,
        Role::HrStaff => DashboardView::HrStaffDashboard,
        Role::DepartmentHead => DashboardView::DepartmentHeadDashboard,
        Role::Employee => DashboardView::EmployeeDashboard,
    }
}

/// Selects the route namespace a role belongs to.
#[must_use]
pub fn namespace_for(role: Role) -> Namespace {
    match role {
        Role::SystemAdmin | Role::UniversityAdmin | Role::PayrollOfficer | Role::HrStaff => {
            Namespace::Administrative
        }
        Role::DepartmentHead | Role::Employee => Namespace::SelfService,
    }
}

/// Returns the landing redirect for a namespace.
#[must_use]
pub fn landing_target(namespace: Namespace) -> RedirectTarget {
    match namespace {
        Namespace::Administrative => RedirectTarget::AdminLanding,
        Namespace::SelfService => RedirectTarget::SelfServiceLanding,
    }
}

/// Stable redirect contract consumed by the transport layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RedirectTarget {
    /// Sign-in page, no reason leaked.
    SignIn,
    /// Sign-in page with the unauthorized-role message.
    SignInUnauthorized,
    /// Administrative-namespace landing page.
    AdminLanding,
    /// Self-service landing page.
    SelfServiceLanding,
}

impl RedirectTarget {
    /// Returns the path this target redirects to. These strings are a
    /// stable contract with the presentation layer.
    #[must_use]
    pub fn as_path(&self) -> &'static str {
        match self {
            Self::SignIn => "/signin",
            Self::SignInUnauthorized => {
                "/signin?message=Unauthorized access: No valid role found."
            }
            Self::AdminLanding => "/admin/employees",
            Self::SelfServiceLanding => "/dashboard",
        }
    }
}

/// Target of an inbound dispatch request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestedTarget {
    /// The application root; routed to the role's landing page.
    Root,
    /// A concrete namespace (`/admin/...` or `/dashboard`).
    Namespace(Namespace),
}
