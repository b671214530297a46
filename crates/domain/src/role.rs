//! The closed role set and the identifiers derived from it.
//!
//! Roles are a closed enumeration: there are no dynamic or custom roles,
//! and every storage value outside the set is rejected at parse time rather
//! than mapped to a default. Silently downgrading an unknown role to a
//! low-privilege view is a worse failure mode than an explicit denial.

use std::str::FromStr;

use campuspay_core::AppError;
use serde::{Deserialize, Serialize};

/// Payroll-administration role held by exactly one profile field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Operates the whole installation across universities.
    SystemAdmin,
    /// Administers a single university.
    UniversityAdmin,
    /// Runs payroll periods and payroll runs.
    PayrollOfficer,
    /// Manages employee and position records.
    HrStaff,
    /// Reviews timesheets for one department.
    DepartmentHead,
    /// Self-service access to own payslips and timesheets.
    Employee,
}

impl Role {
    /// Returns the stable storage value for this role.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SystemAdmin => "system_admin",
            Self::UniversityAdmin => "university_admin",
            Self::PayrollOfficer => "payroll_officer",
            Self::HrStaff => "hr_staff",
            Self::DepartmentHead => "department_head",
            Self::Employee => "employee",
        }
    }

    /// Returns all roles in the closed enumeration.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[Role] = &[
            Role::SystemAdmin,
            Role::UniversityAdmin,
            Role::PayrollOfficer,
            Role::HrStaff,
            Role::DepartmentHead,
            Role::Employee,
        ];

        ALL
    }
}

impl FromStr for Role {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "system_admin" => Ok(Self::SystemAdmin),
            "university_admin" => Ok(Self::UniversityAdmin),
            "payroll_officer" => Ok(Self::PayrollOfficer),
            "hr_staff" => Ok(Self::HrStaff),
            "department_head" => Ok(Self::DepartmentHead),
            "employee" => Ok(Self::Employee),
            _ => Err(AppError::Validation(format!("unknown role '{value}'"))),
        }
    }
}

/// Dashboard variant rendered for a role, in 1:1 correspondence with `Role`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DashboardView {
    /// Installation-wide administration dashboard.
    SystemAdminDashboard,
    /// University administration dashboard.
    UniversityAdminDashboard,
    /// Payroll operations dashboard.
    PayrollOfficerDashboard,
    /// Human-resources dashboard.
    HrStaffDashboard,
    /// Department review dashboard.
    DepartmentHeadDashboard,
    /// Employee self-service dashboard.
    EmployeeDashboard,
}

impl DashboardView {
    /// Returns the stable transport value consumed by the presentation layer.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SystemAdminDashboard => "system_admin_dashboard",
            Self::UniversityAdminDashboard => "university_admin_dashboard",
            Self::PayrollOfficerDashboard => "payroll_officer_dashboard",
            Self::HrStaffDashboard => "hr_staff_dashboard",
            Self::DepartmentHeadDashboard => "department_head_dashboard",
            Self::EmployeeDashboard => "employee_dashboard",
        }
    }
}

/// Route partition an authenticated request targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Namespace {
    /// The `/admin` route namespace.
    Administrative,
    /// The `/dashboard` self-service namespace.
    SelfService,
}

impl Namespace {
    /// Returns the stable transport value for this namespace.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Administrative => "administrative",
            Self::SelfService => "self_service",
        }
    }
}
