//! Profile entity and its identifiers.

use campuspay_core::{AppError, AppResult, UniversityId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::role::Role;

/// Unique identifier for an actor, issued by the external auth provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActorId(Uuid);

impl ActorId {
    /// Creates a new random actor identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates an actor identifier from an existing UUID value.
    #[must_use]
    pub fn from_uuid(value: Uuid) -> Self {
        Self(value)
    }

    /// Returns the underlying UUID value.
    #[must_use]
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for ActorId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ActorId {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Unique identifier for a department within a university.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DepartmentId(Uuid);

impl DepartmentId {
    /// Creates a new random department identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a department identifier from an existing UUID value.
    #[must_use]
    pub fn from_uuid(value: Uuid) -> Self {
        Self(value)
    }

    /// Returns the underlying UUID value.
    #[must_use]
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for DepartmentId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for DepartmentId {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Validated email address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Creates a validated, canonicalized (trimmed, lowercased) address.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let canonical = value.into().trim().to_lowercase();

        let Some((local, domain)) = canonical.split_once('@') else {
            return Err(AppError::Validation(
                "email address must contain '@'".to_owned(),
            ));
        };

        if local.is_empty() || domain.is_empty() || !domain.contains('.') {
            return Err(AppError::Validation(format!(
                "'{canonical}' is not a valid email address"
            )));
        }

        if canonical.len() > 254 {
            return Err(AppError::Validation(
                "email address must not exceed 254 characters".to_owned(),
            ));
        }

        Ok(Self(canonical))
    }

    /// Returns the canonical email string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<EmailAddress> for String {
    fn from(value: EmailAddress) -> Self {
        value.0
    }
}

/// An actor's role and organizational scope, 1:1 with the actor.
///
/// `role` holds the raw stored claim. It is resolved against the closed
/// [`Role`] set at dispatch time, so a row carrying a value outside the set
/// is representable here and rejected by policy, not by deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    /// Owning actor, also the storage key.
    pub actor_id: ActorId,
    /// Raw role claim as stored.
    pub role: String,
    /// University affiliation, if assigned.
    pub university_id: Option<UniversityId>,
    /// Department affiliation, if assigned.
    pub department_id: Option<DepartmentId>,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Contact email, if known.
    pub email: Option<String>,
}

impl Profile {
    /// Builds the minimal default profile used for auto-provisioning:
    /// employee role, no department, university from installation config.
    #[must_use]
    pub fn provisioned(
        actor_id: ActorId,
        display_name: &str,
        email: Option<&str>,
        university_id: Option<UniversityId>,
    ) -> Self {
        Self {
            actor_id,
            role: Role::Employee.as_str().to_owned(),
            university_id,
            department_id: None,
            first_name: display_name.to_owned(),
            last_name: String::new(),
            email: email.map(ToOwned::to_owned),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::{ActorId, EmailAddress, Profile};
    use crate::role::Role;

    #[test]
    fn valid_email_is_canonicalized() {
        let email = EmailAddress::new("  Clerk@Payroll.EDU ");
        assert!(email.is_ok());
        assert_eq!(
            email.unwrap_or_else(|_| panic!("test")).as_str(),
            "clerk@payroll.edu"
        );
    }

    #[test]
    fn email_without_at_is_rejected() {
        assert!(EmailAddress::new("payroll.edu").is_err());
    }

    #[test]
    fn email_without_domain_dot_is_rejected() {
        assert!(EmailAddress::new("clerk@edu").is_err());
    }

    #[test]
    fn overlong_email_is_rejected() {
        let overlong = format!("{}@campus.edu", "a".repeat(250));
        assert!(EmailAddress::new(overlong).is_err());
    }

    #[test]
    fn provisioned_profile_defaults_to_employee_scope() {
        let profile = Profile::provisioned(ActorId::new(), "Dana", None, None);

        assert_eq!(Role::from_str(&profile.role).ok(), Some(Role::Employee));
        assert!(profile.university_id.is_none());
        assert!(profile.department_id.is_none());
        assert_eq!(profile.first_name, "Dana");
        assert!(profile.last_name.is_empty());
    }
}
