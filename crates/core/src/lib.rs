//! Shared primitives for all Rust crates in CampusPay.

#![forbid(unsafe_code)]

/// Authentication primitives shared across services.
pub mod auth;

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

pub use auth::ActorIdentity;

/// Result type used across CampusPay crates.
pub type AppResult<T> = Result<T, AppError>;

/// University identifier scoping every organizational resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UniversityId(Uuid);

impl UniversityId {
    /// Creates a random university identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a university identifier from an existing UUID value.
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

impl Default for UniversityId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for UniversityId {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Common application error categories.
#[derive(Debug, Error)]
pub enum AppError {
    /// Invalid input or violated invariant.
    #[error("validation error: {0}")]
    Validation(String),

    /// Requested resource does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Write operation conflicts with existing state.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Actor is not authenticated or not allowed to access a resource.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Actor is authenticated but blocked by access policy.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// An external collaborator could not be reached.
    #[error("unavailable: {0}")]
    Unavailable(String),

    /// Internal unexpected error.
    #[error("internal error: {0}")]
    Internal(String),
}

#[cfg(test)]
mod tests {
    use super::{AppError, UniversityId};

    #[test]
    fn university_id_formats_as_uuid() {
        let university_id = UniversityId::new();
        assert_eq!(university_id.to_string().len(), 36);
    }

    #[test]
    fn errors_render_their_category() {
        let error = AppError::Unavailable("profile store timeout".to_owned());
        assert_eq!(error.to_string(), "unavailable: profile store timeout");
    }
}
