use serde::{Deserialize, Serialize};

/// Actor information persisted in the authenticated session.
///
/// The identity is issued by the external auth provider at sign-in and is
/// read back verbatim on every request. Organizational scope (university,
/// department) is NOT part of the identity; it lives on the actor's profile
/// and is re-read per request so role changes take effect immediately.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorIdentity {
    subject: String,
    display_name: String,
    email: Option<String>,
}

impl ActorIdentity {
    /// Creates an actor identity from provider data.
    #[must_use]
    pub fn new(
        subject: impl Into<String>,
        display_name: impl Into<String>,
        email: Option<String>,
    ) -> Self {
        Self {
            subject: subject.into(),
            display_name: display_name.into(),
            email,
        }
    }

    /// Returns the stable subject claim from the identity provider.
    #[must_use]
    pub fn subject(&self) -> &str {
        self.subject.as_str()
    }

    /// Returns the display name for the current actor.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.display_name.as_str()
    }

    /// Returns the email, if the provider returned one.
    #[must_use]
    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }
}
