use async_trait::async_trait;
use uuid::Uuid;

use campuspay_application::IdentityVerifier;
use campuspay_core::{ActorIdentity, AppResult};
use campuspay_domain::EmailAddress;

/// Development-only identity verifier guarded by a shared secret.
///
/// Accepts tokens of the form `<secret>:<actor-uuid>:<email>`. Anything
/// else is rejected exactly like the real provider rejects a bad token.
pub struct DevTokenVerifier {
    shared_secret: String,
}

impl DevTokenVerifier {
    /// Creates a verifier with the configured shared secret.
    #[must_use]
    pub fn new(shared_secret: impl Into<String>) -> Self {
        Self {
            shared_secret: shared_secret.into(),
        }
    }
}

#[async_trait]
impl IdentityVerifier for DevTokenVerifier {
    async fn verify(&self, access_token: &str) -> AppResult<Option<ActorIdentity>> {
        let mut parts = access_token.splitn(3, ':');
        let (Some(secret), Some(subject), Some(email)) =
            (parts.next(), parts.next(), parts.next())
        else {
            return Ok(None);
        };

        if secret != self.shared_secret || Uuid::parse_str(subject).is_err() {
            return Ok(None);
        }

        let Ok(email) = EmailAddress::new(email) else {
            return Ok(None);
        };

        let display_name = email
            .as_str()
            .split('@')
            .next()
            .unwrap_or("dev user")
            .to_owned();

        Ok(Some(ActorIdentity::new(
            subject,
            display_name,
            Some(email.into()),
        )))
    }
}

#[cfg(test)]
mod tests {
    use campuspay_application::IdentityVerifier;
    use uuid::Uuid;

    use super::DevTokenVerifier;

    #[tokio::test]
    async fn well_formed_token_is_accepted() {
        let verifier = DevTokenVerifier::new("local-secret");
        let subject = Uuid::new_v4();

        let identity = verifier
            .verify(&format!("local-secret:{subject}:dana@campus.edu"))
            .await;

        match identity {
            Ok(Some(identity)) => {
                assert_eq!(identity.subject(), subject.to_string());
                assert_eq!(identity.display_name(), "dana");
            }
            other => panic!("expected identity, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn wrong_secret_is_rejected() {
        let verifier = DevTokenVerifier::new("local-secret");
        let subject = Uuid::new_v4();

        let identity = verifier
            .verify(&format!("other-secret:{subject}:dana@campus.edu"))
            .await;
        assert!(matches!(identity, Ok(None)));
    }

    #[tokio::test]
    async fn malformed_tokens_are_rejected() {
        let verifier = DevTokenVerifier::new("local-secret");

        for token in ["", "local-secret", "local-secret:not-a-uuid:dana@campus.edu"] {
            let identity = verifier.verify(token).await;
            assert!(matches!(identity, Ok(None)), "token '{token}'");
        }
    }
}
