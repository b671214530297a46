use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use url::Url;

use campuspay_application::IdentityVerifier;
use campuspay_core::{ActorIdentity, AppError, AppResult};

/// Identity adapter for the hosted auth provider's userinfo endpoint.
///
/// The access token is opaque to this core: it is forwarded as a bearer
/// credential and the provider decides its validity. A 401/403 answer is a
/// rejection; a transport failure is an outage, surfaced as `Unavailable`.
#[derive(Clone)]
pub struct HttpIdentityVerifier {
    client: reqwest::Client,
    userinfo_url: Url,
}

impl HttpIdentityVerifier {
    /// Creates a verifier calling the given userinfo endpoint.
    #[must_use]
    pub fn new(userinfo_url: Url) -> Self {
        Self {
            client: reqwest::Client::new(),
            userinfo_url,
        }
    }
}

#[derive(Debug, Deserialize)]
struct UserInfoResponse {
    #[serde(alias = "sub")]
    id: String,
    email: Option<String>,
    #[serde(alias = "full_name")]
    name: Option<String>,
}

#[async_trait]
impl IdentityVerifier for HttpIdentityVerifier {
    async fn verify(&self, access_token: &str) -> AppResult<Option<ActorIdentity>> {
        let response = self
            .client
            .get(self.userinfo_url.clone())
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|error| {
                AppError::Unavailable(format!("identity provider unreachable: {error}"))
            })?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(AppError::Internal(format!(
                "identity provider returned status {status}"
            )));
        }

        let info: UserInfoResponse = response.json().await.map_err(|error| {
            AppError::Internal(format!("failed to decode userinfo response: {error}"))
        })?;

        Ok(Some(identity_from_userinfo(info)))
    }
}

fn identity_from_userinfo(info: UserInfoResponse) -> ActorIdentity {
    let display_name = info
        .name
        .clone()
        .or_else(|| {
            info.email
                .as_deref()
                .and_then(|email| email.split('@').next())
                .map(ToOwned::to_owned)
        })
        .unwrap_or_else(|| info.id.clone());

    ActorIdentity::new(info.id, display_name, info.email)
}

#[cfg(test)]
mod tests {
    use super::{UserInfoResponse, identity_from_userinfo};

    #[test]
    fn display_name_prefers_provider_name() {
        let identity = identity_from_userinfo(UserInfoResponse {
            id: "abc".to_owned(),
            email: Some("dana@campus.edu".to_owned()),
            name: Some("Dana Reyes".to_owned()),
        });

        assert_eq!(identity.display_name(), "Dana Reyes");
    }

    #[test]
    fn display_name_falls_back_to_email_local_part() {
        let identity = identity_from_userinfo(UserInfoResponse {
            id: "abc".to_owned(),
            email: Some("dana@campus.edu".to_owned()),
            name: None,
        });

        assert_eq!(identity.display_name(), "dana");
        assert_eq!(identity.email(), Some("dana@campus.edu"));
    }

    #[test]
    fn display_name_falls_back_to_subject() {
        let identity = identity_from_userinfo(UserInfoResponse {
            id: "abc".to_owned(),
            email: None,
            name: None,
        });

        assert_eq!(identity.display_name(), "abc");
    }
}
