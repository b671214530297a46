use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use campuspay_application::{ProfileLookup, ProfileRepository};
use campuspay_core::AppResult;
use campuspay_domain::{ActorId, Profile};

/// In-memory profile repository for tests and local development.
///
/// Mirrors the Postgres adapter's semantics, including the first-writer-wins
/// behavior of `insert_if_absent`. Never reports the store as unavailable.
#[derive(Debug, Default)]
pub struct InMemoryProfileRepository {
    profiles: RwLock<HashMap<ActorId, Profile>>,
}

impl InMemoryProfileRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self {
            profiles: RwLock::new(HashMap::new()),
        }
    }

    /// Seeds a profile row, replacing any existing row for the actor.
    pub async fn seed(&self, profile: Profile) {
        self.profiles.write().await.insert(profile.actor_id, profile);
    }
}

#[async_trait]
impl ProfileRepository for InMemoryProfileRepository {
    async fn find_by_actor(&self, actor_id: ActorId) -> AppResult<ProfileLookup> {
        Ok(self
            .profiles
            .read()
            .await
            .get(&actor_id)
            .cloned()
            .map_or(ProfileLookup::NotFound, ProfileLookup::Found))
    }

    async fn insert_if_absent(&self, profile: Profile) -> AppResult<Profile> {
        let mut profiles = self.profiles.write().await;
        Ok(profiles.entry(profile.actor_id).or_insert(profile).clone())
    }
}
