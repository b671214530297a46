use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use campuspay_application::{ProfileLookup, ProfileRepository};
use campuspay_core::{AppError, AppResult, UniversityId};
use campuspay_domain::{ActorId, DepartmentId, Profile};

/// PostgreSQL-backed repository for actor profiles.
#[derive(Clone)]
pub struct PostgresProfileRepository {
    pool: PgPool,
}

impl PostgresProfileRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct ProfileRow {
    actor_id: Uuid,
    role: String,
    university_id: Option<Uuid>,
    department_id: Option<Uuid>,
    first_name: String,
    last_name: String,
    email: Option<String>,
}

impl From<ProfileRow> for Profile {
    fn from(row: ProfileRow) -> Self {
        Self {
            actor_id: ActorId::from_uuid(row.actor_id),
            role: row.role,
            university_id: row.university_id.map(UniversityId::from_uuid),
            department_id: row.department_id.map(DepartmentId::from_uuid),
            first_name: row.first_name,
            last_name: row.last_name,
            email: row.email,
        }
    }
}

const SELECT_PROFILE: &str = r#"
    SELECT actor_id, role, university_id, department_id, first_name, last_name, email
    FROM profiles
    WHERE actor_id = $1
    LIMIT 1
"#;

#[async_trait]
impl ProfileRepository for PostgresProfileRepository {
    async fn find_by_actor(&self, actor_id: ActorId) -> AppResult<ProfileLookup> {
        let result = sqlx::query_as::<_, ProfileRow>(SELECT_PROFILE)
            .bind(actor_id.as_uuid())
            .fetch_optional(&self.pool)
            .await;

        match result {
            Ok(Some(row)) => Ok(ProfileLookup::Found(row.into())),
            Ok(None) => Ok(ProfileLookup::NotFound),
            Err(error) if is_connection_failure(&error) => {
                tracing::warn!(%error, actor_id = %actor_id, "profile store unreachable");
                Ok(ProfileLookup::Unavailable(error.to_string()))
            }
            Err(error) => Err(AppError::Internal(format!(
                "failed to load profile for actor '{actor_id}': {error}"
            ))),
        }
    }

    async fn insert_if_absent(&self, profile: Profile) -> AppResult<Profile> {
        sqlx::query(
            r#"
            INSERT INTO profiles (
                actor_id,
                role,
                university_id,
                department_id,
                first_name,
                last_name,
                email
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (actor_id) DO NOTHING
            "#,
        )
        .bind(profile.actor_id.as_uuid())
        .bind(&profile.role)
        .bind(profile.university_id.map(|value| value.as_uuid()))
        .bind(profile.department_id.map(|value| value.as_uuid()))
        .bind(&profile.first_name)
        .bind(&profile.last_name)
        .bind(&profile.email)
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to provision profile: {error}")))?;

        // Re-read the winning row: under a race the conflict clause makes
        // the concurrent insert a no-op and both callers see the same row.
        let row = sqlx::query_as::<_, ProfileRow>(SELECT_PROFILE)
            .bind(profile.actor_id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|error| {
                AppError::Internal(format!("failed to read provisioned profile: {error}"))
            })?
            .ok_or_else(|| {
                AppError::Internal(format!(
                    "profile for actor '{}' was not persisted after provisioning",
                    profile.actor_id
                ))
            })?;

        Ok(row.into())
    }
}

fn is_connection_failure(error: &sqlx::Error) -> bool {
    matches!(
        error,
        sqlx::Error::Io(_) | sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed
    )
}
