//! PostgreSQL implementation of profile repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::json;
use sqlx::PgPool;
use sqlx::types::Json;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::entities::{Profile, ProfilePatch, SocialLinks};
use crate::domain::repositories::ProfileRepository;
use crate::error::AppError;

/// Profile joined with its owner's username.
const SELECT_PROFILE: &str = r#"
    SELECT p.id, p.user_id, u.username, p.display_name, p.bio, p.avatar_url,
           p.accent_color, p.is_public, p.social_links, p.created_at, p.updated_at
    FROM profiles p
    JOIN users u ON u.id = p.user_id
"#;

#[derive(sqlx::FromRow)]
struct ProfileRow {
    id: Uuid,
    user_id: Uuid,
    username: String,
    display_name: String,
    bio: Option<String>,
    avatar_url: Option<String>,
    accent_color: String,
    is_public: bool,
    social_links: Json<SocialLinks>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ProfileRow> for Profile {
    fn from(r: ProfileRow) -> Self {
        Profile {
            id: r.id,
            user_id: r.user_id,
            username: r.username,
            display_name: r.display_name,
            bio: r.bio,
            avatar_url: r.avatar_url,
            accent_color: r.accent_color,
            is_public: r.is_public,
            social_links: r.social_links.0,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

fn profile_not_found(user_id: Uuid) -> AppError {
    AppError::not_found("Profile not found", json!({ "user_id": user_id }))
}

/// PostgreSQL repository for profiles.
pub struct PgProfileRepository {
    pool: Arc<PgPool>,
}

impl PgProfileRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    /// Re-reads a profile after an update touched it.
    async fn reload(&self, user_id: Uuid, touched: u64) -> Result<Profile, AppError> {
        if touched == 0 {
            return Err(profile_not_found(user_id));
        }
        self.find_by_user_id(user_id)
            .await?
            .ok_or_else(|| profile_not_found(user_id))
    }
}

#[async_trait]
impl ProfileRepository for PgProfileRepository {
    async fn find_by_user_id(&self, user_id: Uuid) -> Result<Option<Profile>, AppError> {
        let sql = format!("{SELECT_PROFILE} WHERE p.user_id = $1");
        let row = sqlx::query_as::<_, ProfileRow>(&sql)
            .bind(user_id)
            .fetch_optional(self.pool.as_ref())
            .await?;

        Ok(row.map(Profile::from))
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<Profile>, AppError> {
        let sql = format!("{SELECT_PROFILE} WHERE u.username = $1");
        let row = sqlx::query_as::<_, ProfileRow>(&sql)
            .bind(username)
            .fetch_optional(self.pool.as_ref())
            .await?;

        Ok(row.map(Profile::from))
    }

    async fn update(&self, user_id: Uuid, patch: ProfilePatch) -> Result<Profile, AppError> {
        let (bio_set, bio) = match patch.bio {
            Some(bio) => (true, bio),
            None => (false, None),
        };

        let result = sqlx::query(
            r#"
            UPDATE profiles SET
                display_name = COALESCE($2, display_name),
                bio = CASE WHEN $3::boolean THEN $4::text ELSE bio END,
                accent_color = COALESCE($5, accent_color),
                is_public = COALESCE($6, is_public),
                updated_at = NOW()
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .bind(patch.display_name)
        .bind(bio_set)
        .bind(bio)
        .bind(patch.accent_color)
        .bind(patch.is_public)
        .execute(self.pool.as_ref())
        .await?;

        self.reload(user_id, result.rows_affected()).await
    }

    async fn set_avatar_url(&self, user_id: Uuid, avatar_url: &str) -> Result<Profile, AppError> {
        let result = sqlx::query(
            "UPDATE profiles SET avatar_url = $2, updated_at = NOW() WHERE user_id = $1",
        )
        .bind(user_id)
        .bind(avatar_url)
        .execute(self.pool.as_ref())
        .await?;

        self.reload(user_id, result.rows_affected()).await
    }

    async fn set_social_links(
        &self,
        user_id: Uuid,
        social_links: SocialLinks,
    ) -> Result<Profile, AppError> {
        let result = sqlx::query(
            "UPDATE profiles SET social_links = $2, updated_at = NOW() WHERE user_id = $1",
        )
        .bind(user_id)
        .bind(Json(social_links))
        .execute(self.pool.as_ref())
        .await?;

        self.reload(user_id, result.rows_affected()).await
    }
}
