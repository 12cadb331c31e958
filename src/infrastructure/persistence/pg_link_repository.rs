//! PostgreSQL implementation of link repository.
//!
//! Position-changing operations share one shape: begin, lock the owner's user
//! row with `FOR UPDATE`, read the current `(id, position)` list, let
//! [`crate::domain::ordering`] compute the changes, write them with a single
//! `UNNEST` update, commit. The owner lock serializes writers for one user and
//! the deferred `(user_id, position)` unique constraint is checked at commit.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::json;
use sqlx::{PgConnection, PgPool};
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::entities::{Link, LinkPatch, NewLink};
use crate::domain::ordering::{self, Assignment};
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;

const LINK_COLUMNS: &str = "id, user_id, title, url, description, is_active, position, \
    click_count, created_at, updated_at";

const DISPLAY_ORDER: &str = "ORDER BY position ASC, created_at ASC, id ASC";

#[derive(sqlx::FromRow)]
struct LinkRow {
    id: Uuid,
    user_id: Uuid,
    title: String,
    url: String,
    description: Option<String>,
    is_active: bool,
    position: i32,
    click_count: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<LinkRow> for Link {
    fn from(r: LinkRow) -> Self {
        Link {
            id: r.id,
            user_id: r.user_id,
            title: r.title,
            url: r.url,
            description: r.description,
            is_active: r.is_active,
            position: r.position,
            click_count: r.click_count,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

/// Takes the owner's row lock. Returns false if the user does not exist.
async fn lock_owner(conn: &mut PgConnection, user_id: Uuid) -> Result<bool, AppError> {
    let locked: Option<Uuid> = sqlx::query_scalar("SELECT id FROM users WHERE id = $1 FOR UPDATE")
        .bind(user_id)
        .fetch_optional(conn)
        .await?;

    Ok(locked.is_some())
}

/// Current `(id, position)` pairs in display order.
async fn current_positions(
    conn: &mut PgConnection,
    user_id: Uuid,
) -> Result<Vec<(Uuid, i32)>, AppError> {
    let sql = format!("SELECT id, position FROM links WHERE user_id = $1 {DISPLAY_ORDER}");
    let rows = sqlx::query_as::<_, (Uuid, i32)>(&sql)
        .bind(user_id)
        .fetch_all(conn)
        .await?;

    Ok(rows)
}

/// Writes all position changes in one statement.
async fn apply_assignments(
    conn: &mut PgConnection,
    user_id: Uuid,
    changes: &[Assignment],
) -> Result<(), AppError> {
    if changes.is_empty() {
        return Ok(());
    }

    let (ids, positions): (Vec<Uuid>, Vec<i32>) =
        changes.iter().map(|a| (a.id, a.position)).unzip();

    sqlx::query(
        r#"
        UPDATE links AS l
        SET position = v.position, updated_at = NOW()
        FROM UNNEST($1::uuid[], $2::int4[]) AS v(id, position)
        WHERE l.id = v.id AND l.user_id = $3
        "#,
    )
    .bind(ids)
    .bind(positions)
    .bind(user_id)
    .execute(conn)
    .await?;

    Ok(())
}

fn owner_not_found(user_id: Uuid) -> AppError {
    AppError::not_found("User not found", json!({ "user_id": user_id }))
}

/// PostgreSQL repository for links and their ordering.
pub struct PgLinkRepository {
    pool: Arc<PgPool>,
}

impl PgLinkRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LinkRepository for PgLinkRepository {
    async fn append(&self, user_id: Uuid, new_link: NewLink) -> Result<Link, AppError> {
        let mut tx = self.pool.begin().await?;

        if !lock_owner(&mut tx, user_id).await? {
            return Err(owner_not_found(user_id));
        }

        let max: Option<i32> =
            sqlx::query_scalar("SELECT MAX(position) FROM links WHERE user_id = $1")
                .bind(user_id)
                .fetch_one(&mut *tx)
                .await?;

        let sql = format!(
            "INSERT INTO links (id, user_id, title, url, description, is_active, position) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING {LINK_COLUMNS}"
        );
        let link = sqlx::query_as::<_, LinkRow>(&sql)
            .bind(Uuid::new_v4())
            .bind(user_id)
            .bind(&new_link.title)
            .bind(&new_link.url)
            .bind(&new_link.description)
            .bind(new_link.is_active)
            .bind(ordering::next_position(max))
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(link.into())
    }

    async fn remove(&self, user_id: Uuid, link_id: Uuid) -> Result<bool, AppError> {
        let mut tx = self.pool.begin().await?;

        if !lock_owner(&mut tx, user_id).await? {
            return Ok(false);
        }

        let deleted = sqlx::query("DELETE FROM links WHERE id = $1 AND user_id = $2")
            .bind(link_id)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        if deleted.rows_affected() == 0 {
            return Ok(false);
        }

        let remaining = current_positions(&mut tx, user_id).await?;
        apply_assignments(&mut tx, user_id, &ordering::compact(&remaining)).await?;

        tx.commit().await?;

        Ok(true)
    }

    async fn reorder(&self, user_id: Uuid, ids: Vec<Uuid>) -> Result<Vec<Link>, AppError> {
        ordering::check_unique(&ids)?;

        let mut tx = self.pool.begin().await?;

        if !lock_owner(&mut tx, user_id).await? {
            return Err(owner_not_found(user_id));
        }

        let current = current_positions(&mut tx, user_id).await?;
        let current_ids: Vec<Uuid> = current.iter().map(|&(id, _)| id).collect();

        // Dropping the transaction on error rolls it back untouched.
        let planned = ordering::plan_reorder(&current_ids, &ids)?;
        apply_assignments(&mut tx, user_id, &ordering::assignments_for(&current, &planned))
            .await?;

        let sql = format!("SELECT {LINK_COLUMNS} FROM links WHERE user_id = $1 {DISPLAY_ORDER}");
        let links = sqlx::query_as::<_, LinkRow>(&sql)
            .bind(user_id)
            .fetch_all(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(links.into_iter().map(Link::from).collect())
    }

    async fn find_ordered(
        &self,
        user_id: Uuid,
        only_active: bool,
        page: Option<(i64, i64)>,
    ) -> Result<Vec<Link>, AppError> {
        let (offset, limit) = page.unzip();

        let sql = format!(
            "SELECT {LINK_COLUMNS} FROM links \
             WHERE user_id = $1 AND (NOT $2::boolean OR is_active) \
             {DISPLAY_ORDER} LIMIT $3::bigint OFFSET $4::bigint"
        );
        let rows = sqlx::query_as::<_, LinkRow>(&sql)
            .bind(user_id)
            .bind(only_active)
            .bind(limit)
            .bind(offset)
            .fetch_all(self.pool.as_ref())
            .await?;

        Ok(rows.into_iter().map(Link::from).collect())
    }

    async fn count(&self, user_id: Uuid) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM links WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(self.pool.as_ref())
            .await?;

        Ok(count)
    }

    async fn find_by_id(&self, user_id: Uuid, link_id: Uuid) -> Result<Option<Link>, AppError> {
        let sql = format!("SELECT {LINK_COLUMNS} FROM links WHERE id = $1 AND user_id = $2");
        let row = sqlx::query_as::<_, LinkRow>(&sql)
            .bind(link_id)
            .bind(user_id)
            .fetch_optional(self.pool.as_ref())
            .await?;

        Ok(row.map(Link::from))
    }

    async fn update(
        &self,
        user_id: Uuid,
        link_id: Uuid,
        patch: LinkPatch,
    ) -> Result<Link, AppError> {
        let (description_set, description) = match patch.description {
            Some(description) => (true, description),
            None => (false, None),
        };

        let sql = format!(
            "UPDATE links SET \
                title = COALESCE($3, title), \
                url = COALESCE($4, url), \
                description = CASE WHEN $5::boolean THEN $6::text ELSE description END, \
                is_active = COALESCE($7, is_active), \
                updated_at = NOW() \
             WHERE id = $1 AND user_id = $2 \
             RETURNING {LINK_COLUMNS}"
        );
        let row = sqlx::query_as::<_, LinkRow>(&sql)
            .bind(link_id)
            .bind(user_id)
            .bind(patch.title)
            .bind(patch.url)
            .bind(description_set)
            .bind(description)
            .bind(patch.is_active)
            .fetch_optional(self.pool.as_ref())
            .await?;

        row.map(Link::from)
            .ok_or_else(|| AppError::not_found("Link not found", json!({ "link_id": link_id })))
    }

    async fn increment_click_count(&self, link_id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query(
            "UPDATE links SET click_count = click_count + 1 WHERE id = $1 AND is_active",
        )
        .bind(link_id)
        .execute(self.pool.as_ref())
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
