use crate::impl_paginatable_for;
use crate::model::repo::ResourceTyped;
use crate::model::{ModelManager, error::DatabaseResult, repo::CrudRepository};
use crate::utils::slug::slugify;
use crate::web::AuthenticatedUser;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, sqlx::Type, utoipa::ToSchema)]
#[sqlx(type_name = "course_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum CourseStatus {
    Draft,
    Published,
    Archived,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, sqlx::Type, utoipa::ToSchema)]
#[sqlx(type_name = "course_level", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum CourseLevel {
    Beginner,
    Intermediate,
    Advanced,
}

#[derive(Debug, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct Course {
    id: Uuid,
    instructor_id: Uuid,
    title: String,
    slug: String,
    description: String,
    status: CourseStatus,
    price_cents: i64,
    level: CourseLevel,
    category: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct CourseCreateUpdate {
    pub title: String,
    pub description: String,
    pub status: Option<CourseStatus>,
    pub price_cents: Option<i64>,
    pub level: Option<CourseLevel>,
    /// Absent keeps the stored category, an explicit `null` clears it.
    #[serde(default, deserialize_with = "nullable_field")]
    pub category: Option<Option<String>>,
}

/// Keeps the outer `Option` when the field is present, so `"category": null`
/// deserializes to `Some(None)` while a missing field stays `None`.
pub(crate) fn nullable_field<'de, D>(
    deserializer: D,
) -> Result<Option<Option<String>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    serde::Deserialize::deserialize(deserializer).map(Some)
}

impl ResourceTyped for Course {
    fn get_resource_type() -> crate::model::ResourceType {
        crate::model::ResourceType::Course
    }
}

impl Course {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn instructor_id(&self) -> Uuid {
        self.instructor_id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn slug(&self) -> &str {
        &self.slug
    }

    pub fn status(&self) -> CourseStatus {
        self.status
    }
}

#[async_trait]
impl CrudRepository<Course, CourseCreateUpdate, Uuid> for Course {
    /// Creates a course owned by the acting instructor. The slug is derived
    /// from the title; on a slug collision the insert is retried once with a
    /// short random suffix, keeping `slugify` itself pure.
    async fn create(
        mm: &ModelManager,
        actor: &AuthenticatedUser,
        data: CourseCreateUpdate,
    ) -> DatabaseResult<Self> {
        let slug = slugify(&data.title);

        let first = Self::insert(mm, actor, &data, &slug).await;
        match first {
            Err(crate::model::DatabaseError::SqlxError(sqlx::Error::Database(db)))
                if db.constraint() == Some("courses_slug_key") =>
            {
                let suffix = Uuid::new_v4().simple().to_string();
                let slug = format!("{}-{}", slug, &suffix[..8]);
                Self::insert(mm, actor, &data, &slug).await
            }
            other => other,
        }
    }

    async fn update(
        self,
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        data: CourseCreateUpdate,
    ) -> DatabaseResult<Self> {
        let updated = sqlx::query_as(
            r#"
            UPDATE courses
            SET title = $1, description = $2, status = $3,
                price_cents = $4, level = $5, category = $6
            WHERE id = $7
            RETURNING *
            "#,
        )
        .bind(&data.title)
        .bind(&data.description)
        .bind(data.status.unwrap_or(self.status))
        .bind(data.price_cents.unwrap_or(self.price_cents))
        .bind(data.level.unwrap_or(self.level))
        .bind(match &data.category {
            Some(category) => category.as_deref(),
            None => self.category.as_deref(),
        })
        .bind(self.id)
        .fetch_one(mm.executor())
        .await?;

        Ok(updated)
    }

    /// Cascades through modules, lessons and contents via the schema.
    async fn delete(self, mm: &ModelManager, _actor: &AuthenticatedUser) -> DatabaseResult<()> {
        sqlx::query("DELETE FROM courses WHERE id = $1")
            .bind(self.id)
            .execute(mm.executor())
            .await?;
        Ok(())
    }

    async fn find_by_id(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        id: Uuid,
    ) -> DatabaseResult<Option<Self>> {
        let result = sqlx::query_as("SELECT * FROM courses WHERE id = $1")
            .bind(id)
            .fetch_optional(mm.executor())
            .await?;
        Ok(result)
    }

    async fn list(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        limit: i64,
        offset: i64,
    ) -> DatabaseResult<Vec<Self>> {
        let result = sqlx::query_as(
            "SELECT * FROM courses WHERE status = 'published' ORDER BY title LIMIT $1 OFFSET $2",
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(mm.executor())
        .await?;
        Ok(result)
    }

    async fn count(mm: &ModelManager, _actor: &AuthenticatedUser) -> DatabaseResult<i64> {
        let result: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM courses WHERE status = 'published'")
                .fetch_one(mm.executor())
                .await?;

        Ok(result)
    }
}

impl Course {
    async fn insert(
        mm: &ModelManager,
        actor: &AuthenticatedUser,
        data: &CourseCreateUpdate,
        slug: &str,
    ) -> DatabaseResult<Self> {
        let created = sqlx::query_as(
            r#"
            INSERT INTO courses (id, instructor_id, title, slug, description,
                                 status, price_cents, level, category)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(actor.user_id())
        .bind(&data.title)
        .bind(slug)
        .bind(&data.description)
        .bind(data.status.unwrap_or(CourseStatus::Draft))
        .bind(data.price_cents.unwrap_or(0))
        .bind(data.level.unwrap_or(CourseLevel::Beginner))
        .bind(data.category.as_ref().and_then(|c| c.as_deref()))
        .fetch_one(mm.executor())
        .await?;

        Ok(created)
    }

    pub async fn find_by_slug(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        slug: &str,
    ) -> DatabaseResult<Option<Self>> {
        let result = sqlx::query_as("SELECT * FROM courses WHERE slug = $1")
            .bind(slug)
            .fetch_optional(mm.executor())
            .await?;
        Ok(result)
    }
}

impl_paginatable_for!(Course, CourseCreateUpdate, Uuid);
