use crate::model::repo::ResourceTyped;
use crate::model::reorder::{ReorderItem, validate_reorder};
use crate::model::{ModelManager, error::DatabaseResult};
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct Module {
    id: Uuid,
    course_id: Uuid,
    title: String,
    description: String,
    order_index: i32,
}

#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct ModuleCreate {
    pub course_id: Uuid,
    pub title: String,
    pub description: String,
    /// Defaults to the end of the course when omitted.
    pub order_index: Option<i32>,
}

#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct ModuleUpdate {
    pub title: String,
    pub description: String,
}

impl ResourceTyped for Module {
    fn get_resource_type() -> crate::model::ResourceType {
        crate::model::ResourceType::Module
    }
}

impl Module {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn course_id(&self) -> Uuid {
        self.course_id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn order_index(&self) -> i32 {
        self.order_index
    }
}

impl Module {
    /// The caller resolves and authorizes the owning course first;
    /// `course_id` is immutable after this insert.
    pub async fn create(mm: &ModelManager, data: ModuleCreate) -> DatabaseResult<Self> {
        let created = sqlx::query_as(
            r#"
            INSERT INTO modules (id, course_id, title, description, order_index)
            VALUES ($1, $2, $3, $4,
                    COALESCE($5, (SELECT COALESCE(MAX(order_index) + 1, 0)
                                  FROM modules WHERE course_id = $2)))
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(data.course_id)
        .bind(&data.title)
        .bind(&data.description)
        .bind(data.order_index)
        .fetch_one(mm.executor())
        .await?;

        Ok(created)
    }

    /// Scalar fields only. Parentage and position never change here.
    pub async fn update(self, mm: &ModelManager, data: ModuleUpdate) -> DatabaseResult<Self> {
        let updated = sqlx::query_as(
            "UPDATE modules SET title = $1, description = $2 WHERE id = $3 RETURNING *",
        )
        .bind(&data.title)
        .bind(&data.description)
        .bind(self.id)
        .fetch_one(mm.executor())
        .await?;

        Ok(updated)
    }

    /// Cascades to child lessons and their contents via the schema.
    pub async fn delete(self, mm: &ModelManager) -> DatabaseResult<()> {
        sqlx::query("DELETE FROM modules WHERE id = $1")
            .bind(self.id)
            .execute(mm.executor())
            .await?;
        Ok(())
    }

    pub async fn find_by_id(mm: &ModelManager, id: Uuid) -> DatabaseResult<Option<Self>> {
        let result = sqlx::query_as("SELECT * FROM modules WHERE id = $1")
            .bind(id)
            .fetch_optional(mm.executor())
            .await?;
        Ok(result)
    }

    pub async fn list_by_course(mm: &ModelManager, course_id: Uuid) -> DatabaseResult<Vec<Self>> {
        let result =
            sqlx::query_as("SELECT * FROM modules WHERE course_id = $1 ORDER BY order_index")
                .bind(course_id)
                .fetch_all(mm.executor())
                .await?;
        Ok(result)
    }

    /// Applies a validated reorder batch to the modules of `course_id` as one
    /// transaction: either every position updates or none does. The deferred
    /// `(course_id, order_index)` uniqueness constraint re-checks the batch
    /// at commit, so a concurrent reorder on the same course cannot leave
    /// duplicate positions behind.
    ///
    /// Returns the refreshed sibling set with nested lessons, ordered
    /// ascending by position.
    pub async fn reorder(
        mm: &ModelManager,
        course_id: Uuid,
        items: &[ReorderItem],
    ) -> DatabaseResult<Vec<ModuleWithLessonsRow>> {
        let siblings: Vec<Uuid> = sqlx::query_scalar("SELECT id FROM modules WHERE course_id = $1")
            .bind(course_id)
            .fetch_all(mm.executor())
            .await?;

        let batch = validate_reorder(items, &siblings)?;

        let mut tx = mm.executor().begin().await?;
        for item in batch.items() {
            // course_id in the predicate keeps the write inside the anchor scope
            sqlx::query("UPDATE modules SET order_index = $1 WHERE id = $2 AND course_id = $3")
                .bind(item.order_index)
                .bind(item.id)
                .bind(course_id)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;

        ModuleWithLessonsRow::fetch_by_course(mm, course_id).await
    }
}

// Utils

/// A module with its lessons (and their content documents) aggregated in one
/// round trip, lessons ordered by position.
#[derive(sqlx::FromRow)]
pub struct ModuleWithLessonsRow {
    pub id: Uuid,
    pub course_id: Uuid,
    pub title: String,
    pub description: String,
    pub order_index: i32,
    pub lessons: serde_json::Value,
}

impl ModuleWithLessonsRow {
    pub async fn fetch_by_course(
        mm: &ModelManager,
        course_id: Uuid,
    ) -> DatabaseResult<Vec<Self>> {
        let rows: Vec<ModuleWithLessonsRow> = sqlx::query_as(
            r#"
            SELECT
                m.id,
                m.course_id,
                m.title,
                m.description,
                m.order_index,
                COALESCE(
                    json_agg(
                        json_build_object(
                            'id', l.id,
                            'title', l.title,
                            'description', l.description,
                            'order_index', l.order_index,
                            'content', c.payload
                        )
                        ORDER BY l.order_index
                    ) FILTER (WHERE l.id IS NOT NULL),
                    '[]'
                ) AS lessons
            FROM modules m
            LEFT JOIN lessons l ON l.module_id = m.id
            LEFT JOIN contents c ON c.lesson_id = l.id
            WHERE m.course_id = $1
            GROUP BY m.id
            ORDER BY m.order_index
            "#,
        )
        .bind(course_id)
        .fetch_all(mm.executor())
        .await?;

        Ok(rows)
    }
}
