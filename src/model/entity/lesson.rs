use crate::model::entity::Content;
use crate::model::repo::ResourceTyped;
use crate::model::reorder::{ReorderItem, validate_reorder};
use crate::model::{ModelManager, error::DatabaseResult};
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct Lesson {
    id: Uuid,
    module_id: Uuid,
    title: String,
    description: String,
    order_index: i32,
}

#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct LessonCreate {
    pub module_id: Uuid,
    pub title: String,
    pub description: String,
    /// Defaults to the end of the module when omitted.
    pub order_index: Option<i32>,
    /// Optional content document; written together with the lesson row.
    pub content: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct LessonUpdate {
    pub title: String,
    pub description: String,
    /// When present, creates or replaces the lesson's single content record
    /// in the same transaction as the scalar update. When omitted, any
    /// existing content is left untouched.
    pub content: Option<serde_json::Value>,
}

impl ResourceTyped for Lesson {
    fn get_resource_type() -> crate::model::ResourceType {
        crate::model::ResourceType::Lesson
    }
}

impl Lesson {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn module_id(&self) -> Uuid {
        self.module_id
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

impl Lesson {
    /// Inserts the lesson row and, when a content document is supplied, its
    /// content row in one transaction. A reader never observes a lesson whose
    /// content insert failed half-way.
    pub async fn create_with_content(
        mm: &ModelManager,
        data: LessonCreate,
    ) -> DatabaseResult<LessonWithContentRow> {
        let id = Uuid::new_v4();

        let mut tx = mm.executor().begin().await?;
        sqlx::query(
            r#"
            INSERT INTO lessons (id, module_id, title, description, order_index)
            VALUES ($1, $2, $3, $4,
                    COALESCE($5, (SELECT COALESCE(MAX(order_index) + 1, 0)
                                  FROM lessons WHERE module_id = $2)))
            "#,
        )
        .bind(id)
        .bind(data.module_id)
        .bind(&data.title)
        .bind(&data.description)
        .bind(data.order_index)
        .execute(&mut *tx)
        .await?;

        if let Some(payload) = &data.content {
            Content::upsert_in(&mut tx, id, payload).await?;
        }
        tx.commit().await?;

        LessonWithContentRow::fetch_by_id(mm, id).await
    }

    /// Updates scalar fields and, when a content document is supplied,
    /// creates-or-replaces the lesson's single content record, both as one
    /// atomic unit. Parentage and position never change here.
    pub async fn update_with_content(
        self,
        mm: &ModelManager,
        data: LessonUpdate,
    ) -> DatabaseResult<LessonWithContentRow> {
        let mut tx = mm.executor().begin().await?;
        sqlx::query("UPDATE lessons SET title = $1, description = $2 WHERE id = $3")
            .bind(&data.title)
            .bind(&data.description)
            .bind(self.id)
            .execute(&mut *tx)
            .await?;

        if let Some(payload) = &data.content {
            Content::upsert_in(&mut tx, self.id, payload).await?;
        }
        tx.commit().await?;

        LessonWithContentRow::fetch_by_id(mm, self.id).await
    }

    /// Cascades to the content record via the schema.
    pub async fn delete(self, mm: &ModelManager) -> DatabaseResult<()> {
        sqlx::query("DELETE FROM lessons WHERE id = $1")
            .bind(self.id)
            .execute(mm.executor())
            .await?;
        Ok(())
    }

    pub async fn find_by_id(mm: &ModelManager, id: Uuid) -> DatabaseResult<Option<Self>> {
        let result = sqlx::query_as("SELECT * FROM lessons WHERE id = $1")
            .bind(id)
            .fetch_optional(mm.executor())
            .await?;
        Ok(result)
    }

    pub async fn list_by_module(mm: &ModelManager, module_id: Uuid) -> DatabaseResult<Vec<Self>> {
        let result =
            sqlx::query_as("SELECT * FROM lessons WHERE module_id = $1 ORDER BY order_index")
                .bind(module_id)
                .fetch_all(mm.executor())
                .await?;
        Ok(result)
    }

    /// Applies a validated reorder batch to the lessons of `module_id` as one
    /// transaction. Mirrors `Module::reorder`, including the strict check
    /// that every id in the batch belongs to this exact module.
    pub async fn reorder(
        mm: &ModelManager,
        module_id: Uuid,
        items: &[ReorderItem],
    ) -> DatabaseResult<Vec<LessonWithContentRow>> {
        let siblings: Vec<Uuid> = sqlx::query_scalar("SELECT id FROM lessons WHERE module_id = $1")
            .bind(module_id)
            .fetch_all(mm.executor())
            .await?;

        let batch = validate_reorder(items, &siblings)?;

        let mut tx = mm.executor().begin().await?;
        for item in batch.items() {
            sqlx::query("UPDATE lessons SET order_index = $1 WHERE id = $2 AND module_id = $3")
                .bind(item.order_index)
                .bind(item.id)
                .bind(module_id)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;

        LessonWithContentRow::fetch_by_module(mm, module_id).await
    }
}

// Utils

/// A lesson joined with its 0..1 content payload.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow)]
pub struct LessonWithContentRow {
    pub id: Uuid,
    pub module_id: Uuid,
    pub title: String,
    pub description: String,
    pub order_index: i32,
    pub content: Option<serde_json::Value>,
}

impl LessonWithContentRow {
    pub async fn fetch_by_id(mm: &ModelManager, lesson_id: Uuid) -> DatabaseResult<Self> {
        let row = sqlx::query_as(
            r#"
            SELECT l.id, l.module_id, l.title, l.description, l.order_index,
                   c.payload AS content
            FROM lessons l
            LEFT JOIN contents c ON c.lesson_id = l.id
            WHERE l.id = $1
            "#,
        )
        .bind(lesson_id)
        .fetch_one(mm.executor())
        .await?;

        Ok(row)
    }

    pub async fn fetch_by_module(
        mm: &ModelManager,
        module_id: Uuid,
    ) -> DatabaseResult<Vec<Self>> {
        let rows = sqlx::query_as(
            r#"
            SELECT l.id, l.module_id, l.title, l.description, l.order_index,
                   c.payload AS content
            FROM lessons l
            LEFT JOIN contents c ON c.lesson_id = l.id
            WHERE l.module_id = $1
            ORDER BY l.order_index
            "#,
        )
        .bind(module_id)
        .fetch_all(mm.executor())
        .await?;

        Ok(rows)
    }
}
