use crate::model::repo::ResourceTyped;
use crate::model::{ModelManager, error::DatabaseResult};
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use sqlx::{PgConnection, Postgres, Transaction};
use uuid::Uuid;

/// A lesson's single rich-content record: a free-form document of
/// VIDEO/TEXT/QUIZ blocks. `lesson_id` is unique, so a lesson has at most
/// one of these. Writes only happen inside a lesson transaction; there is
/// no standalone mutation path.
#[derive(Debug, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct Content {
    id: Uuid,
    lesson_id: Uuid,
    payload: serde_json::Value,
}

impl ResourceTyped for Content {
    fn get_resource_type() -> crate::model::ResourceType {
        crate::model::ResourceType::Content
    }
}

impl Content {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn lesson_id(&self) -> Uuid {
        self.lesson_id
    }

    pub fn payload(&self) -> &serde_json::Value {
        &self.payload
    }

    /// Create-if-absent, else replace-in-place, keyed on the unique
    /// `lesson_id`. Runs on the caller's transaction so the content write
    /// commits or rolls back together with the lesson row.
    pub async fn upsert_in(
        tx: &mut Transaction<'_, Postgres>,
        lesson_id: Uuid,
        payload: &serde_json::Value,
    ) -> DatabaseResult<()> {
        let conn: &mut PgConnection = &mut *tx;
        sqlx::query(
            r#"
            INSERT INTO contents (id, lesson_id, payload)
            VALUES ($1, $2, $3)
            ON CONFLICT (lesson_id) DO UPDATE SET payload = EXCLUDED.payload
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(lesson_id)
        .bind(payload)
        .execute(conn)
        .await?;

        Ok(())
    }

    pub async fn find_by_lesson(
        mm: &ModelManager,
        lesson_id: Uuid,
    ) -> DatabaseResult<Option<Self>> {
        let result = sqlx::query_as("SELECT * FROM contents WHERE lesson_id = $1")
            .bind(lesson_id)
            .fetch_optional(mm.executor())
            .await?;
        Ok(result)
    }
}
