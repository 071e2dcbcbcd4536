use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::{ReorderItem, entity::LessonWithContentRow};

#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct LessonResponse {
    pub id: Uuid,
    pub module_id: Uuid,
    pub title: String,
    pub description: String,
    pub order_index: i32,
    /// The lesson's single content document, when one exists.
    pub content: Option<serde_json::Value>,
}

impl From<LessonWithContentRow> for LessonResponse {
    fn from(row: LessonWithContentRow) -> Self {
        Self {
            id: row.id,
            module_id: row.module_id,
            title: row.title,
            description: row.description,
            order_index: row.order_index,
            content: row.content,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct LessonReorderRequest {
    pub lessons: Vec<ReorderItem>,
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct LessonReorderResponse {
    pub success: bool,
    pub message: String,
    pub lessons: Vec<LessonResponse>,
}

impl LessonReorderResponse {
    pub fn reordered(lessons: Vec<LessonResponse>) -> Self {
        Self {
            success: true,
            message: String::from("Lessons reordered."),
            lessons,
        }
    }
}
