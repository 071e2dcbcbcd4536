use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::{DatabaseResult, ReorderItem, entity::ModuleWithLessonsRow};

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct LessonSummary {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub order_index: i32,
    /// The lesson's single content document, when one exists.
    pub content: Option<serde_json::Value>,
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ModuleWithLessons {
    pub id: Uuid,
    pub course_id: Uuid,
    pub title: String,
    pub description: String,
    pub order_index: i32,
    pub lessons: Vec<LessonSummary>,
}

impl TryFrom<ModuleWithLessonsRow> for ModuleWithLessons {
    type Error = serde_json::Error;

    fn try_from(value: ModuleWithLessonsRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: value.id,
            course_id: value.course_id,
            title: value.title,
            description: value.description,
            order_index: value.order_index,
            lessons: serde_json::from_value(value.lessons)?,
        })
    }
}

impl ModuleWithLessons {
    pub fn from_rows(rows: Vec<ModuleWithLessonsRow>) -> DatabaseResult<Vec<Self>> {
        Ok(rows
            .into_iter()
            .map(ModuleWithLessons::try_from)
            .collect::<Result<_, _>>()?)
    }
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ModuleReorderRequest {
    pub modules: Vec<ReorderItem>,
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ModuleReorderResponse {
    pub success: bool,
    pub message: String,
    pub modules: Vec<ModuleWithLessons>,
}

impl ModuleReorderResponse {
    pub fn reordered(modules: Vec<ModuleWithLessons>) -> Self {
        Self {
            success: true,
            message: String::from("Modules reordered."),
            modules,
        }
    }
}
