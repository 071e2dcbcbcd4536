use serde::{Deserialize, Serialize};

use crate::model::entity::{CourseLevel, CourseStatus, nullable_field};

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct CourseBody {
    pub title: String,
    pub description: String,
    pub status: Option<CourseStatus>,
    pub price_cents: Option<i64>,
    pub level: Option<CourseLevel>,
    /// Absent keeps the stored category, an explicit `null` clears it.
    #[serde(default, deserialize_with = "nullable_field")]
    pub category: Option<Option<String>>,
}

impl From<CourseBody> for crate::model::entity::CourseCreateUpdate {
    fn from(body: CourseBody) -> Self {
        Self {
            title: body.title,
            description: body.description,
            status: body.status,
            price_cents: body.price_cents,
            level: body.level,
            category: body.category,
        }
    }
}
