//! Ownership resolution for the course hierarchy.
//!
//! Every structural mutation on a course, module or lesson is gated on the
//! owning instructor. The resolver walks the hierarchy upward in a single
//! query (Lesson -> Module -> Course, or Module -> Course) and yields the
//! owning course and instructor; `authorize` then compares against the
//! acting user. Resolution is read-only.

use sqlx::prelude::FromRow;
use uuid::Uuid;

use crate::{
    model::{
        ModelManager,
        error::{DatabaseError, DatabaseResult},
    },
    web::{AuthenticatedUser, UserRole},
};

/// The owning course and instructor for a point in the hierarchy.
///
/// For a reorder batch this doubles as the anchor: the first item resolves
/// the parent scope, and the one ownership check stands in for the batch.
#[derive(Debug, Clone, Copy, FromRow)]
pub struct OwnerContext {
    course_id: Uuid,
    instructor_id: Uuid,
}

impl OwnerContext {
    pub fn course_id(&self) -> Uuid {
        self.course_id
    }

    pub fn instructor_id(&self) -> Uuid {
        self.instructor_id
    }

    pub async fn for_course(mm: &ModelManager, course_id: Uuid) -> DatabaseResult<Option<Self>> {
        let ctx = sqlx::query_as(
            "SELECT id AS course_id, instructor_id FROM courses WHERE id = $1",
        )
        .bind(course_id)
        .fetch_optional(mm.executor())
        .await?;
        Ok(ctx)
    }

    pub async fn for_module(mm: &ModelManager, module_id: Uuid) -> DatabaseResult<Option<Self>> {
        let ctx = sqlx::query_as(
            r#"
            SELECT c.id AS course_id, c.instructor_id
            FROM modules m
            JOIN courses c ON c.id = m.course_id
            WHERE m.id = $1
            "#,
        )
        .bind(module_id)
        .fetch_optional(mm.executor())
        .await?;
        Ok(ctx)
    }

    pub async fn for_lesson(mm: &ModelManager, lesson_id: Uuid) -> DatabaseResult<Option<Self>> {
        let ctx = sqlx::query_as(
            r#"
            SELECT c.id AS course_id, c.instructor_id
            FROM lessons l
            JOIN modules m ON m.id = l.module_id
            JOIN courses c ON c.id = m.course_id
            WHERE l.id = $1
            "#,
        )
        .bind(lesson_id)
        .fetch_optional(mm.executor())
        .await?;
        Ok(ctx)
    }

    /// `Ok(())` when the actor is the owning instructor, `Forbidden` otherwise.
    pub fn authorize(&self, actor: &AuthenticatedUser) -> DatabaseResult<()> {
        // admins may mutate any course
        if actor.user_role() == UserRole::Admin {
            return Ok(());
        }

        if self.instructor_id == actor.user_id() {
            Ok(())
        } else {
            Err(DatabaseError::Forbidden)
        }
    }
}
