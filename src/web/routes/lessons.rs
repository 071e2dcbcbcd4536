use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, patch, post},
};
use uuid::Uuid;

use crate::{
    model::{
        OwnerContext, ReorderRejection, ResourceTyped,
        entity::{Lesson, LessonCreate, LessonUpdate, LessonWithContentRow, Module},
    },
    web::{
        AppState, RequestContext, WebError, WebResult,
        dto::lessons::{LessonReorderRequest, LessonReorderResponse, LessonResponse},
        error::ErrorResponse,
        middlewares,
    },
};

pub fn routes<S>(state: AppState) -> Router<S> {
    Router::new()
        .route("/", post(lessons_create_handler))
        .route("/reorder", patch(lessons_reorder_handler))
        .route(
            "/{id}",
            get(lessons_get_handler)
                .patch(lessons_update_handler)
                .delete(lessons_delete_handler),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            middlewares::extract_context_fn,
        ))
        .with_state(state)
}

#[utoipa::path(
    post,
    path = "/api/v1/lessons/",
    request_body = LessonCreate,
    description = "Create a lesson; an optional content document is written in the same transaction",
    responses(
        (status = 201, description = "Lesson created, content attached when supplied", body = LessonResponse),
        (status = 401, description = "You had to be authorized to do this", body = ErrorResponse),
        (status = 403, description = "You're not the owning instructor", body = ErrorResponse),
        (status = 404, description = "Module not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "lessons",
    security(
        ("cookie" = [])
    )
)]
async fn lessons_create_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Json(payload): Json<LessonCreate>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;

    let owner = OwnerContext::for_module(state.mm(), payload.module_id)
        .await
        .map_err(|e| WebError::from_database(Module::get_resource_type(), e))?
        .ok_or(WebError::resource_not_found(Module::get_resource_type()))?;
    owner
        .authorize(user)
        .map_err(|e| WebError::from_database(Lesson::get_resource_type(), e))?;

    let created = Lesson::create_with_content(state.mm(), payload)
        .await
        .map(LessonResponse::from)
        .map_err(|e| WebError::from_database(Lesson::get_resource_type(), e))?;

    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    get,
    path = "/api/v1/lessons/{id}",
    description = "Fetch a lesson together with its content document, when one exists",
    params(
        ("id" = Uuid, Path, description = "ID of the lesson")
    ),
    responses(
        (status = 200, description = "Lesson found", body = LessonResponse),
        (status = 401, description = "You had to be authorized to do this", body = ErrorResponse),
        (status = 404, description = "Lesson not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "lessons",
    security(
        ("cookie" = [])
    )
)]
async fn lessons_get_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> WebResult<impl IntoResponse> {
    ctx.user()?;

    Lesson::find_by_id(state.mm(), id)
        .await
        .map_err(|e| WebError::from_database(Lesson::get_resource_type(), e))?
        .ok_or(WebError::resource_not_found(Lesson::get_resource_type()))?;

    let lesson = LessonWithContentRow::fetch_by_id(state.mm(), id)
        .await
        .map(LessonResponse::from)
        .map_err(|e| WebError::from_database(Lesson::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(lesson)))
}

#[utoipa::path(
    patch,
    path = "/api/v1/lessons/reorder",
    request_body = LessonReorderRequest,
    description = "Reposition every lesson of one module in a single atomic batch",
    responses(
        (status = 200, description = "Lessons reordered, returned with contents", body = LessonReorderResponse),
        (status = 400, description = "Batch rejected (empty, duplicate position, cross-scope)", body = ErrorResponse),
        (status = 401, description = "You had to be authorized to do this", body = ErrorResponse),
        (status = 403, description = "You're not the owning instructor", body = ErrorResponse),
        (status = 404, description = "Anchor lesson not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "lessons",
    security(
        ("cookie" = [])
    )
)]
async fn lessons_reorder_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Json(payload): Json<LessonReorderRequest>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;

    let anchor = payload.lessons.first().ok_or(WebError::reorder_rejected(
        Lesson::get_resource_type(),
        ReorderRejection::EmptyBatch,
    ))?;
    let owner = OwnerContext::for_lesson(state.mm(), anchor.id)
        .await
        .map_err(|e| WebError::from_database(Lesson::get_resource_type(), e))?
        .ok_or(WebError::resource_not_found(Lesson::get_resource_type()))?;
    owner
        .authorize(user)
        .map_err(|e| WebError::from_database(Lesson::get_resource_type(), e))?;

    // scope to the anchor's module, not the course: lessons reorder within a module
    let anchor_lesson = Lesson::find_by_id(state.mm(), anchor.id)
        .await
        .map_err(|e| WebError::from_database(Lesson::get_resource_type(), e))?
        .ok_or(WebError::resource_not_found(Lesson::get_resource_type()))?;

    let rows = Lesson::reorder(state.mm(), anchor_lesson.module_id(), &payload.lessons)
        .await
        .map_err(|e| WebError::from_database(Lesson::get_resource_type(), e))?;
    let lessons = rows.into_iter().map(LessonResponse::from).collect();

    Ok((StatusCode::OK, Json(LessonReorderResponse::reordered(lessons))))
}

#[utoipa::path(
    patch,
    path = "/api/v1/lessons/{id}",
    request_body = LessonUpdate,
    description = "Update a lesson's scalar fields; a supplied content document is \
                   created-or-replaced in the same transaction",
    params(
        ("id" = Uuid, Path, description = "ID of the lesson")
    ),
    responses(
        (status = 200, description = "Lesson updated", body = LessonResponse),
        (status = 401, description = "You had to be authorized to do this", body = ErrorResponse),
        (status = 403, description = "You're not the owning instructor", body = ErrorResponse),
        (status = 404, description = "Lesson not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "lessons",
    security(
        ("cookie" = [])
    )
)]
async fn lessons_update_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<LessonUpdate>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;

    let owner = OwnerContext::for_lesson(state.mm(), id)
        .await
        .map_err(|e| WebError::from_database(Lesson::get_resource_type(), e))?
        .ok_or(WebError::resource_not_found(Lesson::get_resource_type()))?;
    owner
        .authorize(user)
        .map_err(|e| WebError::from_database(Lesson::get_resource_type(), e))?;

    let lesson = Lesson::find_by_id(state.mm(), id)
        .await
        .map_err(|e| WebError::from_database(Lesson::get_resource_type(), e))?
        .ok_or(WebError::resource_not_found(Lesson::get_resource_type()))?;

    let updated = lesson
        .update_with_content(state.mm(), payload)
        .await
        .map(LessonResponse::from)
        .map_err(|e| WebError::from_database(Lesson::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(updated)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/lessons/{id}",
    description = "Delete a lesson and its content record",
    params(
        ("id" = Uuid, Path, description = "ID of the lesson")
    ),
    responses(
        (status = 200, description = "Lesson deleted"),
        (status = 401, description = "You had to be authorized to do this", body = ErrorResponse),
        (status = 403, description = "You're not the owning instructor", body = ErrorResponse),
        (status = 404, description = "Lesson not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "lessons",
    security(
        ("cookie" = [])
    )
)]
async fn lessons_delete_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;

    let owner = OwnerContext::for_lesson(state.mm(), id)
        .await
        .map_err(|e| WebError::from_database(Lesson::get_resource_type(), e))?
        .ok_or(WebError::resource_not_found(Lesson::get_resource_type()))?;
    owner
        .authorize(user)
        .map_err(|e| WebError::from_database(Lesson::get_resource_type(), e))?;

    let lesson = Lesson::find_by_id(state.mm(), id)
        .await
        .map_err(|e| WebError::from_database(Lesson::get_resource_type(), e))?
        .ok_or(WebError::resource_not_found(Lesson::get_resource_type()))?;

    lesson
        .delete(state.mm())
        .await
        .map_err(|e| WebError::from_database(Lesson::get_resource_type(), e))?;

    Ok(StatusCode::OK)
}
