use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::get,
};
use uuid::Uuid;

use crate::{
    model::{
        CrudRepository, OwnerContext, PaginatableRepository, ResourceTyped,
        entity::{Course, Module, ModuleWithLessonsRow},
    },
    web::{
        AppState, RequestContext, WebError, WebResult,
        dto::{courses::CourseBody, modules::ModuleWithLessons},
        error::ErrorResponse,
        middlewares,
        routes::PaginationQuery,
    },
};

pub fn routes<S>(state: AppState) -> Router<S> {
    Router::new()
        .route("/", get(courses_list_handler).post(courses_create_handler))
        .route(
            "/{id}",
            get(courses_get_handler)
                .patch(courses_update_handler)
                .delete(courses_delete_handler),
        )
        .route("/{id}/modules", get(courses_modules_handler))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            middlewares::extract_context_fn,
        ))
        .with_state(state)
}

#[utoipa::path(
    get,
    path = "/api/v1/courses/",
    description = "List published courses, paginated",
    responses(
        (status = 200, description = "A page of published courses", body = crate::model::Page<Course>),
        (status = 401, description = "You had to be authorized to do this", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "courses",
    security(
        ("cookie" = [])
    )
)]
async fn courses_list_handler(
    ctx: RequestContext,
    Query(page): Query<PaginationQuery>,
    State(state): State<AppState>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    let courses = Course::page(state.mm(), user, page.limit(), page.offset())
        .await
        .map_err(|e| WebError::from_database(Course::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(courses)))
}

#[utoipa::path(
    post,
    path = "/api/v1/courses/",
    request_body = CourseBody,
    description = "Create a course owned by the acting instructor",
    responses(
        (status = 201, description = "Course created", body = Course),
        (status = 401, description = "You had to be authorized to do this", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "courses",
    security(
        ("cookie" = [])
    )
)]
async fn courses_create_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Json(payload): Json<CourseBody>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    let created = Course::create(state.mm(), user, payload.into())
        .await
        .map_err(|e| WebError::from_database(Course::get_resource_type(), e))?;

    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    get,
    path = "/api/v1/courses/{id}",
    params(
        ("id" = Uuid, Path, description = "ID of the course")
    ),
    responses(
        (status = 200, description = "Course found", body = Course),
        (status = 404, description = "Course not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "courses"
)]
async fn courses_get_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    let course = Course::find_by_id(state.mm(), user, id)
        .await
        .map_err(|e| WebError::from_database(Course::get_resource_type(), e))?
        .ok_or(WebError::resource_not_found(Course::get_resource_type()))?;

    Ok((StatusCode::OK, Json(course)))
}

#[utoipa::path(
    patch,
    path = "/api/v1/courses/{id}",
    request_body = CourseBody,
    params(
        ("id" = Uuid, Path, description = "ID of the course")
    ),
    responses(
        (status = 200, description = "Course updated", body = Course),
        (status = 401, description = "You had to be authorized to do this", body = ErrorResponse),
        (status = 403, description = "You're not the owning instructor", body = ErrorResponse),
        (status = 404, description = "Course not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "courses",
    security(
        ("cookie" = [])
    )
)]
async fn courses_update_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CourseBody>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;

    let owner = OwnerContext::for_course(state.mm(), id)
        .await
        .map_err(|e| WebError::from_database(Course::get_resource_type(), e))?
        .ok_or(WebError::resource_not_found(Course::get_resource_type()))?;
    owner
        .authorize(user)
        .map_err(|e| WebError::from_database(Course::get_resource_type(), e))?;

    let course = Course::find_by_id(state.mm(), user, id)
        .await
        .map_err(|e| WebError::from_database(Course::get_resource_type(), e))?
        .ok_or(WebError::resource_not_found(Course::get_resource_type()))?;

    let updated = course
        .update(state.mm(), user, payload.into())
        .await
        .map_err(|e| WebError::from_database(Course::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(updated)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/courses/{id}",
    description = "Delete a course and everything under it (modules, lessons, contents)",
    params(
        ("id" = Uuid, Path, description = "ID of the course")
    ),
    responses(
        (status = 200, description = "Course deleted"),
        (status = 401, description = "You had to be authorized to do this", body = ErrorResponse),
        (status = 403, description = "You're not the owning instructor", body = ErrorResponse),
        (status = 404, description = "Course not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "courses",
    security(
        ("cookie" = [])
    )
)]
async fn courses_delete_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;

    let owner = OwnerContext::for_course(state.mm(), id)
        .await
        .map_err(|e| WebError::from_database(Course::get_resource_type(), e))?
        .ok_or(WebError::resource_not_found(Course::get_resource_type()))?;
    owner
        .authorize(user)
        .map_err(|e| WebError::from_database(Course::get_resource_type(), e))?;

    let course = Course::find_by_id(state.mm(), user, id)
        .await
        .map_err(|e| WebError::from_database(Course::get_resource_type(), e))?
        .ok_or(WebError::resource_not_found(Course::get_resource_type()))?;

    course
        .delete(state.mm(), user)
        .await
        .map_err(|e| WebError::from_database(Course::get_resource_type(), e))?;

    Ok(StatusCode::OK)
}

#[utoipa::path(
    get,
    path = "/api/v1/courses/{id}/modules",
    description = "List the course's modules with nested lessons, ordered by position",
    params(
        ("id" = Uuid, Path, description = "ID of the course")
    ),
    responses(
        (status = 200, description = "Modules with lessons", body = Vec<ModuleWithLessons>),
        (status = 401, description = "You had to be authorized to do this", body = ErrorResponse),
        (status = 404, description = "Course not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "courses",
    security(
        ("cookie" = [])
    )
)]
async fn courses_modules_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> WebResult<impl IntoResponse> {
    ctx.user()?;

    OwnerContext::for_course(state.mm(), id)
        .await
        .map_err(|e| WebError::from_database(Course::get_resource_type(), e))?
        .ok_or(WebError::resource_not_found(Course::get_resource_type()))?;

    let rows = ModuleWithLessonsRow::fetch_by_course(state.mm(), id)
        .await
        .map_err(|e| WebError::from_database(Module::get_resource_type(), e))?;
    let modules = ModuleWithLessons::from_rows(rows)
        .map_err(|e| WebError::from_database(Module::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(modules)))
}
