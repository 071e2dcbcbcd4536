use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{patch, post},
};
use uuid::Uuid;

use crate::{
    model::{
        OwnerContext, ReorderRejection, ResourceTyped,
        entity::{Course, Module, ModuleCreate, ModuleUpdate},
    },
    web::{
        AppState, RequestContext, WebError, WebResult,
        dto::modules::{ModuleReorderRequest, ModuleReorderResponse, ModuleWithLessons},
        error::ErrorResponse,
        middlewares,
    },
};

pub fn routes<S>(state: AppState) -> Router<S> {
    Router::new()
        .route("/", post(modules_create_handler))
        .route("/reorder", patch(modules_reorder_handler))
        .route(
            "/{id}",
            patch(modules_update_handler).delete(modules_delete_handler),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            middlewares::extract_context_fn,
        ))
        .with_state(state)
}

#[utoipa::path(
    post,
    path = "/api/v1/modules/",
    request_body = ModuleCreate,
    description = "Create a module inside a course owned by the acting instructor",
    responses(
        (status = 201, description = "Module created", body = Module),
        (status = 401, description = "You had to be authorized to do this", body = ErrorResponse),
        (status = 403, description = "You're not the owning instructor", body = ErrorResponse),
        (status = 404, description = "Course not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "modules",
    security(
        ("cookie" = [])
    )
)]
async fn modules_create_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Json(payload): Json<ModuleCreate>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;

    let owner = OwnerContext::for_course(state.mm(), payload.course_id)
        .await
        .map_err(|e| WebError::from_database(Course::get_resource_type(), e))?
        .ok_or(WebError::resource_not_found(Course::get_resource_type()))?;
    owner
        .authorize(user)
        .map_err(|e| WebError::from_database(Module::get_resource_type(), e))?;

    let created = Module::create(state.mm(), payload)
        .await
        .map_err(|e| WebError::from_database(Module::get_resource_type(), e))?;

    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    patch,
    path = "/api/v1/modules/reorder",
    request_body = ModuleReorderRequest,
    description = "Reposition every module of one course in a single atomic batch",
    responses(
        (status = 200, description = "Modules reordered, returned fully populated", body = ModuleReorderResponse),
        (status = 400, description = "Batch rejected (empty, duplicate position, cross-scope)", body = ErrorResponse),
        (status = 401, description = "You had to be authorized to do this", body = ErrorResponse),
        (status = 403, description = "You're not the owning instructor", body = ErrorResponse),
        (status = 404, description = "Anchor module not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "modules",
    security(
        ("cookie" = [])
    )
)]
async fn modules_reorder_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Json(payload): Json<ModuleReorderRequest>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;

    // the first item anchors the batch; its course stands in for the whole set
    let anchor = payload.modules.first().ok_or(WebError::reorder_rejected(
        Module::get_resource_type(),
        ReorderRejection::EmptyBatch,
    ))?;
    let owner = OwnerContext::for_module(state.mm(), anchor.id)
        .await
        .map_err(|e| WebError::from_database(Module::get_resource_type(), e))?
        .ok_or(WebError::resource_not_found(Module::get_resource_type()))?;
    owner
        .authorize(user)
        .map_err(|e| WebError::from_database(Module::get_resource_type(), e))?;

    let rows = Module::reorder(state.mm(), owner.course_id(), &payload.modules)
        .await
        .map_err(|e| WebError::from_database(Module::get_resource_type(), e))?;
    let modules = ModuleWithLessons::from_rows(rows)
        .map_err(|e| WebError::from_database(Module::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(ModuleReorderResponse::reordered(modules))))
}

#[utoipa::path(
    patch,
    path = "/api/v1/modules/{id}",
    request_body = ModuleUpdate,
    description = "Update a module's scalar fields; position and parent course never change here",
    params(
        ("id" = Uuid, Path, description = "ID of the module")
    ),
    responses(
        (status = 200, description = "Module updated", body = Module),
        (status = 401, description = "You had to be authorized to do this", body = ErrorResponse),
        (status = 403, description = "You're not the owning instructor", body = ErrorResponse),
        (status = 404, description = "Module not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "modules",
    security(
        ("cookie" = [])
    )
)]
async fn modules_update_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ModuleUpdate>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;

    let owner = OwnerContext::for_module(state.mm(), id)
        .await
        .map_err(|e| WebError::from_database(Module::get_resource_type(), e))?
        .ok_or(WebError::resource_not_found(Module::get_resource_type()))?;
    owner
        .authorize(user)
        .map_err(|e| WebError::from_database(Module::get_resource_type(), e))?;

    let module = Module::find_by_id(state.mm(), id)
        .await
        .map_err(|e| WebError::from_database(Module::get_resource_type(), e))?
        .ok_or(WebError::resource_not_found(Module::get_resource_type()))?;

    let updated = module
        .update(state.mm(), payload)
        .await
        .map_err(|e| WebError::from_database(Module::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(updated)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/modules/{id}",
    description = "Delete a module; its lessons and their contents go with it",
    params(
        ("id" = Uuid, Path, description = "ID of the module")
    ),
    responses(
        (status = 200, description = "Module deleted"),
        (status = 401, description = "You had to be authorized to do this", body = ErrorResponse),
        (status = 403, description = "You're not the owning instructor", body = ErrorResponse),
        (status = 404, description = "Module not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "modules",
    security(
        ("cookie" = [])
    )
)]
async fn modules_delete_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;

    let owner = OwnerContext::for_module(state.mm(), id)
        .await
        .map_err(|e| WebError::from_database(Module::get_resource_type(), e))?
        .ok_or(WebError::resource_not_found(Module::get_resource_type()))?;
    owner
        .authorize(user)
        .map_err(|e| WebError::from_database(Module::get_resource_type(), e))?;

    let module = Module::find_by_id(state.mm(), id)
        .await
        .map_err(|e| WebError::from_database(Module::get_resource_type(), e))?
        .ok_or(WebError::resource_not_found(Module::get_resource_type()))?;

    module
        .delete(state.mm())
        .await
        .map_err(|e| WebError::from_database(Module::get_resource_type(), e))?;

    Ok(StatusCode::OK)
}
