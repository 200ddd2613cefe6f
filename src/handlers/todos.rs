use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppError,
    extract::{JsonBody, QueryParams},
    models::{Author, AuthorQuery, CreateTodo, PasswordCheck, PasswordRequest, Todo, TodoSummary, UpdateTodo},
    pagination::{PageQuery, PageResult},
    service, AppState,
};

#[utoipa::path(
    get,
    path = "/api/todo",
    params(PageQuery),
    responses(
        (status = 200, description = "One page of todos", body = crate::pagination::TodoPage),
        (status = 400, description = "Malformed query parameters")
    ),
    tag = "todo"
)]
pub async fn list_todos(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<PageQuery>,
) -> Result<Json<PageResult<TodoSummary>>, AppError> {
    let page = service::get_list(&state.pool, &query, &state.page_limits).await?;
    Ok(Json(page))
}

#[utoipa::path(
    get,
    path = "/api/todo/by-author",
    params(AuthorQuery),
    responses(
        (status = 200, description = "Todos by author, newest first", body = Vec<TodoSummary>),
        (status = 400, description = "authorName missing")
    ),
    tag = "todo"
)]
pub async fn list_by_author(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<AuthorQuery>,
) -> Result<Json<Vec<TodoSummary>>, AppError> {
    let todos = service::find_by_author(&state.pool, &query.author_name).await?;
    Ok(Json(todos))
}

#[utoipa::path(
    get,
    path = "/api/todo/{id}",
    params(
        ("id" = i64, Path, description = "Todo ID")
    ),
    responses(
        (status = 200, description = "Todo details", body = Todo),
        (status = 404, description = "Todo not found")
    ),
    tag = "todo"
)]
pub async fn get_todo(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Todo>, AppError> {
    let todo = service::find_by_id(&state.pool, id).await?;
    Ok(Json(todo))
}

#[utoipa::path(
    post,
    path = "/api/todo",
    request_body = CreateTodo,
    responses(
        (status = 201, description = "Todo created", body = Todo),
        (status = 400, description = "Validation failed")
    ),
    tag = "todo"
)]
pub async fn create_todo(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<CreateTodo>,
) -> Result<(StatusCode, Json<Todo>), AppError> {
    let todo = service::register(&state.pool, &payload).await?;
    Ok((StatusCode::CREATED, Json(todo)))
}

#[utoipa::path(
    put,
    path = "/api/todo/{id}",
    params(
        ("id" = i64, Path, description = "Todo ID")
    ),
    request_body = UpdateTodo,
    responses(
        (status = 200, description = "Todo updated", body = Todo),
        (status = 400, description = "Validation failed"),
        (status = 401, description = "Password does not match"),
        (status = 404, description = "Todo not found")
    ),
    tag = "todo"
)]
pub async fn update_todo(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    JsonBody(payload): JsonBody<UpdateTodo>,
) -> Result<Json<Todo>, AppError> {
    let todo = service::update(&state.pool, id, &payload).await?;
    Ok(Json(todo))
}

#[utoipa::path(
    delete,
    path = "/api/todo/{id}",
    params(
        ("id" = i64, Path, description = "Todo ID")
    ),
    request_body = PasswordRequest,
    responses(
        (status = 200, description = "Todo deleted"),
        (status = 401, description = "Password does not match"),
        (status = 404, description = "Todo not found")
    ),
    tag = "todo"
)]
pub async fn delete_todo(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    JsonBody(payload): JsonBody<PasswordRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    service::delete(&state.pool, id, &payload.password).await?;
    Ok(Json(serde_json::json!({ "ok": true })))
}

#[utoipa::path(
    post,
    path = "/api/todo/{id}/complete",
    params(
        ("id" = i64, Path, description = "Todo ID")
    ),
    request_body = PasswordRequest,
    responses(
        (status = 200, description = "Completion flag flipped", body = Todo),
        (status = 401, description = "Password does not match"),
        (status = 404, description = "Todo not found")
    ),
    tag = "todo"
)]
pub async fn toggle_todo(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    JsonBody(payload): JsonBody<PasswordRequest>,
) -> Result<Json<Todo>, AppError> {
    let todo = service::toggle_completed(&state.pool, id, &payload.password).await?;
    Ok(Json(todo))
}

#[utoipa::path(
    post,
    path = "/api/todo/check-password/{id}",
    params(
        ("id" = i64, Path, description = "Todo ID")
    ),
    request_body = PasswordRequest,
    responses(
        (status = 200, description = "Password matches", body = PasswordCheck),
        (status = 401, description = "Password does not match"),
        (status = 404, description = "Todo not found")
    ),
    tag = "todo"
)]
pub async fn check_password(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    JsonBody(payload): JsonBody<PasswordRequest>,
) -> Result<Json<PasswordCheck>, AppError> {
    if !service::check_password(&state.pool, id, &payload.password).await? {
        return Err(AppError::PasswordMismatch(id));
    }
    Ok(Json(PasswordCheck { verified: true }))
}

#[utoipa::path(
    get,
    path = "/api/author/{id}",
    params(
        ("id" = i64, Path, description = "Author ID")
    ),
    responses(
        (status = 200, description = "Author details", body = Author),
        (status = 404, description = "Author not found")
    ),
    tag = "author"
)]
pub async fn get_author(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Author>, AppError> {
    let author = service::find_author(&state.pool, id).await?;
    Ok(Json(author))
}
