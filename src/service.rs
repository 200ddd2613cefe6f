//! Use cases shared by the JSON API and the HTML pages.

use chrono::Utc;
use sqlx::SqlitePool;
use validator::Validate;

use crate::{
    error::AppError,
    models::{Author, CreateTodo, Todo, TodoSummary, UpdateTodo, DEFAULT_AUTHOR_NAME},
    pagination::{PageLimits, PageQuery, PageResult},
    repository::{self, NewTodo},
};

pub async fn get_list(
    pool: &SqlitePool,
    query: &PageQuery,
    limits: &PageLimits,
) -> Result<PageResult<TodoSummary>, AppError> {
    let request = query.normalize(limits);
    let (items, total) = repository::fetch_page(pool, &request).await?;
    Ok(PageResult::new(&request, query.search_type, items, total))
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> Result<Todo, AppError> {
    repository::find_by_id(pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Todo {id} not found")))
}

pub async fn find_by_author(
    pool: &SqlitePool,
    author_name: &str,
) -> Result<Vec<TodoSummary>, AppError> {
    if author_name.trim().is_empty() {
        return Err(AppError::ValidationError("authorName is required".to_string()));
    }
    Ok(repository::find_by_author(pool, author_name.trim()).await?)
}

pub async fn find_author(pool: &SqlitePool, author_id: i64) -> Result<Author, AppError> {
    repository::find_author(pool, author_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Author {author_id} not found")))
}

/// Stores a new author and the to-do that belongs to it.
pub async fn register(pool: &SqlitePool, payload: &CreateTodo) -> Result<Todo, AppError> {
    payload.validate()?;

    let now = Utc::now().naive_utc();
    let author_name = payload
        .author_name
        .as_deref()
        .map(str::trim)
        .unwrap_or(DEFAULT_AUTHOR_NAME);

    // 1. Author first, its id is the todo's foreign key
    let mut tx = pool.begin().await?;
    let author_id =
        repository::insert_author(&mut *tx, author_name, payload.email.as_deref(), now).await?;

    // 2. Todo itself
    let new_todo = NewTodo {
        title: payload.title.trim(),
        description: payload.description.as_deref(),
        password: &payload.password,
        due_date: payload.due_date,
    };
    let id = repository::insert_todo(&mut *tx, &new_todo, author_id, now).await?;
    tx.commit().await?;

    tracing::info!(todo_id = id, author_id, "todo registered");
    find_by_id(pool, id).await
}

pub async fn update(pool: &SqlitePool, id: i64, payload: &UpdateTodo) -> Result<Todo, AppError> {
    payload.validate()?;
    let todo = authorize(pool, id, &payload.password).await?;

    repository::update_todo(pool, &todo, payload, Utc::now().naive_utc()).await?;
    tracing::info!(todo_id = id, "todo updated");

    find_by_id(pool, id).await
}

pub async fn delete(pool: &SqlitePool, id: i64, password: &str) -> Result<(), AppError> {
    require_password(password)?;
    authorize(pool, id, password).await?;

    if repository::delete_todo(pool, id).await? == 0 {
        return Err(AppError::NotFound(format!("Todo {id} not found")));
    }

    tracing::info!(todo_id = id, "todo deleted");
    Ok(())
}

/// Flips `completed` and returns the updated to-do.
pub async fn toggle_completed(pool: &SqlitePool, id: i64, password: &str) -> Result<Todo, AppError> {
    require_password(password)?;
    authorize(pool, id, password).await?;

    if repository::toggle_completed(pool, id, Utc::now().naive_utc()).await? == 0 {
        return Err(AppError::NotFound(format!("Todo {id} not found")));
    }

    find_by_id(pool, id).await
}

pub async fn check_password(pool: &SqlitePool, id: i64, password: &str) -> Result<bool, AppError> {
    let todo = find_by_id(pool, id).await?;
    Ok(todo.password == password)
}

/// Loads the to-do and fails with `PasswordMismatch` unless `password` matches.
async fn authorize(pool: &SqlitePool, id: i64, password: &str) -> Result<Todo, AppError> {
    let todo = find_by_id(pool, id).await?;
    if todo.password != password {
        tracing::warn!(todo_id = id, "password mismatch");
        return Err(AppError::PasswordMismatch(id));
    }
    Ok(todo)
}

fn require_password(password: &str) -> Result<(), AppError> {
    if password.is_empty() {
        return Err(AppError::ValidationError("password is required".to_string()));
    }
    Ok(())
}
