//! SQL access for the `todo` and `author` tables.

use chrono::NaiveDateTime;
use sqlx::{QueryBuilder, Sqlite, SqliteExecutor, SqlitePool};

use crate::{
    models::{Author, Todo, TodoSummary, UpdateTodo},
    pagination::{PageRequest, SearchType, TodoFilter},
};

const SUMMARY_COLUMNS: &str = "SELECT t.id, t.title, t.completed, t.due_date, a.author_name, \
     t.created_at, t.updated_at \
     FROM todo t JOIN author a ON t.author_id = a.author_id";

const ESCAPE: &str = " ESCAPE '\\'";

pub struct NewTodo<'a> {
    pub title: &'a str,
    pub description: Option<&'a str>,
    pub password: &'a str,
    pub due_date: Option<chrono::NaiveDate>,
}

pub async fn insert_author<'c>(
    executor: impl SqliteExecutor<'c>,
    author_name: &str,
    email: Option<&str>,
    now: NaiveDateTime,
) -> Result<i64, sqlx::Error> {
    let id = sqlx::query(
        "INSERT INTO author (author_name, email, created_at, updated_at) VALUES (?, ?, ?, ?)",
    )
    .bind(author_name)
    .bind(email)
    .bind(now)
    .bind(now)
    .execute(executor)
    .await?
    .last_insert_rowid();

    Ok(id)
}

pub async fn find_author(pool: &SqlitePool, author_id: i64) -> Result<Option<Author>, sqlx::Error> {
    sqlx::query_as::<_, Author>("SELECT * FROM author WHERE author_id = ?")
        .bind(author_id)
        .fetch_optional(pool)
        .await
}

pub async fn insert_todo<'c>(
    executor: impl SqliteExecutor<'c>,
    todo: &NewTodo<'_>,
    author_id: i64,
    now: NaiveDateTime,
) -> Result<i64, sqlx::Error> {
    let id = sqlx::query(
        "INSERT INTO todo (title, description, password, completed, due_date, created_at, updated_at, author_id)
         VALUES (?, ?, ?, 0, ?, ?, ?, ?)",
    )
    .bind(todo.title)
    .bind(todo.description)
    .bind(todo.password)
    .bind(todo.due_date)
    .bind(now)
    .bind(now)
    .bind(author_id)
    .execute(executor)
    .await?
    .last_insert_rowid();

    Ok(id)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> Result<Option<Todo>, sqlx::Error> {
    sqlx::query_as::<_, Todo>(
        "SELECT t.id, t.title, t.description, t.password, t.completed, t.due_date,
                t.created_at, t.updated_at, t.author_id, a.author_name, a.email
         FROM todo t JOIN author a ON t.author_id = a.author_id
         WHERE t.id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await
}

/// Every to-do whose author name contains `author_name`, newest first.
pub async fn find_by_author(
    pool: &SqlitePool,
    author_name: &str,
) -> Result<Vec<TodoSummary>, sqlx::Error> {
    let mut builder = QueryBuilder::<Sqlite>::new(SUMMARY_COLUMNS);
    builder
        .push(" WHERE a.author_name LIKE ")
        .push_bind(like_pattern(author_name))
        .push(ESCAPE)
        .push(" ORDER BY t.created_at DESC, t.id DESC");

    builder.build_query_as::<TodoSummary>().fetch_all(pool).await
}

/// Applies the present fields of `changes` to the to-do and its author.
/// Returns the number of to-do rows touched.
pub async fn update_todo(
    pool: &SqlitePool,
    todo: &Todo,
    changes: &UpdateTodo,
    now: NaiveDateTime,
) -> Result<u64, sqlx::Error> {
    let mut tx = pool.begin().await?;

    // Option::None binds as NULL, so COALESCE keeps the stored value.
    // A blank description is the exception: it clears the column.
    let rows = sqlx::query(
        "UPDATE todo SET
            title = COALESCE(?, title),
            description = CASE WHEN ? IS NULL THEN description ELSE NULLIF(TRIM(?), '') END,
            completed = COALESCE(?, completed),
            due_date = COALESCE(?, due_date),
            updated_at = ?
        WHERE id = ?",
    )
    .bind(&changes.title)
    .bind(&changes.description)
    .bind(&changes.description)
    .bind(changes.completed)
    .bind(changes.due_date)
    .bind(now)
    .bind(todo.id)
    .execute(&mut *tx)
    .await?
    .rows_affected();

    if changes.author_name.is_some() || changes.email.is_some() {
        sqlx::query(
            "UPDATE author SET
                author_name = COALESCE(?, author_name),
                email = COALESCE(?, email),
                updated_at = ?
            WHERE author_id = ?",
        )
        .bind(&changes.author_name)
        .bind(&changes.email)
        .bind(now)
        .bind(todo.author_id)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(rows)
}

pub async fn toggle_completed(
    pool: &SqlitePool,
    id: i64,
    now: NaiveDateTime,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("UPDATE todo SET completed = NOT completed, updated_at = ? WHERE id = ?")
        .bind(now)
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}

pub async fn delete_todo(pool: &SqlitePool, id: i64) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM todo WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}

/// Fetches one page of summaries plus the total number of matching rows.
///
/// The page and the count are two separate statements outside any
/// transaction, so under concurrent writes `total` may not agree with the
/// rows returned.
pub async fn fetch_page(
    pool: &SqlitePool,
    request: &PageRequest,
) -> Result<(Vec<TodoSummary>, u64), sqlx::Error> {
    let offset = request.offset();

    let mut builder = QueryBuilder::<Sqlite>::new(SUMMARY_COLUMNS);
    push_filter(&mut builder, &request.filter);
    builder
        .push(" ORDER BY t.due_date ASC, t.completed ASC, t.id ASC LIMIT ")
        .push_bind(i64::from(request.size))
        .push(" OFFSET ")
        .push_bind(i64::try_from(offset).unwrap_or(i64::MAX));

    let items = builder
        .build_query_as::<TodoSummary>()
        .fetch_all(pool)
        .await?;

    let total = count(pool, &request.filter).await?;

    tracing::debug!(
        page = request.page,
        size = request.size,
        offset,
        total,
        fetched = items.len(),
        filtered = !request.filter.is_empty(),
        "fetched todo page"
    );

    Ok((items, total))
}

async fn count(pool: &SqlitePool, filter: &TodoFilter) -> Result<u64, sqlx::Error> {
    let mut builder = QueryBuilder::<Sqlite>::new(
        "SELECT COUNT(*) FROM todo t JOIN author a ON t.author_id = a.author_id",
    );
    push_filter(&mut builder, filter);

    let total: i64 = builder.build_query_scalar::<i64>().fetch_one(pool).await?;
    Ok(u64::try_from(total).unwrap_or(0))
}

fn push_filter(builder: &mut QueryBuilder<'_, Sqlite>, filter: &TodoFilter) {
    let mut separator = " WHERE ";

    if let Some(author_name) = &filter.author_name {
        builder
            .push(separator)
            .push("a.author_name LIKE ")
            .push_bind(like_pattern(author_name))
            .push(ESCAPE);
        separator = " AND ";
    }

    if let Some((search_type, text)) = &filter.text {
        let pattern = like_pattern(text);
        builder.push(separator);
        match search_type {
            SearchType::Title => {
                builder.push("t.title LIKE ").push_bind(pattern).push(ESCAPE);
            }
            SearchType::Author => {
                builder.push("a.author_name LIKE ").push_bind(pattern).push(ESCAPE);
            }
            SearchType::All => {
                builder
                    .push("(t.title LIKE ")
                    .push_bind(pattern.clone())
                    .push(ESCAPE)
                    .push(" OR a.author_name LIKE ")
                    .push_bind(pattern)
                    .push(ESCAPE)
                    .push(")");
            }
        }
    }
}

/// `%text%` with LIKE wildcards in `text` matched literally.
fn like_pattern(text: &str) -> String {
    let mut pattern = String::with_capacity(text.len() + 2);
    pattern.push('%');
    for c in text.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}
