use axum::{
    extract::{Path, State},
    response::{Html, IntoResponse, Redirect, Response},
};
use serde::Deserialize;

use crate::{
    error::AppError,
    extract::{FormBody, QueryParams},
    models::{CreateTodo, PasswordRequest, UpdateTodo},
    pagination::PageQuery,
    service, views, AppState,
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchForm {
    #[serde(default)]
    pub author_name: String,
}

#[derive(Debug, Deserialize)]
pub struct ReadQuery {
    pub id: i64,
}

pub async fn list_page(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<PageQuery>,
) -> Result<Html<String>, AppError> {
    let page = service::get_list(&state.pool, &query, &state.page_limits).await?;
    Ok(Html(views::list(&page)?))
}

/// Search box submit; redirects so the filter lives in the URL.
pub async fn search(FormBody(form): FormBody<SearchForm>) -> Result<Redirect, AppError> {
    let author_name = form.author_name.trim();
    if author_name.is_empty() {
        return Ok(Redirect::to("/todo"));
    }
    let query = serde_urlencoded::to_string([("authorName", author_name)])?;
    Ok(Redirect::to(&format!("/todo?{query}")))
}

pub async fn read_page(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<ReadQuery>,
) -> Result<Html<String>, AppError> {
    let todo = service::find_by_id(&state.pool, query.id).await?;
    Ok(Html(views::detail(&todo)))
}

pub async fn register_page() -> Html<String> {
    Html(views::register_form())
}

pub async fn register_submit(
    State(state): State<AppState>,
    FormBody(payload): FormBody<CreateTodo>,
) -> Result<Redirect, AppError> {
    service::register(&state.pool, &payload).await?;
    Ok(Redirect::to("/todo"))
}

/// Shows the edit form only when the password matches; otherwise back to the detail page.
pub async fn update_page(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    QueryParams(query): QueryParams<PasswordRequest>,
) -> Result<Response, AppError> {
    if !service::check_password(&state.pool, id, &query.password).await? {
        tracing::warn!(todo_id = id, "edit page refused: password mismatch");
        return Ok(detail_redirect(id).into_response());
    }

    let todo = service::find_by_id(&state.pool, id).await?;
    Ok(Html(views::update_form(&todo, &query.password)).into_response())
}

pub async fn update_submit(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    FormBody(payload): FormBody<UpdateTodo>,
) -> Result<Redirect, AppError> {
    match service::update(&state.pool, id, &payload).await {
        Ok(_) => Ok(Redirect::to("/todo")),
        Err(AppError::PasswordMismatch(_)) => Ok(detail_redirect(id)),
        Err(e) => Err(e),
    }
}

pub async fn delete_submit(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    FormBody(payload): FormBody<PasswordRequest>,
) -> Result<Redirect, AppError> {
    match service::delete(&state.pool, id, &payload.password).await {
        Ok(()) => Ok(Redirect::to("/todo")),
        Err(AppError::PasswordMismatch(_)) => Ok(detail_redirect(id)),
        Err(e) => Err(e),
    }
}

/// Form posts with a wrong password land back on the detail page.
fn detail_redirect(id: i64) -> Redirect {
    Redirect::to(&format!("/todo/read?id={id}"))
}
