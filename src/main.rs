use axum::{
    routing::{get, post},
    Router,
};
use dotenvy::dotenv;
use sqlx::SqlitePool;
use std::env;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod config;
mod db;
mod error;
mod extract;
mod handlers;
mod models;
mod pagination;
mod repository;
mod service;
mod views;


use config::Config;
use pagination::PageLimits;

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::todos::list_todos,
        handlers::todos::list_by_author,
        handlers::todos::get_todo,
        handlers::todos::create_todo,
        handlers::todos::update_todo,
        handlers::todos::delete_todo,
        handlers::todos::toggle_todo,
        handlers::todos::check_password,
        handlers::todos::get_author
    ),
    components(
        schemas(
            models::Todo,
            models::TodoSummary,
            models::Author,
            models::CreateTodo,
            models::UpdateTodo,
            models::PasswordRequest,
            models::PasswordCheck,
            pagination::SearchType,
            pagination::TodoPage
        )
    ),
    tags(
        (name = "todo", description = "Todo list endpoints"),
        (name = "author", description = "Todo authors")
    )
)]
struct ApiDoc;

#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub page_limits: PageLimits,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            env::var("RUST_LOG").unwrap_or_else(|_| "info,todo_backend_axum=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    tracing::debug!(?config, "configuration loaded");

    let pool = db::establish_connection(&config.database_url, config.max_connections).await?;

    let app = create_app(AppState {
        pool,
        page_limits: config.page_limits,
    });

    tracing::info!("listening on {}", config.bind_addr);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

pub fn create_app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/", get(|| async { axum::response::Redirect::to("/todo") }))
        // JSON API
        .route(
            "/api/todo",
            get(handlers::todos::list_todos).post(handlers::todos::create_todo),
        )
        .route("/api/todo/by-author", get(handlers::todos::list_by_author))
        .route(
            "/api/todo/:id",
            get(handlers::todos::get_todo)
                .put(handlers::todos::update_todo)
                .post(handlers::todos::update_todo)
                .delete(handlers::todos::delete_todo),
        )
        .route("/api/todo/:id/complete", post(handlers::todos::toggle_todo))
        .route(
            "/api/todo/check-password/:id",
            post(handlers::todos::check_password),
        )
        .route("/api/author/:id", get(handlers::todos::get_author))
        // HTML pages
        .route(
            "/todo",
            get(handlers::pages::list_page).post(handlers::pages::search),
        )
        .route("/todo/read", get(handlers::pages::read_page))
        .route(
            "/todo/register",
            get(handlers::pages::register_page).post(handlers::pages::register_submit),
        )
        .route(
            "/todo/update/:id",
            get(handlers::pages::update_page).post(handlers::pages::update_submit),
        )
        .route("/todo/:id/delete", post(handlers::pages::delete_submit))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
