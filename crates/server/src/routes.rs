use std::sync::Arc;

use axum::{
    routing::{get, post},
    Json, Router,
};
use sea_orm::DatabaseConnection;
use tower_http::{
    cors::CorsLayer,
    trace::{TraceLayer, DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, DefaultOnFailure},
};
use tracing::Level;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use common::types::Health;
use service::student::{SeaOrmStudentRepository, StudentService};

use crate::openapi::ApiDoc;

pub mod students;

/// Shared handler state. The service holds the repository behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub students: StudentService<SeaOrmStudentRepository>,
}

impl AppState {
    pub fn new(db: DatabaseConnection) -> Self {
        let repo = Arc::new(SeaOrmStudentRepository::new(db));
        Self { students: StudentService::new(repo) }
    }
}

#[utoipa::path(get, path = "/health", tag = "health", responses((status = 200, description = "OK", body = crate::openapi::HealthResponse)))]
pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

/// Build the full application router
pub fn build_router(state: AppState, cors: CorsLayer) -> Router {
    let pages = Router::new()
        .route("/", get(students::index))
        .route("/searchByName", post(students::search))
        .route("/addStudent", get(students::add_form))
        .route("/save", post(students::save))
        .route("/saveEdit", post(students::save_edit))
        .route("/edit/:id", get(students::edit_form))
        .route("/delete/:id", get(students::delete).post(students::delete))
        .route("/health", get(health))
        .with_state(state);

    pages
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(
                    DefaultMakeSpan::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                .on_request(
                    DefaultOnRequest::new()
                        .level(Level::INFO),
                )
                .on_response(
                    DefaultOnResponse::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                .on_failure(
                    DefaultOnFailure::new()
                        .level(Level::ERROR),
                )
        )
}
