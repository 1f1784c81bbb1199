//! HTTP handlers for the catalog pages

pub mod crud;
pub mod health;
pub mod home;

use axum::{
    async_trait,
    extract::{FromRequestParts, Path},
    http::{header::LOCATION, request::Parts, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use tower_http::{compression::CompressionLayer, trace::TraceLayer};
use uuid::Uuid;

use crate::{
    error::AppError,
    services::{
        author::AuthorService, book::BookService, book_instance::BookInstanceService,
        genre::GenreService,
    },
    AppState,
};

/// Record id taken from the `:id` path segment
pub struct RecordId(pub Uuid);

#[async_trait]
impl<S> FromRequestParts<S> for RecordId
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;

        Uuid::parse_str(&raw)
            .map(RecordId)
            .map_err(|_| AppError::BadRequest(format!("Invalid id: {}", raw)))
    }
}

/// 302 Found to `location`
pub fn found(location: &str) -> Response {
    (StatusCode::FOUND, [(LOCATION, location.to_string())]).into_response()
}

async fn fallback() -> AppError {
    AppError::NotFound("Page not found".to_string())
}

/// Create the application router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        // Home
        .route("/", get(home::root))
        .route("/catalog", get(home::index))
        // Catalog entities
        .merge(crud::routes::<BookService>())
        .merge(crud::routes::<AuthorService>())
        .merge(crud::routes::<GenreService>())
        .merge(crud::routes::<BookInstanceService>())
        .fallback(fallback)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
}
