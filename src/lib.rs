//! Local Library catalog server
//!
//! A server-rendered catalog of books, authors, genres and book copies,
//! with HTML forms for every create, update and delete.

use std::sync::Arc;

use axum::extract::FromRef;

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;
pub mod views;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

use services::{
    author::AuthorService, book::BookService, book_instance::BookInstanceService,
    genre::GenreService,
};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub services: Arc<services::Services>,
}

impl AppState {
    pub fn new(services: services::Services) -> Self {
        Self {
            services: Arc::new(services),
        }
    }
}

impl FromRef<AppState> for BookService {
    fn from_ref(state: &AppState) -> Self {
        state.services.books.clone()
    }
}

impl FromRef<AppState> for AuthorService {
    fn from_ref(state: &AppState) -> Self {
        state.services.authors.clone()
    }
}

impl FromRef<AppState> for GenreService {
    fn from_ref(state: &AppState) -> Self {
        state.services.genres.clone()
    }
}

impl FromRef<AppState> for BookInstanceService {
    fn from_ref(state: &AppState) -> Self {
        state.services.book_instances.clone()
    }
}
