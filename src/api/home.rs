//! Site root and catalog home page

use axum::{extract::State, response::Response};
use maud::Markup;

use crate::{error::AppResult, views, AppState};

use super::found;

/// `/` has no page of its own
pub async fn root() -> Response {
    found("/catalog")
}

/// Catalog home with record counts
pub async fn index(State(state): State<AppState>) -> AppResult<Markup> {
    let counts = state.services.catalog.counts().await?;
    Ok(views::index(&counts))
}
