//! Generic list / detail / create / update / delete handlers.
//!
//! Each catalog entity mounts the same eight routes under `/catalog`,
//! rendered through its [`CatalogPages`] implementation.

use axum::{
    extract::{FromRef, State},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use axum_extra::extract::{Form, WithRejection};
use maud::Markup;

use crate::{
    error::{AppError, AppResult},
    services::{DeleteOutcome, DeletePrompt, Submission},
    views::CatalogPages,
    AppState,
};

use super::{found, RecordId};

/// Routes for one entity:
/// `/catalog/<collection>`, `/catalog/<slug>/create`, `/catalog/<slug>/:id`,
/// `/catalog/<slug>/:id/delete` and `/catalog/<slug>/:id/update`
pub fn routes<R>() -> Router<AppState>
where
    R: CatalogPages + FromRef<AppState>,
{
    let base = format!("/catalog/{}", R::SLUG);

    Router::new()
        .route(&R::list_url(), get(list::<R>))
        .route(&format!("{}/create", base), get(create_form::<R>).post(create::<R>))
        .route(&format!("{}/:id", base), get(detail::<R>))
        .route(
            &format!("{}/:id/delete", base),
            get(delete_prompt::<R>).post(delete::<R>),
        )
        .route(&format!("{}/:id/update", base), get(edit_form::<R>).post(update::<R>))
}

async fn list<R: CatalogPages>(State(resource): State<R>) -> AppResult<Markup> {
    let items = resource.list().await?;
    Ok(R::list_page(&items))
}

async fn detail<R: CatalogPages>(
    State(resource): State<R>,
    RecordId(id): RecordId,
) -> AppResult<Markup> {
    let detail = resource.detail(id).await?;
    Ok(R::detail_page(&detail))
}

async fn create_form<R: CatalogPages>(State(resource): State<R>) -> AppResult<Markup> {
    let form = resource.blank_form().await?;
    Ok(R::form_page(&form))
}

async fn create<R: CatalogPages>(
    State(resource): State<R>,
    WithRejection(Form(input), _): WithRejection<Form<R::Input>, AppError>,
) -> AppResult<Response> {
    let submission = resource.create(input).await?;
    Ok(respond::<R>(submission))
}

async fn edit_form<R: CatalogPages>(
    State(resource): State<R>,
    RecordId(id): RecordId,
) -> AppResult<Markup> {
    let form = resource.edit_form(id).await?;
    Ok(R::form_page(&form))
}

async fn update<R: CatalogPages>(
    State(resource): State<R>,
    RecordId(id): RecordId,
    WithRejection(Form(input), _): WithRejection<Form<R::Input>, AppError>,
) -> AppResult<Response> {
    let submission = resource.update(id, input).await?;
    Ok(respond::<R>(submission))
}

async fn delete_prompt<R: CatalogPages>(
    State(resource): State<R>,
    RecordId(id): RecordId,
) -> AppResult<Response> {
    Ok(match resource.delete_prompt(id).await? {
        DeletePrompt::Confirm { record, dependents } => {
            R::delete_page(&record, &dependents).into_response()
        }
        DeletePrompt::Missing => found(&R::list_url()),
    })
}

async fn delete<R: CatalogPages>(
    State(resource): State<R>,
    RecordId(id): RecordId,
) -> AppResult<Response> {
    Ok(match resource.delete(id).await? {
        DeleteOutcome::Deleted | DeleteOutcome::Missing => found(&R::list_url()),
        DeleteOutcome::Blocked { record, dependents } => {
            R::delete_page(&record, &dependents).into_response()
        }
    })
}

/// Saved records redirect to their detail page; invalid forms re-render
fn respond<R: CatalogPages>(submission: Submission<R::Input, R::Choices>) -> Response {
    match submission {
        Submission::Saved(id) => found(&R::detail_url(id)),
        Submission::Invalid(form) => R::form_page(&form).into_response(),
    }
}
