//! HTML views rendered with maud
//!
//! One function per page. Every value is escaped by maud at render time, so
//! stored text is kept exactly as entered.

pub mod author;
pub mod book;
pub mod book_instance;
pub mod genre;

use axum::http::StatusCode;
use maud::{html, Markup, DOCTYPE};

use crate::{
    models::FieldError,
    services::{catalog::CatalogCounts, CatalogResource, FormOf},
};

/// A catalog resource that knows how to render its pages
pub trait CatalogPages: CatalogResource {
    fn list_page(items: &[Self::Listing]) -> Markup;
    fn detail_page(detail: &Self::Detail) -> Markup;
    fn form_page(form: &FormOf<Self>) -> Markup;
    fn delete_page(record: &Self::Record, dependents: &[Self::Dependent]) -> Markup;
}

/// Page shell with the sidebar navigation
pub fn layout(title: &str, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { (title) " | Local Library" }
            }
            body {
                nav {
                    ul.sidebar-nav {
                        li { a href="/catalog" { "Home" } }
                        li { a href="/catalog/books" { "All books" } }
                        li { a href="/catalog/authors" { "All authors" } }
                        li { a href="/catalog/genres" { "All genres" } }
                        li { a href="/catalog/bookinstances" { "All book-instances" } }
                    }
                    hr;
                    ul.sidebar-nav {
                        li { a href="/catalog/author/create" { "Create new author" } }
                        li { a href="/catalog/genre/create" { "Create new genre" } }
                        li { a href="/catalog/book/create" { "Create new book" } }
                        li { a href="/catalog/bookinstance/create" { "Create new book instance (copy)" } }
                    }
                }
                main {
                    h1 { (title) }
                    (content)
                }
            }
        }
    }
}

pub fn index(counts: &CatalogCounts) -> Markup {
    layout(
        "Local Library Home",
        html! {
            p {
                "Welcome to " em { "LocalLibrary" } ", a very basic catalog of books, "
                "authors, genres and the copies the library holds."
            }
            h2 { "Dynamic content" }
            p { "The library has the following record counts:" }
            ul {
                li { strong { "Books:" } " " (counts.books) }
                li { strong { "Copies:" } " " (counts.copies) }
                li { strong { "Copies available:" } " " (counts.copies_available) }
                li { strong { "Authors:" } " " (counts.authors) }
                li { strong { "Genres:" } " " (counts.genres) }
            }
        },
    )
}

pub fn error_page(status: StatusCode, message: &str) -> Markup {
    layout(
        status.canonical_reason().unwrap_or("Error"),
        html! {
            p.error { (message) }
            p { "Status " (status.as_u16()) }
        },
    )
}

/// Validation errors below a form, tagged with the field they belong to
pub(crate) fn field_errors(errors: &[FieldError]) -> Markup {
    html! {
        @if !errors.is_empty() {
            ul.errors {
                @for error in errors {
                    li data-field=(error.field) { (error.message) }
                }
            }
        }
    }
}

/// "Create X" or "Update X" depending on whether a record is being edited
pub(crate) fn form_title<I, C>(noun: &str, form: &crate::services::FormState<I, C>) -> String {
    match form.editing {
        Some(_) => format!("Update {}", noun),
        None => format!("Create {}", noun),
    }
}

/// Confirmation form posting back to the current delete url
pub(crate) fn delete_form(noun: &str) -> Markup {
    html! {
        p { "Do you really want to delete this " (noun) "?" }
        form method="POST" action="" {
            button type="submit" { "Delete" }
        }
    }
}
