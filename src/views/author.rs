//! Author pages

use maud::{html, Markup};

use super::{delete_form, field_errors, form_title, layout, CatalogPages};
use crate::{
    models::{Author, BookSummary},
    services::{
        author::{AuthorPage, AuthorService},
        FormOf,
    },
};

pub fn author_list(authors: &[Author]) -> Markup {
    layout(
        "Author List",
        html! {
            @if authors.is_empty() {
                p { "There are no authors." }
            } @else {
                ul {
                    @for author in authors {
                        li {
                            a href=(author.url()) { (author.name()) }
                            " (" (author.lifespan()) ")"
                        }
                    }
                }
            }
        },
    )
}

/// Title and summary of each book, linked
pub(crate) fn book_summaries(books: &[BookSummary]) -> Markup {
    html! {
        dl {
            @for book in books {
                dt { a href=(book.url()) { (book.title) } }
                dd { (book.summary) }
            }
        }
    }
}

pub fn author_detail(page: &AuthorPage) -> Markup {
    let author = &page.author;
    layout(
        &format!("Author: {}", author.name()),
        html! {
            p { (author.lifespan()) }
            div {
                h2 { "Books" }
                @if page.books.is_empty() {
                    p { "This author has no books." }
                } @else {
                    (book_summaries(&page.books))
                }
            }
            hr;
            p { a href=(format!("{}/delete", author.url())) { "Delete author" } }
            p { a href=(format!("{}/update", author.url())) { "Update author" } }
        },
    )
}

pub fn author_form(form: &FormOf<AuthorService>) -> Markup {
    let values = &form.values;
    layout(
        &form_title("Author", form),
        html! {
            form method="POST" action="" {
                div.form-group {
                    label for="first_name" { "First Name:" }
                    input id="first_name" type="text" name="first_name" placeholder="First name" value=(values.first_name);
                    label for="family_name" { "Family Name:" }
                    input id="family_name" type="text" name="family_name" placeholder="Family name" value=(values.family_name);
                }
                div.form-group {
                    label for="date_of_birth" { "Date of birth:" }
                    input id="date_of_birth" type="date" name="date_of_birth" value=(values.date_of_birth);
                }
                div.form-group {
                    label for="date_of_death" { "Date of death:" }
                    input id="date_of_death" type="date" name="date_of_death" value=(values.date_of_death);
                }
                button type="submit" { "Submit" }
            }
            (field_errors(&form.errors))
        },
    )
}

pub fn author_delete(author: &Author, books: &[BookSummary]) -> Markup {
    layout(
        &format!("Delete Author: {}", author.name()),
        html! {
            p { (author.lifespan()) }
            @if books.is_empty() {
                (delete_form("Author"))
            } @else {
                p { strong { "Delete the following books before attempting to delete this author." } }
                div {
                    h4 { "Books" }
                    (book_summaries(books))
                }
            }
        },
    )
}

impl CatalogPages for AuthorService {
    fn list_page(items: &[Author]) -> Markup {
        author_list(items)
    }

    fn detail_page(detail: &AuthorPage) -> Markup {
        author_detail(detail)
    }

    fn form_page(form: &FormOf<Self>) -> Markup {
        author_form(form)
    }

    fn delete_page(record: &Author, dependents: &[BookSummary]) -> Markup {
        author_delete(record, dependents)
    }
}
