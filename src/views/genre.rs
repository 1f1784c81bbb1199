//! Genre pages

use maud::{html, Markup};

use super::{author::book_summaries, delete_form, field_errors, form_title, layout, CatalogPages};
use crate::{
    models::{BookSummary, Genre},
    services::{
        genre::{GenrePage, GenreService},
        FormOf,
    },
};

pub fn genre_list(genres: &[Genre]) -> Markup {
    layout(
        "Genre List",
        html! {
            @if genres.is_empty() {
                p { "There are no genres." }
            } @else {
                ul {
                    @for genre in genres {
                        li { a href=(genre.url()) { (genre.name) } }
                    }
                }
            }
        },
    )
}

pub fn genre_detail(page: &GenrePage) -> Markup {
    let genre = &page.genre;
    layout(
        &format!("Genre: {}", genre.name),
        html! {
            div {
                h2 { "Books" }
                @if page.books.is_empty() {
                    p { "This genre has no books." }
                } @else {
                    (book_summaries(&page.books))
                }
            }
            hr;
            p { a href=(format!("{}/delete", genre.url())) { "Delete genre" } }
            p { a href=(format!("{}/update", genre.url())) { "Update genre" } }
        },
    )
}

pub fn genre_form(form: &FormOf<GenreService>) -> Markup {
    layout(
        &form_title("Genre", form),
        html! {
            form method="POST" action="" {
                div.form-group {
                    label for="name" { "Genre:" }
                    input id="name" type="text" name="name" placeholder="Fantasy, Poetry etc." value=(form.values.name);
                }
                button type="submit" { "Submit" }
            }
            (field_errors(&form.errors))
        },
    )
}

pub fn genre_delete(genre: &Genre, books: &[BookSummary]) -> Markup {
    layout(
        &format!("Delete Genre: {}", genre.name),
        html! {
            @if books.is_empty() {
                (delete_form("Genre"))
            } @else {
                p { strong { "Delete the following books before attempting to delete this genre." } }
                div {
                    h4 { "Books" }
                    (book_summaries(books))
                }
            }
        },
    )
}

impl CatalogPages for GenreService {
    fn list_page(items: &[Genre]) -> Markup {
        genre_list(items)
    }

    fn detail_page(detail: &GenrePage) -> Markup {
        genre_detail(detail)
    }

    fn form_page(form: &FormOf<Self>) -> Markup {
        genre_form(form)
    }

    fn delete_page(record: &Genre, dependents: &[BookSummary]) -> Markup {
        genre_delete(record, dependents)
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;
    use crate::{
        models::{FieldError, GenreInput},
        services::FormState,
    };

    #[test]
    fn test_form_keeps_entered_name() {
        let form = FormState {
            values: GenreInput {
                name: "<b>SF".to_string(),
            },
            choices: (),
            errors: vec![FieldError::new(
                "name",
                "Genre name must contain between 3 and 100 characters.",
            )],
            editing: None,
        };

        let page = genre_form(&form).into_string();
        assert!(page.contains(r#"value="&lt;b&gt;SF""#));
        assert!(page.contains(r#"<li data-field="name">"#));
    }

    #[test]
    fn test_detail_without_books() {
        let page = genre_detail(&GenrePage {
            genre: Genre {
                id: Uuid::new_v4(),
                name: "Poetry".to_string(),
            },
            books: Vec::new(),
        })
        .into_string();
        assert!(page.contains("Genre: Poetry"));
        assert!(page.contains("This genre has no books."));
    }
}
