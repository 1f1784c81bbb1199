//! Book pages

use maud::{html, Markup};

use super::{
    book_instance::status_badge, delete_form, field_errors, form_title, layout, CatalogPages,
};
use crate::{
    models::{BookDetail, BookInstance, BookListing, InstanceStatus},
    services::{
        book::{BookPage, BookService},
        FormOf,
    },
};

pub fn book_list(books: &[BookListing]) -> Markup {
    layout(
        "Book List",
        html! {
            @if books.is_empty() {
                p { "There are no books." }
            } @else {
                ul {
                    @for book in books {
                        li {
                            a href=(book.url()) { (book.title) }
                            " (" (book.author.name()) ")"
                        }
                    }
                }
            }
        },
    )
}

fn book_facts(book: &BookDetail) -> Markup {
    html! {
        p { strong { "Author:" } " " a href=(book.author.url()) { (book.author.name()) } }
        p { strong { "Summary:" } " " (book.summary) }
        p { strong { "ISBN:" } " " (book.isbn) }
        p {
            strong { "Genre:" } " "
            @for (i, genre) in book.genres.iter().enumerate() {
                @if i > 0 { ", " }
                a href=(genre.url()) { (genre.name) }
            }
        }
    }
}

fn copy_entry(copy: &BookInstance) -> Markup {
    html! {
        (status_badge(copy.status))
        p { strong { "Imprint:" } " " (copy.imprint) }
        @if copy.status != InstanceStatus::Available {
            p { strong { "Due back:" } " " (copy.due_back_formatted()) }
        }
        p { strong { "Id:" } " " a href=(copy.url()) { (copy.id.to_string()) } }
    }
}

pub fn book_detail(page: &BookPage) -> Markup {
    layout(
        &format!("Title: {}", page.book.title),
        html! {
            (book_facts(&page.book))
            div {
                h2 { "Copies" }
                @if page.instances.is_empty() {
                    p { "There are no copies of this book in the library." }
                }
                @for copy in &page.instances {
                    hr;
                    (copy_entry(copy))
                }
            }
            hr;
            p { a href=(format!("{}/delete", page.book.url())) { "Delete Book" } }
            p { a href=(format!("{}/update", page.book.url())) { "Update Book" } }
        },
    )
}

pub fn book_form(form: &FormOf<BookService>) -> Markup {
    let values = &form.values;
    layout(
        &form_title("Book", form),
        html! {
            form method="POST" action="" {
                div.form-group {
                    label for="title" { "Title:" }
                    input id="title" type="text" name="title" placeholder="Name of book" value=(values.title);
                }
                div.form-group {
                    label for="author" { "Author:" }
                    select id="author" name="author" {
                        option value="" selected[values.author.is_empty()] { "--Please select an author--" }
                        @for author in &form.choices.authors {
                            @let id = author.id.to_string();
                            option value=(id) selected[values.author == id] { (author.name()) }
                        }
                    }
                }
                div.form-group {
                    label for="summary" { "Summary:" }
                    textarea id="summary" name="summary" placeholder="Summary" { (values.summary) }
                }
                div.form-group {
                    label for="isbn" { "ISBN:" }
                    input id="isbn" type="text" name="isbn" placeholder="ISBN13" value=(values.isbn);
                }
                div.form-group {
                    label { "Genre:" }
                    div {
                        @for genre in &form.choices.genres {
                            @let id = format!("genre-{}", genre.id);
                            div.checkbox {
                                input type="checkbox" name="genre" id=(id) value=(genre.id.to_string()) checked[values.has_genre(genre.id)];
                                label for=(id) { " " (genre.name) }
                            }
                        }
                    }
                }
                button type="submit" { "Submit" }
            }
            (field_errors(&form.errors))
        },
    )
}

pub fn book_delete(book: &BookDetail, copies: &[BookInstance]) -> Markup {
    layout(
        &format!("Delete Book: {}", book.title),
        html! {
            (book_facts(book))
            @if copies.is_empty() {
                (delete_form("Book"))
            } @else {
                p { strong { "Delete the following copies before attempting to delete this Book." } }
                div {
                    h4 { "Copies" }
                    @for copy in copies {
                        hr;
                        (copy_entry(copy))
                    }
                }
            }
        },
    )
}

impl CatalogPages for BookService {
    fn list_page(items: &[BookListing]) -> Markup {
        book_list(items)
    }

    fn detail_page(detail: &BookPage) -> Markup {
        book_detail(detail)
    }

    fn form_page(form: &FormOf<Self>) -> Markup {
        book_form(form)
    }

    fn delete_page(record: &BookDetail, dependents: &[BookInstance]) -> Markup {
        book_delete(record, dependents)
    }
}
