//! Book instance (copy) pages

use std::convert::Infallible;

use maud::{html, Markup};

use super::{delete_form, field_errors, form_title, layout, CatalogPages};
use crate::{
    models::{BookInstanceDetail, InstanceStatus},
    services::{book_instance::BookInstanceService, FormOf},
};

/// Status line coloured by availability
pub(crate) fn status_badge(status: InstanceStatus) -> Markup {
    html! {
        p class=(status_class(status)) { (status.as_str()) }
    }
}

pub fn bookinstance_list(copies: &[BookInstanceDetail]) -> Markup {
    layout(
        "Book Instance List",
        html! {
            @if copies.is_empty() {
                p { "There are no book copies in this library." }
            } @else {
                ul {
                    @for copy in copies {
                        li {
                            a href=(copy.url()) { (copy.book.title) " : " (copy.imprint) }
                            " - "
                            span class=(status_class(copy.status)) { (copy.status.as_str()) }
                            @if copy.status != InstanceStatus::Available {
                                span { " (Due: " (copy.due_back_formatted()) ")" }
                            }
                        }
                    }
                }
            }
        },
    )
}

fn status_class(status: InstanceStatus) -> &'static str {
    match status {
        InstanceStatus::Available => "text-success",
        InstanceStatus::Maintenance => "text-danger",
        InstanceStatus::Loaned | InstanceStatus::Reserved => "text-warning",
    }
}

fn copy_facts(copy: &BookInstanceDetail) -> Markup {
    html! {
        p { strong { "Title:" } " " a href=(copy.book.url()) { (copy.book.title) } }
        p { strong { "Imprint:" } " " (copy.imprint) }
        p { strong { "Status:" } " " span class=(status_class(copy.status)) { (copy.status.as_str()) } }
        @if copy.status != InstanceStatus::Available && copy.due_back.is_some() {
            p { strong { "Due back:" } " " (copy.due_back_formatted()) }
        }
    }
}

pub fn bookinstance_detail(copy: &BookInstanceDetail) -> Markup {
    layout(
        &format!("ID: {}", copy.id),
        html! {
            (copy_facts(copy))
            hr;
            p { a href=(format!("{}/delete", copy.url())) { "Delete BookInstance" } }
            p { a href=(format!("{}/update", copy.url())) { "Update BookInstance" } }
        },
    )
}

pub fn bookinstance_form(form: &FormOf<BookInstanceService>) -> Markup {
    let values = &form.values;
    layout(
        &form_title("BookInstance", form),
        html! {
            form method="POST" action="" {
                div.form-group {
                    label for="book" { "Book:" }
                    select id="book" name="book" {
                        option value="" selected[values.book.is_empty()] { "--Please select a book--" }
                        @for book in &form.choices {
                            @let id = book.id.to_string();
                            option value=(id) selected[values.book == id] { (book.title) }
                        }
                    }
                }
                div.form-group {
                    label for="imprint" { "Imprint:" }
                    input id="imprint" type="text" name="imprint" placeholder="Publisher and date information" value=(values.imprint);
                }
                div.form-group {
                    label for="due_back" { "Date when book available:" }
                    input id="due_back" type="date" name="due_back" value=(values.due_back);
                }
                div.form-group {
                    label for="status" { "Status:" }
                    select id="status" name="status" {
                        @for status in InstanceStatus::ALL {
                            option value=(status.as_str()) selected[values.status == status.as_str()] {
                                (status.as_str())
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

pub fn bookinstance_delete(copy: &BookInstanceDetail) -> Markup {
    layout(
        &format!("Delete BookInstance: {}", copy.id),
        html! {
            (copy_facts(copy))
            (delete_form("BookInstance"))
        },
    )
}

impl CatalogPages for BookInstanceService {
    fn list_page(items: &[BookInstanceDetail]) -> Markup {
        bookinstance_list(items)
    }

    fn detail_page(detail: &BookInstanceDetail) -> Markup {
        bookinstance_detail(detail)
    }

    fn form_page(form: &FormOf<Self>) -> Markup {
        bookinstance_form(form)
    }

    fn delete_page(record: &BookInstanceDetail, _dependents: &[Infallible]) -> Markup {
        bookinstance_delete(record)
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use uuid::Uuid;

    use super::*;
    use crate::models::BookTitle;

    fn copy(status: InstanceStatus, due_back: Option<NaiveDate>) -> BookInstanceDetail {
        BookInstanceDetail {
            id: Uuid::new_v4(),
            book: BookTitle {
                id: Uuid::new_v4(),
                title: "The Dispossessed".to_string(),
            },
            imprint: "Harper & Row, 1974".to_string(),
            status,
            due_back,
        }
    }

    #[test]
    fn test_list_shows_due_only_when_unavailable() {
        let loaned = copy(InstanceStatus::Loaned, NaiveDate::from_ymd_opt(2024, 3, 1));
        let available = copy(InstanceStatus::Available, None);

        let page = bookinstance_list(&[loaned, available]).into_string();
        assert_eq!(page.matches("(Due: ").count(), 1);
        assert!(page.contains("(Due: Mar 1, 2024)"));
        assert!(page.contains("Harper &amp; Row, 1974"));
    }

    #[test]
    fn test_detail_without_due_date() {
        let page = bookinstance_detail(&copy(InstanceStatus::Maintenance, None)).into_string();
        assert!(page.contains(r#"<span class="text-danger">Maintenance</span>"#));
        assert!(!page.contains("Due back:"));
    }

    #[test]
    fn test_form_selects_status() {
        let form = crate::services::FormState {
            values: crate::models::BookInstanceInput {
                status: "Reserved".to_string(),
                ..Default::default()
            },
            choices: Vec::new(),
            errors: Vec::new(),
            editing: Some(Uuid::new_v4()),
        };

        let page = bookinstance_form(&form).into_string();
        assert!(page.contains("Update BookInstance"));
        assert!(page.contains(r#"<option value="Reserved" selected>Reserved</option>"#));
        assert!(page.contains(r#"<option value="Maintenance">Maintenance</option>"#));
    }
}
