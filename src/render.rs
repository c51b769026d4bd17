//! Plain-text rendering of the catalog screens.

use std::fmt::Write;

use crate::catalog::Catalog;
use crate::types::{Book, BookDraft};
use crate::view::View;

const HEADERS: [&str; 5] = ["ID", "Title", "Author", "Year", "Genre"];
const EMPTY_LIST: &str = "No books to show.";

/// Render whatever screen the catalog is on.
#[must_use]
pub fn render_view(catalog: &Catalog) -> String {
    match catalog.view() {
        View::LoggedOut => render_login(),
        View::List => render_list(catalog.books()),
        View::Add => render_form("Add book", catalog.new_draft()),
        View::Edit(id) => match catalog.edit_draft() {
            Some(draft) => render_form(&format!("Edit book #{id}"), draft),
            None => render_list(catalog.books()),
        },
    }
}

#[must_use]
pub fn render_login() -> String {
    "== Book Catalog ==\nLog in with: login <email> <password>\n".to_owned()
}

/// Book table with one row per record, or a placeholder row when empty.
#[must_use]
pub fn render_list(books: &[Book]) -> String {
    let rows: Vec<[String; 5]> = books.iter().map(row).collect();
    let mut widths = HEADERS.map(str::len);
    for cells in &rows {
        for (width, cell) in widths.iter_mut().zip(cells) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::from("== Books ==\n");
    push_row(&mut out, &HEADERS.map(ToOwned::to_owned), &widths);
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    let _ = writeln!(out, "{}", rule.join("-+-"));
    if rows.is_empty() {
        let _ = writeln!(out, "{EMPTY_LIST}");
    }
    for cells in &rows {
        push_row(&mut out, cells, &widths);
    }
    out
}

/// Form view listing each draft field with its current text.
#[must_use]
pub fn render_form(heading: &str, draft: &BookDraft) -> String {
    let mut out = format!("== {heading} ==\n");
    let _ = writeln!(out, "  title : {}", draft.title);
    let _ = writeln!(out, "  author: {}", draft.author);
    let _ = writeln!(out, "  year  : {}", draft.year);
    let _ = writeln!(out, "  genre : {}", draft.genre);
    out.push_str("set <field> <value> | save | cancel\n");
    out
}

fn row(book: &Book) -> [String; 5] {
    [
        book.id.to_string(),
        book.title.clone(),
        book.author.clone(),
        book.year.map(|year| year.to_string()).unwrap_or_default(),
        book.genre.clone().unwrap_or_default(),
    ]
}

fn push_row(out: &mut String, cells: &[String; 5], widths: &[usize; 5]) {
    let padded: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, &width)| format!("{cell:<width$}"))
        .collect();
    let _ = writeln!(out, "{}", padded.join(" | ").trim_end());
}

#[cfg(test)]
#[path = "render_test.rs"]
mod tests;
