//! Book records, form drafts, and auth DTOs.
//!
//! DESIGN
//! ======
//! `Book` mirrors the remote service payload. Servers fed by HTML forms tend
//! to echo numeric fields back as strings, so `id` and `year` accept either
//! JSON numbers or numeric strings. Drafts keep raw form text and only turn
//! into a typed `BookInput` through validation.

use std::fmt;
use std::str::FromStr;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::ValidationError;

/// Server-assigned book identifier.
pub type BookId = i64;

/// A book record as returned by the remote service.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: BookId,
    pub title: String,
    pub author: String,
    #[serde(default, deserialize_with = "deserialize_optional_year")]
    pub year: Option<i32>,
    #[serde(default, deserialize_with = "deserialize_optional_text")]
    pub genre: Option<String>,
}

/// Validated book fields sent on create and update.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct BookInput {
    pub title: String,
    pub author: String,
    pub year: Option<i32>,
    pub genre: Option<String>,
}

impl BookInput {
    /// Attach an identifier, producing the committed record.
    #[must_use]
    pub fn into_book(self, id: BookId) -> Book {
        Book { id, title: self.title, author: self.author, year: self.year, genre: self.genre }
    }
}

/// Form field addressed by a draft update.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DraftField {
    Title,
    Author,
    Year,
    Genre,
}

impl FromStr for DraftField {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "title" => Ok(Self::Title),
            "author" => Ok(Self::Author),
            "year" => Ok(Self::Year),
            "genre" => Ok(Self::Genre),
            other => Err(format!("unknown field `{other}` (expected title, author, year or genre)")),
        }
    }
}

impl fmt::Display for DraftField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Title => "title",
            Self::Author => "author",
            Self::Year => "year",
            Self::Genre => "genre",
        };
        f.write_str(name)
    }
}

/// In-progress form contents for a new or edited book.
///
/// `id` is `Some` only for edit drafts.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BookDraft {
    pub id: Option<BookId>,
    pub title: String,
    pub author: String,
    pub year: String,
    pub genre: String,
}

impl BookDraft {
    /// Copy an existing record into an edit draft.
    #[must_use]
    pub fn from_book(book: &Book) -> Self {
        Self {
            id: Some(book.id),
            title: book.title.clone(),
            author: book.author.clone(),
            year: book.year.map(|year| year.to_string()).unwrap_or_default(),
            genre: book.genre.clone().unwrap_or_default(),
        }
    }

    /// Replace one field with raw form text.
    pub fn set(&mut self, field: DraftField, value: impl Into<String>) {
        let value = value.into();
        match field {
            DraftField::Title => self.title = value,
            DraftField::Author => self.author = value,
            DraftField::Year => self.year = value,
            DraftField::Genre => self.genre = value,
        }
    }

    #[must_use]
    pub fn get(&self, field: DraftField) -> &str {
        match field {
            DraftField::Title => &self.title,
            DraftField::Author => &self.author,
            DraftField::Year => &self.year,
            DraftField::Genre => &self.genre,
        }
    }

    /// Check required fields and parse the year.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] if title or author is blank, or the year
    /// is present but not an integer.
    pub fn validate(&self) -> Result<BookInput, ValidationError> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(ValidationError::MissingField("title"));
        }
        let author = self.author.trim();
        if author.is_empty() {
            return Err(ValidationError::MissingField("author"));
        }
        let year = match self.year.trim() {
            "" => None,
            raw => Some(raw.parse::<i32>().map_err(|_| ValidationError::InvalidYear(raw.to_owned()))?),
        };
        let genre = Some(self.genre.trim()).filter(|genre| !genre.is_empty()).map(ToOwned::to_owned);

        Ok(BookInput { title: title.to_owned(), author: author.to_owned(), year, genre })
    }
}

/// Credentials posted to the login endpoint.
#[derive(Clone, Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// Successful login payload.
#[derive(Clone, Debug, Deserialize)]
pub struct LoginResponse {
    pub token: String,
}

fn deserialize_id<'de, D>(deserializer: D) -> Result<BookId, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    integer_from_value(&value)?.ok_or_else(|| D::Error::custom("book id is missing"))
}

fn deserialize_optional_year<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    let Some(year) = integer_from_value(&value)? else {
        return Ok(None);
    };
    i32::try_from(year)
        .map(Some)
        .map_err(|_| D::Error::custom(format!("year {year} out of range")))
}

fn deserialize_optional_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let text = Option::<String>::deserialize(deserializer)?;
    Ok(text.filter(|text| !text.trim().is_empty()))
}

/// Accept integers, integral floats, numeric strings, blanks and null.
fn integer_from_value<E: serde::de::Error>(value: &serde_json::Value) -> Result<Option<i64>, E> {
    match value {
        serde_json::Value::Null => Ok(None),
        serde_json::Value::Number(number) => {
            if let Some(int) = number.as_i64() {
                return Ok(Some(int));
            }
            #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
            if let Some(float) = number.as_f64()
                && float.is_finite()
                && float.fract() == 0.0
                && float >= i64::MIN as f64
                && float <= i64::MAX as f64
            {
                return Ok(Some(float as i64));
            }
            Err(E::custom("expected integer-compatible number"))
        }
        serde_json::Value::String(raw) if raw.trim().is_empty() => Ok(None),
        serde_json::Value::String(raw) => raw
            .trim()
            .parse::<i64>()
            .map(Some)
            .map_err(|_| E::custom(format!("expected integer, got `{raw}`"))),
        _ => Err(E::custom("expected number or numeric string")),
    }
}

#[cfg(test)]
#[path = "types_test.rs"]
mod tests;
