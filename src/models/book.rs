//! Book model and related types

use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use super::{
    author::AuthorSummary, check_text, first_message, is_blank, submitted_id, text_of,
    validation_error, Embedded, RecordState,
};
use crate::error::{AppError, AppResult};

const TITLE_REQUIRED: &str = "El título es obligatorio.";
const DESCRIPTION_REQUIRED: &str = "La descripción es obligatoria.";
const YEAR_REQUIRED: &str = "El año de publicación es obligatorio.";
const YEAR_FORMAT: &str = "El formato de Año de publicación es inválido.";

/// Book document as stored in the `books` collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Book {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    #[serde(rename = "publicationYear")]
    pub publication_year: i32,
    pub description: String,
    /// Embedded copies of the book's authors (without their `books`)
    #[serde(default)]
    pub authors: Vec<AuthorSummary>,
    pub state: RecordState,
}

/// Book copy embedded in an author (the book without its `authors`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct BookSummary {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    #[serde(rename = "publicationYear")]
    pub publication_year: i32,
    pub description: String,
    pub state: RecordState,
}

impl From<&Book> for BookSummary {
    fn from(book: &Book) -> Self {
        Self {
            id: book.id.clone(),
            title: book.title.clone(),
            publication_year: book.publication_year,
            description: book.description.clone(),
            state: book.state,
        }
    }
}

impl Embedded for BookSummary {
    fn id(&self) -> &str {
        &self.id
    }
}

/// Validated scalar fields of a book write
#[derive(Debug, Clone, PartialEq)]
pub struct BookFields {
    pub title: String,
    pub publication_year: i32,
    pub description: String,
}

/// Body of book create/update/view/delete requests.
///
/// Scalar fields stay raw JSON so a value of the wrong type is reported as a
/// field error rather than a body decoding failure.
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct BookPayload {
    #[serde(rename = "_id", default)]
    #[schema(value_type = Option<String>)]
    pub id: Option<Value>,
    #[validate(
        required(message = "El título es obligatorio."),
        custom(function = "validate_title")
    )]
    #[schema(value_type = Option<String>)]
    pub title: Option<Value>,
    /// Four-digit year, as a string or a number
    #[serde(rename = "publicationYear")]
    #[validate(
        required(message = "El año de publicación es obligatorio."),
        custom(function = "validate_publication_year")
    )]
    #[schema(value_type = Option<String>)]
    pub publication_year: Option<Value>,
    #[validate(
        required(message = "La descripción es obligatoria."),
        custom(function = "validate_description")
    )]
    #[schema(value_type = Option<String>)]
    pub description: Option<Value>,
    /// Ids of the book's authors
    #[validate(custom(function = "validate_authors_array"))]
    #[schema(value_type = Option<Vec<String>>)]
    pub authors: Option<Value>,
}

impl BookPayload {
    // errors may be keyed by either the wire name or the Rust name
    const FIELD_ORDER: &'static [&'static str] = &[
        "title",
        "publicationYear",
        "publication_year",
        "description",
        "authors",
    ];

    /// Validate the payload and return its typed scalar fields
    pub fn fields(&self) -> AppResult<BookFields> {
        self.validate()
            .map_err(|e| AppError::Validation(first_message(&e, Self::FIELD_ORDER)))?;

        let publication_year = self
            .publication_year
            .as_ref()
            .and_then(parse_year)
            .ok_or_else(|| AppError::Validation(YEAR_FORMAT.to_string()))?;

        Ok(BookFields {
            title: text_of(self.title.as_ref()),
            publication_year,
            description: text_of(self.description.as_ref()),
        })
    }

    /// Submitted `_id`, `None` when absent or empty
    pub fn id(&self) -> Option<String> {
        submitted_id(self.id.as_ref())
    }

    /// Submitted author ids, `None` when the field was not sent
    pub fn author_ids(&self) -> Option<Vec<String>> {
        super::submitted_ids(self.authors.as_ref())
    }
}

fn parse_year(value: &Value) -> Option<i32> {
    match value {
        Value::String(s) if s.len() == 4 && s.bytes().all(|b| b.is_ascii_digit()) => s.parse().ok(),
        Value::Number(n) => n
            .as_i64()
            .filter(|year| (1000..=9999).contains(year))
            .map(|year| year as i32),
        _ => None,
    }
}

fn validate_title(value: &Value) -> Result<(), ValidationError> {
    check_text(value, TITLE_REQUIRED, "Titulo debe ser una cadena de texto.")
}

fn validate_description(value: &Value) -> Result<(), ValidationError> {
    check_text(value, DESCRIPTION_REQUIRED, "Descripción debe ser una cadena de texto.")
}

fn validate_publication_year(value: &Value) -> Result<(), ValidationError> {
    if is_blank(value) {
        return Err(validation_error("required", YEAR_REQUIRED));
    }
    match parse_year(value) {
        Some(_) => Ok(()),
        None => Err(validation_error("date", YEAR_FORMAT)),
    }
}

fn validate_authors_array(value: &Value) -> Result<(), ValidationError> {
    if value.is_array() {
        Ok(())
    } else {
        Err(validation_error("array", "'authors' debe ser un array"))
    }
}
