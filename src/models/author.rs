//! Author model and related types

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use super::{
    book::BookSummary, check_text, first_message, is_blank, submitted_id, text_of,
    validation_error, Embedded, RecordState,
};
use crate::error::{AppError, AppResult};

static DATE_FORMAT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("valid date pattern"));

/// Author document as stored in the `authors` collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Author {
    #[serde(rename = "_id")]
    pub id: String,
    pub fullname: String,
    #[schema(value_type = String, format = Date)]
    pub birthdate: NaiveDate,
    /// Embedded copies of the author's books (without their `authors`)
    #[serde(default)]
    pub books: Vec<BookSummary>,
    pub state: RecordState,
}

/// Author copy embedded in a book (the author without its `books`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AuthorSummary {
    #[serde(rename = "_id")]
    pub id: String,
    pub fullname: String,
    #[schema(value_type = String, format = Date)]
    pub birthdate: NaiveDate,
    pub state: RecordState,
}

impl From<&Author> for AuthorSummary {
    fn from(author: &Author) -> Self {
        Self {
            id: author.id.clone(),
            fullname: author.fullname.clone(),
            birthdate: author.birthdate,
            state: author.state,
        }
    }
}

impl Embedded for AuthorSummary {
    fn id(&self) -> &str {
        &self.id
    }
}

/// Validated scalar fields of an author write
#[derive(Debug, Clone, PartialEq)]
pub struct AuthorFields {
    pub fullname: String,
    pub birthdate: NaiveDate,
}

/// Body of author create/update/view/delete requests.
///
/// Scalar fields stay raw JSON so a value of the wrong type is reported as a
/// field error rather than a body decoding failure.
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct AuthorPayload {
    #[serde(rename = "_id", default)]
    #[schema(value_type = Option<String>)]
    pub id: Option<Value>,
    #[validate(
        required(message = "El nombre completo del autor es obligatorio"),
        custom(function = "validate_fullname")
    )]
    #[schema(value_type = Option<String>)]
    pub fullname: Option<Value>,
    #[validate(
        required(message = "La fecha de nacimiento del autor es obligatorio"),
        custom(function = "validate_birthdate")
    )]
    #[schema(value_type = Option<String>, format = Date)]
    pub birthdate: Option<Value>,
    /// Ids of the author's books
    #[validate(custom(function = "validate_books_array"))]
    #[schema(value_type = Option<Vec<String>>)]
    pub books: Option<Value>,
}

impl AuthorPayload {
    const FIELD_ORDER: &'static [&'static str] = &["fullname", "birthdate", "books"];

    /// Validate the payload and return its typed scalar fields
    pub fn fields(&self) -> AppResult<AuthorFields> {
        self.validate()
            .map_err(|e| AppError::Validation(first_message(&e, Self::FIELD_ORDER)))?;

        let birthdate = self
            .birthdate
            .as_ref()
            .and_then(Value::as_str)
            .and_then(parse_birthdate)
            .ok_or_else(|| AppError::Validation(BIRTHDATE_FORMAT.to_string()))?;

        Ok(AuthorFields {
            fullname: text_of(self.fullname.as_ref()),
            birthdate,
        })
    }

    /// Submitted `_id`, `None` when absent or empty
    pub fn id(&self) -> Option<String> {
        submitted_id(self.id.as_ref())
    }

    /// Submitted book ids, `None` when the field was not sent
    pub fn book_ids(&self) -> Option<Vec<String>> {
        super::submitted_ids(self.books.as_ref())
    }
}

const FULLNAME_REQUIRED: &str = "El nombre completo del autor es obligatorio";
const BIRTHDATE_REQUIRED: &str = "La fecha de nacimiento del autor es obligatorio";
const BIRTHDATE_FORMAT: &str = "El formato de Fecha de nacimiento es inválido.";

fn parse_birthdate(value: &str) -> Option<NaiveDate> {
    if !DATE_FORMAT.is_match(value) {
        return None;
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()
}

fn validate_fullname(value: &Value) -> Result<(), ValidationError> {
    check_text(value, FULLNAME_REQUIRED, "Nombre completo debe ser una cadena de texto.")
}

fn validate_birthdate(value: &Value) -> Result<(), ValidationError> {
    if is_blank(value) {
        return Err(validation_error("required", BIRTHDATE_REQUIRED));
    }
    match value.as_str().and_then(parse_birthdate) {
        Some(_) => Ok(()),
        None => Err(validation_error("date", BIRTHDATE_FORMAT)),
    }
}

fn validate_books_array(value: &Value) -> Result<(), ValidationError> {
    if value.is_array() {
        Ok(())
    } else {
        Err(validation_error("array", "'books' debe ser un array"))
    }
}
