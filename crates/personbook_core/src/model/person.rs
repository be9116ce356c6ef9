//! Person document model.
//!
//! # Responsibility
//! - Define the stored `Person` document and the `NewPerson` insert draft.
//! - Define the `PersonProjection` shape returned by field-excluding queries.
//!
//! # Invariants
//! - `id` is assigned by the store layer and never reused.
//! - `name` is non-empty for every persisted document.
//! - `favorite_foods` keeps insertion order; absence means empty.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier assigned to every stored person.
pub type PersonId = Uuid;

/// Validation failures for person documents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersonValidationError {
    /// `name` is missing or empty.
    MissingName,
    /// Nil UUID cannot identify a document.
    NilId,
}

impl Display for PersonValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingName => write!(f, "person validation failed: `name` is required"),
            Self::NilId => write!(f, "person validation failed: id must not be nil"),
        }
    }
}

impl Error for PersonValidationError {}

/// Insert draft: a person document before the store assigns its id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPerson {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<i64>,
    #[serde(rename = "favoriteFoods", default)]
    pub favorite_foods: Vec<String>,
}

impl NewPerson {
    /// Creates a draft with only the required `name` set.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            age: None,
            favorite_foods: Vec::new(),
        }
    }

    /// Sets `age`.
    pub fn with_age(mut self, age: i64) -> Self {
        self.age = Some(age);
        self
    }

    /// Replaces `favorite_foods` with the given sequence.
    pub fn with_favorite_foods<I, S>(mut self, foods: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.favorite_foods = foods.into_iter().map(Into::into).collect();
        self
    }
}

/// Stored person document.
///
/// Serialized with document-style field names (`_id`, `favoriteFoods`);
/// `age` is omitted when absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "PersonDocument")]
pub struct Person {
    #[serde(rename = "_id")]
    pub id: PersonId,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<i64>,
    #[serde(rename = "favoriteFoods")]
    pub favorite_foods: Vec<String>,
}

impl Person {
    /// Materializes a draft under a freshly generated id.
    ///
    /// This is the single validation point for new documents.
    pub fn from_draft(draft: &NewPerson) -> Result<Self, PersonValidationError> {
        Self::with_id(Uuid::new_v4(), draft)
    }

    /// Materializes a draft under a caller-provided id.
    ///
    /// Used when identity already exists, e.g. when decoding stored rows.
    pub fn with_id(id: PersonId, draft: &NewPerson) -> Result<Self, PersonValidationError> {
        let person = Self {
            id,
            name: draft.name.clone(),
            age: draft.age,
            favorite_foods: draft.favorite_foods.clone(),
        };
        person.validate()?;
        Ok(person)
    }

    /// Checks document invariants.
    pub fn validate(&self) -> Result<(), PersonValidationError> {
        if self.id.is_nil() {
            return Err(PersonValidationError::NilId);
        }
        validate_name(&self.name)
    }
}

#[derive(Deserialize)]
struct PersonDocument {
    #[serde(rename = "_id")]
    id: PersonId,
    name: String,
    #[serde(default)]
    age: Option<i64>,
    #[serde(rename = "favoriteFoods", default)]
    favorite_foods: Vec<String>,
}

impl TryFrom<PersonDocument> for Person {
    type Error = PersonValidationError;

    fn try_from(value: PersonDocument) -> Result<Self, Self::Error> {
        let person = Self {
            id: value.id,
            name: value.name,
            age: value.age,
            favorite_foods: value.favorite_foods,
        };
        person.validate()?;
        Ok(person)
    }
}

/// Addressable fields of a person document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PersonField {
    Id,
    Name,
    Age,
    FavoriteFoods,
}

impl PersonField {
    /// All fields in document order.
    pub const ALL: [PersonField; 4] = [Self::Id, Self::Name, Self::Age, Self::FavoriteFoods];
}

/// Partial view of a person document with some fields excluded.
///
/// Excluded fields are `None` and never serialized, so an excluded `age`
/// does not appear in output at all.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PersonProjection {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<PersonId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<i64>,
    #[serde(rename = "favoriteFoods", skip_serializing_if = "Option::is_none")]
    pub favorite_foods: Option<Vec<String>>,
}

fn validate_name(name: &str) -> Result<(), PersonValidationError> {
    if name.is_empty() {
        return Err(PersonValidationError::MissingName);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{NewPerson, Person, PersonValidationError};
    use uuid::Uuid;

    #[test]
    fn draft_builder_sets_fields() {
        let draft = NewPerson::new("Ana")
            .with_age(41)
            .with_favorite_foods(["tacos", "burrito"]);

        assert_eq!(draft.name, "Ana");
        assert_eq!(draft.age, Some(41));
        assert_eq!(draft.favorite_foods, vec!["tacos", "burrito"]);
    }

    #[test]
    fn empty_name_is_rejected() {
        assert_eq!(
            Person::from_draft(&NewPerson::new("")),
            Err(PersonValidationError::MissingName)
        );
    }

    #[test]
    fn whitespace_name_counts_as_present() {
        let person = Person::from_draft(&NewPerson::new("   ")).unwrap();
        assert_eq!(person.name, "   ");
    }

    #[test]
    fn with_id_rejects_nil_id() {
        let err = Person::with_id(Uuid::nil(), &NewPerson::new("Ana")).unwrap_err();
        assert_eq!(err, PersonValidationError::NilId);
    }
}
