//! Domain model for the people collection.
//!
//! # Responsibility
//! - Define the canonical `Person` document and its insert draft.
//! - Own the document-level validation rules shared by every write path.
//!
//! # Invariants
//! - Every stored person is identified by a non-nil `PersonId`.
//! - `name` is required; every other field is optional.

pub mod person;
