//! Repository layer contracts and persistence implementations.
//!
//! # Responsibility
//! - Define the storage contract for the people collection.
//! - Isolate SQLite query details from the service façade.
//!
//! # Invariants
//! - Repository writes validate documents before persistence.
//! - "No matching document" is `Ok(None)` / empty, never an error, except
//!   for full-document rewrites which report `NotFound`.

pub mod person_repo;
pub mod query;
