//! Data-access core for the people collection.
//! A small document-store façade: one entity, one table, one service.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::{Config, ConfigError};
pub use logging::{default_log_level, init_logging, logging_status, LogTarget};
pub use model::person::{
    NewPerson, Person, PersonField, PersonId, PersonProjection, PersonValidationError,
};
pub use repo::person_repo::{
    DeleteSummary, PersonRepository, RepoError, RepoResult, SqlitePersonRepository,
};
pub use repo::query::{PersonQuery, PersonSortField, SortOrder};
pub use service::person_service::{
    default_people, default_person, PersonService, AGE_TO_SET, FOOD_TO_ADD, FOOD_TO_SEARCH,
    NAME_TO_REMOVE, QUERY_CHAIN_LIMIT,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
