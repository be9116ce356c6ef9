//! People façade service.
//!
//! # Responsibility
//! - Provide one entry point per people use-case, each issuing one store
//!   command through the repository.
//! - Emit one diagnostic event per call with status and duration.
//!
//! # Invariants
//! - Store errors are returned unchanged; nothing is retried or reclassified.
//! - Absence is `Ok(None)` / empty for lookups and deletes.
//! - The service owns its repository and holds no other state.

use crate::model::person::{NewPerson, Person, PersonField, PersonId, PersonProjection};
use crate::repo::person_repo::{DeleteSummary, PersonRepository, RepoResult};
use crate::repo::query::{PersonQuery, PersonSortField, SortOrder};
use log::{error, info};
use std::time::Instant;

/// Food appended by [`PersonService::find_edit_then_save`].
pub const FOOD_TO_ADD: &str = "hamburger";
/// Age written by [`PersonService::find_and_update`].
pub const AGE_TO_SET: i64 = 20;
/// Default name removed by the bulk delete use-case.
pub const NAME_TO_REMOVE: &str = "Mary";
/// Default food searched by the chained query use-case.
pub const FOOD_TO_SEARCH: &str = "burrito";
/// Result cap for [`PersonService::query_chain`].
pub const QUERY_CHAIN_LIMIT: u32 = 2;

/// Literal record used by the single-create use-case.
pub fn default_person() -> NewPerson {
    NewPerson::new("John Doe")
        .with_age(30)
        .with_favorite_foods(["Pizza", "Burger"])
}

/// Literal records used by the bulk-create use-case.
pub fn default_people() -> Vec<NewPerson> {
    vec![
        NewPerson::new("Frankie")
            .with_age(74)
            .with_favorite_foods(["Del Taco"]),
        NewPerson::new("Sol")
            .with_age(76)
            .with_favorite_foods(["roast chicken"]),
        NewPerson::new("Robert")
            .with_age(78)
            .with_favorite_foods(["wine"]),
    ]
}

/// Façade over a person repository.
pub struct PersonService<R: PersonRepository> {
    repo: R,
}

impl<R: PersonRepository> PersonService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Inserts one person and returns the stored document.
    pub fn create_and_save_person(&self, draft: &NewPerson) -> RepoResult<Person> {
        let started_at = Instant::now();
        let result = self.repo.insert_person(draft);
        log_outcome("person_create", started_at, result, |person| {
            format!("person_id={}", person.id)
        })
    }

    /// Inserts all drafts in one batch.
    pub fn create_many_people(&self, drafts: &[NewPerson]) -> RepoResult<Vec<Person>> {
        let started_at = Instant::now();
        let result = self.repo.insert_people(drafts);
        log_outcome("person_create_many", started_at, result, |people| {
            format!("count={}", people.len())
        })
    }

    /// Returns every person with exactly this name, in natural order.
    pub fn find_people_by_name(&self, name: &str) -> RepoResult<Vec<Person>> {
        let started_at = Instant::now();
        let result = self.repo.find_people(&PersonQuery::by_name(name));
        log_outcome("person_find_by_name", started_at, result, |people| {
            format!("count={}", people.len())
        })
    }

    /// Returns the first person whose favorites contain `food`.
    pub fn find_one_by_food(&self, food: &str) -> RepoResult<Option<Person>> {
        let started_at = Instant::now();
        let result = self.repo.find_first(&PersonQuery::by_favorite_food(food));
        log_outcome("person_find_one_by_food", started_at, result, describe_found)
    }

    pub fn find_person_by_id(&self, id: PersonId) -> RepoResult<Option<Person>> {
        let started_at = Instant::now();
        let result = self.repo.get_person(id);
        log_outcome("person_find_by_id", started_at, result, describe_found)
    }

    /// Reads a person, appends [`FOOD_TO_ADD`] to its favorites and saves
    /// the whole document back.
    ///
    /// Returns `Ok(None)` when no person has this id.
    pub fn find_edit_then_save(&self, id: PersonId) -> RepoResult<Option<Person>> {
        let started_at = Instant::now();
        let result = self.repo.get_person(id).and_then(|found| match found {
            Some(mut person) => {
                person.favorite_foods.push(FOOD_TO_ADD.to_string());
                self.repo.replace_person(&person)?;
                Ok(Some(person))
            }
            None => Ok(None),
        });
        log_outcome("person_find_edit_save", started_at, result, describe_found)
    }

    /// Sets `age` to [`AGE_TO_SET`] on the first person named `name` and
    /// returns the updated document.
    pub fn find_and_update(&self, name: &str) -> RepoResult<Option<Person>> {
        let started_at = Instant::now();
        let result = self.repo.set_age_where_name(name, AGE_TO_SET);
        log_outcome("person_find_and_update", started_at, result, describe_found)
    }

    /// Removes one person and returns the removed document.
    pub fn remove_by_id(&self, id: PersonId) -> RepoResult<Option<Person>> {
        let started_at = Instant::now();
        let result = self.repo.delete_person(id);
        log_outcome("person_remove_by_id", started_at, result, describe_found)
    }

    /// Removes every person with exactly this name.
    pub fn remove_many_people(&self, name: &str) -> RepoResult<DeleteSummary> {
        let started_at = Instant::now();
        let result = self.repo.delete_people_where_name(name);
        log_outcome("person_remove_many", started_at, result, |summary| {
            format!("deleted_count={}", summary.deleted_count)
        })
    }

    /// People who like `food`, sorted by name, at most
    /// [`QUERY_CHAIN_LIMIT`] of them, without `age`.
    pub fn query_chain(&self, food: &str) -> RepoResult<Vec<PersonProjection>> {
        let started_at = Instant::now();
        let query = PersonQuery::by_favorite_food(food)
            .order_by(PersonSortField::Name, SortOrder::Ascending)
            .limit(QUERY_CHAIN_LIMIT);
        let result = self.repo.project_people(&query, &[PersonField::Age]);
        log_outcome("person_query_chain", started_at, result, |people| {
            format!("count={}", people.len())
        })
    }

    /// Number of stored people.
    pub fn count_people(&self) -> RepoResult<u64> {
        self.repo.count_people()
    }
}

fn describe_found(found: &Option<Person>) -> String {
    match found {
        Some(person) => format!("found=true person_id={}", person.id),
        None => "found=false".to_string(),
    }
}

fn log_outcome<T>(
    event: &str,
    started_at: Instant,
    result: RepoResult<T>,
    describe: impl FnOnce(&T) -> String,
) -> RepoResult<T> {
    match &result {
        Ok(value) => info!(
            "event={} module=service status=ok duration_ms={} {}",
            event,
            started_at.elapsed().as_millis(),
            describe(value)
        ),
        Err(err) => error!(
            "event={} module=service status=error duration_ms={} error={}",
            event,
            started_at.elapsed().as_millis(),
            err
        ),
    }
    result
}
