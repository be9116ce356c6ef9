//! Person repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide document-style CRUD and query APIs over the `people` table.
//! - Keep SQL and JSON column encoding inside the persistence boundary.
//!
//! # Invariants
//! - Write paths validate documents before any SQL mutation.
//! - Read paths reject invalid persisted state instead of masking it.
//! - Single-document lookups and deletes report absence as `None`.
//! - Multi-statement operations run inside one transaction.

use crate::db::migrations::{current_user_version, latest_version};
use crate::db::DbError;
use crate::model::person::{
    NewPerson, Person, PersonField, PersonId, PersonProjection, PersonValidationError,
};
use crate::repo::query::PersonQuery;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const PERSON_SELECT_SQL: &str = "SELECT
    id,
    name,
    age,
    favorite_foods
FROM people";

const REQUIRED_PEOPLE_COLUMNS: &[&str] = &["seq", "id", "name", "age", "favorite_foods"];

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for person persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(PersonValidationError),
    Db(DbError),
    NotFound(PersonId),
    InvalidData(String),
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "person not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted person data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection is not initialized: expected schema version {expected_version}, found {actual_version}"
            ),
            Self::MissingRequiredTable(table) => write!(f, "missing required table `{table}`"),
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "missing required column `{table}.{column}`")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<PersonValidationError> for RepoError {
    fn from(value: PersonValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Result of a bulk delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DeleteSummary {
    #[serde(rename = "deletedCount")]
    pub deleted_count: u64,
}

/// Storage contract for the people collection.
pub trait PersonRepository {
    /// Inserts one document and returns it with its assigned id.
    fn insert_person(&self, draft: &NewPerson) -> RepoResult<Person>;
    /// Inserts all drafts atomically, preserving input order.
    fn insert_people(&self, drafts: &[NewPerson]) -> RepoResult<Vec<Person>>;
    fn get_person(&self, id: PersonId) -> RepoResult<Option<Person>>;
    fn find_people(&self, query: &PersonQuery) -> RepoResult<Vec<Person>>;
    /// Returns the first document the query yields, if any.
    fn find_first(&self, query: &PersonQuery) -> RepoResult<Option<Person>>;
    /// Runs `query` and drops `excluded` fields from every result.
    fn project_people(
        &self,
        query: &PersonQuery,
        excluded: &[PersonField],
    ) -> RepoResult<Vec<PersonProjection>>;
    /// Rewrites the whole document; `NotFound` when the id is unknown.
    fn replace_person(&self, person: &Person) -> RepoResult<()>;
    /// Sets `age` on the first document named `name` and returns its new state.
    fn set_age_where_name(&self, name: &str, age: i64) -> RepoResult<Option<Person>>;
    /// Removes one document and returns what was removed.
    fn delete_person(&self, id: PersonId) -> RepoResult<Option<Person>>;
    fn delete_people_where_name(&self, name: &str) -> RepoResult<DeleteSummary>;
    fn count_people(&self) -> RepoResult<u64>;
}

/// SQLite-backed person repository.
pub struct SqlitePersonRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqlitePersonRepository<'conn> {
    /// Constructs a repository from an opened store connection.
    ///
    /// Rejects connections that did not go through `db::open_*`.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl PersonRepository for SqlitePersonRepository<'_> {
    fn insert_person(&self, draft: &NewPerson) -> RepoResult<Person> {
        let person = Person::from_draft(draft)?;
        insert_row(self.conn, &person)?;
        Ok(person)
    }

    fn insert_people(&self, drafts: &[NewPerson]) -> RepoResult<Vec<Person>> {
        let people = drafts
            .iter()
            .map(Person::from_draft)
            .collect::<Result<Vec<_>, _>>()?;

        let tx = self.conn.unchecked_transaction()?;
        for person in &people {
            insert_row(&tx, person)?;
        }
        tx.commit()?;

        Ok(people)
    }

    fn get_person(&self, id: PersonId) -> RepoResult<Option<Person>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{PERSON_SELECT_SQL} WHERE id = ?1;"))?;

        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_person_row(row)?));
        }

        Ok(None)
    }

    fn find_people(&self, query: &PersonQuery) -> RepoResult<Vec<Person>> {
        let (clauses, bind_values) = query.to_sql();
        let mut stmt = self.conn.prepare(&format!("{PERSON_SELECT_SQL}{clauses};"))?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut people = Vec::new();

        while let Some(row) = rows.next()? {
            people.push(parse_person_row(row)?);
        }

        Ok(people)
    }

    fn find_first(&self, query: &PersonQuery) -> RepoResult<Option<Person>> {
        let first = query.clone().limit(1);
        Ok(self.find_people(&first)?.into_iter().next())
    }

    fn project_people(
        &self,
        query: &PersonQuery,
        excluded: &[PersonField],
    ) -> RepoResult<Vec<PersonProjection>> {
        let included: Vec<PersonField> = PersonField::ALL
            .into_iter()
            .filter(|field| !excluded.contains(field))
            .collect();
        if included.is_empty() {
            return Err(RepoError::InvalidData(
                "projection must keep at least one field".to_string(),
            ));
        }

        let columns = included
            .iter()
            .map(|field| field_column(*field))
            .collect::<Vec<_>>()
            .join(", ");
        let (clauses, bind_values) = query.to_sql();
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {columns} FROM people{clauses};"))?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut projections = Vec::new();

        while let Some(row) = rows.next()? {
            projections.push(parse_projection_row(row, &included)?);
        }

        Ok(projections)
    }

    fn replace_person(&self, person: &Person) -> RepoResult<()> {
        person.validate()?;

        let changed = self.conn.execute(
            "UPDATE people
             SET
                name = ?1,
                age = ?2,
                favorite_foods = ?3,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?4;",
            params![
                person.name.as_str(),
                person.age,
                encode_foods(&person.favorite_foods)?,
                person.id.to_string(),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(person.id));
        }

        Ok(())
    }

    fn set_age_where_name(&self, name: &str, age: i64) -> RepoResult<Option<Person>> {
        let tx = self.conn.unchecked_transaction()?;
        let target: Option<String> = tx
            .query_row(
                "SELECT id FROM people WHERE name = ?1 ORDER BY seq ASC LIMIT 1;",
                [name],
                |row| row.get(0),
            )
            .optional()?;

        let Some(id_text) = target else {
            return Ok(None);
        };

        tx.execute(
            "UPDATE people
             SET
                age = ?1,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?2;",
            params![age, id_text],
        )?;

        let updated = {
            let mut stmt = tx.prepare(&format!("{PERSON_SELECT_SQL} WHERE id = ?1;"))?;
            let mut rows = stmt.query([id_text.as_str()])?;
            match rows.next()? {
                Some(row) => Some(parse_person_row(row)?),
                None => None,
            }
        };
        tx.commit()?;

        Ok(updated)
    }

    fn delete_person(&self, id: PersonId) -> RepoResult<Option<Person>> {
        let tx = self.conn.unchecked_transaction()?;
        let existing = {
            let mut stmt = tx.prepare(&format!("{PERSON_SELECT_SQL} WHERE id = ?1;"))?;
            let mut rows = stmt.query([id.to_string()])?;
            match rows.next()? {
                Some(row) => Some(parse_person_row(row)?),
                None => None,
            }
        };

        if existing.is_some() {
            tx.execute("DELETE FROM people WHERE id = ?1;", [id.to_string()])?;
        }
        tx.commit()?;

        Ok(existing)
    }

    fn delete_people_where_name(&self, name: &str) -> RepoResult<DeleteSummary> {
        let deleted = self
            .conn
            .execute("DELETE FROM people WHERE name = ?1;", [name])?;

        Ok(DeleteSummary {
            deleted_count: deleted as u64,
        })
    }

    fn count_people(&self) -> RepoResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM people;", [], |row| row.get(0))?;
        u64::try_from(count)
            .map_err(|_| RepoError::InvalidData(format!("negative row count `{count}`")))
    }
}

fn insert_row(conn: &Connection, person: &Person) -> RepoResult<()> {
    conn.execute(
        "INSERT INTO people (
            id,
            name,
            age,
            favorite_foods
        ) VALUES (?1, ?2, ?3, ?4);",
        params![
            person.id.to_string(),
            person.name.as_str(),
            person.age,
            encode_foods(&person.favorite_foods)?,
        ],
    )?;
    Ok(())
}

fn ensure_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version = current_user_version(conn)?;
    if actual_version < expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    let table_exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = 'people'
        );",
        [],
        |row| row.get(0),
    )?;
    if table_exists == 0 {
        return Err(RepoError::MissingRequiredTable("people"));
    }

    let mut stmt = conn.prepare("PRAGMA table_info(people);")?;
    let columns = stmt
        .query_map([], |row| row.get::<_, String>("name"))?
        .collect::<Result<Vec<_>, _>>()?;
    for &column in REQUIRED_PEOPLE_COLUMNS {
        if !columns.iter().any(|name| name == column) {
            return Err(RepoError::MissingRequiredColumn {
                table: "people",
                column,
            });
        }
    }

    Ok(())
}

fn parse_person_row(row: &Row<'_>) -> RepoResult<Person> {
    let person = Person {
        id: parse_id(row)?,
        name: row.get("name")?,
        age: row.get("age")?,
        favorite_foods: parse_foods(row)?,
    };
    person.validate()?;
    Ok(person)
}

fn parse_projection_row(row: &Row<'_>, included: &[PersonField]) -> RepoResult<PersonProjection> {
    let mut projection = PersonProjection::default();
    for field in included {
        match field {
            PersonField::Id => projection.id = Some(parse_id(row)?),
            PersonField::Name => projection.name = Some(row.get("name")?),
            PersonField::Age => projection.age = row.get("age")?,
            PersonField::FavoriteFoods => projection.favorite_foods = Some(parse_foods(row)?),
        }
    }
    Ok(projection)
}

fn parse_id(row: &Row<'_>) -> RepoResult<PersonId> {
    let id_text: String = row.get("id")?;
    Uuid::parse_str(&id_text).map_err(|_| {
        RepoError::InvalidData(format!("invalid uuid value `{id_text}` in people.id"))
    })
}

fn parse_foods(row: &Row<'_>) -> RepoResult<Vec<String>> {
    let raw: String = row.get("favorite_foods")?;
    serde_json::from_str(&raw).map_err(|err| {
        RepoError::InvalidData(format!(
            "invalid favorite_foods value `{raw}` in people.favorite_foods: {err}"
        ))
    })
}

fn encode_foods(foods: &[String]) -> RepoResult<String> {
    serde_json::to_string(foods)
        .map_err(|err| RepoError::InvalidData(format!("cannot encode favorite_foods: {err}")))
}

fn field_column(field: PersonField) -> &'static str {
    match field {
        PersonField::Id => "id",
        PersonField::Name => "name",
        PersonField::Age => "age",
        PersonField::FavoriteFoods => "favorite_foods",
    }
}
