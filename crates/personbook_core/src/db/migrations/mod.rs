//! Table layout for the `people` collection.
//!
//! The store keeps one row per person document. `favorite_foods` holds the
//! ordered food list as a JSON array, and `seq` records insertion order so
//! "first match" lookups are deterministic. Layout revisions are numbered;
//! the number a database has reached lives in `PRAGMA user_version`.

use crate::db::{DbError, DbResult};
use log::info;
use rusqlite::Connection;

/// One numbered revision of the people layout.
struct LayoutStep {
    version: u32,
    sql: &'static str,
}

const PEOPLE_LAYOUT: &[LayoutStep] = &[LayoutStep {
    version: 1,
    sql: include_str!("0001_people.sql"),
}];

/// Highest layout revision this build can create and read.
pub fn latest_version() -> u32 {
    PEOPLE_LAYOUT.iter().map(|step| step.version).max().unwrap_or(0)
}

/// Brings the people layout up to [`latest_version`].
///
/// Steps newer than the database's revision run in one transaction, so a
/// failing step leaves the database at its previous revision. A database
/// written by a newer build is refused rather than downgraded.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    let found = current_user_version(conn)?;
    let latest = latest_version();

    if found > latest {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: found,
            latest_supported: latest,
        });
    }

    let pending: Vec<&LayoutStep> = PEOPLE_LAYOUT
        .iter()
        .filter(|step| step.version > found)
        .collect();
    if pending.is_empty() {
        return Ok(());
    }

    let tx = conn.transaction()?;
    for step in &pending {
        tx.execute_batch(step.sql)?;
        tx.pragma_update(None, "user_version", step.version)?;
    }
    tx.commit()?;

    info!(
        "event=db_layout module=db status=ok from_version={} to_version={}",
        found, latest
    );
    Ok(())
}

/// Layout revision recorded in the database (`0` for a fresh file).
pub fn current_user_version(conn: &Connection) -> DbResult<u32> {
    Ok(conn.pragma_query_value(None, "user_version", |row| row.get::<_, u32>(0))?)
}

#[cfg(test)]
mod tests {
    use super::{apply_migrations, current_user_version, latest_version};
    use rusqlite::Connection;

    #[test]
    fn fresh_database_reaches_latest_revision_once() {
        let mut conn = Connection::open_in_memory().unwrap();
        assert_eq!(current_user_version(&conn).unwrap(), 0);

        apply_migrations(&mut conn).unwrap();
        assert_eq!(current_user_version(&conn).unwrap(), latest_version());

        apply_migrations(&mut conn).unwrap();
        assert_eq!(current_user_version(&conn).unwrap(), latest_version());
    }

    #[test]
    fn people_layout_accepts_whitespace_names_but_not_empty_ones() {
        let mut conn = Connection::open_in_memory().unwrap();
        apply_migrations(&mut conn).unwrap();

        conn.execute(
            "INSERT INTO people (id, name) VALUES ('11111111-2222-4333-8444-555555555555', '   ');",
            [],
        )
        .unwrap();
        assert!(conn
            .execute(
                "INSERT INTO people (id, name) VALUES ('11111111-2222-4333-8444-555555555556', '');",
                [],
            )
            .is_err());
    }
}
