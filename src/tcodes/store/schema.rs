//! SQLite schema creation and migration.
//!
//! ## Versions
//!
//! - **1**: a single `transactions` table keyed by `tcode`, with the favorite
//!   flag stored inline on each row and no tags. Some rows may lack a title.
//! - **2**: `entries` (code, title, description, tags) plus a separate
//!   `favorites` membership table. Favorites are keyed by code only, so
//!   reference codes can be favorited too.
//!
//! The version is recorded in `schema_version`. A store without that table
//! but with a `transactions` table is a version 1 store.
//!
//! Each migration step runs inside one SQLite transaction together with the
//! version bump, so a failed step leaves the previous version fully intact.
//! Steps are written to be safe to re-run on an already migrated store.

use crate::error::StorageError;
use crate::tags::{encode_tags, DEFAULT_CUSTOM_TAG};
use rusqlite::{Connection, Transaction};
use std::collections::BTreeSet;
use std::path::Path;
use tracing::{info, warn};

/// Current schema version. Increment when adding migrations.
pub const CURRENT_VERSION: i32 = 2;

/// Layout of a version 1 store.
pub const V1_SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS transactions (
    tcode TEXT PRIMARY KEY,
    description TEXT,
    favorite INTEGER NOT NULL DEFAULT 0
);
"#;

const SCHEMA_SQL: &str = r#"
-- Schema version tracking
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER NOT NULL,
    applied_at TEXT NOT NULL DEFAULT (datetime('now'))
);

-- User-created transaction codes
CREATE TABLE IF NOT EXISTS entries (
    code TEXT PRIMARY KEY NOT NULL CHECK (code <> ''),
    title TEXT NOT NULL DEFAULT '',
    description TEXT NOT NULL DEFAULT '',
    tags TEXT NOT NULL,
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);

-- Favorite membership, weak reference by code
CREATE TABLE IF NOT EXISTS favorites (
    code TEXT PRIMARY KEY NOT NULL CHECK (code <> ''),
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
);
"#;

/// Open or create a catalog database at the given path.
pub fn open_database(path: &Path) -> Result<Connection, StorageError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent).map_err(|e| {
                StorageError::Unavailable(format!("{}: {}", parent.display(), e))
            })?;
        }
    }

    let mut conn = Connection::open(path)
        .map_err(|e| StorageError::Unavailable(format!("{}: {}", path.display(), e)))?;
    conn.execute_batch("PRAGMA journal_mode=WAL;")
        .map_err(|e| StorageError::Unavailable(format!("{}: {}", path.display(), e)))?;

    prepare(&mut conn)?;
    Ok(conn)
}

/// Open an in-memory database with the full schema. Useful for testing.
pub fn open_memory() -> Result<Connection, StorageError> {
    let mut conn = Connection::open_in_memory()
        .map_err(|e| StorageError::Unavailable(e.to_string()))?;
    prepare(&mut conn)?;
    Ok(conn)
}

/// Bring an open connection to `CURRENT_VERSION`.
pub fn prepare(conn: &mut Connection) -> Result<(), StorageError> {
    let version = get_schema_version(conn)?;
    if version == 0 {
        create_schema(conn)?;
    } else if version < CURRENT_VERSION {
        migrate(conn, version)?;
    } else if version > CURRENT_VERSION {
        return Err(StorageError::UnsupportedVersion {
            found: version,
            supported: CURRENT_VERSION,
        });
    }
    Ok(())
}

/// Create all tables if they don't exist and record the current version.
///
/// Idempotent; safe to call on an existing database.
pub fn create_schema(conn: &Connection) -> Result<(), StorageError> {
    conn.execute_batch(SCHEMA_SQL)?;
    if get_schema_version(conn)? < CURRENT_VERSION {
        set_schema_version(conn, CURRENT_VERSION)?;
    }
    Ok(())
}

/// Get the current schema version, or 0 if no schema exists.
pub fn get_schema_version(conn: &Connection) -> Result<i32, StorageError> {
    if table_exists(conn, "schema_version")? {
        let version: i32 = conn.query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_version",
            [],
            |row| row.get(0),
        )?;
        if version > 0 {
            return Ok(version);
        }
    }

    if table_exists(conn, "transactions")? {
        return Ok(1);
    }
    Ok(0)
}

fn set_schema_version(conn: &Connection, version: i32) -> Result<(), StorageError> {
    conn.execute(
        "INSERT INTO schema_version (version) VALUES (?1)",
        [version],
    )?;
    Ok(())
}

/// Run migrations from `from_version` up to `CURRENT_VERSION`.
pub fn migrate(conn: &mut Connection, from_version: i32) -> Result<(), StorageError> {
    if from_version > CURRENT_VERSION {
        return Err(StorageError::UnsupportedVersion {
            found: from_version,
            supported: CURRENT_VERSION,
        });
    }

    let mut version = from_version;
    while version < CURRENT_VERSION {
        info!(from = version, to = version + 1, "migrating catalog schema");
        let failed = |e: rusqlite::Error| StorageError::MigrationFailed {
            from: version,
            reason: e.to_string(),
        };

        let tx = conn.transaction().map_err(failed)?;
        apply_step(&tx, version).map_err(failed)?;
        tx.commit().map_err(failed)?;
        version += 1;
    }

    Ok(())
}

fn apply_step(tx: &Transaction, version: i32) -> rusqlite::Result<()> {
    match version {
        1 => migrate_v1_to_v2(tx)?,
        _ => tx.execute_batch(SCHEMA_SQL)?,
    }
    tx.execute(
        "INSERT INTO schema_version (version) VALUES (?1)",
        [version + 1],
    )?;
    Ok(())
}

/// Split the inline favorite flag into its own table and backfill the
/// mandatory columns. Does nothing once the legacy table is gone.
/// v1 rows that can be carried over; the v1 key column accepts NULL.
const VALID_LEGACY_CODE: &str = "tcode IS NOT NULL AND TRIM(tcode) <> ''";

pub fn migrate_v1_to_v2(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA_SQL)?;

    if !table_exists(conn, "transactions")? {
        return Ok(());
    }

    let columns = table_columns(conn, "transactions")?;
    let default_tags = encode_tags(&BTreeSet::from([DEFAULT_CUSTOM_TAG.to_string()]));

    let title_expr = if columns.contains("title") {
        "COALESCE(title, '')"
    } else {
        "''"
    };
    let description_expr = if columns.contains("description") {
        "COALESCE(description, '')"
    } else {
        "''"
    };
    let tags_expr = if columns.contains("tags") {
        "COALESCE(NULLIF(tags, ''), ?1)"
    } else {
        "?1"
    };

    let skipped: i64 = conn.query_row(
        &format!("SELECT COUNT(*) FROM transactions WHERE NOT ({VALID_LEGACY_CODE})"),
        [],
        |r| r.get(0),
    )?;
    if skipped > 0 {
        warn!(skipped, "legacy rows without a transaction code were not migrated");
    }

    conn.execute(
        &format!(
            "INSERT OR IGNORE INTO entries (code, title, description, tags)
             SELECT TRIM(tcode), {title_expr}, {description_expr}, {tags_expr} FROM transactions
             WHERE {VALID_LEGACY_CODE}"
        ),
        [&default_tags],
    )?;

    if columns.contains("favorite") {
        conn.execute(
            &format!(
                "INSERT OR IGNORE INTO favorites (code)
                 SELECT TRIM(tcode) FROM transactions WHERE favorite = 1 AND {VALID_LEGACY_CODE}"
            ),
            [],
        )?;
    }

    conn.execute_batch("DROP TABLE transactions;")?;
    Ok(())
}

fn table_exists(conn: &Connection, name: &str) -> rusqlite::Result<bool> {
    conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name=?1)",
        [name],
        |row| row.get(0),
    )
}

fn table_columns(conn: &Connection, table: &str) -> rusqlite::Result<BTreeSet<String>> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table})"))?;
    let names = stmt
        .query_map([], |row| row.get::<_, String>(1))?
        .collect::<rusqlite::Result<BTreeSet<String>>>()?;
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v1_connection() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(V1_SCHEMA_SQL).unwrap();
        conn.execute(
            "INSERT INTO transactions (tcode, description, favorite) VALUES ('ZABC', 'legacy', 1)",
            [],
        )
        .unwrap();
        conn.execute(
            "INSERT INTO transactions (tcode, description, favorite) VALUES ('ZDEF', NULL, 0)",
            [],
        )
        .unwrap();
        conn
    }

    fn entry_rows(conn: &Connection) -> Vec<(String, String, String, String)> {
        let mut stmt = conn
            .prepare("SELECT code, title, description, tags FROM entries ORDER BY code")
            .unwrap();
        stmt.query_map([], |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?, r.get(3)?)))
            .unwrap()
            .collect::<rusqlite::Result<Vec<_>>>()
            .unwrap()
    }

    fn favorite_rows(conn: &Connection) -> Vec<String> {
        let mut stmt = conn
            .prepare("SELECT code FROM favorites ORDER BY code")
            .unwrap();
        stmt.query_map([], |r| r.get(0))
            .unwrap()
            .collect::<rusqlite::Result<Vec<_>>>()
            .unwrap()
    }

    #[test]
    fn fresh_database_is_current_version() {
        let conn = open_memory().unwrap();
        assert_eq!(get_schema_version(&conn).unwrap(), CURRENT_VERSION);
    }

    #[test]
    fn schema_is_idempotent() {
        let conn = open_memory().unwrap();
        create_schema(&conn).unwrap();
        let rows: i32 = conn
            .query_row("SELECT COUNT(*) FROM schema_version", [], |r| r.get(0))
            .unwrap();
        assert_eq!(rows, 1);
    }

    #[test]
    fn detects_legacy_store_as_version_one() {
        let conn = v1_connection();
        assert_eq!(get_schema_version(&conn).unwrap(), 1);
    }

    #[test]
    fn migrates_inline_favorite_and_backfills_columns() {
        let mut conn = v1_connection();
        prepare(&mut conn).unwrap();

        assert_eq!(get_schema_version(&conn).unwrap(), 2);
        let rows = entry_rows(&conn);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].0, "ZABC");
        assert_eq!(rows[0].1, "");
        assert_eq!(rows[0].2, "legacy");
        assert_eq!(rows[0].3, r#"["CUSTOM"]"#);
        assert_eq!(rows[1].2, "");
        assert_eq!(favorite_rows(&conn), vec!["ZABC"]);
        assert!(!table_exists(&conn, "transactions").unwrap());
    }

    #[test]
    fn rows_without_code_are_skipped() {
        let mut conn = v1_connection();
        conn.execute(
            "INSERT INTO transactions (tcode, description, favorite) VALUES (NULL, 'bad', 1)",
            [],
        )
        .unwrap();
        conn.execute(
            "INSERT INTO transactions (tcode, description, favorite) VALUES ('  ', 'blank', 0)",
            [],
        )
        .unwrap();
        prepare(&mut conn).unwrap();

        let codes: Vec<String> = entry_rows(&conn).into_iter().map(|r| r.0).collect();
        assert_eq!(codes, vec!["ZABC", "ZDEF"]);
        assert_eq!(favorite_rows(&conn), vec!["ZABC"]);
    }

    #[test]
    fn empty_code_is_rejected_by_schema() {
        let conn = open_memory().unwrap();
        assert!(conn
            .execute("INSERT INTO entries (code, tags) VALUES ('', '[]')", [])
            .is_err());
        assert!(conn
            .execute("INSERT INTO favorites (code) VALUES (NULL)", [])
            .is_err());
    }

    #[test]
    fn rerunning_the_step_changes_nothing() {
        let mut conn = v1_connection();
        prepare(&mut conn).unwrap();
        let entries = entry_rows(&conn);
        let favorites = favorite_rows(&conn);

        migrate_v1_to_v2(&conn).unwrap();
        prepare(&mut conn).unwrap();

        assert_eq!(entry_rows(&conn), entries);
        assert_eq!(favorite_rows(&conn), favorites);
        assert_eq!(get_schema_version(&conn).unwrap(), 2);
    }

    #[test]
    fn legacy_title_and_tags_columns_are_kept() {
        let mut conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE transactions (tcode TEXT PRIMARY KEY, title TEXT, description TEXT, tags TEXT, favorite INTEGER);
             INSERT INTO transactions VALUES ('ZT', 'Titled', 'd', 'ABAP', 0);
             INSERT INTO transactions VALUES ('ZU', NULL, 'd', '', 1);",
        )
        .unwrap();
        prepare(&mut conn).unwrap();

        let rows = entry_rows(&conn);
        assert_eq!(
            rows[0],
            (
                "ZT".to_string(),
                "Titled".to_string(),
                "d".to_string(),
                "ABAP".to_string()
            )
        );
        assert_eq!(rows[1].1, "");
        assert_eq!(rows[1].3, r#"["CUSTOM"]"#);
        assert_eq!(favorite_rows(&conn), vec!["ZU"]);
    }

    #[test]
    fn newer_store_is_rejected() {
        let mut conn = open_memory().unwrap();
        conn.execute("INSERT INTO schema_version (version) VALUES (99)", [])
            .unwrap();
        let err = prepare(&mut conn).unwrap_err();
        assert!(matches!(
            err,
            StorageError::UnsupportedVersion { found: 99, .. }
        ));
    }
}
