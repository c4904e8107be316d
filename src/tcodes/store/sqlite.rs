use super::schema;
use super::{EntryStore, FavoriteStore, OverlayStore};
use crate::error::{EntryError, Result, StorageError};
use crate::model::{CatalogEntry, EntryUpdate, NewEntry};
use crate::tags::{decode_tags, encode_tags};
use rusqlite::{params, Connection, ErrorCode};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::debug;

enum Location {
    File(PathBuf),
    Memory,
}

/// Production storage backed by a single SQLite file.
///
/// Nothing touches the disk until [`OverlayStore::open`] is called.
pub struct SqliteStore {
    location: Location,
    conn: Option<Connection>,
}

impl SqliteStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            location: Location::File(path.into()),
            conn: None,
        }
    }

    pub fn in_memory() -> Self {
        Self {
            location: Location::Memory,
            conn: None,
        }
    }

    pub fn path(&self) -> Option<&Path> {
        match &self.location {
            Location::File(path) => Some(path),
            Location::Memory => None,
        }
    }

    fn conn(&self) -> Result<&Connection> {
        self.conn
            .as_ref()
            .ok_or_else(|| StorageError::Unavailable("store has not been opened".into()).into())
    }

    fn conn_mut(&mut self) -> Result<&mut Connection> {
        self.conn
            .as_mut()
            .ok_or_else(|| StorageError::Unavailable("store has not been opened".into()).into())
    }
}

fn insert_entry(conn: &Connection, entry: &NewEntry) -> Result<()> {
    let result = conn.execute(
        "INSERT INTO entries (code, title, description, tags) VALUES (?1, ?2, ?3, ?4)",
        params![
            entry.code,
            entry.title,
            entry.description,
            encode_tags(&entry.tags)
        ],
    );
    match result {
        Ok(_) => Ok(()),
        Err(rusqlite::Error::SqliteFailure(e, _)) if e.code == ErrorCode::ConstraintViolation => {
            Err(EntryError::DuplicateCode(entry.code.clone()).into())
        }
        Err(e) => Err(e.into()),
    }
}

impl EntryStore for SqliteStore {
    fn add_entry(&mut self, entry: &NewEntry) -> Result<()> {
        insert_entry(self.conn()?, entry)?;
        debug!(code = %entry.code, "stored custom entry");
        Ok(())
    }

    fn update_entry(&mut self, code: &str, update: &EntryUpdate) -> Result<()> {
        let tags = update.tags.as_ref().map(encode_tags);
        let changed = self.conn()?.execute(
            "UPDATE entries
             SET title = ?2, description = ?3, tags = COALESCE(?4, tags), updated_at = datetime('now')
             WHERE code = ?1",
            params![code, update.title, update.description, tags],
        )?;
        if changed == 0 {
            return Err(EntryError::NotFound(code.to_string()).into());
        }
        debug!(code, "updated custom entry");
        Ok(())
    }

    fn delete_entry(&mut self, code: &str) -> Result<bool> {
        let tx = self.conn_mut()?.transaction()?;
        let removed = tx.execute("DELETE FROM entries WHERE code = ?1", [code])? > 0;
        if removed {
            tx.execute("DELETE FROM favorites WHERE code = ?1", [code])?;
        }
        tx.commit()?;
        debug!(code, removed, "deleted custom entry");
        Ok(removed)
    }

    fn clear_entries(&mut self) -> Result<()> {
        self.conn()?.execute("DELETE FROM entries", [])?;
        Ok(())
    }

    fn list_entries(&self) -> Result<Vec<CatalogEntry>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare("SELECT code, title, description, tags FROM entries")?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, Option<String>>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
            ))
        })?;

        let mut entries = Vec::new();
        for row in rows {
            let (code, title, description, tags) = row?;
            let code = code.ok_or_else(|| StorageError::Corrupt {
                code: String::new(),
                reason: "missing transaction code".to_string(),
            })?;
            let tags = stored_tags(&code, &tags)?;
            entries.push(CatalogEntry::custom(code, title, description, tags));
        }
        Ok(entries)
    }
}

impl FavoriteStore for SqliteStore {
    fn add_favorite(&mut self, code: &str) -> Result<()> {
        self.conn()?
            .execute("INSERT OR IGNORE INTO favorites (code) VALUES (?1)", [code])?;
        Ok(())
    }

    fn remove_favorite(&mut self, code: &str) -> Result<()> {
        self.conn()?
            .execute("DELETE FROM favorites WHERE code = ?1", [code])?;
        Ok(())
    }

    fn list_favorites(&self) -> Result<BTreeSet<String>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare("SELECT code FROM favorites")?;
        let codes = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<rusqlite::Result<BTreeSet<String>>>()?;
        Ok(codes)
    }

    fn clear_favorites(&mut self) -> Result<()> {
        self.conn()?.execute("DELETE FROM favorites", [])?;
        Ok(())
    }
}

impl OverlayStore for SqliteStore {
    fn open(&mut self) -> Result<()> {
        if self.conn.is_some() {
            return Ok(());
        }
        let conn = match &self.location {
            Location::File(path) => schema::open_database(path)?,
            Location::Memory => schema::open_memory()?,
        };
        self.conn = Some(conn);
        Ok(())
    }

    fn replace_overlay(
        &mut self,
        entries: Option<&[NewEntry]>,
        favorites: Option<&BTreeSet<String>>,
    ) -> Result<()> {
        let tx = self.conn_mut()?.transaction()?;

        if let Some(entries) = entries {
            tx.execute("DELETE FROM entries", [])?;
            for entry in entries {
                insert_entry(&tx, entry)?;
            }
        }

        if let Some(favorites) = favorites {
            tx.execute("DELETE FROM favorites", [])?;
            for code in favorites {
                tx.execute("INSERT OR IGNORE INTO favorites (code) VALUES (?1)", [code])?;
            }
        }

        tx.commit()?;
        debug!(
            entries = entries.map(|e| e.len()),
            favorites = favorites.map(|f| f.len()),
            "replaced overlay"
        );
        Ok(())
    }
}

/// Tags column of a stored entry. A JSON array that does not parse means
/// the row was written by something other than this store.
fn stored_tags(code: &str, raw: &str) -> std::result::Result<BTreeSet<String>, StorageError> {
    if raw.trim_start().starts_with('[')
        && serde_json::from_str::<Vec<String>>(raw.trim()).is_err()
    {
        return Err(StorageError::Corrupt {
            code: code.to_string(),
            reason: format!("undecodable tags {}", raw),
        });
    }
    Ok(decode_tags(raw))
}
