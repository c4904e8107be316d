use crate::api::CatalogApi;
use crate::error::{CatalogError, Result};
use crate::reference::ReferenceCatalog;
use crate::settings::{SettingsStore, SETTINGS_FILENAME};
use crate::store::sqlite::SqliteStore;
use directories::ProjectDirs;
use std::env;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const HOME_ENV: &str = "TCODES_HOME";
pub const REFERENCE_ENV: &str = "TCODES_REFERENCE";
pub const DATABASE_FILENAME: &str = "catalog.db";

pub struct CatalogContext {
    pub api: CatalogApi<SqliteStore>,
    pub data_dir: PathBuf,
}

/// `TCODES_HOME` wins; otherwise the platform data directory.
pub fn resolve_data_dir() -> Result<PathBuf> {
    if let Some(home) = env::var_os(HOME_ENV).filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(home));
    }
    ProjectDirs::from("com", "tcodes", "tcodes")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .ok_or_else(|| CatalogError::Api("Could not determine data directory".to_string()))
}

/// `TCODES_REFERENCE` points at a replacement dataset; otherwise the bundled one.
pub fn load_reference() -> Result<ReferenceCatalog> {
    match env::var_os(REFERENCE_ENV).filter(|v| !v.is_empty()) {
        Some(path) => ReferenceCatalog::from_path(PathBuf::from(path)),
        None => ReferenceCatalog::bundled(),
    }
}

/// Builds an opened catalog rooted at `data_dir`.
pub fn initialize_at(data_dir: &Path, reference: ReferenceCatalog) -> Result<CatalogContext> {
    let store = SqliteStore::new(data_dir.join(DATABASE_FILENAME));
    let settings = SettingsStore::load(data_dir.join(SETTINGS_FILENAME))?;
    let mut api = CatalogApi::new(reference, store, settings);
    api.open()?;
    debug!(data_dir = %data_dir.display(), "catalog initialized");

    Ok(CatalogContext {
        api,
        data_dir: data_dir.to_path_buf(),
    })
}

pub fn initialize() -> Result<CatalogContext> {
    let data_dir = resolve_data_dir()?;
    initialize_at(&data_dir, load_reference()?)
}
