use thiserror::Error;

/// Failures of the backing store. Fatal to the operation that hit them.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Schema migration from version {from} failed: {reason}")]
    MigrationFailed { from: i32, reason: String },

    #[error("Store was written by a newer version (schema {found}, supported {supported})")]
    UnsupportedVersion { found: i32, supported: i32 },

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Corrupt record for '{code}': {reason}")]
    Corrupt { code: String, reason: String },
}

/// Recoverable problems with a single entry write.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EntryError {
    #[error("Transaction code {0} already exists")]
    DuplicateCode(String),

    #[error("Transaction code {0} not found")]
    NotFound(String),

    #[error("Transaction code cannot be empty")]
    EmptyCode,

    #[error("Invalid tag '{tag}': {reason}")]
    InvalidTag { tag: String, reason: String },

    #[error("Transaction code {0} belongs to the reference catalog and cannot be modified")]
    ReferenceEntry(String),
}

/// An import document was rejected. Nothing was written.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ImportValidationError {
    #[error("Import document is malformed: {0}")]
    Malformed(String),

    #[error("Invalid settings section: {0}")]
    Settings(String),

    #[error("Invalid custom transaction at position {index}: {reason}")]
    CustomEntry { index: usize, reason: String },

    #[error("Invalid favorite transaction at position {index}: {reason}")]
    Favorite { index: usize, reason: String },

    #[error("Custom transaction {0} collides with a reference transaction")]
    ReferenceCollision(String),

    #[error("Custom transaction {0} appears more than once")]
    DuplicateInImport(String),
}

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Entry(#[from] EntryError),

    #[error(transparent)]
    Import(#[from] ImportValidationError),

    #[error("Catalog is not ready (state: {0})")]
    NotReady(String),

    #[error("Reference dataset error: {0}")]
    Reference(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Api Error: {0}")]
    Api(String),
}

impl From<rusqlite::Error> for CatalogError {
    fn from(err: rusqlite::Error) -> Self {
        CatalogError::Storage(StorageError::Sqlite(err))
    }
}

pub type Result<T> = std::result::Result<T, CatalogError>;
