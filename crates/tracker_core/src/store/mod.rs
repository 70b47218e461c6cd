//! Durable local key-value store backed by redb.
//!
//! Each logical table is one JSON document stored under a fixed key. Writes
//! overwrite the whole document; callers read-modify-write. There are no
//! transactions spanning two tables.

/// Table definitions and record envelopes.
pub mod tables;

use crate::constants::SEED_PROJECT_ID;
use crate::error::AppError;
use crate::models::project::seed_projects;
use crate::models::{Creative, EditMap, ProjectMap, StatusMap};
use redb::{ReadableDatabase, ReadableTable};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;

pub use tables::StoreKey;
use tables::{decode_envelope, encode_envelope, ENTRIES, REDB_FILE_NAME};

/// Handle to the local store.
#[derive(Clone)]
pub struct LocalStore {
    db: Arc<redb::Database>,
}

impl LocalStore {
    /// Open (or create) the store inside `path`.
    ///
    /// # Returns
    /// A store with its entry table initialized.
    ///
    /// # Errors
    /// Returns an error if the directory cannot be created or redb cannot
    /// open the database file.
    pub fn open(path: &str) -> Result<Self, AppError> {
        let dir = Path::new(path);
        std::fs::create_dir_all(dir).map_err(|err| {
            AppError::Storage(format!(
                "Failed to create store directory '{}': {}",
                dir.display(),
                err
            ))
        })?;

        let db = redb::Database::create(dir.join(REDB_FILE_NAME))?;
        Self::from_shared(Arc::new(db))
    }

    /// Wrap an already open redb database.
    ///
    /// # Errors
    /// Returns an error when the entry table cannot be initialized.
    pub fn from_shared(db: Arc<redb::Database>) -> Result<Self, AppError> {
        let write_txn = db.begin_write()?;
        write_txn.open_table(ENTRIES)?;
        write_txn.commit()?;
        Ok(Self { db })
    }

    fn read_raw(&self, key: StoreKey) -> Result<Option<String>, AppError> {
        let read_txn = self.db.begin_read()?;
        let entries = read_txn.open_table(ENTRIES)?;
        Ok(entries.get(key.as_str())?.map(|value| value.value().to_string()))
    }

    fn write_raw(&self, key: StoreKey, value: &str) -> Result<(), AppError> {
        let write_txn = self.db.begin_write()?;
        {
            let mut entries = write_txn.open_table(ENTRIES)?;
            entries.insert(key.as_str(), value)?;
        }
        write_txn.commit()?;
        Ok(())
    }

    fn read_table<T: DeserializeOwned>(&self, key: StoreKey) -> Result<Option<T>, AppError> {
        self.read_raw(key)?
            .map(|raw| decode_envelope(key, &raw))
            .transpose()
    }

    /// Read a table, returning its empty identity when never written.
    pub fn get<T: DeserializeOwned + Default>(&self, key: StoreKey) -> Result<T, AppError> {
        Ok(self.read_table(key)?.unwrap_or_default())
    }

    /// Overwrite a table with `value`.
    pub fn set<T: Serialize + ?Sized>(&self, key: StoreKey, value: &T) -> Result<(), AppError> {
        let encoded = encode_envelope(value)?;
        self.write_raw(key, &encoded)
    }

    pub fn status(&self) -> Result<StatusMap, AppError> {
        self.get(StoreKey::Status)
    }

    pub fn save_status(&self, status: &StatusMap) -> Result<(), AppError> {
        self.set(StoreKey::Status, status)
    }

    pub fn edits(&self) -> Result<EditMap, AppError> {
        self.get(StoreKey::Edits)
    }

    pub fn save_edits(&self, edits: &EditMap) -> Result<(), AppError> {
        self.set(StoreKey::Edits, edits)
    }

    pub fn custom_items(&self) -> Result<Vec<Creative>, AppError> {
        self.get(StoreKey::Custom)
    }

    pub fn save_custom_items(&self, items: &[Creative]) -> Result<(), AppError> {
        self.set(StoreKey::Custom, items)
    }

    /// Project registry; the seed project is reported until the first write.
    pub fn projects(&self) -> Result<ProjectMap, AppError> {
        Ok(self
            .read_table(StoreKey::Projects)?
            .unwrap_or_else(seed_projects))
    }

    pub fn save_projects(&self, projects: &ProjectMap) -> Result<(), AppError> {
        self.set(StoreKey::Projects, projects)
    }

    /// Id of the active project, defaulting to the seed project.
    pub fn current_project_id(&self) -> Result<String, AppError> {
        Ok(self
            .read_raw(StoreKey::CurrentProject)?
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| SEED_PROJECT_ID.to_string()))
    }

    pub fn set_current_project(&self, id: &str) -> Result<(), AppError> {
        self.write_raw(StoreKey::CurrentProject, id)
    }
}
