//! Durable storage of the exercise collection
//!
//! The entire collection is one serialized JSON value under one fixed
//! key in an embedded `sled` database. There is no partial read or
//! write: every load returns the whole collection and every save
//! replaces it. No locking, no versioning, no migration support.

use crate::error::{GymwatchError, Result};
use crate::model::{Collection, Exercise};
use anyhow::Context;
use async_trait::async_trait;
use directories::ProjectDirs;
use sled::Db;
use std::path::PathBuf;
use tracing::warn;

/// Fixed key the collection blob lives under
const COLLECTION_KEY: &str = "gymwatch:exercises";

/// Persistence seam for the exercise collection
///
/// The manager only talks to the store through this trait, so tests
/// can drive the rollback paths with a failing double.
#[async_trait]
pub trait CollectionStore: Send + Sync {
    /// Read the persisted collection
    ///
    /// Fails soft: a missing or unparsable blob yields an empty
    /// collection (logged as a warning), never an error. A corrupt
    /// store is indistinguishable from "no data yet".
    async fn load_all(&self) -> Collection;

    /// Serialize and write the entire collection, replacing any prior
    /// value
    ///
    /// # Errors
    ///
    /// Returns `GymwatchError::Storage` if serialization, the write,
    /// or the flush fails. No partial write is left behind.
    async fn save_all(&self, items: &[Exercise]) -> Result<()>;
}

/// Sled-backed collection store
pub struct SledStore {
    db: Db,
}

impl SledStore {
    /// Open the store at the default location
    ///
    /// Honors a `GYMWATCH_DB` environment variable override, otherwise
    /// uses the platform data directory. The override makes it easy to
    /// point the binary at a test database without touching the user's
    /// data.
    ///
    /// # Errors
    ///
    /// Returns `GymwatchError::Storage` if the data directory cannot
    /// be determined or the database cannot be opened.
    pub fn new() -> Result<Self> {
        if let Ok(override_path) = std::env::var("GYMWATCH_DB") {
            return Self::open_at(override_path);
        }

        let proj_dirs = ProjectDirs::from("com", "gymwatch", "gymwatch")
            .ok_or_else(|| GymwatchError::Storage("Could not determine data directory".into()))?;

        let data_dir = proj_dirs.data_dir();
        std::fs::create_dir_all(data_dir)
            .context("Failed to create data directory")
            .map_err(|e| GymwatchError::Storage(e.to_string()))?;

        Self::open_at(data_dir.join("exercises.db"))
    }

    /// Open the store at the specified path
    ///
    /// Primarily useful for tests where the default application data
    /// directory is not desirable (for example, a temporary directory).
    ///
    /// # Errors
    ///
    /// Returns `GymwatchError::Storage` if the database cannot be opened.
    pub fn open_at<P: Into<PathBuf>>(path: P) -> Result<Self> {
        let path = path.into();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .context("Failed to create parent directory for database")
                .map_err(|e| GymwatchError::Storage(e.to_string()))?;
        }

        let db = sled::open(&path)
            .map_err(|e| GymwatchError::Storage(format!("Failed to open database: {}", e)))?;
        Ok(Self { db })
    }
}

#[async_trait]
impl CollectionStore for SledStore {
    async fn load_all(&self) -> Collection {
        let bytes = match self.db.get(COLLECTION_KEY) {
            Ok(Some(bytes)) => bytes,
            Ok(None) => return Collection::new(),
            Err(e) => {
                warn!("Failed to read exercise collection, treating as empty: {}", e);
                return Collection::new();
            }
        };

        match serde_json::from_slice(&bytes) {
            Ok(collection) => collection,
            Err(e) => {
                warn!(
                    "Stored exercise collection is unparsable, treating as empty: {}",
                    e
                );
                Collection::new()
            }
        }
    }

    async fn save_all(&self, items: &[Exercise]) -> Result<()> {
        let value = serde_json::to_vec(items)
            .map_err(|e| GymwatchError::Storage(format!("Serialization failed: {}", e)))?;

        self.db
            .insert(COLLECTION_KEY, value)
            .map_err(|e| GymwatchError::Storage(format!("Insert failed: {}", e)))?;

        self.db
            .flush_async()
            .await
            .map_err(|e| GymwatchError::Storage(format!("Flush failed: {}", e)))?;

        Ok(())
    }
}
