//! gymwatch - local workout logging library
//!
//! This library provides the core of the gymwatch CLI: a single-blob
//! exercise store and the collection manager with optimistic-mutation
//! semantics that every command goes through.
//!
//! # Architecture
//!
//! - `model`: exercises, sessions, sets, and the difficulty scale
//! - `store`: the `CollectionStore` seam and the sled-backed blob store
//! - `manager`: in-memory collection view with optimistic mutations
//! - `draft`: the in-memory session draft (never persisted)
//! - `config`: configuration management and validation
//! - `error`: error types and result aliases
//! - `cli`: command-line interface definition
//!
//! # Example
//!
//! ```no_run
//! use gymwatch::manager::ExerciseManager;
//! use gymwatch::store::SledStore;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let store = Arc::new(SledStore::new()?);
//!     let mut manager = ExerciseManager::new(store);
//!     manager.initialize().await;
//!
//!     let exercise = manager.create_exercise("Bench Press").await?;
//!     println!("created {}", exercise.id);
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod commands;
pub mod config;
pub mod draft;
pub mod error;
pub mod manager;
pub mod model;
pub mod store;

// Re-export commonly used types
pub use config::Config;
pub use draft::SessionDraft;
pub use error::{GymwatchError, Result};
pub use manager::ExerciseManager;
pub use model::{Collection, Difficulty, Exercise, Session, SetItem};
pub use store::{CollectionStore, SledStore};
