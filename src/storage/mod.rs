//! Read-only access to the external record store.
//!
//! The store is a directory of JSONL files:
//! - `parts/<category>.jsonl`: one part record per line
//! - `matches.jsonl`: one match record per line

mod jsonl;

pub use jsonl::{JsonlReader, JsonlStore};

use std::path::PathBuf;
use thiserror::Error;

use crate::models::PartCategory;

/// Errors that can occur while reading the store.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    #[error("Source unavailable: {0}")]
    Unavailable(String),
}

/// Configuration for store paths.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
}

impl StorageConfig {
    pub fn new(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }

    pub fn parts_dir(&self) -> PathBuf {
        self.data_dir.join("parts")
    }

    pub fn parts_file(&self, category: PartCategory) -> PathBuf {
        self.parts_dir().join(format!("{}.jsonl", category.key()))
    }

    pub fn matches_file(&self) -> PathBuf {
        self.data_dir.join("matches.jsonl")
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self::new(PathBuf::from("./data"))
    }
}
