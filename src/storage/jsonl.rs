//! JSONL (JSON Lines) reading.
//!
//! Each line is a valid JSON object representing one record. Malformed
//! lines are logged and skipped rather than failing the whole file.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::marker::PhantomData;
use std::path::PathBuf;

use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use super::{StorageConfig, StorageError};
use crate::dictionary::PartSource;
use crate::engine::MatchSource;
use crate::models::{MatchRecord, PartCategory, PartRecord, Scope};

/// JSONL file reader.
pub struct JsonlReader<T> {
    path: PathBuf,
    _marker: PhantomData<T>,
}

impl<T: DeserializeOwned> JsonlReader<T> {
    /// Create a new JSONL reader for the given path.
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            _marker: PhantomData,
        }
    }

    /// Check if the file exists.
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Read all records from the file. A missing file reads as empty.
    pub fn read_all(&self) -> Result<Vec<T>, StorageError> {
        if !self.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(&self.path)?;
        let reader = BufReader::new(file);
        let mut records = Vec::new();

        for (idx, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }

            match serde_json::from_str(&line) {
                Ok(record) => records.push(record),
                Err(e) => {
                    warn!("Failed to parse line {} in {:?}: {}", idx + 1, self.path, e);
                }
            }
        }

        debug!("Read {} records from {:?}", records.len(), self.path);
        Ok(records)
    }

    /// Read records matching a predicate.
    pub fn read_where<F>(&self, predicate: F) -> Result<Vec<T>, StorageError>
    where
        F: Fn(&T) -> bool,
    {
        let all = self.read_all()?;
        Ok(all.into_iter().filter(predicate).collect())
    }
}

/// Directory-backed store of parts and matches.
#[derive(Debug, Clone, Default)]
pub struct JsonlStore {
    config: StorageConfig,
}

impl JsonlStore {
    pub fn new(config: StorageConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &StorageConfig {
        &self.config
    }
}

impl PartSource for JsonlStore {
    fn fetch_parts(&self, category: PartCategory) -> Result<Vec<PartRecord>, StorageError> {
        let reader = JsonlReader::<PartRecord>::new(self.config.parts_file(category));
        let parts = reader.read_all()?;
        let (matching, misplaced): (Vec<_>, Vec<_>) =
            parts.into_iter().partition(|p| p.category() == category);
        if !misplaced.is_empty() {
            warn!(
                "Ignoring {} parts of another category in the {} file",
                misplaced.len(),
                category
            );
        }
        Ok(matching)
    }
}

impl MatchSource for JsonlStore {
    fn fetch_matches(&self, scope: &Scope) -> Result<Vec<MatchRecord>, StorageError> {
        let path = self.config.matches_file();
        if !path.exists() {
            return Err(StorageError::PathNotFound(path));
        }
        JsonlReader::<MatchRecord>::new(path).read_where(|m| m.in_scope(scope))
    }
}
