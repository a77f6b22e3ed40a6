//! Part dictionary.
//!
//! Static lookup tables per part category. Candidates are kept sorted by
//! descending length so affix matching tries `Gear Point` before `Point`.

use std::collections::HashMap;

use tracing::debug;

use crate::models::{PartCategory, PartRecord};
use crate::storage::StorageError;

/// Read-only source of part reference data.
pub trait PartSource {
    /// All parts of one category.
    fn fetch_parts(&self, category: PartCategory) -> Result<Vec<PartRecord>, StorageError>;
}

/// Parts of every category, in longest-match-first order.
#[derive(Debug, Clone, Default)]
pub struct PartDictionary {
    by_name: HashMap<PartCategory, Vec<PartRecord>>,
    by_shortcut: HashMap<PartCategory, Vec<PartRecord>>,
}

impl PartDictionary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a dictionary from a flat list of parts.
    pub fn from_parts(parts: impl IntoIterator<Item = PartRecord>) -> Self {
        let mut dictionary = Self::new();
        for part in parts {
            dictionary.by_name.entry(part.category()).or_default().push(part);
        }
        dictionary.reindex();
        dictionary
    }

    /// Load every category from a source.
    pub fn load(source: &dyn PartSource) -> Result<Self, StorageError> {
        let mut dictionary = Self::new();
        for category in PartCategory::ALL {
            let parts = source.fetch_parts(category)?;
            debug!("Loaded {} {} parts", parts.len(), category);
            dictionary.by_name.insert(category, parts);
        }
        dictionary.reindex();
        Ok(dictionary)
    }

    fn reindex(&mut self) {
        self.by_shortcut.clear();
        for (category, parts) in self.by_name.iter_mut() {
            // Stable: equal-length names keep store order.
            parts.sort_by(|a, b| b.name().len().cmp(&a.name().len()));

            let mut with_shortcut: Vec<PartRecord> = parts
                .iter()
                .filter(|p| p.shortcut().is_some_and(|s| !s.is_empty()))
                .cloned()
                .collect();
            with_shortcut.sort_by_key(|p| std::cmp::Reverse(p.shortcut().map_or(0, str::len)));
            self.by_shortcut.insert(*category, with_shortcut);
        }
    }

    /// Parts of a category, longest name first.
    pub fn candidates(&self, category: PartCategory) -> &[PartRecord] {
        self.by_name.get(&category).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Parts of a category that carry a shortcut, longest shortcut first.
    pub fn shortcut_candidates(&self, category: PartCategory) -> &[PartRecord] {
        self.by_shortcut
            .get(&category)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Exact lookup by canonical name.
    pub fn get(&self, category: PartCategory, name: &str) -> Option<&PartRecord> {
        self.candidates(category).iter().find(|p| p.name() == name)
    }

    pub fn len(&self) -> usize {
        self.by_name.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
