//! Category word lists
//!
//! Categories arrive as JSON keyed by category id:
//! `{ "kids": { "name": "Kids", "words": ["Dinosaur", ...] }, ... }`.
//! The core never mutates them.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{CatalogError, RoundError};

/// An immutable prompt list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub key: String,
    pub display_name: String,
    pub prompts: Vec<String>,
}

impl Category {
    pub fn new(key: impl Into<String>, display_name: impl Into<String>, prompts: Vec<String>) -> Self {
        Self {
            key: key.into(),
            display_name: display_name.into(),
            prompts,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.prompts.is_empty()
    }
}

/// Wire shape of one catalog entry
#[derive(Debug, Deserialize)]
struct CategoryRecord {
    #[serde(default)]
    name: Option<String>,
    #[serde(default, alias = "prompts")]
    words: Vec<String>,
}

/// Home-screen listing entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogEntry {
    pub key: String,
    pub display_name: String,
    pub prompt_count: usize,
}

/// All available categories, ordered by key
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    categories: BTreeMap<String, Category>,
}

impl Catalog {
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let records: BTreeMap<String, CategoryRecord> = serde_json::from_str(json)?;
        let categories = records
            .into_iter()
            .map(|(key, record)| {
                // Fall back to the key when no display name is given
                let display_name = record.name.unwrap_or_else(|| key.clone());
                let category = Category::new(key.clone(), display_name, record.words);
                (key, category)
            })
            .collect();
        Ok(Self { categories })
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn get(&self, key: &str) -> Result<&Category, RoundError> {
        self.categories
            .get(key)
            .ok_or_else(|| RoundError::UnknownCategory { key: key.to_string() })
    }

    pub fn entries(&self) -> Vec<CatalogEntry> {
        self.categories
            .values()
            .map(|c| CatalogEntry {
                key: c.key.clone(),
                display_name: c.display_name.clone(),
                prompt_count: c.prompts.len(),
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}
