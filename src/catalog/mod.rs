//! Static catalog of publicly available voice models.
//!
//! The catalog is read once by the caller (usually `main`) and handed to
//! [`CatalogFilter`] by reference; nothing here mutates it.
//!
//! # Example
//!
//! ```no_run
//! use voicelib::catalog::{Catalog, CatalogFilter};
//!
//! let catalog = Catalog::load("public_models.json".as_ref()).expect("Failed to load catalog");
//! let filter = CatalogFilter::new(&catalog);
//! let (rows, _tags) = filter.filter_table(&["English".to_string()], "female");
//! for row in rows {
//!     println!("{} - {}", row.0, row.1);
//! }
//! ```

pub mod filter;

pub use filter::{CatalogFilter, CatalogRow};

use crate::error::{Result, VoicelibError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// One downloadable model as described in the catalog
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CatalogEntry {
    pub name: String,
    pub description: String,
    pub tags: Vec<String>,
    pub credit: String,
    pub added: String,
    pub url: String,
}

impl CatalogEntry {
    /// Project into the row shape shown in tables
    #[must_use]
    pub fn as_row(&self) -> CatalogRow<'_> {
        (
            self.name.as_str(),
            self.description.as_str(),
            self.tags.as_slice(),
            self.credit.as_str(),
            self.added.as_str(),
            self.url.as_str(),
        )
    }

    #[must_use]
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}

/// The whole catalog file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Catalog {
    pub voice_models: Vec<CatalogEntry>,
    /// Tag name to description, in file order
    #[serde(default)]
    pub tags: serde_json::Map<String, serde_json::Value>,
}

impl Catalog {
    /// Parse a catalog from JSON text
    pub fn from_json(content: &str) -> Result<Self> {
        serde_json::from_str(content)
            .map_err(|e| VoicelibError::Catalog(format!("Failed to parse catalog: {e}")))
    }

    /// Read and parse a catalog file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            VoicelibError::Catalog(format!("Failed to read {}: {e}", path.display()))
        })?;
        let catalog = Self::from_json(&content)?;

        tracing::debug!(
            "Loaded {} catalog entries and {} tags from {}",
            catalog.voice_models.len(),
            catalog.tags.len(),
            path.display()
        );
        Ok(catalog)
    }

    /// Known tag names in file order
    #[must_use]
    pub fn tag_names(&self) -> Vec<&str> {
        self.tags.keys().map(String::as_str).collect()
    }

    /// Description of a tag, if it has a textual one
    #[must_use]
    pub fn tag_description(&self, tag: &str) -> Option<&str> {
        self.tags.get(tag).and_then(serde_json::Value::as_str)
    }
}
