//! File-role identification for extracted model bundles.
//!
//! Archives carry no manifest, so the files that make up a model are picked out
//! by a [`FileClassifier`]. The default [`SizeHeuristic`] looks only at the file
//! extension and byte size; any other strategy (a closure, a manifest reader)
//! can be swapped in without touching the extraction flow.

use std::path::Path;

/// Role a file plays inside a model directory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileRole {
    /// The large weights file
    Payload,
    /// Optional auxiliary index
    Index,
}

/// Strategy mapping a file's extension and size to its role, if any
pub trait FileClassifier: Send + Sync {
    /// `extension` is given without the leading dot
    fn classify(&self, extension: &str, size_bytes: u64) -> Option<FileRole>;

    /// Short label for files of `role`, used in error messages
    fn describe(&self, role: FileRole) -> String {
        match role {
            FileRole::Payload => "payload".to_string(),
            FileRole::Index => "index".to_string(),
        }
    }
}

impl<F> FileClassifier for F
where
    F: Fn(&str, u64) -> Option<FileRole> + Send + Sync,
{
    fn classify(&self, extension: &str, size_bytes: u64) -> Option<FileRole> {
        self(extension, size_bytes)
    }
}

/// Extension plus strict minimum-size thresholds
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SizeHeuristic {
    payload_extension: String,
    payload_min_bytes: u64,
    index_extension: String,
    index_min_bytes: u64,
}

impl Default for SizeHeuristic {
    fn default() -> Self {
        Self::new("pth", 40 * 1024 * 1024, "index", 100 * 1024)
    }
}

impl SizeHeuristic {
    #[must_use]
    pub fn new(
        payload_extension: &str,
        payload_min_bytes: u64,
        index_extension: &str,
        index_min_bytes: u64,
    ) -> Self {
        Self {
            payload_extension: payload_extension.trim_start_matches('.').to_string(),
            payload_min_bytes,
            index_extension: index_extension.trim_start_matches('.').to_string(),
            index_min_bytes,
        }
    }

    #[must_use]
    pub fn payload_extension(&self) -> &str {
        &self.payload_extension
    }

    #[must_use]
    pub fn index_extension(&self) -> &str {
        &self.index_extension
    }

    /// Role implied by a file name alone, ignoring size
    #[must_use]
    pub fn role_for_name(&self, path: &Path) -> Option<FileRole> {
        let ext = extension_of(path)?;
        if ext == self.payload_extension {
            Some(FileRole::Payload)
        } else if ext == self.index_extension {
            Some(FileRole::Index)
        } else {
            None
        }
    }
}

impl FileClassifier for SizeHeuristic {
    fn classify(&self, extension: &str, size_bytes: u64) -> Option<FileRole> {
        if extension == self.payload_extension && size_bytes > self.payload_min_bytes {
            Some(FileRole::Payload)
        } else if extension == self.index_extension && size_bytes > self.index_min_bytes {
            Some(FileRole::Index)
        } else {
            None
        }
    }

    fn describe(&self, role: FileRole) -> String {
        match role {
            FileRole::Payload => format!(".{}", self.payload_extension),
            FileRole::Index => format!(".{}", self.index_extension),
        }
    }
}

/// Extension of `path` without the dot, or `None` for extensionless names
#[must_use]
pub fn extension_of(path: &Path) -> Option<&str> {
    path.extension().and_then(|e| e.to_str())
}
