use crate::error::{Result, VoicelibError};
use std::fs;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

/// Shared assets that live beside model directories and are never models
pub const RESERVED_FILES: &[&str] = &["hubert_base.pt", "MODELS.txt", "public_models.json", "rmvpe.pt"];

/// The directory holding every installed model
#[derive(Debug, Clone)]
pub struct ModelsRoot {
    path: PathBuf,
    reserved: Vec<String>,
}

impl ModelsRoot {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            reserved: RESERVED_FILES.iter().map(|s| (*s).to_string()).collect(),
        }
    }

    /// Replace the reserved filename list
    #[must_use]
    pub fn with_reserved(mut self, reserved: Vec<String>) -> Self {
        self.reserved = reserved;
        self
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn is_reserved(&self, name: &str) -> bool {
        self.reserved.iter().any(|r| r == name)
    }

    /// Resolve a model name to its directory, rejecting unsafe or reserved names
    pub fn model_dir(&self, name: &str) -> Result<PathBuf> {
        if name.is_empty() {
            return Err(VoicelibError::invalid("Model name missing!"));
        }
        if !is_single_component(name) {
            return Err(VoicelibError::InvalidInput(format!(
                "Invalid model name \"{name}\": names cannot contain path separators or be '.' or '..'"
            )));
        }
        if self.is_reserved(name) {
            return Err(VoicelibError::NameConflict(name.to_string()));
        }
        Ok(self.path.join(name))
    }

    /// Resolve a model name and fail if anything already occupies it
    pub fn ensure_available(&self, name: &str) -> Result<PathBuf> {
        let dir = self.model_dir(name)?;
        if dir.exists() {
            return Err(VoicelibError::NameConflict(name.to_string()));
        }
        Ok(dir)
    }
}

/// True when `name` is exactly one normal path component
#[must_use]
pub fn is_single_component(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(c)), None) if c == name
    ) && !name.contains(['/', '\\'])
}

/// Create `dir` and fail with a name conflict if it is already there.
///
/// The parent is created on demand; `dir` itself is created exclusively so two
/// callers racing for the same name cannot both succeed.
pub fn create_dir_exclusive(dir: &Path) -> Result<()> {
    if let Some(parent) = dir.parent() {
        fs::create_dir_all(parent)?;
    }

    fs::create_dir(dir).map_err(|e| {
        if e.kind() == ErrorKind::AlreadyExists {
            let name = dir
                .file_name()
                .map_or_else(|| dir.display().to_string(), |n| n.to_string_lossy().into_owned());
            VoicelibError::NameConflict(name)
        } else {
            VoicelibError::Io(e)
        }
    })
}

/// Local archive filename for a download URL: last path segment, query stripped
pub fn archive_name_from_url(url: &str) -> Result<String> {
    let last = url.rsplit('/').next().unwrap_or_default();
    let name = last.split(['?', '#']).next().unwrap_or_default();

    if name.is_empty() || !is_single_component(name) {
        return Err(VoicelibError::InvalidInput(format!(
            "Could not derive a file name from download link: {url}"
        )));
    }

    Ok(name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_archive_name_from_url() {
        assert_eq!(
            archive_name_from_url("https://example.com/files/alto.zip").unwrap(),
            "alto.zip"
        );
        assert_eq!(
            archive_name_from_url("https://example.com/alto.zip?download=true").unwrap(),
            "alto.zip"
        );
        assert_eq!(
            archive_name_from_url("https://pixeldrain.com/u/aBc123").unwrap(),
            "aBc123"
        );
    }

    #[test]
    fn test_archive_name_rejects_empty_segment() {
        assert!(archive_name_from_url("https://example.com/").is_err());
        assert!(archive_name_from_url("https://example.com/..").is_err());
        assert!(archive_name_from_url("").is_err());
    }

    #[test]
    fn test_is_single_component() {
        assert!(is_single_component("alto"));
        assert!(is_single_component("alto v2"));
        assert!(!is_single_component(""));
        assert!(!is_single_component("."));
        assert!(!is_single_component(".."));
        assert!(!is_single_component("a/b"));
        assert!(!is_single_component("../escape"));
        assert!(!is_single_component("/abs"));
        assert!(!is_single_component("a\\b"));
    }

    #[test]
    fn test_model_dir_validation() {
        let root = ModelsRoot::new("/models");

        assert_eq!(root.model_dir("alto").unwrap(), PathBuf::from("/models/alto"));
        assert!(matches!(
            root.model_dir(""),
            Err(VoicelibError::InvalidInput(_))
        ));
        assert!(matches!(
            root.model_dir("../etc"),
            Err(VoicelibError::InvalidInput(_))
        ));
        assert!(matches!(
            root.model_dir("rmvpe.pt"),
            Err(VoicelibError::NameConflict(_))
        ));
    }

    #[test]
    fn test_custom_reserved_list() {
        let root = ModelsRoot::new("/models").with_reserved(vec!["base.pt".to_string()]);
        assert!(root.is_reserved("base.pt"));
        assert!(!root.is_reserved("rmvpe.pt"));
    }

    #[test]
    fn test_ensure_available() {
        let temp_dir = TempDir::new().unwrap();
        let root = ModelsRoot::new(temp_dir.path());

        fs::create_dir(temp_dir.path().join("taken")).unwrap();

        assert!(root.ensure_available("free").is_ok());
        assert!(matches!(
            root.ensure_available("taken"),
            Err(VoicelibError::NameConflict(name)) if name == "taken"
        ));
    }

    #[test]
    fn test_create_dir_exclusive() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("nested/root/alto");

        create_dir_exclusive(&dir).unwrap();
        assert!(dir.is_dir());

        let err = create_dir_exclusive(&dir).unwrap_err();
        assert!(matches!(err, VoicelibError::NameConflict(name) if name == "alto"));
    }
}
