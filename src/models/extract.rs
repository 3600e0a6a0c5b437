//! Archive extraction into a flat model directory.
//!
//! [`ArchiveExtractor::extract`] is all-or-nothing: the destination directory
//! either ends up holding exactly one payload file (plus at most one index file)
//! with no subdirectories, or it does not exist at all.

use crate::error::{Result, VoicelibError};
use crate::models::classify::{extension_of, FileClassifier, FileRole, SizeHeuristic};
use crate::models::paths::create_dir_exclusive;
use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use walkdir::WalkDir;

/// Final top-level files of a successfully extracted model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedModel {
    pub payload: PathBuf,
    pub index: Option<PathBuf>,
}

/// Unpacks zip archives and normalizes their layout
#[derive(Clone)]
pub struct ArchiveExtractor {
    classifier: Arc<dyn FileClassifier>,
}

impl std::fmt::Debug for ArchiveExtractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArchiveExtractor")
            .field("payload", &self.classifier.describe(FileRole::Payload))
            .field("index", &self.classifier.describe(FileRole::Index))
            .finish()
    }
}

impl Default for ArchiveExtractor {
    fn default() -> Self {
        Self::new(SizeHeuristic::default())
    }
}

impl ArchiveExtractor {
    #[must_use]
    pub fn new(classifier: impl FileClassifier + 'static) -> Self {
        Self {
            classifier: Arc::new(classifier),
        }
    }

    /// Extract `archive` into the new directory `destination`.
    ///
    /// `destination` must not exist yet. On any failure it is removed again
    /// before the error is returned. When `remove_archive` is set the archive
    /// is deleted afterwards whether or not extraction succeeded.
    pub fn extract(
        &self,
        destination: &Path,
        archive: &Path,
        remove_archive: bool,
    ) -> Result<ExtractedModel> {
        let result = create_dir_exclusive(destination).and_then(|()| {
            self.unpack_and_flatten(destination, archive)
                .inspect_err(|_| remove_partial(destination))
        });

        if remove_archive && archive.exists() {
            match fs::remove_file(archive) {
                Ok(()) => tracing::debug!("Removed archive {}", archive.display()),
                Err(e) => tracing::warn!("Failed to remove archive {}: {e}", archive.display()),
            }
        }

        result
    }

    fn unpack_and_flatten(&self, destination: &Path, archive: &Path) -> Result<ExtractedModel> {
        unpack_zip(archive, destination)?;
        tracing::debug!(
            "Unpacked {} into {}",
            archive.display(),
            destination.display()
        );

        let (payload_source, index_source) = self.locate(destination)?;
        let payload_source = payload_source.ok_or_else(|| {
            VoicelibError::Extraction(format!(
                "No {} model file was found in the extracted zip folder.",
                self.classifier.describe(FileRole::Payload)
            ))
        })?;

        let payload = move_to_top_level(&payload_source, destination)?;
        let index = index_source
            .map(|source| move_to_top_level(&source, destination))
            .transpose()?;

        for entry in fs::read_dir(destination)? {
            let entry = entry?;
            let path = entry.path();
            if entry.file_type()?.is_dir() {
                fs::remove_dir_all(&path)?;
            } else if path != payload
                && Some(&path) != index.as_ref()
                && self.role_of(&path)?.is_some()
            {
                // Unselected candidates at the top level would leave two payloads behind
                fs::remove_file(&path)?;
            }
        }

        tracing::info!(
            "Extracted model into {} (payload: {}, index: {})",
            destination.display(),
            file_name_of(&payload),
            index.as_deref().map_or_else(|| "none".to_string(), file_name_of)
        );

        Ok(ExtractedModel { payload, index })
    }

    /// Find the payload and index files under `root`.
    ///
    /// The tree is walked in file-name order. For each role the largest match
    /// wins and ties go to the first one seen, so the result does not depend
    /// on the platform's directory ordering.
    fn locate(&self, root: &Path) -> Result<(Option<PathBuf>, Option<PathBuf>)> {
        let mut payload: Option<(PathBuf, u64)> = None;
        let mut index: Option<(PathBuf, u64)> = None;

        for entry in WalkDir::new(root).sort_by_file_name() {
            let entry = entry.map_err(std::io::Error::from)?;
            if !entry.file_type().is_file() {
                continue;
            }

            let size = entry.metadata().map_err(std::io::Error::from)?.len();
            let extension = extension_of(entry.path()).unwrap_or_default();
            let best = match self.classifier.classify(extension, size) {
                Some(FileRole::Payload) => &mut payload,
                Some(FileRole::Index) => &mut index,
                None => continue,
            };

            if best.as_ref().map_or(true, |(_, best_size)| size > *best_size) {
                *best = Some((entry.into_path(), size));
            }
        }

        Ok((payload.map(|(p, _)| p), index.map(|(p, _)| p)))
    }

    fn role_of(&self, path: &Path) -> Result<Option<FileRole>> {
        let size = fs::metadata(path)?.len();
        Ok(self
            .classifier
            .classify(extension_of(path).unwrap_or_default(), size))
    }
}

/// True when `path` opens as a zip archive
#[must_use]
pub fn is_zip_archive(path: &Path) -> bool {
    File::open(path)
        .ok()
        .and_then(|file| zip::ZipArchive::new(BufReader::new(file)).ok())
        .is_some()
}

/// Decompress every entry of `archive` under `dest`, preserving relative paths
fn unpack_zip(archive: &Path, dest: &Path) -> Result<()> {
    let file = File::open(archive)?;
    let mut zip = zip::ZipArchive::new(BufReader::new(file))?;

    for i in 0..zip.len() {
        let mut entry = zip.by_index(i)?;

        let Some(relative) = entry.enclosed_name() else {
            tracing::warn!("Skipping unsafe archive entry: {}", entry.name());
            continue;
        };
        let outpath = dest.join(relative);

        if entry.is_dir() {
            fs::create_dir_all(&outpath)?;
            continue;
        }

        if let Some(parent) = outpath.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut outfile = File::create(&outpath)?;
        std::io::copy(&mut entry, &mut outfile)?;
    }

    Ok(())
}

fn remove_partial(destination: &Path) {
    if !destination.is_dir() {
        return;
    }
    tracing::warn!(
        "Extraction into {} failed, removing partial output",
        destination.display()
    );
    if let Err(e) = fs::remove_dir_all(destination) {
        tracing::error!("Failed to remove {}: {e}", destination.display());
    }
}

fn move_to_top_level(source: &Path, destination: &Path) -> Result<PathBuf> {
    let name = source.file_name().ok_or_else(|| {
        VoicelibError::Extraction(format!("Invalid extracted file: {}", source.display()))
    })?;
    let target = destination.join(name);
    if source != target {
        fs::rename(source, &target)?;
    }
    Ok(target)
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}


#[cfg(test)]
mod tests {
    use super::test_support::write_zip;
    use super::*;
    use tempfile::TempDir;

    fn small_extractor() -> ArchiveExtractor {
        ArchiveExtractor::new(SizeHeuristic::new("pth", 1024, "index", 100))
    }

    fn top_level(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_extract_flattens_nested_files() {
        let temp_dir = TempDir::new().unwrap();
        let archive = temp_dir.path().join("alto.zip");
        write_zip(
            &archive,
            &[
                ("alto/", 0),
                ("alto/weights/alto.pth", 4096),
                ("alto/added_IVF256.index", 512),
                ("alto/notes/readme.txt", 10),
            ],
        );

        let dest = temp_dir.path().join("models/alto");
        let extracted = small_extractor().extract(&dest, &archive, false).unwrap();

        assert_eq!(extracted.payload, dest.join("alto.pth"));
        assert_eq!(extracted.index, Some(dest.join("added_IVF256.index")));
        assert_eq!(top_level(&dest), vec!["added_IVF256.index", "alto.pth"]);
        assert_eq!(fs::metadata(dest.join("alto.pth")).unwrap().len(), 4096);
        assert!(archive.exists());
    }

    #[test]
    fn test_extract_without_index() {
        let temp_dir = TempDir::new().unwrap();
        let archive = temp_dir.path().join("bass.zip");
        write_zip(&archive, &[("bass.pth", 2048), ("tiny.index", 50)]);

        let dest = temp_dir.path().join("bass");
        let extracted = small_extractor().extract(&dest, &archive, false).unwrap();

        assert_eq!(extracted.index, None);
        // Below-threshold files at the top level are not candidates and stay put
        assert_eq!(top_level(&dest), vec!["bass.pth", "tiny.index"]);
    }

    #[test]
    fn test_missing_payload_cleans_up() {
        let temp_dir = TempDir::new().unwrap();
        let archive = temp_dir.path().join("empty.zip");
        write_zip(&archive, &[("voice/voice.pth", 100), ("voice/voice.index", 500)]);

        let dest = temp_dir.path().join("empty");
        let err = small_extractor().extract(&dest, &archive, false).unwrap_err();

        assert!(matches!(err, VoicelibError::Extraction(_)));
        assert_eq!(
            err.to_string(),
            "No .pth model file was found in the extracted zip folder."
        );
        assert!(!dest.exists());
        assert!(archive.exists());
    }

    #[test]
    fn test_archive_removed_on_success_and_failure() {
        let temp_dir = TempDir::new().unwrap();

        let good = temp_dir.path().join("good.zip");
        write_zip(&good, &[("good.pth", 2048)]);
        small_extractor()
            .extract(&temp_dir.path().join("good"), &good, true)
            .unwrap();
        assert!(!good.exists());

        let bad = temp_dir.path().join("bad.zip");
        write_zip(&bad, &[("readme.txt", 10)]);
        assert!(small_extractor()
            .extract(&temp_dir.path().join("bad"), &bad, true)
            .is_err());
        assert!(!bad.exists());
        assert!(!temp_dir.path().join("bad").exists());
    }

    #[test]
    fn test_existing_destination_is_conflict_and_untouched() {
        let temp_dir = TempDir::new().unwrap();
        let archive = temp_dir.path().join("alto.zip");
        write_zip(&archive, &[("alto.pth", 2048)]);

        let dest = temp_dir.path().join("alto");
        fs::create_dir(&dest).unwrap();
        fs::write(dest.join("keep.txt"), "mine").unwrap();

        let err = small_extractor().extract(&dest, &archive, false).unwrap_err();

        assert!(matches!(err, VoicelibError::NameConflict(name) if name == "alto"));
        assert_eq!(top_level(&dest), vec!["keep.txt"]);
    }

    #[test]
    fn test_largest_candidate_wins() {
        let temp_dir = TempDir::new().unwrap();
        let archive = temp_dir.path().join("multi.zip");
        write_zip(
            &archive,
            &[
                ("a_small.pth", 2000),
                ("nested/big.pth", 8000),
                ("z_medium.pth", 4000),
                ("first.index", 300),
                ("second.index", 300),
            ],
        );

        let dest = temp_dir.path().join("multi");
        let extracted = small_extractor().extract(&dest, &archive, false).unwrap();

        assert_eq!(extracted.payload, dest.join("big.pth"));
        assert_eq!(extracted.index, Some(dest.join("first.index")));
        assert_eq!(top_level(&dest), vec!["big.pth", "first.index"]);
    }

    #[test]
    fn test_invalid_archive_cleans_up() {
        let temp_dir = TempDir::new().unwrap();
        let archive = temp_dir.path().join("broken.zip");
        fs::write(&archive, b"definitely not a zip").unwrap();

        let dest = temp_dir.path().join("broken");
        let err = small_extractor().extract(&dest, &archive, false).unwrap_err();

        assert!(matches!(err, VoicelibError::Archive(_)));
        assert!(!dest.exists());
    }

    #[test]
    fn test_missing_archive_cleans_up() {
        let temp_dir = TempDir::new().unwrap();
        let dest = temp_dir.path().join("ghost");

        let err = small_extractor()
            .extract(&dest, &temp_dir.path().join("ghost.zip"), true)
            .unwrap_err();

        assert!(matches!(err, VoicelibError::Io(_)));
        assert!(!dest.exists());
    }

    #[test]
    fn test_custom_classifier() {
        let temp_dir = TempDir::new().unwrap();
        let archive = temp_dir.path().join("st.zip");
        write_zip(&archive, &[("inner/model.safetensors", 10), ("inner/model.pth", 9000)]);

        let extractor = ArchiveExtractor::new(|ext: &str, _size: u64| {
            (ext == "safetensors").then_some(FileRole::Payload)
        });
        let dest = temp_dir.path().join("st");
        let extracted = extractor.extract(&dest, &archive, false).unwrap();

        assert_eq!(extracted.payload, dest.join("model.safetensors"));
        assert_eq!(top_level(&dest), vec!["model.safetensors"]);
    }

    #[test]
    fn test_is_zip_archive() {
        let temp_dir = TempDir::new().unwrap();
        let archive = temp_dir.path().join("ok.zip");
        write_zip(&archive, &[("x.txt", 1)]);
        let plain = temp_dir.path().join("plain.txt");
        fs::write(&plain, "hello").unwrap();

        assert!(is_zip_archive(&archive));
        assert!(!is_zip_archive(&plain));
        assert!(!is_zip_archive(&temp_dir.path().join("missing.zip")));
    }
}
