use crate::error::{Result, VoicelibError};
use crate::models::classify::{extension_of, FileRole, SizeHeuristic};
use crate::models::extract::{is_zip_archive, ArchiveExtractor};
use crate::models::paths::{create_dir_exclusive, ModelsRoot};
use crate::models::progress::ProgressReporter;
use std::fs;
use std::path::{Path, PathBuf};

/// Installs models from files the user already has on disk
#[derive(Debug, Clone)]
pub struct UploadIngester {
    root: ModelsRoot,
    heuristic: SizeHeuristic,
    extractor: ArchiveExtractor,
}

impl UploadIngester {
    /// Uses `heuristic` both for name-based routing and for archive extraction
    #[must_use]
    pub fn new(root: ModelsRoot, heuristic: SizeHeuristic) -> Self {
        let extractor = ArchiveExtractor::new(heuristic.clone());
        Self {
            root,
            heuristic,
            extractor,
        }
    }

    /// Swap in a different extractor (e.g. one with a custom classifier)
    #[must_use]
    pub fn with_extractor(mut self, extractor: ArchiveExtractor) -> Self {
        self.extractor = extractor;
        self
    }

    /// Install one or two local files as the model `dir_name`.
    ///
    /// A lone payload file is copied as-is, a lone archive is extracted (the
    /// upload itself is kept), and an index+payload pair is copied together.
    pub fn ingest(
        &self,
        input_paths: &[PathBuf],
        dir_name: &str,
        progress: &dyn ProgressReporter,
    ) -> Result<String> {
        if input_paths.is_empty() {
            return Err(VoicelibError::invalid("No files selected!"));
        }
        if input_paths.len() > 2 {
            return Err(VoicelibError::invalid("At most two files can be uploaded!"));
        }
        let output_dir = self.root.ensure_available(dir_name)?;

        let payload_ext = self.heuristic.payload_extension();
        let index_ext = self.heuristic.index_extension();

        match input_paths {
            [single] => {
                if self.heuristic.role_for_name(single) == Some(FileRole::Payload) {
                    progress.report(&format!("[~] Copying .{payload_ext} file ..."), 0.5);
                    copy_files_to_new_dir(input_paths, &output_dir)?;
                } else if is_zip_archive(single) {
                    progress.report("[~] Extracting zip file...", 0.5);
                    self.extractor.extract(&output_dir, single, false)?;
                } else {
                    return Err(VoicelibError::InvalidInput(format!(
                        "Only a .{payload_ext} file or a .zip file can be uploaded by itself!"
                    )));
                }
            }
            [first, second] => {
                let mut sorted = [first, second];
                sorted.sort_by(|a, b| extension_of(a).cmp(&extension_of(b)));
                let [index_path, payload_path] = sorted;

                if self.heuristic.role_for_name(index_path) == Some(FileRole::Index)
                    && self.heuristic.role_for_name(payload_path) == Some(FileRole::Payload)
                {
                    progress.report(
                        &format!("[~] Copying .{payload_ext} file and .{index_ext} file ..."),
                        0.5,
                    );
                    copy_files_to_new_dir(input_paths, &output_dir)?;
                } else {
                    return Err(VoicelibError::InvalidInput(format!(
                        "Only a .{payload_ext} file and an .{index_ext} file can be uploaded together!"
                    )));
                }
            }
            _ => return Err(VoicelibError::invalid("At most two files can be uploaded!")),
        }

        tracing::info!("Uploaded model '{dir_name}' into {}", output_dir.display());
        let message = format!("[+] Model with name '{dir_name}' successfully uploaded!");
        progress.report(&message, 1.0);
        Ok(message)
    }
}

/// Copy `files` by base name into the freshly created `dir`; on failure `dir` is removed again
fn copy_files_to_new_dir(files: &[PathBuf], dir: &Path) -> Result<()> {
    create_dir_exclusive(dir)?;

    let copied = files.iter().try_for_each(|file| -> Result<()> {
        let name = file.file_name().ok_or_else(|| {
            VoicelibError::InvalidInput(format!("Not a file: {}", file.display()))
        })?;
        fs::copy(file, dir.join(name))?;
        Ok(())
    });

    if copied.is_err() && dir.is_dir() {
        tracing::warn!("Copy into {} failed, removing it", dir.display());
        fs::remove_dir_all(dir)?;
    }
    copied
}
