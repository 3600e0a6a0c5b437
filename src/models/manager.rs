use crate::error::{Result, VoicelibError};
use crate::models::classify::{FileRole, SizeHeuristic};
use crate::models::paths::{is_single_component, ModelsRoot};
use crate::models::progress::ProgressReporter;
use std::fs;

/// Summary of one installed model directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstalledModel {
    pub name: String,
    pub payload: Option<String>,
    pub index: Option<String>,
    pub size_bytes: u64,
}

/// Lists and removes installed models
#[derive(Debug, Clone)]
pub struct ModelLibrary {
    root: ModelsRoot,
    heuristic: SizeHeuristic,
}

impl ModelLibrary {
    #[must_use]
    pub const fn new(root: ModelsRoot, heuristic: SizeHeuristic) -> Self {
        Self { root, heuristic }
    }

    #[must_use]
    pub const fn root(&self) -> &ModelsRoot {
        &self.root
    }

    /// Names of installed model directories, sorted; reserved assets are skipped
    pub fn list_installed(&self) -> Result<Vec<String>> {
        if !self.root.path().exists() {
            return Ok(Vec::new());
        }

        let mut names = Vec::new();
        for entry in fs::read_dir(self.root.path())? {
            let entry = entry?;
            // Follows symlinks, same rule as `remove_dirs`
            if !entry.path().is_dir() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            if !self.root.is_reserved(&name) {
                names.push(name);
            }
        }

        names.sort();
        Ok(names)
    }

    /// Describe an installed model by the files at its top level
    pub fn inspect(&self, name: &str) -> Result<InstalledModel> {
        let dir = self.root.model_dir(name)?;
        if !dir.is_dir() {
            return Err(VoicelibError::InvalidInput(format!(
                "Model '{name}' is not installed"
            )));
        }

        let mut model = InstalledModel {
            name: name.to_string(),
            payload: None,
            index: None,
            size_bytes: 0,
        };

        for entry in fs::read_dir(&dir)? {
            let entry = entry?;
            let metadata = entry.metadata()?;
            if !metadata.is_file() {
                continue;
            }
            model.size_bytes += metadata.len();

            let file_name = entry.file_name().to_string_lossy().into_owned();
            match self.heuristic.role_for_name(&entry.path()) {
                Some(FileRole::Payload) => model.payload = Some(file_name),
                Some(FileRole::Index) => model.index = Some(file_name),
                None => {}
            }
        }

        Ok(model)
    }

    /// Delete the named models. Names that are not installed are skipped.
    pub fn delete<S: AsRef<str>>(
        &self,
        model_names: &[S],
        progress: &dyn ProgressReporter,
    ) -> Result<String> {
        if model_names.is_empty() {
            return Err(VoicelibError::invalid("No models selected!"));
        }

        progress.report("[~] Deleting selected models ...", 0.5);
        self.remove_dirs(model_names)?;

        let message = deleted_message(model_names);
        progress.report(&message, 1.0);
        Ok(message)
    }

    /// Delete every installed model
    pub fn delete_all(&self, progress: &dyn ProgressReporter) -> Result<String> {
        let all_models = self.list_installed()?;
        progress.report("[~] Deleting all models ...", 0.5);
        self.remove_dirs(&all_models)?;

        let message = "[+] All models successfully deleted!".to_string();
        progress.report(&message, 1.0);
        Ok(message)
    }

    fn remove_dirs<S: AsRef<str>>(&self, model_names: &[S]) -> Result<()> {
        for name in model_names {
            let name = name.as_ref();
            if !is_single_component(name) || self.root.is_reserved(name) {
                tracing::warn!("Ignoring invalid model name '{name}'");
                continue;
            }

            let dir = self.root.path().join(name);
            if dir.is_dir() {
                fs::remove_dir_all(&dir)?;
                tracing::info!("Deleted model '{name}'");
            } else {
                tracing::debug!("Model '{name}' not present, nothing to delete");
            }
        }
        Ok(())
    }
}

/// `[+] Model with name 'a' ...` or `[+] Models with names 'a', 'b', and 'c' ...`
fn deleted_message<S: AsRef<str>>(model_names: &[S]) -> String {
    let quoted: Vec<String> = model_names
        .iter()
        .map(|name| format!("'{}'", name.as_ref()))
        .collect();

    match quoted.as_slice() {
        [one] => format!("[+] Model with name {one} successfully deleted!"),
        [first, second] => {
            format!("[+] Models with names {first} and {second} successfully deleted!")
        }
        [rest @ .., last] => format!(
            "[+] Models with names {}, and {last} successfully deleted!",
            rest.join(", ")
        ),
        [] => "[+] No models deleted!".to_string(),
    }
}
