pub mod classify;
pub mod download;
pub mod extract;
pub mod manager;
pub mod paths;
pub mod progress;
pub mod upload;

pub use classify::{FileClassifier, FileRole, SizeHeuristic};
pub use download::{Fetcher, HttpFetcher, RemoteModelFetcher};
pub use extract::{ArchiveExtractor, ExtractedModel};
pub use manager::{InstalledModel, ModelLibrary};
pub use paths::ModelsRoot;
pub use progress::{ConsoleProgress, NoProgress, ProgressReporter};
pub use upload::UploadIngester;
