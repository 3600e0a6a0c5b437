use crate::config::schema::DownloadConfig;
use crate::error::{Result, VoicelibError};
use crate::models::extract::ArchiveExtractor;
use crate::models::paths::{archive_name_from_url, ModelsRoot};
use crate::models::progress::ProgressReporter;
use async_trait::async_trait;
use futures_util::StreamExt;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

const PIXELDRAIN_HOST: &str = "pixeldrain.com";

/// Fetches a URL into a local file, returning once it is fully written
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &str, dest: &Path) -> Result<()>;
}

/// HTTP(S) fetcher streaming the response body to disk
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl std::fmt::Debug for HttpFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpFetcher")
            .field("client", &"Client { ... }")
            .finish()
    }
}

impl HttpFetcher {
    /// Create fetcher from config
    pub fn new(config: &DownloadConfig) -> Result<Self> {
        // No overall timeout: model archives can be several hundred MB
        let client = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout())
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| VoicelibError::Transport(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str, dest: &Path) -> Result<()> {
        tracing::info!("Downloading {url} to {}", dest.display());

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| VoicelibError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(VoicelibError::Transport(format!(
                "Server returned {status} for {url}"
            )));
        }

        let mut file = File::create(dest)?;
        let mut downloaded: u64 = 0;
        let mut stream = response.bytes_stream();

        while let Some(chunk) = stream.next().await {
            let chunk = chunk
                .map_err(|e| VoicelibError::Transport(format!("Error reading download: {e}")))?;
            file.write_all(&chunk)?;
            downloaded += chunk.len() as u64;
        }
        file.flush()?;

        tracing::info!("Download complete: {downloaded} bytes");
        Ok(())
    }
}

/// Installs models from a download link
pub struct RemoteModelFetcher<F: Fetcher> {
    root: ModelsRoot,
    fetcher: F,
    staging_dir: PathBuf,
    extractor: ArchiveExtractor,
}

impl<F: Fetcher> RemoteModelFetcher<F> {
    /// Each archive is staged in its own directory under `staging_dir` and deleted after extraction
    pub fn new(
        root: ModelsRoot,
        fetcher: F,
        staging_dir: impl Into<PathBuf>,
        extractor: ArchiveExtractor,
    ) -> Self {
        Self {
            root,
            fetcher,
            staging_dir: staging_dir.into(),
            extractor,
        }
    }

    /// Download `url` and install it as the model `dir_name`
    pub async fn fetch_from_url(
        &self,
        url: &str,
        dir_name: &str,
        progress: &dyn ProgressReporter,
    ) -> Result<String> {
        if url.is_empty() {
            return Err(VoicelibError::invalid("Download link to model missing!"));
        }
        if dir_name.is_empty() {
            return Err(VoicelibError::invalid("Model name missing!"));
        }
        let extraction_dir = self.root.ensure_available(dir_name)?;

        let archive_name = archive_name_from_url(url)?;
        let download_url = resolve_download_url(url, &archive_name);

        progress.report(
            &format!("[~] Downloading voice model with name '{dir_name}'..."),
            0.0,
        );

        // Private per-download directory; dropping it removes whatever was fetched
        fs::create_dir_all(&self.staging_dir)?;
        let staging = tempfile::Builder::new()
            .prefix("voicelib-")
            .tempdir_in(&self.staging_dir)?;
        let archive_path = staging.path().join(&archive_name);

        if let Err(e) = self.fetcher.fetch(&download_url, &archive_path).await {
            tracing::debug!("Discarding staging dir {}", staging.path().display());
            return Err(e);
        }

        progress.report("[~] Extracting zip file...", 0.5);
        self.extractor.extract(&extraction_dir, &archive_path, true)?;
        drop(staging);

        let message = format!("[+] Model with name '{dir_name}' successfully downloaded!");
        progress.report(&message, 1.0);
        Ok(message)
    }
}

/// Rewrite share links of known hosts into their direct-download form
#[must_use]
pub fn resolve_download_url(url: &str, archive_name: &str) -> String {
    let host = url::Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_ascii_lowercase));

    match host {
        Some(h) if h == PIXELDRAIN_HOST || h.ends_with(".pixeldrain.com") => {
            format!("https://{PIXELDRAIN_HOST}/api/file/{archive_name}")
        }
        _ => url.to_string(),
    }
}
