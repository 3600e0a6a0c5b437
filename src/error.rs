use thiserror::Error;

/// Main error type for voicelib
#[derive(Error, Debug)]
pub enum VoicelibError {
    /// Missing or malformed caller input; the message is shown as-is
    #[error("{0}")]
    InvalidInput(String),

    #[error("Voice model directory \"{0}\" already exists! Choose a different name for your voice model.")]
    NameConflict(String),

    #[error("{0}")]
    Extraction(String),

    #[error("Download error: {0}\n\nTroubleshooting:\n- Check internet connection\n- Verify the link opens in a browser\n- Use a direct file link rather than a preview page")]
    Transport(String),

    #[error("Catalog error: {0}\n\nTroubleshooting:\n- Check catalog file: <models dir>/public_models.json\n- Validate it with: jq . public_models.json")]
    Catalog(String),

    #[error("Config error: {0}\n\nTroubleshooting:\n- Check config file: ~/.config/voicelib/config.toml\n- Run with RUST_LOG=debug for more details")]
    Config(String),

    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl VoicelibError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }
}

pub type Result<T> = std::result::Result<T, VoicelibError>;
