//! Loading XML text from local files and URLs.

use std::fs;
use std::path::Path;
use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::info;

use crate::error::{Result, XmlSheetError};

/// Where a payload came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "location", rename_all = "snake_case")]
pub enum SourceOrigin {
    /// A local file path.
    File(String),
    /// A fetched URL.
    Url(String),
    /// Text handed over directly (e.g. an HTTP request body).
    Inline,
}

/// Metadata about a loaded XML payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceMetadata {
    /// Where the text came from.
    pub origin: SourceOrigin,
    /// Payload size in bytes.
    pub size_bytes: u64,
    /// SHA-256 hash of the payload.
    pub hash: String,
    /// When the payload was loaded.
    pub loaded_at: DateTime<Utc>,
}

impl SourceMetadata {
    /// Describe a payload that has just been loaded.
    pub fn new(origin: SourceOrigin, text: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(text.as_bytes());

        Self {
            origin,
            size_bytes: text.len() as u64,
            hash: format!("sha256:{:x}", hasher.finalize()),
            loaded_at: Utc::now(),
        }
    }

    /// Short display name for the origin.
    pub fn display_name(&self) -> &str {
        match &self.origin {
            SourceOrigin::File(path) => path,
            SourceOrigin::Url(url) => url,
            SourceOrigin::Inline => "<inline>",
        }
    }
}

/// A text payload handed to the core in one piece.
#[derive(Debug, Clone)]
pub struct LoadedSource {
    pub text: String,
    pub metadata: SourceMetadata,
}

impl LoadedSource {
    /// Wrap text that did not come from a file or URL.
    pub fn inline(text: impl Into<String>) -> Self {
        let text = text.into();
        let metadata = SourceMetadata::new(SourceOrigin::Inline, &text);
        Self { text, metadata }
    }
}

/// Loader configuration.
#[derive(Debug, Clone)]
pub struct LoaderConfig {
    /// Timeout for URL fetches.
    pub fetch_timeout: Duration,
    /// User agent sent with URL fetches.
    pub user_agent: String,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            fetch_timeout: Duration::from_secs(30),
            user_agent: format!("xmlsheet/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl LoaderConfig {
    /// Set the fetch timeout.
    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }
}

/// Check that a path names an XML file (case-insensitive `.xml` extension).
pub fn has_xml_extension(path: impl AsRef<Path>) -> bool {
    path.as_ref()
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("xml"))
}

/// Read a local `.xml` file.
pub fn load_file(path: impl AsRef<Path>) -> Result<LoadedSource> {
    let path = path.as_ref();

    if !has_xml_extension(path) {
        return Err(XmlSheetError::WrongExtension(path.to_path_buf()));
    }

    let text = fs::read_to_string(path).map_err(|e| XmlSheetError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;

    let metadata = SourceMetadata::new(SourceOrigin::File(path.display().to_string()), &text);
    info!(path = %path.display(), bytes = metadata.size_bytes, "loaded XML file");

    Ok(LoadedSource { text, metadata })
}

/// Fetch XML text from a URL.
///
/// Any success status is accepted; the content type is not checked.
pub fn fetch_url(url: &str, config: &LoaderConfig) -> Result<LoadedSource> {
    let fetch_error = |message: String| XmlSheetError::Fetch {
        url: url.to_string(),
        message,
    };

    if url.trim().is_empty() {
        return Err(fetch_error("URL is empty".to_string()));
    }

    let client = Client::builder()
        .timeout(config.fetch_timeout)
        .user_agent(config.user_agent.clone())
        .build()
        .map_err(|e| XmlSheetError::Config(format!("Failed to create HTTP client: {}", e)))?;

    let response = client
        .get(url)
        .send()
        .map_err(|e| fetch_error(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        return Err(fetch_error(format!("server responded with {}", status)));
    }

    let text = response.text().map_err(|e| fetch_error(e.to_string()))?;
    let metadata = SourceMetadata::new(SourceOrigin::Url(url.to_string()), &text);
    info!(url, bytes = metadata.size_bytes, "fetched XML");

    Ok(LoadedSource { text, metadata })
}
