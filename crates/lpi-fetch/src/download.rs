//! Download of remote install files into a local cache
//!
//! Files land in `<system temp>/lpi/<file name>`. A file already present
//! under the resolved name is returned as is: content and freshness are never
//! checked again, so a changed remote file published under the same name is
//! not picked up until the cache entry is deleted.
//!
//! When the server names the file through `Content-Disposition`, a
//! `<url name>.name` sidecar records the resolved name so a later fetch of the
//! same URL finds the file without a request.
//!
//! Only `http` and `https` are downloaded; other schemes are rejected.

use anyhow::{anyhow, Context, Result};
use futures_util::StreamExt;
use lpi_core::ProgressMeter;
use reqwest::header::{CONTENT_DISPOSITION, CONTENT_LENGTH};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};
use url::Url;

/// Name of the cache directory under the system temp dir
pub const CACHE_DIR_NAME: &str = "lpi";

/// File name used when the URL has no usable last segment
const FALLBACK_FILE_NAME: &str = "download";

/// Suffix of the sidecar holding the server-resolved file name
const NAME_SIDECAR_SUFFIX: &str = ".name";

/// URL schemes the downloader can fetch
const SUPPORTED_SCHEMES: &[&str] = &["http", "https"];

/// HTTP downloader with a name-keyed file cache
#[derive(Debug, Clone)]
pub struct Downloader {
    client: reqwest::Client,
    cache_dir: PathBuf,
}

impl Downloader {
    /// Create a downloader caching into `<system temp>/lpi`
    pub fn new() -> Result<Self> {
        Self::with_cache_dir(std::env::temp_dir().join(CACHE_DIR_NAME))
    }

    /// Create a downloader caching into `cache_dir`
    pub fn with_cache_dir(cache_dir: impl Into<PathBuf>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(format!("lpi/{}", lpi_core::VERSION))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            cache_dir: cache_dir.into(),
        })
    }

    /// Cache directory
    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Fetch `url` into the cache and return the local path
    pub async fn fetch(&self, url: &Url) -> Result<PathBuf> {
        if !SUPPORTED_SCHEMES.contains(&url.scheme()) {
            return Err(anyhow!(
                "Unsupported URL scheme '{}' for {}; download the file and use a local path",
                url.scheme(),
                url
            ));
        }
        info!("- Verifying {} metadata", url);

        let url_name = file_name_from_url(url);
        if let Some(cached) = self.cached(&url_name).await {
            debug!("Using cached {}", cached.display());
            return Ok(cached);
        }

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .with_context(|| format!("Failed to request {}", url))?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "Download of {} failed with status: {}",
                url,
                response.status()
            ));
        }

        let file_name = response
            .headers()
            .get(CONTENT_DISPOSITION)
            .and_then(|value| value.to_str().ok())
            .and_then(file_name_from_disposition)
            .unwrap_or(url_name.clone());

        let destination = self.cache_dir.join(&file_name);
        if destination.exists() {
            debug!("Using cached {}", destination.display());
            self.remember_name(&url_name, &file_name).await?;
            return Ok(destination);
        }

        let length = response
            .headers()
            .get(CONTENT_LENGTH)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.parse::<u64>().ok())
            .unwrap_or(0);

        info!("- Downloading {}", file_name);
        let temp_path = temp_path(&destination);
        if let Some(parent) = temp_path.parent() {
            fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        let mut file = fs::File::create(&temp_path)
            .await
            .with_context(|| format!("Failed to create {}", temp_path.display()))?;
        let mut progress = ProgressMeter::new();
        let mut downloaded: u64 = 0;
        let mut stream = response.bytes_stream();

        while let Some(chunk) = stream.next().await {
            let chunk: bytes::Bytes = chunk.context("Failed to read download chunk")?;
            file.write_all(&chunk)
                .await
                .with_context(|| format!("Failed to write {}", temp_path.display()))?;
            downloaded += chunk.len() as u64;
            progress.tick_with(|| progress_message(downloaded, length));
        }
        file.flush().await?;
        drop(file);

        fs::rename(&temp_path, &destination)
            .await
            .with_context(|| format!("Failed to move download to {}", destination.display()))?;

        self.remember_name(&url_name, &file_name).await?;

        info!("  +- Finished download of {}", file_name);
        Ok(destination)
    }

    /// Cached file for a URL name, directly or through its name sidecar
    async fn cached(&self, url_name: &str) -> Option<PathBuf> {
        let direct = self.cache_dir.join(url_name);
        if direct.exists() {
            return Some(direct);
        }

        let recorded = fs::read_to_string(self.sidecar_path(url_name)).await.ok()?;
        let name = Path::new(recorded.trim()).file_name()?;
        let resolved = self.cache_dir.join(name);
        resolved.exists().then_some(resolved)
    }

    /// Record the server-resolved name when it differs from the URL name
    async fn remember_name(&self, url_name: &str, file_name: &str) -> Result<()> {
        if url_name == file_name {
            return Ok(());
        }
        let sidecar = self.sidecar_path(url_name);
        fs::write(&sidecar, file_name)
            .await
            .with_context(|| format!("Failed to write {}", sidecar.display()))
    }

    fn sidecar_path(&self, url_name: &str) -> PathBuf {
        self.cache_dir.join(format!("{}{}", url_name, NAME_SIDECAR_SUFFIX))
    }
}

/// `  |- N (P%) of T bytes downloaded`; the percentage is omitted when the
/// server sent no length
fn progress_message(downloaded: u64, length: u64) -> String {
    if length > 0 {
        let percent = downloaded as f64 / length as f64 * 100.0;
        format!(
            "  |- {} ({:.2}%) of {} bytes downloaded",
            downloaded, percent, length
        )
    } else {
        format!("  |- {} bytes downloaded", downloaded)
    }
}

fn temp_path(destination: &Path) -> PathBuf {
    let mut name = destination.as_os_str().to_os_string();
    name.push(".tmp");
    PathBuf::from(name)
}

/// Last path segment of the URL, without query
pub fn file_name_from_url(url: &Url) -> String {
    url.path_segments()
        .and_then(|mut segments| segments.next_back())
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| FALLBACK_FILE_NAME.to_string())
}

/// File name carried by a `Content-Disposition` header value
///
/// Takes the text after the first `=`, up to any `;`, without quotes and
/// without directory components.
pub fn file_name_from_disposition(value: &str) -> Option<String> {
    let (_, raw) = value.split_once('=')?;
    let raw = raw.split(';').next()?.trim().trim_matches('"');
    let name = Path::new(raw).file_name()?.to_str()?.trim();
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_name_from_url() {
        let url = Url::parse("http://host/maven2/tomcat/7.0.50/tomcat-7.0.50.zip?mirror=1").unwrap();
        assert_eq!(file_name_from_url(&url), "tomcat-7.0.50.zip");

        let url = Url::parse("http://host/").unwrap();
        assert_eq!(file_name_from_url(&url), "download");
    }

    #[test]
    fn test_file_name_from_disposition() {
        assert_eq!(
            file_name_from_disposition("attachment; filename=jboss-eap-6.2.0.zip").as_deref(),
            Some("jboss-eap-6.2.0.zip")
        );
        assert_eq!(
            file_name_from_disposition("attachment; filename=\"a.zip\"; size=3").as_deref(),
            Some("a.zip")
        );
        assert_eq!(
            file_name_from_disposition("attachment; filename=../../etc/passwd").as_deref(),
            Some("passwd")
        );
        assert_eq!(file_name_from_disposition("inline"), None);
    }

    #[test]
    fn test_progress_message() {
        assert_eq!(
            progress_message(50, 200),
            "  |- 50 (25.00%) of 200 bytes downloaded"
        );
        assert_eq!(progress_message(50, 0), "  |- 50 bytes downloaded");
    }
}
