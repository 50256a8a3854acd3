//! # lpi-fetch
//!
//! Materializes install files for the portal installer: remote archives are
//! downloaded into a local cache, ZIP archives are extracted into the install
//! tree, and the portal web root can be packed into a single web archive.

pub mod archive;
pub mod download;

pub use archive::{extract, package};
pub use download::Downloader;

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use url::Url;

/// Whether `source` names a remote file rather than a local path
///
/// `ftp` sources count as remote so the downloader can reject them by scheme
/// instead of failing on a missing local file.
pub fn is_remote(source: &str) -> bool {
    source.starts_with("http") || source.starts_with("ftp")
}

/// Local-or-remote file access for install sources
#[derive(Debug, Clone)]
pub struct Fetcher {
    downloader: Downloader,
}

impl Fetcher {
    /// Create a fetcher with the default download cache
    pub fn new() -> Result<Self> {
        Ok(Self {
            downloader: Downloader::new()?,
        })
    }

    pub fn with_downloader(downloader: Downloader) -> Self {
        Self { downloader }
    }

    pub fn downloader(&self) -> &Downloader {
        &self.downloader
    }

    /// Local path of `source`, downloading it first when it is remote
    pub async fn materialize(&self, source: &str) -> Result<PathBuf> {
        if is_remote(source) {
            let url = Url::parse(source).with_context(|| format!("Invalid URL: {}", source))?;
            self.downloader.fetch(&url).await
        } else {
            Ok(PathBuf::from(source))
        }
    }

    /// Materialize `source` and extract it into `target`
    ///
    /// See [`archive::extract`] for the counting and stripping rules.
    pub async fn extract(
        &self,
        source: &str,
        target: &Path,
        ignore: Option<&str>,
        strip_root: bool,
    ) -> Result<usize> {
        let archive = self.materialize(source).await?;
        let target = target.to_path_buf();
        let ignore = ignore.map(str::to_string);
        tokio::task::spawn_blocking(move || {
            archive::extract(&archive, &target, ignore.as_deref(), strip_root)
        })
        .await
        .context("Extraction task failed")?
    }

    /// Pack `source` into the archive at `destination`
    pub async fn package(&self, source: &Path, destination: &Path) -> Result<usize> {
        let source = source.to_path_buf();
        let destination = destination.to_path_buf();
        tokio::task::spawn_blocking(move || archive::package(&source, &destination))
            .await
            .context("Packaging task failed")?
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_remote() {
        assert!(is_remote("http://central.maven.org/tomcat.zip"));
        assert!(is_remote("https://example.com/a.zip"));
        assert!(is_remote("ftp://mirror/a.zip"));
        assert!(!is_remote("./lumisportal_7.1.1.140331.zip"));
        assert!(!is_remote("/opt/jboss-eap-6.2.0.zip"));
    }

    #[tokio::test]
    async fn test_materialize_local_is_identity() {
        let fetcher = Fetcher::with_downloader(Downloader::with_cache_dir("/tmp/unused").unwrap());
        let path = fetcher.materialize("./jboss-5.1.0.GA.zip").await.unwrap();
        assert_eq!(path, PathBuf::from("./jboss-5.1.0.GA.zip"));
    }
}
