use std::path::{Path, PathBuf};

use futures_util::stream::{self, StreamExt};
use reqwest::Client;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use crate::core::error::{StaticDataError, StaticDataResult};

/// A single file to download.
#[derive(Debug, Clone)]
pub struct DownloadEntry {
    pub url: String,
    pub dest: PathBuf,
}

/// Concurrent file downloader shared by the remote sources.
#[derive(Clone)]
pub struct Downloader {
    client: Client,
    /// Maximum number of parallel downloads.
    concurrency: usize,
}

impl Downloader {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            concurrency: 8,
        }
    }

    pub fn with_concurrency(mut self, n: usize) -> Self {
        self.concurrency = n.max(1);
        self
    }

    // ── Single file download ────────────────────────────

    /// Download a single file to `dest`, creating parent directories.
    /// The file is only written once the whole body has arrived.
    pub async fn download_file(&self, url: &str, dest: &Path) -> StaticDataResult<u64> {
        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(StaticDataError::io(parent))?;
        }

        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(StaticDataError::DownloadFailed {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let bytes = response.bytes().await?;

        // Handle is dropped at the end of the block, before we report success.
        {
            let mut file = tokio::fs::File::create(dest)
                .await
                .map_err(StaticDataError::io(dest))?;
            file.write_all(&bytes)
                .await
                .map_err(StaticDataError::io(dest))?;
            file.flush().await.map_err(StaticDataError::io(dest))?;
        }

        debug!("Downloaded: {} -> {:?} ({} bytes)", url, dest, bytes.len());
        Ok(bytes.len() as u64)
    }

    // ── Batch concurrent downloads ──────────────────────

    /// Download many files concurrently using `buffer_unordered`.
    ///
    /// Returns the list of files that failed (if any).
    pub async fn download_batch(
        &self,
        entries: Vec<DownloadEntry>,
    ) -> Vec<(DownloadEntry, StaticDataError)> {
        info!(
            "Starting batch download: {} files, concurrency={}",
            entries.len(),
            self.concurrency
        );

        let results: Vec<_> = stream::iter(entries)
            .map(|entry| async move {
                let result = self.download_file(&entry.url, &entry.dest).await;
                (entry, result)
            })
            .buffer_unordered(self.concurrency)
            .collect()
            .await;

        results
            .into_iter()
            .filter_map(|(entry, result)| match result {
                Ok(_) => None,
                Err(e) => Some((entry, e)),
            })
            .collect()
    }

    /// Like [`Downloader::download_batch`], but any failure fails the batch.
    pub async fn download_all(&self, entries: Vec<DownloadEntry>) -> StaticDataResult<()> {
        let total = entries.len();
        let mut failures = self.download_batch(entries).await;
        match failures.pop() {
            None => Ok(()),
            Some((entry, error)) => {
                tracing::warn!(
                    "{} of {} downloads failed, last: {} ({})",
                    failures.len() + 1,
                    total,
                    entry.url,
                    error
                );
                Err(error)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncReadExt;
    use tokio::net::TcpListener;

    /// Minimal HTTP server: `/ok/*` answers `hello`, everything else 404.
    async fn serve_fixed_files() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                tokio::spawn(async move {
                    let mut buf = [0u8; 1024];
                    let n = socket.read(&mut buf).await.unwrap_or(0);
                    let request = String::from_utf8_lossy(&buf[..n]);
                    let response = if request.starts_with("GET /ok/") {
                        "HTTP/1.1 200 OK\r\nContent-Length: 5\r\nConnection: close\r\n\r\nhello"
                    } else {
                        "HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\nConnection: close\r\n\r\n"
                    };
                    let _ = socket.write_all(response.as_bytes()).await;
                    let _ = socket.shutdown().await;
                });
            }
        });
        format!("http://{}", addr)
    }

    fn downloader() -> Downloader {
        let client = Client::builder().no_proxy().build().unwrap();
        Downloader::new(client).with_concurrency(2)
    }

    fn entry(base: &str, path: &str, dest: &Path) -> DownloadEntry {
        DownloadEntry {
            url: format!("{}{}", base, path),
            dest: dest.to_path_buf(),
        }
    }

    #[tokio::test]
    async fn one_failure_fails_the_whole_batch() {
        let base = serve_fixed_files().await;
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("sprite/item0.png");
        let bad = dir.path().join("sprite/item1.png");

        let result = downloader()
            .download_all(vec![
                entry(&base, "/ok/item0.png", &good),
                entry(&base, "/missing/item1.png", &bad),
            ])
            .await;

        assert!(matches!(
            result,
            Err(StaticDataError::DownloadFailed { status: 404, .. })
        ));
        assert_eq!(std::fs::read_to_string(&good).unwrap(), "hello");
        assert!(!bad.exists());
    }

    #[tokio::test]
    async fn batch_reports_only_failed_entries() {
        let base = serve_fixed_files().await;
        let dir = tempfile::tempdir().unwrap();

        let failures = downloader()
            .download_batch(vec![
                entry(&base, "/ok/a.png", &dir.path().join("a.png")),
                entry(&base, "/ok/b.png", &dir.path().join("b.png")),
                entry(&base, "/gone.png", &dir.path().join("c.png")),
            ])
            .await;

        assert_eq!(failures.len(), 1);
        assert!(failures[0].0.url.ends_with("/gone.png"));
        assert!(dir.path().join("a.png").exists());
        assert!(dir.path().join("b.png").exists());
    }

    #[tokio::test]
    async fn successful_batch_is_ok() {
        let base = serve_fixed_files().await;
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("rune/img/Conqueror.png");

        downloader()
            .download_all(vec![entry(&base, "/ok/Conqueror.png", &dest)])
            .await
            .unwrap();
        downloader().download_all(Vec::new()).await.unwrap();

        assert_eq!(std::fs::metadata(&dest).unwrap().len(), 5);
    }
}
