// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Artifact fetcher
//!
//! Downloads CI artifacts into a local directory, one file per URL. A file
//! that already exists is returned as-is without touching the network, so
//! re-runs only download what is missing.
//!
//! Bulk downloads run one task per URL behind a semaphore that caps the
//! number of in-flight requests. All tasks are awaited before
//! [`ArtifactFetcher::fetch_all`] returns.
//!
//! There is no retry or timeout: a failed download fails the run, and a
//! stalled one stalls it.

use futures::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::Client;
use std::collections::{HashMap, HashSet};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Semaphore;

use crate::error::{Result, ScreenNoiseError};
use crate::manifest::ArtifactReference;

/// Local paths of downloaded artifacts, keyed by URL
pub type DownloadRecord = HashMap<String, PathBuf>;

/// Artifact downloader with an on-disk cache
#[derive(Debug, Clone)]
pub struct ArtifactFetcher {
    /// HTTP client
    client: Client,
    /// Download directory
    download_dir: PathBuf,
}

impl ArtifactFetcher {
    /// Create a fetcher writing into `download_dir`
    pub fn new(download_dir: PathBuf) -> Result<Self> {
        std::fs::create_dir_all(&download_dir).map_err(|e| {
            ScreenNoiseError::Config(format!("Failed to create download directory: {}", e))
        })?;

        Ok(Self {
            client: Client::new(),
            download_dir,
        })
    }

    /// Get the path where an artifact is stored
    pub fn artifact_path(&self, artifact: &ArtifactReference) -> PathBuf {
        self.download_dir.join(artifact.file_name())
    }

    /// Check if an artifact is already downloaded
    pub fn is_downloaded(&self, artifact: &ArtifactReference) -> bool {
        self.artifact_path(artifact).exists()
    }

    /// Download an artifact unless it is already present
    pub async fn fetch(&self, artifact: &ArtifactReference) -> Result<PathBuf> {
        let path = self.artifact_path(artifact);

        if path.exists() {
            tracing::debug!("Already exists: {}", path.display());
            return Ok(path);
        }

        tracing::info!("Downloading {} to: {}", artifact.url, path.display());

        let response = self.client.get(&artifact.url).send().await?;

        if !response.status().is_success() {
            return Err(ScreenNoiseError::Download {
                url: artifact.url.clone(),
                status: response.status().as_u16(),
            });
        }

        // Stream into a temp file so an interrupted download never looks cached
        let temp_path = partial_path(&path);
        let mut file = std::fs::File::create(&temp_path)?;

        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = match chunk {
                Ok(chunk) => chunk,
                Err(e) => {
                    drop(file);
                    std::fs::remove_file(&temp_path).ok();
                    return Err(e.into());
                }
            };
            file.write_all(&chunk)?;
        }
        drop(file);

        std::fs::rename(&temp_path, &path)?;

        tracing::debug!("Download complete: {}", path.display());
        Ok(path)
    }

    /// Download many artifacts with at most `max_concurrent` requests in flight.
    ///
    /// Every URL is fetched once even if it appears several times. Waits for
    /// all downloads to finish; if any failed, the first failure is returned.
    pub async fn fetch_all(
        &self,
        artifacts: &[ArtifactReference],
        max_concurrent: usize,
    ) -> Result<DownloadRecord> {
        let unique = unique_artifacts(artifacts);

        let permits = max_concurrent.clamp(1, Semaphore::MAX_PERMITS);
        let semaphore = Arc::new(Semaphore::new(permits));
        let progress = download_progress(unique.len() as u64);

        let mut handles = Vec::with_capacity(unique.len());
        for artifact in unique {
            let fetcher = self.clone();
            let semaphore = Arc::clone(&semaphore);
            let progress = progress.clone();

            handles.push(tokio::spawn(async move {
                let _permit = semaphore
                    .acquire_owned()
                    .await
                    .map_err(|e| ScreenNoiseError::Task(e.to_string()))?;
                let path = fetcher.fetch(&artifact).await?;
                progress.inc(1);
                Ok::<_, ScreenNoiseError>((artifact.url, path))
            }));
        }

        let mut record = DownloadRecord::new();
        let mut first_error = None;
        for handle in handles {
            let outcome = handle
                .await
                .map_err(|e| ScreenNoiseError::Task(e.to_string()))
                .and_then(|result| result);
            match outcome {
                Ok((url, path)) => {
                    record.insert(url, path);
                }
                Err(e) => {
                    tracing::warn!("Download failed: {}", e);
                    first_error.get_or_insert(e);
                }
            }
        }
        progress.finish_and_clear();

        match first_error {
            Some(e) => Err(e),
            None => Ok(record),
        }
    }
}

/// First occurrence of every URL, in order. Distinct URLs that share a local
/// file name are kept but reported, since they download to the same path.
fn unique_artifacts(artifacts: &[ArtifactReference]) -> Vec<ArtifactReference> {
    let mut seen_urls: HashSet<&str> = HashSet::new();
    let mut names: HashMap<String, &str> = HashMap::new();
    let mut unique = Vec::new();

    for artifact in artifacts {
        if !seen_urls.insert(artifact.url.as_str()) {
            continue;
        }
        let name = artifact.file_name();
        if let Some(first) = names.get(&name) {
            tracing::warn!(
                "{} and {} share the local file name {}",
                first,
                artifact.url,
                name
            );
        } else {
            names.insert(name, artifact.url.as_str());
        }
        unique.push(artifact.clone());
    }

    unique
}

fn partial_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".part");
    path.with_file_name(name)
}

fn download_progress(total: u64) -> ProgressBar {
    let progress = ProgressBar::new(total);
    progress.set_style(
        ProgressStyle::with_template("{spinner} downloading [{bar:40}] {pos}/{len}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );
    progress
}
