use chrono::{DateTime, Local};
use std::{fs, path::PathBuf, time::Duration};
use tracing::info;

use crate::{
    config::{ScrapingConfig, SnapshotConfig},
    error::{Result, ScraperError},
};

const MAX_RETRIES: u32 = 2;
const INITIAL_RETRY_DELAY: Duration = Duration::from_secs(1);

/// Downloads the dashboard page. The page is not rendered, so anything the
/// site builds client-side will be missing from the snapshot.
pub struct SnapshotFetcher {
    client: reqwest::Client,
    retry_delay: Duration,
}

impl SnapshotFetcher {
    pub fn new(config: &ScrapingConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            retry_delay: INITIAL_RETRY_DELAY,
        })
    }

    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    async fn fetch_once(&self, url: &str) -> Result<String> {
        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(ScraperError::Status(response.status()));
        }
        Ok(response.text().await?)
    }

    pub async fn fetch(&self, url: &str) -> Result<String> {
        let mut delay = self.retry_delay;
        let mut attempt = 1;

        loop {
            info!("Navigating to {} (attempt {})", url, attempt);
            match self.fetch_once(url).await {
                Ok(html) => {
                    info!("Fetched {} bytes from {}", html.len(), url);
                    return Ok(html);
                }
                Err(e) => {
                    if attempt >= MAX_RETRIES {
                        return Err(e);
                    }
                    info!("Retry attempt {} after error: {}", attempt, e);
                    tokio::time::sleep(delay).await;
                    delay *= 2;
                    attempt += 1;
                }
            }
        }
    }
}

pub fn archive_path(config: &SnapshotConfig, now: DateTime<Local>) -> PathBuf {
    config
        .archive_dir
        .join(format!("gt_dashboard_{}.html", now.format("%Y%m%d_%H%M")))
}

/// Writes the latest snapshot and a timestamped archive copy. Returns the archive path.
pub fn save_snapshot(html: &str, config: &SnapshotConfig, now: DateTime<Local>) -> Result<PathBuf> {
    if let Some(parent) = config.path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&config.path, html)?;

    fs::create_dir_all(&config.archive_dir)?;
    let archive = archive_path(config, now);
    fs::write(&archive, html)?;

    info!("Snapshot saved to {:?} and {:?}", config.path, archive);
    Ok(archive)
}
