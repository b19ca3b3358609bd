// src/services/catalog.rs

//! Program catalog providers.
//!
//! Fetches the program slots of one channel from the catalog service, or
//! from JSON files laid out the same way for offline use.

use std::path::PathBuf;

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use reqwest::Client;
use url::Url;

use crate::error::{AppError, Result};
use crate::models::{CatalogConfig, CatalogResponse, ProgramSlot};
use crate::utils::http::create_async_client;

/// Source of channel catalogs.
#[async_trait]
pub trait CatalogProvider: Send + Sync {
    /// Fetch the current slots of `channel`, with ratings taken from the
    /// `target_group` column.
    async fn fetch(&self, channel: &str, target_group: &str) -> Result<Vec<ProgramSlot>>;
}

/// Convert a catalog response body into slots, skipping rows without an id.
pub fn parse_catalog(channel: &str, target_group: &str, body: &str) -> Result<Vec<ProgramSlot>> {
    let response: CatalogResponse = serde_json::from_str(body)?;
    let total = response.programs.len();
    let slots: Vec<ProgramSlot> = response
        .programs
        .into_iter()
        .filter_map(|record| record.into_slot(channel, target_group))
        .collect();

    if slots.len() < total {
        log::warn!(
            "Skipped {} catalog rows without an id for {}",
            total - slots.len(),
            channel
        );
    }
    Ok(slots)
}

/// Fetch a catalog, treating any failure as an empty catalog.
pub async fn load_or_empty(
    provider: &dyn CatalogProvider,
    channel: &str,
    target_group: &str,
) -> Vec<ProgramSlot> {
    match provider.fetch(channel, target_group).await {
        Ok(slots) => slots,
        Err(error) => {
            log::warn!("Failed to load catalog for {}: {}", channel, error);
            Vec::new()
        }
    }
}

/// Fetch several channels concurrently, bounded by `concurrency`.
///
/// Results come back in completion order.
pub async fn fetch_many(
    provider: &dyn CatalogProvider,
    channels: &[String],
    target_group: &str,
    concurrency: usize,
) -> Vec<(String, Result<Vec<ProgramSlot>>)> {
    stream::iter(channels)
        .map(|channel| async move {
            let result = provider.fetch(channel, target_group).await;
            (channel.clone(), result)
        })
        .buffer_unordered(concurrency.max(1))
        .collect()
        .await
}

/// Catalog service over HTTP: `GET {base_url}/programs?channel=<name>`.
pub struct HttpCatalog {
    client: Client,
    base_url: Url,
}

impl HttpCatalog {
    /// Create a catalog client with the given configuration.
    pub fn new(config: &CatalogConfig) -> Result<Self> {
        Ok(Self {
            client: create_async_client(config)?,
            base_url: Url::parse(&config.base_url)?,
        })
    }

    fn programs_url(&self, channel: &str) -> Result<Url> {
        // `Url::join` would replace the last path segment of a base without
        // a trailing slash.
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| AppError::catalog(channel, "catalog base URL cannot have a path"))?
            .pop_if_empty()
            .push("programs");
        url.query_pairs_mut().append_pair("channel", channel);
        Ok(url)
    }
}

#[async_trait]
impl CatalogProvider for HttpCatalog {
    async fn fetch(&self, channel: &str, target_group: &str) -> Result<Vec<ProgramSlot>> {
        let url = self.programs_url(channel)?;
        log::debug!("Fetching catalog: {}", url);

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(AppError::catalog(channel, format!("HTTP status {status}")));
        }
        let body = response.text().await?;
        parse_catalog(channel, target_group, &body)
    }
}

/// Catalog read from `<dir>/<channel>.json` files.
pub struct FileCatalog {
    dir: PathBuf,
}

impl FileCatalog {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path(&self, channel: &str) -> PathBuf {
        self.dir.join(format!("{channel}.json"))
    }
}

#[async_trait]
impl CatalogProvider for FileCatalog {
    async fn fetch(&self, channel: &str, target_group: &str) -> Result<Vec<ProgramSlot>> {
        let path = self.path(channel);
        let body = match tokio::fs::read_to_string(&path).await {
            Ok(body) => body,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(AppError::catalog(
                    channel,
                    format!("no catalog file at {}", path.display()),
                ));
            }
            Err(e) => return Err(AppError::Io(e)),
        };
        parse_catalog(channel, target_group, &body)
    }
}
