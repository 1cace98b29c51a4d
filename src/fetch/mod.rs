//! Downloading the published availability document.

mod basic;
mod client;

pub use basic::BasicClient;
pub use client::HttpClient;

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::store::unparsed_document_path;

/// GETs `url` and returns the body. Transport errors and non-success statuses
/// are both failures.
pub async fn fetch_bytes<C: HttpClient>(client: &C, url: &str) -> Result<Vec<u8>> {
    let req = reqwest::Request::new(
        reqwest::Method::GET,
        url.parse().with_context(|| format!("invalid url {url}"))?,
    );

    let resp = client.execute(req).await?.error_for_status()?;
    let bytes = resp.bytes().await?;
    debug!(bytes = bytes.len(), "Response body received");
    Ok(bytes.to_vec())
}

/// Downloads the document into `dir` under its `_unparsed` name.
///
/// Nothing is written if the download fails.
#[tracing::instrument(skip(client, dir), fields(dir = %dir.display()))]
pub async fn download_document<C: HttpClient>(
    client: &C,
    url: &str,
    dir: &Path,
    fetched_at: NaiveDateTime,
) -> Result<PathBuf> {
    let bytes = fetch_bytes(client, url).await?;

    fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    let path = unparsed_document_path(dir, fetched_at);
    fs::write(&path, &bytes).with_context(|| format!("writing {}", path.display()))?;

    info!(path = %path.display(), bytes = bytes.len(), "Document downloaded");
    Ok(path)
}
