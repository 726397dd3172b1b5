//! Front page image download.

use crate::error::Result;
use reqwest::Client;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tokio::fs;
use tracing::{info, instrument};

/// Extension given to every saved front page.
pub const FILE_EXT: &str = "jpg";

/// Where the front page of paper `id` is saved inside `folder`.
pub fn image_path(folder: &Path, id: &str) -> PathBuf {
    folder.join(format!("{id}.{FILE_EXT}"))
}

/// Fetch `url` and write the body to `dest`, creating or truncating it.
#[instrument(level = "info", skip(client, dest), fields(dest = %dest.display()))]
pub async fn download(client: &Client, url: &str, dest: &Path) -> Result<()> {
    let t0 = Instant::now();
    let bytes = client
        .get(url)
        .send()
        .await?
        .error_for_status()?
        .bytes()
        .await?;
    save(dest, &bytes).await?;
    info!(
        bytes = bytes.len(),
        elapsed_ms = t0.elapsed().as_millis() as u64,
        "Downloaded front page image"
    );
    Ok(())
}

async fn save(dest: &Path, bytes: &[u8]) -> Result<()> {
    fs::write(dest, bytes).await?;
    Ok(())
}
