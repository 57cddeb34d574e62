//! Download generated images into the session folder
//!
//! Failures here are soft: they are logged and the attempt is recorded as
//! absent so the batch can continue.

use std::path::Path;

use reqwest::Client;
use tracing::{debug, warn};

use super::{image_file_name, ImageAttempt, StoredImage};
use crate::openai::ImageReference;

/// Fetch the referenced image and write it as `generated_image_<index>.png`
///
/// The folder is created if missing. Exactly one download is attempted.
pub async fn fetch_and_store(
    http: &Client,
    reference: &ImageReference,
    folder: &Path,
    index: usize,
) -> ImageAttempt {
    if let Err(e) = tokio::fs::create_dir_all(folder).await {
        warn!("Failed to create folder {}: {}", folder.display(), e);
        return ImageAttempt::absent(index, format!("failed to create folder: {}", e));
    }

    let data = match reference {
        ImageReference::Url(url) => match download(http, url).await {
            Ok(data) => data,
            Err(reason) => {
                warn!("Image {} not downloaded: {}", index, reason);
                return ImageAttempt::absent(index, reason);
            }
        },
        ImageReference::Inline(data) => data.clone(),
    };

    let path = folder.join(image_file_name(index));
    if let Err(e) = tokio::fs::write(&path, &data).await {
        warn!("Failed to write {}: {}", path.display(), e);
        return ImageAttempt::absent(index, format!("failed to write image: {}", e));
    }

    debug!("Stored image {} ({} bytes) at {}", index, data.len(), path.display());
    ImageAttempt::stored(StoredImage { index, path })
}

async fn download(http: &Client, url: &str) -> Result<Vec<u8>, String> {
    debug!("Downloading image from: {}", url);

    let response = http
        .get(url)
        .send()
        .await
        .map_err(|e| format!("Failed to fetch image: {}", e))?;

    if !response.status().is_success() {
        return Err(format!("HTTP error: {}", response.status()));
    }

    let data = response
        .bytes()
        .await
        .map_err(|e| format!("Failed to read image bytes: {}", e))?;

    Ok(data.to_vec())
}
