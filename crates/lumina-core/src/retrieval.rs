use std::path::{Path, PathBuf};
use reqwest::Url;
use tracing::{info, warn};
use uuid::Uuid;
use crate::error::{LuminaError, Result};
use crate::operation::Operation;
use crate::request::ApiKey;
use crate::service::VideoService;

/// A downloaded video on local disk.
///
/// The file belongs to whoever holds this value and is deleted when it is
/// released or dropped, unless [`LocalAsset::keep`] was called.
#[derive(Debug)]
pub struct LocalAsset {
    path: PathBuf,
    len: usize,
    keep: bool,
}

impl LocalAsset {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Copy the video to a user-chosen location.
    pub async fn save_as(&self, dest: impl AsRef<Path>) -> Result<()> {
        tokio::fs::copy(&self.path, dest.as_ref()).await?;
        info!("Saved video to {}", dest.as_ref().display());
        Ok(())
    }

    /// Leave the file on disk and hand back its path.
    pub fn keep(mut self) -> PathBuf {
        self.keep = true;
        std::mem::take(&mut self.path)
    }

    pub fn release(self) {
        drop(self);
    }
}

impl Drop for LocalAsset {
    fn drop(&mut self) {
        if self.keep || self.path.as_os_str().is_empty() {
            return;
        }
        match std::fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!("Failed to remove {}: {}", self.path.display(), e),
        }
    }
}

/// Download the single video produced by a finished operation into `output_dir`.
pub async fn fetch_result<S: VideoService + ?Sized>(
    service: &S,
    operation: &Operation,
    key: &ApiKey,
    output_dir: &Path,
) -> Result<LocalAsset> {
    if !operation.done {
        return Err(LuminaError::Validation(format!("operation {} is not finished", operation.name)));
    }

    let uri = operation.asset_uri().ok_or(LuminaError::MissingResult)?;
    info!("Fetching result {}", redact(uri));

    let bytes = service.download(uri, key).await?;
    if bytes.is_empty() {
        return Err(LuminaError::MissingResult);
    }

    tokio::fs::create_dir_all(output_dir).await?;
    // Owned before the write so a failed or abandoned write leaves no file behind
    let mut asset = LocalAsset {
        path: output_dir.join(format!("lumina-{}.mp4", Uuid::new_v4())),
        len: 0,
        keep: false,
    };
    tokio::fs::write(&asset.path, &bytes).await?;
    asset.len = bytes.len();

    info!("Wrote {} bytes to {}", asset.len, asset.path.display());
    Ok(asset)
}

/// Strip the `key` query parameter from a URL before it is shown anywhere.
pub fn redact(url: &str) -> String {
    let Ok(mut parsed) = Url::parse(url) else {
        return url.to_string();
    };

    let pairs: Vec<(String, String)> = parsed
        .query_pairs()
        .filter(|(k, _)| k != "key")
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    if pairs.is_empty() {
        parsed.set_query(None);
    } else {
        parsed.query_pairs_mut().clear().extend_pairs(pairs);
    }
    parsed.to_string()
}
