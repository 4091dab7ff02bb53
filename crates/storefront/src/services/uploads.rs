//! Product image storage on the local filesystem.
//!
//! Images are written to the configured upload directory under a random name
//! and served back at [`PUBLIC_PREFIX`].

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use uuid::Uuid;

/// URL path under which stored images are served.
pub const PUBLIC_PREFIX: &str = "/uploads";

/// Errors that can occur while storing an image.
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("image exceeds the {max} byte limit")]
    TooLarge { max: usize },

    #[error("unsupported image type: {0}")]
    UnsupportedType(String),

    #[error("failed to write image: {0}")]
    Io(#[from] io::Error),
}

/// Filesystem store for product images.
#[derive(Debug, Clone)]
pub struct ImageStore {
    dir: PathBuf,
    max_bytes: usize,
}

impl ImageStore {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>, max_bytes: usize) -> Self {
        Self {
            dir: dir.into(),
            max_bytes,
        }
    }

    /// Directory images are written to.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Largest accepted image, in bytes.
    #[must_use]
    pub const fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    /// Store an image and return its public URL.
    ///
    /// # Errors
    ///
    /// Returns `UploadError::TooLarge` or `UploadError::UnsupportedType` for
    /// rejected uploads, and `UploadError::Io` if the file cannot be written.
    pub async fn save(&self, content_type: &str, bytes: &[u8]) -> Result<String, UploadError> {
        if bytes.len() > self.max_bytes {
            return Err(UploadError::TooLarge {
                max: self.max_bytes,
            });
        }
        let extension = extension_for(content_type)
            .ok_or_else(|| UploadError::UnsupportedType(content_type.to_string()))?;

        tokio::fs::create_dir_all(&self.dir).await?;
        let file_name = format!("{}.{extension}", Uuid::new_v4());
        tokio::fs::write(self.dir.join(&file_name), bytes).await?;

        tracing::debug!(file_name, size = bytes.len(), "stored product image");
        Ok(format!("{PUBLIC_PREFIX}/{file_name}"))
    }

    /// Remove a previously stored image by its public URL.
    ///
    /// URLs outside [`PUBLIC_PREFIX`] and files that are already gone are
    /// ignored.
    ///
    /// # Errors
    ///
    /// Returns the I/O error if an existing file cannot be removed.
    pub async fn delete(&self, url: &str) -> io::Result<()> {
        let Some(path) = self.path_for(url) else {
            tracing::debug!(url, "not a stored image, skipping delete");
            return Ok(());
        };

        match tokio::fs::remove_file(&path).await {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
            _ => Ok(()),
        }
    }

    /// Map a public URL back to a file in the upload directory.
    ///
    /// Only bare file names are accepted so a URL cannot reach outside the
    /// directory.
    fn path_for(&self, url: &str) -> Option<PathBuf> {
        let name = url.strip_prefix(PUBLIC_PREFIX)?.strip_prefix('/')?;
        let is_plain = !name.is_empty()
            && name != ".."
            && !name.contains(['/', '\\'])
            && Path::new(name).file_name().is_some();
        is_plain.then(|| self.dir.join(name))
    }
}

/// File extension for an accepted image MIME type.
fn extension_for(content_type: &str) -> Option<&'static str> {
    match content_type {
        "image/jpeg" | "image/jpg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/gif" => Some("gif"),
        "image/webp" => Some("webp"),
        _ => None,
    }
}
