//! Uploaded assets on local disk, addressed by generated names

use std::path::{Component, Path, PathBuf};

use tokio::fs;
use tracing::{error, info};
use uuid::Uuid;

use crate::{errors::NavigationError, models::UploadReceipt};

const RESOURCE: &str = "File";

/// Longest extension carried over from the original filename
const MAX_EXTENSION_LEN: usize = 16;

/// A stored upload read back from disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    pub content: Vec<u8>,
    pub content_type: &'static str,
}

#[derive(Debug, Clone)]
pub struct UploadStore {
    dir: PathBuf,
    /// Public path under which stored files are served, e.g. `/api/uploads`
    public_path: String,
}

impl UploadStore {
    pub fn new(dir: impl Into<PathBuf>, public_path: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            public_path: public_path.into(),
        }
    }

    /// Write `content` under a fresh name keeping the original extension
    pub async fn store(
        &self,
        original_name: Option<&str>,
        content: &[u8],
    ) -> Result<UploadReceipt, NavigationError> {
        let file_name = generated_name(original_name);
        let path = self.dir.join(&file_name);

        fs::write(&path, content).await.map_err(|e| {
            error!("Failed to write upload {}: {}", path.display(), e);
            e
        })?;

        info!("Stored upload {} ({} bytes)", file_name, content.len());
        Ok(UploadReceipt {
            success: true,
            url: format!("{}/{}", self.public_path, file_name),
        })
    }

    /// Read back a stored file by its generated name
    pub async fn retrieve(&self, file_name: &str) -> Result<StoredFile, NavigationError> {
        if !is_plain_name(file_name) {
            return Err(NavigationError::NotFound(RESOURCE));
        }

        let path = self.dir.join(file_name);
        match fs::metadata(&path).await {
            Ok(metadata) if metadata.is_file() => {}
            Ok(_) => return Err(NavigationError::NotFound(RESOURCE)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(NavigationError::NotFound(RESOURCE))
            }
            Err(e) => return Err(e.into()),
        }

        match fs::read(&path).await {
            Ok(content) => Ok(StoredFile {
                content,
                content_type: content_type(file_name),
            }),
            // Removed since the metadata check
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(NavigationError::NotFound(RESOURCE))
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// UUID plus the original extension when it is a sane one
fn generated_name(original_name: Option<&str>) -> String {
    let extension = original_name
        .and_then(|name| Path::new(name).extension())
        .and_then(|ext| ext.to_str())
        .filter(|ext| ext.len() <= MAX_EXTENSION_LEN && ext.chars().all(|c| c.is_ascii_alphanumeric()));

    match extension {
        Some(ext) => format!("{}.{}", Uuid::new_v4(), ext),
        None => Uuid::new_v4().to_string(),
    }
}

/// A single visible path component, the only shape `generated_name` produces
fn is_plain_name(name: &str) -> bool {
    if name.is_empty() || name.starts_with('.') || name.contains(['/', '\\']) {
        return false;
    }
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

fn content_type(file_name: &str) -> &'static str {
    let extension = Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());

    match extension.as_deref() {
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("svg") => "image/svg+xml",
        Some("ico") => "image/x-icon",
        Some("bmp") => "image/bmp",
        Some("pdf") => "application/pdf",
        Some("json") => "application/json",
        Some("txt") => "text/plain; charset=utf-8",
        _ => "application/octet-stream",
    }
}
