//! Filesystem areas owned by the service: incoming uploads and generated artifacts.

pub mod artifacts;
pub mod uploads;

use std::path::Path;

use crate::error::ArtifactError;

pub use artifacts::ArtifactStore;
pub use uploads::UploadStore;

async fn ensure_directory(path: &Path) -> Result<(), ArtifactError> {
    tokio::fs::create_dir_all(path)
        .await
        .map_err(|e| ArtifactError::CreateDirectory {
            path: path.to_path_buf(),
            source: e,
        })
}

/// Removes a file, treating "already gone" as success. Returns whether a file
/// was actually removed.
async fn remove_if_exists(path: &Path) -> Result<bool, ArtifactError> {
    match tokio::fs::remove_file(path).await {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(ArtifactError::RemoveFile {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}
