use std::path::{Path, PathBuf};

use tokio::io::AsyncWriteExt;

use super::{ensure_directory, remove_if_exists};
use crate::error::ArtifactError;
use crate::sanitize::redact_path;

/// Scratch area for submitted files. A file lives here from submission until
/// its pipeline run concludes.
#[derive(Debug, Clone)]
pub struct UploadStore {
    directory: PathBuf,
}

impl UploadStore {
    pub fn new<P: AsRef<Path>>(directory: P) -> Self {
        Self {
            directory: directory.as_ref().to_path_buf(),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Writes `content` under a fresh unique name that keeps the original
    /// file's extension, so extractors can still dispatch on it.
    pub async fn save(
        &self,
        original_file_name: &str,
        content: &[u8],
    ) -> Result<PathBuf, ArtifactError> {
        ensure_directory(&self.directory).await?;

        let extension = Path::new(original_file_name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| format!(".{}", e.to_ascii_lowercase()))
            .unwrap_or_default();

        for _ in 0..8 {
            let name = format!("upload_{}{}", uuid::Uuid::new_v4().simple(), extension);
            let path = self.directory.join(name);

            match tokio::fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await
            {
                Ok(mut file) => {
                    let written = async {
                        file.write_all(content).await?;
                        file.flush().await
                    }
                    .await;
                    if let Err(e) = written {
                        let _ = tokio::fs::remove_file(&path).await;
                        return Err(ArtifactError::WriteFile { path, source: e });
                    }
                    log::debug!(
                        "Stored upload {} ({} bytes)",
                        redact_path(&path),
                        content.len()
                    );
                    return Ok(path);
                }
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(ArtifactError::WriteFile { path, source: e }),
            }
        }

        Err(ArtifactError::FileExists(self.directory.clone()))
    }

    /// Removes an upload. Missing files are not an error.
    pub async fn remove(&self, path: &Path) -> Result<(), ArtifactError> {
        if remove_if_exists(path).await? {
            log::debug!("Removed upload {}", redact_path(path));
        }
        Ok(())
    }
}
