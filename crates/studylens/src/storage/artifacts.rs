use std::path::{Path, PathBuf};

use tokio::io::AsyncWriteExt;

use super::{ensure_directory, remove_if_exists};
use crate::error::ArtifactError;

/// Generated artifacts (narration audio), addressed by opaque locators that
/// are bare file names inside the artifact directory.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    directory: PathBuf,
}

impl ArtifactStore {
    pub fn new<P: AsRef<Path>>(directory: P) -> Self {
        Self {
            directory: directory.as_ref().to_path_buf(),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn audio_locator(content_id: &str) -> String {
        format!("audio_{}.mp3", content_id)
    }

    /// Writes narration audio for an item and returns its locator.
    pub async fn write_audio(
        &self,
        content_id: &str,
        audio: &[u8],
    ) -> Result<String, ArtifactError> {
        let locator = Self::audio_locator(content_id);
        let path = self.resolve(&locator)?;
        ensure_directory(&self.directory).await?;

        let created = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await;

        let result = match created {
            Ok(mut file) => {
                async {
                    file.write_all(audio).await?;
                    file.flush().await
                }
                .await
            }
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                log::warn!("Replacing existing artifact {}", locator);
                tokio::fs::write(&path, audio).await
            }
            Err(e) => Err(e),
        };

        result.map_err(|e| ArtifactError::WriteFile {
            path: path.clone(),
            source: e,
        })?;

        log::debug!("Wrote artifact {} ({} bytes)", locator, audio.len());
        Ok(locator)
    }

    /// Maps a locator to its path, rejecting anything that is not a bare file name.
    pub fn resolve(&self, locator: &str) -> Result<PathBuf, ArtifactError> {
        let is_bare_name = !locator.is_empty()
            && locator != "."
            && locator != ".."
            && !locator.contains(['/', '\\'])
            && Path::new(locator).file_name().and_then(|n| n.to_str()) == Some(locator);

        if !is_bare_name {
            return Err(ArtifactError::InvalidLocator(locator.to_string()));
        }
        Ok(self.directory.join(locator))
    }

    pub async fn read(&self, locator: &str) -> Result<Option<Vec<u8>>, ArtifactError> {
        let path = self.resolve(locator)?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(ArtifactError::ReadFile { path, source: e }),
        }
    }

    /// Removes an artifact. Returns false if it did not exist.
    pub async fn remove(&self, locator: &str) -> Result<bool, ArtifactError> {
        let path = self.resolve(locator)?;
        let removed = remove_if_exists(&path).await?;
        if removed {
            log::debug!("Removed artifact {}", locator);
        }
        Ok(removed)
    }
}
