//! Output file writing
//!
//! Each document is written to a sibling temp file and renamed into place, so
//! a reader never sees a half-written playlist or guide.

use std::path::{Path, PathBuf};
use tracing::debug;

use crate::config::{OutputConfig, render_region_template};
use crate::errors::{AppError, AppResult};
use crate::models::Region;

#[derive(Debug, Clone)]
pub struct OutputWriter {
    directory: PathBuf,
    playlist_pattern: String,
    guide_pattern: String,
}

impl OutputWriter {
    pub fn new(config: &OutputConfig) -> Self {
        Self {
            directory: config.directory.clone(),
            playlist_pattern: config.playlist_pattern.clone(),
            guide_pattern: config.guide_pattern.clone(),
        }
    }

    pub fn playlist_path(&self, region: &Region) -> PathBuf {
        self.directory
            .join(render_region_template(&self.playlist_pattern, region.code()))
    }

    pub fn guide_path(&self, region: &Region) -> PathBuf {
        self.directory
            .join(render_region_template(&self.guide_pattern, region.code()))
    }

    /// Write `contents` to a temp file beside `path`, creating the directory
    /// if needed. Returns the temp path for [`publish`](Self::publish).
    async fn stage(path: &Path, contents: &str) -> AppResult<PathBuf> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| AppError::io(parent.display().to_string(), e))?;
        }

        let mut temp_name = path.file_name().unwrap_or_default().to_os_string();
        temp_name.push(".tmp");
        let temp_path = path.with_file_name(temp_name);

        tokio::fs::write(&temp_path, contents)
            .await
            .map_err(|e| AppError::io(temp_path.display().to_string(), e))?;
        Ok(temp_path)
    }

    /// Rename a staged temp file into place
    async fn publish(temp_path: &Path, path: &Path) -> AppResult<()> {
        if let Err(e) = tokio::fs::rename(temp_path, path).await {
            let _ = tokio::fs::remove_file(temp_path).await;
            return Err(AppError::io(path.display().to_string(), e));
        }
        Ok(())
    }

    /// Write `contents` to `path` via a temp file in the same directory
    pub async fn write_atomic(path: &Path, contents: &str) -> AppResult<()> {
        let temp_path = Self::stage(path, contents).await?;
        Self::publish(&temp_path, path).await?;
        debug!("Wrote {} bytes to {}", contents.len(), path.display());
        Ok(())
    }

    /// Write both documents for a region, returning their paths. Both temp
    /// files are written before either is renamed, so a failed write leaves
    /// the previous pair untouched.
    pub async fn write_region(
        &self,
        region: &Region,
        playlist: &str,
        guide: &str,
    ) -> AppResult<(PathBuf, PathBuf)> {
        let playlist_path = self.playlist_path(region);
        let guide_path = self.guide_path(region);

        let playlist_temp = Self::stage(&playlist_path, playlist).await?;
        let guide_temp = match Self::stage(&guide_path, guide).await {
            Ok(temp) => temp,
            Err(e) => {
                let _ = tokio::fs::remove_file(&playlist_temp).await;
                return Err(e);
            }
        };

        Self::publish(&playlist_temp, &playlist_path).await?;
        Self::publish(&guide_temp, &guide_path).await?;
        debug!(
            "Wrote {} and {} for {}",
            playlist_path.display(),
            guide_path.display(),
            region
        );
        Ok((playlist_path, guide_path))
    }
}
