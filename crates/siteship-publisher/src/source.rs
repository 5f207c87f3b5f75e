//! Generated site artifacts.

use std::path::PathBuf;

use async_trait::async_trait;
use tokio::fs;

use siteship_core::deploy::{GeneratedFile, SiteSource};
use siteship_core::{Error, ResourceId, Result};

/// Reads a subscription's generated files from `<root>/<subscription-id>/`.
///
/// The site generator owns that layout; this only reads it back. Files are
/// returned in name order so deploys are reproducible.
pub struct FsSiteSource {
    root: PathBuf,
}

impl FsSiteSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl SiteSource for FsSiteSource {
    async fn generated_files(&self, subscription_id: ResourceId) -> Result<Vec<GeneratedFile>> {
        let dir = self.root.join(subscription_id.to_string());
        let mut entries = fs::read_dir(&dir)
            .await
            .map_err(|e| Error::Internal(format!("site directory {}: {}", dir.display(), e)))?;

        let mut files = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| Error::Internal(e.to_string()))?
        {
            let file_type = entry
                .file_type()
                .await
                .map_err(|e| Error::Internal(e.to_string()))?;
            if !file_type.is_file() {
                continue;
            }
            let path = entry.path();
            let content = fs::read_to_string(&path)
                .await
                .map_err(|e| Error::Internal(format!("read {}: {}", path.display(), e)))?;
            files.push(GeneratedFile {
                name: entry.file_name().to_string_lossy().into_owned(),
                content,
            });
        }

        files.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(files)
    }
}
