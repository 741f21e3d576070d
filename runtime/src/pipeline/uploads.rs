use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use uuid::Uuid;

use super::types::UploadedFile;

#[async_trait]
pub trait FileRepository: Send + Sync {
    async fn create_dir_all(&self, path: &Path) -> Result<()>;
    async fn write(&self, path: &Path, bytes: &[u8]) -> Result<()>;
    async fn read(&self, path: &Path) -> Result<Vec<u8>>;
    async fn remove(&self, path: &Path) -> Result<()>;
    fn exists(&self, path: &Path) -> bool;
}

#[derive(Debug, Default, Clone)]
pub struct FsFileRepository;

#[async_trait]
impl FileRepository for FsFileRepository {
    async fn create_dir_all(&self, path: &Path) -> Result<()> {
        tokio::fs::create_dir_all(path)
            .await
            .with_context(|| format!("failed to create directory {}", path.display()))
    }

    async fn write(&self, path: &Path, bytes: &[u8]) -> Result<()> {
        tokio::fs::write(path, bytes)
            .await
            .with_context(|| format!("failed to write file {}", path.display()))
    }

    async fn read(&self, path: &Path) -> Result<Vec<u8>> {
        tokio::fs::read(path)
            .await
            .with_context(|| format!("failed to read file {}", path.display()))
    }

    async fn remove(&self, path: &Path) -> Result<()> {
        tokio::fs::remove_file(path)
            .await
            .with_context(|| format!("failed to remove file {}", path.display()))
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }
}

/// Owns the transient uploads directory.
///
/// Staged names are qualified with a timestamp and a random suffix, so two
/// requests never share a path and no locking is needed.
#[derive(Clone)]
pub struct UploadStore {
    dir: PathBuf,
    file_repo: Arc<dyn FileRepository>,
}

impl UploadStore {
    pub async fn new<P>(dir: P) -> Result<Self>
    where
        P: AsRef<Path>,
    {
        Self::with_repository(dir, Arc::new(FsFileRepository)).await
    }

    pub async fn with_repository<P>(dir: P, file_repo: Arc<dyn FileRepository>) -> Result<Self>
    where
        P: AsRef<Path>,
    {
        let dir = dir.as_ref().to_path_buf();
        file_repo
            .create_dir_all(&dir)
            .await
            .with_context(|| format!("failed to create uploads directory at {}", dir.display()))?;
        Ok(Self { dir, file_repo })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn file_repo(&self) -> Arc<dyn FileRepository> {
        self.file_repo.clone()
    }

    pub fn sanitize_filename(&self, raw: &str) -> Result<String> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(anyhow!("filename cannot be empty"));
        }

        if trimmed.contains("..") || trimmed.contains('/') || trimmed.contains('\\') {
            return Err(anyhow!("invalid filename"));
        }

        Ok(trimmed.to_string())
    }

    /// Write an upload to disk under a unique name and hand back its handle.
    pub async fn stage(
        &self,
        original_name: &str,
        content_type: &str,
        bytes: &[u8],
    ) -> Result<UploadedFile> {
        let safe_name = self.sanitize_filename(original_name)?;
        let path = self.dir.join(unique_name(&safe_name));
        self.file_repo.write(&path, bytes).await?;

        Ok(UploadedFile {
            path,
            content_type: content_type.to_string(),
            original_name: safe_name,
            size: bytes.len() as u64,
        })
    }
}

fn unique_name(safe_name: &str) -> String {
    let millis = chrono::Utc::now().timestamp_millis();
    let suffix = Uuid::new_v4().simple().to_string();
    format!("{}-{}-{}", millis, &suffix[..8], safe_name)
}
