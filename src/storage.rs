// src/storage.rs
//! Upload store: the capability to persist uploaded documents under their
//! sanitized names and serve them back later. Injected so the relay core
//! carries no hidden filesystem dependency.

use crate::error::CvMatchError;
use crate::normalize::NormalizedFile;
use std::collections::HashMap;
use std::future::Future;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::debug;

/// Stores bytes under a name, retrieves them by name.
///
/// Writing an existing name silently overwrites it, and nothing is ever
/// evicted. Both are inherited contract, not accidents.
pub trait UploadStore {
    fn write(
        &self,
        name: &str,
        content: &[u8],
    ) -> impl Future<Output = Result<(), CvMatchError>> + Send;

    fn read(&self, name: &str) -> impl Future<Output = Result<Vec<u8>, CvMatchError>> + Send;

    fn exists(&self, name: &str) -> impl Future<Output = bool> + Send;
}

/// Persist every normalized file before the relay call goes out. Staged
/// bytes stay on disk even when the subsequent relay fails; there is no
/// compensating cleanup.
pub async fn stage_uploads<S: UploadStore>(
    store: &S,
    files: &[NormalizedFile],
) -> Result<(), CvMatchError> {
    for file in files {
        store.write(&file.name, &file.data).await?;
    }
    Ok(())
}

/// Disk-backed store rooted at the configured upload directory.
#[derive(Debug, Clone)]
pub struct FsUploadStore {
    root: PathBuf,
}

impl FsUploadStore {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Names are single path segments; the sanitizer already strips
    /// separators, the store enforces its own boundary anyway.
    fn resolve(&self, name: &str) -> Result<PathBuf, CvMatchError> {
        if name.is_empty() || name == ".." || name.contains('/') || name.contains('\\') {
            return Err(CvMatchError::Validation(format!(
                "Invalid stored file name: {name}"
            )));
        }
        Ok(self.root.join(name))
    }
}

impl UploadStore for FsUploadStore {
    async fn write(&self, name: &str, content: &[u8]) -> Result<(), CvMatchError> {
        let path = self.resolve(name)?;
        debug!("Writing upload: {}", path.display());
        tokio::fs::write(&path, content).await?;
        Ok(())
    }

    async fn read(&self, name: &str) -> Result<Vec<u8>, CvMatchError> {
        let path = self.resolve(name)?;
        match tokio::fs::read(&path).await {
            Ok(content) => Ok(content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(CvMatchError::DoesNotExist(name.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn exists(&self, name: &str) -> bool {
        match self.resolve(name) {
            Ok(path) => tokio::fs::metadata(path).await.is_ok(),
            Err(_) => false,
        }
    }
}

/// In-memory stand-in for tests.
#[derive(Debug, Default)]
pub struct MemoryUploadStore {
    files: Mutex<HashMap<String, Vec<u8>>>,
}

impl UploadStore for MemoryUploadStore {
    async fn write(&self, name: &str, content: &[u8]) -> Result<(), CvMatchError> {
        self.files
            .lock()
            .expect("upload store lock poisoned")
            .insert(name.to_string(), content.to_vec());
        Ok(())
    }

    async fn read(&self, name: &str) -> Result<Vec<u8>, CvMatchError> {
        self.files
            .lock()
            .expect("upload store lock poisoned")
            .get(name)
            .cloned()
            .ok_or_else(|| CvMatchError::DoesNotExist(name.to_string()))
    }

    async fn exists(&self, name: &str) -> bool {
        self.files
            .lock()
            .expect("upload store lock poisoned")
            .contains_key(name)
    }
}
