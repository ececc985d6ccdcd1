// src/environment.rs
use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing::info;

/// Process-environment configuration, read once at startup.
#[derive(Debug, Clone)]
pub struct EnvironmentConfig {
    /// Base URL of the external evaluation service.
    pub eval_service_url: String,
    /// Root of the upload store.
    pub upload_dir: PathBuf,
}

impl EnvironmentConfig {
    pub fn load() -> Result<Self> {
        let eval_service_url = std::env::var("EVAL_SERVICE_URL")
            .context("EVAL_SERVICE_URL environment variable not set")?;

        let upload_dir = std::env::var("UPLOAD_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("uploads"));

        Ok(Self {
            eval_service_url,
            upload_dir,
        })
    }

    /// Ensure the upload store root exists before the server starts.
    pub async fn ensure_directories(&self) -> Result<()> {
        tokio::fs::create_dir_all(&self.upload_dir)
            .await
            .with_context(|| {
                format!(
                    "Failed to create upload directory: {}",
                    self.upload_dir.display()
                )
            })?;

        info!("Upload directory: {}", self.upload_dir.display());
        Ok(())
    }
}
