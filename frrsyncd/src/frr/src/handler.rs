use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::{config::Config, error::Error};

/// Sink for assembled FRR configurations.
///
/// Implementations must be idempotent: applying the same configuration
/// twice leaves the daemon in the same observable state. The reconciler
/// never calls a handler from more than one task at a time.
#[async_trait]
pub trait FrrHandler: Send + Sync {
    async fn apply_config(&self, config: &Config) -> Result<(), Error>;
}

/// Writes the assembled configuration to a file picked up by the FRR
/// reloader sidecar. Rendering the file into frr.conf and reloading the
/// daemon is the sidecar's job.
pub struct FileHandler {
    path: PathBuf,
}

impl FileHandler {
    pub fn new<P: AsRef<Path>>(path: P) -> FileHandler {
        FileHandler {
            path: path.as_ref().to_path_buf(),
        }
    }
}

#[async_trait]
impl FrrHandler for FileHandler {
    async fn apply_config(&self, config: &Config) -> Result<(), Error> {
        let rendered = serde_json::to_vec(config).map_err(Error::Serialization)?;
        tokio::fs::write(&self.path, rendered).await?;
        tracing::info!(
            path = %self.path.display(),
            routers = config.routers.len(),
            "wrote FRR configuration"
        );
        Ok(())
    }
}
