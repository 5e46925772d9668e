// File-backed plan store
//
// The tier comes from the configured license. Trial consumption is a fuse
// file per identity, created with `create_new` so that only one process can
// ever create it.

use super::traits::PlanStore;
use crate::error::WardenError;
use crate::plan::{PlanIdentity, PlanState, PlanTier};
use async_trait::async_trait;
use sha2::{Digest, Sha256};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

const COLLABORATOR: &str = "plan-file";

/// Plan store keeping trial fuses under a state directory
#[derive(Debug, Clone)]
pub struct FilePlanStore {
    state_dir: PathBuf,
    tier: PlanTier,
}

impl FilePlanStore {
    pub fn new(state_dir: impl Into<PathBuf>, tier: PlanTier) -> Self {
        Self {
            state_dir: state_dir.into(),
            tier,
        }
    }

    pub fn state_dir(&self) -> &Path {
        &self.state_dir
    }

    /// Fuse file of `identity`; the name does not reveal the identity
    pub fn fuse_path(&self, identity: &PlanIdentity) -> PathBuf {
        let digest = Sha256::digest(identity.as_str().as_bytes());
        self.state_dir.join(format!("{}.trial", hex::encode(digest)))
    }
}

fn io_error(action: &str, path: &Path, err: std::io::Error) -> WardenError {
    WardenError::upstream(
        COLLABORATOR,
        None,
        format!("Failed to {} {}: {}", action, path.display(), err),
    )
}

#[async_trait]
impl PlanStore for FilePlanStore {
    async fn load(&self, identity: &PlanIdentity) -> crate::Result<PlanState> {
        let path = self.fuse_path(identity);
        let trial_consumed = tokio::fs::try_exists(&path)
            .await
            .map_err(|e| io_error("inspect", &path, e))?;

        Ok(PlanState {
            tier: self.tier,
            trial_consumed,
        })
    }

    async fn commit_trial_consumed(&self, identity: &PlanIdentity) -> crate::Result<bool> {
        tokio::fs::create_dir_all(&self.state_dir)
            .await
            .map_err(|e| io_error("create", &self.state_dir, e))?;

        let path = self.fuse_path(identity);
        let file = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await;

        match file {
            Ok(mut file) => {
                let stamp = format!("used {}\n", chrono::Utc::now().to_rfc3339());
                file.write_all(stamp.as_bytes())
                    .await
                    .map_err(|e| io_error("write", &path, e))?;
                Ok(true)
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => Ok(false),
            Err(e) => Err(io_error("create", &path, e)),
        }
    }

    fn store_name(&self) -> &str {
        COLLABORATOR
    }
}
