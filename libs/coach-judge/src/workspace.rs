use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::fs;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::JudgeError;

/// Process-wide sequence component of workspace names. The UUID alone
/// is collision-free; the counter keeps directory listings readable
/// and strictly ordered when debugging a busy host.
static WORKSPACE_SEQ: AtomicU64 = AtomicU64::new(0);

/// An isolated scratch directory owned by exactly one in-flight
/// evaluation. Holds the submitted source, the compiled artifact, and
/// any per-test files. Never shared across requests.
///
/// Dropping an unreleased workspace removes the directory best-effort,
/// so cleanup also runs on panic and early-return paths.
#[derive(Debug)]
pub struct Workspace {
    dir: PathBuf,
    released: bool,
}

impl Workspace {
    /// Create a fresh, uniquely named workspace under `root`.
    ///
    /// Two concurrent calls can never return aliasing paths: the name
    /// combines an atomic counter with freshly generated random bits.
    pub async fn acquire(root: &Path) -> Result<Self, JudgeError> {
        let seq = WORKSPACE_SEQ.fetch_add(1, Ordering::Relaxed);
        let dir = root.join(format!("eval-{seq}-{}", Uuid::new_v4().simple()));

        fs::create_dir_all(&dir)
            .await
            .map_err(|source| JudgeError::WorkspaceCreate {
                root: root.to_path_buf(),
                source,
            })?;

        debug!(workspace = %dir.display(), "workspace acquired");
        Ok(Self {
            dir,
            released: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.dir
    }

    /// Workspace-local path for `name`.
    pub fn file(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }

    /// Write `contents` into the workspace file `name`.
    pub async fn write(&self, name: &str, contents: &str) -> Result<PathBuf, JudgeError> {
        let path = self.file(name);
        fs::write(&path, contents)
            .await
            .map_err(|source| JudgeError::WorkspaceWrite {
                path: path.clone(),
                source,
            })?;
        Ok(path)
    }

    /// Remove the workspace and everything in it. Tolerates files a
    /// child process already deleted or never created.
    pub async fn release(mut self) {
        if let Err(e) = fs::remove_dir_all(&self.dir).await {
            warn!(workspace = %self.dir.display(), error = %e, "workspace cleanup failed");
        } else {
            debug!(workspace = %self.dir.display(), "workspace released");
        }
        self.released = true;
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        if !self.released {
            // Synchronous fallback for panic/cancellation paths.
            if let Err(e) = std::fs::remove_dir_all(&self.dir) {
                if e.kind() != std::io::ErrorKind::NotFound {
                    warn!(workspace = %self.dir.display(), error = %e, "workspace drop cleanup failed");
                }
            }
        }
    }
}
