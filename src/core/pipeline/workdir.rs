use std::io;
use std::path::{Path, PathBuf};

use tokio::sync::{Mutex, MutexGuard};

/// The working directory is process-wide, so only one guard may be live.
static WORKING_DIR_LOCK: Mutex<()> = Mutex::const_new(());

/// Switches the process into a directory and switches back on drop,
/// including when the holder unwinds.
#[derive(Debug)]
pub struct WorkingDirGuard {
    previous: PathBuf,
    _lock: MutexGuard<'static, ()>,
}

impl WorkingDirGuard {
    pub async fn enter(dir: &Path) -> io::Result<Self> {
        let lock = WORKING_DIR_LOCK.lock().await;
        let previous = std::env::current_dir()?;
        std::env::set_current_dir(dir)?;
        tracing::trace!(from = %previous.display(), to = %dir.display(), "entered directory");
        Ok(Self {
            previous,
            _lock: lock,
        })
    }

    pub fn previous(&self) -> &Path {
        &self.previous
    }
}

impl Drop for WorkingDirGuard {
    fn drop(&mut self) {
        if let Err(e) = std::env::set_current_dir(&self.previous) {
            tracing::warn!(
                dir = %self.previous.display(),
                error = %e,
                "failed to restore working directory"
            );
        }
    }
}
