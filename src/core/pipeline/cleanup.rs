use std::collections::HashSet;
use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};

use itertools::Itertools;
use tokio::fs;

/// Remembers what `work_dir` held before a request so that everything the
/// request added can be removed afterwards.
#[derive(Clone, Debug)]
pub struct ArtifactTracker {
    work_dir: PathBuf,
    baseline: Option<HashSet<OsString>>,
}

async fn list_entries(dir: &Path) -> io::Result<HashSet<OsString>> {
    let mut entries = fs::read_dir(dir).await?;
    let mut names = HashSet::new();
    while let Some(entry) = entries.next_entry().await? {
        names.insert(entry.file_name());
    }
    Ok(names)
}

async fn remove(path: &Path) -> io::Result<bool> {
    let metadata = match fs::symlink_metadata(path).await {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(false),
        Err(e) => return Err(e),
    };
    if metadata.is_dir() {
        fs::remove_dir_all(path).await?;
    } else {
        fs::remove_file(path).await?;
    }
    Ok(true)
}

impl ArtifactTracker {
    pub async fn snapshot(work_dir: &Path) -> Self {
        let baseline = match list_entries(work_dir).await {
            Ok(names) => Some(names),
            Err(e) => {
                tracing::warn!(
                    dir = %work_dir.display(),
                    error = %e,
                    "cannot list work directory, only declared artifacts will be removed"
                );
                None
            }
        };
        Self {
            work_dir: work_dir.to_path_buf(),
            baseline,
        }
    }

    /// Removes `declared` plus every entry that appeared since the snapshot.
    /// Returns how many entries were removed. Failures are logged, never raised.
    pub async fn sweep(&self, declared: &[PathBuf]) -> usize {
        let mut targets: Vec<PathBuf> = declared.to_vec();
        if let Some(baseline) = &self.baseline {
            match list_entries(&self.work_dir).await {
                Ok(current) => targets.extend(
                    current
                        .into_iter()
                        .filter(|name| !baseline.contains(name))
                        .map(|name| self.work_dir.join(name)),
                ),
                Err(e) => tracing::warn!(
                    dir = %self.work_dir.display(),
                    error = %e,
                    "cannot list work directory for cleanup"
                ),
            }
        }

        let mut removed = 0;
        for target in targets.into_iter().unique() {
            match remove(&target).await {
                Ok(true) => {
                    tracing::trace!(path = %target.display(), "artifact removed");
                    removed += 1;
                }
                Ok(false) => {}
                Err(e) => tracing::warn!(
                    path = %target.display(),
                    error = %e,
                    "failed to remove generated artifact"
                ),
            }
        }
        removed
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    fn listing(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[tokio::test]
    async fn test_sweep_removes_new_entries_only() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("Main.java"), "class Main {}").unwrap();
        let tracker = ArtifactTracker::snapshot(dir.path()).await;

        std::fs::write(dir.path().join("Main.class"), b"\xca\xfe").unwrap();
        std::fs::create_dir(dir.path().join("__pycache__")).unwrap();
        std::fs::write(dir.path().join("__pycache__/x.pyc"), b"").unwrap();

        let removed = tracker.sweep(&[]).await;

        assert_eq!(removed, 2);
        assert_eq!(listing(dir.path()), vec!["Main.java"]);
    }

    #[tokio::test]
    async fn test_sweep_removes_stale_declared_artifacts() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("main.out"), b"stale").unwrap();
        let tracker = ArtifactTracker::snapshot(dir.path()).await;

        let removed = tracker
            .sweep(&[dir.path().join("main.out"), dir.path().join("never-built")])
            .await;

        assert_eq!(removed, 1);
        assert!(listing(dir.path()).is_empty());
    }

    #[tokio::test]
    async fn test_missing_work_dir_is_tolerated() {
        let dir = TempDir::new().unwrap();
        let tracker = ArtifactTracker::snapshot(&dir.path().join("missing")).await;
        assert_eq!(tracker.sweep(&[]).await, 0);
    }
}
