//! Append-only, human-readable results file.
//!
//! Downstream aggregation splits on the delimiter line and matches
//! `Compilation successful: True` / `Tests passed: N/M` literally, so the
//! block layout must not change.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use tokio::{fs::OpenOptions, io::AsyncWriteExt};

use crate::{constants::LEDGER_DELIMITER, core::domain::ExecutionResult};

#[derive(Debug, thiserror::Error)]
#[error("failed to append to ledger {}: {source}", path.display())]
pub struct LedgerError {
    pub path: PathBuf,
    #[source]
    pub source: std::io::Error,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LedgerMode {
    /// `Tests passed: True|False`, for tests taken from the dataset.
    #[default]
    Verdict,
    /// `Tests passed: passed/total`, for generated tests.
    Stats,
}

#[derive(Clone, Debug)]
pub struct Ledger {
    path: PathBuf,
    mode: LedgerMode,
}

fn py_bool(value: bool) -> &'static str {
    if value { "True" } else { "False" }
}

fn ascii_lossy(text: &str) -> String {
    text.chars()
        .map(|c| if c.is_ascii() { c } else { '?' })
        .collect()
}

impl Ledger {
    pub fn new<P: AsRef<Path>>(path: P, mode: LedgerMode) -> Self {
        Self {
            path: path.as_ref().into(),
            mode,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn render(index: usize, result: &ExecutionResult, mode: LedgerMode) -> String {
        let mut block = String::new();
        // Writing into a String cannot fail.
        let _ = writeln!(block, "Problem {index}:");
        let _ = writeln!(
            block,
            "Compilation successful: {}",
            py_bool(result.compilation_success())
        );
        match mode {
            LedgerMode::Verdict => {
                let _ = writeln!(block, "Tests passed: {}", py_bool(result.tests_passed()));
            }
            LedgerMode::Stats => {
                let _ = writeln!(block, "Tests passed: {}", result.test_stats());
            }
        }
        if !result.compilation_error().is_empty() {
            let _ = writeln!(block, "Compilation error: {}", result.compilation_error());
        }
        if !result.test_error().is_empty() {
            let _ = writeln!(block, "Test error: {}", ascii_lossy(result.test_error()));
        }
        block.push_str(LEDGER_DELIMITER);
        block.push('\n');
        block
    }

    pub async fn append(&self, index: usize, result: &ExecutionResult) -> Result<(), LedgerError> {
        let block = Self::render(index, result, self.mode);
        let map_err = |source| LedgerError {
            path: self.path.clone(),
            source,
        };

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(map_err)?;
        file.write_all(block.as_bytes()).await.map_err(map_err)?;
        file.flush().await.map_err(map_err)?;

        tracing::debug!(index, path = %self.path.display(), "ledger block appended");
        Ok(())
    }
}
