//! Turns captured process output into a pass/fail verdict.
//!
//! Toolchains report results as free text, so every rule here is a
//! substring or regex heuristic. The generic marker list can misfire on a
//! program that legitimately prints one of the markers as data; that is a
//! known limitation and is not special-cased.

pub mod java;
pub mod javascript;
pub mod python;

use crate::core::{
    domain::{ExecutionResult, FailureKind, TestStats},
    traits::process::ProcessOutput,
};

pub const ERROR_MARKERS: [&str; 5] = ["AssertionError", "Error:", "error:", "Exception", "Failed"];

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Classification {
    pub tests_passed: bool,
    pub stats: TestStats,
    /// Set whenever `tests_passed` is false.
    pub error: Option<String>,
}

impl Classification {
    pub fn pass(stats: TestStats) -> Self {
        Self {
            tests_passed: true,
            stats,
            error: None,
        }
    }

    pub fn fail<S: Into<String>>(stats: TestStats, error: S) -> Self {
        Self {
            tests_passed: false,
            stats,
            error: Some(error.into()),
        }
    }

    pub fn into_result(self, raw_output: String) -> ExecutionResult {
        match self.error {
            None if self.tests_passed => ExecutionResult::passed(raw_output, self.stats),
            error => ExecutionResult::tests_failed(
                error.unwrap_or_else(|| raw_output.clone()),
                raw_output,
                self.stats,
                FailureKind::Test,
            ),
        }
    }
}

pub fn find_error_marker(output: &ProcessOutput) -> Option<&'static str> {
    ERROR_MARKERS
        .iter()
        .copied()
        .find(|marker| output.stdout.contains(marker) || output.stderr.contains(marker))
}

/// Text worth showing a human when a step failed.
pub fn failure_text(output: &ProcessOutput) -> String {
    let combined = output.combined();
    let trimmed = combined.trim();
    if !trimmed.is_empty() {
        return trimmed.to_string();
    }
    match output.status {
        Some(code) => format!("process exited with status {code}"),
        None => "process was terminated by a signal".to_string(),
    }
}

/// Exit status plus generic markers. Used by every toolchain that runs a
/// program rather than a test runner.
pub fn classify_exit(output: &ProcessOutput) -> Classification {
    if !output.success() {
        return Classification::fail(TestStats::default(), failure_text(output));
    }
    match find_error_marker(output) {
        Some(marker) => {
            tracing::debug!(marker, "error marker found in output");
            Classification::fail(TestStats::default(), failure_text(output))
        }
        None => Classification::pass(TestStats::default()),
    }
}

#[cfg(test)]
pub(crate) fn output(status: i32, stdout: &str, stderr: &str) -> ProcessOutput {
    ProcessOutput {
        status: Some(status),
        stdout: stdout.to_string(),
        stderr: stderr.to_string(),
        elapsed_ms: 1,
    }
}
