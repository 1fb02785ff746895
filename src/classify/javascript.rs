//! Jest summaries.

use std::sync::LazyLock;

use regex::Regex;

use crate::{
    classify::{Classification, failure_text},
    core::{domain::TestStats, traits::process::ProcessOutput},
};

static TEST_DECLARATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(?:test|it)\s*\(").expect("valid regex"));
static PASSED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)\s+passed").expect("valid regex"));
static TOTAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)\s+total").expect("valid regex"));

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Summary {
    pub passed: u32,
    pub total: u32,
}

/// Calls to `test(` or `it(` in the test source.
pub fn count_test_declarations(source: &str) -> u32 {
    TEST_DECLARATION.find_iter(source).count() as u32
}

/// Parses the `Tests:` line. `None` when it is missing or has no total.
pub fn parse_summary(text: &str) -> Option<Summary> {
    let line = text
        .lines()
        .map(str::trim_start)
        .find(|line| line.starts_with("Tests:"))?;
    let total = TOTAL
        .captures(line)
        .and_then(|caps| caps[1].parse().ok())?;
    let passed = PASSED
        .captures(line)
        .and_then(|caps| caps[1].parse().ok())
        .unwrap_or(0);
    Some(Summary { passed, total })
}

pub fn classify_runner(expected: u32, output: &ProcessOutput) -> Classification {
    let text = output.combined();
    let Some(summary) = parse_summary(&text) else {
        return Classification::fail(TestStats::failed(expected), failure_text(output));
    };

    let total = if expected > 0 { expected } else { summary.total };
    let stats = TestStats::new(summary.passed, total);
    if output.success() && summary.passed == total && summary.total == total && total > 0 {
        Classification::pass(stats)
    } else {
        Classification::fail(stats, failure_text(output))
    }
}
