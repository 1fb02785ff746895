//! `unittest` discovery output.

use std::sync::LazyLock;

use regex::Regex;

use crate::{
    classify::{Classification, failure_text},
    core::{domain::TestStats, traits::process::ProcessOutput},
};

static RAN_TESTS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^Ran (\d+) tests?").expect("valid regex"));

/// Lines that declare a test method.
pub fn count_test_methods(source: &str) -> u32 {
    source
        .lines()
        .filter(|line| line.trim_start().starts_with("def test"))
        .count() as u32
}

/// `FAIL:` and `ERROR:` headers printed once per broken test.
pub fn count_failures(output: &str) -> u32 {
    output
        .lines()
        .filter(|line| line.starts_with("FAIL:") || line.starts_with("ERROR:"))
        .count() as u32
}

pub fn ran_tests(output: &str) -> Option<u32> {
    RAN_TESTS
        .captures(output)
        .and_then(|caps| caps[1].parse().ok())
}

pub fn classify_discovery(expected: u32, output: &ProcessOutput) -> Classification {
    let text = output.combined();
    let total = if expected > 0 {
        expected
    } else {
        ran_tests(&text).unwrap_or(0)
    };
    let failures = count_failures(&text);
    let stats = TestStats::new(total.saturating_sub(failures), total);

    if output.success() && failures == 0 && total > 0 {
        Classification::pass(stats)
    } else {
        Classification::fail(stats, failure_text(output))
    }
}
