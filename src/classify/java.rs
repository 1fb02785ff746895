//! JUnit console launcher summaries and plain `java` runs.

use std::sync::LazyLock;

use regex::Regex;

use crate::{
    classify::{Classification, classify_exit, failure_text},
    core::{domain::TestStats, traits::process::ProcessOutput},
};

static TESTS_FOUND: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[\s*(\d+)\s+tests?\s+found\s*\]").expect("valid regex"));
static TESTS_SUCCESSFUL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[\s*(\d+)\s+tests?\s+successful\s*\]").expect("valid regex")
});
/// `@Test` at the start of a line, possibly after other annotations there.
static TEST_ANNOTATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^[ \t]*(?:@\w+(?:\([^)\n]*\))?[ \t]+)*@Test\b").expect("valid regex")
});

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Banner {
    pub found: Option<u32>,
    pub successful: Option<u32>,
}

impl Banner {
    pub fn is_absent(&self) -> bool {
        self.found.is_none() && self.successful.is_none()
    }
}

pub fn parse_banner(text: &str) -> Banner {
    Banner {
        found: first_count(&TESTS_FOUND, text),
        successful: first_count(&TESTS_SUCCESSFUL, text),
    }
}

fn first_count(re: &Regex, text: &str) -> Option<u32> {
    re.captures(text)
        .and_then(|caps| caps[1].parse::<u32>().ok())
}

pub fn count_test_annotations(source: &str) -> u32 {
    TEST_ANNOTATION.find_iter(source).count() as u32
}

/// A program launched through its `main` method.
pub fn classify_main(output: &ProcessOutput) -> Classification {
    classify_exit(output)
}

pub fn classify_discovery(expected: u32, output: &ProcessOutput) -> Classification {
    let text = output.combined();
    let banner = parse_banner(&text);

    if banner.is_absent() {
        // No summary at all: only the exit status is left to go on.
        let stats = TestStats::failed(expected);
        return if output.success() {
            Classification::pass(TestStats::new(expected, expected))
        } else {
            Classification::fail(stats, failure_text(output))
        };
    }

    match (banner.found, banner.successful) {
        (Some(found), Some(successful)) => {
            let stats = TestStats::new(successful, found);
            if output.success() && found == successful && found > 0 {
                Classification::pass(stats)
            } else {
                Classification::fail(stats, failure_text(output))
            }
        }
        (found, _) => Classification::fail(
            TestStats::failed(found.unwrap_or(expected)),
            failure_text(output),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::output;

    const SUMMARY: &str = "
Test run finished after 64 ms
[         3 containers found      ]
[         0 containers skipped    ]
[         3 containers started    ]
[         7 tests found           ]
[         0 tests skipped         ]
[         7 tests started         ]
[         0 tests aborted         ]
[         5 tests successful      ]
[         2 tests failed          ]
";

    #[test]
    fn test_compact_banner() {
        let result = classify_discovery(7, &output(0, "[ 7 tests found ][ 5 tests successful ]", ""));
        assert_eq!(result.stats, TestStats::new(5, 7));
        assert!(!result.tests_passed);
    }

    #[test]
    fn test_padded_banner() {
        assert_eq!(
            parse_banner(SUMMARY),
            Banner {
                found: Some(7),
                successful: Some(5)
            }
        );
        let result = classify_discovery(7, &output(1, SUMMARY, ""));
        assert!(!result.tests_passed);
        assert_eq!(result.stats, TestStats::new(5, 7));
    }

    #[test]
    fn test_all_successful() {
        let text = "[ 1 test found ]\n[ 1 test successful ]\n";
        let result = classify_discovery(1, &output(0, text, ""));
        assert!(result.tests_passed);
        assert_eq!(result.stats, TestStats::new(1, 1));
    }

    #[test]
    fn test_zero_tests_found_is_not_a_pass() {
        let text = "[ 0 tests found ]\n[ 0 tests successful ]\n";
        let result = classify_discovery(0, &output(0, text, ""));
        assert!(!result.tests_passed);
    }

    #[test]
    fn test_malformed_banner_fails_with_raw_output() {
        let text = "[ 4 tests found ]\n(output truncated)";
        let result = classify_discovery(4, &output(0, text, ""));
        assert!(!result.tests_passed);
        assert_eq!(result.stats, TestStats::new(0, 4));
        assert!(result.error.unwrap().contains("output truncated"));
    }

    #[test]
    fn test_partial_banner_reports_output() {
        let text = "[ 3 tests found ]\n";
        assert_eq!(
            parse_banner(text),
            Banner {
                found: Some(3),
                successful: None,
            }
        );

        let result = classify_discovery(3, &output(0, text, ""));
        assert!(!result.tests_passed);
        assert_eq!(result.stats, TestStats::new(0, 3));
        assert_eq!(result.error.as_deref(), Some("[ 3 tests found ]"));
    }

    #[test]
    fn test_missing_banner_falls_back_to_exit_status() {
        let passed = classify_discovery(2, &output(0, "done", ""));
        assert!(passed.tests_passed);
        assert_eq!(passed.stats, TestStats::new(2, 2));

        let failed = classify_discovery(2, &output(1, "", "boom"));
        assert!(!failed.tests_passed);
        assert_eq!(failed.stats, TestStats::new(0, 2));
    }

    #[test]
    fn test_counts_annotations() {
        let source = r#"
class SolutionTest {
    @Test
    void a() {}
    @Test void b() {}
    @DisplayName("edge case") @Test
    void c() {}
    @Tag("slow") @Timeout(5) @Test void d() {}
    @Override
    @Test
    void e() {}
    // @Test disabled
    @TestFactory
    Stream<DynamicTest> f() { return null; }
}"#;
        assert_eq!(count_test_annotations(source), 5);
    }

    #[test]
    fn test_exception_in_main_output_fails() {
        let result = classify_main(&output(0, "Exception in thread main", ""));
        assert!(!result.tests_passed);
    }
}
