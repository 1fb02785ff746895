//! Pulls source text out of a raw model response.

use std::sync::LazyLock;

use regex::Regex;

static FENCED_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```[\w+#-]*\n(.*?)\n```").expect("valid regex"));
static CODE_SECTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)CODE_BEGIN\n(.*?)\nCODE_END").expect("valid regex"));
static TEST_SECTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)TEST_BEGIN\n(.*?)\nTEST_END").expect("valid regex"));

/// Body of the first fenced block, blank lines dropped; the trimmed text otherwise.
pub fn strip_code_fence(text: &str) -> String {
    let text = text.trim();
    match FENCED_BLOCK.captures(text) {
        Some(caps) => caps[1]
            .trim()
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(str::trim_end)
            .collect::<Vec<_>>()
            .join("\n"),
        None => text.to_string(),
    }
}

/// `(solution, tests)` from `CODE_BEGIN`/`CODE_END` and `TEST_BEGIN`/`TEST_END`.
pub fn split_marked_sections(text: &str) -> (String, String) {
    (section(&CODE_SECTION, text), section(&TEST_SECTION, text))
}

fn section(re: &Regex, text: &str) -> String {
    re.captures(text)
        .map(|caps| caps[1].trim().to_string())
        .unwrap_or_default()
}
