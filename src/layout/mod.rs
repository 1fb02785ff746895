//! Decides where solution and test sources live on disk.
//!
//! Java ties the file name to the public class name, so its names are
//! derived from the sources. Every other language uses fixed names.

pub mod extract;

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use itertools::Itertools;
use regex::Regex;
use tokio::fs;

use crate::{
    constants::{
        COMBINED_BASENAME, JAVA_COMBINED_CLASS, JAVA_DEFAULT_CLASS, SOLUTION_BASENAME,
        TEST_BASENAME,
    },
    core::domain::{ExecutionRequest, Language},
};

static PUBLIC_CLASS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"public\s+(?:final\s+|abstract\s+)*class\s+(\w+)").expect("valid regex"));
static ANY_CLASS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bclass\s+(\w+)").expect("valid regex"));
static DECLARED_TYPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:class|interface|enum|record)\s+([A-Za-z_]\w*)").expect("valid regex")
});

#[derive(Debug, thiserror::Error)]
pub enum LayoutError {
    #[error("no class declaration found in the Java test source")]
    MissingTestClass,
    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LayoutStyle {
    /// Solution and tests in separate files.
    #[default]
    Separate,
    /// Tests appended to the solution in one entry file.
    Combined,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArtifactLayout {
    pub solution_file: String,
    pub test_file: Option<String>,
}

/// Public class name, else the first class name, of a Java source.
pub fn java_class_name(source: &str) -> Option<String> {
    PUBLIC_CLASS
        .captures(source)
        .or_else(|| ANY_CLASS.captures(source))
        .map(|caps| caps[1].to_string())
}

/// Every top-level or nested type name, in declaration order.
pub fn java_declared_types(source: &str) -> Vec<String> {
    DECLARED_TYPE
        .captures_iter(source)
        .map(|caps| caps[1].to_string())
        .unique()
        .collect()
}

/// `<root>/<source>_to_<target>`.
pub fn pair_dir(root: &Path, source: Language, target: Language) -> PathBuf {
    root.join(format!("{}_to_{}", source.dir_tag(), target.dir_tag()))
}

fn present(source: Option<&str>) -> Option<&str> {
    source.filter(|s| !s.trim().is_empty())
}

pub fn plan(
    language: Language,
    solution_source: &str,
    test_source: Option<&str>,
    style: LayoutStyle,
) -> Result<ArtifactLayout, LayoutError> {
    let test_source = present(test_source);
    let ext = language.extension();

    let layout = match (language, style) {
        (Language::Java, LayoutStyle::Combined) => ArtifactLayout {
            solution_file: format!("{JAVA_COMBINED_CLASS}.java"),
            test_file: None,
        },
        (_, LayoutStyle::Combined) => ArtifactLayout {
            solution_file: format!("{COMBINED_BASENAME}.{ext}"),
            test_file: None,
        },
        (Language::Java, LayoutStyle::Separate) => {
            let class_name = java_class_name(solution_source)
                .unwrap_or_else(|| JAVA_DEFAULT_CLASS.to_string());
            let test_file = match test_source {
                Some(test) => {
                    let test_class = java_class_name(test).ok_or(LayoutError::MissingTestClass)?;
                    Some(format!("{test_class}.java"))
                }
                None => None,
            };
            ArtifactLayout {
                solution_file: format!("{class_name}.java"),
                test_file,
            }
        }
        (_, LayoutStyle::Separate) => ArtifactLayout {
            solution_file: format!("{SOLUTION_BASENAME}.{ext}"),
            test_file: test_source.map(|_| format!("{TEST_BASENAME}.{ext}")),
        },
    };
    Ok(layout)
}

/// Writes the sources into `out_dir` and returns the request that runs them.
#[tracing::instrument(skip(solution_source, test_source))]
pub async fn write(
    out_dir: &Path,
    language: Language,
    solution_source: &str,
    test_source: Option<&str>,
    style: LayoutStyle,
) -> Result<ExecutionRequest, LayoutError> {
    let layout = plan(language, solution_source, test_source, style)?;
    let test_source = present(test_source);

    fs::create_dir_all(out_dir)
        .await
        .map_err(|source| LayoutError::Write {
            path: out_dir.to_path_buf(),
            source,
        })?;

    let solution_path = out_dir.join(&layout.solution_file);
    let solution_contents = match (style, test_source) {
        (LayoutStyle::Combined, Some(tests)) => format!("{solution_source}\n{tests}"),
        _ => solution_source.to_string(),
    };
    write_file(&solution_path, &solution_contents).await?;

    let test_path = match (&layout.test_file, test_source) {
        (Some(name), Some(tests)) => {
            let path = out_dir.join(name);
            write_file(&path, tests).await?;
            Some(path)
        }
        _ => None,
    };

    tracing::debug!(?layout, "sources written");
    Ok(ExecutionRequest::new(language, solution_path, test_path, out_dir))
}

async fn write_file(path: &Path, contents: &str) -> Result<(), LayoutError> {
    fs::write(path, contents)
        .await
        .map_err(|source| LayoutError::Write {
            path: path.to_path_buf(),
            source,
        })
}
