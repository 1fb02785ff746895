//! One adapter per target language, selected through [`ToolchainSet`].

pub mod cpp;
pub mod go;
pub mod java;
pub mod javascript;
pub mod python;

use std::collections::HashMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::{
    config::HarnessConfig,
    core::{
        domain::Language,
        traits::toolchain::{Toolchain, ToolchainError},
    },
};

pub use cpp::CppToolchain;
pub use go::GoToolchain;
pub use java::JavaToolchain;
pub use javascript::JavaScriptToolchain;
pub use python::PythonToolchain;

#[derive(Clone, Debug, Default)]
pub struct ToolchainSet {
    toolchains: HashMap<Language, Arc<dyn Toolchain>>,
}

impl ToolchainSet {
    pub fn from_config(config: &HarnessConfig) -> Self {
        Self::default()
            .with(Arc::new(PythonToolchain::new(&config.python)))
            .with(Arc::new(JavaToolchain::new(
                &config.javac,
                &config.java,
                &config.junit_jar,
            )))
            .with(Arc::new(JavaScriptToolchain::new(&config.node, &config.jest)))
            .with(Arc::new(CppToolchain::new(&config.cxx)))
            .with(Arc::new(GoToolchain::new(&config.go)))
    }

    /// Registers `toolchain`, replacing any adapter for the same language.
    pub fn with(mut self, toolchain: Arc<dyn Toolchain>) -> Self {
        self.toolchains.insert(toolchain.language(), toolchain);
        self
    }

    pub fn get(&self, language: Language) -> Option<Arc<dyn Toolchain>> {
        self.toolchains.get(&language).cloned()
    }
}

pub(crate) fn read_source(path: &Path) -> Result<String, ToolchainError> {
    std::fs::read_to_string(path).map_err(|source| ToolchainError::ReadSource {
        path: path.to_path_buf(),
        source,
    })
}

/// Bare file name, for tools that are launched from inside the work directory.
pub(crate) fn file_name(path: &Path) -> OsString {
    path.file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_else(|| path.as_os_str().to_os_string())
}

pub(crate) fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Auxiliary dependencies are configured relative to the work directory.
/// `expected_tests` is reported with the error so a faulted request still
/// knows its test total.
pub(crate) fn resolve_dependency(
    work_dir: &Path,
    configured: &Path,
    expected_tests: u32,
) -> Result<PathBuf, ToolchainError> {
    let path = if configured.is_absolute() {
        configured.to_path_buf()
    } else {
        work_dir.join(configured)
    };
    if path.exists() {
        Ok(path)
    } else {
        Err(ToolchainError::MissingDependency {
            path,
            expected_tests,
        })
    }
}
