use std::ffi::{OsStr, OsString};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use itertools::Itertools;
use uuid::Uuid;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Language {
    Python,
    Java,
    JavaScript,
    Cpp,
    Go,
}

impl Language {
    pub const ALL: [Language; 5] = [
        Language::Python,
        Language::Java,
        Language::JavaScript,
        Language::Cpp,
        Language::Go,
    ];

    /// Human-readable tag, as written by the translation layer.
    pub fn name(&self) -> &'static str {
        match self {
            Language::Python => "Python",
            Language::Java => "Java",
            Language::JavaScript => "JavaScript",
            Language::Cpp => "C++",
            Language::Go => "Go",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Language::Python => "py",
            Language::Java => "java",
            Language::JavaScript => "js",
            Language::Cpp => "cpp",
            Language::Go => "go",
        }
    }

    /// Lower-case tag used in `<source>_to_<target>` directory names.
    pub fn dir_tag(&self) -> &'static str {
        match self {
            Language::Python => "python",
            Language::Java => "java",
            Language::JavaScript => "javascript",
            Language::Cpp => "cpp",
            Language::Go => "go",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, thiserror::Error)]
#[error("Unsupported language: {0}")]
pub struct UnsupportedLanguage(pub String);

impl FromStr for Language {
    type Err = UnsupportedLanguage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "python" | "py" => Ok(Language::Python),
            "java" => Ok(Language::Java),
            "javascript" | "js" | "node" => Ok(Language::JavaScript),
            "c++" | "cpp" | "cxx" => Ok(Language::Cpp),
            "go" | "golang" => Ok(Language::Go),
            _ => Err(UnsupportedLanguage(s.to_string())),
        }
    }
}

/// One problem instance handed to the orchestrator.
#[derive(Clone, Debug)]
pub struct ExecutionRequest {
    pub id: Uuid,
    pub language: Language,
    pub solution_path: PathBuf,
    pub test_path: Option<PathBuf>,
    pub work_dir: PathBuf,
}

impl ExecutionRequest {
    pub fn new<S, W>(language: Language, solution_path: S, test_path: Option<PathBuf>, work_dir: W) -> Self
    where
        S: Into<PathBuf>,
        W: Into<PathBuf>,
    {
        Self {
            id: Uuid::new_v4(),
            language,
            solution_path: solution_path.into(),
            test_path,
            work_dir: work_dir.into(),
        }
    }

    /// Request whose work directory is the directory holding the solution.
    pub fn for_solution<S: Into<PathBuf>>(language: Language, solution_path: S) -> Self {
        let solution_path = solution_path.into();
        let work_dir = match solution_path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        Self::new(language, solution_path, None, work_dir)
    }

    pub fn with_work_dir<W: Into<PathBuf>>(self, work_dir: W) -> Self {
        Self {
            work_dir: work_dir.into(),
            ..self
        }
    }

    pub fn with_test<T: Into<PathBuf>>(self, test_path: T) -> Self {
        Self {
            test_path: Some(test_path.into()),
            ..self
        }
    }

    /// Solution first, then the test file when there is one.
    pub fn source_files(&self) -> Vec<&Path> {
        std::iter::once(self.solution_path.as_path())
            .chain(self.test_path.as_deref())
            .collect()
    }
}

/// A concrete subprocess invocation. Built by the toolchain adapters, never persisted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ToolchainCommand {
    pub program: OsString,
    pub args: Vec<OsString>,
    pub cwd: PathBuf,
}

impl ToolchainCommand {
    pub fn new<P, C>(program: P, cwd: C) -> Self
    where
        P: AsRef<OsStr>,
        C: Into<PathBuf>,
    {
        Self {
            program: program.as_ref().to_os_string(),
            args: Vec::new(),
            cwd: cwd.into(),
        }
    }

    pub fn arg<A: AsRef<OsStr>>(mut self, arg: A) -> Self {
        self.args.push(arg.as_ref().to_os_string());
        self
    }

    pub fn args<I, A>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: AsRef<OsStr>,
    {
        self.args
            .extend(args.into_iter().map(|a| a.as_ref().to_os_string()));
        self
    }

    pub fn program_lossy(&self) -> String {
        self.program.to_string_lossy().into_owned()
    }

    pub fn args_lossy(&self) -> Vec<String> {
        self.args
            .iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }
}

impl fmt::Display for ToolchainCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program_lossy())?;
        if !self.args.is_empty() {
            write!(f, " {}", self.args_lossy().iter().join(" "))?;
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TestStats {
    pub passed: u32,
    pub total: u32,
}

impl TestStats {
    pub fn new(passed: u32, total: u32) -> Self {
        Self { passed, total }
    }

    /// Nothing passed out of whatever was statically known.
    pub fn failed(total: u32) -> Self {
        Self { passed: 0, total }
    }
}

impl fmt::Display for TestStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.passed, self.total)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FailureKind {
    Compilation,
    Test,
    Timeout,
    Fault,
}

/// Verdict for one request.
///
/// Fields are read-only; the constructors keep a failed compilation from
/// reporting passing tests and set `test_error` only after a successful
/// compilation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExecutionResult {
    compilation_success: bool,
    tests_passed: bool,
    compilation_error: String,
    test_error: String,
    raw_output: String,
    test_stats: TestStats,
    failure: Option<FailureKind>,
}

impl ExecutionResult {
    pub fn compilation_failed(
        error: String,
        raw_output: String,
        known_total: u32,
        kind: FailureKind,
    ) -> Self {
        Self {
            compilation_success: false,
            tests_passed: false,
            compilation_error: error,
            test_error: String::new(),
            raw_output,
            test_stats: TestStats::failed(known_total),
            failure: Some(kind),
        }
    }

    pub fn passed(raw_output: String, stats: TestStats) -> Self {
        Self {
            compilation_success: true,
            tests_passed: true,
            compilation_error: String::new(),
            test_error: String::new(),
            raw_output,
            test_stats: stats,
            failure: None,
        }
    }

    pub fn tests_failed(
        error: String,
        raw_output: String,
        stats: TestStats,
        kind: FailureKind,
    ) -> Self {
        Self {
            compilation_success: true,
            tests_passed: false,
            compilation_error: String::new(),
            test_error: error,
            raw_output,
            test_stats: stats,
            failure: Some(kind),
        }
    }

    pub fn compilation_success(&self) -> bool {
        self.compilation_success
    }

    pub fn tests_passed(&self) -> bool {
        self.tests_passed
    }

    /// Empty unless compilation failed.
    pub fn compilation_error(&self) -> &str {
        &self.compilation_error
    }

    /// Empty unless compilation succeeded and the tests did not pass.
    pub fn test_error(&self) -> &str {
        &self.test_error
    }

    /// Stdout followed by stderr of the last step that ran.
    pub fn raw_output(&self) -> &str {
        &self.raw_output
    }

    pub fn test_stats(&self) -> TestStats {
        self.test_stats
    }

    pub fn failure(&self) -> Option<FailureKind> {
        self.failure
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExecutionStage {
    Compiling,
    Running,
    Classifying,
    Cleanup,
    Done,
}
