use std::path::PathBuf;
use std::time::Duration;

use crate::{
    classify::Classification,
    core::{
        domain::{ExecutionRequest, Language, ToolchainCommand},
        traits::process::{ProcessError, ProcessOutput, ProcessRunner},
    },
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunMode {
    /// Execute the program and judge it by exit status and output markers.
    Script,
    /// Hand the test file to an external runner and parse its report.
    Discovery,
}

/// Per-request metadata computed before anything is compiled.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ToolchainPlan {
    pub mode: RunMode,
    /// Class to launch, for toolchains that launch by identifier.
    pub entry: Option<String>,
    /// Statically counted test total, 0 when not derivable.
    pub expected_tests: u32,
    /// Files and directories this request is known to generate.
    pub artifacts: Vec<PathBuf>,
    /// Resolved auxiliary test dependency (runner jar or binary).
    pub dependency: Option<PathBuf>,
}

impl ToolchainPlan {
    pub fn script() -> Self {
        Self {
            mode: RunMode::Script,
            entry: None,
            expected_tests: 0,
            artifacts: Vec::new(),
            dependency: None,
        }
    }

    pub fn discovery(expected_tests: u32) -> Self {
        Self {
            mode: RunMode::Discovery,
            expected_tests,
            ..Self::script()
        }
    }

    pub fn with_entry<S: Into<String>>(self, entry: S) -> Self {
        Self {
            entry: Some(entry.into()),
            ..self
        }
    }

    pub fn with_artifacts(self, artifacts: Vec<PathBuf>) -> Self {
        Self { artifacts, ..self }
    }

    pub fn with_dependency(self, dependency: PathBuf) -> Self {
        Self {
            dependency: Some(dependency),
            ..self
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ToolchainError {
    #[error("missing auxiliary test dependency at {}", path.display())]
    MissingDependency { path: PathBuf, expected_tests: u32 },
    #[error("failed to read {}: {source}", path.display())]
    ReadSource {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ToolchainError {
    /// Tests counted from the sources before the error was hit.
    pub fn expected_tests(&self) -> u32 {
        match self {
            ToolchainError::MissingDependency { expected_tests, .. } => *expected_tests,
            ToolchainError::ReadSource { .. } => 0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CompileOutcome {
    /// The toolchain compiles and runs in one step.
    Skipped,
    Succeeded(ProcessOutput),
    Failed(ProcessOutput),
}

#[async_trait::async_trait]
pub trait Toolchain: std::fmt::Debug + Send + Sync {
    fn language(&self) -> Language;

    fn prepare(&self, request: &ExecutionRequest) -> Result<ToolchainPlan, ToolchainError>;

    fn compile_command(
        &self,
        request: &ExecutionRequest,
        plan: &ToolchainPlan,
    ) -> Option<ToolchainCommand>;

    fn run_command(&self, request: &ExecutionRequest, plan: &ToolchainPlan) -> ToolchainCommand;

    fn classify(&self, plan: &ToolchainPlan, output: &ProcessOutput) -> Classification;

    /// Whether the run step expects the process working directory to be `work_dir`.
    fn run_from_work_dir(&self, plan: &ToolchainPlan) -> bool {
        plan.mode == RunMode::Discovery
    }

    async fn compile(
        &self,
        runner: &dyn ProcessRunner,
        request: &ExecutionRequest,
        plan: &ToolchainPlan,
        deadline: Option<Duration>,
    ) -> Result<CompileOutcome, ProcessError> {
        let Some(command) = self.compile_command(request, plan) else {
            return Ok(CompileOutcome::Skipped);
        };
        tracing::debug!(%command, "compile");
        let output = runner.execute(&command, deadline).await?;
        if output.success() {
            Ok(CompileOutcome::Succeeded(output))
        } else {
            Ok(CompileOutcome::Failed(output))
        }
    }

    async fn run(
        &self,
        runner: &dyn ProcessRunner,
        request: &ExecutionRequest,
        plan: &ToolchainPlan,
        deadline: Option<Duration>,
    ) -> Result<ProcessOutput, ProcessError> {
        let command = self.run_command(request, plan);
        tracing::debug!(%command, "run");
        runner.execute(&command, deadline).await
    }
}
