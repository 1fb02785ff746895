use std::path::{Path, PathBuf};

use crate::{
    classify::{self, Classification},
    core::{
        domain::{ExecutionRequest, Language, ToolchainCommand},
        traits::{
            process::ProcessOutput,
            toolchain::{Toolchain, ToolchainError, ToolchainPlan},
        },
    },
};

/// `go run` builds into its own cache, so there is no separate compile step.
#[derive(Clone, Debug)]
pub struct GoToolchain {
    go: PathBuf,
}

impl GoToolchain {
    pub fn new<P: AsRef<Path>>(go: P) -> Self {
        Self {
            go: go.as_ref().into(),
        }
    }
}

impl Toolchain for GoToolchain {
    fn language(&self) -> Language {
        Language::Go
    }

    fn prepare(&self, _request: &ExecutionRequest) -> Result<ToolchainPlan, ToolchainError> {
        Ok(ToolchainPlan::script())
    }

    fn compile_command(
        &self,
        _request: &ExecutionRequest,
        _plan: &ToolchainPlan,
    ) -> Option<ToolchainCommand> {
        None
    }

    fn run_command(&self, request: &ExecutionRequest, _plan: &ToolchainPlan) -> ToolchainCommand {
        ToolchainCommand::new(&self.go, &request.work_dir)
            .arg("run")
            .args(request.source_files())
    }

    fn classify(&self, _plan: &ToolchainPlan, output: &ProcessOutput) -> Classification {
        classify::classify_exit(output)
    }
}
