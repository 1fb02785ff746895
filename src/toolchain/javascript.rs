use std::path::{Path, PathBuf};

use crate::{
    classify::{self, Classification},
    core::{
        domain::{ExecutionRequest, Language, ToolchainCommand},
        traits::{
            process::ProcessOutput,
            toolchain::{RunMode, Toolchain, ToolchainError, ToolchainPlan},
        },
    },
    toolchain::{file_name, read_source, resolve_dependency},
};

#[derive(Clone, Debug)]
pub struct JavaScriptToolchain {
    node: PathBuf,
    test_runner: PathBuf,
}

impl JavaScriptToolchain {
    pub fn new<N: AsRef<Path>, T: AsRef<Path>>(node: N, test_runner: T) -> Self {
        Self {
            node: node.as_ref().into(),
            test_runner: test_runner.as_ref().into(),
        }
    }
}

impl Toolchain for JavaScriptToolchain {
    fn language(&self) -> Language {
        Language::JavaScript
    }

    fn prepare(&self, request: &ExecutionRequest) -> Result<ToolchainPlan, ToolchainError> {
        match &request.test_path {
            Some(test_path) => {
                let source = read_source(test_path)?;
                let expected = classify::javascript::count_test_declarations(&source);
                let runner = resolve_dependency(&request.work_dir, &self.test_runner, expected)?;
                Ok(ToolchainPlan::discovery(expected).with_dependency(runner))
            }
            None => Ok(ToolchainPlan::script()),
        }
    }

    fn compile_command(
        &self,
        request: &ExecutionRequest,
        _plan: &ToolchainPlan,
    ) -> Option<ToolchainCommand> {
        Some(
            ToolchainCommand::new(&self.node, &request.work_dir)
                .arg("--check")
                .arg(&request.solution_path),
        )
    }

    fn run_command(&self, request: &ExecutionRequest, plan: &ToolchainPlan) -> ToolchainCommand {
        match (&plan.dependency, &request.test_path) {
            (Some(runner), Some(test_path)) if plan.mode == RunMode::Discovery => {
                ToolchainCommand::new(runner, &request.work_dir)
                    .arg("--ci")
                    .arg(file_name(test_path))
            }
            _ => ToolchainCommand::new(&self.node, &request.work_dir).arg(&request.solution_path),
        }
    }

    fn classify(&self, plan: &ToolchainPlan, output: &ProcessOutput) -> Classification {
        match plan.mode {
            RunMode::Discovery => classify::javascript::classify_runner(plan.expected_tests, output),
            RunMode::Script => classify::classify_exit(output),
        }
    }
}
