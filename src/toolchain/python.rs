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
    toolchain::{file_name, read_source},
};

#[derive(Clone, Debug)]
pub struct PythonToolchain {
    interpreter: PathBuf,
}

impl PythonToolchain {
    pub fn new<P: AsRef<Path>>(interpreter: P) -> Self {
        Self {
            interpreter: interpreter.as_ref().into(),
        }
    }
}

impl Toolchain for PythonToolchain {
    fn language(&self) -> Language {
        Language::Python
    }

    fn prepare(&self, request: &ExecutionRequest) -> Result<ToolchainPlan, ToolchainError> {
        let plan = match &request.test_path {
            Some(test_path) => {
                let source = read_source(test_path)?;
                ToolchainPlan::discovery(classify::python::count_test_methods(&source))
            }
            None => ToolchainPlan::script(),
        };
        Ok(plan.with_artifacts(vec![request.work_dir.join("__pycache__")]))
    }

    /// Syntax check only; `py_compile` leaves bytecode in `__pycache__`.
    fn compile_command(
        &self,
        request: &ExecutionRequest,
        _plan: &ToolchainPlan,
    ) -> Option<ToolchainCommand> {
        Some(
            ToolchainCommand::new(&self.interpreter, &request.work_dir)
                .args(["-m", "py_compile"])
                .args(request.source_files()),
        )
    }

    fn run_command(&self, request: &ExecutionRequest, plan: &ToolchainPlan) -> ToolchainCommand {
        let command = ToolchainCommand::new(&self.interpreter, &request.work_dir);
        match (plan.mode, &request.test_path) {
            (RunMode::Discovery, Some(test_path)) => command
                .args(["-m", "unittest", "discover", "-s", ".", "-p"])
                .arg(file_name(test_path))
                .arg("-v"),
            _ => command.arg(&request.solution_path),
        }
    }

    fn classify(&self, plan: &ToolchainPlan, output: &ProcessOutput) -> Classification {
        match plan.mode {
            RunMode::Discovery => classify::python::classify_discovery(plan.expected_tests, output),
            RunMode::Script => classify::classify_exit(output),
        }
    }
}
