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
    toolchain::file_stem,
};

#[derive(Clone, Debug)]
pub struct CppToolchain {
    compiler: PathBuf,
}

impl CppToolchain {
    pub fn new<P: AsRef<Path>>(compiler: P) -> Self {
        Self {
            compiler: compiler.as_ref().into(),
        }
    }

    fn binary(request: &ExecutionRequest) -> PathBuf {
        request
            .work_dir
            .join(format!("{}.out", file_stem(&request.solution_path)))
    }
}

impl Toolchain for CppToolchain {
    fn language(&self) -> Language {
        Language::Cpp
    }

    fn prepare(&self, request: &ExecutionRequest) -> Result<ToolchainPlan, ToolchainError> {
        Ok(ToolchainPlan::script().with_artifacts(vec![Self::binary(request)]))
    }

    fn compile_command(
        &self,
        request: &ExecutionRequest,
        _plan: &ToolchainPlan,
    ) -> Option<ToolchainCommand> {
        Some(
            ToolchainCommand::new(&self.compiler, &request.work_dir)
                .args(["-std=c++17", "-O2", "-o"])
                .arg(Self::binary(request))
                .args(request.source_files()),
        )
    }

    fn run_command(&self, request: &ExecutionRequest, _plan: &ToolchainPlan) -> ToolchainCommand {
        ToolchainCommand::new(Self::binary(request), &request.work_dir)
    }

    fn classify(&self, _plan: &ToolchainPlan, output: &ProcessOutput) -> Classification {
        classify::classify_exit(output)
    }
}
