use std::time::Duration;

use crate::{
    constants::TIMEOUT_PREFIX,
    core::{
        domain::{ExecutionRequest, ExecutionResult, ExecutionStage, FailureKind, TestStats},
        pipeline::{Fault, workdir::WorkingDirGuard},
        traits::{
            process::{ProcessError, ProcessRunner},
            toolchain::{Toolchain, ToolchainPlan},
        },
    },
};

/// Runs the program or test suite and classifies what it printed.
pub(crate) async fn run(
    toolchain: &dyn Toolchain,
    runner: &dyn ProcessRunner,
    request: &ExecutionRequest,
    plan: &ToolchainPlan,
    deadline: Option<Duration>,
) -> Result<ExecutionResult, Fault> {
    let _guard = if toolchain.run_from_work_dir(plan) {
        let guard = WorkingDirGuard::enter(&request.work_dir)
            .await
            .map_err(|source| Fault::WorkDir {
                path: request.work_dir.clone(),
                source,
            })?;
        Some(guard)
    } else {
        None
    };

    tracing::debug!(stage = ?ExecutionStage::Running, "Start running");
    let output = match toolchain.run(runner, request, plan, deadline).await {
        Ok(output) => output,
        Err(e @ ProcessError::Timeout { .. }) => {
            return Ok(ExecutionResult::tests_failed(
                format!("{TIMEOUT_PREFIX}{e}"),
                String::new(),
                TestStats::failed(plan.expected_tests),
                FailureKind::Timeout,
            ));
        }
        Err(e) => {
            tracing::debug!(error = %e, "run step could not be launched");
            return Ok(ExecutionResult::tests_failed(
                e.to_string(),
                String::new(),
                TestStats::failed(plan.expected_tests),
                FailureKind::Test,
            ));
        }
    };

    tracing::debug!(stage = ?ExecutionStage::Classifying, status = ?output.status, "Run finished");
    let classification = toolchain.classify(plan, &output);
    Ok(classification.into_result(output.combined()))
}
