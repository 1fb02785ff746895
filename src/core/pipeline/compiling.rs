use std::time::Duration;

use crate::{
    classify::failure_text,
    constants::TIMEOUT_PREFIX,
    core::{
        domain::{ExecutionRequest, ExecutionResult, FailureKind},
        traits::{
            process::{ProcessError, ProcessRunner},
            toolchain::{CompileOutcome, Toolchain, ToolchainPlan},
        },
    },
};

#[derive(Debug)]
pub(crate) enum CompileStage {
    Ready,
    Stopped(ExecutionResult),
}

/// Runs the compile step. Any failure here ends the request.
pub(crate) async fn compile(
    toolchain: &dyn Toolchain,
    runner: &dyn ProcessRunner,
    request: &ExecutionRequest,
    plan: &ToolchainPlan,
    deadline: Option<Duration>,
) -> CompileStage {
    tracing::debug!("Start compiling");
    let outcome = toolchain.compile(runner, request, plan, deadline).await;
    tracing::debug!("Compilation result: {:?}", outcome);

    match outcome {
        Ok(CompileOutcome::Skipped) | Ok(CompileOutcome::Succeeded(_)) => CompileStage::Ready,
        Ok(CompileOutcome::Failed(output)) => CompileStage::Stopped(
            ExecutionResult::compilation_failed(
                failure_text(&output),
                output.combined(),
                plan.expected_tests,
                FailureKind::Compilation,
            ),
        ),
        Err(e @ ProcessError::Timeout { .. }) => CompileStage::Stopped(
            ExecutionResult::compilation_failed(
                format!("{TIMEOUT_PREFIX}{e}"),
                String::new(),
                plan.expected_tests,
                FailureKind::Timeout,
            ),
        ),
        Err(e) => CompileStage::Stopped(ExecutionResult::compilation_failed(
            e.to_string(),
            String::new(),
            plan.expected_tests,
            FailureKind::Compilation,
        )),
    }
}
