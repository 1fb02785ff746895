//! Sequences compile, run, classification and cleanup for one request.
//!
//! ```text
//! START -> COMPILING -> RUNNING -> CLASSIFYING -> CLEANUP -> DONE
//!              \-> (failure) ------------------> CLEANUP -> DONE
//! ```
//!
//! Cleanup runs on every path, including faults and panics inside a
//! toolchain adapter, so the work directory can be reused by the next
//! problem instance.

pub mod cleanup;
pub(crate) mod compiling;
pub(crate) mod running;
pub mod workdir;

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;

use crate::{
    config::HarnessConfig,
    constants::SYSTEM_ERROR_PREFIX,
    core::{
        domain::{ExecutionRequest, ExecutionResult, ExecutionStage, FailureKind, Language, TestStats},
        pipeline::{cleanup::ArtifactTracker, compiling::CompileStage},
        traits::{process::ProcessRunner, toolchain::ToolchainError},
    },
    native::process::NativeProcessRunner,
    toolchain::ToolchainSet,
};

/// Anything that goes wrong outside the toolchain's own reporting.
#[derive(Debug, thiserror::Error)]
pub enum Fault {
    #[error("no toolchain registered for {0}")]
    Unsupported(Language),
    #[error(transparent)]
    Toolchain(#[from] ToolchainError),
    #[error("failed to enter {}: {source}", path.display())]
    WorkDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("panic: {0}")]
    Panic(String),
}

/// What is known about a request so far; survives a panic in the pipeline.
#[derive(Debug, Default)]
struct Progress {
    compiled: bool,
    expected_tests: u32,
    artifacts: Vec<PathBuf>,
}

impl Progress {
    fn fault_result(&self, fault: &Fault) -> ExecutionResult {
        let message = format!("{SYSTEM_ERROR_PREFIX}{fault}");
        if self.compiled {
            ExecutionResult::tests_failed(
                message,
                String::new(),
                TestStats::failed(self.expected_tests),
                FailureKind::Fault,
            )
        } else {
            ExecutionResult::compilation_failed(
                message,
                String::new(),
                self.expected_tests,
                FailureKind::Fault,
            )
        }
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        msg.to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

#[derive(Clone, Debug)]
pub struct Orchestrator {
    toolchains: ToolchainSet,
    runner: Arc<dyn ProcessRunner>,
    compile_timeout: Option<Duration>,
    run_timeout: Option<Duration>,
}

impl Orchestrator {
    pub fn new(toolchains: ToolchainSet, runner: Arc<dyn ProcessRunner>) -> Self {
        Self {
            toolchains,
            runner,
            compile_timeout: None,
            run_timeout: None,
        }
    }

    /// Native processes and the toolchains named in `config`.
    pub fn from_config(config: &HarnessConfig) -> Self {
        Self::new(
            ToolchainSet::from_config(config),
            Arc::new(NativeProcessRunner::new()),
        )
        .with_timeouts(config.compile_timeout, config.run_timeout)
    }

    pub fn with_timeouts(self, compile: Option<Duration>, run: Option<Duration>) -> Self {
        Self {
            compile_timeout: compile,
            run_timeout: run,
            ..self
        }
    }

    /// Executes one request. Never fails and never panics: every problem is
    /// reported through the returned [`ExecutionResult`].
    #[tracing::instrument(skip_all, fields(id = %request.id, language = %request.language))]
    pub async fn execute(&self, request: &ExecutionRequest) -> ExecutionResult {
        let request = absolute(request);
        let tracker = ArtifactTracker::snapshot(&request.work_dir).await;
        let mut progress = Progress::default();

        let outcome = AssertUnwindSafe(self.drive(&request, &mut progress))
            .catch_unwind()
            .await;
        let result = match outcome {
            Ok(Ok(result)) => result,
            Ok(Err(fault)) => {
                tracing::error!(error = %fault, "request faulted");
                progress.fault_result(&fault)
            }
            Err(payload) => {
                let fault = Fault::Panic(panic_message(payload));
                tracing::error!(error = %fault, "request panicked");
                progress.fault_result(&fault)
            }
        };

        tracing::debug!(stage = ?ExecutionStage::Cleanup, "Start cleanup");
        let removed = tracker.sweep(&progress.artifacts).await;
        tracing::debug!(stage = ?ExecutionStage::Done, removed, "Cleanup finished");

        tracing::info!(
            compilation_success = result.compilation_success(),
            tests_passed = result.tests_passed(),
            test_stats = %result.test_stats(),
            "Request completed"
        );
        result
    }

    async fn drive(
        &self,
        request: &ExecutionRequest,
        progress: &mut Progress,
    ) -> Result<ExecutionResult, Fault> {
        let toolchain = self
            .toolchains
            .get(request.language)
            .ok_or(Fault::Unsupported(request.language))?;

        let plan = toolchain.prepare(request).inspect_err(|e| {
            progress.expected_tests = e.expected_tests();
        })?;
        progress.expected_tests = plan.expected_tests;
        progress.artifacts = plan.artifacts.clone();
        tracing::debug!(?plan, "Toolchain plan ready");

        tracing::debug!(stage = ?ExecutionStage::Compiling);
        let stage = compiling::compile(
            toolchain.as_ref(),
            self.runner.as_ref(),
            request,
            &plan,
            self.compile_timeout,
        )
        .await;
        if let CompileStage::Stopped(result) = stage {
            return Ok(result);
        }
        progress.compiled = true;

        running::run(
            toolchain.as_ref(),
            self.runner.as_ref(),
            request,
            &plan,
            self.run_timeout,
        )
        .await
    }
}

/// Commands run from inside `work_dir`, so relative request paths are
/// resolved against the current directory first.
fn absolute(request: &ExecutionRequest) -> ExecutionRequest {
    let resolve = |path: &PathBuf| std::path::absolute(path).unwrap_or_else(|_| path.clone());
    ExecutionRequest {
        id: request.id,
        language: request.language,
        solution_path: resolve(&request.solution_path),
        test_path: request.test_path.as_ref().map(resolve),
        work_dir: resolve(&request.work_dir),
    }
}
