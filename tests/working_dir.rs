//! Switching the working directory is process-wide, so everything that
//! observes it runs in this one test.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use polyrunner::{
    core::{
        domain::{ExecutionRequest, FailureKind, Language, TestStats, ToolchainCommand},
        pipeline::{Orchestrator, workdir::WorkingDirGuard},
        traits::process::{ProcessError, ProcessOutput, ProcessRunner},
    },
    toolchain::{PythonToolchain, ToolchainSet},
};

const UNITTEST_OK: &str = "test_add (test_cases.TestAdd.test_add) ... ok\n\
test_neg (test_cases.TestAdd.test_neg) ... ok\n\
\n\
----------------------------------------------------------------------\n\
Ran 2 tests in 0.000s\n\
\n\
OK\n";

/// Records the working directory seen by each command; panics on the run
/// step when asked to.
#[derive(Debug, Default)]
struct CwdRunner {
    panic_on_run: bool,
    seen: Mutex<Vec<PathBuf>>,
}

#[async_trait]
impl ProcessRunner for CwdRunner {
    async fn execute(
        &self,
        command: &ToolchainCommand,
        _deadline: Option<Duration>,
    ) -> Result<ProcessOutput, ProcessError> {
        let is_run = command.args_lossy().iter().any(|arg| arg == "unittest");
        self.seen
            .lock()
            .unwrap()
            .push(std::env::current_dir().unwrap());
        if is_run && self.panic_on_run {
            panic!("runner blew up");
        }
        Ok(ProcessOutput {
            status: Some(0),
            stdout: String::new(),
            stderr: if is_run { UNITTEST_OK.to_string() } else { String::new() },
            elapsed_ms: 1,
        })
    }
}

fn python_request(dir: &tempfile::TempDir) -> ExecutionRequest {
    let solution = dir.path().join("solution.py");
    let test = dir.path().join("test_cases.py");
    std::fs::write(&solution, "def add(a, b):\n    return a + b\n").unwrap();
    std::fs::write(
        &test,
        "import unittest\nfrom solution import add\n\n\
class TestAdd(unittest.TestCase):\n    \
def test_add(self):\n        self.assertEqual(add(1, 2), 3)\n\n    \
def test_neg(self):\n        self.assertEqual(add(-1, -2), -3)\n",
    )
    .unwrap();
    ExecutionRequest::for_solution(Language::Python, solution).with_test(test)
}

fn orchestrator(runner: Arc<CwdRunner>) -> Orchestrator {
    Orchestrator::new(
        ToolchainSet::default().with(Arc::new(PythonToolchain::new("python3"))),
        runner,
    )
}

#[tokio::test]
async fn test_working_directory_is_always_restored() {
    let original = std::env::current_dir().unwrap();
    let dir = tempfile::tempdir().unwrap();
    let work_dir = dir.path().canonicalize().unwrap();

    {
        let guard = WorkingDirGuard::enter(&work_dir).await.unwrap();
        assert_eq!(guard.previous(), original.as_path());
        assert_eq!(std::env::current_dir().unwrap(), work_dir);
    }
    assert_eq!(std::env::current_dir().unwrap(), original);

    // Discovery runs happen inside the work directory.
    let runner = Arc::new(CwdRunner::default());
    let result = orchestrator(runner.clone())
        .execute(&python_request(&dir))
        .await;
    assert!(result.compilation_success(), "{result:?}");
    assert!(result.tests_passed(), "{result:?}");
    assert_eq!(result.test_stats(), TestStats::new(2, 2));
    let seen = runner.seen.lock().unwrap().clone();
    assert_eq!(seen.len(), 2);
    assert_eq!(seen[1].canonicalize().unwrap(), work_dir);
    assert_eq!(std::env::current_dir().unwrap(), original);

    // A panic while inside the work directory still switches back.
    let runner = Arc::new(CwdRunner {
        panic_on_run: true,
        ..Default::default()
    });
    let result = orchestrator(runner).execute(&python_request(&dir)).await;
    assert!(result.compilation_success());
    assert!(!result.tests_passed());
    assert!(result.test_error().starts_with("System error: "));
    assert!(result.test_error().contains("runner blew up"));
    assert_eq!(result.test_stats(), TestStats::new(0, 2));
    assert_eq!(result.failure(), Some(FailureKind::Fault));
    assert_eq!(std::env::current_dir().unwrap(), original);
}
