use std::process::Stdio;
use std::time::Duration;

use tokio::{
    process::Command,
    time::{Instant, timeout},
};

use crate::core::{
    domain::ToolchainCommand,
    traits::process::{ProcessError, ProcessOutput, ProcessRunner},
};

#[derive(Clone, Debug, Default)]
pub struct NativeProcessRunner;

impl NativeProcessRunner {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait::async_trait]
impl ProcessRunner for NativeProcessRunner {
    async fn execute(
        &self,
        command: &ToolchainCommand,
        deadline: Option<Duration>,
    ) -> Result<ProcessOutput, ProcessError> {
        let program = command.program_lossy();

        let mut cmd = Command::new(&command.program);
        cmd.args(&command.args)
            .current_dir(&command.cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        // Own process group, so a deadline can take down compilers and
        // test runners together with everything they forked.
        #[cfg(unix)]
        cmd.process_group(0);

        let start_time = Instant::now();
        let child = cmd.spawn().map_err(|e| ProcessError::Launch {
            program: program.clone(),
            msg: e.to_string(),
        })?;
        let pid = child.id();

        let output = match deadline {
            Some(limit) => match timeout(limit, child.wait_with_output()).await {
                Ok(result) => result,
                Err(_) => {
                    kill_process_group(pid);
                    tracing::warn!(%program, ?limit, "process exceeded its deadline");
                    return Err(ProcessError::Timeout {
                        program,
                        after_ms: limit.as_millis() as u64,
                    });
                }
            },
            None => child.wait_with_output().await,
        }
        .map_err(|e| ProcessError::Wait {
            program: program.clone(),
            msg: e.to_string(),
        })?;

        let elapsed_ms = start_time.elapsed().as_millis() as u64;
        tracing::debug!(%program, status = ?output.status.code(), elapsed_ms, "process finished");

        Ok(ProcessOutput {
            status: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            elapsed_ms,
        })
    }
}

#[cfg(unix)]
fn kill_process_group(pid: Option<u32>) {
    let Some(pid) = pid else {
        return;
    };
    // SAFETY: killpg only sends a signal; the group id is the pid of the
    // child we spawned as a group leader.
    let rc = unsafe { libc::killpg(pid as libc::pid_t, libc::SIGKILL) };
    if rc != 0 {
        tracing::debug!(
            pid,
            error = %std::io::Error::last_os_error(),
            "process group already gone"
        );
    }
}

#[cfg(not(unix))]
fn kill_process_group(_pid: Option<u32>) {}
