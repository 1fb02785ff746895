use std::time::Duration;

use crate::core::domain::ToolchainCommand;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProcessOutput {
    /// `None` when the process was terminated by a signal.
    pub status: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    pub elapsed_ms: u64,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        self.status == Some(0)
    }

    /// Stdout followed by stderr.
    pub fn combined(&self) -> String {
        let mut combined = String::with_capacity(self.stdout.len() + self.stderr.len());
        combined.push_str(&self.stdout);
        combined.push_str(&self.stderr);
        combined
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProcessError {
    #[error("failed to launch {program}: {msg}")]
    Launch { program: String, msg: String },
    #[error("{program} did not finish within {after_ms}ms")]
    Timeout { program: String, after_ms: u64 },
    #[error("failed to collect output of {program}: {msg}")]
    Wait { program: String, msg: String },
}

#[mockall::automock]
#[async_trait::async_trait]
pub trait ProcessRunner: std::fmt::Debug + Send + Sync {
    async fn execute(
        &self,
        command: &ToolchainCommand,
        deadline: Option<Duration>,
    ) -> Result<ProcessOutput, ProcessError>;
}
