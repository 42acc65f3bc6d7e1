use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// One program run against one input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionRequest {
    /// Contest language identifier (e.g. "py", "cpp"); mapped by the client.
    pub language: String,
    pub code: String,
    pub stdin: String,
}

impl ExecutionRequest {
    pub fn new(
        language: impl Into<String>,
        code: impl Into<String>,
        stdin: impl Into<String>,
    ) -> Self {
        Self {
            language: language.into(),
            code: code.into(),
            stdin: stdin.into(),
        }
    }
}

/// Canonical result of a run, whatever shape the service answered with.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunOutput {
    pub stdout: String,
    pub stderr: String,
    /// Process exit code; `None` when the process was killed.
    pub exit_code: Option<i32>,
    /// Signal that terminated the process, if any.
    pub signal: Option<String>,
    /// Reported run time, when the service provides one.
    pub time: Option<f64>,
}

impl RunOutput {
    pub fn exited_cleanly(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Runs code in the external sandbox.
#[async_trait]
pub trait CodeExecutor: Send + Sync {
    async fn execute(&self, request: &ExecutionRequest) -> Result<RunOutput>;
}
