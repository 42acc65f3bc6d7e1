//! HTTP client for a Piston-compatible code execution service.

use std::time::Duration;

use async_trait::async_trait;
use common::config::ExecutorConfig;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::error::{ExecutorError, Result};
use crate::language::runtime_for;
use crate::models::{CodeExecutor, ExecutionRequest, RunOutput};

#[derive(Serialize)]
struct PistonFile<'a> {
    content: &'a str,
}

#[derive(Serialize)]
struct PistonRequest<'a> {
    language: &'a str,
    version: &'a str,
    files: [PistonFile<'a>; 1],
    stdin: &'a str,
}

fn exit_ok() -> Option<i32> {
    Some(0)
}

/// One stage (`compile` or `run`) of a Piston response. Deployments disagree
/// on whether program output lands in `output` or `stdout`.
#[derive(Deserialize, Default)]
struct PistonStage {
    #[serde(default)]
    output: Option<String>,
    #[serde(default)]
    stdout: Option<String>,
    #[serde(default)]
    stderr: Option<String>,
    /// Absent means success; explicit null means the process was killed.
    #[serde(default = "exit_ok")]
    code: Option<i32>,
    #[serde(default)]
    signal: Option<String>,
    #[serde(default)]
    time: Option<f64>,
}

#[derive(Deserialize)]
struct PistonResponse {
    #[serde(default)]
    compile: Option<PistonStage>,
    #[serde(default)]
    run: Option<PistonStage>,
}

impl PistonStage {
    fn into_output(self) -> RunOutput {
        let stdout = self
            .output
            .filter(|s| !s.is_empty())
            .or(self.stdout)
            .unwrap_or_default();
        RunOutput {
            stdout,
            stderr: self.stderr.unwrap_or_default(),
            exit_code: self.code,
            signal: self.signal,
            time: self.time,
        }
    }
}

/// Turn a decoded response into the canonical [`RunOutput`].
///
/// A failed compile stage without a run stage is reported as a run that
/// exited with the compiler's status and diagnostics.
fn normalize(response: PistonResponse) -> Result<RunOutput> {
    match (response.compile, response.run) {
        (_, Some(run)) => Ok(run.into_output()),
        (Some(compile), None) => {
            let mut output = compile.into_output();
            if output.stderr.is_empty() {
                output.stderr = std::mem::take(&mut output.stdout);
            }
            output.stdout.clear();
            if output.exited_cleanly() {
                output.exit_code = None;
            }
            Ok(output)
        }
        (None, None) => Err(ExecutorError::Decode("response has no run section".into())),
    }
}

/// Client for the execute endpoint of the sandbox service.
#[derive(Debug, Clone)]
pub struct PistonClient {
    client: reqwest::Client,
    url: String,
    timeout_ms: u64,
}

impl PistonClient {
    pub fn new(config: &ExecutorConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| ExecutorError::Transport(e.to_string()))?;
        Ok(Self {
            client,
            url: config.url.clone(),
            timeout_ms: config.timeout_ms,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    fn map_send_error(&self, err: reqwest::Error) -> ExecutorError {
        if err.is_timeout() {
            ExecutorError::Timeout(self.timeout_ms)
        } else {
            ExecutorError::Transport(err.to_string())
        }
    }
}

#[async_trait]
impl CodeExecutor for PistonClient {
    #[instrument(skip(self, request), fields(language = %request.language))]
    async fn execute(&self, request: &ExecutionRequest) -> Result<RunOutput> {
        let runtime = runtime_for(&request.language);
        let body = PistonRequest {
            language: &runtime,
            version: "*",
            files: [PistonFile {
                content: &request.code,
            }],
            stdin: &request.stdin,
        };

        debug!(runtime = %runtime, stdin_len = request.stdin.len(), "Calling executor");

        let response = self
            .client
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        let status = response.status();
        let text = response.text().await.map_err(|e| self.map_send_error(e))?;

        if !status.is_success() {
            warn!(status = status.as_u16(), "Executor rejected request");
            return Err(ExecutorError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        let decoded: PistonResponse =
            serde_json::from_str(&text).map_err(|e| ExecutorError::Decode(e.to_string()))?;
        normalize(decoded)
    }
}
