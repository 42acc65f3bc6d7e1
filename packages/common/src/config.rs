use serde::Deserialize;

/// Connection settings for the external code execution service.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct ExecutorConfig {
    /// Execute endpoint. Default: "http://localhost:2000/api/v2/execute".
    #[serde(default = "default_executor_url")]
    pub url: String,
    /// Per-call timeout in milliseconds. Default: 20000.
    #[serde(default = "default_executor_timeout_ms")]
    pub timeout_ms: u64,
    /// Pause between consecutive testcase runs of one submission. Default: 10.
    #[serde(default = "default_testcase_delay_ms")]
    pub testcase_delay_ms: u64,
}

fn default_executor_url() -> String {
    "http://localhost:2000/api/v2/execute".into()
}
fn default_executor_timeout_ms() -> u64 {
    20_000
}
fn default_testcase_delay_ms() -> u64 {
    10
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            url: default_executor_url(),
            timeout_ms: default_executor_timeout_ms(),
            testcase_delay_ms: default_testcase_delay_ms(),
        }
    }
}
