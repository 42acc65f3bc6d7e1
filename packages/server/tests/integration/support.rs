use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use common::{
    ContestStore, MemoryStore, ParticipantProgress, Problem, ProgressWrite, Round, SimilarityFlag,
    StoreError, Submission, Testcase,
};
use executor::{CodeExecutor, ExecutionRequest, ExecutorError, RunOutput};

use contest_server::auth::AuthUser;
use contest_server::clock::ManualClock;
use contest_server::config::AppConfig;
use contest_server::judge::SubmitRequest;
use contest_server::state::AppState;

type Script = dyn Fn(&ExecutionRequest) -> Result<RunOutput, ExecutorError> + Send + Sync;

/// In-process executor answering from a closure and counting calls.
/// Stdin "hang" is never answered, whatever the script.
pub struct ScriptedExecutor {
    script: Box<Script>,
    calls: AtomicUsize,
}

impl ScriptedExecutor {
    pub fn new(
        script: impl Fn(&ExecutionRequest) -> Result<RunOutput, ExecutorError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            script: Box::new(script),
            calls: AtomicUsize::new(0),
        }
    }

    /// Prints the submitted code verbatim, whatever the input.
    pub fn echo() -> Self {
        Self::new(|req| Ok(stdout(&req.code)))
    }

    /// Prints the sum of the integers on stdin. Code containing "off-by-one"
    /// prints the sum plus one; stdin "boom" makes the call fail.
    pub fn summing() -> Self {
        Self::new(|req| {
            if req.stdin == "boom" {
                return Err(ExecutorError::Transport("connection reset".into()));
            }
            let sum: i64 = req
                .stdin
                .split_whitespace()
                .filter_map(|t| t.parse::<i64>().ok())
                .sum();
            let bias = i64::from(req.code.contains("off-by-one"));
            Ok(stdout(&format!("{}\n", sum + bias)))
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CodeExecutor for ScriptedExecutor {
    async fn execute(&self, request: &ExecutionRequest) -> executor::Result<RunOutput> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if request.stdin == "hang" {
            std::future::pending::<()>().await;
        }
        (self.script)(request)
    }
}

pub fn stdout(text: &str) -> RunOutput {
    RunOutput {
        stdout: text.to_string(),
        exit_code: Some(0),
        ..Default::default()
    }
}

pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap()
}

/// Contest services over a fresh memory store and a manual clock.
pub struct TestContest {
    pub state: AppState,
    pub clock: Arc<ManualClock>,
    pub store: Arc<MemoryStore>,
    pub executor: Arc<ScriptedExecutor>,
}

impl TestContest {
    pub fn new(executor: ScriptedExecutor) -> Self {
        Self::with_config("", executor)
    }

    pub fn with_config(toml: &str, executor: ScriptedExecutor) -> Self {
        Self::build(toml, executor, |store| store)
    }

    /// Services see a store whose progress writes fail; `store` is the
    /// memory store underneath.
    pub fn with_progress_outage(executor: ScriptedExecutor) -> Self {
        Self::build("", executor, |store| Arc::new(ProgressOutage { inner: store }))
    }

    fn build(
        toml: &str,
        executor: ScriptedExecutor,
        wrap: impl FnOnce(Arc<MemoryStore>) -> Arc<dyn ContestStore>,
    ) -> Self {
        let mut config = AppConfig::from_toml(toml).expect("valid test config");
        config.executor.testcase_delay_ms = 0;

        let clock = Arc::new(ManualClock::new(t0()));
        let store = Arc::new(MemoryStore::new());
        let executor = Arc::new(executor);
        let state = AppState::new(config, wrap(store.clone()), executor.clone(), clock.clone());
        Self {
            state,
            clock,
            store,
            executor,
        }
    }

    pub async fn add_problem(&self, id: &str, round_id: &str, cases: &[(&str, &str)]) {
        let testcases = cases
            .iter()
            .map(|(input, expected)| Testcase::new(*input, *expected))
            .collect();
        self.store
            .save_problem(&Problem::new(id, round_id, id.to_uppercase(), testcases))
            .await
            .unwrap();
    }

    /// Start `round_id` with the given budget and add the sum problem `p1`.
    pub async fn open_round(&self, round_id: &str, duration: i64) {
        self.state
            .rounds
            .start(round_id, Some(duration))
            .await
            .unwrap();
        self.add_problem("p1", round_id, &[("2\n3", "5")]).await;
    }
}

/// Delegates to a memory store, except that every progress write fails.
pub struct ProgressOutage {
    inner: Arc<MemoryStore>,
}

fn outage() -> StoreError {
    StoreError::Backend("progress table unavailable".into())
}

#[async_trait]
impl ContestStore for ProgressOutage {
    async fn round(&self, id: &str) -> Result<Option<Round>, StoreError> {
        self.inner.round(id).await
    }

    async fn rounds(&self) -> Result<Vec<Round>, StoreError> {
        self.inner.rounds().await
    }

    async fn save_round(&self, round: &Round) -> Result<(), StoreError> {
        self.inner.save_round(round).await
    }

    async fn problem(&self, id: &str) -> Result<Option<Problem>, StoreError> {
        self.inner.problem(id).await
    }

    async fn save_problem(&self, problem: &Problem) -> Result<(), StoreError> {
        self.inner.save_problem(problem).await
    }

    async fn recent_submissions(&self, limit: usize) -> Result<Vec<Submission>, StoreError> {
        self.inner.recent_submissions(limit).await
    }

    async fn user_submissions(
        &self,
        user_id: &str,
        limit: usize,
    ) -> Result<Vec<Submission>, StoreError> {
        self.inner.user_submissions(user_id, limit).await
    }

    async fn progress(
        &self,
        user_id: &str,
        round_id: &str,
    ) -> Result<Option<ParticipantProgress>, StoreError> {
        self.inner.progress(user_id, round_id).await
    }

    async fn user_progress(&self, user_id: &str) -> Result<Vec<ParticipantProgress>, StoreError> {
        self.inner.user_progress(user_id).await
    }

    async fn record_progress(
        &self,
        _progress: &ParticipantProgress,
    ) -> Result<ProgressWrite, StoreError> {
        Err(outage())
    }

    async fn record_judgement(
        &self,
        _submission: &Submission,
        _progress: &ParticipantProgress,
    ) -> Result<ProgressWrite, StoreError> {
        Err(outage())
    }

    async fn insert_flags(&self, flags: &[SimilarityFlag]) -> Result<(), StoreError> {
        self.inner.insert_flags(flags).await
    }

    async fn flags(&self) -> Result<Vec<SimilarityFlag>, StoreError> {
        self.inner.flags().await
    }
}

pub fn submit(user: &str, round_id: &str, code: &str) -> SubmitRequest {
    SubmitRequest {
        user_id: user.into(),
        problem_id: "p1".into(),
        round_id: round_id.into(),
        code: code.into(),
        language: "python".into(),
    }
}

pub fn contestant(user: &str) -> AuthUser {
    AuthUser::contestant(user)
}
