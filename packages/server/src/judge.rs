//! Submission judging: admission, sequential testcase runs, scoring and the
//! resulting submission/progress writes.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use common::{
    ContestStore, ParticipantProgress, ProgressWrite, RoundPolicy, Submission, Testcase,
    TestcaseOutcome,
};
use executor::{CodeExecutor, ExecutionRequest, ExecutorError, RunOutput};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::config::AppConfig;
use crate::error::{ContestError, Result};
use crate::rounds::RoundService;

/// Slack on top of the client's own request timeout.
const CALL_GRACE: Duration = Duration::from_secs(2);

/// Upper bound on submissions returned by [`Judge::submissions_for`].
pub const MAX_HISTORY: usize = 500;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitRequest {
    pub user_id: String,
    pub problem_id: String,
    pub round_id: String,
    pub code: String,
    pub language: String,
}

/// What a judged submission produced.
#[derive(Debug, Clone, Serialize)]
pub struct JudgeOutcome {
    pub submission_id: String,
    pub testcases_passed: i32,
    pub total_testcases: i32,
    pub fully_passed: bool,
    /// False when the round policy withheld the code.
    pub code_stored: bool,
    /// `Stale` when a newer attempt had already updated the progress row.
    #[serde(skip)]
    pub progress: ProgressWrite,
    pub results: Vec<TestcaseOutcome>,
}

/// Strip carriage returns and surrounding whitespace.
pub fn normalize_output(text: &str) -> String {
    text.replace('\r', "").trim().to_string()
}

/// A testcase passes on identical normalized output and a zero exit code.
pub fn outputs_match(expected: &str, output: &RunOutput) -> bool {
    output.exited_cleanly() && normalize_output(&output.stdout) == normalize_output(expected)
}

pub struct Judge {
    store: Arc<dyn ContestStore>,
    executor: Arc<dyn CodeExecutor>,
    rounds: Arc<RoundService>,
    policies: HashMap<String, RoundPolicy>,
    testcase_delay: Duration,
    call_timeout: Duration,
    timeout_ms: u64,
}

impl Judge {
    pub fn new(
        store: Arc<dyn ContestStore>,
        executor: Arc<dyn CodeExecutor>,
        rounds: Arc<RoundService>,
        config: &AppConfig,
    ) -> Self {
        Self {
            store,
            executor,
            rounds,
            policies: config.rounds.clone(),
            testcase_delay: Duration::from_millis(config.executor.testcase_delay_ms),
            call_timeout: Duration::from_millis(config.executor.timeout_ms) + CALL_GRACE,
            timeout_ms: config.executor.timeout_ms,
        }
    }

    fn policy_for(&self, round_id: &str) -> RoundPolicy {
        self.policies.get(round_id).copied().unwrap_or_default()
    }

    /// Execute once, bounded by the call timeout.
    async fn execute(
        &self,
        request: &ExecutionRequest,
    ) -> std::result::Result<RunOutput, ExecutorError> {
        match tokio::time::timeout(self.call_timeout, self.executor.execute(request)).await {
            Ok(result) => result,
            Err(_) => Err(ExecutorError::Timeout(self.timeout_ms)),
        }
    }

    async fn run_testcase(&self, request: &SubmitRequest, testcase: &Testcase) -> TestcaseOutcome {
        let run = ExecutionRequest::new(&request.language, &request.code, &testcase.input);
        match self.execute(&run).await {
            Ok(output) => TestcaseOutcome {
                input: testcase.input.clone(),
                expected_output: normalize_output(&testcase.expected_output),
                actual_output: normalize_output(&output.stdout),
                passed: outputs_match(&testcase.expected_output, &output),
                stderr: output.stderr,
                hidden: testcase.hidden,
            },
            Err(e) => {
                warn!(error = %e, "Executor call failed, testcase marked failed");
                TestcaseOutcome {
                    input: testcase.input.clone(),
                    expected_output: normalize_output(&testcase.expected_output),
                    actual_output: String::new(),
                    passed: false,
                    stderr: e.to_string(),
                    hidden: testcase.hidden,
                }
            }
        }
    }

    /// Judge a submission against every testcase of its problem.
    ///
    /// Checks run in order (caller, round admission, problem, code) and the
    /// first failure is returned before the executor is called. Hidden
    /// testcase results are redacted unless the caller is an admin.
    #[instrument(
        skip(self, caller, request),
        fields(
            user_id = %request.user_id,
            problem_id = %request.problem_id,
            round_id = %request.round_id,
        )
    )]
    pub async fn judge(&self, caller: &AuthUser, request: SubmitRequest) -> Result<JudgeOutcome> {
        caller.require_self_or_admin(&request.user_id)?;
        let submitted_at = self.rounds.admit(&request.round_id).await?;
        let problem = self
            .store
            .problem(&request.problem_id)
            .await?
            .ok_or_else(|| ContestError::problem_not_found(&request.problem_id))?;
        if request.code.trim().is_empty() {
            return Err(ContestError::Validation("code must not be empty".into()));
        }

        let mut results = Vec::with_capacity(problem.testcases.len());
        for (index, testcase) in problem.testcases.iter().enumerate() {
            if index > 0 {
                tokio::time::sleep(self.testcase_delay).await;
            }
            let outcome = self.run_testcase(&request, testcase).await;
            debug!(testcase = index, passed = outcome.passed, "Testcase judged");
            results.push(outcome);
        }

        let count = |n: usize| {
            i32::try_from(n)
                .map_err(|_| ContestError::Validation("problem has too many testcases".into()))
        };
        let testcases_passed = count(results.iter().filter(|r| r.passed).count())?;
        let total_testcases = count(results.len())?;
        let fully_passed = testcases_passed == total_testcases;
        let policy = self.policy_for(&request.round_id);
        let code_stored = policy.keeps_code(fully_passed);

        let submission = Submission {
            id: format!("s{}", Uuid::new_v4()),
            user_id: request.user_id.clone(),
            problem_id: request.problem_id.clone(),
            round_id: request.round_id.clone(),
            code: if code_stored {
                request.code.clone()
            } else {
                String::new()
            },
            language: request.language.clone(),
            submitted_at,
            testcases_passed,
            total_testcases,
            results,
        };
        let progress = ParticipantProgress {
            user_id: request.user_id.clone(),
            round_id: request.round_id.clone(),
            attended: true,
            testcases_passed,
            total_testcases,
            score: testcases_passed,
            qualified: policy.qualifying.then_some(fully_passed),
            last_submission_id: submission.id.clone(),
            last_submission_at: submitted_at,
        };
        let progress = self.store.record_judgement(&submission, &progress).await?;
        if progress == ProgressWrite::Stale {
            warn!(submission_id = %submission.id, "Progress already reflects a newer attempt");
        }

        info!(
            submission_id = %submission.id,
            testcases_passed,
            total_testcases,
            code_stored,
            "Submission judged"
        );

        let submission = if caller.is_admin() {
            submission
        } else {
            submission.redact_hidden()
        };
        Ok(JudgeOutcome {
            submission_id: submission.id,
            testcases_passed,
            total_testcases,
            fully_passed,
            code_stored,
            progress,
            results: submission.results,
        })
    }

    /// Run code once against custom input. Nothing is stored and no round
    /// gate applies.
    #[instrument(skip(self, code, stdin))]
    pub async fn run(&self, code: &str, language: &str, stdin: &str) -> Result<RunOutput> {
        if code.trim().is_empty() {
            return Err(ContestError::Validation("code must not be empty".into()));
        }
        let output = self
            .execute(&ExecutionRequest::new(language, code, stdin))
            .await?;
        Ok(output)
    }

    /// A user's submissions, newest first. Contestants get hidden testcase
    /// results redacted.
    pub async fn submissions_for(
        &self,
        caller: &AuthUser,
        user_id: &str,
        limit: usize,
    ) -> Result<Vec<Submission>> {
        caller.require_self_or_admin(user_id)?;
        let submissions = self
            .store
            .user_submissions(user_id, limit.min(MAX_HISTORY))
            .await?;
        if caller.is_admin() {
            return Ok(submissions);
        }
        Ok(submissions
            .into_iter()
            .map(Submission::redact_hidden)
            .collect())
    }

    /// Per-round progress rows of a user.
    pub async fn progress_for(
        &self,
        caller: &AuthUser,
        user_id: &str,
    ) -> Result<Vec<ParticipantProgress>> {
        caller.require_self_or_admin(user_id)?;
        Ok(self.store.user_progress(user_id).await?)
    }
}
