use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Verdict for a single testcase of a judged submission.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestcaseOutcome {
    pub input: String,
    pub expected_output: String,
    pub actual_output: String,
    pub passed: bool,
    /// Program stderr, or the executor failure that sank this testcase.
    pub stderr: String,
    /// Copied from the testcase. Contestants see only the verdict.
    #[serde(default)]
    pub hidden: bool,
}

impl TestcaseOutcome {
    /// The contestant-facing copy: hidden testcases lose their data.
    pub fn redacted(&self) -> Self {
        if !self.hidden {
            return self.clone();
        }
        Self {
            input: String::new(),
            expected_output: String::new(),
            actual_output: String::new(),
            ..self.clone()
        }
    }
}

/// One judged attempt. Written once, never updated.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submission {
    pub id: String,
    pub user_id: String,
    pub problem_id: String,
    pub round_id: String,
    /// Empty when the round withholds code of attempts that did not fully pass.
    pub code: String,
    pub language: String,
    pub submitted_at: DateTime<Utc>,
    pub testcases_passed: i32,
    pub total_testcases: i32,
    /// In problem testcase order.
    pub results: Vec<TestcaseOutcome>,
}

impl Submission {
    pub fn fully_passed(&self) -> bool {
        self.testcases_passed == self.total_testcases
    }

    /// Blank the data of hidden testcase results.
    pub fn redact_hidden(mut self) -> Self {
        self.results = self.results.iter().map(TestcaseOutcome::redacted).collect();
        self
    }
}

/// Latest judged attempt of a user in one round.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantProgress {
    pub user_id: String,
    pub round_id: String,
    pub attended: bool,
    pub testcases_passed: i32,
    pub total_testcases: i32,
    /// Round score; the latest attempt's passed count, not a best-of.
    pub score: i32,
    /// Whether the latest attempt qualifies for the next round.
    /// Only tracked for qualifying rounds.
    pub qualified: Option<bool>,
    pub last_submission_id: String,
    pub last_submission_at: DateTime<Utc>,
}

/// Whether a round keeps the code of every attempt.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreCode {
    #[default]
    Always,
    /// Keep code only for attempts that passed every testcase.
    FullyPassed,
}

/// Per-round judging policy.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundPolicy {
    #[serde(default)]
    pub store_code: StoreCode,
    /// A qualifying round records eligibility for the next round.
    #[serde(default)]
    pub qualifying: bool,
}

impl RoundPolicy {
    pub fn keeps_code(&self, fully_passed: bool) -> bool {
        match self.store_code {
            StoreCode::Always => true,
            StoreCode::FullyPassed => fully_passed,
        }
    }
}
