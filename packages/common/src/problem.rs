use serde::{Deserialize, Serialize};

/// An input/expected-output pair used to judge a submission.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Testcase {
    /// Input data to feed to the program
    pub input: String,
    /// Expected output for comparison
    pub expected_output: String,
    /// Hidden testcases are judged but never shown to participants
    #[serde(default)]
    pub hidden: bool,
}

impl Testcase {
    pub fn new(input: impl Into<String>, expected_output: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            expected_output: expected_output.into(),
            hidden: false,
        }
    }

    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }
}

/// A contest problem. Testcase order is the judging order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Problem {
    pub id: String,
    /// Round this problem belongs to.
    pub round_id: String,
    #[serde(default)]
    pub title: String,
    pub testcases: Vec<Testcase>,
}

impl Problem {
    pub fn new(
        id: impl Into<String>,
        round_id: impl Into<String>,
        title: impl Into<String>,
        testcases: Vec<Testcase>,
    ) -> Self {
        Self {
            id: id.into(),
            round_id: round_id.into(),
            title: title.into(),
            testcases,
        }
    }
}
