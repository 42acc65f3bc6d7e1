pub mod config;
pub mod flag;
pub mod problem;
pub mod round;
pub mod round_state;
pub mod similarity;
pub mod storage;
pub mod submission;

pub use flag::SimilarityFlag;
pub use problem::{Problem, Testcase};
pub use round::{InadmissibleReason, Round, RoundError, RoundSettings, RoundWindow};
pub use round_state::RoundState;
pub use storage::{ContestStore, MemoryStore, ProgressWrite, StoreError};
pub use submission::{ParticipantProgress, RoundPolicy, StoreCode, Submission, TestcaseOutcome};
