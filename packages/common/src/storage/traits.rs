use async_trait::async_trait;

use super::error::StoreError;
use crate::flag::SimilarityFlag;
use crate::problem::Problem;
use crate::round::Round;
use crate::submission::{ParticipantProgress, Submission};

/// Outcome of a progress write.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProgressWrite {
    /// The row now reflects the given attempt.
    Applied,
    /// A newer attempt was already recorded; nothing changed.
    Stale,
}

/// Persistence capability for contest state.
///
/// Submissions and similarity flags are append-only. Progress rows are keyed
/// by `(user_id, round_id)`.
#[async_trait]
pub trait ContestStore: Send + Sync {
    async fn round(&self, id: &str) -> Result<Option<Round>, StoreError>;

    /// All rounds, ordered by id.
    async fn rounds(&self) -> Result<Vec<Round>, StoreError>;

    /// Insert or replace the round document.
    async fn save_round(&self, round: &Round) -> Result<(), StoreError>;

    async fn problem(&self, id: &str) -> Result<Option<Problem>, StoreError>;

    /// Insert or replace a problem. Used by administration tooling and seeding.
    async fn save_problem(&self, problem: &Problem) -> Result<(), StoreError>;

    /// Newest first.
    async fn recent_submissions(&self, limit: usize) -> Result<Vec<Submission>, StoreError>;

    /// Newest first.
    async fn user_submissions(
        &self,
        user_id: &str,
        limit: usize,
    ) -> Result<Vec<Submission>, StoreError>;

    async fn progress(
        &self,
        user_id: &str,
        round_id: &str,
    ) -> Result<Option<ParticipantProgress>, StoreError>;

    /// All progress rows of a user, ordered by round id.
    async fn user_progress(&self, user_id: &str) -> Result<Vec<ParticipantProgress>, StoreError>;

    /// Upsert a progress row unless the stored row belongs to a newer attempt.
    ///
    /// Compare-and-set on `last_submission_at`: the write applies when no row
    /// exists or the stored timestamp is not after the incoming one.
    async fn record_progress(
        &self,
        progress: &ParticipantProgress,
    ) -> Result<ProgressWrite, StoreError>;

    /// Store a judged submission and its progress update as one write.
    ///
    /// The submission is always inserted; the progress row follows the
    /// [`record_progress`](Self::record_progress) rule. On error neither
    /// write is visible.
    async fn record_judgement(
        &self,
        submission: &Submission,
        progress: &ParticipantProgress,
    ) -> Result<ProgressWrite, StoreError>;

    async fn insert_flags(&self, flags: &[SimilarityFlag]) -> Result<(), StoreError>;

    /// Newest first.
    async fn flags(&self) -> Result<Vec<SimilarityFlag>, StoreError>;
}
