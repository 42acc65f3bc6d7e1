//! Postgres implementation of [`ContestStore`].

use async_trait::async_trait;
use common::{
    ContestStore, ParticipantProgress, Problem, ProgressWrite, Round, SimilarityFlag, StoreError,
    Submission,
};
use sea_orm::sea_query::{LockType, OnConflict};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, EntityTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use tracing::debug;

use crate::entity::{participant_progress, problem, round, similarity_flag, submission};

#[derive(Clone)]
pub struct DatabaseStore {
    db: DatabaseConnection,
}

impl DatabaseStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn round_row(round: &Round) -> round::ActiveModel {
    round::ActiveModel {
        id: Set(round.id.clone()),
        state: Set(round.state),
        start_time: Set(round.start_time),
        end_time: Set(round.end_time),
        duration: Set(round.duration),
        elapsed_ms: Set(round.elapsed_ms),
        is_locked: Set(round.is_locked),
        scheduled_start: Set(round.scheduled_start),
    }
}

fn progress_row(progress: &ParticipantProgress) -> participant_progress::ActiveModel {
    participant_progress::ActiveModel {
        user_id: Set(progress.user_id.clone()),
        round_id: Set(progress.round_id.clone()),
        attended: Set(progress.attended),
        testcases_passed: Set(progress.testcases_passed),
        total_testcases: Set(progress.total_testcases),
        score: Set(progress.score),
        qualified: Set(progress.qualified),
        last_submission_id: Set(progress.last_submission_id.clone()),
        last_submission_at: Set(progress.last_submission_at),
    }
}

fn flag_row(flag: &SimilarityFlag) -> similarity_flag::ActiveModel {
    similarity_flag::ActiveModel {
        id: Set(flag.id.clone()),
        kind: Set(flag.kind.clone()),
        user_a: Set(flag.user_a.clone()),
        user_b: Set(flag.user_b.clone()),
        problem_id: Set(flag.problem_id.clone()),
        round_id: Set(flag.round_id.clone()),
        similarity: Set(flag.similarity),
        detected_at: Set(flag.detected_at),
    }
}

fn problem_from(row: problem::Model) -> Result<Problem, StoreError> {
    Ok(Problem {
        id: row.id,
        round_id: row.round_id,
        title: row.title,
        testcases: serde_json::from_value(row.testcases)?,
    })
}

fn submission_from(row: submission::Model) -> Result<Submission, StoreError> {
    Ok(Submission {
        id: row.id,
        user_id: row.user_id,
        problem_id: row.problem_id,
        round_id: row.round_id,
        code: row.code,
        language: row.language,
        submitted_at: row.submitted_at,
        testcases_passed: row.testcases_passed,
        total_testcases: row.total_testcases,
        results: serde_json::from_value(row.results)?,
    })
}

fn submission_row(submission: &Submission) -> Result<submission::ActiveModel, StoreError> {
    Ok(submission::ActiveModel {
        id: Set(submission.id.clone()),
        user_id: Set(submission.user_id.clone()),
        problem_id: Set(submission.problem_id.clone()),
        round_id: Set(submission.round_id.clone()),
        code: Set(submission.code.clone()),
        language: Set(submission.language.clone()),
        submitted_at: Set(submission.submitted_at),
        testcases_passed: Set(submission.testcases_passed),
        total_testcases: Set(submission.total_testcases),
        results: Set(serde_json::to_value(&submission.results)?),
    })
}

/// Progress compare-and-set inside the caller's transaction. A stale write
/// changes nothing, so the caller may still commit.
async fn write_progress(
    txn: &DatabaseTransaction,
    progress: &ParticipantProgress,
) -> Result<ProgressWrite, StoreError> {
    let existing = participant_progress::Entity::find_by_id((
        progress.user_id.clone(),
        progress.round_id.clone(),
    ))
    .lock(LockType::Update)
    .one(txn)
    .await?;

    match existing {
        Some(row) if row.last_submission_at > progress.last_submission_at => {
            debug!(
                user_id = %progress.user_id,
                round_id = %progress.round_id,
                "Newer progress already recorded"
            );
            Ok(ProgressWrite::Stale)
        }
        Some(_) => {
            progress_row(progress).update(txn).await?;
            Ok(ProgressWrite::Applied)
        }
        None => {
            // A concurrent first attempt may have inserted in the meantime.
            let written = participant_progress::Entity::insert(progress_row(progress))
                .on_conflict(
                    OnConflict::columns([
                        participant_progress::Column::UserId,
                        participant_progress::Column::RoundId,
                    ])
                    .update_columns([
                        participant_progress::Column::Attended,
                        participant_progress::Column::TestcasesPassed,
                        participant_progress::Column::TotalTestcases,
                        participant_progress::Column::Score,
                        participant_progress::Column::Qualified,
                        participant_progress::Column::LastSubmissionId,
                        participant_progress::Column::LastSubmissionAt,
                    ])
                    .action_and_where(
                        participant_progress::Column::LastSubmissionAt
                            .lte(progress.last_submission_at),
                    )
                    .to_owned(),
                )
                .exec_without_returning(txn)
                .await?;
            Ok(if written == 0 {
                ProgressWrite::Stale
            } else {
                ProgressWrite::Applied
            })
        }
    }
}

#[async_trait]
impl ContestStore for DatabaseStore {
    async fn round(&self, id: &str) -> Result<Option<Round>, StoreError> {
        let row = round::Entity::find_by_id(id.to_string())
            .one(&self.db)
            .await?;
        Ok(row.map(Round::from))
    }

    async fn rounds(&self) -> Result<Vec<Round>, StoreError> {
        let rows = round::Entity::find()
            .order_by_asc(round::Column::Id)
            .all(&self.db)
            .await?;
        Ok(rows.into_iter().map(Round::from).collect())
    }

    async fn save_round(&self, round: &Round) -> Result<(), StoreError> {
        round::Entity::insert(round_row(round))
            .on_conflict(
                OnConflict::column(round::Column::Id)
                    .update_columns([
                        round::Column::State,
                        round::Column::StartTime,
                        round::Column::EndTime,
                        round::Column::Duration,
                        round::Column::ElapsedMs,
                        round::Column::IsLocked,
                        round::Column::ScheduledStart,
                    ])
                    .to_owned(),
            )
            .exec(&self.db)
            .await?;
        Ok(())
    }

    async fn problem(&self, id: &str) -> Result<Option<Problem>, StoreError> {
        problem::Entity::find_by_id(id.to_string())
            .one(&self.db)
            .await?
            .map(problem_from)
            .transpose()
    }

    async fn save_problem(&self, problem: &Problem) -> Result<(), StoreError> {
        let row = problem::ActiveModel {
            id: Set(problem.id.clone()),
            round_id: Set(problem.round_id.clone()),
            title: Set(problem.title.clone()),
            testcases: Set(serde_json::to_value(&problem.testcases)?),
        };
        problem::Entity::insert(row)
            .on_conflict(
                OnConflict::column(problem::Column::Id)
                    .update_columns([
                        problem::Column::RoundId,
                        problem::Column::Title,
                        problem::Column::Testcases,
                    ])
                    .to_owned(),
            )
            .exec(&self.db)
            .await?;
        Ok(())
    }

    async fn recent_submissions(&self, limit: usize) -> Result<Vec<Submission>, StoreError> {
        submission::Entity::find()
            .order_by_desc(submission::Column::SubmittedAt)
            .limit(limit as u64)
            .all(&self.db)
            .await?
            .into_iter()
            .map(submission_from)
            .collect()
    }

    async fn user_submissions(
        &self,
        user_id: &str,
        limit: usize,
    ) -> Result<Vec<Submission>, StoreError> {
        submission::Entity::find()
            .filter(submission::Column::UserId.eq(user_id))
            .order_by_desc(submission::Column::SubmittedAt)
            .limit(limit as u64)
            .all(&self.db)
            .await?
            .into_iter()
            .map(submission_from)
            .collect()
    }

    async fn progress(
        &self,
        user_id: &str,
        round_id: &str,
    ) -> Result<Option<ParticipantProgress>, StoreError> {
        let row = participant_progress::Entity::find_by_id((
            user_id.to_string(),
            round_id.to_string(),
        ))
        .one(&self.db)
        .await?;
        Ok(row.map(ParticipantProgress::from))
    }

    async fn user_progress(&self, user_id: &str) -> Result<Vec<ParticipantProgress>, StoreError> {
        let rows = participant_progress::Entity::find()
            .filter(participant_progress::Column::UserId.eq(user_id))
            .order_by_asc(participant_progress::Column::RoundId)
            .all(&self.db)
            .await?;
        Ok(rows.into_iter().map(ParticipantProgress::from).collect())
    }

    async fn record_progress(
        &self,
        progress: &ParticipantProgress,
    ) -> Result<ProgressWrite, StoreError> {
        let txn = self.db.begin().await?;
        let write = write_progress(&txn, progress).await?;
        txn.commit().await?;
        Ok(write)
    }

    async fn record_judgement(
        &self,
        submission: &Submission,
        progress: &ParticipantProgress,
    ) -> Result<ProgressWrite, StoreError> {
        let txn = self.db.begin().await?;
        submission_row(submission)?.insert(&txn).await?;
        let write = write_progress(&txn, progress).await?;
        txn.commit().await?;
        Ok(write)
    }

    async fn insert_flags(&self, flags: &[SimilarityFlag]) -> Result<(), StoreError> {
        if flags.is_empty() {
            return Ok(());
        }
        similarity_flag::Entity::insert_many(flags.iter().map(flag_row))
            .exec(&self.db)
            .await?;
        Ok(())
    }

    async fn flags(&self) -> Result<Vec<SimilarityFlag>, StoreError> {
        let rows = similarity_flag::Entity::find()
            .order_by_desc(similarity_flag::Column::DetectedAt)
            .all(&self.db)
            .await?;
        Ok(rows.into_iter().map(SimilarityFlag::from).collect())
    }
}
