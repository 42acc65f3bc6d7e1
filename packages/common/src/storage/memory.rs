use std::cmp::Reverse;
use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::error::StoreError;
use super::traits::{ContestStore, ProgressWrite};
use crate::flag::SimilarityFlag;
use crate::problem::Problem;
use crate::round::Round;
use crate::submission::{ParticipantProgress, Submission};

#[derive(Default)]
struct Collections {
    rounds: BTreeMap<String, Round>,
    problems: HashMap<String, Problem>,
    submissions: Vec<Submission>,
    progress: BTreeMap<(String, String), ParticipantProgress>,
    flags: Vec<SimilarityFlag>,
}

/// In-process store. Each instance owns its own collections; state is lost
/// when the instance is dropped.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Collections>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Collections {
    fn apply_progress(&mut self, progress: &ParticipantProgress) -> ProgressWrite {
        let key = (progress.user_id.clone(), progress.round_id.clone());
        if let Some(existing) = self.progress.get(&key)
            && existing.last_submission_at > progress.last_submission_at
        {
            return ProgressWrite::Stale;
        }
        self.progress.insert(key, progress.clone());
        ProgressWrite::Applied
    }
}

/// Newest first; among equal timestamps the later insert comes first.
fn newest_first<T: Clone, K: Ord>(items: &[T], key: impl Fn(&T) -> K, limit: usize) -> Vec<T> {
    let mut out: Vec<T> = items.iter().rev().cloned().collect();
    out.sort_by_key(|item| Reverse(key(item)));
    out.truncate(limit);
    out
}

#[async_trait]
impl ContestStore for MemoryStore {
    async fn round(&self, id: &str) -> Result<Option<Round>, StoreError> {
        Ok(self.inner.read().await.rounds.get(id).cloned())
    }

    async fn rounds(&self) -> Result<Vec<Round>, StoreError> {
        Ok(self.inner.read().await.rounds.values().cloned().collect())
    }

    async fn save_round(&self, round: &Round) -> Result<(), StoreError> {
        self.inner
            .write()
            .await
            .rounds
            .insert(round.id.clone(), round.clone());
        Ok(())
    }

    async fn problem(&self, id: &str) -> Result<Option<Problem>, StoreError> {
        Ok(self.inner.read().await.problems.get(id).cloned())
    }

    async fn save_problem(&self, problem: &Problem) -> Result<(), StoreError> {
        self.inner
            .write()
            .await
            .problems
            .insert(problem.id.clone(), problem.clone());
        Ok(())
    }

    async fn recent_submissions(&self, limit: usize) -> Result<Vec<Submission>, StoreError> {
        let inner = self.inner.read().await;
        Ok(newest_first(&inner.submissions, |s| s.submitted_at, limit))
    }

    async fn user_submissions(
        &self,
        user_id: &str,
        limit: usize,
    ) -> Result<Vec<Submission>, StoreError> {
        let inner = self.inner.read().await;
        let mine: Vec<Submission> = inner
            .submissions
            .iter()
            .filter(|s| s.user_id == user_id)
            .cloned()
            .collect();
        Ok(newest_first(&mine, |s| s.submitted_at, limit))
    }

    async fn progress(
        &self,
        user_id: &str,
        round_id: &str,
    ) -> Result<Option<ParticipantProgress>, StoreError> {
        let key = (user_id.to_string(), round_id.to_string());
        Ok(self.inner.read().await.progress.get(&key).cloned())
    }

    async fn user_progress(&self, user_id: &str) -> Result<Vec<ParticipantProgress>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .progress
            .values()
            .filter(|p| p.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn record_progress(
        &self,
        progress: &ParticipantProgress,
    ) -> Result<ProgressWrite, StoreError> {
        Ok(self.inner.write().await.apply_progress(progress))
    }

    async fn record_judgement(
        &self,
        submission: &Submission,
        progress: &ParticipantProgress,
    ) -> Result<ProgressWrite, StoreError> {
        let mut inner = self.inner.write().await;
        inner.submissions.push(submission.clone());
        Ok(inner.apply_progress(progress))
    }

    async fn insert_flags(&self, flags: &[SimilarityFlag]) -> Result<(), StoreError> {
        self.inner.write().await.flags.extend_from_slice(flags);
        Ok(())
    }

    async fn flags(&self) -> Result<Vec<SimilarityFlag>, StoreError> {
        let inner = self.inner.read().await;
        Ok(newest_first(
            &inner.flags,
            |f| f.detected_at,
            inner.flags.len(),
        ))
    }
}
