//! Batch plagiarism scan over recent submissions.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use common::similarity::{normalize_code, ratio};
use common::{ContestStore, SimilarityFlag, Submission};
use serde::Serialize;
use tracing::{error, info, instrument};

use crate::clock::Clock;
use crate::config::AntiCheatConfig;
use crate::error::{ContestError, Result};

/// Hard cap on the scan batch; the comparison is quadratic.
pub const MAX_SCAN_LIMIT: usize = 1_000;

#[derive(Debug, Clone, Serialize)]
pub struct ScanReport {
    /// Submissions pulled into the batch.
    pub checked: usize,
    /// Flags raised (and stored) by this scan.
    pub flags: Vec<SimilarityFlag>,
}

/// Flag every pair of comparable submissions scoring at or above `threshold`.
///
/// Two submissions are comparable when they share language, problem and
/// round, come from different users, and both still carry their code.
pub fn find_similar(
    submissions: &[Submission],
    threshold: f64,
    detected_at: DateTime<Utc>,
) -> Vec<SimilarityFlag> {
    let candidates: Vec<(&Submission, String)> = submissions
        .iter()
        .filter(|s| !s.code.trim().is_empty())
        .map(|s| (s, normalize_code(&s.code)))
        .collect();

    let mut flags = Vec::new();
    for (i, (a, norm_a)) in candidates.iter().enumerate() {
        for (b, norm_b) in &candidates[i + 1..] {
            if a.language != b.language
                || a.problem_id != b.problem_id
                || a.round_id != b.round_id
                || a.user_id == b.user_id
            {
                continue;
            }
            let similarity = ratio(norm_a, norm_b);
            if similarity >= threshold {
                flags.push(SimilarityFlag::similar_code(
                    &a.user_id,
                    &b.user_id,
                    &a.problem_id,
                    &a.round_id,
                    similarity,
                    detected_at,
                ));
            }
        }
    }
    flags
}

pub struct SimilarityScanner {
    store: Arc<dyn ContestStore>,
    clock: Arc<dyn Clock>,
    threshold: f64,
    recent_limit: usize,
}

impl SimilarityScanner {
    pub fn new(
        store: Arc<dyn ContestStore>,
        clock: Arc<dyn Clock>,
        config: &AntiCheatConfig,
    ) -> Self {
        Self {
            store,
            clock,
            threshold: config.threshold,
            recent_limit: config.recent_limit,
        }
    }

    /// Compare the most recent submissions pairwise and store any flags.
    /// `None` scans the configured number of submissions.
    #[instrument(skip(self))]
    pub async fn scan(&self, limit: Option<usize>) -> Result<ScanReport> {
        let limit = limit.unwrap_or(self.recent_limit).min(MAX_SCAN_LIMIT);
        let recent = self.store.recent_submissions(limit).await?;
        let checked = recent.len();
        let threshold = self.threshold;
        let now = self.clock.now();

        let flags = tokio::task::spawn_blocking(move || find_similar(&recent, threshold, now))
            .await
            .map_err(|e| ContestError::Internal(format!("similarity scan aborted: {e}")))?;

        if !flags.is_empty() {
            self.store.insert_flags(&flags).await?;
        }
        info!(checked, flagged = flags.len(), "Similarity scan finished");

        Ok(ScanReport { checked, flags })
    }

    /// Every stored flag, newest first.
    pub async fn flags(&self) -> Result<Vec<SimilarityFlag>> {
        Ok(self.store.flags().await?)
    }
}

/// Scan on a fixed interval until the task is dropped.
pub async fn run_periodic_scan(scanner: Arc<SimilarityScanner>, interval_secs: u64) {
    info!(interval_secs, "Starting periodic similarity scan");

    let mut interval = tokio::time::interval(Duration::from_secs(interval_secs));
    loop {
        interval.tick().await;

        if let Err(e) = scanner.scan(None).await {
            error!(error = %e, "Periodic similarity scan failed");
        }
    }
}
