use std::sync::Arc;

use chrono::{DateTime, Utc};
use common::{ContestStore, InadmissibleReason, Round, RoundError, RoundSettings, RoundWindow};
use dashmap::DashMap;
use tokio::sync::Mutex;
use tracing::{info, instrument, warn};

use crate::clock::Clock;
use crate::error::{ContestError, Result};

/// Drives the round clock against storage.
///
/// Every read-modify-write of a round happens under a per-round mutex so two
/// transitions on the same round never overwrite each other. Different rounds
/// do not contend.
pub struct RoundService {
    store: Arc<dyn ContestStore>,
    clock: Arc<dyn Clock>,
    locks: DashMap<String, Arc<Mutex<()>>>,
}

impl RoundService {
    pub fn new(store: Arc<dyn ContestStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            clock,
            locks: DashMap::new(),
        }
    }

    fn lock_for(&self, round_id: &str) -> Arc<Mutex<()>> {
        self.locks
            .entry(round_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Load, mutate and save a round under its lock.
    ///
    /// With `create` set, a missing round starts out as a fresh scheduled
    /// round; otherwise a missing round is `NotFound`.
    async fn transition<F>(
        &self,
        round_id: &str,
        action: &'static str,
        create: bool,
        apply: F,
    ) -> Result<RoundWindow>
    where
        F: FnOnce(&mut Round, DateTime<Utc>) -> std::result::Result<(), RoundError>,
    {
        let lock = self.lock_for(round_id);
        let _guard = lock.lock().await;

        let now = self.clock.now();
        let mut round = match self.store.round(round_id).await? {
            Some(round) => round,
            None if create => Round::new(round_id),
            None => return Err(ContestError::round_not_found(round_id)),
        };

        if let Err(e) = apply(&mut round, now) {
            warn!(round_id, action, state = %round.state, "Rejected round transition");
            return Err(e.into());
        }
        self.store.save_round(&round).await?;

        info!(
            round_id,
            action,
            state = %round.state,
            locked = round.is_locked,
            duration = round.duration,
            "Round updated"
        );
        Ok(round.window(now))
    }

    pub async fn configure(&self, round_id: &str, settings: RoundSettings) -> Result<RoundWindow> {
        self.transition(round_id, "configure", true, |round, _| {
            round.configure(settings)
        })
        .await
    }

    pub async fn start(&self, round_id: &str, duration: Option<i64>) -> Result<RoundWindow> {
        self.transition(round_id, "start", true, |round, now| round.start(now, duration))
            .await
    }

    pub async fn pause(&self, round_id: &str) -> Result<RoundWindow> {
        self.transition(round_id, "pause", false, |round, now| round.pause(now))
            .await
    }

    pub async fn resume(&self, round_id: &str) -> Result<RoundWindow> {
        self.transition(round_id, "resume", false, |round, now| round.resume(now))
            .await
    }

    pub async fn restart(&self, round_id: &str, duration: Option<i64>) -> Result<RoundWindow> {
        self.transition(round_id, "restart", true, |round, now| {
            round.restart(now, duration)
        })
        .await
    }

    pub async fn end(&self, round_id: &str) -> Result<RoundWindow> {
        self.transition(round_id, "end", false, |round, now| {
            round.end(now);
            Ok(())
        })
        .await
    }

    pub async fn lock(&self, round_id: &str) -> Result<RoundWindow> {
        self.transition(round_id, "lock", true, |round, _| {
            round.lock();
            Ok(())
        })
        .await
    }

    pub async fn unlock(&self, round_id: &str) -> Result<RoundWindow> {
        self.transition(round_id, "unlock", true, |round, _| {
            round.unlock();
            Ok(())
        })
        .await
    }

    /// Timer view of a round. Unknown rounds read as a locked placeholder
    /// and are not created.
    pub async fn window(&self, round_id: &str) -> Result<RoundWindow> {
        let now = self.clock.now();
        let round = self
            .store
            .round(round_id)
            .await?
            .unwrap_or_else(|| Round::placeholder(round_id));
        Ok(round.window(now))
    }

    /// Timer views of every stored round, ordered by id.
    pub async fn status(&self) -> Result<Vec<RoundWindow>> {
        let now = self.clock.now();
        let rounds = self.store.rounds().await?;
        Ok(rounds.iter().map(|round| round.window(now)).collect())
    }

    /// Gate a submission on the round's state. Returns the admission time.
    ///
    /// A round found past its deadline is ended and saved before the
    /// rejection is returned.
    #[instrument(skip(self))]
    pub async fn admit(&self, round_id: &str) -> Result<DateTime<Utc>> {
        let lock = self.lock_for(round_id);
        let _guard = lock.lock().await;

        let now = self.clock.now();
        let mut round = self
            .store
            .round(round_id)
            .await?
            .ok_or_else(|| ContestError::round_not_found(round_id))?;

        match round.admit(now) {
            Ok(()) => Ok(now),
            Err(reason) => {
                if reason == InadmissibleReason::TimeExpired {
                    self.store.save_round(&round).await?;
                    info!(round_id, "Round time over, round ended");
                }
                warn!(round_id, %reason, "Submission not admitted");
                Err(ContestError::RoundInactive(reason))
            }
        }
    }
}
