//! Round clock: a pure state machine over a round's timing fields.
//!
//! Every transition takes `now` explicitly, so the machine never reads the
//! wall clock itself. While a round is active, `end_time` is the only live
//! timing source; `elapsed_ms` accumulates active time and is advanced only
//! when the round is paused. Banking milliseconds keeps sub-second stretches
//! from being dropped on every pause.

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::RoundState;

/// Longest accepted round budget, in seconds.
pub const MAX_DURATION_SECS: i64 = 366 * 24 * 3600;

/// Timing document for one contest round.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Round {
    pub id: String,
    #[serde(default)]
    pub state: RoundState,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    /// Total budget in seconds. Zero means no expiry is enforced.
    #[serde(default)]
    pub duration: i64,
    /// Active milliseconds consumed before the current countdown started.
    #[serde(default)]
    pub elapsed_ms: i64,
    #[serde(default)]
    pub is_locked: bool,
    /// Announced start, informational only.
    pub scheduled_start: Option<DateTime<Utc>>,
}

/// Baseline fields accepted by [`Round::configure`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundSettings {
    pub duration: Option<i64>,
    pub scheduled_start: Option<DateTime<Utc>>,
    pub locked: Option<bool>,
}

/// Read-only view handed to timer displays.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundWindow {
    pub id: String,
    pub state: RoundState,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub duration: i64,
    pub elapsed: i64,
    /// Seconds left, `None` when the round has no expiry.
    pub remaining: Option<i64>,
    pub is_locked: bool,
    pub scheduled_start: Option<DateTime<Utc>>,
}

/// Rejected round transition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoundError {
    #[error("cannot {action} round while it is {state}")]
    InvalidTransition {
        state: RoundState,
        action: &'static str,
    },
    #[error("round duration of {0} s exceeds the maximum of 366 days")]
    InvalidDuration(i64),
}

/// Why a submission cannot be admitted right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "reason", content = "state")]
pub enum InadmissibleReason {
    /// Not started, paused, or already completed.
    NotActive(RoundState),
    Locked,
    /// The countdown ran out; the round has just been ended.
    TimeExpired,
}

impl fmt::Display for InadmissibleReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotActive(RoundState::Scheduled) => f.write_str("round has not started"),
            Self::NotActive(RoundState::Ended) => f.write_str("round is completed"),
            Self::NotActive(state) => write!(f, "round is not active ({state})"),
            Self::Locked => f.write_str("round is locked"),
            Self::TimeExpired => f.write_str("round time is over"),
        }
    }
}

fn checked_duration(duration: i64) -> Result<i64, RoundError> {
    if duration > MAX_DURATION_SECS {
        return Err(RoundError::InvalidDuration(duration));
    }
    Ok(duration)
}

/// Deadline of a countdown started at `now` with `elapsed_ms` already spent.
fn countdown_end(
    now: DateTime<Utc>,
    duration: i64,
    elapsed_ms: i64,
) -> Result<Option<DateTime<Utc>>, RoundError> {
    if duration <= 0 {
        return Ok(None);
    }
    Duration::try_milliseconds(duration.saturating_mul(1000) - elapsed_ms)
        .and_then(|left| now.checked_add_signed(left))
        .map(Some)
        .ok_or(RoundError::InvalidDuration(duration))
}

impl Round {
    /// A freshly created round: scheduled, unlocked, no budget.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            state: RoundState::Scheduled,
            start_time: None,
            end_time: None,
            duration: 0,
            elapsed_ms: 0,
            is_locked: false,
            scheduled_start: None,
        }
    }

    /// Stand-in returned for rounds that have never been touched. It is
    /// locked so nothing is admitted against it.
    pub fn placeholder(id: impl Into<String>) -> Self {
        Self {
            is_locked: true,
            ..Self::new(id)
        }
    }

    fn reject(&self, action: &'static str) -> RoundError {
        RoundError::InvalidTransition {
            state: self.state,
            action,
        }
    }

    fn budget_ms(&self) -> i64 {
        self.duration.saturating_mul(1000)
    }

    /// Set baseline fields. Not allowed while the round is counting down.
    pub fn configure(&mut self, settings: RoundSettings) -> Result<(), RoundError> {
        if matches!(self.state, RoundState::Active | RoundState::Ended) {
            return Err(self.reject("configure"));
        }
        if let Some(duration) = settings.duration {
            let duration = checked_duration(duration.max(0))?;
            self.duration = duration;
            self.elapsed_ms = self.elapsed_ms.min(self.budget_ms());
        }
        if let Some(at) = settings.scheduled_start {
            self.scheduled_start = Some(at);
        }
        if let Some(locked) = settings.locked {
            self.is_locked = locked;
        }
        Ok(())
    }

    /// Begin a fresh countdown. Calling this on an active round re-stamps the
    /// start time, restarting the countdown from the full budget.
    pub fn start(
        &mut self,
        now: DateTime<Utc>,
        duration_override: Option<i64>,
    ) -> Result<(), RoundError> {
        if self.state.is_terminal() {
            return Err(self.reject("start"));
        }
        let duration = match duration_override.filter(|d| *d > 0) {
            Some(duration) => checked_duration(duration)?,
            None => self.duration,
        };
        let deadline = countdown_end(now, duration, 0)?;
        self.duration = duration;
        self.elapsed_ms = 0;
        self.start_time = Some(now);
        self.end_time = deadline;
        self.state = RoundState::Active;
        self.is_locked = false;
        Ok(())
    }

    /// Freeze the countdown, banking the active time spent so far.
    pub fn pause(&mut self, now: DateTime<Utc>) -> Result<(), RoundError> {
        if self.state != RoundState::Active {
            return Err(self.reject("pause"));
        }
        if let Some(start) = self.start_time {
            self.elapsed_ms = self
                .elapsed_ms
                .saturating_add((now - start).num_milliseconds().max(0));
        }
        if self.duration > 0 {
            self.elapsed_ms = self.elapsed_ms.min(self.budget_ms());
        }
        self.start_time = None;
        self.end_time = None;
        self.state = RoundState::Paused;
        Ok(())
    }

    /// Continue a paused countdown with whatever budget is left.
    pub fn resume(&mut self, now: DateTime<Utc>) -> Result<(), RoundError> {
        if self.state != RoundState::Paused {
            return Err(self.reject("resume"));
        }
        self.end_time = countdown_end(now, self.duration, self.elapsed_ms)?;
        self.start_time = Some(now);
        self.state = RoundState::Active;
        self.is_locked = false;
        Ok(())
    }

    /// Start over from any non-terminal state, discarding consumed time.
    pub fn restart(
        &mut self,
        now: DateTime<Utc>,
        duration_override: Option<i64>,
    ) -> Result<(), RoundError> {
        if self.state.is_terminal() {
            return Err(self.reject("restart"));
        }
        self.start(now, duration_override)
    }

    /// Close the round for good. A second call changes nothing.
    pub fn end(&mut self, now: DateTime<Utc>) {
        if self.state.is_terminal() {
            self.is_locked = true;
            return;
        }
        self.end_time = Some(now);
        self.state = RoundState::Ended;
        self.is_locked = true;
    }

    pub fn lock(&mut self) {
        self.is_locked = true;
    }

    pub fn unlock(&mut self) {
        self.is_locked = false;
    }

    /// Check whether a submission may be accepted at `now`.
    ///
    /// This is not a pure predicate: an active round whose deadline has
    /// passed is moved to `ended` + locked and `TimeExpired` is returned.
    /// That happens exactly once; afterwards the round reports
    /// `NotActive(Ended)`. Callers must persist the round on `TimeExpired`.
    pub fn admit(&mut self, now: DateTime<Utc>) -> Result<(), InadmissibleReason> {
        if self.state != RoundState::Active {
            return Err(InadmissibleReason::NotActive(self.state));
        }
        if self.is_locked {
            return Err(InadmissibleReason::Locked);
        }
        match self.end_time {
            Some(deadline) if now > deadline => {
                self.state = RoundState::Ended;
                self.is_locked = true;
                Err(InadmissibleReason::TimeExpired)
            }
            _ => Ok(()),
        }
    }

    /// Active seconds consumed as of `now`.
    pub fn elapsed_at(&self, now: DateTime<Utc>) -> i64 {
        let running = match (self.state, self.start_time) {
            (RoundState::Active, Some(start)) => (now - start).num_milliseconds().max(0),
            _ => 0,
        };
        let total = self.elapsed_ms.saturating_add(running);
        let total = if self.duration > 0 {
            total.min(self.budget_ms())
        } else {
            total
        };
        total / 1000
    }

    /// Seconds left as of `now`, or `None` for rounds without expiry.
    pub fn remaining(&self, now: DateTime<Utc>) -> Option<i64> {
        if self.duration <= 0 {
            return None;
        }
        let left = match self.state {
            RoundState::Active => self
                .end_time
                .map(|deadline| (deadline - now).num_seconds())
                .unwrap_or_else(|| self.unspent_secs()),
            RoundState::Scheduled | RoundState::Paused => self.unspent_secs(),
            RoundState::Ended => 0,
        };
        Some(left.max(0))
    }

    fn unspent_secs(&self) -> i64 {
        (self.budget_ms() - self.elapsed_ms) / 1000
    }

    pub fn window(&self, now: DateTime<Utc>) -> RoundWindow {
        RoundWindow {
            id: self.id.clone(),
            state: self.state,
            start_time: self.start_time,
            end_time: self.end_time,
            duration: self.duration,
            elapsed: self.elapsed_at(now),
            remaining: self.remaining(now),
            is_locked: self.is_locked,
            scheduled_start: self.scheduled_start,
        }
    }
}
