use chrono::Duration;
use common::{InadmissibleReason, RoundSettings, RoundState};
use contest_server::error::ContestError;

use crate::support::{ScriptedExecutor, TestContest, t0};

#[tokio::test]
async fn full_lifecycle_keeps_budget_across_pauses() {
    let contest = TestContest::new(ScriptedExecutor::echo());
    let rounds = &contest.state.rounds;

    let configured = rounds
        .configure(
            "round2",
            RoundSettings {
                duration: Some(120),
                scheduled_start: Some(t0() + Duration::hours(1)),
                locked: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(configured.state, RoundState::Scheduled);
    assert_eq!(configured.remaining, Some(120));
    assert!(!configured.is_locked);

    let started = rounds.start("round2", None).await.unwrap();
    assert_eq!(started.end_time, Some(t0() + Duration::seconds(120)));

    contest.clock.advance(30);
    let paused = rounds.pause("round2").await.unwrap();
    assert_eq!(paused.elapsed, 30);
    assert_eq!(paused.remaining, Some(90));

    contest.clock.advance(600);
    assert!(matches!(
        rounds.admit("round2").await,
        Err(ContestError::RoundInactive(InadmissibleReason::NotActive(
            RoundState::Paused
        )))
    ));

    let resumed = rounds.resume("round2").await.unwrap();
    assert_eq!(resumed.remaining, Some(90));
    assert_eq!(
        resumed.end_time,
        Some(t0() + Duration::seconds(630 + 90))
    );
    assert!(rounds.admit("round2").await.is_ok());

    let ended = rounds.end("round2").await.unwrap();
    assert_eq!(ended.state, RoundState::Ended);
    assert!(ended.is_locked);
    assert_eq!(ended.remaining, Some(0));

    assert!(matches!(
        rounds
            .configure("round2", RoundSettings::default())
            .await,
        Err(ContestError::InvalidTransition(_))
    ));
    assert!(matches!(
        rounds.admit("round2").await,
        Err(ContestError::RoundInactive(InadmissibleReason::NotActive(
            RoundState::Ended
        )))
    ));
}

#[tokio::test]
async fn restart_discards_consumed_time() {
    let contest = TestContest::new(ScriptedExecutor::echo());
    let rounds = &contest.state.rounds;

    rounds.start("round1", Some(300)).await.unwrap();
    contest.clock.advance(100);
    rounds.pause("round1").await.unwrap();

    let restarted = rounds.restart("round1", Some(600)).await.unwrap();
    assert_eq!(restarted.state, RoundState::Active);
    assert_eq!(restarted.elapsed, 0);
    assert_eq!(restarted.remaining, Some(600));
}

#[tokio::test]
async fn configure_is_refused_while_running() {
    let contest = TestContest::new(ScriptedExecutor::echo());
    let rounds = &contest.state.rounds;

    rounds.start("round1", Some(300)).await.unwrap();
    let err = rounds
        .configure(
            "round1",
            RoundSettings {
                duration: Some(10),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.code(), "INVALID_TRANSITION");
    assert_eq!(rounds.window("round1").await.unwrap().duration, 300);
}

#[tokio::test]
async fn lock_and_unlock_leave_state_alone() {
    let contest = TestContest::new(ScriptedExecutor::echo());
    let rounds = &contest.state.rounds;

    rounds.start("round1", Some(300)).await.unwrap();
    let locked = rounds.lock("round1").await.unwrap();
    assert_eq!(locked.state, RoundState::Active);
    assert!(locked.is_locked);
    assert!(matches!(
        rounds.admit("round1").await,
        Err(ContestError::RoundInactive(InadmissibleReason::Locked))
    ));

    let unlocked = rounds.unlock("round1").await.unwrap();
    assert!(!unlocked.is_locked);
    assert!(rounds.admit("round1").await.is_ok());
}

#[tokio::test]
async fn round_without_duration_never_expires() {
    let contest = TestContest::new(ScriptedExecutor::echo());
    let rounds = &contest.state.rounds;

    let started = rounds.start("round1", None).await.unwrap();
    assert_eq!(started.end_time, None);
    assert_eq!(started.remaining, None);

    contest.clock.advance(86_400 * 30);
    assert!(rounds.admit("round1").await.is_ok());
}

#[tokio::test]
async fn status_lists_every_round_by_id() {
    let contest = TestContest::new(ScriptedExecutor::echo());
    let rounds = &contest.state.rounds;

    rounds.start("round2", Some(60)).await.unwrap();
    rounds
        .configure("round1", RoundSettings::default())
        .await
        .unwrap();

    let ids: Vec<_> = rounds
        .status()
        .await
        .unwrap()
        .into_iter()
        .map(|w| w.id)
        .collect();
    assert_eq!(ids, ["round1", "round2"]);
}
