use gapsheet::config::Config;
use gapsheet::poll::{AttemptOutcome, NextStep, PollOutcome, PollPlan};
use std::time::Duration;

fn mk_plan(max_attempts: u32, delay_secs: u64) -> PollPlan {
    PollPlan {
        max_attempts,
        delay: Duration::from_secs(delay_secs),
    }
}

#[test]
fn ready_finishes_immediately() {
    let plan = mk_plan(5, 10);
    assert_eq!(
        plan.advance(1, AttemptOutcome::Ready),
        NextStep::Finish(PollOutcome::Ready)
    );
    assert_eq!(
        plan.advance(5, AttemptOutcome::Ready),
        NextStep::Finish(PollOutcome::Ready)
    );
}

#[test]
fn pending_backs_off_until_budget_spent() {
    let plan = mk_plan(5, 10);
    for attempt in 1..5 {
        assert_eq!(
            plan.advance(attempt, AttemptOutcome::Pending),
            NextStep::Backoff(Duration::from_secs(10))
        );
    }
    assert_eq!(
        plan.advance(5, AttemptOutcome::Pending),
        NextStep::Finish(PollOutcome::Exhausted { failed_last: false })
    );
}

#[test]
fn failure_backs_off_like_pending_until_final_attempt() {
    let plan = mk_plan(5, 10);
    assert_eq!(
        plan.advance(4, AttemptOutcome::Failed),
        NextStep::Backoff(Duration::from_secs(10))
    );
    assert_eq!(
        plan.advance(5, AttemptOutcome::Failed),
        NextStep::Finish(PollOutcome::Exhausted { failed_last: true })
    );
}

#[test]
fn single_attempt_plan_never_backs_off() {
    let plan = mk_plan(1, 10);
    assert!(matches!(
        plan.advance(1, AttemptOutcome::Pending),
        NextStep::Finish(PollOutcome::Exhausted { failed_last: false })
    ));
    assert!(matches!(
        plan.advance(1, AttemptOutcome::Failed),
        NextStep::Finish(PollOutcome::Exhausted { failed_last: true })
    ));
}

#[test]
fn from_config_reads_polling_section() {
    let cfg = Config::default();
    let plan = PollPlan::from_config(&cfg);
    assert_eq!(plan.max_attempts, 5);
    assert_eq!(plan.delay, Duration::from_secs(10));
}

#[test]
fn from_config_clamps_zero_attempts_to_one() {
    let mut cfg = Config::default();
    cfg.polling.max_attempts = 0;
    let plan = PollPlan::from_config(&cfg);
    assert_eq!(plan.max_attempts, 1);
}
