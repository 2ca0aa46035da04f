use crate::config::Config;
use std::time::Duration;

/// Bounded fixed-delay poll: at most `max_attempts` status fetches with a
/// constant `delay` between consecutive attempts.
#[derive(Debug, Clone, Copy)]
pub struct PollPlan {
    pub max_attempts: u32,
    pub delay: Duration,
}

/// What a single status fetch observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptOutcome {
    /// Backend reported the summary is ready.
    Ready,
    /// Backend answered with a non-ready status.
    Pending,
    /// The fetch itself failed.
    Failed,
}

/// Terminal state of one poll run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    Ready,
    Exhausted {
        /// True when the final attempt errored rather than reporting a
        /// non-ready status; the caller must drop any stored payload.
        failed_last: bool,
    },
}

/// Next move after an attempt: wait and try again, or stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextStep {
    Backoff(Duration),
    Finish(PollOutcome),
}

impl PollPlan {
    pub fn from_config(cfg: &Config) -> Self {
        Self {
            max_attempts: cfg.polling.max_attempts.max(1),
            delay: Duration::from_secs(cfg.polling.delay_seconds),
        }
    }

    /// Advance the machine after attempt number `attempt` (1-based).
    ///
    /// The delay is only ever scheduled when another attempt will follow;
    /// a ready answer stops immediately and the final attempt falls through
    /// to exhaustion without waiting.
    pub fn advance(&self, attempt: u32, outcome: AttemptOutcome) -> NextStep {
        match outcome {
            AttemptOutcome::Ready => NextStep::Finish(PollOutcome::Ready),
            AttemptOutcome::Pending => {
                if attempt < self.max_attempts {
                    NextStep::Backoff(self.delay)
                } else {
                    NextStep::Finish(PollOutcome::Exhausted { failed_last: false })
                }
            }
            AttemptOutcome::Failed => {
                if attempt < self.max_attempts {
                    NextStep::Backoff(self.delay)
                } else {
                    NextStep::Finish(PollOutcome::Exhausted { failed_last: true })
                }
            }
        }
    }
}
