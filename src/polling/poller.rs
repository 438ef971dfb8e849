//! # Polling Skeleton
//!
//! Budgeted observe-classify-sleep loop shared by the task monitor and the
//! protection-state waiters.
//!
//! A wait of `timeout` seconds is allotted `timeout / loop_delay` observations.
//! Every non-terminal observation consumes one unit of budget and is followed by
//! a pause of `poll_interval`. The pause is cancellable through a
//! [`CancelSignal`], which leaves the observable timing unchanged when no
//! cancellation is ever requested.

use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;
use tokio::sync::watch;

use crate::client::RemoteResult;
use crate::constants::timing;

/// Receiving side of a cancellation request
#[derive(Debug, Clone)]
pub struct CancelSignal {
    receiver: watch::Receiver<bool>,
}

/// Sending side of a cancellation request
#[derive(Debug)]
pub struct CancelHandle {
    sender: watch::Sender<bool>,
}

impl CancelHandle {
    /// Ask every wait observing the paired signal to stop at its next pause
    pub fn cancel(&self) {
        self.sender.send_replace(true);
    }
}

impl CancelSignal {
    /// Create a connected handle/signal pair
    pub fn pair() -> (CancelHandle, CancelSignal) {
        let (sender, receiver) = watch::channel(false);
        (CancelHandle { sender }, CancelSignal { receiver })
    }

    pub fn is_cancelled(&self) -> bool {
        *self.receiver.borrow()
    }
}

/// Cadence of every polling loop
#[derive(Debug, Clone)]
pub struct PollSettings {
    /// Budget divisor in seconds
    pub loop_delay_seconds: u64,
    /// Sleep between non-terminal observations
    pub poll_interval: Duration,
    pub cancel: Option<CancelSignal>,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            loop_delay_seconds: timing::LOOP_DELAY_SECONDS,
            poll_interval: Duration::from_millis(timing::POLL_INTERVAL_MS),
            cancel: None,
        }
    }
}

impl PollSettings {
    /// Settings that never sleep; budget arithmetic is unchanged
    pub fn immediate() -> Self {
        Self {
            poll_interval: Duration::ZERO,
            ..Self::default()
        }
    }

    pub fn with_cancel_signal(mut self, signal: CancelSignal) -> Self {
        self.cancel = Some(signal);
        self
    }

    /// Number of observations allotted to a wait of `timeout`
    pub fn budget_for(&self, timeout: Duration) -> PollBudget {
        PollBudget::new(timeout.as_secs() / self.loop_delay_seconds.max(1))
    }

    /// Sleep one poll interval. Returns `false` when the wait was cancelled.
    pub async fn pause(&self) -> bool {
        let Some(signal) = &self.cancel else {
            tokio::time::sleep(self.poll_interval).await;
            return true;
        };

        let mut receiver = signal.receiver.clone();
        if *receiver.borrow() {
            return false;
        }

        let sleep = tokio::time::sleep(self.poll_interval);
        tokio::pin!(sleep);

        tokio::select! {
            _ = &mut sleep => true,
            cancelled = receiver.wait_for(|flag| *flag) => match cancelled {
                Ok(_) => false,
                // sender gone: nobody can cancel any more, finish the interval
                Err(_) => {
                    sleep.await;
                    true
                }
            },
        }
    }
}

/// Remaining observation budget of one wait
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollBudget {
    remaining: u64,
    observations: u64,
}

impl PollBudget {
    pub fn new(count: u64) -> Self {
        Self {
            remaining: count,
            observations: 0,
        }
    }

    pub fn has_remaining(&self) -> bool {
        self.remaining > 0
    }

    pub fn remaining(&self) -> u64 {
        self.remaining
    }

    pub fn observations(&self) -> u64 {
        self.observations
    }

    fn record_observation(&mut self) {
        self.observations += 1;
    }

    fn consume(&mut self) {
        self.remaining = self.remaining.saturating_sub(1);
    }
}

/// Classification of one observation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollStep {
    Succeed,
    Fail,
    Continue,
}

/// Result of a polling loop
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum PollOutcome {
    /// Target reached
    Succeeded { observations: u64 },
    /// The remote operation reported an error
    Failed { observations: u64 },
    /// Budget exhausted without a terminal observation
    TimedOut { observations: u64 },
    /// No operation handle to monitor
    MissingHandle,
    /// Querying the endpoint failed
    Faulted { message: String },
    /// The wait was cancelled between two observations
    Cancelled { observations: u64 },
}

impl PollOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded { .. })
    }

    pub fn observations(&self) -> u64 {
        match self {
            Self::Succeeded { observations }
            | Self::Failed { observations }
            | Self::TimedOut { observations }
            | Self::Cancelled { observations } => *observations,
            Self::MissingHandle | Self::Faulted { .. } => 0,
        }
    }

    /// Short label for log lines
    pub fn label(&self) -> &'static str {
        match self {
            Self::Succeeded { .. } => "succeeded",
            Self::Failed { .. } => "failed",
            Self::TimedOut { .. } => "timed_out",
            Self::MissingHandle => "missing_handle",
            Self::Faulted { .. } => "faulted",
            Self::Cancelled { .. } => "cancelled",
        }
    }
}

/// Observe until `classify` reports a terminal step or the budget runs out
///
/// Errors returned by `observe` end the loop with [`PollOutcome::Faulted`]; they
/// never propagate to the caller.
pub async fn poll_until<T, F, Fut, C>(
    settings: &PollSettings,
    timeout: Duration,
    mut observe: F,
    mut classify: C,
) -> PollOutcome
where
    F: FnMut() -> Fut,
    Fut: Future<Output = RemoteResult<T>>,
    C: FnMut(&T) -> PollStep,
{
    let mut budget = settings.budget_for(timeout);

    while budget.has_remaining() {
        let observed = match observe().await {
            Ok(value) => value,
            Err(e) => {
                return PollOutcome::Faulted {
                    message: e.to_string(),
                }
            }
        };
        budget.record_observation();

        match classify(&observed) {
            PollStep::Succeed => {
                return PollOutcome::Succeeded {
                    observations: budget.observations(),
                }
            }
            PollStep::Fail => {
                return PollOutcome::Failed {
                    observations: budget.observations(),
                }
            }
            PollStep::Continue => {
                if !settings.pause().await {
                    return PollOutcome::Cancelled {
                        observations: budget.observations(),
                    };
                }
                budget.consume();
            }
        }
    }

    PollOutcome::TimedOut {
        observations: budget.observations(),
    }
}
