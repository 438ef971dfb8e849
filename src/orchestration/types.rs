//! # Orchestration Types
//!
//! Step vocabulary, per-step outcomes and the typed report of one lifecycle run.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::constants::exit_codes;
use crate::models::{OperationKind, ReplicaRef, Topology, WorkloadRef};
use crate::polling::PollOutcome;
use crate::state_machine::ProtectionState;
use crate::topology::ResolutionError;

/// Steps of the protection lifecycle, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleStep {
    EnableProtection,
    PowerOnPrimary,
    AwaitProtected,
    DiscoverReplica,
    DisableReplica,
    EnableReplica,
    AwaitReprotected,
    PromoteReplica,
    AwaitFailoverStarted,
    AwaitPromotedProtected,
    DisableProtection,
}

impl LifecycleStep {
    pub const ALL: [LifecycleStep; 11] = [
        Self::EnableProtection,
        Self::PowerOnPrimary,
        Self::AwaitProtected,
        Self::DiscoverReplica,
        Self::DisableReplica,
        Self::EnableReplica,
        Self::AwaitReprotected,
        Self::PromoteReplica,
        Self::AwaitFailoverStarted,
        Self::AwaitPromotedProtected,
        Self::DisableProtection,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EnableProtection => "enable_protection",
            Self::PowerOnPrimary => "power_on_primary",
            Self::AwaitProtected => "await_protected",
            Self::DiscoverReplica => "discover_replica",
            Self::DisableReplica => "disable_replica",
            Self::EnableReplica => "enable_replica",
            Self::AwaitReprotected => "await_reprotected",
            Self::PromoteReplica => "promote_replica",
            Self::AwaitFailoverStarted => "await_failover_started",
            Self::AwaitPromotedProtected => "await_promoted_protected",
            Self::DisableProtection => "disable_protection",
        }
    }
}

impl fmt::Display for LifecycleStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a step failed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FailureKind {
    /// The remote operation reported `error`
    OperationError,
    /// Budget exhausted before a terminal observation
    TimedOut { observations: u64 },
    /// The endpoint accepted the call without returning a handle
    MissingHandle,
    /// A call to the endpoint failed
    RemoteFault { message: String },
    Cancelled,
    /// No workload named like the primary on the secondary host
    ReplicaNotFound,
}

impl FailureKind {
    /// Failure carried by a polling outcome; `None` for success
    pub fn from_poll(outcome: &PollOutcome) -> Option<Self> {
        match outcome {
            PollOutcome::Succeeded { .. } => None,
            PollOutcome::Failed { .. } => Some(Self::OperationError),
            PollOutcome::TimedOut { observations } => Some(Self::TimedOut {
                observations: *observations,
            }),
            PollOutcome::MissingHandle => Some(Self::MissingHandle),
            PollOutcome::Faulted { message } => Some(Self::RemoteFault {
                message: message.clone(),
            }),
            PollOutcome::Cancelled { .. } => Some(Self::Cancelled),
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OperationError => f.write_str("operation reported error"),
            Self::TimedOut { observations } => {
                write!(f, "timed out after {observations} observation(s)")
            }
            Self::MissingHandle => f.write_str("no operation handle returned"),
            Self::RemoteFault { message } => write!(f, "remote fault: {message}"),
            Self::Cancelled => f.write_str("cancelled"),
            Self::ReplicaNotFound => f.write_str("secondary replica not found"),
        }
    }
}

/// Why a step was not attempted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum SkipReason {
    /// A step this one depends on failed
    DependencyFailed { step: LifecycleStep },
    /// Protection was never turned on, so there is nothing to remove
    ProtectionNeverEnabled,
    /// Re-protection failed and the policy requires it before promoting
    ReprotectionRequired,
    /// Protection was in a state removal does not apply to
    NotRemovable { state: ProtectionState },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DependencyFailed { step } => write!(f, "{step} did not succeed"),
            Self::ProtectionNeverEnabled => f.write_str("protection was never enabled"),
            Self::ReprotectionRequired => {
                f.write_str("re-protection failed and is required before promoting")
            }
            Self::NotRemovable { state } => write!(f, "protection state is {state}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StepOutcome {
    Succeeded,
    Failed { failure: FailureKind },
    Skipped { skip: SkipReason },
}

impl StepOutcome {
    pub fn failed(failure: FailureKind) -> Self {
        Self::Failed { failure }
    }

    pub fn skipped(skip: SkipReason) -> Self {
        Self::Skipped { skip }
    }

    /// Outcome of a step whose whole work is one polling loop
    pub fn from_poll(outcome: &PollOutcome) -> Self {
        match FailureKind::from_poll(outcome) {
            None => Self::Succeeded,
            Some(failure) => Self::failed(failure),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded)
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Succeeded => "succeeded",
            Self::Failed { .. } => "failed",
            Self::Skipped { .. } => "skipped",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepRecord {
    pub step: LifecycleStep,
    pub outcome: StepOutcome,
    pub finished_at: DateTime<Utc>,
}

/// One operation issued by the rollback guard
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollbackAction {
    pub operation: OperationKind,
    pub outcome: PollOutcome,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollbackReport {
    /// False when there was no workload to restore
    pub attempted: bool,
    pub actions: Vec<RollbackAction>,
    /// Faults caught while reading workload state
    pub faults: Vec<String>,
}

impl RollbackReport {
    pub fn not_attempted() -> Self {
        Self::default()
    }

    pub fn issued_operations(&self) -> Vec<OperationKind> {
        self.actions.iter().map(|action| action.operation).collect()
    }

    /// Every issued operation succeeded and no fault was swallowed
    pub fn is_clean(&self) -> bool {
        self.faults.is_empty() && self.actions.iter().all(|a| a.outcome.is_success())
    }
}

/// Mutable state threaded through the steps of one run
#[derive(Debug, Clone)]
pub struct RunContext {
    pub run_id: Uuid,
    pub topology: Topology,
    /// Primary workload; observed states are refreshed as the run progresses
    pub workload: WorkloadRef,
    pub replica: Option<ReplicaRef>,
    pub protection_enabled: bool,
    pub steps: Vec<StepRecord>,
}

impl RunContext {
    pub fn new(run_id: Uuid, topology: Topology) -> Self {
        let workload = topology.workload.clone();
        Self {
            run_id,
            topology,
            workload,
            replica: None,
            protection_enabled: false,
            steps: Vec::with_capacity(LifecycleStep::ALL.len()),
        }
    }

    pub fn record(&mut self, step: LifecycleStep, outcome: StepOutcome) {
        self.steps.push(StepRecord {
            step,
            outcome,
            finished_at: Utc::now(),
        });
    }

    pub fn outcome_of(&self, step: LifecycleStep) -> Option<&StepOutcome> {
        self.steps
            .iter()
            .rev()
            .find(|record| record.step == step)
            .map(|record| &record.outcome)
    }

    pub fn succeeded(&self, step: LifecycleStep) -> bool {
        self.outcome_of(step).is_some_and(StepOutcome::is_success)
    }
}

/// Typed result of a whole run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub run_id: Uuid,
    pub cluster: String,
    pub workload: Option<String>,
    pub resolution: Option<ResolutionError>,
    pub steps: Vec<StepRecord>,
    pub rollback: RollbackReport,
    pub panicked: bool,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl RunReport {
    /// Resolution passed, no step failed and the run did not panic
    pub fn succeeded(&self) -> bool {
        self.resolution.is_none()
            && !self.panicked
            && self.steps.iter().all(|record| !record.outcome.is_failure())
    }

    /// First step that failed
    pub fn failed_step(&self) -> Option<&StepRecord> {
        self.steps.iter().find(|record| record.outcome.is_failure())
    }

    /// Process exit status of the run
    ///
    /// Residue left by the rollback outranks a failed step since it needs an
    /// operator to clean up.
    pub fn exit_code(&self) -> i32 {
        if self.resolution.is_some() {
            exit_codes::RESOLUTION_FAILED
        } else if !self.rollback.is_clean() {
            exit_codes::ROLLBACK_INCOMPLETE
        } else if !self.succeeded() {
            exit_codes::STEP_FAILED
        } else {
            exit_codes::SUCCESS
        }
    }
}
