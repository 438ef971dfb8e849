use super::states::ProtectionState;
use serde::{Deserialize, Serialize};

/// What a state waiter does with one observed protection state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WaitDecision {
    /// Target reached, stop polling with success
    Reached,
    /// Not there yet, sleep and observe again
    KeepWaiting,
}

impl WaitDecision {
    pub fn is_reached(&self) -> bool {
        matches!(self, Self::Reached)
    }
}

/// Trait for the target condition a protection-state waiter polls for
pub trait ProtectionGuard: Send + Sync {
    /// Classify an observed state
    fn evaluate(&self, state: ProtectionState) -> WaitDecision;

    /// Get a description of this guard for logging
    fn description(&self) -> &'static str;
}

/// Reached once primary and secondary are both running
#[derive(Debug, Clone, Copy, Default)]
pub struct ProtectedGuard;

impl ProtectionGuard for ProtectedGuard {
    fn evaluate(&self, state: ProtectionState) -> WaitDecision {
        match state {
            ProtectionState::Running => WaitDecision::Reached,
            ProtectionState::Starting | ProtectionState::NeedSecondary => {
                WaitDecision::KeepWaiting
            }
            ProtectionState::Disabled | ProtectionState::Enabled => WaitDecision::KeepWaiting,
        }
    }

    fn description(&self) -> &'static str {
        "Secondary must be running alongside the primary"
    }
}

/// Reached once the pair has dropped out of `running` after a promotion
#[derive(Debug, Clone, Copy, Default)]
pub struct FailoverStartedGuard;

impl ProtectionGuard for FailoverStartedGuard {
    fn evaluate(&self, state: ProtectionState) -> WaitDecision {
        match state {
            ProtectionState::Starting | ProtectionState::NeedSecondary => WaitDecision::Reached,
            ProtectionState::Running => WaitDecision::KeepWaiting,
            ProtectionState::Disabled | ProtectionState::Enabled => WaitDecision::KeepWaiting,
        }
    }

    fn description(&self) -> &'static str {
        "Pair must leave running state (failover begun)"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guard_descriptions() {
        assert_eq!(
            ProtectedGuard.description(),
            "Secondary must be running alongside the primary"
        );
        assert_eq!(
            FailoverStartedGuard.description(),
            "Pair must leave running state (failover begun)"
        );
    }

    #[test]
    fn test_guards_are_complementary_on_active_states() {
        for state in [
            ProtectionState::Starting,
            ProtectionState::NeedSecondary,
            ProtectionState::Running,
        ] {
            let protected = ProtectedGuard.evaluate(state).is_reached();
            let failover = FailoverStartedGuard.evaluate(state).is_reached();
            assert_ne!(protected, failover, "state {state} must be terminal for exactly one guard");
        }
    }

    #[test]
    fn test_inactive_states_never_terminate() {
        for state in [ProtectionState::Disabled, ProtectionState::Enabled] {
            assert_eq!(ProtectedGuard.evaluate(state), WaitDecision::KeepWaiting);
            assert_eq!(FailoverStartedGuard.evaluate(state), WaitDecision::KeepWaiting);
        }
    }
}
