#![allow(dead_code)]

use proptest::prelude::*;
use proptest::strategy::Just;

use ft_lifecycle::state_machine::{OperationState, ProtectionState};

/// Strategy for generating non-terminal operation states
pub fn non_terminal_operation_state() -> impl Strategy<Value = OperationState> {
    prop_oneof![Just(OperationState::Queued), Just(OperationState::Running)]
}

/// Strategy for generating any protection state
pub fn protection_state_strategy() -> impl Strategy<Value = ProtectionState> {
    prop_oneof![
        Just(ProtectionState::Disabled),
        Just(ProtectionState::Enabled),
        Just(ProtectionState::Starting),
        Just(ProtectionState::NeedSecondary),
        Just(ProtectionState::Running),
    ]
}

/// Strategy for generating the states the two waiters disagree on
pub fn transitional_protection_state() -> impl Strategy<Value = ProtectionState> {
    prop_oneof![
        Just(ProtectionState::Starting),
        Just(ProtectionState::NeedSecondary),
        Just(ProtectionState::Running),
    ]
}

/// Strategy for generating timeout budgets in whole seconds
pub fn timeout_seconds_strategy() -> impl Strategy<Value = u64> {
    0u64..=600
}

/// Strategy for generating loop delays in whole seconds
pub fn loop_delay_strategy() -> impl Strategy<Value = u64> {
    1u64..=30
}
