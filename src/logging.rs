//! # Structured Logging Module
//!
//! Console logging for the launcher and structured helpers used by the
//! orchestrator to narrate each step.

use std::io::IsTerminal;
use std::sync::OnceLock;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::constants::events;
use crate::models::WorkloadRef;
use crate::orchestration::{LifecycleStep, StepOutcome};
use crate::state_machine::ProtectionState;

static LOGGER_INITIALIZED: OnceLock<()> = OnceLock::new();

/// Initialize console logging
///
/// `RUST_LOG` wins when set; otherwise the level follows the environment
/// (`FT_LIFECYCLE_ENV` or `APP_ENV`). `FT_LIFECYCLE_LOG_FORMAT=json` switches to
/// JSON lines. A subscriber installed earlier is left in place.
pub fn init_console_logging() {
    LOGGER_INITIALIZED.get_or_init(|| {
        let environment = get_environment();
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(get_log_level(&environment)));
        let use_ansi = std::io::stdout().is_terminal();
        let json = wants_json_output();

        let console_layer = if json {
            fmt::layer()
                .json()
                .with_target(true)
                .with_level(true)
                .with_filter(filter)
                .boxed()
        } else {
            fmt::layer()
                .with_target(true)
                .with_level(true)
                .with_ansi(use_ansi)
                .with_filter(filter)
                .boxed()
        };

        if tracing_subscriber::registry()
            .with(console_layer)
            .try_init()
            .is_err()
        {
            tracing::debug!(
                "Global tracing subscriber already initialized - continuing with existing subscriber"
            );
        } else {
            tracing::debug!(
                environment = %environment,
                ansi_colors = use_ansi,
                json,
                "🔧 LOGGING: console logging initialized"
            );
        }
    });
}

fn get_environment() -> String {
    std::env::var("FT_LIFECYCLE_ENV")
        .or_else(|_| std::env::var("APP_ENV"))
        .unwrap_or_else(|_| "development".to_string())
}

fn get_log_level(environment: &str) -> &'static str {
    match environment {
        "production" => "info",
        _ => "debug",
    }
}

fn wants_json_output() -> bool {
    std::env::var("FT_LIFECYCLE_LOG_FORMAT")
        .map(|format| format.eq_ignore_ascii_case("json"))
        .unwrap_or(false)
}

/// Log the outcome of one lifecycle step
pub fn log_step_outcome(step: LifecycleStep, workload: &WorkloadRef, outcome: &StepOutcome) {
    match outcome {
        StepOutcome::Succeeded => tracing::info!(
            event = events::STEP_SUCCEEDED,
            step = %step,
            workload = %workload.name,
            status = outcome.label(),
            "🔧 STEP_OPERATION"
        ),
        StepOutcome::Failed { failure } => tracing::error!(
            event = events::STEP_FAILED,
            step = %step,
            workload = %workload.name,
            status = outcome.label(),
            failure = %failure,
            "❌ STEP_OPERATION"
        ),
        StepOutcome::Skipped { skip } => tracing::warn!(
            event = events::STEP_SKIPPED,
            step = %step,
            workload = %workload.name,
            status = outcome.label(),
            reason = %skip,
            "⏭️ STEP_OPERATION"
        ),
    }
}

/// Log the protection state of a workload after a milestone
pub fn log_protection_state(workload: &WorkloadRef, state: ProtectionState) {
    tracing::info!(
        workload = %workload.name,
        protection_state = %state,
        "🛡️ PROTECTION_STATE"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_mapping() {
        assert_eq!(get_log_level("test"), "debug");
        assert_eq!(get_log_level("development"), "debug");
        assert_eq!(get_log_level("production"), "info");
        assert_eq!(get_log_level("unknown"), "debug");
    }

    #[test]
    fn test_step_outcomes_carry_their_event() {
        init_console_logging();
        let workload = WorkloadRef {
            id: "vm-1".to_string(),
            name: "app-01".to_string(),
            host_id: "host-1".to_string(),
            protection_state: ProtectionState::Running,
            power_state: crate::state_machine::PowerState::PoweredOn,
        };
        let failed = StepOutcome::failed(crate::orchestration::FailureKind::OperationError);
        let skipped = StepOutcome::skipped(crate::orchestration::SkipReason::DependencyFailed {
            step: LifecycleStep::PowerOnPrimary,
        });

        log_step_outcome(LifecycleStep::PowerOnPrimary, &workload, &StepOutcome::Succeeded);
        log_step_outcome(LifecycleStep::PowerOnPrimary, &workload, &failed);
        log_step_outcome(LifecycleStep::AwaitProtected, &workload, &skipped);

        assert_eq!(events::STEP_SUCCEEDED, "lifecycle.step_succeeded");
        assert_eq!(events::STEP_FAILED, "lifecycle.step_failed");
        assert_eq!(events::STEP_SKIPPED, "lifecycle.step_skipped");
    }

    #[test]
    fn test_init_is_idempotent() {
        init_console_logging();
        init_console_logging();
        tracing::info!("still logging");
    }
}
