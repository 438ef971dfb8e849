// State vocabulary for the protection lifecycle
//
// Closed enums for everything the endpoint reports (operation, protection, power and
// connection states) plus the guards that decide when a protection-state wait is over.

pub mod guards;
pub mod states;

// Re-export main types for convenient access
pub use guards::{FailoverStartedGuard, ProtectedGuard, ProtectionGuard, WaitDecision};
pub use states::{ConnectionState, OperationState, PowerState, ProtectionState};
