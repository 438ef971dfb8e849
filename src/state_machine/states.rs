use serde::{Deserialize, Serialize};
use std::fmt;

/// State of a remote long-running operation as reported by the endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OperationState {
    /// Accepted but not yet started
    Queued,
    /// Executing on the endpoint
    Running,
    /// Completed successfully
    Success,
    /// Completed with an error
    Error,
}

impl OperationState {
    /// Check if this is a terminal state (polling stops)
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Success | Self::Error)
    }

    /// Check if this state reports a successful completion
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

impl fmt::Display for OperationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Queued => write!(f, "queued"),
            Self::Running => write!(f, "running"),
            Self::Success => write!(f, "success"),
            Self::Error => write!(f, "error"),
        }
    }
}

impl std::str::FromStr for OperationState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "queued" => Ok(Self::Queued),
            "running" => Ok(Self::Running),
            "success" => Ok(Self::Success),
            "error" => Ok(Self::Error),
            _ => Err(format!("Invalid operation state: {s}")),
        }
    }
}

/// Observable protection (fault tolerance) state of a workload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ProtectionState {
    /// No protection configured
    Disabled,
    /// Protection configured, no live secondary
    Enabled,
    /// Secondary is starting up
    Starting,
    /// Protection configured but a new secondary must be created
    NeedSecondary,
    /// Primary and secondary both running, workload is protected
    Running,
}

impl ProtectionState {
    /// Protection is configured and must be removed on teardown
    pub fn is_removable(&self) -> bool {
        matches!(self, Self::Enabled | Self::Running)
    }

    /// A secondary is (re)starting: the pair is not protected yet
    pub fn is_transitional(&self) -> bool {
        matches!(self, Self::Starting | Self::NeedSecondary)
    }

    /// Primary and secondary are both live
    pub fn is_protected(&self) -> bool {
        matches!(self, Self::Running)
    }
}

impl Default for ProtectionState {
    fn default() -> Self {
        Self::Disabled
    }
}

impl fmt::Display for ProtectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disabled => write!(f, "disabled"),
            Self::Enabled => write!(f, "enabled"),
            Self::Starting => write!(f, "starting"),
            Self::NeedSecondary => write!(f, "needSecondary"),
            Self::Running => write!(f, "running"),
        }
    }
}

impl std::str::FromStr for ProtectionState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "disabled" => Ok(Self::Disabled),
            "enabled" => Ok(Self::Enabled),
            "starting" => Ok(Self::Starting),
            "needSecondary" => Ok(Self::NeedSecondary),
            "running" => Ok(Self::Running),
            _ => Err(format!("Invalid protection state: {s}")),
        }
    }
}

/// Power state of a workload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PowerState {
    PoweredOn,
    PoweredOff,
    Suspended,
}

impl PowerState {
    pub fn is_powered_on(&self) -> bool {
        matches!(self, Self::PoweredOn)
    }
}

impl Default for PowerState {
    fn default() -> Self {
        Self::PoweredOff
    }
}

impl fmt::Display for PowerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PoweredOn => write!(f, "poweredOn"),
            Self::PoweredOff => write!(f, "poweredOff"),
            Self::Suspended => write!(f, "suspended"),
        }
    }
}

impl std::str::FromStr for PowerState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "poweredOn" => Ok(Self::PoweredOn),
            "poweredOff" => Ok(Self::PoweredOff),
            "suspended" => Ok(Self::Suspended),
            _ => Err(format!("Invalid power state: {s}")),
        }
    }
}

/// Connection state of a compute host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ConnectionState {
    Connected,
    Disconnected,
    NotResponding,
}

impl ConnectionState {
    /// Only connected hosts count toward cluster eligibility
    pub fn is_connected(&self) -> bool {
        matches!(self, Self::Connected)
    }
}

impl Default for ConnectionState {
    fn default() -> Self {
        Self::Connected
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connected => write!(f, "connected"),
            Self::Disconnected => write!(f, "disconnected"),
            Self::NotResponding => write!(f, "notResponding"),
        }
    }
}

impl std::str::FromStr for ConnectionState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "connected" => Ok(Self::Connected),
            "disconnected" => Ok(Self::Disconnected),
            "notResponding" => Ok(Self::NotResponding),
            _ => Err(format!("Invalid connection state: {s}")),
        }
    }
}
