// Message types read and written by the runtime and CLI

use serde::{Deserialize, Serialize};

use crate::config::NUM_LEGS;
use crate::platform::{LegError, MotorAngle, Pose, SolveError};

// Pose command from a UI/teleop process -> runtime
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PoseCommand {
    pub pitch: f64,
    pub roll: f64,
    // Angles are radians unless this is set
    #[serde(default)]
    pub degrees: bool,
}

impl PoseCommand {
    pub fn pose(&self) -> Pose {
        if self.degrees {
            Pose::from_degrees(self.pitch, self.roll)
        } else {
            Pose::new(self.pitch, self.roll)
        }
    }
}

/// Outcome of one command
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum RuntimeHealth {
    Ok,
    Unreachable,
    BadCommand,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum FaultKind {
    Unreachable,
    Degenerate,
}

/// Why a single leg has no angle
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LegFault {
    pub leg: usize,
    pub kind: FaultKind,
    pub detail: String,
}

impl From<&LegError> for LegFault {
    fn from(err: &LegError) -> Self {
        let kind = match err {
            LegError::Unreachable { .. } => FaultKind::Unreachable,
            LegError::Degenerate { .. } => FaultKind::Degenerate,
        };
        Self {
            leg: err.leg(),
            kind,
            detail: err.to_string(),
        }
    }
}

// Actuation output from runtime -> servo driver, one per command.
// Legs without a solution are null.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ActuationReport {
    pub health: RuntimeHealth,
    pub motor_angles: [Option<f64>; NUM_LEGS],
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub faults: Vec<LegFault>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ActuationReport {
    pub fn from_result(result: &Result<[MotorAngle; NUM_LEGS], SolveError>) -> Self {
        match result {
            Ok(angles) => Self {
                health: RuntimeHealth::Ok,
                motor_angles: angles.map(|a| Some(a.radians())),
                faults: Vec::new(),
                error: None,
            },
            Err(err) => Self {
                health: RuntimeHealth::Unreachable,
                motor_angles: err.partial.map(|a| a.map(MotorAngle::radians)),
                faults: err.failures.iter().map(LegFault::from).collect(),
                error: None,
            },
        }
    }

    pub fn bad_command(reason: impl Into<String>) -> Self {
        Self {
            health: RuntimeHealth::BadCommand,
            motor_angles: [None; NUM_LEGS],
            faults: Vec::new(),
            error: Some(reason.into()),
        }
    }
}
