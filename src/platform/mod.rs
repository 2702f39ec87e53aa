// Inverse kinematics for the six-leg rotary servo platform
//
// Provides:
// - Fixed joint layout (base and platform joints per leg)
// - Pose transform (pitch/roll -> leg vectors)
// - Closed-form servo horn angle per leg

mod geometry;
mod pose;
pub mod solver;

pub use geometry::{GeometryModel, LegJoints};
pub use pose::{LegGeometry, Pose};
pub use solver::{LegError, MotorAngle, SolveError};
