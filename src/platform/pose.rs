// Pose transform: commanded pitch/roll -> per-leg vectors in the base frame

use nalgebra::{Matrix3, Vector3};
use serde::{Deserialize, Serialize};

use super::geometry::GeometryModel;
use crate::config::NUM_LEGS;

/// Commanded platform orientation, radians
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    /// Rotation about the world X axis
    pub pitch: f64,
    /// Rotation about the world Y axis
    pub roll: f64,
}

impl Pose {
    pub fn new(pitch: f64, roll: f64) -> Self {
        Self { pitch, roll }
    }

    pub fn neutral() -> Self {
        Self::default()
    }

    pub fn from_degrees(pitch_deg: f64, roll_deg: f64) -> Self {
        Self::new(pitch_deg.to_radians(), roll_deg.to_radians())
    }

    pub fn is_finite(&self) -> bool {
        self.pitch.is_finite() && self.roll.is_finite()
    }

    /// Combined rotation `Ry(roll) * Rx(pitch)`
    ///
    /// Pitch is applied to a platform vector first, then roll. This order
    /// follows the physical mounting of the rig and must not be swapped:
    /// doing so changes which world axis each angle turns about.
    pub fn rotation(&self) -> Matrix3<f64> {
        let (sin_r, cos_r) = self.roll.sin_cos();
        let (sin_p, cos_p) = self.pitch.sin_cos();

        // Matrix3::new takes rows
        let ry = Matrix3::new(
            cos_r, 0.0, sin_r, //
            0.0, 1.0, 0.0, //
            -sin_r, 0.0, cos_r,
        );
        let rx = Matrix3::new(
            1.0, 0.0, 0.0, //
            0.0, cos_p, -sin_p, //
            0.0, sin_p, cos_p,
        );

        ry * rx
    }
}

/// Per-leg quantities for one pose
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LegGeometry {
    /// Platform joint position in the base frame
    pub leg_vector: Vector3<f64>,
    /// Displacement from the base joint to the platform joint
    pub leg_length: Vector3<f64>,
}

impl LegGeometry {
    /// Straight-line distance between the two joints
    pub fn length(&self) -> f64 {
        self.leg_length.norm()
    }
}

impl GeometryModel {
    /// Fixed vertical translation between the base and platform planes
    pub fn translation(&self) -> Vector3<f64> {
        Vector3::new(0.0, 0.0, self.constants().base_to_platform_offset)
    }

    /// Rotate and translate every platform joint for `pose`
    pub fn leg_geometry(&self, pose: &Pose) -> [LegGeometry; NUM_LEGS] {
        let rotation = pose.rotation();
        let translation = self.translation();

        self.legs().map(|leg| {
            let leg_vector = translation + rotation * leg.platform;
            LegGeometry {
                leg_vector,
                leg_length: leg_vector - leg.base,
            }
        })
    }
}
