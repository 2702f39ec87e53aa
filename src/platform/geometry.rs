// Fixed joint layout of the platform
//
// Base and platform joints are computed once from the rig description and
// never change afterwards. Both sets lie in their own z = 0 plane; the
// vertical separation is added by the pose transform.

use nalgebra::Vector3;
use tracing::{debug, info};

use crate::config::{ConfigError, NUM_LEGS, PlatformConfig, PlatformConstants};

/// Precomputed geometry of one leg
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LegJoints {
    /// Joint on the stationary base, base frame
    pub base: Vector3<f64>,
    /// Joint on the moving platform, platform frame (neutral pose)
    pub platform: Vector3<f64>,
    /// Mounting orientation of the motor horn axis (radians)
    pub motor_orientation: f64,
}

/// Immutable platform geometry shared by every solve
///
/// There are no mutators: once built the model can be shared freely
/// between threads.
#[derive(Debug, Clone)]
pub struct GeometryModel {
    constants: PlatformConstants,
    legs: [LegJoints; NUM_LEGS],
}

impl GeometryModel {
    /// Validate the rig description and precompute the joint positions
    pub fn new(config: &PlatformConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let c = config.constants;
        let platform_radius = c.platform_radius + c.rubber_bearing_width;

        let mut legs = [LegJoints {
            base: Vector3::zeros(),
            platform: Vector3::zeros(),
            motor_orientation: 0.0,
        }; NUM_LEGS];

        for (i, leg) in config.legs.iter().enumerate() {
            let base_rad = leg.base_angle_deg.to_radians();
            let platform_rad = leg.platform_angle_deg.to_radians();

            legs[i] = LegJoints {
                base: Vector3::new(
                    base_rad.cos() * c.base_radius,
                    base_rad.sin() * c.base_radius,
                    0.0,
                ),
                platform: Vector3::new(
                    platform_rad.cos() * platform_radius,
                    platform_rad.sin() * platform_radius,
                    0.0,
                ),
                motor_orientation: leg.motor_orientation_rad,
            };
            debug!("Leg {}: base={:?}, platform={:?}", i, legs[i].base, legs[i].platform);
        }

        info!(
            "Platform geometry ready: base r={}, platform r={}, horn={}, rod={}",
            c.base_radius, platform_radius, c.horn_radius, c.rod_length
        );

        Ok(Self {
            constants: config.constants,
            legs,
        })
    }

    pub fn constants(&self) -> &PlatformConstants {
        &self.constants
    }

    pub fn legs(&self) -> &[LegJoints; NUM_LEGS] {
        &self.legs
    }

    /// Joints of a single leg
    ///
    /// # Panics
    ///
    /// Panics if `leg >= NUM_LEGS`.
    pub fn leg(&self, leg: usize) -> &LegJoints {
        &self.legs[leg]
    }
}
