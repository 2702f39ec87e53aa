// Actuator solver: required leg geometry -> servo horn angle per leg
//
// Each leg is a horn of radius H swinging about a horizontal axis at the
// base joint, connected to the platform joint by a rod of length R. The
// horn tip sits at
//
//     a = b + H * (cos(alpha) cos(beta), cos(alpha) sin(beta), sin(alpha))
//
// where beta is the motor mounting orientation. Requiring |p - a| = R gives
//
//     L = M sin(alpha) + N cos(alpha)
//
// with L = |l|^2 + H^2 - R^2, M = 2H (p.z - b.z) and
// N = 2H (cos(beta) (p.x - b.x) + sin(beta) (p.y - b.y)), solved as
// alpha = asin(L / sqrt(M^2 + N^2)) - atan(N / M).

use std::f64::consts::TAU;
use std::fmt;

use nalgebra::Vector3;
use serde::Serialize;
use tracing::{debug, warn};

use super::geometry::{GeometryModel, LegJoints};
use super::pose::{LegGeometry, Pose};
use crate::config::NUM_LEGS;

/// Motor command for one leg, always in [0, 2*pi)
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct MotorAngle(f64);

impl MotorAngle {
    /// Wrap a raw solution into [0, 2*pi). Negative values get 2*pi added.
    fn normalized(raw: f64) -> Self {
        let mut angle = if raw < 0.0 { raw + TAU } else { raw };
        // A tiny negative raw value rounds to exactly TAU
        if angle >= TAU {
            angle = 0.0;
        }
        Self(angle)
    }

    pub fn radians(self) -> f64 {
        self.0
    }

    pub fn degrees(self) -> f64 {
        self.0.to_degrees()
    }
}

impl fmt::Display for MotorAngle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6} rad", self.0)
    }
}

/// Failure to solve a single leg
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum LegError {
    #[error("Leg {leg} cannot reach the commanded pose (asin argument {ratio})")]
    Unreachable { leg: usize, ratio: f64 },

    #[error("Leg {leg} has a degenerate geometry (platform joint in the base plane)")]
    Degenerate { leg: usize },
}

impl LegError {
    pub fn leg(&self) -> usize {
        match *self {
            LegError::Unreachable { leg, .. } | LegError::Degenerate { leg } => leg,
        }
    }
}

/// One or more legs could not be solved
///
/// The legs that did solve are kept in `partial`.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{} of 6 legs failed: {}", .failures.len(), failed_legs(.failures))]
pub struct SolveError {
    pub partial: [Option<MotorAngle>; NUM_LEGS],
    pub failures: Vec<LegError>,
}

fn failed_legs(failures: &[LegError]) -> String {
    failures
        .iter()
        .map(|e| e.leg().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

impl SolveError {
    pub fn failed_legs(&self) -> Vec<usize> {
        self.failures.iter().map(LegError::leg).collect()
    }
}

/// Solve one leg in isolation
pub fn solve_leg(
    leg: usize,
    joints: &LegJoints,
    geometry: &LegGeometry,
    horn_radius: f64,
    rod_length: f64,
) -> Result<MotorAngle, LegError> {
    let v = geometry.leg_vector;
    let (sin_b, cos_b) = joints.motor_orientation.sin_cos();

    let l =
        geometry.leg_length.norm_squared() + horn_radius * horn_radius - rod_length * rod_length;
    let m = 2.0 * horn_radius * v.z;
    let n = 2.0 * horn_radius * (cos_b * (v.x - joints.base.x) + sin_b * (v.y - joints.base.y));

    if m == 0.0 {
        return Err(LegError::Degenerate { leg });
    }

    let ratio = l / (m * m + n * n).sqrt();
    // Also catches NaN from a non-finite pose
    if !(-1.0..=1.0).contains(&ratio) {
        return Err(LegError::Unreachable { leg, ratio });
    }

    let angle = MotorAngle::normalized(ratio.asin() - (n / m).atan());
    debug!("Leg {}: L={:.4}, M={:.4}, N={:.4} -> {}", leg, l, m, n, angle);
    Ok(angle)
}

impl GeometryModel {
    /// Motor angles for a commanded pitch and roll (radians)
    pub fn solve(&self, pitch: f64, roll: f64) -> Result<[MotorAngle; NUM_LEGS], SolveError> {
        self.solve_pose(&Pose::new(pitch, roll))
    }

    /// Motor angles for `pose`. Every leg is evaluated; failures are
    /// collected rather than stopping at the first one.
    pub fn solve_pose(&self, pose: &Pose) -> Result<[MotorAngle; NUM_LEGS], SolveError> {
        let c = self.constants();
        let geometry = self.leg_geometry(pose);

        let mut partial = [None; NUM_LEGS];
        let mut failures = Vec::new();

        for (i, (joints, leg)) in self.legs().iter().zip(&geometry).enumerate() {
            match solve_leg(i, joints, leg, c.horn_radius, c.rod_length) {
                Ok(angle) => partial[i] = Some(angle),
                Err(e) => {
                    warn!("Pose {:?}: {}", pose, e);
                    failures.push(e);
                }
            }
        }

        match partial {
            [Some(a0), Some(a1), Some(a2), Some(a3), Some(a4), Some(a5)] => {
                Ok([a0, a1, a2, a3, a4, a5])
            }
            _ => Err(SolveError { partial, failures }),
        }
    }

    /// Horn tip position of `leg` at `angle`, base frame
    ///
    /// For a solved leg the tip lies exactly one rod length from the
    /// platform joint.
    ///
    /// # Panics
    ///
    /// Panics if `leg >= NUM_LEGS`.
    pub fn horn_tip(&self, leg: usize, angle: MotorAngle) -> Vector3<f64> {
        let joints = self.leg(leg);
        let h = self.constants().horn_radius;
        let (sin_a, cos_a) = angle.radians().sin_cos();
        let (sin_b, cos_b) = joints.motor_orientation.sin_cos();

        joints.base + h * Vector3::new(cos_a * cos_b, cos_a * sin_b, sin_a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{LegConfig, PlatformConfig, PlatformConstants};
    use approx::assert_abs_diff_eq;
    use std::f64::consts::PI;

    fn model() -> GeometryModel {
        GeometryModel::new(&PlatformConfig::default()).unwrap()
    }

    fn poses() -> Vec<Pose> {
        let steps = [-0.1, -0.05, 0.0, 0.05, 0.1];
        steps
            .iter()
            .flat_map(|&p| steps.iter().map(move |&r| Pose::new(p, r)))
            .collect()
    }

    #[test]
    fn test_neutral_pose_reference_rig() {
        let angles = model().solve(0.0, 0.0).unwrap();
        let expected = [
            5.521125003672416,
            5.524541510858498,
            5.524541510858498,
            5.5236029210430875,
            5.525573403151303,
            5.52555985253114,
        ];
        for (angle, want) in angles.iter().zip(expected) {
            assert!(angle.radians().is_finite());
            assert_abs_diff_eq!(angle.radians(), want, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_angles_in_range() {
        let model = model();
        for pose in poses() {
            let angles = model.solve_pose(&pose).unwrap();
            for angle in angles {
                assert!(angle.radians() >= 0.0 && angle.radians() < TAU);
            }
        }
    }

    #[test]
    fn test_horn_tip_is_one_rod_from_platform_joint() {
        let model = model();
        let rod = model.constants().rod_length;

        for pose in poses() {
            let angles = model.solve_pose(&pose).unwrap();
            let geometry = model.leg_geometry(&pose);
            for (i, angle) in angles.iter().enumerate() {
                let tip = model.horn_tip(i, *angle);
                let rod_vector = geometry[i].leg_vector - tip;
                assert_abs_diff_eq!(rod_vector.norm(), rod, epsilon = 1e-9);
            }
        }
    }

    #[test]
    fn test_reachable_leg_lengths_within_horn_sweep() {
        let model = model();
        let c = model.constants();

        for pose in poses() {
            assert!(model.solve_pose(&pose).is_ok());
            for leg in model.leg_geometry(&pose) {
                let length = leg.length();
                assert!(length >= c.rod_length - c.horn_radius - 1e-9);
                assert!(length <= c.rod_length + c.horn_radius + 1e-9);
            }
        }
    }

    #[test]
    fn test_large_pitch_reports_only_failing_legs() {
        let model = model();
        let err = model.solve(0.3, 0.0).unwrap_err();

        assert_eq!(err.failed_legs(), vec![4, 5]);
        for failure in &err.failures {
            match *failure {
                LegError::Unreachable { ratio, .. } => assert!(ratio < -1.0),
                other => panic!("Expected Unreachable, got {:?}", other),
            }
        }

        let expected = [
            5.202343928468144,
            6.258423061904183,
            6.258423061904183,
            5.214247687348151,
        ];
        for (i, want) in expected.iter().enumerate() {
            let angle = err.partial[i].expect("leg should have solved");
            assert_abs_diff_eq!(angle.radians(), *want, epsilon = 1e-9);
        }
        assert!(err.partial[4].is_none());
        assert!(err.partial[5].is_none());
    }

    #[test]
    fn test_error_message_names_legs() {
        let err = model().solve(0.3, 0.0).unwrap_err();
        assert_eq!(err.to_string(), "2 of 6 legs failed: 4, 5");
    }

    #[test]
    fn test_non_finite_pose_fails_every_leg() {
        let err = model().solve(f64::NAN, 0.0).unwrap_err();
        assert_eq!(err.failures.len(), NUM_LEGS);
        assert!(err.partial.iter().all(Option::is_none));
    }

    #[test]
    fn test_platform_in_base_plane_is_degenerate() {
        let mut config = PlatformConfig::default();
        config.constants = PlatformConstants {
            base_to_platform_offset: 0.0,
            ..config.constants
        };
        let model = GeometryModel::new(&config).unwrap();

        let err = model.solve(0.0, 0.0).unwrap_err();
        assert_eq!(err.failures.len(), NUM_LEGS);
        let degenerate = |e: &LegError| matches!(e, LegError::Degenerate { .. });
        assert!(err.failures.iter().all(degenerate));
    }

    #[test]
    fn test_full_solution_keeps_leg_order() {
        let model = model();
        let pose = Pose::new(0.04, -0.08);
        let angles = model.solve_pose(&pose).unwrap();
        let geometry = model.leg_geometry(&pose);
        let c = model.constants();

        for (i, (joints, leg)) in model.legs().iter().zip(&geometry).enumerate() {
            let single = solve_leg(i, joints, leg, c.horn_radius, c.rod_length).unwrap();
            assert_eq!(angles[i], single);
        }
    }

    #[test]
    #[should_panic]
    fn test_horn_tip_out_of_range_panics() {
        model().horn_tip(NUM_LEGS, MotorAngle::normalized(0.0));
    }

    #[test]
    fn test_idempotent() {
        let model = model();
        let first = model.solve(0.07, -0.03).unwrap();
        let second = model.solve(0.07, -0.03).unwrap();
        for (a, b) in first.iter().zip(&second) {
            assert_eq!(a.radians().to_bits(), b.radians().to_bits());
        }
    }

    #[test]
    fn test_point_symmetric_layout() {
        // Legs i and i + 3 are mirror images through the vertical axis
        let half = [(10.0, 40.0, 0.3), (110.0, 90.0, 2.0), (170.0, 200.0, 4.1)];
        let legs = (0..NUM_LEGS)
            .map(|i| {
                let (base, platform, motor) = half[i % 3];
                let flip = if i >= 3 { 1.0 } else { 0.0 };
                LegConfig {
                    base_angle_deg: base + 180.0 * flip,
                    platform_angle_deg: platform + 180.0 * flip,
                    motor_orientation_rad: motor + PI * flip,
                }
            })
            .collect();
        let config = PlatformConfig {
            constants: PlatformConstants::default(),
            legs,
        };
        let model = GeometryModel::new(&config).unwrap();

        let forward = model.solve(0.06, 0.04).unwrap();
        let mirrored = model.solve(-0.06, -0.04).unwrap();
        for i in 0..3 {
            assert_abs_diff_eq!(
                forward[i].radians(),
                mirrored[i + 3].radians(),
                epsilon = 1e-9
            );
            assert_abs_diff_eq!(
                forward[i + 3].radians(),
                mirrored[i].radians(),
                epsilon = 1e-9
            );
        }
    }

    #[test]
    fn test_normalization() {
        assert_eq!(MotorAngle::normalized(-1.0).radians(), TAU - 1.0);
        assert_eq!(MotorAngle::normalized(1.0).radians(), 1.0);
        assert_eq!(MotorAngle::normalized(-1e-18).radians(), 0.0);
        assert_abs_diff_eq!(MotorAngle::normalized(PI).degrees(), 180.0, epsilon = 1e-12);
    }

    #[test]
    fn test_concurrent_solves_match() {
        let model = &model();
        let reference = model.solve(0.05, 0.02).unwrap();

        std::thread::scope(|s| {
            let handles: Vec<_> = (0..4)
                .map(|_| s.spawn(move || model.solve(0.05, 0.02).unwrap()))
                .collect();
            for handle in handles {
                assert_eq!(handle.join().unwrap(), reference);
            }
        });
    }
}
