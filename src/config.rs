// Rig dimensions, leg layout and config file loading
use std::f64::consts::PI;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Number of legs on the platform. Every per-leg table is indexed 0..NUM_LEGS.
pub const NUM_LEGS: usize = 6;

/// Environment variable the CLI reads for a config file path
pub const CONFIG_ENV: &str = "STEWART_CONFIG";

// Reference rig dimensions (same length unit throughout, cm on the bench rig)
pub const BASE_RADIUS: f64 = 8.739;
pub const PLATFORM_RADIUS: f64 = 6.523;
pub const BASE_TO_PLATFORM_OFFSET: f64 = 15.2;
pub const HORN_RADIUS: f64 = 3.0;
pub const ROD_LENGTH: f64 = 17.3;
pub const RUBBER_BEARING_WIDTH: f64 = 0.4;

/// Reference leg table: (base angle deg, platform angle deg, motor orientation rad)
const REFERENCE_LEGS: [(f64, f64, f64); NUM_LEGS] = [
    (358.55, 342.59, 4.163),
    (58.55, 77.41, PI),
    (121.45, 102.59, 0.0),
    (178.56, 197.41, 5.26129503),
    (241.45, 222.59, 2.11970237641),
    (298.56, 317.41, 1.0218903),
];

/// Error types for loading and validating a rig description
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error reading config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Expected 6 legs, found {found}")]
    WrongLegCount { found: usize },

    #[error("Invalid dimension {name}: {value}")]
    InvalidDimension { name: &'static str, value: f64 },

    #[error("Invalid {name} for leg {leg}: {value}")]
    InvalidLeg {
        leg: usize,
        name: &'static str,
        value: f64,
    },
}

/// Fixed physical dimensions of the rig
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlatformConstants {
    pub base_radius: f64,
    pub platform_radius: f64,
    /// Vertical separation of the base and platform planes at the neutral pose
    pub base_to_platform_offset: f64,
    pub horn_radius: f64,
    pub rod_length: f64,
    /// Radial offset added to the platform joint radius
    pub rubber_bearing_width: f64,
}

impl Default for PlatformConstants {
    fn default() -> Self {
        Self {
            base_radius: BASE_RADIUS,
            platform_radius: PLATFORM_RADIUS,
            base_to_platform_offset: BASE_TO_PLATFORM_OFFSET,
            horn_radius: HORN_RADIUS,
            rod_length: ROD_LENGTH,
            rubber_bearing_width: RUBBER_BEARING_WIDTH,
        }
    }
}

/// Layout of a single leg. Base and platform angles are in degrees around
/// the vertical axis, the motor orientation is in radians.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LegConfig {
    pub base_angle_deg: f64,
    pub platform_angle_deg: f64,
    pub motor_orientation_rad: f64,
}

/// Complete rig description: dimensions plus one entry per leg
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlatformConfig {
    pub constants: PlatformConstants,
    pub legs: Vec<LegConfig>,
}

impl Default for PlatformConfig {
    fn default() -> Self {
        let legs = REFERENCE_LEGS
            .iter()
            .map(|&(base, platform, motor)| LegConfig {
                base_angle_deg: base,
                platform_angle_deg: platform,
                motor_orientation_rad: motor,
            })
            .collect();

        Self {
            constants: PlatformConstants::default(),
            legs,
        }
    }
}

impl PlatformConfig {
    /// Load a rig description from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Parse and validate a rig description
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the leg count and that every dimension is physically usable
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.legs.len() != NUM_LEGS {
            return Err(ConfigError::WrongLegCount {
                found: self.legs.len(),
            });
        }

        let c = &self.constants;
        let positive = [
            ("base_radius", c.base_radius),
            ("platform_radius", c.platform_radius),
            ("horn_radius", c.horn_radius),
            ("rod_length", c.rod_length),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::InvalidDimension { name, value });
            }
        }
        if !c.base_to_platform_offset.is_finite() {
            return Err(ConfigError::InvalidDimension {
                name: "base_to_platform_offset",
                value: c.base_to_platform_offset,
            });
        }
        if !(c.rubber_bearing_width.is_finite() && c.rubber_bearing_width >= 0.0) {
            return Err(ConfigError::InvalidDimension {
                name: "rubber_bearing_width",
                value: c.rubber_bearing_width,
            });
        }

        for (leg, cfg) in self.legs.iter().enumerate() {
            let angles = [
                ("base_angle_deg", cfg.base_angle_deg),
                ("platform_angle_deg", cfg.platform_angle_deg),
                ("motor_orientation_rad", cfg.motor_orientation_rad),
            ];
            for (name, value) in angles {
                if !value.is_finite() {
                    return Err(ConfigError::InvalidLeg { leg, name, value });
                }
            }
        }

        Ok(())
    }
}
