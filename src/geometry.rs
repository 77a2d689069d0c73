use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Number of linear actuators on the platform
pub const NUM_ACTUATORS: usize = 6;

/// Base actuator pivots on the fixed frame (mm)
/// Index order is shared with PLATFORM_POSITIONS and the output payload
pub const BASE_POSITIONS: [[f64; 3]; NUM_ACTUATORS] = [
    [-246.34, 86.42, 0.0],  // [0] left rear
    [-198.16, 170.38, 0.0], // [1] left front
    [198.16, 170.38, 0.0],  // [2] right front
    [246.34, 86.42, 0.0],   // [3] right rear
    [48.48, -256.80, 0.0],  // [4] back right
    [-48.48, -256.80, 0.0], // [5] back left
];

/// Attachment points on the moving plate, homogeneous (mm, w = 1)
pub const PLATFORM_POSITIONS: [[f64; 4]; NUM_ACTUATORS] = [
    [-225.60, -73.26, 0.0, 1.0],
    [-49.35, 232.01, 0.0, 1.0],
    [49.35, 232.01, 0.0, 1.0],
    [225.60, -73.26, 0.0, 1.0],
    [176.25, -158.75, 0.0, 1.0],
    [-176.25, -158.75, 0.0, 1.0],
];

/// Plate height above the base at the home position (mm)
pub const HOME_POSITION_HEIGHT: f64 = 319.0;

/// Fully retracted actuator length (mm)
pub const MIN_ACTUATOR_LEN: f64 = 335.0;

/// Fixed geometry of the parallel platform
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlatformGeometry {
    pub base_joints: [[f64; 3]; NUM_ACTUATORS],
    pub platform_joints: [[f64; 4]; NUM_ACTUATORS],
    pub home_height: f64,
    pub min_actuator_len: f64,
}

impl Default for PlatformGeometry {
    fn default() -> Self {
        Self {
            base_joints: BASE_POSITIONS,
            platform_joints: PLATFORM_POSITIONS,
            home_height: HOME_POSITION_HEIGHT,
            min_actuator_len: MIN_ACTUATOR_LEN,
        }
    }
}

impl PlatformGeometry {
    /// Load geometry from a JSON file and validate it
    ///
    /// The file uses the same field names as the struct. Arrays must hold
    /// exactly six joints, which the fixed-size fields enforce on parse.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        let geometry: Self = serde_json::from_str(text)?;
        geometry.validate()?;
        Ok(geometry)
    }

    /// Check that every coordinate is finite and the actuator length is positive
    pub fn validate(&self) -> Result<()> {
        for (i, joint) in self.base_joints.iter().enumerate() {
            if joint.iter().any(|v| !v.is_finite()) {
                return Err(Error::Geometry(format!("base joint {} is not finite", i)));
            }
        }
        for (i, joint) in self.platform_joints.iter().enumerate() {
            if joint.iter().any(|v| !v.is_finite()) {
                return Err(Error::Geometry(format!("platform joint {} is not finite", i)));
            }
        }
        if !self.home_height.is_finite() {
            return Err(Error::Geometry("home_height is not finite".to_string()));
        }
        if !(self.min_actuator_len.is_finite() && self.min_actuator_len > 0.0) {
            return Err(Error::Geometry(format!(
                "min_actuator_len must be positive, got {}",
                self.min_actuator_len
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_geometry_is_valid() {
        let geometry = PlatformGeometry::default();
        assert!(geometry.validate().is_ok());
        assert_eq!(geometry.base_joints.len(), NUM_ACTUATORS);
        assert_eq!(geometry.platform_joints.len(), NUM_ACTUATORS);
        assert!(geometry.platform_joints.iter().all(|p| p[3] == 1.0));
    }

    #[test]
    fn test_json_round_trip_keeps_defaults() {
        let geometry = PlatformGeometry::default();
        let text = serde_json::to_string(&geometry).unwrap();
        let parsed = PlatformGeometry::from_json_str(&text).unwrap();
        assert_eq!(parsed, geometry);
    }

    #[test]
    fn test_demo_geometry_file_matches_defaults() {
        let parsed = PlatformGeometry::from_json_str(include_str!("../demos/geometry.json")).unwrap();
        assert_eq!(parsed, PlatformGeometry::default());
    }

    #[test]
    fn test_json_rejects_wrong_joint_count() {
        let text = r#"{
            "base_joints": [[0,0,0],[0,0,0],[0,0,0],[0,0,0],[0,0,0]],
            "platform_joints": [[0,0,0,1],[0,0,0,1],[0,0,0,1],[0,0,0,1],[0,0,0,1],[0,0,0,1]],
            "home_height": 319.0,
            "min_actuator_len": 335.0
        }"#;
        assert!(matches!(
            PlatformGeometry::from_json_str(text),
            Err(Error::GeometryFile(_))
        ));
    }

    #[test]
    fn test_validate_rejects_non_positive_length() {
        let geometry = PlatformGeometry {
            min_actuator_len: 0.0,
            ..PlatformGeometry::default()
        };
        assert!(matches!(geometry.validate(), Err(Error::Geometry(_))));
    }

    #[test]
    fn test_validate_rejects_nan_joint() {
        let mut geometry = PlatformGeometry::default();
        geometry.base_joints[2][1] = f64::NAN;
        assert!(geometry.validate().is_err());
    }
}
