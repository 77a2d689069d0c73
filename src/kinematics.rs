use crate::geometry::{PlatformGeometry, NUM_ACTUATORS};
use crate::pose::HandPose;

/// Actuator extensions beyond the fully retracted length (mm), unclamped
pub type ActuatorLengths = [f64; NUM_ACTUATORS];

/// Homogeneous rotation for the plate
///
/// Yaw about the vertical axis, then pitch, then roll. The element layout
/// matches the platform firmware calibration and must not be re-derived.
pub fn rotation_matrix(pitch: f64, yaw: f64, roll: f64) -> [[f64; 4]; 4] {
    let (sp, cp) = pitch.sin_cos();
    let (sy, cy) = yaw.sin_cos();
    let (sr, cr) = roll.sin_cos();

    [
        [cy * cp, cp * sy, -sp, 0.0],
        [cy * sp * sr - sy * cr, cy * cr + sr * sy * sp, cp * sr, 0.0],
        [cy * sp * cr + sy * sr, -cy * sr + cr * sy * sp, cp * cr, 0.0],
        [0.0, 0.0, 0.0, 1.0],
    ]
}

/// Plate translation in platform coordinates
///
/// Sensor Y (up) becomes platform Z plus the home height; sensor Z (toward
/// the user) becomes platform -Y.
pub fn translation(position: [f64; 3], home_height: f64) -> [f64; 4] {
    let [x, y, z] = position;
    [x, -z, y + home_height, 0.0]
}

/// Solve inverse kinematics for one pose
///
/// For each actuator: effector = R * platform_joint + T, and the extension is
/// |effector - base_joint| minus the retracted actuator length.
pub fn solve(pose: &HandPose, geometry: &PlatformGeometry) -> ActuatorLengths {
    let rotation = rotation_matrix(pose.pitch, pose.yaw, pose.roll);
    let offset = translation(pose.position, geometry.home_height);

    let mut lengths = [0.0; NUM_ACTUATORS];
    for (i, length) in lengths.iter_mut().enumerate() {
        let joint = &geometry.platform_joints[i];
        let base = &geometry.base_joints[i];

        let mut effector = [0.0f64; 4];
        for (row, value) in effector.iter_mut().enumerate() {
            *value = (0..4).map(|col| rotation[row][col] * joint[col]).sum::<f64>() + offset[row];
        }

        let dist_sq: f64 = (0..3).map(|k| (effector[k] - base[k]).powi(2)).sum();
        *length = dist_sq.sqrt() - geometry.min_actuator_len;
    }

    lengths
}
