use crate::sensor::{Hand, HandFrame, VectorAngles};

/// Hand pose driving the platform
/// - position: palm center in sensor coordinates (mm)
/// - pitch, yaw: from the hand direction vector (rad)
/// - roll: from the palm normal (rad)
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct HandPose {
    pub position: [f64; 3],
    pub pitch: f64,
    pub yaw: f64,
    pub roll: f64,
}

impl HandPose {
    /// Create a pose from a tracked hand
    pub fn from_hand(hand: &Hand) -> Self {
        Self {
            position: hand.palm_position,
            pitch: hand.direction.pitch(),
            yaw: hand.direction.yaw(),
            roll: hand.palm_normal.roll(),
        }
    }
}

/// Pick the pose to act on for this frame
///
/// Only frames with exactly one hand are used, and only if that hand is valid.
/// Frames with no hands or several hands are skipped.
pub fn select_pose(frame: &HandFrame) -> Option<HandPose> {
    if frame.hands.len() != 1 {
        return None;
    }
    let hand = frame.rightmost()?;
    hand.valid.then(|| HandPose::from_hand(hand))
}
