//! Hand-tracked Stewart platform runtime.
//!
//! A hand pose from the motion sensor is turned into six actuator extensions
//! by inverse kinematics, packed into a 12-byte payload and sent to the
//! platform microcontroller at a throttled rate.

pub mod encoder;
pub mod error;
pub mod geometry;
pub mod kinematics;
pub mod limiter;
pub mod listener;
pub mod pose;
pub mod sensor;
pub mod transport;

pub use encoder::{ByteOrder, Payload, PayloadEncoder};
pub use error::Error;
pub use geometry::PlatformGeometry;
pub use kinematics::{solve, ActuatorLengths};
pub use limiter::RateLimiter;
pub use listener::{Listener, SessionStats};
pub use pose::{select_pose, HandPose};
pub use sensor::{FrameSource, Hand, HandFrame, SensorEvent};
pub use transport::Transport;
