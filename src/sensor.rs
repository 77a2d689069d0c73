use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;
use std::thread;
use std::time::{Duration, Instant};

/// Angle conventions of the hand tracker for a direction vector [x, y, z]
/// Sensor frame: X+ right, Y+ up, Z+ toward the user
pub trait VectorAngles {
    /// Angle around the X axis, 0 when pointing along -Z
    fn pitch(&self) -> f64;
    /// Angle around the Y axis, 0 when pointing along -Z
    fn yaw(&self) -> f64;
    /// Angle around the Z axis, 0 when pointing along -Y
    fn roll(&self) -> f64;
}

impl VectorAngles for [f64; 3] {
    fn pitch(&self) -> f64 {
        self[1].atan2(-self[2])
    }

    fn yaw(&self) -> f64 {
        self[0].atan2(-self[2])
    }

    fn roll(&self) -> f64 {
        self[0].atan2(-self[1])
    }
}

/// One tracked hand as reported by the sensor
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Hand {
    /// False when the tracker lost confidence in this hand
    #[serde(default = "default_valid")]
    pub valid: bool,
    /// Palm center in sensor coordinates (mm)
    pub palm_position: [f64; 3],
    /// Unit vector from palm toward fingers
    pub direction: [f64; 3],
    /// Unit vector pointing out of the palm
    pub palm_normal: [f64; 3],
}

fn default_valid() -> bool {
    true
}

impl Default for Hand {
    fn default() -> Self {
        Self {
            valid: true,
            palm_position: [0.0; 3],
            direction: [0.0, 0.0, -1.0], // fingers pointing away from the user
            palm_normal: [0.0, -1.0, 0.0], // palm facing down
        }
    }
}

/// All hands seen in one captured frame
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HandFrame {
    #[serde(default)]
    pub hands: Vec<Hand>,
}

impl HandFrame {
    /// Hand with the largest palm X coordinate
    pub fn rightmost(&self) -> Option<&Hand> {
        self.hands
            .iter()
            .max_by(|a, b| a.palm_position[0].total_cmp(&b.palm_position[0]))
    }
}

/// Events delivered by the sensor collaborator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SensorEvent {
    Connected,
    Disconnected,
    Frame(HandFrame),
}

/// Source of sensor events, polled from a dedicated reader thread
pub trait FrameSource {
    /// Next event, or `None` once the stream has ended
    fn next_event(&mut self) -> Result<Option<SensorEvent>>;
}

/// Replays recorded sensor events from JSON lines
///
/// One event per line, e.g. `{"event":"frame","hands":[...]}`.
/// Blank lines and lines starting with `#` are ignored.
pub struct ReplaySource<R> {
    reader: R,
    line: usize,
    frame_period: Option<Duration>,
    last_frame: Option<Instant>,
}

impl<R: BufRead> ReplaySource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line: 0,
            frame_period: None,
            last_frame: None,
        }
    }

    /// Deliver frames no faster than `hz` per second
    /// Rates too small to express as a period disable pacing
    pub fn with_rate(mut self, hz: f64) -> Self {
        if hz > 0.0 {
            self.frame_period = Duration::try_from_secs_f64(1.0 / hz).ok();
        }
        self
    }

    fn pace(&mut self) {
        if let Some(period) = self.frame_period {
            if let Some(last) = self.last_frame {
                let elapsed = last.elapsed();
                if elapsed < period {
                    thread::sleep(period - elapsed);
                }
            }
            self.last_frame = Some(Instant::now());
        }
    }
}

impl<R: BufRead> FrameSource for ReplaySource<R> {
    fn next_event(&mut self) -> Result<Option<SensorEvent>> {
        let mut buf = String::new();
        loop {
            buf.clear();
            if self.reader.read_line(&mut buf)? == 0 {
                return Ok(None);
            }
            self.line += 1;

            let text = buf.trim();
            if text.is_empty() || text.starts_with('#') {
                continue;
            }

            let event: SensorEvent = serde_json::from_str(text)
                .map_err(|source| Error::Replay { line: self.line, source })?;
            if matches!(event, SensorEvent::Frame(_)) {
                self.pace();
            }
            return Ok(Some(event));
        }
    }
}

/// Open a replay stream from a file path, or stdin for "-"
pub fn open_replay(input: &str, hz: Option<f64>) -> Result<Box<dyn FrameSource + Send>> {
    let rate = hz.unwrap_or(0.0);
    if input == "-" {
        let source = ReplaySource::new(BufReader::new(io::stdin())).with_rate(rate);
        Ok(Box::new(source))
    } else {
        let file = File::open(Path::new(input))?;
        let source = ReplaySource::new(BufReader::new(file)).with_rate(rate);
        Ok(Box::new(source))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_4;
    use std::io::Cursor;

    #[test]
    fn test_default_hand_has_zero_angles() {
        let hand = Hand::default();
        assert_eq!(hand.direction.pitch(), 0.0);
        assert_eq!(hand.direction.yaw(), 0.0);
        assert_eq!(hand.palm_normal.roll(), 0.0);
    }

    #[test]
    fn test_vector_angles() {
        // Tilted up 45 degrees
        let up = [0.0, 1.0, -1.0];
        assert!((up.pitch() - FRAC_PI_4).abs() < 1e-12);
        assert_eq!(up.yaw(), 0.0);

        // Turned right 45 degrees
        let right = [1.0, 0.0, -1.0];
        assert!((right.yaw() - FRAC_PI_4).abs() < 1e-12);

        // Palm normal rolled toward +X
        let rolled = [1.0, -1.0, 0.0];
        assert!((rolled.roll() - FRAC_PI_4).abs() < 1e-12);
    }

    #[test]
    fn test_rightmost_picks_largest_x() {
        let mut left = Hand::default();
        left.palm_position = [-80.0, 200.0, 0.0];
        let mut right = Hand::default();
        right.palm_position = [60.0, 190.0, 10.0];

        let frame = HandFrame { hands: vec![left, right] };
        assert_eq!(frame.rightmost(), Some(&right));
        assert_eq!(HandFrame::default().rightmost(), None);
    }

    #[test]
    fn test_replay_parses_events() {
        let input = "\
# recorded session
{\"event\":\"connected\"}

{\"event\":\"frame\",\"hands\":[{\"palm_position\":[1,2,3],\"direction\":[0,0,-1],\"palm_normal\":[0,-1,0]}]}
{\"event\":\"frame\"}
{\"event\":\"disconnected\"}
";
        let mut source = ReplaySource::new(Cursor::new(input));

        assert_eq!(source.next_event().unwrap(), Some(SensorEvent::Connected));

        match source.next_event().unwrap() {
            Some(SensorEvent::Frame(frame)) => {
                assert_eq!(frame.hands.len(), 1);
                assert!(frame.hands[0].valid);
                assert_eq!(frame.hands[0].palm_position, [1.0, 2.0, 3.0]);
            }
            other => panic!("expected frame, got {:?}", other),
        }

        assert_eq!(
            source.next_event().unwrap(),
            Some(SensorEvent::Frame(HandFrame::default()))
        );
        assert_eq!(source.next_event().unwrap(), Some(SensorEvent::Disconnected));
        assert_eq!(source.next_event().unwrap(), None);
    }

    #[test]
    fn test_frame_rate_to_period() {
        let source = ReplaySource::new(Cursor::new("")).with_rate(100.0);
        assert_eq!(source.frame_period, Some(Duration::from_millis(10)));

        let source = ReplaySource::new(Cursor::new("")).with_rate(0.0);
        assert_eq!(source.frame_period, None);

        let source = ReplaySource::new(Cursor::new("")).with_rate(1e-320);
        assert_eq!(source.frame_period, None);
    }

    #[test]
    fn test_replay_reports_bad_line_number() {
        let input = "{\"event\":\"connected\"}\nnot json\n";
        let mut source = ReplaySource::new(Cursor::new(input));
        source.next_event().unwrap();

        match source.next_event() {
            Err(Error::Replay { line, .. }) => assert_eq!(line, 2),
            other => panic!("expected replay error, got {:?}", other),
        }
    }
}
