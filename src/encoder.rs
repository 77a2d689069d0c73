use crate::error::{Error, Result};
use crate::geometry::NUM_ACTUATORS;
use crate::kinematics::ActuatorLengths;
use std::fmt;

/// Size of one serial payload: two bytes per actuator
pub const PAYLOAD_SIZE: usize = 2 * NUM_ACTUATORS;

/// Lowest extension the firmware accepts
pub const MIN_EXTENSION: i64 = 0;

/// Highest extension the firmware accepts
pub const MAX_EXTENSION: i64 = 1024;

/// Order of the two bytes sent for each actuator
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum ByteOrder {
    /// Low byte, then high byte
    #[default]
    LowFirst,
    /// High byte, then low byte (older firmware)
    HighFirst,
}

/// Encoded extensions ready for the serial link
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Payload([u8; PAYLOAD_SIZE]);

impl Payload {
    pub fn as_bytes(&self) -> &[u8; PAYLOAD_SIZE] {
        &self.0
    }
}

impl fmt::Display for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, byte) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

/// Converts actuator lengths into the 12-byte wire payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PayloadEncoder {
    min_extension: i64,
    max_extension: i64,
    byte_order: ByteOrder,
}

impl Default for PayloadEncoder {
    fn default() -> Self {
        Self {
            min_extension: MIN_EXTENSION,
            max_extension: MAX_EXTENSION,
            byte_order: ByteOrder::LowFirst,
        }
    }
}

impl PayloadEncoder {
    /// Create an encoder with custom bounds
    /// Bounds must fit in 16 bits, with min <= max
    pub fn new(min_extension: i64, max_extension: i64, byte_order: ByteOrder) -> Result<Self> {
        if min_extension < 0 || max_extension > i64::from(u16::MAX) || min_extension > max_extension {
            return Err(Error::ExtensionBounds {
                min: min_extension,
                max: max_extension,
            });
        }
        Ok(Self {
            min_extension,
            max_extension,
            byte_order,
        })
    }

    /// Truncate toward zero and clamp into the configured bounds
    /// NaN truncates to 0, infinities saturate before clamping
    pub fn extension(&self, length: f64) -> u16 {
        let n = (length.trunc() as i64).clamp(self.min_extension, self.max_extension);
        n as u16
    }

    /// Encode one value as its two wire bytes
    pub fn encode_value(&self, length: f64) -> [u8; 2] {
        let n = self.extension(length);
        let (low, high) = ((n % 256) as u8, (n / 256) as u8);
        match self.byte_order {
            ByteOrder::LowFirst => [low, high],
            ByteOrder::HighFirst => [high, low],
        }
    }

    /// Encode all actuators in index order
    pub fn encode(&self, lengths: &ActuatorLengths) -> Payload {
        let mut bytes = [0u8; PAYLOAD_SIZE];
        for (chunk, &length) in bytes.chunks_exact_mut(2).zip(lengths.iter()) {
            chunk.copy_from_slice(&self.encode_value(length));
        }
        Payload(bytes)
    }

    /// Decode a payload back to integer extensions
    pub fn decode(&self, payload: &Payload) -> [u16; NUM_ACTUATORS] {
        let mut values = [0u16; NUM_ACTUATORS];
        for (value, chunk) in values.iter_mut().zip(payload.0.chunks_exact(2)) {
            let (low, high) = match self.byte_order {
                ByteOrder::LowFirst => (chunk[0], chunk[1]),
                ByteOrder::HighFirst => (chunk[1], chunk[0]),
            };
            *value = u16::from(high) * 256 + u16::from(low);
        }
        values
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn split(encoder: &PayloadEncoder, n: f64) -> (u8, u8) {
        let [low, high] = encoder.encode_value(n);
        (low, high)
    }

    #[test]
    fn test_split_recombines_over_full_range() {
        let encoder = PayloadEncoder::default();
        for n in [0, 1, 255, 256, 257, 511, 512, 777, 1023, 1024] {
            let (low, high) = split(&encoder, n as f64);
            assert_eq!(high as i64 * 256 + low as i64, n);
        }
    }

    #[test]
    fn test_clamps_out_of_range() {
        let encoder = PayloadEncoder::default();
        assert_eq!(split(&encoder, -1.0), (0, 0));
        assert_eq!(split(&encoder, -500.7), (0, 0));
        assert_eq!(split(&encoder, 1025.0), (0, 4));
        assert_eq!(split(&encoder, 1e9), (0, 4));
    }

    #[test]
    fn test_truncates_toward_zero() {
        let encoder = PayloadEncoder::default();
        assert_eq!(encoder.extension(22.99), 22);
        assert_eq!(encoder.extension(-0.9), 0);
        assert_eq!(encoder.extension(300.5), 300);
    }

    #[test]
    fn test_non_finite_inputs() {
        let encoder = PayloadEncoder::default();
        assert_eq!(encoder.extension(f64::NAN), 0);
        assert_eq!(encoder.extension(f64::INFINITY), 1024);
        assert_eq!(encoder.extension(f64::NEG_INFINITY), 0);
    }

    #[test]
    fn test_payload_layout() {
        let encoder = PayloadEncoder::default();
        let payload = encoder.encode(&[0.0, 255.4, 256.0, 600.0, 1024.0, 2000.0]);

        assert_eq!(payload.as_bytes().len(), PAYLOAD_SIZE);
        assert_eq!(
            payload.as_bytes(),
            &[0, 0, 255, 0, 0, 1, 88, 2, 0, 4, 0, 4]
        );
        assert_eq!(encoder.decode(&payload), [0, 255, 256, 600, 1024, 1024]);
    }

    #[test]
    fn test_high_first_order() {
        let encoder = PayloadEncoder::new(MIN_EXTENSION, MAX_EXTENSION, ByteOrder::HighFirst).unwrap();
        let payload = encoder.encode(&[600.0; NUM_ACTUATORS]);
        assert_eq!(&payload.as_bytes()[..2], &[2, 88]);
        assert_eq!(encoder.decode(&payload), [600; NUM_ACTUATORS]);
    }

    #[test]
    fn test_custom_bounds() {
        let encoder = PayloadEncoder::new(10, 500, ByteOrder::LowFirst).unwrap();
        assert_eq!(encoder.extension(3.0), 10);
        assert_eq!(encoder.extension(900.0), 500);

        assert!(PayloadEncoder::new(-1, 1024, ByteOrder::LowFirst).is_err());
        assert!(PayloadEncoder::new(0, 70_000, ByteOrder::LowFirst).is_err());
        assert!(PayloadEncoder::new(600, 500, ByteOrder::LowFirst).is_err());
    }

    #[test]
    fn test_display_is_hex() {
        let payload = PayloadEncoder::default().encode(&[22.3; NUM_ACTUATORS]);
        assert_eq!(payload.to_string(), "16 00 16 00 16 00 16 00 16 00 16 00");
    }
}
