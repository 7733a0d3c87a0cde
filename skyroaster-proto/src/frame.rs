//! Seven-byte roaster frame and its additive checksum.
//!
//! ```text
//! byte:  0      1      2      3      4    5    6
//!       [raw X (BE)  ][raw Y (BE)  ][reserved][sum]
//! ```
//!
//! Byte 6 is the modulo-256 sum of bytes 0 through 5.

use crate::temperature::{self, Reading, TemperatureUnit};

/// Bytes per frame, checksum included.
pub const FRAME_LEN: usize = 7;

/// Bytes covered by the checksum.
pub const PAYLOAD_LEN: usize = FRAME_LEN - 1;

/// Bits per byte on the wire (LSB first).
pub const BITS_PER_BYTE: usize = 8;

/// Data bits per frame.
pub const FRAME_BITS: usize = FRAME_LEN * BITS_PER_BYTE;

/// Errors from interpreting a completed frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameError {
    /// Trailing byte does not match the payload sum.
    Checksum { expected: u8, received: u8 },
}

/// One complete frame as received, in wire order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Frame(pub [u8; FRAME_LEN]);

impl Frame {
    #[must_use]
    pub const fn new(bytes: [u8; FRAME_LEN]) -> Self {
        Self(bytes)
    }

    /// Build a frame from a payload, appending the matching checksum.
    #[must_use]
    pub fn from_payload(payload: [u8; PAYLOAD_LEN]) -> Self {
        let mut bytes = [0u8; FRAME_LEN];
        bytes[..PAYLOAD_LEN].copy_from_slice(&payload);
        bytes[PAYLOAD_LEN] = checksum(&payload);
        Self(bytes)
    }

    /// Build a frame carrying the two raw sensor fields.
    #[must_use]
    pub fn from_raw(raw_x: u16, raw_y: u16) -> Self {
        let x = raw_x.to_be_bytes();
        let y = raw_y.to_be_bytes();
        Self::from_payload([x[0], x[1], y[0], y[1], 0, 0])
    }

    #[inline]
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; FRAME_LEN] {
        &self.0
    }

    #[inline]
    #[must_use]
    pub const fn into_bytes(self) -> [u8; FRAME_LEN] {
        self.0
    }

    /// First raw sensor field (bytes 0-1, big-endian).
    #[inline]
    #[must_use]
    pub const fn raw_x(&self) -> u16 {
        u16::from_be_bytes([self.0[0], self.0[1]])
    }

    /// Second raw sensor field (bytes 2-3, big-endian).
    #[inline]
    #[must_use]
    pub const fn raw_y(&self) -> u16 {
        u16::from_be_bytes([self.0[2], self.0[3]])
    }

    /// Bytes 4-5. Present on the wire, not used by the temperature model.
    #[inline]
    #[must_use]
    pub const fn reserved(&self) -> [u8; 2] {
        [self.0[4], self.0[5]]
    }

    /// Received checksum byte.
    #[inline]
    #[must_use]
    pub const fn checksum(&self) -> u8 {
        self.0[PAYLOAD_LEN]
    }

    #[inline]
    #[must_use]
    pub fn is_valid(&self) -> bool {
        validate(&self.0)
    }

    /// Check the trailing sum, reporting both values on mismatch.
    pub fn verify(&self) -> Result<(), FrameError> {
        let expected = checksum(&self.0[..PAYLOAD_LEN]);
        let received = self.checksum();
        if expected == received {
            Ok(())
        } else {
            Err(FrameError::Checksum { expected, received })
        }
    }

    /// Temperature without checking the checksum.
    #[inline]
    #[must_use]
    pub fn temperature(&self, unit: TemperatureUnit) -> f64 {
        temperature::temperature(self, unit)
    }

    /// Verify the frame, then convert it.
    pub fn reading(&self, unit: TemperatureUnit) -> Result<Reading, FrameError> {
        self.verify()?;
        Ok(Reading::from_frame(self, unit))
    }
}

impl From<[u8; FRAME_LEN]> for Frame {
    fn from(bytes: [u8; FRAME_LEN]) -> Self {
        Self(bytes)
    }
}

impl From<Frame> for [u8; FRAME_LEN] {
    fn from(frame: Frame) -> Self {
        frame.0
    }
}

/// Modulo-256 sum of `data`.
#[inline]
#[must_use]
pub fn checksum(data: &[u8]) -> u8 {
    data.iter().fold(0u8, |acc, &b| acc.wrapping_add(b))
}

/// True iff byte 6 equals the modulo-256 sum of bytes 0-5.
#[inline]
#[must_use]
pub fn validate(bytes: &[u8; FRAME_LEN]) -> bool {
    checksum(&bytes[..PAYLOAD_LEN]) == bytes[PAYLOAD_LEN]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_frame_validates() {
        let bytes = [0x01, 0x90, 0x00, 0x50, 0x00, 0x00, 0xE1];
        assert!(validate(&bytes));
        let frame = Frame::new(bytes);
        assert_eq!(frame.raw_x(), 400);
        assert_eq!(frame.raw_y(), 80);
        assert_eq!(frame.verify(), Ok(()));
    }

    #[test]
    fn test_checksum_wraps() {
        assert_eq!(checksum(&[0xFF, 0x01]), 0x00);
        assert_eq!(checksum(&[0xFF; PAYLOAD_LEN]), 0xFA);
        assert_eq!(checksum(&[]), 0);
    }

    #[test]
    fn test_from_payload_always_validates() {
        let payloads: [[u8; PAYLOAD_LEN]; 4] = [
            [0; PAYLOAD_LEN],
            [0xFF; PAYLOAD_LEN],
            [0x12, 0x34, 0x56, 0x78, 0x9A, 0xBC],
            [0x80, 0x01, 0x7F, 0xFE, 0x00, 0xAA],
        ];
        for payload in payloads {
            assert!(Frame::from_payload(payload).is_valid());
        }
    }

    #[test]
    fn test_any_single_bit_flip_fails() {
        let frame = Frame::from_payload([0x03, 0x44, 0x00, 0xC8, 0x5A, 0xA5]);
        for byte in 0..PAYLOAD_LEN {
            for bit in 0..BITS_PER_BYTE {
                let mut bytes = frame.into_bytes();
                bytes[byte] ^= 1 << bit;
                assert!(!validate(&bytes), "flip of byte {byte} bit {bit} passed");
            }
        }
    }

    #[test]
    fn test_verify_reports_both_sums() {
        let frame = Frame::new([0x01, 0x90, 0x00, 0x50, 0x00, 0x00, 0xE0]);
        assert_eq!(
            frame.verify(),
            Err(FrameError::Checksum {
                expected: 0xE1,
                received: 0xE0
            })
        );
        assert!(frame.reading(TemperatureUnit::Celsius).is_err());
    }

    #[test]
    fn test_from_raw_layout() {
        let frame = Frame::from_raw(0x0344, 0x00DD);
        assert_eq!(frame.as_bytes()[..4], [0x03, 0x44, 0x00, 0xDD]);
        assert_eq!(frame.reserved(), [0, 0]);
        assert!(frame.is_valid());
    }
}
