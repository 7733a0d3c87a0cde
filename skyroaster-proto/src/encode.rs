//! Frame-to-pulse encoding for bench simulation and tests.
//!
//! Produces the low-pulse widths a well-behaved sensor would emit, using the
//! middle of each valid band.

use crate::edge::Edge;
use crate::frame::{Frame, BITS_PER_BYTE, FRAME_BITS};

/// Start marker width used by the encoder.
pub const START_NOMINAL_US: u32 = 8_500;

/// Bit `0` width used by the encoder.
pub const BIT0_NOMINAL_US: u32 = 500;

/// Bit `1` width used by the encoder.
pub const BIT1_NOMINAL_US: u32 = 1_600;

/// Start marker plus one pulse per data bit.
pub const PULSES_PER_FRAME: usize = 1 + FRAME_BITS;

/// Low-pulse widths for `frame`, start marker first, bits LSB first.
#[must_use]
pub fn pulse_train(frame: &Frame) -> [u32; PULSES_PER_FRAME] {
    let mut pulses = [0u32; PULSES_PER_FRAME];
    pulses[0] = START_NOMINAL_US;

    for (i, byte) in frame.as_bytes().iter().enumerate() {
        for bit in 0..BITS_PER_BYTE {
            pulses[1 + i * BITS_PER_BYTE + bit] = if byte & (1 << bit) != 0 {
                BIT1_NOMINAL_US
            } else {
                BIT0_NOMINAL_US
            };
        }
    }
    pulses
}

/// Iterator of falling/rising edges for a pulse sequence.
///
/// The first falling edge is at `start_us`; the line stays high for
/// `high_us` between pulses. Timestamps wrap like a hardware counter.
pub struct EdgeTrain<'a> {
    pulses: &'a [u32],
    index: usize,
    now_us: u32,
    high_us: u32,
    rising_next: bool,
}

/// See [`EdgeTrain`].
#[must_use]
pub fn edge_train(pulses: &[u32], start_us: u32, high_us: u32) -> EdgeTrain<'_> {
    EdgeTrain {
        pulses,
        index: 0,
        now_us: start_us,
        high_us,
        rising_next: false,
    }
}

impl Iterator for EdgeTrain<'_> {
    type Item = Edge;

    fn next(&mut self) -> Option<Edge> {
        let low_us = *self.pulses.get(self.index)?;

        if self.rising_next {
            self.now_us = self.now_us.wrapping_add(low_us);
            self.rising_next = false;
            self.index += 1;
            let edge = Edge::rising(self.now_us);
            self.now_us = self.now_us.wrapping_add(self.high_us);
            Some(edge)
        } else {
            self.rising_next = true;
            Some(Edge::falling(self.now_us))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edge::Level;

    #[test]
    fn test_pulse_train_layout() {
        let frame = Frame::new([0x01, 0x80, 0, 0, 0, 0, 0x81]);
        let pulses = pulse_train(&frame);
        assert_eq!(pulses[0], START_NOMINAL_US);
        // byte 0 = 0x01: first bit set
        assert_eq!(pulses[1], BIT1_NOMINAL_US);
        assert_eq!(pulses[2], BIT0_NOMINAL_US);
        // byte 1 = 0x80: last bit of the byte set
        assert_eq!(pulses[9], BIT0_NOMINAL_US);
        assert_eq!(pulses[16], BIT1_NOMINAL_US);
    }

    #[test]
    fn test_edge_train_timing() {
        let edges: [Option<Edge>; 5] = {
            let mut it = edge_train(&[8_000, 500], 100, 700);
            [it.next(), it.next(), it.next(), it.next(), it.next()]
        };
        assert_eq!(edges[0], Some(Edge::falling(100)));
        assert_eq!(edges[1], Some(Edge::rising(8_100)));
        assert_eq!(edges[2], Some(Edge::falling(8_800)));
        assert_eq!(edges[3], Some(Edge::rising(9_300)));
        assert_eq!(edges[4], None);
    }

    #[test]
    fn test_edge_train_alternates_levels() {
        let frame = Frame::from_raw(42, 7);
        let pulses = pulse_train(&frame);
        let mut expected = Level::Low;
        let mut count = 0;
        for edge in edge_train(&pulses, 0, 600) {
            assert_eq!(edge.level, expected);
            expected = match expected {
                Level::Low => Level::High,
                Level::High => Level::Low,
            };
            count += 1;
        }
        assert_eq!(count, 2 * PULSES_PER_FRAME);
    }
}
