//! Pulse timing windows and low-pulse classification.
//!
//! Every symbol on the line is a low pulse whose width carries the meaning.
//! The three valid bands do not overlap and leave a dead zone between the
//! `0` and `1` bands:
//!
//! ```text
//!   0 ........ 900 | 900 ... 1200 | 1200 ... 2000 | ... | 7000 ... 10000
//!      bit 0       |   invalid    |     bit 1     |     |  start marker
//! ```

/// Shortest low pulse accepted as a start marker (inclusive).
pub const START_MIN_US: u32 = 7_000;

/// Longest low pulse accepted as a start marker (inclusive).
pub const START_MAX_US: u32 = 10_000;

/// Bit `0` pulses are strictly shorter than this.
pub const BIT0_MAX_US: u32 = 900;

/// Shortest bit `1` pulse (inclusive).
pub const BIT1_MIN_US: u32 = 1_200;

/// Longest bit `1` pulse (inclusive).
pub const BIT1_MAX_US: u32 = 2_000;

/// Meaning of a single low pulse, independent of decoder state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PulseClass {
    /// Start-of-frame marker.
    Start,
    /// Data bit `0`.
    Zero,
    /// Data bit `1`.
    One,
    /// Dead zone or out of every band.
    Invalid,
}

impl PulseClass {
    /// Bit value for data pulses, `None` for everything else.
    #[inline]
    #[must_use]
    pub const fn bit(self) -> Option<u8> {
        match self {
            PulseClass::Zero => Some(0),
            PulseClass::One => Some(1),
            PulseClass::Start | PulseClass::Invalid => None,
        }
    }
}

/// Decoder timing configuration.
///
/// [`DecoderConfig::DEFAULT`] matches the roaster's wire timing and should
/// only be changed for bench testing against a signal generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DecoderConfig {
    pub start_min_us: u32,
    pub start_max_us: u32,
    pub bit0_max_us: u32,
    pub bit1_min_us: u32,
    pub bit1_max_us: u32,
    /// Abort a partial frame when the line stays high longer than this
    /// between two pulses. `None` waits forever for the next edge.
    ///
    /// The gap is a wrapping `u32` difference, so silence longer than
    /// 2³² µs (about 71.6 minutes) can wrap to a short gap and go unnoticed.
    pub idle_timeout_us: Option<u32>,
}

impl DecoderConfig {
    /// Roaster wire timing, no inactivity timeout.
    pub const DEFAULT: Self = Self {
        start_min_us: START_MIN_US,
        start_max_us: START_MAX_US,
        bit0_max_us: BIT0_MAX_US,
        bit1_min_us: BIT1_MIN_US,
        bit1_max_us: BIT1_MAX_US,
        idle_timeout_us: None,
    };

    /// Same windows with an inactivity timeout enabled.
    #[must_use]
    pub const fn with_idle_timeout(self, timeout_us: u32) -> Self {
        Self {
            idle_timeout_us: Some(timeout_us),
            ..self
        }
    }

    /// Check that the bands are ordered and disjoint.
    ///
    /// Overlapping bands shadow each other in [`DecoderConfig::classify`];
    /// with `bit1_max_us >= start_min_us` the decoder never synchronizes.
    /// Decoder constructors debug-assert this.
    #[must_use]
    pub const fn is_well_formed(&self) -> bool {
        self.bit0_max_us <= self.bit1_min_us
            && self.bit1_min_us <= self.bit1_max_us
            && self.bit1_max_us < self.start_min_us
            && self.start_min_us <= self.start_max_us
    }

    /// Classify a low pulse width in microseconds.
    #[inline]
    #[must_use]
    pub const fn classify(&self, low_us: u32) -> PulseClass {
        if low_us < self.bit0_max_us {
            PulseClass::Zero
        } else if low_us >= self.bit1_min_us && low_us <= self.bit1_max_us {
            PulseClass::One
        } else if low_us >= self.start_min_us && low_us <= self.start_max_us {
            PulseClass::Start
        } else {
            PulseClass::Invalid
        }
    }
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}
