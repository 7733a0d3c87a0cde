//! Bean temperature model.
//!
//! The sensor response is fitted with two cubic polynomials. Which one applies
//! is decided by a hard range guard on the raw fields, not a blend. The
//! thresholds and coefficients are calibration data and must stay exactly as
//! written.

use crate::frame::Frame;

/// `raw_x` above this selects the Y curve.
pub const RAW_X_LIMIT: u16 = 836;

/// `raw_y` above this selects the Y curve.
pub const RAW_Y_LIMIT: u16 = 221;

/// Raw field to model input scale.
pub const RAW_SCALE: f64 = 0.001;

/// Output unit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TemperatureUnit {
    #[default]
    Celsius,
    Fahrenheit,
}

impl TemperatureUnit {
    /// Parse the single-letter unit code (`C` or `F`, any case).
    #[must_use]
    pub const fn from_char(c: char) -> Option<Self> {
        match c {
            'C' | 'c' => Some(Self::Celsius),
            'F' | 'f' => Some(Self::Fahrenheit),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            Self::Celsius => 'C',
            Self::Fahrenheit => 'F',
        }
    }

    /// Convert a Celsius value into this unit.
    #[inline]
    #[must_use]
    pub fn convert_celsius(self, celsius: f64) -> f64 {
        match self {
            Self::Celsius => celsius,
            Self::Fahrenheit => 1.8 * celsius + 32.0,
        }
    }
}

/// Calibration region used for a conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CurveBranch {
    /// Low range, driven by `raw_x`.
    X,
    /// High range, driven by `raw_y`.
    Y,
}

impl CurveBranch {
    #[inline]
    #[must_use]
    pub const fn select(raw_x: u16, raw_y: u16) -> Self {
        if raw_x > RAW_X_LIMIT || raw_y > RAW_Y_LIMIT {
            Self::Y
        } else {
            Self::X
        }
    }
}

/// Degrees Celsius for the two raw fields.
#[must_use]
pub fn celsius(raw_x: u16, raw_y: u16) -> f64 {
    let x = RAW_SCALE * f64::from(raw_x);
    let y = RAW_SCALE * f64::from(raw_y);

    match CurveBranch::select(raw_x, raw_y) {
        CurveBranch::Y => -224.2 * y * y * y + 385.9 * y * y - 327.1 * y + 171.0,
        CurveBranch::X => -278.33 * x * x * x + 491.944 * x * x - 451.444 * x + 310.668,
    }
}

/// Temperature of a frame in `unit`. The checksum is not inspected.
#[must_use]
pub fn temperature(frame: &Frame, unit: TemperatureUnit) -> f64 {
    unit.convert_celsius(celsius(frame.raw_x(), frame.raw_y()))
}

/// A converted temperature ready for the transport.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Reading {
    pub value: f64,
    pub unit: TemperatureUnit,
    pub branch: CurveBranch,
}

impl Reading {
    #[must_use]
    pub fn from_frame(frame: &Frame, unit: TemperatureUnit) -> Self {
        Self {
            value: temperature(frame, unit),
            unit,
            branch: CurveBranch::select(frame.raw_x(), frame.raw_y()),
        }
    }
}
