//! Roaster sensor-line protocol: timing, decoding and temperature model.
//!
//! The roaster's sensor line carries 7-byte frames as a sequence of low
//! pulses whose widths encode a start marker and the data bits:
//!
//! | Signal       | Low pulse (µs) |
//! |--------------|----------------|
//! | Start marker | 7000 – 10000   |
//! | Bit `0`      | < 900          |
//! | Bit `1`      | 1200 – 2000    |
//! | 900 – 1200   | invalid        |
//!
//! Bytes arrive in order, each LSB first. The frame layout is:
//!
//! ```text
//! [raw X hi][raw X lo][raw Y hi][raw Y lo][reserved][reserved][sum of 0..6]
//! ```
//!
//! - [`timing`]: wire constants, [`DecoderConfig`], [`PulseClass`]
//! - [`edge`]: [`Edge`] events and the [`EdgeTracker`] pulse meter
//! - [`decoder`]: the [`FrameDecoder`] state machine and its observer hook
//! - [`frame`]: [`Frame`], [`validate`] and the checksum
//! - [`temperature`]: the two-branch calibration curve and [`Reading`]
//! - [`encode`]: frame-to-pulse encoding for simulation
//!
//! # Example
//!
//! ```
//! use skyroaster_proto::{encode::pulse_train, Frame, FrameDecoder, TemperatureUnit};
//!
//! let sent = Frame::from_raw(400, 80);
//! let mut decoder = FrameDecoder::new();
//!
//! let mut received = None;
//! for low_us in pulse_train(&sent) {
//!     if let Some(frame) = decoder.push_pulse(low_us) {
//!         received = Some(frame);
//!     }
//! }
//!
//! let frame = received.unwrap();
//! assert!(frame.is_valid());
//! let celsius = frame.temperature(TemperatureUnit::Celsius);
//! assert!(celsius > 190.0 && celsius < 191.0);
//! ```
//!
//! # Features
//!
//! - **`std`**: Enable standard library support (for host testing)
//! - **`defmt`**: `defmt::Format` on public types and decoder trace via defmt
//! - **`log`**: decoder trace via the `log` facade
//!
//! # No-std Support
//!
//! This crate is `#![no_std]` by default and never allocates, so the decoder
//! can run directly inside an interrupt handler.

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "std")]
extern crate std;

// Must come first so the macros are visible to the other modules.
#[macro_use]
mod fmt;

pub mod decoder;
pub mod edge;
pub mod encode;
pub mod frame;
pub mod temperature;
pub mod timing;

pub use decoder::{DecodeEvent, DecodeObserver, DecodeStats, DecoderState, FrameDecoder};
pub use edge::{Edge, EdgeTracker, Level, Transition};
pub use frame::{
    checksum, validate, Frame, FrameError, BITS_PER_BYTE, FRAME_BITS, FRAME_LEN, PAYLOAD_LEN,
};
pub use temperature::{celsius, temperature, CurveBranch, Reading, TemperatureUnit};
pub use timing::{
    DecoderConfig, PulseClass, BIT0_MAX_US, BIT1_MAX_US, BIT1_MIN_US, START_MAX_US, START_MIN_US,
};
