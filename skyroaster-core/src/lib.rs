//! Platform-agnostic receiver, edge capture and telemetry bridge for the
//! roaster sensor line.
//!
//! This crate sits between a GPIO edge source and whatever transport carries
//! readings to the companion app. It has no chip dependencies and runs its
//! tests on the host.
//!
//! # Overview
//!
//! - [`receiver`]: interrupt-shared decoder with a single-slot frame handoff ([`FrameReceiver`])
//! - [`capture`]: edge capture over `embedded-hal` pin traits ([`EdgeCapture`], [`MicrosClock`])
//! - [`unit`]: process-wide output unit ([`UnitSetting`])
//! - [`sink`]: transport trait ([`ReadingSink`]) and the reading line format
//! - [`bridge`]: frame-to-reading polling loop ([`TelemetryBridge`])
//!
//! # Data Flow
//!
//! ```text
//! sensor line ─► EdgeCapture ─► FrameReceiver ─► TelemetryBridge ─► ReadingSink
//!   (edges)       (edge ctx)    (critical sec)    (main loop)       (transport)
//! ```
//!
//! # Features
//!
//! - **`std`**: Enable standard library support (for host testing)
//! - **`defmt`**: Enable defmt formatting and logging (for embedded targets)
//! - **`log`**: Log through the `log` facade instead
//!
//! # Critical Sections
//!
//! [`FrameReceiver`] uses `critical-section`. The final binary must link an
//! implementation, e.g. `embassy-rp` with `critical-section-impl`, or
//! `critical-section` with `std` on the host.

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "std")]
extern crate std;

// Must come first so the macros are visible to the other modules.
#[macro_use]
mod fmt;

pub mod bridge;
pub mod capture;
pub mod receiver;
pub mod sink;
pub mod unit;

#[cfg(test)]
mod test_util;

// Host critical-section implementation for the tests.
#[cfg(test)]
use critical_section as _;

pub use bridge::{BridgeError, TelemetryBridge};
pub use capture::{CaptureError, EdgeCapture, MicrosClock};
pub use receiver::FrameReceiver;
pub use sink::{format_reading, NullSink, ReadingSink, SinkError, MAX_READING_LINE};
pub use unit::UnitSetting;

pub use skyroaster_proto::{
    DecodeStats, DecoderConfig, Edge, Frame, FrameError, Reading, TemperatureUnit,
};
