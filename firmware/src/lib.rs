//! Roaster sensor line to telemetry bridge for RP2040.
//!
//! This crate provides the embedded side of the bridge: the edge timestamp
//! source, the UART reading sink and the UART command reader. Decoding lives in `skyroaster-core`.

#![no_std]

// Re-export core types for convenience
pub use skyroaster_core::{
    format_reading, BridgeError, DecodeStats, DecoderConfig, EdgeCapture, Frame, FrameReceiver,
    NullSink, Reading, ReadingSink, SinkError, TelemetryBridge, TemperatureUnit, UnitSetting,
};

pub mod uart_commands;
pub mod uart_sink;

pub use uart_commands::{CommandError, UartCommandReader};
pub use uart_sink::UartReadingSink;

use embassy_time::Instant;

/// Microsecond timestamp for edge capture.
///
/// Truncates the 64-bit uptime; the decoder works on wrapping differences.
pub fn now_us() -> u32 {
    Instant::now().as_micros() as u32
}
