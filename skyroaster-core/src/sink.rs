//! Reading sink trait, error types and the ASCII reading line.

use core::fmt::Write;
use core::future::Future;
use heapless::String;
use skyroaster_proto::Reading;

/// Longest line produced by [`format_reading`].
pub const MAX_READING_LINE: usize = 24;

/// Error type for sink operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SinkError {
    /// Transport I/O error.
    Io,
    /// No client connected / transport not ready.
    NotReady,
    /// Reading could not be rendered.
    Format,
}

/// Async trait for whatever carries readings to the companion app.
///
/// The wireless link itself lives outside this crate; implement this for
/// it, or use the UART sink in the firmware.
///
/// # `no_std` Compatibility
///
/// All implementations must be `#![no_std]` compatible with no heap allocation.
pub trait ReadingSink {
    /// Deliver one reading.
    fn send(&mut self, reading: &Reading) -> impl Future<Output = Result<(), SinkError>>;

    /// Check if the sink can accept data.
    fn is_ready(&self) -> bool;
}

/// Sink that discards every reading.
pub struct NullSink;

impl ReadingSink for NullSink {
    async fn send(&mut self, _reading: &Reading) -> Result<(), SinkError> {
        Ok(())
    }

    fn is_ready(&self) -> bool {
        true
    }
}

/// Render a reading as `BT:<value><unit>\n`, one decimal place.
///
/// ```
/// use skyroaster_core::format_reading;
/// use skyroaster_proto::{Frame, Reading, TemperatureUnit};
///
/// let reading = Reading::from_frame(&Frame::from_raw(400, 80), TemperatureUnit::Celsius);
/// assert_eq!(format_reading(&reading).unwrap().as_str(), "BT:191.0C\n");
/// ```
pub fn format_reading(reading: &Reading) -> Result<String<MAX_READING_LINE>, SinkError> {
    let mut line = String::new();
    writeln!(line, "BT:{:.1}{}", reading.value, reading.unit.as_char())
        .map_err(|_| SinkError::Format)?;
    Ok(line)
}
