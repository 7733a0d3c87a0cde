//! UART reading sink.

use embassy_rp::uart::{Async, Error as UartError, UartTx};
use skyroaster_core::{format_reading, Reading, ReadingSink, SinkError};

/// Writes each reading as one `BT:<value><unit>` line.
///
/// # Pins
///
/// Uses UART1 by default:
/// - GPIO 8: TX
pub struct UartReadingSink<'d> {
    tx: UartTx<'d, Async>,
}

impl<'d> UartReadingSink<'d> {
    /// Create a new sink from the given UART transmitter.
    pub fn new(tx: UartTx<'d, Async>) -> Self {
        Self { tx }
    }
}

impl<'d> ReadingSink for UartReadingSink<'d> {
    async fn send(&mut self, reading: &Reading) -> Result<(), SinkError> {
        let line = format_reading(reading)?;
        self.tx
            .write(line.as_bytes())
            .await
            .map_err(sink_error)?;
        Ok(())
    }

    fn is_ready(&self) -> bool {
        // UART is always ready if we have the peripheral
        true
    }
}

fn sink_error(e: UartError) -> SinkError {
    defmt::warn!("UART write failed: {:?}", e);
    SinkError::Io
}
