//! Companion commands arriving on the UART.

use embassy_rp::uart::{Async, Error as UartError, UartRx};
use heapless::Vec;

/// Longest command line kept; longer lines are discarded whole.
pub const MAX_COMMAND_LINE: usize = 32;

/// Reads newline-terminated command lines.
///
/// # Pins
///
/// Uses UART1 by default:
/// - GPIO 9: RX
pub struct UartCommandReader<'d> {
    rx: UartRx<'d, Async>,
    buffer: Vec<u8, MAX_COMMAND_LINE>,
}

/// Error type for command reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, defmt::Format)]
pub enum CommandError {
    /// UART receive failed.
    Uart(UartError),
    /// Line longer than [`MAX_COMMAND_LINE`].
    TooLong,
}

impl<'d> UartCommandReader<'d> {
    /// Create a new reader from the given UART receiver.
    pub fn new(rx: UartRx<'d, Async>) -> Self {
        Self {
            rx,
            buffer: Vec::new(),
        }
    }

    /// Read bytes until a newline, returning the line without it.
    ///
    /// If a line exceeds the buffer capacity, the rest of the line is
    /// discarded so the next read starts on a fresh command.
    pub async fn read_line(&mut self) -> Result<&[u8], CommandError> {
        self.buffer.clear();

        loop {
            let mut byte = [0u8; 1];
            self.rx.read(&mut byte).await.map_err(CommandError::Uart)?;

            if byte[0] == b'\n' {
                return Ok(self.buffer.as_slice());
            }

            if self.buffer.push(byte[0]).is_err() {
                loop {
                    self.rx.read(&mut byte).await.map_err(CommandError::Uart)?;
                    if byte[0] == b'\n' {
                        break;
                    }
                }
                return Err(CommandError::TooLong);
            }
        }
    }
}
