//! Edge capture over `embedded-hal` pin traits.
//!
//! [`EdgeCapture`] waits for any edge on the sensor line, timestamps it,
//! samples the new level and feeds the [`FrameReceiver`] straight away. No
//! queueing: each edge is fully decoded before the next wait starts, which is
//! well inside the 900 µs minimum pulse width.
//!
//! Run it from the highest-priority executor available so it preempts the
//! polling loop the same way a GPIO interrupt handler would.

use crate::receiver::FrameReceiver;
use embedded_hal::digital::InputPin;
use embedded_hal_async::digital::Wait;
use skyroaster_proto::{DecodeObserver, Edge, Level};

/// Free-running microsecond counter. Wrapping at `u32::MAX` is expected.
pub trait MicrosClock {
    fn now_us(&self) -> u32;
}

impl<F: Fn() -> u32> MicrosClock for F {
    fn now_us(&self) -> u32 {
        self()
    }
}

/// Error type for edge capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CaptureError {
    /// Waiting for or sampling the pin failed.
    Pin,
}

/// Binds one input pin to one receiver.
pub struct EdgeCapture<'r, P, C, O = ()> {
    pin: P,
    clock: C,
    receiver: &'r FrameReceiver<O>,
}

impl<'r, P, C, O> EdgeCapture<'r, P, C, O>
where
    P: Wait + InputPin,
    C: MicrosClock,
    O: DecodeObserver,
{
    /// `pin` must already be configured as a pulled-up input.
    pub fn new(pin: P, clock: C, receiver: &'r FrameReceiver<O>) -> Self {
        Self {
            pin,
            clock,
            receiver,
        }
    }

    /// Wait for one edge and feed it to the receiver.
    pub async fn capture_edge(&mut self) -> Result<Edge, CaptureError> {
        self.pin
            .wait_for_any_edge()
            .await
            .map_err(|_| CaptureError::Pin)?;
        let now = self.clock.now_us();
        let level = if self.pin.is_low().map_err(|_| CaptureError::Pin)? {
            Level::Low
        } else {
            Level::High
        };

        let edge = Edge::new(level, now);
        self.receiver.on_edge(edge);
        Ok(edge)
    }

    /// Capture edges forever.
    pub async fn run(&mut self) -> ! {
        loop {
            if let Err(e) = self.capture_edge().await {
                warn!("edge capture failed: {:?}", e);
            }
        }
    }

    pub fn receiver(&self) -> &'r FrameReceiver<O> {
        self.receiver
    }

    /// Give the pin and clock back.
    pub fn into_parts(self) -> (P, C) {
        (self.pin, self.clock)
    }
}
