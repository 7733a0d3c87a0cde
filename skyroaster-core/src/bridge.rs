//! TelemetryBridge: turns received frames into readings on a sink.

use crate::receiver::FrameReceiver;
use crate::sink::{ReadingSink, SinkError};
use crate::unit::UnitSetting;
use skyroaster_proto::{FrameError, Reading};

/// Polls a [`FrameReceiver`] and forwards each valid frame as a [`Reading`].
///
/// The unit is read from the shared [`UnitSetting`] on every frame, so a unit
/// change applies to the next reading without restarting anything.
///
/// # Error Handling
///
/// Frames failing the checksum are dropped, counted in
/// [`TelemetryBridge::rejected_frames`] and reported as [`BridgeError::Frame`].
/// Nothing is sent for them.
pub struct TelemetryBridge<'r, S, O = ()> {
    receiver: &'r FrameReceiver<O>,
    unit: &'r UnitSetting,
    sink: S,
    rejected: u32,
    forwarded: u32,
}

impl<'r, S: ReadingSink, O> TelemetryBridge<'r, S, O> {
    pub fn new(receiver: &'r FrameReceiver<O>, unit: &'r UnitSetting, sink: S) -> Self {
        Self {
            receiver,
            unit,
            sink,
            rejected: 0,
            forwarded: 0,
        }
    }

    /// Handle at most one waiting frame.
    ///
    /// Returns `Ok(None)` when no frame is waiting.
    pub async fn poll_once(&mut self) -> Result<Option<Reading>, BridgeError> {
        let Some(frame) = self.receiver.take_message() else {
            return Ok(None);
        };

        let reading = match frame.reading(self.unit.get()) {
            Ok(reading) => reading,
            Err(e) => {
                self.rejected = self.rejected.wrapping_add(1);
                warn!("frame rejected: {:?}", e);
                return Err(BridgeError::Frame(e));
            }
        };

        if !self.sink.is_ready() {
            return Err(BridgeError::Sink(SinkError::NotReady));
        }
        self.sink.send(&reading).await.map_err(BridgeError::Sink)?;
        self.forwarded = self.forwarded.wrapping_add(1);
        Ok(Some(reading))
    }

    /// Frames dropped for a bad checksum.
    pub fn rejected_frames(&self) -> u32 {
        self.rejected
    }

    /// Readings the sink accepted.
    pub fn forwarded(&self) -> u32 {
        self.forwarded
    }

    pub fn receiver(&self) -> &'r FrameReceiver<O> {
        self.receiver
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }
}

/// Error type for bridge operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BridgeError {
    /// The received frame failed validation.
    Frame(FrameError),
    /// The sink refused the reading.
    Sink(SinkError),
}

impl From<FrameError> for BridgeError {
    fn from(e: FrameError) -> Self {
        Self::Frame(e)
    }
}

impl From<SinkError> for BridgeError {
    fn from(e: SinkError) -> Self {
        Self::Sink(e)
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use crate::sink::NullSink;
    use crate::test_util::block_on;
    use core::future::Future;
    use skyroaster_proto::encode::{edge_train, pulse_train};
    use skyroaster_proto::{CurveBranch, Frame, TemperatureUnit};
    use std::vec::Vec;

    struct MockSink {
        sent: Vec<Reading>,
        ready: bool,
        fail: bool,
    }

    impl MockSink {
        fn new() -> Self {
            Self {
                sent: Vec::new(),
                ready: true,
                fail: false,
            }
        }
    }

    impl ReadingSink for MockSink {
        fn send(&mut self, reading: &Reading) -> impl Future<Output = Result<(), SinkError>> {
            let result = if self.fail {
                Err(SinkError::Io)
            } else {
                self.sent.push(*reading);
                Ok(())
            };
            core::future::ready(result)
        }

        fn is_ready(&self) -> bool {
            self.ready
        }
    }

    fn deliver(receiver: &FrameReceiver, frame: &Frame) {
        for edge in edge_train(&pulse_train(frame), 0, 600) {
            receiver.on_edge(edge);
        }
    }

    #[test]
    fn test_nothing_waiting() {
        let receiver = FrameReceiver::new();
        let unit = UnitSetting::default();
        let mut bridge = TelemetryBridge::new(&receiver, &unit, NullSink);

        assert_eq!(block_on(bridge.poll_once()), Ok(None));
        assert_eq!(bridge.forwarded(), 0);
    }

    #[test]
    fn test_valid_frame_forwarded() {
        let receiver = FrameReceiver::new();
        let unit = UnitSetting::default();
        let mut bridge = TelemetryBridge::new(&receiver, &unit, MockSink::new());

        deliver(&receiver, &Frame::from_raw(400, 80));
        let reading = block_on(bridge.poll_once()).ok().flatten();

        assert!(reading.is_some_and(|r| r.value > 190.9 && r.value < 191.0));
        assert!(reading.is_some_and(|r| r.branch == CurveBranch::X));
        assert_eq!(bridge.sink().sent.len(), 1);
        assert_eq!(bridge.forwarded(), 1);
        assert!(!receiver.message_available());
    }

    #[test]
    fn test_unit_change_applies_to_next_frame() {
        let receiver = FrameReceiver::new();
        let unit = UnitSetting::default();
        let mut bridge = TelemetryBridge::new(&receiver, &unit, MockSink::new());

        deliver(&receiver, &Frame::from_raw(400, 80));
        assert!(block_on(bridge.poll_once()).is_ok());
        unit.set(TemperatureUnit::Fahrenheit);
        deliver(&receiver, &Frame::from_raw(400, 80));
        assert!(block_on(bridge.poll_once()).is_ok());

        let sent = &bridge.sink().sent;
        assert_eq!(sent[0].unit, TemperatureUnit::Celsius);
        assert_eq!(sent[1].unit, TemperatureUnit::Fahrenheit);
        assert!(sent[1].value > 375.7 && sent[1].value < 375.8);
    }

    #[test]
    fn test_bad_checksum_rejected_and_not_sent() {
        let receiver = FrameReceiver::new();
        let unit = UnitSetting::default();
        let mut bridge = TelemetryBridge::new(&receiver, &unit, MockSink::new());

        deliver(&receiver, &Frame::new([0x01, 0x90, 0x00, 0x50, 0x00, 0x00, 0x00]));
        let result = block_on(bridge.poll_once());

        assert_eq!(
            result,
            Err(BridgeError::Frame(FrameError::Checksum {
                expected: 0xE1,
                received: 0x00
            }))
        );
        assert_eq!(bridge.rejected_frames(), 1);
        assert!(bridge.sink().sent.is_empty());
        assert!(!receiver.message_available());
    }

    #[test]
    fn test_sink_errors_propagate() {
        let receiver = FrameReceiver::new();
        let unit = UnitSetting::default();
        let mut sink = MockSink::new();
        sink.fail = true;
        let mut bridge = TelemetryBridge::new(&receiver, &unit, sink);

        deliver(&receiver, &Frame::from_raw(10, 10));
        assert_eq!(
            block_on(bridge.poll_once()),
            Err(BridgeError::Sink(SinkError::Io))
        );
        assert_eq!(bridge.forwarded(), 0);

        bridge.sink_mut().fail = false;
        bridge.sink_mut().ready = false;
        deliver(&receiver, &Frame::from_raw(10, 10));
        assert_eq!(
            block_on(bridge.poll_once()),
            Err(BridgeError::Sink(SinkError::NotReady))
        );
        assert!(bridge.into_sink().sent.is_empty());
    }
}
