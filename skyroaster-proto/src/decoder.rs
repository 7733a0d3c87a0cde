//! Pulse-width frame decoder.
//!
//! A two-state machine fed with low-pulse widths:
//!
//! - **Idle**: waits for a start marker; every other pulse is ignored.
//! - **Receiving**: every pulse must be a data bit. Bits fill each byte LSB
//!   first; after 7 bytes the frame is returned and the decoder goes idle.
//!   Anything that is not a bit drops the partial frame and goes idle, so the
//!   next start marker resynchronizes.
//!
//! The decoder owns no shared state and never allocates. Delivering the frame
//! to another context is the caller's job.

use crate::edge::{Edge, EdgeTracker, Transition};
use crate::frame::{Frame, BITS_PER_BYTE, FRAME_LEN};
use crate::timing::{DecoderConfig, PulseClass};

/// Decoder state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DecoderState {
    Idle,
    Receiving,
}

/// Something the decoder did, reported to its [`DecodeObserver`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DecodeEvent {
    /// Start marker accepted, a new frame begins.
    Start,
    /// Data bit accepted.
    Bit { value: u8, low_us: u32 },
    /// Non-start pulse while idle.
    Ignored { low_us: u32 },
    /// Unclassifiable pulse while receiving; partial frame dropped.
    Aborted { low_us: u32 },
    /// Rising edge with no low pulse in progress.
    SpuriousEdge,
    /// Line idle too long mid-frame; partial frame dropped.
    Timeout { high_us: u32 },
    /// All 56 bits received.
    FrameComplete,
    /// A frame completed while the previous one was still unread.
    Overrun,
}

/// Receives decoder events.
///
/// Called from the edge context, so implementations must be short and
/// bounded. `()` ignores everything.
pub trait DecodeObserver {
    fn on_event(&mut self, event: DecodeEvent);
}

impl DecodeObserver for () {
    #[inline]
    fn on_event(&mut self, _event: DecodeEvent) {}
}

/// Event counters for monitoring resynchronization.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DecodeStats {
    pub starts: u32,
    pub bits: u32,
    pub ignored: u32,
    pub aborts: u32,
    pub spurious_edges: u32,
    pub timeouts: u32,
    pub frames: u32,
    pub overruns: u32,
}

impl DecodeStats {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            starts: 0,
            bits: 0,
            ignored: 0,
            aborts: 0,
            spurious_edges: 0,
            timeouts: 0,
            frames: 0,
            overruns: 0,
        }
    }

    /// Frames dropped for any reason after their start marker.
    #[must_use]
    pub const fn dropped(&self) -> u32 {
        self.aborts
            .wrapping_add(self.timeouts)
            .wrapping_add(self.overruns)
    }
}

impl DecodeObserver for DecodeStats {
    fn on_event(&mut self, event: DecodeEvent) {
        let counter = match event {
            DecodeEvent::Start => &mut self.starts,
            DecodeEvent::Bit { .. } => &mut self.bits,
            DecodeEvent::Ignored { .. } => &mut self.ignored,
            DecodeEvent::Aborted { .. } => &mut self.aborts,
            DecodeEvent::SpuriousEdge => &mut self.spurious_edges,
            DecodeEvent::Timeout { .. } => &mut self.timeouts,
            DecodeEvent::FrameComplete => &mut self.frames,
            DecodeEvent::Overrun => &mut self.overruns,
        };
        *counter = counter.wrapping_add(1);
    }
}

/// Frame decoder state machine.
pub struct FrameDecoder<O = ()> {
    config: DecoderConfig,
    tracker: EdgeTracker,
    state: DecoderState,
    byte_index: u8,
    bit_count: u8,
    current: u8,
    buf: [u8; FRAME_LEN],
    debug: bool,
    observer: O,
}

impl FrameDecoder<()> {
    /// Decoder with wire timing and no observer.
    #[must_use]
    pub const fn new() -> Self {
        Self::with_observer(DecoderConfig::DEFAULT, ())
    }
}

impl Default for FrameDecoder<()> {
    fn default() -> Self {
        Self::new()
    }
}

impl<O> FrameDecoder<O> {
    /// `config` must be well formed; see [`DecoderConfig::is_well_formed`].
    #[must_use]
    pub const fn with_observer(config: DecoderConfig, observer: O) -> Self {
        debug_assert!(config.is_well_formed(), "overlapping pulse bands");
        Self {
            config,
            tracker: EdgeTracker::new(),
            state: DecoderState::Idle,
            byte_index: 0,
            bit_count: 0,
            current: 0,
            buf: [0u8; FRAME_LEN],
            debug: false,
            observer,
        }
    }

    #[inline]
    #[must_use]
    pub const fn state(&self) -> DecoderState {
        self.state
    }

    #[inline]
    #[must_use]
    pub const fn config(&self) -> &DecoderConfig {
        &self.config
    }

    /// Enable the per-pulse trace. Does not change decoding.
    pub fn set_debug(&mut self, enabled: bool) {
        self.debug = enabled;
    }

    #[inline]
    #[must_use]
    pub const fn is_debug(&self) -> bool {
        self.debug
    }

    pub fn observer(&self) -> &O {
        &self.observer
    }

    pub fn observer_mut(&mut self) -> &mut O {
        &mut self.observer
    }

    /// Bytes completed so far in the current frame.
    #[inline]
    #[must_use]
    pub const fn bytes_received(&self) -> usize {
        self.byte_index as usize
    }
}

impl<O: DecodeObserver> FrameDecoder<O> {
    /// Drop any partial frame and pulse in progress.
    pub fn reset(&mut self) {
        self.tracker.reset();
        self.clear_partial();
        self.state = DecoderState::Idle;
    }

    /// Feed one line transition. Returns a frame when its last bit ends.
    pub fn on_edge(&mut self, edge: Edge) -> Option<Frame> {
        match self.tracker.on_edge(edge) {
            Transition::LowStarted { high_us } => {
                if let (DecoderState::Receiving, Some(limit), Some(high_us)) =
                    (self.state, self.config.idle_timeout_us, high_us)
                {
                    if high_us > limit {
                        if self.debug {
                            debug!("line idle {} us mid-frame, abort", high_us);
                        }
                        self.abort();
                        self.observer.on_event(DecodeEvent::Timeout { high_us });
                    }
                }
                None
            }
            Transition::LowEnded { low_us } => self.push_pulse(low_us),
            Transition::Spurious => {
                if self.debug {
                    debug!("spurious rising edge");
                }
                self.observer.on_event(DecodeEvent::SpuriousEdge);
                None
            }
        }
    }

    /// Feed one measured low pulse.
    pub fn push_pulse(&mut self, low_us: u32) -> Option<Frame> {
        if self.debug {
            debug!("low pulse: {} us", low_us);
        }

        let class = self.config.classify(low_us);
        match self.state {
            DecoderState::Idle => {
                if class == PulseClass::Start {
                    self.clear_partial();
                    self.state = DecoderState::Receiving;
                    if self.debug {
                        debug!("start detected");
                    }
                    self.observer.on_event(DecodeEvent::Start);
                } else {
                    self.observer.on_event(DecodeEvent::Ignored { low_us });
                }
                None
            }
            DecoderState::Receiving => match class.bit() {
                Some(value) => self.push_bit(value, low_us),
                None => {
                    if self.debug {
                        debug!("invalid pulse {} us, abort", low_us);
                    }
                    self.abort();
                    self.observer.on_event(DecodeEvent::Aborted { low_us });
                    None
                }
            },
        }
    }

    fn push_bit(&mut self, value: u8, low_us: u32) -> Option<Frame> {
        self.current |= value << self.bit_count;
        self.bit_count += 1;
        if self.debug {
            debug!("bit {}", value);
        }
        self.observer.on_event(DecodeEvent::Bit { value, low_us });

        if (self.bit_count as usize) < BITS_PER_BYTE {
            return None;
        }

        self.buf[self.byte_index as usize] = self.current;
        self.current = 0;
        self.bit_count = 0;
        self.byte_index += 1;

        if (self.byte_index as usize) < FRAME_LEN {
            return None;
        }

        self.state = DecoderState::Idle;
        if self.debug {
            debug!("frame complete");
        }
        self.observer.on_event(DecodeEvent::FrameComplete);
        Some(Frame::new(self.buf))
    }

    fn abort(&mut self) {
        self.clear_partial();
        self.state = DecoderState::Idle;
    }

    fn clear_partial(&mut self) {
        self.byte_index = 0;
        self.bit_count = 0;
        self.current = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encode::{edge_train, pulse_train, BIT0_NOMINAL_US, START_NOMINAL_US};
    use crate::frame::FRAME_BITS;

    fn feed<O: DecodeObserver>(decoder: &mut FrameDecoder<O>, pulses: &[u32]) -> Option<Frame> {
        let mut last = None;
        for &p in pulses {
            if let Some(frame) = decoder.push_pulse(p) {
                last = Some(frame);
            }
        }
        last
    }

    #[test]
    fn test_decodes_reference_frame() {
        let frame = Frame::new([0x01, 0x90, 0x00, 0x50, 0x00, 0x00, 0xE1]);
        let mut decoder = FrameDecoder::new();
        let decoded = feed(&mut decoder, &pulse_train(&frame));
        assert_eq!(decoded, Some(frame));
        assert!(decoded.is_some_and(|f| f.is_valid()));
        assert_eq!(decoder.state(), DecoderState::Idle);
    }

    #[test]
    fn test_frame_only_after_last_bit() {
        let frame = Frame::from_raw(0x0344, 0x00DD);
        let pulses = pulse_train(&frame);
        let mut decoder = FrameDecoder::new();

        for &p in &pulses[..pulses.len() - 1] {
            assert_eq!(decoder.push_pulse(p), None);
        }
        assert_eq!(decoder.bytes_received(), FRAME_LEN - 1);
        assert_eq!(decoder.push_pulse(pulses[FRAME_BITS]), Some(frame));
    }

    #[test]
    fn test_bits_fill_lsb_first() {
        let mut decoder = FrameDecoder::new();
        decoder.push_pulse(START_NOMINAL_US);
        // 1,0,0,0,0,0,0,0 -> 0x01
        decoder.push_pulse(1_500);
        for _ in 0..7 {
            decoder.push_pulse(BIT0_NOMINAL_US);
        }
        assert_eq!(decoder.bytes_received(), 1);
        assert_eq!(decoder.buf[0], 0x01);
    }

    #[test]
    fn test_idle_ignores_non_start_pulses() {
        let mut decoder = FrameDecoder::with_observer(DecoderConfig::DEFAULT, DecodeStats::new());
        for p in [500, 1_500, 2_500, 6_999, 10_001, 50_000] {
            assert_eq!(decoder.push_pulse(p), None);
            assert_eq!(decoder.state(), DecoderState::Idle);
        }
        assert_eq!(decoder.observer().ignored, 6);
        assert_eq!(decoder.observer().starts, 0);
    }

    #[test]
    fn test_dead_zone_aborts_frame() {
        for dead in [900, 1_000, 1_199] {
            let mut decoder =
                FrameDecoder::with_observer(DecoderConfig::DEFAULT, DecodeStats::new());
            decoder.push_pulse(START_NOMINAL_US);
            decoder.push_pulse(BIT0_NOMINAL_US);
            assert_eq!(decoder.push_pulse(dead), None);
            assert_eq!(decoder.state(), DecoderState::Idle);
            assert_eq!(decoder.observer().aborts, 1);
        }
    }

    #[test]
    fn test_start_marker_mid_frame_aborts() {
        let mut decoder = FrameDecoder::new();
        decoder.push_pulse(START_NOMINAL_US);
        decoder.push_pulse(BIT0_NOMINAL_US);
        decoder.push_pulse(START_NOMINAL_US);
        assert_eq!(decoder.state(), DecoderState::Idle);
    }

    #[test]
    fn test_resyncs_after_garbage() {
        let frame = Frame::from_raw(300, 120);
        let mut pulses = [0u32; 80];
        // partial frame, then a dead-zone pulse, then a clean frame
        pulses[0] = START_NOMINAL_US;
        pulses[1..20].fill(BIT0_NOMINAL_US);
        pulses[20] = 1_050;
        pulses[21..21 + 57].copy_from_slice(&pulse_train(&frame));
        pulses[78] = 300;
        pulses[79] = 1_600;

        let mut decoder = FrameDecoder::new();
        assert_eq!(feed(&mut decoder, &pulses), Some(frame));
    }

    #[test]
    fn test_edges_decode_across_timer_wrap() {
        let frame = Frame::from_raw(512, 64);
        let pulses = pulse_train(&frame);
        let mut decoder = FrameDecoder::new();
        let mut decoded = None;
        for edge in edge_train(&pulses, u32::MAX - 20_000, 600) {
            if let Some(f) = decoder.on_edge(edge) {
                decoded = Some(f);
            }
        }
        assert_eq!(decoded, Some(frame));
    }

    #[test]
    fn test_spurious_edges_ignored() {
        let mut decoder = FrameDecoder::with_observer(DecoderConfig::DEFAULT, DecodeStats::new());
        assert_eq!(decoder.on_edge(Edge::rising(100)), None);
        assert_eq!(decoder.on_edge(Edge::rising(200)), None);
        assert_eq!(decoder.state(), DecoderState::Idle);
        assert_eq!(decoder.observer().spurious_edges, 2);
    }

    #[test]
    fn test_no_timeout_by_default() {
        let mut decoder = FrameDecoder::new();
        decoder.on_edge(Edge::falling(0));
        decoder.on_edge(Edge::rising(START_NOMINAL_US));
        // one minute of silence
        decoder.on_edge(Edge::falling(60_000_000));
        assert_eq!(decoder.state(), DecoderState::Receiving);
    }

    #[test]
    fn test_idle_timeout_blind_to_full_timer_wrap() {
        let config = DecoderConfig::DEFAULT.with_idle_timeout(20_000);
        let mut decoder = FrameDecoder::with_observer(config, DecodeStats::new());
        decoder.on_edge(Edge::falling(0));
        decoder.on_edge(Edge::rising(START_NOMINAL_US));

        // 2^32 + 100 us later the counter reads only 100 us further on
        decoder.on_edge(Edge::falling(START_NOMINAL_US + 100));
        assert_eq!(decoder.state(), DecoderState::Receiving);
        assert_eq!(decoder.observer().timeouts, 0);
    }

    #[test]
    fn test_idle_timeout_recovers_start_marker() {
        let config = DecoderConfig::DEFAULT.with_idle_timeout(20_000);
        let mut decoder = FrameDecoder::with_observer(config, DecodeStats::new());

        // sender stops after a few bits
        decoder.on_edge(Edge::falling(0));
        decoder.on_edge(Edge::rising(8_000));
        decoder.on_edge(Edge::falling(8_500));
        decoder.on_edge(Edge::rising(9_000));

        // next frame arrives much later; its start marker must be honoured
        let frame = Frame::from_raw(700, 200);
        let pulses = pulse_train(&frame);
        let mut decoded = None;
        for edge in edge_train(&pulses, 500_000, 600) {
            if let Some(f) = decoder.on_edge(edge) {
                decoded = Some(f);
            }
        }
        assert_eq!(decoded, Some(frame));
        assert_eq!(decoder.observer().timeouts, 1);
        assert_eq!(decoder.observer().frames, 1);
    }

    #[test]
    fn test_debug_does_not_change_decoding() {
        let frame = Frame::from_raw(1_000, 300);
        let mut decoder = FrameDecoder::new();
        decoder.set_debug(true);
        assert!(decoder.is_debug());
        assert_eq!(feed(&mut decoder, &pulse_train(&frame)), Some(frame));
    }

    #[test]
    fn test_reset_drops_partial_frame() {
        let mut decoder = FrameDecoder::new();
        decoder.push_pulse(START_NOMINAL_US);
        for _ in 0..12 {
            decoder.push_pulse(BIT0_NOMINAL_US);
        }
        decoder.reset();
        assert_eq!(decoder.state(), DecoderState::Idle);
        assert_eq!(decoder.bytes_received(), 0);
    }

    #[test]
    fn test_stats_count_bits_and_frames() {
        let frame = Frame::from_raw(1, 2);
        let mut decoder = FrameDecoder::with_observer(DecoderConfig::DEFAULT, DecodeStats::new());
        feed(&mut decoder, &pulse_train(&frame));
        let stats = *decoder.observer();
        assert_eq!(stats.starts, 1);
        assert_eq!(stats.bits, FRAME_BITS as u32);
        assert_eq!(stats.frames, 1);
        assert_eq!(stats.dropped(), 0);
    }

    #[cfg(debug_assertions)]
    #[test]
    #[should_panic(expected = "overlapping pulse bands")]
    fn test_overlapping_bands_rejected_at_construction() {
        let config = DecoderConfig {
            bit1_max_us: 8_000,
            ..DecoderConfig::DEFAULT
        };
        let _ = FrameDecoder::with_observer(config, ());
    }
}
