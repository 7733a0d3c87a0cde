//! Single-slot frame handoff between the edge context and the main loop.
//!
//! [`FrameReceiver::on_edge`] runs in the edge (interrupt) context and owns
//! the decoder. The main loop polls [`FrameReceiver::message_available`] and
//! takes the frame with [`FrameReceiver::take_message`].
//!
//! All decoder state and the frame slot sit behind one blocking mutex on a
//! [`CriticalSectionRawMutex`], so each access runs with interrupts masked
//! and is released on every exit path. The ready flag is an atomic so the
//! poll never has to enter the critical section.
//!
//! Only one frame is held. While it is unread, later frames still decode but
//! are dropped on completion and reported as [`DecodeEvent::Overrun`].

use core::cell::RefCell;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use portable_atomic::{AtomicBool, Ordering};
use skyroaster_proto::{
    DecodeEvent, DecodeObserver, DecoderConfig, DecoderState, Edge, Frame, FrameDecoder, FRAME_LEN,
};

struct Shared<O> {
    decoder: FrameDecoder<O>,
    slot: [u8; FRAME_LEN],
}

/// Interrupt-shared decoder plus completed-frame slot.
///
/// Construct it in a `static` (the constructors are `const`) and hand a
/// `&'static` reference to both the edge capture and the polling side.
///
/// # Example
///
/// ```
/// # extern crate critical_section;
/// use skyroaster_core::FrameReceiver;
/// use skyroaster_proto::{encode::{edge_train, pulse_train}, Frame};
///
/// static RECEIVER: FrameReceiver = FrameReceiver::new();
///
/// let sent = Frame::from_raw(400, 80);
/// for edge in edge_train(&pulse_train(&sent), 0, 600) {
///     RECEIVER.on_edge(edge);
/// }
/// assert!(RECEIVER.message_available());
/// assert_eq!(RECEIVER.take_message(), Some(sent));
/// assert!(!RECEIVER.message_available());
/// ```
pub struct FrameReceiver<O = ()> {
    shared: Mutex<CriticalSectionRawMutex, RefCell<Shared<O>>>,
    ready: AtomicBool,
}

impl FrameReceiver<()> {
    /// Receiver with wire timing and no observer.
    #[must_use]
    pub const fn new() -> Self {
        Self::with_observer(DecoderConfig::DEFAULT, ())
    }
}

impl Default for FrameReceiver<()> {
    fn default() -> Self {
        Self::new()
    }
}

impl<O> FrameReceiver<O> {
    #[must_use]
    pub const fn with_observer(config: DecoderConfig, observer: O) -> Self {
        Self {
            shared: Mutex::new(RefCell::new(Shared {
                decoder: FrameDecoder::with_observer(config, observer),
                slot: [0u8; FRAME_LEN],
            })),
            ready: AtomicBool::new(false),
        }
    }

    /// Whether a completed frame is waiting. Never blocks.
    #[inline]
    #[must_use]
    pub fn message_available(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    /// Copy out the waiting frame and clear the ready flag.
    ///
    /// Runs inside a critical section so the edge context can never publish
    /// into the slot mid-copy. Returns `None` when nothing is waiting.
    pub fn take_message(&self) -> Option<Frame> {
        if !self.message_available() {
            return None;
        }
        self.shared.lock(|shared| {
            if !self.ready.load(Ordering::Acquire) {
                return None;
            }
            let bytes = shared.borrow().slot;
            self.ready.store(false, Ordering::Release);
            Some(Frame::new(bytes))
        })
    }

    /// Current decoder state.
    pub fn state(&self) -> DecoderState {
        self.shared.lock(|shared| shared.borrow().decoder.state())
    }

    /// Toggle the decoder trace.
    pub fn set_debug(&self, enabled: bool) {
        self.shared
            .lock(|shared| shared.borrow_mut().decoder.set_debug(enabled));
    }

    /// Run `f` on the observer inside the critical section.
    ///
    /// Keep `f` short: edges are held off while it runs.
    pub fn with_observer_ref<R>(&self, f: impl FnOnce(&O) -> R) -> R {
        self.shared.lock(|shared| f(shared.borrow().decoder.observer()))
    }

    /// Mutable variant of [`FrameReceiver::with_observer_ref`].
    pub fn with_observer_mut<R>(&self, f: impl FnOnce(&mut O) -> R) -> R {
        self.shared
            .lock(|shared| f(shared.borrow_mut().decoder.observer_mut()))
    }
}

impl<O: DecodeObserver> FrameReceiver<O> {
    /// Feed one line transition. Call from the edge context only.
    pub fn on_edge(&self, edge: Edge) {
        self.shared.lock(|shared| {
            let mut shared = shared.borrow_mut();
            let Some(frame) = shared.decoder.on_edge(edge) else {
                return;
            };

            if self.ready.load(Ordering::Acquire) {
                if shared.decoder.is_debug() {
                    debug!("frame dropped, previous one unread");
                }
                shared.decoder.observer_mut().on_event(DecodeEvent::Overrun);
                return;
            }

            shared.slot = frame.into_bytes();
            self.ready.store(true, Ordering::Release);
        });
    }

    /// Drop any partial frame and any unread frame.
    pub fn reset(&self) {
        self.shared.lock(|shared| {
            shared.borrow_mut().decoder.reset();
            self.ready.store(false, Ordering::Release);
        });
    }
}
