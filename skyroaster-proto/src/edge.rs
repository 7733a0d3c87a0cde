//! Edge events and low-pulse measurement.

/// Line level right after a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Level {
    Low,
    High,
}

/// A single transition on the sensor line.
///
/// Timestamps come from a free-running microsecond counter and are allowed
/// to wrap at `u32::MAX`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Edge {
    pub level: Level,
    pub timestamp_us: u32,
}

impl Edge {
    #[must_use]
    pub const fn new(level: Level, timestamp_us: u32) -> Self {
        Self {
            level,
            timestamp_us,
        }
    }

    /// High-to-low transition: a low pulse begins.
    #[must_use]
    pub const fn falling(timestamp_us: u32) -> Self {
        Self::new(Level::Low, timestamp_us)
    }

    /// Low-to-high transition: a low pulse ends.
    #[must_use]
    pub const fn rising(timestamp_us: u32) -> Self {
        Self::new(Level::High, timestamp_us)
    }
}

/// What an edge meant to the tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Transition {
    /// A low pulse started. `high_us` is how long the line was high before
    /// it, if a previous pulse has ended.
    LowStarted { high_us: Option<u32> },
    /// A low pulse ended after `low_us` microseconds.
    LowEnded { low_us: u32 },
    /// Rising edge with no low pulse in progress.
    Spurious,
}

/// Turns raw edges into low-pulse widths.
#[derive(Debug, Clone, Copy)]
pub struct EdgeTracker {
    low_start_us: u32,
    low_pending: bool,
    last_rise_us: Option<u32>,
}

impl EdgeTracker {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            low_start_us: 0,
            low_pending: false,
            last_rise_us: None,
        }
    }

    /// Forget any pulse in progress.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Whether a falling edge has been seen without its rising edge.
    #[inline]
    #[must_use]
    pub const fn low_pending(&self) -> bool {
        self.low_pending
    }

    /// Feed one edge.
    pub fn on_edge(&mut self, edge: Edge) -> Transition {
        match edge.level {
            Level::Low => {
                let high_us = self
                    .last_rise_us
                    .map(|rise| edge.timestamp_us.wrapping_sub(rise));
                self.low_start_us = edge.timestamp_us;
                self.low_pending = true;
                Transition::LowStarted { high_us }
            }
            Level::High => {
                if !self.low_pending {
                    return Transition::Spurious;
                }
                self.low_pending = false;
                self.last_rise_us = Some(edge.timestamp_us);
                Transition::LowEnded {
                    low_us: edge.timestamp_us.wrapping_sub(self.low_start_us),
                }
            }
        }
    }
}

impl Default for EdgeTracker {
    fn default() -> Self {
        Self::new()
    }
}
