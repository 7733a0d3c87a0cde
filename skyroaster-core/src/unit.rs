//! Process-wide output unit.

use portable_atomic::{AtomicU8, Ordering};
use skyroaster_proto::TemperatureUnit;

const CELSIUS: u8 = b'C';
const FAHRENHEIT: u8 = b'F';

/// Atomic unit selector, read each time a temperature is computed.
///
/// Lives in a `static` so the transport side can change it while the
/// bridge keeps running.
pub struct UnitSetting(AtomicU8);

impl UnitSetting {
    #[must_use]
    pub const fn new(unit: TemperatureUnit) -> Self {
        Self(AtomicU8::new(encode(unit)))
    }

    #[must_use]
    pub fn get(&self) -> TemperatureUnit {
        match self.0.load(Ordering::Relaxed) {
            FAHRENHEIT => TemperatureUnit::Fahrenheit,
            _ => TemperatureUnit::Celsius,
        }
    }

    pub fn set(&self, unit: TemperatureUnit) {
        self.0.store(encode(unit), Ordering::Relaxed);
    }

    /// Set from a unit letter (`C`/`F`). Returns `false` and leaves the
    /// setting alone for anything else.
    pub fn set_from_char(&self, c: char) -> bool {
        match TemperatureUnit::from_char(c) {
            Some(unit) => {
                self.set(unit);
                true
            }
            None => false,
        }
    }

    /// Apply one command line from the companion app.
    ///
    /// A unit command is the bare letter (`C` or `F`, either case) with
    /// optional surrounding whitespace and line ending. Returns the unit
    /// now in effect, or `None` if the line was not a unit command.
    pub fn apply_command(&self, line: &[u8]) -> Option<TemperatureUnit> {
        match line.trim_ascii() {
            [letter] if self.set_from_char(char::from(*letter)) => Some(self.get()),
            _ => None,
        }
    }
}

impl Default for UnitSetting {
    fn default() -> Self {
        Self::new(TemperatureUnit::Celsius)
    }
}

const fn encode(unit: TemperatureUnit) -> u8 {
    match unit {
        TemperatureUnit::Celsius => CELSIUS,
        TemperatureUnit::Fahrenheit => FAHRENHEIT,
    }
}
