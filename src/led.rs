use log::info;

/// Requested LED state, as decoded from the `led` command argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedStatus {
    On,
    Off,
    /// Anything else; leaves the LED unchanged.
    Invalid,
}

impl LedStatus {
    pub fn parse(arg: &str) -> Self {
        match arg {
            "on" => LedStatus::On,
            "off" => LedStatus::Off,
            _ => LedStatus::Invalid,
        }
    }

    /// Numeric status passed to the device: 1, 0 or -1.
    pub fn code(self) -> i32 {
        match self {
            LedStatus::On => 1,
            LedStatus::Off => 0,
            LedStatus::Invalid => -1,
        }
    }
}

/// A single on/off actuator.
pub trait Led {
    /// Apply `status`. [`LedStatus::Invalid`] must not change the state.
    fn set(&mut self, status: LedStatus);

    fn is_on(&self) -> bool;
}

/// LED kept in memory; state changes are logged.
#[derive(Debug, Default)]
pub struct SimulatedLed {
    lit: bool,
}

impl Led for SimulatedLed {
    fn set(&mut self, status: LedStatus) {
        match status {
            LedStatus::On => self.lit = true,
            LedStatus::Off => self.lit = false,
            LedStatus::Invalid => return,
        }
        info!("led status {}", status.code());
    }

    fn is_on(&self) -> bool {
        self.lit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_exact() {
        assert_eq!(LedStatus::parse("on"), LedStatus::On);
        assert_eq!(LedStatus::parse("off"), LedStatus::Off);
        assert_eq!(LedStatus::parse("onward"), LedStatus::Invalid);
        assert_eq!(LedStatus::parse("ON"), LedStatus::Invalid);
        assert_eq!(LedStatus::Invalid.code(), -1);
    }

    #[test]
    fn test_invalid_leaves_state() {
        let mut led = SimulatedLed::default();
        led.set(LedStatus::On);
        led.set(LedStatus::Invalid);
        assert!(led.is_on());
        led.set(LedStatus::Off);
        assert!(!led.is_on());
    }
}
