//! Fixed-interval game clock driven by elapsed real time

use crate::error::SimError;

#[derive(Debug, Clone, PartialEq)]
pub struct TickClock {
    tick_interval: f64,
    accumulated: f64,
}

impl TickClock {
    pub fn new(tick_interval: f64) -> Result<Self, SimError> {
        if !(tick_interval > 0.0 && tick_interval.is_finite()) {
            return Err(SimError::invalid(format!(
                "tick interval must be positive, got {tick_interval}"
            )));
        }
        Ok(Self {
            tick_interval,
            accumulated: 0.0,
        })
    }

    pub fn tick_interval(&self) -> f64 {
        self.tick_interval
    }

    /// Time collected towards the next tick.
    pub fn pending(&self) -> f64 {
        self.accumulated
    }

    /// Add `elapsed` seconds and return how many whole ticks are due.
    pub fn update(&mut self, elapsed: f64) -> Result<u32, SimError> {
        if !(elapsed >= 0.0 && elapsed.is_finite()) {
            return Err(SimError::invalid(format!(
                "elapsed time must not be negative, got {elapsed}"
            )));
        }
        let total = self.accumulated + elapsed;
        let whole = (total / self.tick_interval).floor();
        if !(whole <= f64::from(u32::MAX)) {
            return Err(SimError::invalid(format!(
                "{total}s at {}s per tick is more ticks than one update can run",
                self.tick_interval
            )));
        }
        let mut due = whole as u32;
        let mut remainder = (total - whole * self.tick_interval).max(0.0);
        // the division can round one tick short
        if remainder >= self.tick_interval && due < u32::MAX {
            remainder = (remainder - self.tick_interval).max(0.0);
            due += 1;
        }
        self.accumulated = remainder;
        Ok(due)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_tick_before_interval() {
        let mut clock = TickClock::new(1.0).unwrap();
        assert_eq!(clock.update(0.5).unwrap(), 0);
        assert_eq!(clock.update(0.25).unwrap(), 0);
        assert_eq!(clock.pending(), 0.75);
    }

    #[test]
    fn test_tick_once_interval_passed() {
        let mut clock = TickClock::new(1.0).unwrap();
        assert_eq!(clock.update(0.5).unwrap(), 0);
        assert_eq!(clock.update(0.75).unwrap(), 1);
        assert_eq!(clock.pending(), 0.25);
    }

    #[test]
    fn test_large_delta_yields_several_ticks() {
        let mut clock = TickClock::new(0.5).unwrap();
        assert_eq!(clock.update(2.25).unwrap(), 4);
        assert_eq!(clock.pending(), 0.25);
        assert_eq!(clock.update(0.25).unwrap(), 1);
    }

    #[test]
    fn test_tiny_interval_does_not_spin() {
        let mut clock = TickClock::new(1e-20).unwrap();
        assert!(matches!(clock.update(1.0), Err(SimError::InvalidArgument(_))));
        assert_eq!(clock.pending(), 0.0);

        let mut clock = TickClock::new(1e-6).unwrap();
        let due = clock.update(1.0).unwrap();
        assert!((999_999..=1_000_000).contains(&due), "due {due}");
        assert!(clock.pending() < clock.tick_interval());
    }

    #[test]
    fn test_invalid_arguments() {
        assert!(TickClock::new(0.0).is_err());
        assert!(TickClock::new(-1.0).is_err());
        assert!(TickClock::new(f64::NAN).is_err());

        let mut clock = TickClock::new(1.0).unwrap();
        assert!(matches!(clock.update(-0.1), Err(SimError::InvalidArgument(_))));
        assert_eq!(clock.pending(), 0.0);
    }
}
